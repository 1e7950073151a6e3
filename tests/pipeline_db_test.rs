// End-to-end pipeline tests against a real database.
// Skipped unless DATABASE_URL is set.

use serial_test::serial;
use uuid::Uuid;

use leadflow_backend::app_config::AiConfig;
use leadflow_backend::db::{create_diesel_pool, DieselDatabaseConfig, DieselPool};
use leadflow_backend::migrations;
use leadflow_backend::models::{
    AutoReplyTemplate, Company, EmailIntegration, EmailMessage, EmailReply, Lead, LeadStatus,
    NewAutoReplyTemplate, NewEmailIntegration, NewUser, SendStatus, User, UserRole,
};
use leadflow_backend::services::ai_client::{AiClient, FALLBACK_REPLY};
use leadflow_backend::services::delivery::{dispatch_reply, DispatchOutcome};
use leadflow_backend::services::intake::{receive_email, InboundEmail};
use leadflow_backend::services::leads::{capture_lead, LeadCapture};
use leadflow_backend::services::orchestrator::generate_email_reply;
use leadflow_backend::utils::password::{hash_password, verify_password};

async fn test_pool() -> Option<DieselPool> {
    dotenv::dotenv().ok();
    if std::env::var("DATABASE_URL").is_err() {
        eprintln!("DATABASE_URL not set, skipping");
        return None;
    }
    migrations::run_migrations().await.expect("migrations");
    Some(
        create_diesel_pool(DieselDatabaseConfig::default())
            .await
            .expect("pool"),
    )
}

fn unreachable_ai() -> AiClient {
    AiClient::new(AiConfig {
        base_url: "http://127.0.0.1:9".to_string(),
        api_key: "test-key".to_string(),
        default_model: "gpt-4o-mini".to_string(),
        temperature: 0.3,
        max_tokens: 300,
        request_timeout: 2,
    })
}

fn unique(name: &str) -> String {
    format!("{}-{}", name, Uuid::new_v4())
}

#[tokio::test]
#[serial]
async fn lead_capture_renders_latest_lead_template() {
    let Some(pool) = test_pool().await else { return };
    let mut conn = pool.get().await.unwrap();

    let company = Company::find_or_create(&mut conn, &unique("acme")).await.unwrap();
    AutoReplyTemplate::create(
        &mut conn,
        NewAutoReplyTemplate {
            company_id: Some(company.id),
            name: None,
            category: None,
            tone: None,
            trigger_type: "lead".to_string(),
            subject_template: "Re: {name}".to_string(),
            body_template: "Hi {name}, thanks!".to_string(),
        },
    )
    .await
    .unwrap();

    let (lead, auto_reply) = capture_lead(
        &mut conn,
        Some(&company),
        LeadCapture {
            name: "Sam".to_string(),
            email: unique("sam") + "@x.com",
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();

    assert_eq!(lead.status_enum(), LeadStatus::New);
    let reply = auto_reply.expect("lead template should render");
    assert_eq!(reply.subject, "Re: Sam");
    assert_eq!(reply.body, "Hi Sam, thanks!");
}

#[tokio::test]
#[serial]
async fn intake_links_matching_lead_and_marks_contacted() {
    let Some(pool) = test_pool().await else { return };
    let mut conn = pool.get().await.unwrap();

    let company = Company::find_or_create(&mut conn, &unique("acme")).await.unwrap();
    let address = unique("lead") + "@x.com";
    let (lead, _) = capture_lead(
        &mut conn,
        Some(&company),
        LeadCapture {
            name: "Sam".to_string(),
            email: address.clone(),
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();

    let (email, resolved_company) = receive_email(
        &mut conn,
        InboundEmail {
            from_email: address,
            subject: "pricing".to_string(),
            body: "how much?".to_string(),
            // The matched lead's company must win over this
            company_id: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(email.lead_id, Some(lead.id));
    assert_eq!(resolved_company, Some(company.id));

    let refreshed = Lead::find_by_id(&mut conn, lead.id).await.unwrap();
    assert_eq!(refreshed.status_enum(), LeadStatus::Contacted);
}

#[tokio::test]
#[serial]
async fn unmatched_email_keeps_payload_company() {
    let Some(pool) = test_pool().await else { return };
    let mut conn = pool.get().await.unwrap();

    let (email, resolved) = receive_email(
        &mut conn,
        InboundEmail {
            from_email: unique("stranger") + "@x.com",
            subject: "hi".to_string(),
            body: "hello".to_string(),
            company_id: None,
        },
    )
    .await
    .unwrap();

    assert_eq!(email.lead_id, None);
    assert_eq!(resolved, None);
}

#[tokio::test]
#[serial]
async fn reply_generation_and_dispatch_lifecycle() {
    let Some(pool) = test_pool().await else { return };
    let mut conn = pool.get().await.unwrap();
    let ai = unreachable_ai();

    let company = Company::find_or_create(&mut conn, &unique("acme")).await.unwrap();
    let (email, _) = receive_email(
        &mut conn,
        InboundEmail {
            from_email: unique("buyer") + "@x.com",
            subject: "Quote please".to_string(),
            body: "Need a quote for 10 seats".to_string(),
            company_id: Some(company.id),
        },
    )
    .await
    .unwrap();

    // No email template: generic acknowledgment path, AI falls back
    let reply = generate_email_reply(&mut conn, &ai, email.id)
        .await
        .unwrap()
        .expect("auto-reply enabled by default");
    assert_eq!(reply.subject, "Re: Quote please");
    assert_eq!(reply.body, FALLBACK_REPLY);
    assert!(reply.generated_by_ai);
    assert_eq!(reply.send_status_enum(), SendStatus::Pending);

    // No integration connected: terminal failure
    let outcome = dispatch_reply(&mut conn, reply.id).await.unwrap();
    assert!(matches!(outcome, DispatchOutcome::Failed(_)));
    let failed = EmailReply::find_by_id(&mut conn, reply.id).await.unwrap();
    assert_eq!(failed.send_status_enum(), SendStatus::Failed);
    assert!(failed.send_error.is_some());

    // Terminal states never regress
    let again = dispatch_reply(&mut conn, reply.id).await.unwrap();
    assert_eq!(again, DispatchOutcome::Skipped);

    // Connect gmail and run a fresh orchestration cycle
    EmailIntegration::create(
        &mut conn,
        NewEmailIntegration {
            company_id: company.id,
            provider: "gmail".to_string(),
            email_address: unique("sales") + "@acme.test",
            access_token: "token".to_string(),
            refresh_token: None,
            token_type: "Bearer".to_string(),
            scopes: None,
            expires_at: None,
            status: "connected".to_string(),
        },
    )
    .await
    .unwrap();

    let second = generate_email_reply(&mut conn, &ai, email.id)
        .await
        .unwrap()
        .unwrap();
    let outcome = dispatch_reply(&mut conn, second.id).await.unwrap();
    let message_id = match outcome {
        DispatchOutcome::Sent(id) => id,
        other => panic!("expected Sent, got {:?}", other),
    };
    assert!(message_id.starts_with("gmail-"));

    let sent = EmailReply::find_by_id(&mut conn, second.id).await.unwrap();
    assert_eq!(sent.send_status_enum(), SendStatus::Sent);
    assert_eq!(sent.provider.as_deref(), Some("gmail"));
    assert_eq!(sent.provider_message_id, Some(message_id));
    assert!(sent.sent_at.is_some());
    assert!(sent.send_error.is_none());
}

#[tokio::test]
#[serial]
async fn cross_company_ids_are_invisible() {
    let Some(pool) = test_pool().await else { return };
    let mut conn = pool.get().await.unwrap();

    let owner = Company::find_or_create(&mut conn, &unique("acme")).await.unwrap();
    let other = Company::find_or_create(&mut conn, &unique("rival")).await.unwrap();

    let (lead, _) = capture_lead(
        &mut conn,
        Some(&owner),
        LeadCapture {
            name: "Sam".to_string(),
            email: unique("sam") + "@x.com",
            ..Default::default()
        },
        None,
    )
    .await
    .unwrap();

    let (email, _) = receive_email(
        &mut conn,
        InboundEmail {
            from_email: unique("buyer") + "@x.com",
            subject: "hi".to_string(),
            body: "hello".to_string(),
            company_id: Some(owner.id),
        },
    )
    .await
    .unwrap();

    let template = AutoReplyTemplate::create(
        &mut conn,
        NewAutoReplyTemplate {
            company_id: Some(owner.id),
            name: None,
            category: None,
            tone: None,
            trigger_type: "email".to_string(),
            subject_template: "Re: {subject}".to_string(),
            body_template: "Thanks".to_string(),
        },
    )
    .await
    .unwrap();

    assert!(matches!(
        Lead::find_for_company(&mut conn, lead.id, other.id).await,
        Err(diesel::result::Error::NotFound)
    ));
    assert!(matches!(
        EmailMessage::find_for_company(&mut conn, email.id, other.id).await,
        Err(diesel::result::Error::NotFound)
    ));
    assert!(matches!(
        AutoReplyTemplate::find_for_company(&mut conn, template.id, other.id).await,
        Err(diesel::result::Error::NotFound)
    ));

    // Wrong-owner delete removes nothing
    let deleted = AutoReplyTemplate::delete(&mut conn, template.id, other.id)
        .await
        .unwrap();
    assert_eq!(deleted, 0);
    assert!(
        AutoReplyTemplate::find_for_company(&mut conn, template.id, owner.id)
            .await
            .is_ok()
    );
}

#[tokio::test]
#[serial]
async fn role_and_password_updates_are_tenant_scoped() {
    let Some(pool) = test_pool().await else { return };
    let mut conn = pool.get().await.unwrap();

    let owner = Company::find_or_create(&mut conn, &unique("acme")).await.unwrap();
    let other = Company::find_or_create(&mut conn, &unique("rival")).await.unwrap();

    let user = User::create(
        &mut conn,
        NewUser {
            company_id: owner.id,
            email: unique("op") + "@acme.test",
            password_hash: hash_password("old-password-1").unwrap(),
            role: UserRole::Operator.as_str().to_string(),
        },
    )
    .await
    .unwrap();

    // Another tenant's admin cannot touch the role
    assert!(matches!(
        User::update_role(&mut conn, user.id, other.id, UserRole::Admin).await,
        Err(diesel::result::Error::NotFound)
    ));

    let promoted = User::update_role(&mut conn, user.id, owner.id, UserRole::Admin)
        .await
        .unwrap();
    assert!(promoted.is_admin());
    assert!(promoted.updated_at >= user.updated_at);

    let new_hash = hash_password("new-password-9").unwrap();
    let rehashed = User::update_password(&mut conn, user.id, &new_hash)
        .await
        .unwrap();
    assert!(verify_password("new-password-9", &rehashed.password_hash));
    assert!(!verify_password("old-password-1", &rehashed.password_hash));
}

#[tokio::test]
#[serial]
async fn auto_reply_disabled_produces_nothing() {
    let Some(pool) = test_pool().await else { return };
    let mut conn = pool.get().await.unwrap();

    let company = Company::find_or_create(&mut conn, &unique("quiet")).await.unwrap();
    Company::update(
        &mut conn,
        company.id,
        leadflow_backend::models::CompanyUpdate {
            auto_reply_enabled: Some(false),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let (email, _) = receive_email(
        &mut conn,
        InboundEmail {
            from_email: unique("someone") + "@x.com",
            subject: "hello".to_string(),
            body: "hello".to_string(),
            company_id: Some(company.id),
        },
    )
    .await
    .unwrap();

    let reply = generate_email_reply(&mut conn, &unreachable_ai(), email.id)
        .await
        .unwrap();
    assert!(reply.is_none());
}
