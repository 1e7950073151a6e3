// Provider client selection and the simulated send contract.

use chrono::Utc;
use uuid::Uuid;

use leadflow_backend::models::EmailIntegration;
use leadflow_backend::services::delivery::{client_for, DeliveryError};

fn integration(provider: &str) -> EmailIntegration {
    let now = Utc::now();
    EmailIntegration {
        id: Uuid::new_v4(),
        company_id: Uuid::new_v4(),
        provider: provider.to_string(),
        email_address: "sales@acme.test".to_string(),
        access_token: "token".to_string(),
        refresh_token: Some("refresh".to_string()),
        token_type: "Bearer".to_string(),
        scopes: Some("mail.send".to_string()),
        expires_at: None,
        status: "connected".to_string(),
        created_at: now,
        updated_at: now,
    }
}

#[tokio::test]
async fn gmail_send_returns_prefixed_message_id() {
    let integration = integration("gmail");
    let client = client_for(&integration.provider).unwrap();
    let id = client
        .send_email(&integration, "sam@x.com", "Re: pricing", "Hi Sam")
        .await
        .unwrap();
    assert!(id.starts_with("gmail-"));
    assert!(id.contains(&integration.id.to_string()));
}

#[tokio::test]
async fn microsoft_aliases_share_the_outlook_client() {
    for alias in ["outlook", "microsoft365", "microsoft", "OUTLOOK"] {
        let client = client_for(alias).unwrap();
        assert_eq!(client.provider_name(), "outlook");

        let integration = integration(alias);
        let id = client
            .send_email(&integration, "sam@x.com", "Re: hi", "body")
            .await
            .unwrap();
        assert!(id.starts_with("outlook-"));
    }
}

#[test]
fn unsupported_provider_fails_at_selection_time() {
    for tag in ["yahoo", "smtp", ""] {
        match client_for(tag) {
            Err(DeliveryError::UnsupportedProvider(p)) => assert_eq!(p, tag.to_lowercase()),
            other => panic!("expected UnsupportedProvider, got {:?}", other.map(|c| c.provider_name())),
        }
    }
}
