// Dashboard and analytics aggregation over leads, emails and replies.

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app::AppState;
use crate::middleware::AuthenticatedUser;
use crate::models::{ActivityLog, LeadStatus, SendStatus};
use crate::schema::{email_messages, email_replies, leads};
use crate::utils::ApiError;

async fn count_leads(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
    status_filter: Option<LeadStatus>,
) -> Result<i64, diesel::result::Error> {
    let mut query = leads::table
        .filter(leads::company_id.eq(owner))
        .into_boxed();
    if let Some(status) = status_filter {
        query = query.filter(leads::status.eq(status.as_str()));
    }
    query.count().get_result(conn).await
}

async fn count_replies(
    conn: &mut AsyncPgConnection,
    owner: Uuid,
    status: SendStatus,
) -> Result<i64, diesel::result::Error> {
    email_replies::table
        .inner_join(email_messages::table)
        .filter(email_messages::company_id.eq(owner))
        .filter(email_replies::send_status.eq(status.as_str()))
        .count()
        .get_result(conn)
        .await
}

/// Bucket timestamps into a contiguous per-day series ending today
fn daily_trend(timestamps: &[DateTime<Utc>], days: i64, today: NaiveDate) -> Vec<(NaiveDate, i64)> {
    (0..days)
        .rev()
        .map(|offset| {
            let day = today - Duration::days(offset);
            let count = timestamps.iter().filter(|t| t.date_naive() == day).count() as i64;
            (day, count)
        })
        .collect()
}

pub async fn stats(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.conn().await?;
    let owner = auth.company_id;

    let total_leads = count_leads(&mut conn, owner, None).await?;
    let new_leads = count_leads(&mut conn, owner, Some(LeadStatus::New)).await?;

    let total_emails: i64 = email_messages::table
        .filter(email_messages::company_id.eq(owner))
        .count()
        .get_result(&mut conn)
        .await?;
    let unprocessed_emails: i64 = email_messages::table
        .filter(email_messages::company_id.eq(owner))
        .filter(email_messages::processed.eq(false))
        .count()
        .get_result(&mut conn)
        .await?;

    let replies_sent = count_replies(&mut conn, owner, SendStatus::Sent).await?;
    let replies_failed = count_replies(&mut conn, owner, SendStatus::Failed).await?;
    let replies_pending = count_replies(&mut conn, owner, SendStatus::Pending).await?
        + count_replies(&mut conn, owner, SendStatus::Retry).await?;

    let recent_activity = ActivityLog::recent_for_company(&mut conn, owner, 10).await?;

    Ok(Json(json!({
        "leads": {
            "total": total_leads,
            "new": new_leads,
        },
        "emails": {
            "total": total_emails,
            "unprocessed": unprocessed_emails,
        },
        "replies": {
            "sent": replies_sent,
            "failed": replies_failed,
            "in_flight": replies_pending,
        },
        "recent_activity": recent_activity,
    })))
}

pub async fn analytics_overview(
    State(state): State<AppState>,
    auth: AuthenticatedUser,
) -> Result<Json<Value>, ApiError> {
    let mut conn = state.conn().await?;
    let owner = auth.company_id;
    let month_ago = Utc::now() - Duration::days(30);
    let week_ago = Utc::now() - Duration::days(7);

    let leads_30d: i64 = leads::table
        .filter(leads::company_id.eq(owner))
        .filter(leads::created_at.ge(month_ago))
        .count()
        .get_result(&mut conn)
        .await?;
    let emails_30d: i64 = email_messages::table
        .filter(email_messages::company_id.eq(owner))
        .filter(email_messages::received_at.ge(month_ago))
        .count()
        .get_result(&mut conn)
        .await?;
    let replies_sent_30d: i64 = email_replies::table
        .inner_join(email_messages::table)
        .filter(email_messages::company_id.eq(owner))
        .filter(email_replies::send_status.eq(SendStatus::Sent.as_str()))
        .filter(email_replies::created_at.ge(month_ago))
        .count()
        .get_result(&mut conn)
        .await?;

    let lead_dates: Vec<DateTime<Utc>> = leads::table
        .filter(leads::company_id.eq(owner))
        .filter(leads::created_at.ge(week_ago))
        .select(leads::created_at)
        .load(&mut conn)
        .await?;
    let email_dates: Vec<DateTime<Utc>> = email_messages::table
        .filter(email_messages::company_id.eq(owner))
        .filter(email_messages::received_at.ge(week_ago))
        .select(email_messages::received_at)
        .load(&mut conn)
        .await?;

    let today = Utc::now().date_naive();
    let lead_trend: Vec<Value> = daily_trend(&lead_dates, 7, today)
        .into_iter()
        .map(|(day, count)| json!({ "date": day, "count": count }))
        .collect();
    let email_trend: Vec<Value> = daily_trend(&email_dates, 7, today)
        .into_iter()
        .map(|(day, count)| json!({ "date": day, "count": count }))
        .collect();

    Ok(Json(json!({
        "last_30_days": {
            "leads": leads_30d,
            "emails": emails_30d,
            "replies_sent": replies_sent_30d,
        },
        "trend_7_days": {
            "leads": lead_trend,
            "emails": email_trend,
        },
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_daily_trend_covers_every_day() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let stamps = vec![
            Utc.with_ymd_and_hms(2025, 3, 10, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 10, 17, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2025, 3, 8, 12, 0, 0).unwrap(),
        ];
        let trend = daily_trend(&stamps, 7, today);
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].0, NaiveDate::from_ymd_opt(2025, 3, 4).unwrap());
        assert_eq!(trend[6], (today, 2));
        assert_eq!(trend[4].1, 1);
        assert_eq!(trend[5].1, 0);
    }

    #[test]
    fn test_daily_trend_empty_input() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let trend = daily_trend(&[], 7, today);
        assert!(trend.iter().all(|(_, count)| *count == 0));
    }
}
