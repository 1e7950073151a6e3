// Outbound reply generated by the orchestrator and delivered by the dispatcher.
//
// send_status only moves forward: pending -> {sent | failed | retry},
// retry -> {sent | failed | retry}. Terminal states are never regressed
// without a fresh orchestration cycle.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

use crate::schema::email_replies;

/// Send lifecycle stage of an outbound reply attempt
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum SendStatus {
    Pending,
    Sent,
    Failed,
    Retry,
}

impl SendStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SendStatus::Pending => "pending",
            SendStatus::Sent => "sent",
            SendStatus::Failed => "failed",
            SendStatus::Retry => "retry",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, SendStatus::Sent | SendStatus::Failed)
    }
}

impl FromStr for SendStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(SendStatus::Pending),
            "sent" => Ok(SendStatus::Sent),
            "failed" => Ok(SendStatus::Failed),
            "retry" => Ok(SendStatus::Retry),
            _ => Err(format!("Invalid send status: {}", s)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = email_replies)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EmailReply {
    pub id: Uuid,
    pub email_id: Uuid,
    pub subject: String,
    pub body: String,
    pub generated_by_ai: bool,
    pub send_status: String,
    pub send_error: Option<String>,
    pub provider: Option<String>,
    pub provider_message_id: Option<String>,
    pub send_attempted_at: Option<DateTime<Utc>>,
    pub sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = email_replies)]
pub struct NewEmailReply {
    pub email_id: Uuid,
    pub subject: String,
    pub body: String,
    pub generated_by_ai: bool,
    pub send_status: String,
}

impl NewEmailReply {
    pub fn pending(email_id: Uuid, subject: String, body: String) -> Self {
        Self {
            email_id,
            subject,
            body,
            generated_by_ai: true,
            send_status: SendStatus::Pending.as_str().to_string(),
        }
    }
}

impl EmailReply {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_reply: NewEmailReply,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(email_replies::table)
            .values(&new_reply)
            .get_result::<EmailReply>(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        reply_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::email_replies::dsl::*;

        email_replies
            .filter(id.eq(reply_id))
            .first::<EmailReply>(conn)
            .await
    }

    pub async fn list_for_email(
        conn: &mut AsyncPgConnection,
        email: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::email_replies::dsl::*;

        email_replies
            .filter(email_id.eq(email))
            .order(created_at.desc())
            .load::<EmailReply>(conn)
            .await
    }

    /// Record the provider and first attempt timestamp before dispatching
    pub async fn mark_attempt(
        conn: &mut AsyncPgConnection,
        reply_id: Uuid,
        provider_name: &str,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::email_replies::dsl::*;

        diesel::update(email_replies.filter(id.eq(reply_id)))
            .set((
                provider.eq(provider_name),
                send_attempted_at.eq(diesel::dsl::now),
            ))
            .execute(conn)
            .await
    }

    /// Terminal success: record provider message id, clear any prior error
    pub async fn mark_sent(
        conn: &mut AsyncPgConnection,
        reply_id: Uuid,
        message_id: &str,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::email_replies::dsl::*;

        diesel::update(email_replies.filter(id.eq(reply_id)))
            .set((
                send_status.eq(SendStatus::Sent.as_str()),
                provider_message_id.eq(message_id),
                sent_at.eq(diesel::dsl::now),
                send_error.eq(None::<String>),
            ))
            .execute(conn)
            .await
    }

    /// Terminal failure (configuration errors, exhausted retries)
    pub async fn mark_failed(
        conn: &mut AsyncPgConnection,
        reply_id: Uuid,
        error: &str,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::email_replies::dsl::*;

        diesel::update(email_replies.filter(id.eq(reply_id)))
            .set((
                send_status.eq(SendStatus::Failed.as_str()),
                send_error.eq(error),
            ))
            .execute(conn)
            .await
    }

    /// Transient failure: the task runner will attempt again
    pub async fn mark_retry(
        conn: &mut AsyncPgConnection,
        reply_id: Uuid,
        error: &str,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::email_replies::dsl::*;

        diesel::update(email_replies.filter(id.eq(reply_id)))
            .set((
                send_status.eq(SendStatus::Retry.as_str()),
                send_error.eq(error),
            ))
            .execute(conn)
            .await
    }

    pub fn send_status_enum(&self) -> SendStatus {
        SendStatus::from_str(&self.send_status).unwrap_or(SendStatus::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_send_status_round_trip() {
        for status in [
            SendStatus::Pending,
            SendStatus::Sent,
            SendStatus::Failed,
            SendStatus::Retry,
        ] {
            assert_eq!(SendStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(SendStatus::from_str("queued").is_err());
    }

    #[test]
    fn test_terminal_states() {
        assert!(SendStatus::Sent.is_terminal());
        assert!(SendStatus::Failed.is_terminal());
        assert!(!SendStatus::Pending.is_terminal());
        assert!(!SendStatus::Retry.is_terminal());
    }

    #[test]
    fn test_new_reply_defaults() {
        let reply = NewEmailReply::pending(Uuid::new_v4(), "Re: hi".into(), "body".into());
        assert!(reply.generated_by_ai);
        assert_eq!(reply.send_status, "pending");
    }
}
