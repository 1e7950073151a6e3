// Inbound email message, optionally linked to a lead by address match.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::email_messages;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = email_messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct EmailMessage {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub from_email: String,
    pub subject: String,
    pub body: String,
    pub received_at: DateTime<Utc>,
    pub processed: bool,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = email_messages)]
pub struct NewEmailMessage {
    pub company_id: Option<Uuid>,
    pub lead_id: Option<Uuid>,
    pub from_email: String,
    pub subject: String,
    pub body: String,
}

impl EmailMessage {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        new_email: NewEmailMessage,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(email_messages::table)
            .values(&new_email)
            .get_result::<EmailMessage>(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut AsyncPgConnection,
        email_id: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::email_messages::dsl::*;

        email_messages
            .filter(id.eq(email_id))
            .first::<EmailMessage>(conn)
            .await
    }

    pub async fn find_for_company(
        conn: &mut AsyncPgConnection,
        email_id: Uuid,
        owner: Uuid,
    ) -> Result<Self, diesel::result::Error> {
        use crate::schema::email_messages::dsl::*;

        email_messages
            .filter(id.eq(email_id))
            .filter(company_id.eq(owner))
            .first::<EmailMessage>(conn)
            .await
    }

    pub async fn list_for_company(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::email_messages::dsl::*;

        email_messages
            .filter(company_id.eq(owner))
            .order(received_at.desc())
            .load::<EmailMessage>(conn)
            .await
    }

    /// Set once a reply has been generated for this message
    pub async fn mark_processed(
        conn: &mut AsyncPgConnection,
        email_id: Uuid,
    ) -> Result<usize, diesel::result::Error> {
        use crate::schema::email_messages::dsl::*;

        diesel::update(email_messages.filter(id.eq(email_id)))
            .set(processed.eq(true))
            .execute(conn)
            .await
    }
}
