// Append-only activity log. Rows are never mutated after creation.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::schema::activity_logs;

#[derive(Debug, Clone, Serialize, Deserialize, Queryable, Selectable, Identifiable)]
#[diesel(table_name = activity_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ActivityLog {
    pub id: Uuid,
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = activity_logs)]
pub struct NewActivityLog {
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub action: String,
    pub entity_type: String,
    pub entity_id: Option<Uuid>,
    pub description: Option<String>,
}

impl ActivityLog {
    pub async fn create(
        conn: &mut AsyncPgConnection,
        entry: NewActivityLog,
    ) -> Result<Self, diesel::result::Error> {
        diesel::insert_into(activity_logs::table)
            .values(&entry)
            .get_result::<ActivityLog>(conn)
            .await
    }

    pub async fn recent_for_company(
        conn: &mut AsyncPgConnection,
        owner: Uuid,
        limit: i64,
    ) -> Result<Vec<Self>, diesel::result::Error> {
        use crate::schema::activity_logs::dsl::*;

        activity_logs
            .filter(company_id.eq(owner))
            .order(created_at.desc())
            .limit(limit)
            .load::<ActivityLog>(conn)
            .await
    }
}
