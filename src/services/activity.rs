// Activity logging - append-only record of notable state transitions,
// consumed by the dashboard and analytics queries.

use diesel_async::AsyncPgConnection;
use tracing::info;
use uuid::Uuid;

use crate::models::{ActivityLog, NewActivityLog};

pub struct ActivityEntry<'a> {
    pub action: &'a str,
    pub entity_type: &'a str,
    pub entity_id: Option<Uuid>,
    pub company_id: Uuid,
    pub user_id: Option<Uuid>,
    pub description: Option<&'a str>,
}

pub async fn log_activity(
    conn: &mut AsyncPgConnection,
    entry: ActivityEntry<'_>,
) -> Result<ActivityLog, diesel::result::Error> {
    let row = ActivityLog::create(
        conn,
        NewActivityLog {
            company_id: entry.company_id,
            user_id: entry.user_id,
            action: entry.action.to_string(),
            entity_type: entry.entity_type.to_string(),
            entity_id: entry.entity_id,
            description: entry.description.map(|d| d.to_string()),
        },
    )
    .await?;

    info!(
        target: "activity",
        action = entry.action,
        entity_type = entry.entity_type,
        entity_id = ?entry.entity_id,
        company_id = %entry.company_id,
        user_id = ?entry.user_id,
        "Activity logged"
    );

    Ok(row)
}
