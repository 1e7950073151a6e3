// Migration runner for LeadFlow Backend
// Uses embedded migrations from diesel_migrations crate
// Note: diesel_migrations requires sync connections, not async

use diesel::Connection;
use diesel::PgConnection;
use diesel_migrations::MigrationHarness;
use std::error::Error;
use tracing::{debug, info};

use crate::db::diesel_pool::MIGRATIONS;

/// Whether embedded migrations should run at startup
pub fn should_run_migrations() -> bool {
    std::env::var("DISABLE_EMBEDDED_MIGRATIONS")
        .map(|v| v != "true" && v != "1")
        .unwrap_or(true)
}

/// Run all pending migrations.
/// Returns the number of migrations applied.
pub async fn run_migrations() -> Result<usize, Box<dyn Error + Send + Sync>> {
    let database_url = crate::app_config::config().database.url.clone();

    // MigrationHarness is sync, so run it on a blocking thread
    let applied_count =
        tokio::task::spawn_blocking(move || -> Result<usize, Box<dyn Error + Send + Sync>> {
            let mut conn = PgConnection::establish(&database_url)
                .map_err(|e| format!("Failed to establish sync connection: {}", e))?;

            let pending = conn
                .pending_migrations(MIGRATIONS)
                .map_err(|e| format!("Failed to check pending migrations: {}", e))?;

            if pending.is_empty() {
                debug!("No pending migrations found");
                return Ok(0);
            }

            info!("Found {} pending migrations", pending.len());

            let applied = conn
                .run_pending_migrations(MIGRATIONS)
                .map_err(|e| format!("Failed to run migrations: {}", e))?;

            for migration in &applied {
                debug!("Applied migration: {}", migration);
            }

            Ok(applied.len())
        })
        .await
        .map_err(|e| format!("Migration task panicked: {}", e))??;

    if applied_count > 0 {
        info!("Applied {} migrations", applied_count);
    }

    Ok(applied_count)
}
