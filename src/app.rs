// Application state shared across handlers

use std::sync::Arc;

use crate::app_config::AppConfig;
use crate::db::{DieselPool, RedisPool};
use crate::services::{AiClient, JwtService, TaskQueue};
use crate::utils::ApiError;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub diesel_pool: DieselPool,
    pub redis_pool: RedisPool,
    pub jwt_service: Arc<JwtService>,
    pub ai_client: AiClient,
    pub task_queue: TaskQueue,
    pub max_connections: u32,
}

impl AppState {
    /// Checkout a pooled connection, mapping pool exhaustion to a 500
    pub async fn conn(
        &self,
    ) -> Result<
        bb8::PooledConnection<
            '_,
            diesel_async::pooled_connection::AsyncDieselConnectionManager<
                diesel_async::AsyncPgConnection,
            >,
        >,
        ApiError,
    > {
        self.diesel_pool.get().await.map_err(ApiError::internal)
    }
}
