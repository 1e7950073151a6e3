// Redis connection handling built on the multiplexed ConnectionManager.
// Used for the fixed-window rate limit counters on public endpoints.

use redis::aio::ConnectionManager;
use redis::{AsyncCommands, Client, RedisError};
use std::time::{Duration, Instant};
use tokio::time::timeout;

use crate::app_config::RedisConfig;

#[derive(Clone)]
pub struct RedisPool {
    manager: ConnectionManager,
    command_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct RedisHealth {
    pub is_healthy: bool,
    pub latency_ms: Option<u64>,
    pub error: Option<String>,
}

impl RedisPool {
    pub async fn new(config: RedisConfig) -> Result<Self, RedisError> {
        let client = Client::open(config.url.clone())?;
        let manager = timeout(
            Duration::from_secs(config.connection_timeout),
            ConnectionManager::new(client),
        )
        .await
        .map_err(|_| {
            RedisError::from((
                redis::ErrorKind::IoError,
                "Redis connection timed out",
            ))
        })??;

        tracing::info!("Redis connection manager initialized");

        Ok(Self {
            manager,
            command_timeout: Duration::from_secs(config.command_timeout),
        })
    }

    /// Increment a counter, setting the expiry on first increment.
    /// Returns the counter value after the increment.
    pub async fn incr(&self, key: &str, expiry_seconds: u64) -> Result<i64, RedisError> {
        let mut conn = self.manager.clone();
        let count: i64 = timeout(self.command_timeout, conn.incr(key, 1))
            .await
            .map_err(|_| {
                RedisError::from((redis::ErrorKind::IoError, "Redis command timed out"))
            })??;
        if count == 1 {
            let _: () = conn.expire(key, expiry_seconds as i64).await?;
        }
        Ok(count)
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>, RedisError> {
        let mut conn = self.manager.clone();
        conn.get(key).await
    }

    pub async fn set_with_expiry(
        &self,
        key: &str,
        value: &str,
        expiry_seconds: u64,
    ) -> Result<(), RedisError> {
        let mut conn = self.manager.clone();
        conn.set_ex(key, value, expiry_seconds).await
    }

    pub async fn del(&self, key: &str) -> Result<(), RedisError> {
        let mut conn = self.manager.clone();
        conn.del(key).await
    }

    pub async fn health_check(&self) -> RedisHealth {
        let mut conn = self.manager.clone();
        let start = Instant::now();
        let result: Result<Result<String, RedisError>, _> = timeout(
            self.command_timeout,
            redis::cmd("PING").query_async(&mut conn),
        )
        .await;

        match result {
            Ok(Ok(_)) => RedisHealth {
                is_healthy: true,
                latency_ms: Some(start.elapsed().as_millis() as u64),
                error: None,
            },
            Ok(Err(e)) => RedisHealth {
                is_healthy: false,
                latency_ms: None,
                error: Some(e.to_string()),
            },
            Err(_) => RedisHealth {
                is_healthy: false,
                latency_ms: None,
                error: Some("Redis ping timed out".to_string()),
            },
        }
    }
}
