// Fixed-window rate limiting over redis INCR+EXPIRE counters.
// Guards the unauthenticated chat endpoints, keyed per client IP.

use tracing::warn;

use crate::db::RedisPool;

pub const CHAT_MESSAGE_LIMIT: i64 = 30;
pub const CHAT_LEAD_LIMIT: i64 = 20;
pub const WINDOW_SECONDS: u64 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitDecision {
    pub allowed: bool,
    pub remaining: i64,
    pub retry_after_seconds: u64,
}

/// Count a request against the (scope, client) window and decide whether
/// it may proceed. Redis unavailability fails open: a degraded cache must
/// not take the chat widget down with it.
pub async fn check_rate_limit(
    redis: &RedisPool,
    scope: &str,
    client: &str,
    limit: i64,
    window_seconds: u64,
) -> RateLimitDecision {
    let key = format!("ratelimit:{}:{}", scope, client);

    match redis.incr(&key, window_seconds).await {
        Ok(count) => RateLimitDecision {
            allowed: count <= limit,
            remaining: (limit - count).max(0),
            retry_after_seconds: window_seconds,
        },
        Err(e) => {
            warn!(scope = scope, "Rate limit check failed, allowing request: {}", e);
            RateLimitDecision {
                allowed: true,
                remaining: limit,
                retry_after_seconds: 0,
            }
        },
    }
}
