// LeadFlow Backend - multi-tenant lead capture and email auto-reply service

pub mod app;
pub mod app_config;
pub mod db;
pub mod handlers;
pub mod middleware;
pub mod migrations;
pub mod models;
pub mod schema;
pub mod services;
pub mod utils;

use std::sync::Arc;

use axum::http::StatusCode;
use axum::routing::get;
use axum::Json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::app::AppState;
use crate::services::{start_task_runner, AiClient, JwtService};

/// Build the shared application state: pools, migrations, services and
/// the background task runner.
pub async fn initialize_app_state() -> Result<AppState, Box<dyn std::error::Error + Send + Sync>> {
    let config = app_config::config();

    info!(
        "Connecting to {}",
        db::mask_connection_string(&config.database.url)
    );
    let db_config = db::DieselDatabaseConfig::default();
    let max_connections = db_config.max_connections;
    let diesel_pool = db::create_diesel_pool(db_config).await?;

    if migrations::should_run_migrations() {
        info!("Running embedded migrations...");
        migrations::run_migrations().await?;
    }

    info!("Initializing Redis pool...");
    let redis_pool = db::RedisPool::new(config.redis.clone()).await?;

    let jwt_service = Arc::new(JwtService::new(&config.jwt));
    let ai_client = AiClient::new(config.ai.clone());
    let task_queue = start_task_runner(
        diesel_pool.clone(),
        ai_client.clone(),
        config.delivery.clone(),
    );

    Ok(AppState {
        config: Arc::new(config.clone()),
        diesel_pool,
        redis_pool,
        jwt_service,
        ai_client,
        task_queue,
        max_connections,
    })
}

/// Assemble the full router over the given state
pub fn build_router(state: AppState) -> axum::Router {
    let protected = axum::Router::new()
        .nest("/leads", handlers::lead_routes())
        .nest("/emails", handlers::email_routes())
        .nest("/templates", handlers::template_routes())
        .nest("/integrations", handlers::integration_routes())
        .nest("/companies", handlers::company_routes())
        .nest("/users", handlers::user_routes())
        .nest("/dashboard", handlers::dashboard_routes())
        .route(
            "/analytics/overview",
            get(handlers::dashboard::analytics_overview),
        )
        .route("/auth/me", get(handlers::auth::me))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let open = axum::Router::new()
        .nest("/auth", handlers::auth_routes())
        .nest("/public", handlers::public_routes())
        .route(
            "/webhook/email",
            axum::routing::post(handlers::public::webhook_email),
        )
        .nest("/chat", handlers::chat_routes());

    let cors = build_cors_layer(&state.config.cors_allowed_origins);

    axum::Router::new()
        .nest("/api/v1", protected.merge(open))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(allowed_origins: &[String]) -> CorsLayer {
    if allowed_origins.iter().any(|o| o == "*") {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<axum::http::HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

/// Liveness/readiness probe reporting component health
pub async fn health_check(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let mut overall_healthy = true;

    let postgres_health = match db::check_diesel_health(&state.diesel_pool).await {
        Ok(_) => serde_json::json!({
            "status": "healthy",
            "max_connections": state.max_connections,
            "error": null
        }),
        Err(e) => {
            overall_healthy = false;
            serde_json::json!({
                "status": "unhealthy",
                "error": format!("Database connection failed: {}", e)
            })
        },
    };

    let redis_health = state.redis_pool.health_check().await;
    if !redis_health.is_healthy {
        overall_healthy = false;
    }

    let response = serde_json::json!({
        "status": if overall_healthy { "healthy" } else { "degraded" },
        "service": "leadflow-backend",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "components": {
            "postgresql": postgres_health,
            "redis": {
                "status": if redis_health.is_healthy { "healthy" } else { "unhealthy" },
                "latency_ms": redis_health.latency_ms,
                "error": redis_health.error
            }
        }
    });

    if overall_healthy {
        (StatusCode::OK, Json(response))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response))
    }
}
