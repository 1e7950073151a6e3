use std::net::SocketAddr;

use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use leadflow_backend::{app_config, build_router, initialize_app_state};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("leadflow_backend=debug,tower_http=debug,info")
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = app_config::config();
    info!(
        "Starting leadflow-backend in {} mode",
        config.server.environment
    );

    let state = initialize_app_state().await?;
    let router = build_router(state);

    let addr: SocketAddr = format!("{}:{}", config.server.bind_address, config.server.port)
        .parse()?;
    info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    // ConnectInfo feeds the per-IP rate limiter on the chat endpoints
    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
