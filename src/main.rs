use std::sync::Arc;

use portal_admin_api::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up CKAN_API_URL, SESSION_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = AppConfig::from_env();
    tracing::info!("Starting portal admin API in {:?} mode", config.environment);

    let port = config.port;
    let state = Arc::new(AppState::new(config));
    let app = app(state);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    println!("🚀 Portal admin API listening on http://{}", bind_addr);

    axum::serve(listener, app).await?;
    Ok(())
}
