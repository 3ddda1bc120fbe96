use petcare_client::config::Config;
use petcare_client::router::create_app_router;
use petcare_client::state::AppState;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("petcare_client=debug,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    tracing::info!(api_url = %config.api_url, "Loaded configuration");

    // Initialize application state
    let state = Arc::new(AppState::new(&config));

    // Build application router with all routes and middleware
    let app = create_app_router(state.clone());

    // Start the server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!("Server running on http://{}", config.listen_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // Queued cart writes must land before exit
    state.cart.flush().await;
    tracing::info!("Cart flushed, shutting down");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
}
