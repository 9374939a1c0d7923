use roster::logging::init_tracing;
use roster::router::init_router;
use roster::state::init_app_state;
use roster_config::AppConfig;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = AppConfig::from_env();
    init_tracing(&config.log)?;

    let address = config.server.bind_address();
    let state = init_app_state(config).await?;
    let app = init_router(state);

    let listener = tokio::net::TcpListener::bind(&address).await?;
    info!(address = %address, "Server listening");
    info!("Swagger UI available at http://{}/swagger-ui", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutdown signal received");
}
