use filmi_api::{
    api::{create_router, AppState},
    config::Config,
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("filmi_api=info,tower_http=info")),
        )
        .init();

    let config = Config::from_env()?;
    let state = AppState::from_config(&config)?;

    // Create the router with all routes
    let app = create_router(state.clone());

    let listener = tokio::net::TcpListener::bind(config.bind_addr()).await?;
    tracing::info!(addr = %config.bind_addr(), "Server listening");

    // Catalog loads once in the background; an empty catalog is served until then
    tokio::spawn(async move {
        state.load_catalog().await;
    });

    axum::serve(listener, app).await?;
    Ok(())
}
