use backend_lib::{config::Settings, router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration, falling back to the repo-local config directory
    let settings = Settings::load().or_else(|_| Settings::load_from("./config/default.toml"))?;

    // Initialize tracing; RUST_LOG overrides the configured level
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(settings.log_level.clone()));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let bind_addr = settings.bind_addr;
    let state = Arc::new(AppState::flat_file(settings)?);
    let app = router::create_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!(addr = %bind_addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
