use anyhow::{Context, Result};
use rhtmx_validation_site::{create_app, shared_registry, AppState, SiteConfig};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let config = SiteConfig::load_default()
        .and_then(SiteConfig::with_env_overrides)
        .context("Failed to load configuration")?;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!(name = %config.project.name, version = %config.project.version, "validation site starting");

    // Metadata problems are configuration defects: refuse to start
    let registry = shared_registry().context("Failed to build model metadata")?;
    info!(types = registry.len(), "model metadata registered");

    let app = create_app(AppState::new(registry));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Server running at http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
