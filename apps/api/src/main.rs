use anyhow::Result;
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use certificate_api::certificate::seed::{default_certificate, load_seed};
use certificate_api::config::Config;
use certificate_api::routes::build_router;
use certificate_api::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("certificate_api={}", &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Certificate API v{}", env!("CARGO_PKG_VERSION"));

    let seed = match &config.seed_path {
        Some(path) => load_seed(path)?,
        None => default_certificate()?,
    };
    info!(
        format = %seed.page.format(),
        unit = %seed.page.unit(),
        sections = seed.sections.len(),
        pagination = config.pagination_enabled,
        max_sessions = config.max_sessions,
        "Seed certificate ready"
    );

    let state = AppState::new(config.clone(), seed);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
