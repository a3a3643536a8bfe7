//! # Routemark API Server
//!
//! Serves the handler modules under the configured routes tree. Each module
//! declares its own route with a `// METHOD /path` comment and may carry a
//! `.schema.json` sibling with its route options and validation schema.
//!
//! ## Usage
//!
//! ```bash
//! cd routemark-api
//! ROUTEMARK__AUTH__SECRET=$(openssl rand -hex 32) cargo run
//! ```

use routemark_api::{app::build_app, config::Config, routes};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "routemark_api=debug,routemark_core=info,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "Routemark API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::load()?;
    tracing::info!(
        routes_dir = %config.routes.routes_dir.display(),
        environment = %config.api.environment,
        "Configuration loaded"
    );

    let app = build_app(&config, routes::catalog()).await?;

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!("Server listening on http://{}", address);

    axum::serve(listener, app.router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Shutdown signal received, exiting...");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "Failed to listen for shutdown signal");
    }
}
