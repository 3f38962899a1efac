//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging. The workspace's main `shs-run` binary performs the
//! same startup and is the one deployed.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the SHS REST API server.
///
/// # Environment Variables
/// - `SHS_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `SHS_SUPER_ADMIN_USERNAME` / `SHS_SUPER_ADMIN_PASSWORD`: bootstrap account
/// - the remaining `SHS_*` core settings, see [`api_rest::startup::core_config_from_env`]
///
/// # Errors
/// Returns an error if:
/// - a configuration value is invalid or the bootstrap credentials are missing,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?)
                .add_directive("shs_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("SHS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let ctx = api_rest::startup::context_from_env()?;

    tracing::info!("-- Starting SHS REST API on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, api_rest::router(ctx)).await?;

    Ok(())
}
