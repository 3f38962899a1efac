use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the SHS application
///
/// Resolves configuration once, seeds the bootstrap super-admin and serves the REST API
/// with its Swagger UI.
///
/// # Environment Variables
/// - `SHS_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `SHS_SUPER_ADMIN_USERNAME` / `SHS_SUPER_ADMIN_PASSWORD`: bootstrap account (required)
/// - `SHS_AUTHORIZATION_STRATEGY`: `capabilities` (default) or `roles`
/// - `SHS_UNRESOLVED_REFERENCE_POLICY`: `drop` (default) or `reject`
/// - `SHS_SESSION_TTL_DAYS`, `SHS_RECENT_PATIENTS_LIMIT`, `SHS_COUNTRY_CALLING_CODE`
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If configuration, startup or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("shs=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr = std::env::var("SHS_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let ctx = api_rest::startup::context_from_env()?;
    tracing::info!(
        strategy = %ctx.cfg().authorization_strategy(),
        unresolved_references = %ctx.cfg().unresolved_reference_policy(),
        "configuration resolved"
    );

    tracing::info!("++ Starting SHS REST on {}", rest_addr);

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, api_rest::router(ctx)).await?;

    Ok(())
}
