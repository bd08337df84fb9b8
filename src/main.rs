use rest_engine::api::{AppState, create_router};
use rest_engine::config::{ConfigLoader, Settings};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,rest_engine=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = Settings::from_env()?;
    let loader = ConfigLoader::load(&settings.rules_path)?;

    tracing::info!(
        base_timezone = %settings.base_timezone,
        home_airports = ?settings.home_airports.home_airports().collect::<Vec<_>>(),
        default_regime = %settings.default_regime,
        ruleset_version = %loader.version(),
        "Rest engine configured"
    );

    let bind_addr = settings.bind_addr.clone();
    let router = create_router(AppState::new(settings, loader));

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!("Listening on {}", bind_addr);
    axum::serve(listener, router).await?;

    Ok(())
}
