use std::sync::Arc;

use account_service::authentication::ports::AuthServicePort;
use account_service::authentication::service::AuthService;
use account_service::config::Config;
use account_service::repositories::code::PostgresActivationCodeRepository;
use account_service::repositories::code::PostgresResetCodeRepository;
use account_service::repositories::session::PostgresSessionRepository;
use account_service::repositories::user::PostgresUserRepository;
use auth::SystemClock;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "account_service=debug,code_janitor=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "code-janitor",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let interval = config.janitor_interval()?;
    let components = config.build_components(Arc::new(SystemClock))?;

    tracing::info!(
        interval_seconds = interval.as_secs(),
        default_role = %components.default_role,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = config.database.max_connections,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let service = AuthService::new(
        Arc::new(PostgresUserRepository::new(pg_pool.clone())),
        Arc::new(PostgresActivationCodeRepository::new(pg_pool.clone())),
        Arc::new(PostgresResetCodeRepository::new(pg_pool.clone())),
        Arc::new(PostgresSessionRepository::new(pg_pool)),
        components,
    );

    let mut ticker = tokio::time::interval(interval);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                match service.purge_expired().await {
                    Ok(report) => tracing::debug!(total = report.total(), "Purge pass finished"),
                    Err(e) => tracing::error!(error = %e, "Purge pass failed"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Shutdown signal received");
                break;
            }
        }
    }

    Ok(())
}
