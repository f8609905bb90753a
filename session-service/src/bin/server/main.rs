use std::sync::Arc;

use session_service::app::build_state;
use session_service::app::Stores;
use session_service::config::Config;
use session_service::config::DEFAULT_LOG_FILTER;
use session_service::domain::clock::SystemClock;
use session_service::inbound::http::router::create_router;
use session_service::outbound::notifications::LogOtpDelivery;
use session_service::outbound::repositories::InMemoryOtpRepository;
use session_service::outbound::repositories::InMemoryRefreshTokenRepository;
use session_service::outbound::repositories::InMemoryUserRepository;
use session_service::outbound::repositories::PostgresOtpRepository;
use session_service::outbound::repositories::PostgresRefreshTokenRepository;
use session_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "session-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let ttls = config.session_ttls();

    tracing::info!(
        environment = %config.environment,
        http_port = config.server.http_port,
        access_ttl_secs = ttls.access,
        refresh_ttl_secs = ttls.refresh,
        otp_ttl_minutes = config.otp.ttl_minutes,
        "Configuration loaded"
    );

    config.ensure_not_production("Logged OTP delivery")?;
    let clock = Arc::new(SystemClock);
    let delivery = Arc::new(LogOtpDelivery);

    let state = if config.uses_database() {
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

        let stores = Stores {
            users: Arc::new(PostgresUserRepository::new(pg_pool.clone())),
            refresh_tokens: Arc::new(PostgresRefreshTokenRepository::new(pg_pool.clone())),
            otps: Arc::new(PostgresOtpRepository::new(pg_pool)),
        };
        build_state(&config, stores, delivery, clock)
    } else {
        config.ensure_not_production("In-memory storage")?;
        tracing::warn!("No database configured, sessions live in process memory only");

        let stores = Stores {
            users: Arc::new(InMemoryUserRepository::new()),
            refresh_tokens: Arc::new(InMemoryRefreshTokenRepository::new()),
            otps: Arc::new(InMemoryOtpRepository::new()),
        };
        build_state(&config, stores, delivery, clock)
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, create_router(state)).await?;
    tracing::info!("Server exited");

    Ok(())
}
