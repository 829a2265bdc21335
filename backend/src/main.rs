//! Backend entry-point: loads settings, picks storage, and serves the ledger
//! API with OpenAPI docs in debug builds.

mod server;

use actix_web::web;
use color_eyre::eyre::{Context, Result};
use mockable::DefaultEnv;
use ortho_config::OrthoConfig;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetricsBuilder;
use server::{ServerConfig, create_server};
use waterlog::inbound::http::health::HealthState;
use waterlog::inbound::http::session_config::{BuildMode, session_settings_from_env};
use waterlog::outbound::persistence::{DbPool, PoolConfig, run_pending_migrations};
use waterlog::settings::AppSettings;

fn init_tracing() {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }
}

async fn connect_database(settings: &AppSettings, url: &str) -> Result<DbPool> {
    let migration_url = url.to_owned();
    let applied = tokio::task::spawn_blocking(move || run_pending_migrations(&migration_url))
        .await
        .wrap_err("migration task panicked")?
        .wrap_err("failed to apply migrations")?;
    info!(applied, "database migrations applied");

    let config = PoolConfig::new(url)
        .with_max_size(settings.db_max_connections())
        .with_connection_timeout(settings.db_connect_timeout());
    DbPool::new(config)
        .await
        .wrap_err("failed to build database pool")
}

#[cfg(feature = "metrics")]
fn with_metrics(config: ServerConfig) -> Result<ServerConfig> {
    let prometheus = PrometheusMetricsBuilder::new("waterlog")
        .endpoint("/metrics")
        .build()
        .map_err(|e| color_eyre::eyre::eyre!("configure Prometheus metrics: {e}"))?;
    Ok(config.with_metrics(Some(prometheus)))
}

#[cfg(not(feature = "metrics"))]
fn with_metrics(config: ServerConfig) -> Result<ServerConfig> {
    Ok(config)
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    init_tracing();

    let settings = AppSettings::load().wrap_err("failed to load configuration")?;
    let session = session_settings_from_env(&DefaultEnv::new(), BuildMode::from_debug_assertions())
        .wrap_err("invalid session configuration")?;
    info!(
        fingerprint = %session.key_fingerprint(),
        cookie_secure = session.cookie_secure,
        "session key loaded"
    );

    let mut config = ServerConfig::new(session, settings.bind_addr()?)
        .with_day_boundary(settings.day_boundary()?)
        .with_history_window(settings.history_window_days()?);

    match settings.database_url() {
        Some(url) => {
            let pool = connect_database(&settings, url).await?;
            config = config.with_db_pool(pool);
            info!("using PostgreSQL storage");
        }
        None => warn!("WATERLOG_DATABASE_URL not set; using in-memory storage"),
    }

    let config = with_metrics(config)?;
    let health_state = web::Data::new(HealthState::new());
    let server = create_server(health_state, config).wrap_err("failed to start HTTP server")?;
    server.await.wrap_err("HTTP server terminated")
}
