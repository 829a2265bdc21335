//! Server construction and middleware wiring.

mod config;
mod state_builders;

pub use config::ServerConfig;

use state_builders::build_http_state;

use std::sync::Arc;

use actix_session::{
    SessionMiddleware,
    config::{CookieContentSecurity, PersistentSession},
    storage::CookieSessionStore,
};
use actix_web::cookie::{Key, SameSite};
use actix_web::dev::{Server, ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, HttpServer, web};

use waterlog::Trace;
#[cfg(debug_assertions)]
use waterlog::doc::ApiDoc;
use waterlog::domain::ports::{LedgerMetrics, NoOpLedgerMetrics};
use waterlog::inbound::http::configure_api;
use waterlog::inbound::http::health::{HealthState, live, ready};
use waterlog::inbound::http::state::HttpState;
#[cfg(feature = "metrics")]
use actix_web::middleware::Condition;
#[cfg(feature = "metrics")]
use actix_web_prom::{PrometheusMetrics, PrometheusMetricsBuilder};
#[cfg(feature = "metrics")]
use waterlog::outbound::metrics::PrometheusLedgerMetrics;
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

/// Lifetime of a persistent session cookie.
const SESSION_TTL_DAYS: i64 = 7;

/// Pick the ledger metrics sink.
///
/// Prometheus counters are registered on the middleware's registry when the
/// `metrics` feature is enabled and a middleware is configured; every other
/// case discards samples.
///
/// # Errors
/// Returns [`std::io::Error`] if Prometheus metric registration fails.
#[cfg(feature = "metrics")]
fn build_ledger_metrics(config: &ServerConfig) -> std::io::Result<Arc<dyn LedgerMetrics>> {
    match &config.prometheus {
        Some(prom) => {
            let metrics = PrometheusLedgerMetrics::new(&prom.registry).map_err(|e| {
                std::io::Error::other(format!("ledger metrics registration failed: {e}"))
            })?;
            Ok(Arc::new(metrics))
        }
        None => Ok(Arc::new(NoOpLedgerMetrics)),
    }
}

#[cfg(not(feature = "metrics"))]
fn build_ledger_metrics(_config: &ServerConfig) -> std::io::Result<Arc<dyn LedgerMetrics>> {
    Ok(Arc::new(NoOpLedgerMetrics))
}

/// Resolve the Prometheus middleware and whether it is active.
///
/// `Condition` needs an instance even when disabled, so an unregistered
/// placeholder without an endpoint stands in.
#[cfg(feature = "metrics")]
fn metrics_middleware(
    prometheus: Option<PrometheusMetrics>,
) -> std::io::Result<(bool, PrometheusMetrics)> {
    match prometheus {
        Some(prometheus) => Ok((true, prometheus)),
        None => PrometheusMetricsBuilder::new("waterlog")
            .build()
            .map(|placeholder| (false, placeholder))
            .map_err(|e| std::io::Error::other(format!("metrics middleware failed: {e}"))),
    }
}

#[derive(Clone)]
struct AppDependencies {
    health_state: web::Data<HealthState>,
    http_state: web::Data<HttpState>,
    key: Key,
    cookie_secure: bool,
    same_site: SameSite,
}

fn build_app(
    deps: AppDependencies,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let AppDependencies {
        health_state,
        http_state,
        key,
        cookie_secure,
        same_site,
    } = deps;

    let session = SessionMiddleware::builder(CookieSessionStore::default(), key)
        .cookie_name("session".into())
        .cookie_path("/".into())
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .cookie_content_security(CookieContentSecurity::Private)
        .cookie_same_site(same_site)
        .session_lifecycle(
            PersistentSession::default()
                .session_ttl(actix_web::cookie::time::Duration::days(SESSION_TTL_DAYS)),
        )
        .build();

    let api = web::scope("/api/v1").wrap(session).configure(configure_api);

    let app = App::new()
        .app_data(health_state)
        .app_data(http_state)
        .wrap(Trace)
        .service(api)
        .service(ready)
        .service(live);

    #[cfg(debug_assertions)]
    let app = app.service(SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi()));

    app
}

/// Construct an Actix HTTP server using the provided health state and configuration.
///
/// # Errors
/// Propagates [`std::io::Error`] when binding the socket, registering
/// metrics, or starting the server fails.
pub fn create_server(
    health_state: web::Data<HealthState>,
    config: ServerConfig,
) -> std::io::Result<Server> {
    let server_health_state = health_state.clone();
    let ledger_metrics = build_ledger_metrics(&config)?;
    let http_state = build_http_state(&config, ledger_metrics);
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        #[cfg(feature = "metrics")]
        prometheus,
        ..
    } = config;

    #[cfg(feature = "metrics")]
    let (metrics_enabled, prometheus) = metrics_middleware(prometheus)?;

    let server = HttpServer::new(move || {
        let app = build_app(AppDependencies {
            health_state: server_health_state.clone(),
            http_state: http_state.clone(),
            key: key.clone(),
            cookie_secure,
            same_site,
        });

        #[cfg(feature = "metrics")]
        let app = app.wrap(Condition::new(metrics_enabled, prometheus.clone()));

        app
    })
    .bind(bind_addr)?
    .run();

    health_state.mark_ready();
    Ok(server)
}
