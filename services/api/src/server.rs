use crate::cli::ServeArgs;
use crate::infra::{default_engine, AppState};
use crate::routes::with_service_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use land_valuation::calculator::CalculatorState;
use land_valuation::config::AppConfig;
use land_valuation::error::AppError;
use land_valuation::projects::{InMemoryProjectRepository, ProjectService};
use land_valuation::telemetry;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let repository = Arc::new(InMemoryProjectRepository::default());
    let calculator = CalculatorState {
        engine: Arc::new(default_engine()),
        projects: Arc::new(ProjectService::new(repository)),
    };

    let app = with_service_routes(calculator)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "land valuation service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
