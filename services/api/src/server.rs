use crate::cli::ServeArgs;
use crate::infra::{lead_gateway, AppState};
use crate::routes::with_intake_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use servisai::config::AppConfig;
use servisai::error::AppError;
use servisai::intake::{IntakeService, TracingErrorSink};
use servisai::telemetry;
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

    let gateway = lead_gateway(&config.intake)?;
    let intake_service = Arc::new(IntakeService::standard(
        gateway,
        Arc::new(TracingErrorSink),
        config.intake.timing,
    ));
    let _reaper = intake_service.start_reaper();

    let app = with_intake_routes(intake_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "lead intake service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
