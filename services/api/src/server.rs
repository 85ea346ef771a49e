use crate::cli::ServeArgs;
use crate::infra::{explainer_from, http_client, live_provider_set, AppState};
use crate::routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use terra_guard::config::AppConfig;
use terra_guard::error::AppError;
use terra_guard::providers::FactorCollector;
use terra_guard::risk::RiskEngine;
use terra_guard::telemetry;
use terra_guard::underwriting::PayoutPolicy;
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

    let http = http_client(&config.providers)?;
    let providers = live_provider_set(http.clone(), &config.providers);
    let collector = Arc::new(FactorCollector::new(
        providers,
        config.providers.call_timeout(),
    ));

    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        collector,
        engine: Arc::new(RiskEngine::with_defaults()),
        explainer: explainer_from(http, &config.providers),
        payouts: PayoutPolicy::default(),
    };

    let app = routes::router()
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "risk scoring service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
