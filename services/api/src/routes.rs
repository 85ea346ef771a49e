use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use terra_guard::error::AppError;
use terra_guard::geo::validate_coords;
use terra_guard::risk::{Factor, RawFactors};
use terra_guard::underwriting::RiskBand;
use tracing::{info, warn};

#[derive(Debug, Deserialize)]
pub(crate) struct AnalyzeRequest {
    pub(crate) lon: f64,
    pub(crate) lat: f64,
    #[serde(default)]
    pub(crate) year: Option<i32>,
    #[serde(default)]
    pub(crate) include_explanation: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct AnalyzeResponse {
    pub(crate) risk_percent: u8,
    pub(crate) risk_band: RiskBand,
    pub(crate) metrics_percent: BTreeMap<Factor, f64>,
    pub(crate) raw_factors: RawFactors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) explanation: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QuoteRequest {
    pub(crate) lon: f64,
    pub(crate) lat: f64,
    #[serde(default)]
    pub(crate) year: Option<i32>,
    pub(crate) insured_value: f64,
}

#[derive(Debug, Serialize)]
pub(crate) struct QuoteResponse {
    pub(crate) risk_percent: u8,
    pub(crate) risk_band: RiskBand,
    pub(crate) estimated_payout: f64,
    pub(crate) metrics_percent: BTreeMap<Factor, f64>,
}

pub(crate) fn router() -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/risk/analyze", post(analyze_endpoint))
        .route("/api/v1/risk/quote", post(quote_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn analyze_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let (lon, lat) = validate_coords(payload.lon, payload.lat)?;
    info!(lon, lat, year = ?payload.year, "analyzing location");

    let raw = state.collector.collect(lon, lat, payload.year).await;
    let assessment = state.engine.assess(raw);
    let risk_band = RiskBand::from_percent(assessment.risk_percent);

    let explanation = if payload.include_explanation {
        let location = format!("({lat:.4}, {lon:.4})");
        match state.explainer.explain(&assessment, risk_band, &location).await {
            Ok(text) => Some(text),
            Err(err) => {
                warn!(error = %err, "explanation unavailable; returning score only");
                None
            }
        }
    } else {
        None
    };

    Ok(Json(AnalyzeResponse {
        risk_percent: assessment.risk_percent,
        risk_band,
        metrics_percent: assessment.metrics_percent,
        raw_factors: assessment.raw_factors,
        explanation,
    }))
}

pub(crate) async fn quote_endpoint(
    Extension(state): Extension<AppState>,
    Json(payload): Json<QuoteRequest>,
) -> Result<Json<QuoteResponse>, AppError> {
    let (lon, lat) = validate_coords(payload.lon, payload.lat)?;
    info!(lon, lat, insured_value = payload.insured_value, "quoting location");

    let raw = state.collector.collect(lon, lat, payload.year).await;
    let assessment = state.engine.assess(raw);
    let risk_band = RiskBand::from_percent(assessment.risk_percent);
    let estimated_payout = state.payouts.estimate(risk_band, payload.insured_value);

    Ok(Json(QuoteResponse {
        risk_percent: assessment.risk_percent,
        risk_band,
        estimated_payout,
        metrics_percent: assessment.metrics_percent,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::StaticHazardData;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use std::time::Duration;
    use terra_guard::advisory::TemplateExplainer;
    use terra_guard::providers::FactorCollector;
    use terra_guard::risk::{RawValue, RiskEngine};
    use terra_guard::underwriting::PayoutPolicy;

    fn test_state() -> AppState {
        let providers = StaticHazardData::monterrey().provider_set();
        AppState {
            readiness: Arc::new(AtomicBool::new(true)),
            metrics: Arc::new(PrometheusBuilder::new().build_recorder().handle()),
            collector: Arc::new(FactorCollector::new(providers, Duration::from_secs(5))),
            engine: Arc::new(RiskEngine::with_defaults()),
            explainer: Arc::new(TemplateExplainer),
            payouts: PayoutPolicy::default(),
        }
    }

    #[tokio::test]
    async fn analyze_endpoint_scores_the_sample_location() {
        let request = AnalyzeRequest {
            lon: -100.31,
            lat: 25.67,
            year: None,
            include_explanation: false,
        };

        let Json(body) = analyze_endpoint(Extension(test_state()), Json(request))
            .await
            .expect("assessment builds");

        assert_eq!(body.risk_percent, 27);
        assert_eq!(body.risk_band, RiskBand::Low);
        assert_eq!(body.metrics_percent.len(), 10);
        assert_eq!(body.raw_factors.elevation, RawValue::Number(540.0));
        assert!(body.explanation.is_none());
    }

    #[tokio::test]
    async fn analyze_endpoint_recovers_transposed_coordinates() {
        let straight = AnalyzeRequest {
            lon: -100.31,
            lat: 25.67,
            year: None,
            include_explanation: false,
        };
        let transposed = AnalyzeRequest {
            lon: 25.67,
            lat: -100.31,
            year: None,
            include_explanation: false,
        };

        let Json(expected) = analyze_endpoint(Extension(test_state()), Json(straight))
            .await
            .expect("assessment builds");
        let Json(recovered) = analyze_endpoint(Extension(test_state()), Json(transposed))
            .await
            .expect("swapped coordinates recover");

        assert_eq!(recovered.risk_percent, expected.risk_percent);
    }

    #[tokio::test]
    async fn analyze_endpoint_rejects_unusable_coordinates() {
        let request = AnalyzeRequest {
            lon: 500.0,
            lat: 300.0,
            year: None,
            include_explanation: false,
        };

        let err = analyze_endpoint(Extension(test_state()), Json(request))
            .await
            .expect_err("coordinates invalid in both orders");
        assert!(matches!(err, AppError::Coordinates(_)));
    }

    #[tokio::test]
    async fn analyze_endpoint_can_include_an_explanation() {
        let request = AnalyzeRequest {
            lon: -100.31,
            lat: 25.67,
            year: None,
            include_explanation: true,
        };

        let Json(body) = analyze_endpoint(Extension(test_state()), Json(request))
            .await
            .expect("assessment builds");

        let explanation = body.explanation.expect("template explainer always answers");
        assert!(explanation.contains("out of 100"));
    }

    #[tokio::test]
    async fn router_serves_health_and_readiness() {
        use axum::body::Body;
        use axum::http::Request;
        use tower::ServiceExt;

        let app = router().layer(Extension(test_state()));

        let health = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(health.status(), StatusCode::OK);

        let ready = app
            .oneshot(
                Request::builder()
                    .uri("/ready")
                    .body(Body::empty())
                    .expect("request builds"),
            )
            .await
            .expect("router responds");
        assert_eq!(ready.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn quote_endpoint_prices_from_the_band() {
        let request = QuoteRequest {
            lon: -100.31,
            lat: 25.67,
            year: None,
            insured_value: 10_000.0,
        };

        let Json(body) = quote_endpoint(Extension(test_state()), Json(request))
            .await
            .expect("quote builds");

        assert_eq!(body.risk_band, RiskBand::Low);
        assert_eq!(body.estimated_payout, 1_000.0);
    }
}
