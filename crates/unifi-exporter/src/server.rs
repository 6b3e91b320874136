//! HTTP surface: the metrics endpoint and a redirect from `/` to it.
//!
//! Every request to the metrics path runs one scrape. A scrape that fails
//! as a whole still answers 200 with the exporter's own metrics
//! (`unifi_up 0`), so Prometheus records the failure instead of a gap.

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

use unifi_exporter_core::{Collector, ExporterMetrics, exposition};

/// Header Prometheus sends with its own scrape timeout.
const SCRAPE_TIMEOUT_HEADER: &str = "x-prometheus-scrape-timeout-seconds";

/// Shared state handed to every request.
#[derive(Clone)]
pub struct AppState {
    collector: Arc<Collector>,
    metrics: Arc<ExporterMetrics>,
}

impl AppState {
    pub fn new(collector: Arc<Collector>, metrics: Arc<ExporterMetrics>) -> Self {
        Self { collector, metrics }
    }
}

pub fn router(state: AppState, metrics_path: &str) -> Router {
    let target = metrics_path.to_owned();
    Router::new()
        .route(metrics_path, get(metrics))
        .route(
            "/",
            get(move || async move { (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, target)]) }),
        )
        .with_state(state)
}

/// Serve until Ctrl-C.
pub async fn serve(listener: TcpListener, app: Router) -> std::io::Result<()> {
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl-C; serving until killed");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn metrics(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let budget = scrape_budget(&headers, state.collector.scrape_timeout());

    let started = Instant::now();
    let outcome = state.collector.scrape_within(budget).await;
    let elapsed = started.elapsed();

    if let Err(ref err) = outcome {
        warn!(error = %err, ?elapsed, "scrape failed");
    }
    state.metrics.observe(&outcome, elapsed);

    match state
        .metrics
        .render(&outcome, state.collector.session().login_count())
    {
        Ok(body) => ([(header::CONTENT_TYPE, exposition::CONTENT_TYPE)], body).into_response(),
        Err(err) => {
            error!(error = %err, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
        }
    }
}

/// The configured budget, lowered to Prometheus' own timeout when it is
/// smaller.
fn scrape_budget(headers: &HeaderMap, configured: Duration) -> Duration {
    headers
        .get(SCRAPE_TIMEOUT_HEADER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<f64>().ok())
        .filter(|secs| *secs > 0.0)
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok())
        .map_or(configured, |requested| requested.min(configured))
}

#[cfg(test)]
mod tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{HeaderValue, Request};
    use pretty_assertions::assert_eq;
    use secrecy::SecretString;
    use serde_json::json;
    use tower::ServiceExt;
    use url::Url;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use unifi_exporter_api::ControllerPlatform;
    use unifi_exporter_core::{ControllerConfig, PlatformChoice, SessionProvider, Site};

    use super::*;

    fn app(server: &MockServer) -> Router {
        let url = Url::parse(&server.uri()).expect("mock url");
        let mut config =
            ControllerConfig::new(url, "admin", SecretString::from("password".to_string()));
        config.platform = PlatformChoice::Fixed(ControllerPlatform::ClassicController);

        let session = Arc::new(SessionProvider::new(config));
        let site = Site {
            id: "1".into(),
            name: "default".into(),
            description: "Home".into(),
        };
        let collector = Arc::new(Collector::new(session, vec![site], Duration::from_secs(5)));
        let metrics = Arc::new(ExporterMetrics::new().expect("metrics"));
        router(AppState::new(collector, metrics), "/metrics")
    }

    async fn body_text(response: Response) -> String {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        String::from_utf8(bytes.to_vec()).expect("utf-8")
    }

    #[tokio::test]
    async fn root_redirects_to_metrics() {
        let server = MockServer::start().await;
        let response = app(&server)
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::MOVED_PERMANENTLY);
        assert_eq!(
            response.headers().get(header::LOCATION),
            Some(&HeaderValue::from_static("/metrics"))
        );
    }

    #[tokio::test]
    async fn metrics_endpoint_runs_a_scrape() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/s/default/stat/device"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "meta": { "rc": "ok" },
                "data": [{ "_id": "sw1", "mac": "aa:bb", "type": "usw", "name": "Core", "uptime": 60 }]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/s/default/stat/sta"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "meta": { "rc": "ok" }, "data": [] })),
            )
            .mount(&server)
            .await;

        let response = app(&server)
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE),
            Some(&HeaderValue::from_static(exposition::CONTENT_TYPE))
        );
        let text = body_text(response).await;
        assert!(text.contains("unifi_up 1"), "{text}");
        assert!(text.contains("unifi_switch_uptime_seconds{"), "{text}");
        assert!(text.contains("unifi_site_up{site=\"Home\"} 1"), "{text}");
    }

    #[tokio::test]
    async fn failed_login_is_reported_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/login"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let response = app(&server)
            .oneshot(Request::get("/metrics").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let text = body_text(response).await;
        assert!(text.contains("unifi_up 0"), "{text}");
        assert!(text.contains("unifi_scrape_errors_total{reason=\"auth\"} 1"), "{text}");
        assert!(!text.contains("unifi_site_up"), "{text}");
    }

    #[test]
    fn scrape_budget_honours_smaller_prometheus_timeout() {
        let configured = Duration::from_secs(10);
        let mut headers = HeaderMap::new();
        assert_eq!(scrape_budget(&headers, configured), configured);

        headers.insert(SCRAPE_TIMEOUT_HEADER, HeaderValue::from_static("4.5"));
        assert_eq!(scrape_budget(&headers, configured), Duration::from_millis(4500));

        headers.insert(SCRAPE_TIMEOUT_HEADER, HeaderValue::from_static("30"));
        assert_eq!(scrape_budget(&headers, configured), configured);

        for junk in ["-1", "0", "soon", "1e300"] {
            headers.insert(SCRAPE_TIMEOUT_HEADER, HeaderValue::from_static(junk));
            assert_eq!(scrape_budget(&headers, configured), configured, "{junk}");
        }
    }
}
