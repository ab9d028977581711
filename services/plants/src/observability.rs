//! Logging, tracing and metrics setup.
//!
//! `init_observability` installs the `tracing` subscriber and the Prometheus recorder
//! once per process; later calls return the existing metrics handle. Spans are
//! exported over OTLP only when `OTEL_EXPORTER_OTLP_ENDPOINT` is set.
use anyhow::Context;
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use opentelemetry::KeyValue;
use opentelemetry::propagation::{Extractor, TextMapPropagator};
use opentelemetry::trace::TracerProvider;
use opentelemetry_sdk::Resource;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::trace::SdkTracerProvider;
use std::future::Future;
use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

static TRACING_INIT: OnceLock<()> = OnceLock::new();
static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub fn init_observability(service_name: &str) -> anyhow::Result<PrometheusHandle> {
    TRACING_INIT.get_or_init(|| init_tracing(service_name));
    metrics_handle()
}

fn init_tracing(service_name: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let otel_layer = otlp_provider(service_name).map(|provider| {
        tracing_opentelemetry::layer().with_tracer(provider.tracer(service_name.to_string()))
    });
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(otel_layer)
        .try_init();
}

fn otlp_enabled() -> bool {
    std::env::var(OTLP_ENDPOINT_ENV).is_ok_and(|endpoint| !endpoint.trim().is_empty())
}

fn otlp_provider(service_name: &str) -> Option<SdkTracerProvider> {
    if !otlp_enabled() {
        return None;
    }
    // Runs before the subscriber exists, so a build failure just disables export.
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .build()
        .ok()?;
    // `Resource::builder` also picks up OTEL_RESOURCE_ATTRIBUTES.
    let resource = Resource::builder()
        .with_attribute(KeyValue::new("service.name", service_name.to_string()))
        .build();
    Some(
        SdkTracerProvider::builder()
            .with_batch_exporter(exporter)
            .with_resource(resource)
            .build(),
    )
}

/// Parent context from an incoming request's W3C `traceparent`/`tracestate` headers.
pub fn trace_context_from_headers(headers: &axum::http::HeaderMap) -> opentelemetry::Context {
    TraceContextPropagator::new().extract(&HeaderExtractor(headers))
}

struct HeaderExtractor<'a>(&'a axum::http::HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key)?.to_str().ok()
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|name| name.as_str()).collect()
    }
}

fn metrics_handle() -> anyhow::Result<PrometheusHandle> {
    if let Some(handle) = METRICS_HANDLE.get() {
        return Ok(handle.clone());
    }
    let handle = PrometheusBuilder::new()
        .install_recorder()
        .context("install metrics recorder")?;
    Ok(METRICS_HANDLE.get_or_init(|| handle).clone())
}

/// Serve `GET /metrics` on an already bound listener until `shutdown` resolves.
pub async fn serve_metrics<F>(
    handle: PrometheusHandle,
    listener: tokio::net::TcpListener,
    shutdown: F,
) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = axum::Router::new().route(
        "/metrics",
        axum::routing::get(move || std::future::ready(handle.render())),
    );
    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use opentelemetry::trace::{TraceContextExt, TraceId};
    use serial_test::serial;
    use std::net::SocketAddr;
    use std::time::Duration;
    use tokio::sync::oneshot;

    #[test]
    fn extractor_skips_non_utf8_values() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            "traceparent",
            axum::http::HeaderValue::from_bytes(b"\xFF").unwrap(),
        );
        headers.insert("tracestate", "congo=t61rcWkgMzE".parse().unwrap());
        let extractor = HeaderExtractor(&headers);
        assert!(extractor.get("traceparent").is_none());
        assert_eq!(extractor.get("tracestate"), Some("congo=t61rcWkgMzE"));
        assert!(extractor.get("baggage").is_none());
        assert!(extractor.keys().contains(&"tracestate"));
    }

    #[test]
    fn parent_context_comes_from_traceparent() {
        let mut headers = axum::http::HeaderMap::new();
        headers.insert(
            "traceparent",
            "00-4bf92f3577b34da6a3ce929d0e0e4736-00f067aa0ba902b7-01"
                .parse()
                .unwrap(),
        );
        let context = trace_context_from_headers(&headers);
        let span = context.span();
        let span_ctx = span.span_context();
        assert!(span_ctx.is_valid());
        assert!(span_ctx.is_remote());
        assert_eq!(
            span_ctx.trace_id(),
            TraceId::from_hex("4bf92f3577b34da6a3ce929d0e0e4736").unwrap()
        );
    }

    #[test]
    fn missing_traceparent_yields_empty_context() {
        let context = trace_context_from_headers(&axum::http::HeaderMap::new());
        assert!(!context.span().span_context().is_valid());
    }

    #[test]
    #[serial]
    fn otlp_export_requires_endpoint() {
        let prev = std::env::var(OTLP_ENDPOINT_ENV).ok();
        unsafe {
            std::env::remove_var(OTLP_ENDPOINT_ENV);
        }
        assert!(!otlp_enabled());
        assert!(otlp_provider("plants-test").is_none());
        unsafe {
            std::env::set_var(OTLP_ENDPOINT_ENV, "  ");
        }
        assert!(!otlp_enabled());
        unsafe {
            std::env::set_var(OTLP_ENDPOINT_ENV, "http://127.0.0.1:4317");
        }
        assert!(otlp_enabled());
        unsafe {
            match prev {
                Some(value) => std::env::set_var(OTLP_ENDPOINT_ENV, value),
                None => std::env::remove_var(OTLP_ENDPOINT_ENV),
            }
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn init_observability_is_idempotent() {
        let first = init_observability("plants-test").expect("first init");
        let second = init_observability("plants-test").expect("second init");
        metrics::counter!("plants_init_check_total").increment(1);
        assert!(first.render().contains("plants_init_check_total"));
        assert!(second.render().contains("plants_init_check_total"));
    }

    #[tokio::test(flavor = "multi_thread")]
    #[serial]
    async fn metrics_listener_serves_rendered_handle() {
        let handle = init_observability("plants-test").expect("init");
        metrics::gauge!("plants_total").set(3.0);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0".parse::<SocketAddr>().unwrap())
            .await
            .expect("bind listener");
        let addr = listener.local_addr().expect("local addr");
        let (stop_tx, stop_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(serve_metrics(handle, listener, async move {
            let _ = stop_rx.await;
        }));

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .no_proxy()
            .build()
            .expect("build test client");
        let body = client
            .get(format!("http://{addr}/metrics"))
            .send()
            .await
            .expect("GET /metrics")
            .error_for_status()
            .expect("metrics status")
            .text()
            .await
            .expect("metrics body");
        assert!(body.contains("plants_total"));

        let _ = stop_tx.send(());
        tokio::time::timeout(Duration::from_secs(1), server)
            .await
            .expect("server shutdown")
            .expect("join")
            .expect("serve");
    }
}
