//! Plant service HTTP application wiring.
//!
//! # Purpose
//! Builds the Axum router, configures middleware, and defines the shared
//! application state injected into handlers.
use crate::api;
use crate::api::openapi::ApiDoc;
use crate::observability;
use crate::store::PlantStore;
use axum::Router;
use axum::routing::get;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing_opentelemetry::OpenTelemetrySpanExt;
use utoipa::OpenApi;

/// State shared by every handler.
///
/// The store is the only stateful member; handlers never hold it across requests.
#[derive(Clone)]
pub struct AppState {
    pub service_name: String,
    pub api_version: String,
    pub store: Arc<dyn PlantStore + Send + Sync>,
}

impl AppState {
    pub fn new(store: Arc<dyn PlantStore + Send + Sync>) -> Self {
        Self {
            service_name: crate::SERVICE_NAME.to_string(),
            api_version: "v1".to_string(),
            store,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer =
        TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
            let parent = observability::trace_context_from_headers(request.headers());
            let span = tracing::info_span!(
                "http.request",
                method = %request.method(),
                uri = %request.uri(),
                version = ?request.version()
            );
            span.set_parent(parent);
            span
        });

    Router::new()
        .route(
            "/plants",
            get(api::plants::list_plants).post(api::plants::create_plant),
        )
        .route(
            "/plants/:id",
            get(api::plants::get_plant)
                .patch(api::plants::patch_plant)
                .delete(api::plants::delete_plant),
        )
        .route("/system/info", get(api::system::system_info))
        .route("/system/health", get(api::system::system_health))
        .merge(utoipa_swagger_ui::SwaggerUi::new("/docs").url("/openapi.json", ApiDoc::openapi()))
        .layer(trace_layer)
        .with_state(state)
}
