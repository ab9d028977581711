#![allow(dead_code)]

use axum::body::Body;
use axum::http::Request;
use plants::app::{AppState, build_router};
use plants::store::PlantStore;
use plants::store::memory::InMemoryStore;
use std::sync::Arc;

pub type TestApp = axum::routing::RouterIntoService<Body, ()>;

pub fn app_with_store(store: Arc<dyn PlantStore + Send + Sync>) -> TestApp {
    build_router(AppState::new(store)).into_service()
}

pub fn memory_app() -> TestApp {
    app_with_store(Arc::new(InMemoryStore::new()))
}

pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub async fn read_bytes(response: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body")
        .to_vec()
}

pub async fn read_json(response: axum::response::Response) -> serde_json::Value {
    serde_json::from_slice(&read_bytes(response).await).expect("json")
}
