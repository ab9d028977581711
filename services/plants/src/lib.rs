//! Plant record service library crate.
//!
//! # Purpose
//! Exposes the HTTP API, configuration, observability wiring, and storage
//! backends for use by the binary and tests.
pub mod api;
pub mod app;
pub mod config;
pub mod model;
pub mod observability;
pub mod store;

/// Name reported in logs, traces, and `/system/info`.
pub const SERVICE_NAME: &str = "plants-service";
