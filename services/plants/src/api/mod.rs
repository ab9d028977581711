//! Plant service HTTP API module.
//!
//! # Purpose
//! Exposes route handler modules plus the shared helpers that turn extractor
//! rejections into the service's JSON error shape.
pub mod error;
pub mod openapi;
pub mod plants;
pub mod system;
pub mod types;

use crate::api::error::{ApiError, api_validation_error};
use axum::Json;
use axum::extract::Path;
use axum::extract::rejection::{JsonRejection, PathRejection};

pub(crate) fn plant_id(path: Result<Path<i64>, PathRejection>) -> Result<i64, ApiError> {
    let Path(id) = path.map_err(|rejection| api_validation_error(&rejection.body_text()))?;
    Ok(id)
}

pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    let Json(value) = body.map_err(|rejection| api_validation_error(&rejection.body_text()))?;
    Ok(value)
}
