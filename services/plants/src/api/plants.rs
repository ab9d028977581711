//! Plant API handlers.
//!
//! # Purpose
//! Implements list, fetch, create, partial update, and delete for plant records.
//! Each handler performs one store call and maps `StoreError` onto HTTP responses.
use crate::api::error::{ApiError, api_internal, api_plant_error};
use crate::api::{json_body, plant_id};
use crate::app::AppState;
use crate::model::{Plant, PlantCreateRequest, PlantPatchRequest};
use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

#[utoipa::path(
    get,
    path = "/plants",
    tag = "plants",
    responses(
        (status = 200, description = "Every stored plant, ordered by id", body = [Plant])
    )
)]
pub(crate) async fn list_plants(
    State(state): State<AppState>,
) -> Result<Json<Vec<Plant>>, ApiError> {
    let items = state
        .store
        .list_plants()
        .await
        .map_err(|err| api_internal("failed to list plants", &err))?;
    Ok(Json(items))
}

#[utoipa::path(
    post,
    path = "/plants",
    tag = "plants",
    request_body = PlantCreateRequest,
    responses(
        (status = 201, description = "Plant created", body = Plant),
        (status = 400, description = "Missing or malformed field", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn create_plant(
    State(state): State<AppState>,
    body: Result<Json<PlantCreateRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let new_plant = json_body(body)?.into_new_plant()?;
    let created = state
        .store
        .create_plant(new_plant)
        .await
        .map_err(|err| api_internal("failed to create plant", &err))?;
    tracing::debug!(plant_id = created.id, "plant created");
    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/plants/{id}",
    tag = "plants",
    params(
        ("id" = i64, Path, description = "Plant identifier")
    ),
    responses(
        (status = 200, description = "Fetch plant", body = Plant),
        (status = 404, description = "Plant not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn get_plant(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<Plant>, ApiError> {
    let id = plant_id(path)?;
    match state.store.get_plant(id).await {
        Ok(plant) => Ok(Json(plant)),
        Err(err) => Err(api_plant_error(err, "failed to fetch plant")),
    }
}

#[utoipa::path(
    patch,
    path = "/plants/{id}",
    tag = "plants",
    params(
        ("id" = i64, Path, description = "Plant identifier")
    ),
    request_body = PlantPatchRequest,
    responses(
        (status = 200, description = "Plant after the update", body = Plant),
        (status = 400, description = "Malformed body", body = crate::api::types::ErrorResponse),
        (status = 404, description = "Plant not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn patch_plant(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
    body: Result<Json<PlantPatchRequest>, JsonRejection>,
) -> Result<Json<Plant>, ApiError> {
    let id = plant_id(path)?;
    let patch = json_body(body)?;
    match state.store.patch_plant(id, patch).await {
        Ok(updated) => Ok(Json(updated)),
        Err(err) => Err(api_plant_error(err, "failed to update plant")),
    }
}

#[utoipa::path(
    delete,
    path = "/plants/{id}",
    tag = "plants",
    params(
        ("id" = i64, Path, description = "Plant identifier")
    ),
    responses(
        (status = 204, description = "Plant deleted"),
        (status = 404, description = "Plant not found", body = crate::api::types::ErrorResponse)
    )
)]
pub(crate) async fn delete_plant(
    path: Result<Path<i64>, PathRejection>,
    State(state): State<AppState>,
) -> Result<StatusCode, ApiError> {
    let id = plant_id(path)?;
    match state.store.delete_plant(id).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(err) => Err(api_plant_error(err, "failed to delete plant")),
    }
}
