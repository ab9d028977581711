//! Plant storage abstraction and backends.
//!
//! # Purpose
//! Defines the `PlantStore` trait that handlers depend on, the shared error type,
//! and the row mapping used by the SQL backends.
//!
//! # Notes
//! Each call is self-contained: SQL backends acquire a pooled connection or open a
//! transaction for the duration of one operation and release it on every exit path.
use crate::model::{NewPlant, Plant, PlantPatchRequest};
use async_trait::async_trait;
use sqlx::FromRow;
use thiserror::Error;

pub mod memory;
pub mod postgres;
pub mod sqlite;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Unexpected(err.into())
    }
}

impl From<sqlx::migrate::MigrateError> for StoreError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        StoreError::Unexpected(err.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait PlantStore: Send + Sync {
    /// All stored plants in ascending `id` order.
    async fn list_plants(&self) -> StoreResult<Vec<Plant>>;
    async fn get_plant(&self, id: i64) -> StoreResult<Plant>;
    async fn create_plant(&self, plant: NewPlant) -> StoreResult<Plant>;
    async fn patch_plant(&self, id: i64, patch: PlantPatchRequest) -> StoreResult<Plant>;
    async fn delete_plant(&self, id: i64) -> StoreResult<()>;

    async fn health_check(&self) -> StoreResult<()>;
    fn is_durable(&self) -> bool;
    fn backend_name(&self) -> &'static str;
}

pub(crate) fn plant_not_found(id: i64) -> StoreError {
    StoreError::NotFound(format!("plant {id}"))
}

/// Row shape of the `plants` table, shared by the SQLite and Postgres backends.
#[derive(Debug, Clone, FromRow)]
pub(crate) struct PlantRow {
    id: i64,
    name: String,
    image: String,
    price: f64,
    is_in_stock: bool,
}

impl From<PlantRow> for Plant {
    fn from(row: PlantRow) -> Self {
        Plant {
            id: row.id,
            name: row.name,
            image: row.image,
            price: row.price,
            is_in_stock: row.is_in_stock,
        }
    }
}
