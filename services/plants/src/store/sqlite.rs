//! SQLite-backed implementation of the plant store.
//!
//! # Purpose
//! Single-file durable storage for local and small deployments. The schema lives in
//! `migrations/sqlite` and is applied on connect.
//!
//! # Concurrency model
//! - `sqlx::SqlitePool` hands each operation its own connection; the pool size is
//!   `DatabaseConfig::max_connections`.
//! - SQLite serializes writers itself. Patches are a single conditional `UPDATE`, so
//!   there is no read-then-write window to guard.
//! - `AUTOINCREMENT` keeps ids monotonic even after the highest row is deleted.
use super::{PlantRow, PlantStore, StoreResult, plant_not_found};
use crate::config::DatabaseConfig;
use crate::model::{DEFAULT_IN_STOCK, NewPlant, Plant, PlantPatchRequest};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Sqlite, SqlitePool, Transaction};
use std::str::FromStr;
use std::time::Duration;

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if needed) the database at `db.url` and apply migrations.
    ///
    /// # Errors
    /// - Invalid URL, unreachable file, or migration failure.
    pub async fn connect(db: &DatabaseConfig) -> StoreResult<Self> {
        let connect_options = SqliteConnectOptions::from_str(&db.url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(db.max_connections)
            .acquire_timeout(Duration::from_millis(db.acquire_timeout_ms))
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations/sqlite").run(&pool).await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plants")
            .fetch_one(&pool)
            .await?;
        metrics::gauge!("plants_total").set(total as f64);
        Ok(Self { pool })
    }
}

// Counted inside the write transaction so nothing fallible runs after commit.
async fn count_in_tx(tx: &mut Transaction<'_, Sqlite>) -> StoreResult<i64> {
    let total = sqlx::query_scalar("SELECT COUNT(*) FROM plants")
        .fetch_one(&mut **tx)
        .await?;
    Ok(total)
}

#[async_trait]
impl PlantStore for SqliteStore {
    async fn list_plants(&self) -> StoreResult<Vec<Plant>> {
        let rows = sqlx::query_as::<_, PlantRow>(
            "SELECT id, name, image, price, is_in_stock FROM plants ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Plant::from).collect())
    }

    async fn get_plant(&self, id: i64) -> StoreResult<Plant> {
        let row = sqlx::query_as::<_, PlantRow>(
            "SELECT id, name, image, price, is_in_stock FROM plants WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(Plant::from).ok_or_else(|| plant_not_found(id))
    }

    async fn create_plant(&self, plant: NewPlant) -> StoreResult<Plant> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, PlantRow>(
            r#"INSERT INTO plants (name, image, price, is_in_stock) VALUES (?1, ?2, ?3, ?4)
               RETURNING id, name, image, price, is_in_stock"#,
        )
        .bind(&plant.name)
        .bind(&plant.image)
        .bind(plant.price)
        .bind(DEFAULT_IN_STOCK)
        .fetch_one(&mut *tx)
        .await?;
        let total = count_in_tx(&mut tx).await?;
        tx.commit().await?;
        metrics::counter!("plant_changes_total", "op" => "created").increment(1);
        metrics::gauge!("plants_total").set(total as f64);
        Ok(row.into())
    }

    async fn patch_plant(&self, id: i64, patch: PlantPatchRequest) -> StoreResult<Plant> {
        let mut tx = self.pool.begin().await?;
        // A NULL flag keeps the stored value, so an empty patch just re-reads the row.
        let row = sqlx::query_as::<_, PlantRow>(
            r#"UPDATE plants SET is_in_stock = COALESCE(?1, is_in_stock) WHERE id = ?2
               RETURNING id, name, image, price, is_in_stock"#,
        )
        .bind(patch.is_in_stock)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let Some(row) = row else {
            return Err(plant_not_found(id));
        };
        tx.commit().await?;
        if patch.is_in_stock.is_some() {
            metrics::counter!("plant_changes_total", "op" => "updated").increment(1);
        }
        Ok(row.into())
    }

    async fn delete_plant(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM plants WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        if removed.rows_affected() == 0 {
            return Err(plant_not_found(id));
        }
        let total = count_in_tx(&mut tx).await?;
        tx.commit().await?;
        metrics::counter!("plant_changes_total", "op" => "deleted").increment(1);
        metrics::gauge!("plants_total").set(total as f64);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    fn is_durable(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "sqlite"
    }
}
