//! Postgres-backed implementation of the plant store.
//!
//! # Key invariants
//! - `plants.id` is an identity column; Postgres never hands out the same value twice.
//! - Every mutation runs in its own transaction. Dropping the transaction on an early
//!   return rolls it back.
//!
//! # Concurrency model
//! - The store is shared across async handlers; `sqlx::PgPool` manages connections.
//! - Patches lock the row with `SELECT ... FOR UPDATE`, so concurrent patches of one
//!   plant commit one after another (last commit wins).
//!
//! # Operational notes
//! - Migrations in `migrations/postgres` run at connect, before any request is served.
//! - Database URLs may contain credentials; never log `DatabaseConfig::url`.
use super::{PlantRow, PlantStore, StoreResult, plant_not_found};
use crate::config::DatabaseConfig;
use crate::model::{DEFAULT_IN_STOCK, NewPlant, Plant, PlantPatchRequest};
use async_trait::async_trait;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use sqlx::{PgPool, Postgres, Transaction};
use std::str::FromStr;
use std::time::Duration;

/// Durable plant store backed by Postgres.
///
/// # Example
/// ```rust,no_run
/// use plants::config::DatabaseConfig;
/// use plants::store::postgres::PostgresStore;
///
/// async fn open(db: DatabaseConfig) {
///     let _ = PostgresStore::connect(&db).await;
/// }
/// ```
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Connect to Postgres and apply embedded migrations.
    ///
    /// # Errors
    /// - Connection, pool setup, or migration failures.
    pub async fn connect(db: &DatabaseConfig) -> StoreResult<Self> {
        // `acquire_timeout` bounds how long a request waits for a pooled connection.
        let connect_options = PgConnectOptions::from_str(&db.url)?;
        let pool = PgPoolOptions::new()
            .max_connections(db.max_connections)
            .acquire_timeout(Duration::from_millis(db.acquire_timeout_ms))
            .connect_with(connect_options)
            .await?;
        sqlx::migrate!("./migrations/postgres").run(&pool).await?;
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plants")
            .fetch_one(&pool)
            .await?;
        metrics::gauge!("plants_total").set(total as f64);
        Ok(Self { pool })
    }

    #[cfg(feature = "pg-tests")]
    pub async fn truncate_for_tests(&self) -> StoreResult<()> {
        sqlx::query("TRUNCATE plants RESTART IDENTITY")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

async fn count_in_tx(tx: &mut Transaction<'_, Postgres>) -> StoreResult<i64> {
    let total = sqlx::query_scalar("SELECT COUNT(*) FROM plants")
        .fetch_one(&mut **tx)
        .await?;
    Ok(total)
}

#[async_trait]
impl PlantStore for PostgresStore {
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
            "SELECT id, name, image, price, is_in_stock FROM plants WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        match row {
            Some(row) => Ok(row.into()),
            None => Err(plant_not_found(id)),
        }
    }

    async fn create_plant(&self, plant: NewPlant) -> StoreResult<Plant> {
        let mut tx = self.pool.begin().await?;
        let row = sqlx::query_as::<_, PlantRow>(
            r#"INSERT INTO plants (name, image, price, is_in_stock) VALUES ($1, $2, $3, $4)
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
        let current = sqlx::query_as::<_, PlantRow>(
            "SELECT id, name, image, price, is_in_stock FROM plants WHERE id = $1 FOR UPDATE",
        )
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let mut updated: Plant = match current {
            Some(row) => row.into(),
            None => return Err(plant_not_found(id)),
        };
        // Nothing to write; dropping the transaction releases the row lock.
        if patch.is_in_stock.is_none() {
            return Ok(updated);
        }
        patch.apply(&mut updated);

        sqlx::query("UPDATE plants SET is_in_stock = $1, updated_at = now() WHERE id = $2")
            .bind(updated.is_in_stock)
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        metrics::counter!("plant_changes_total", "op" => "updated").increment(1);
        Ok(updated)
    }

    async fn delete_plant(&self, id: i64) -> StoreResult<()> {
        let mut tx = self.pool.begin().await?;
        let removed = sqlx::query("DELETE FROM plants WHERE id = $1")
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
        "postgres"
    }
}
