//! In-memory implementation of the plant store.
//!
//! # Purpose
//! Keeps plants in a `BTreeMap` guarded by `tokio::sync::RwLock`. Used by tests and
//! by deployments that do not need durability.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - Mutations take the write lock for their whole read-modify-write, so concurrent
//!   patches of one plant are applied in lock order (last writer wins).
use super::{PlantStore, StoreResult, plant_not_found};
use crate::model::{DEFAULT_IN_STOCK, NewPlant, Plant, PlantPatchRequest};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Plant rows plus the id sequence.
///
/// `next_id` only moves forward, so ids of deleted plants are never handed out again.
#[derive(Debug)]
struct PlantTable {
    next_id: i64,
    rows: BTreeMap<i64, Plant>,
}

impl PlantTable {
    fn new() -> Self {
        Self {
            next_id: 1,
            rows: BTreeMap::new(),
        }
    }

    fn insert(&mut self, plant: NewPlant) -> Plant {
        let id = self.next_id;
        self.next_id += 1;
        let plant = Plant {
            id,
            name: plant.name,
            image: plant.image,
            price: plant.price,
            is_in_stock: DEFAULT_IN_STOCK,
        };
        self.rows.insert(id, plant.clone());
        plant
    }
}

#[derive(Clone)]
pub struct InMemoryStore {
    table: Arc<RwLock<PlantTable>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            table: Arc::new(RwLock::new(PlantTable::new())),
        }
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PlantStore for InMemoryStore {
    async fn list_plants(&self) -> StoreResult<Vec<Plant>> {
        Ok(self.table.read().await.rows.values().cloned().collect())
    }

    async fn get_plant(&self, id: i64) -> StoreResult<Plant> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| plant_not_found(id))
    }

    async fn create_plant(&self, plant: NewPlant) -> StoreResult<Plant> {
        let mut table = self.table.write().await;
        let created = table.insert(plant);
        metrics::counter!("plant_changes_total", "op" => "created").increment(1);
        metrics::gauge!("plants_total").set(table.rows.len() as f64);
        Ok(created)
    }

    async fn patch_plant(&self, id: i64, patch: PlantPatchRequest) -> StoreResult<Plant> {
        let mut table = self.table.write().await;
        let plant = table.rows.get_mut(&id).ok_or_else(|| plant_not_found(id))?;
        patch.apply(plant);
        if patch.is_in_stock.is_some() {
            metrics::counter!("plant_changes_total", "op" => "updated").increment(1);
        }
        Ok(plant.clone())
    }

    async fn delete_plant(&self, id: i64) -> StoreResult<()> {
        let mut table = self.table.write().await;
        if table.rows.remove(&id).is_none() {
            return Err(plant_not_found(id));
        }
        metrics::counter!("plant_changes_total", "op" => "deleted").increment(1);
        metrics::gauge!("plants_total").set(table.rows.len() as f64);
        Ok(())
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }

    fn is_durable(&self) -> bool {
        false
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
