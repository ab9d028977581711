//! Plant records and request payloads.
//!
//! # Purpose
//! Defines the stored plant record, the validated creation input, and the
//! partial-update payload shared by the HTTP API and the store backends.
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;

/// Stock state assigned to every newly created plant.
pub const DEFAULT_IN_STOCK: bool = true;

/// A stored plant record.
///
/// `id` is assigned by the store on creation and never changes or gets reused.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, PartialEq)]
pub struct Plant {
    pub id: i64,
    pub name: String,
    pub image: String,
    pub price: f64,
    pub is_in_stock: bool,
}

/// Validated creation input; the store assigns `id` and the default stock state.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPlant {
    pub name: String,
    pub image: String,
    pub price: f64,
}

/// Raw `POST /plants` body.
///
/// Every field is optional at the serde level so that an absent key surfaces as
/// [`MissingField`] instead of a generic deserialization failure. Unknown keys,
/// including `is_in_stock`, are ignored.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
pub struct PlantCreateRequest {
    pub name: Option<String>,
    pub image: Option<String>,
    pub price: Option<f64>,
}

impl PlantCreateRequest {
    /// Checks required keys in `name`, `image`, `price` order.
    pub fn into_new_plant(self) -> Result<NewPlant, MissingField> {
        let name = self.name.ok_or(MissingField("name"))?;
        let image = self.image.ok_or(MissingField("image"))?;
        let price = self.price.ok_or(MissingField("price"))?;
        Ok(NewPlant { name, image, price })
    }
}

/// `PATCH /plants/{id}` body. Only `is_in_stock` is mutable; other keys are ignored.
#[derive(Debug, Serialize, Deserialize, ToSchema, Clone, Default)]
pub struct PlantPatchRequest {
    pub is_in_stock: Option<bool>,
}

impl PlantPatchRequest {
    pub fn apply(&self, plant: &mut Plant) {
        if let Some(is_in_stock) = self.is_in_stock {
            plant.is_in_stock = is_in_stock;
        }
    }
}

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[error("missing required field: {0}")]
pub struct MissingField(pub &'static str);

#[cfg(test)]
mod tests {
    use super::*;

    fn fern() -> Plant {
        Plant {
            id: 1,
            name: "Fern".to_string(),
            image: "fern.jpg".to_string(),
            price: 12.5,
            is_in_stock: true,
        }
    }

    #[test]
    fn create_request_reports_first_missing_field() {
        let err = PlantCreateRequest::default()
            .into_new_plant()
            .expect_err("empty body");
        assert_eq!(err, MissingField("name"));

        let err = PlantCreateRequest {
            name: Some("Fern".to_string()),
            image: None,
            price: Some(12.5),
        }
        .into_new_plant()
        .expect_err("no image");
        assert_eq!(err.to_string(), "missing required field: image");

        let err = PlantCreateRequest {
            name: Some("Fern".to_string()),
            image: Some("fern.jpg".to_string()),
            price: None,
        }
        .into_new_plant()
        .expect_err("no price");
        assert_eq!(err, MissingField("price"));
    }

    #[test]
    fn create_request_ignores_stock_flag() {
        let body: PlantCreateRequest = serde_json::from_value(serde_json::json!({
            "name": "Fern",
            "image": "fern.jpg",
            "price": 12.5,
            "is_in_stock": false
        }))
        .expect("parse");
        let plant = body.into_new_plant().expect("valid");
        assert_eq!(
            plant,
            NewPlant {
                name: "Fern".to_string(),
                image: "fern.jpg".to_string(),
                price: 12.5,
            }
        );
    }

    #[test]
    fn patch_only_touches_stock_flag() {
        let mut plant = fern();
        let patch: PlantPatchRequest = serde_json::from_value(serde_json::json!({
            "is_in_stock": false,
            "name": "Renamed",
            "price": 99.0
        }))
        .expect("parse");
        patch.apply(&mut plant);
        assert!(!plant.is_in_stock);
        assert_eq!(plant.name, "Fern");
        assert_eq!(plant.price, 12.5);

        let before = plant.clone();
        PlantPatchRequest::default().apply(&mut plant);
        assert_eq!(plant, before);
    }

    #[test]
    fn plant_serializes_with_flat_field_set() {
        let value = serde_json::to_value(fern()).expect("json");
        assert_eq!(
            value,
            serde_json::json!({
                "id": 1,
                "name": "Fern",
                "image": "fern.jpg",
                "price": 12.5,
                "is_in_stock": true
            })
        );
    }
}
