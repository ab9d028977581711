//! Plant service data model.
mod plant;

pub use plant::{
    DEFAULT_IN_STOCK, MissingField, NewPlant, Plant, PlantCreateRequest, PlantPatchRequest,
};
