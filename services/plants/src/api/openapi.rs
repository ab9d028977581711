//! OpenAPI schema aggregation for the plant service.
use crate::api::{
    plants, system,
    types::{ErrorResponse, HealthStatus, SystemInfo},
};
use crate::model::{Plant, PlantCreateRequest, PlantPatchRequest};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "plants-service",
        version = "v1",
        description = "Plant record HTTP API"
    ),
    paths(
        system::system_info,
        system::system_health,
        plants::list_plants,
        plants::create_plant,
        plants::get_plant,
        plants::patch_plant,
        plants::delete_plant
    ),
    components(schemas(
        SystemInfo,
        HealthStatus,
        ErrorResponse,
        Plant,
        PlantCreateRequest,
        PlantPatchRequest
    )),
    tags(
        (name = "system", description = "System and discovery endpoints"),
        (name = "plants", description = "Plant records")
    )
)]
pub struct ApiDoc;
