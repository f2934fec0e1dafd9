use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::error::AppResult;
use crate::handlers::common::{page_bounds, validate_optional, validate_required};
use crate::middlewares::AuthUser;
use crate::models::{CreateLocation, Location, LocationFilter, UpdateLocation};
use crate::repositories::{LocationRepository, Repository};
use crate::services::LocationService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateLocationRequest {
    pub region_name: String,
    pub department_name: String,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateLocationRequest {
    pub region_name: Option<String>,
    pub department_name: Option<String>,
    pub notes: Option<String>,
}

/// Find-or-create by name pair
#[derive(Debug, Deserialize, ToSchema)]
pub struct ResolveLocationRequest {
    pub department_name: String,
    pub region_name: String,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct LocationQuery {
    /// Substring match, case-insensitive
    pub region_name: Option<String>,
    /// Substring match, case-insensitive
    pub department_name: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationResponse {
    pub location_id: i32,
    pub region_name: String,
    pub department_name: String,
    pub display_name: String,
    pub notes: Option<String>,
    #[schema(value_type = String)]
    pub created_at: time::OffsetDateTime,
    #[schema(value_type = String)]
    pub updated_at: time::OffsetDateTime,
}

impl From<Location> for LocationResponse {
    fn from(l: Location) -> Self {
        Self {
            display_name: l.display_name(),
            location_id: l.location_id,
            region_name: l.region_name,
            department_name: l.department_name,
            notes: l.notes,
            created_at: l.created_at,
            updated_at: l.updated_at,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationListResponse {
    pub data: Vec<LocationResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

// ============ Handlers ============

/// List locations
#[utoipa::path(
    get,
    path = "/api/locations",
    params(LocationQuery),
    responses(
        (status = 200, description = "List of locations", body = LocationListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Locations"
)]
pub async fn list_locations(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<LocationQuery>,
) -> AppResult<Json<LocationListResponse>> {
    let (limit, offset) = page_bounds(params.limit, params.offset);
    let filter = LocationFilter {
        region_name: params.region_name,
        department_name: params.department_name,
    };

    let locations = LocationRepository::list(&state.db, &filter, limit, offset).await?;
    let total = LocationRepository::count_filtered(&state.db, &filter).await?;

    Ok(Json(LocationListResponse {
        data: locations.into_iter().map(|l| l.into()).collect(),
        total,
        limit,
        offset,
    }))
}

/// Get a location by ID
#[utoipa::path(
    get,
    path = "/api/locations/{id}",
    params(
        ("id" = i32, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Location details", body = LocationResponse),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Location not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Locations"
)]
pub async fn get_location(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<LocationResponse>> {
    let location = LocationRepository::find_by_id(&state.db, id).await?;
    Ok(Json(location.into()))
}

/// Create a location
#[utoipa::path(
    post,
    path = "/api/locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 200, description = "Location created", body = LocationResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Viewers cannot create locations"),
        (status = 409, description = "Location already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Locations"
)]
pub async fn create_location(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateLocationRequest>,
) -> AppResult<Json<LocationResponse>> {
    user.require_writer()?;
    validate_optional(&payload.notes, "Notes", 1000)?;

    let input = CreateLocation {
        region_name: payload.region_name.trim().to_string(),
        department_name: payload.department_name.trim().to_string(),
        notes: payload.notes,
    };
    LocationService::validate_new(&input)?;

    let location = LocationRepository::create(&state.db, &input).await?;
    tracing::info!(location_id = location.location_id, "Created location");

    Ok(Json(location.into()))
}

/// Find a location by department and region, creating it when missing
#[utoipa::path(
    post,
    path = "/api/locations/resolve",
    request_body = ResolveLocationRequest,
    responses(
        (status = 200, description = "Existing or newly created location", body = LocationResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Viewers cannot create locations")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Locations"
)]
pub async fn resolve_location(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ResolveLocationRequest>,
) -> AppResult<Json<LocationResponse>> {
    user.require_writer()?;

    let location =
        LocationService::find_or_create(&state.db, &payload.department_name, &payload.region_name)
            .await?;

    Ok(Json(location.into()))
}

/// Update a location
#[utoipa::path(
    put,
    path = "/api/locations/{id}",
    params(
        ("id" = i32, Path, description = "Location ID")
    ),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Location updated", body = LocationResponse),
        (status = 403, description = "Viewers cannot edit locations"),
        (status = 404, description = "Location not found"),
        (status = 409, description = "Another location has the same names")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Locations"
)]
pub async fn update_location(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateLocationRequest>,
) -> AppResult<Json<LocationResponse>> {
    user.require_writer()?;
    if let Some(region) = &payload.region_name {
        validate_required(region, "Region name", 100)?;
    }
    if let Some(department) = &payload.department_name {
        validate_required(department, "Department name", 100)?;
    }
    validate_optional(&payload.notes, "Notes", 1000)?;

    let input = UpdateLocation {
        region_name: payload.region_name.map(|r| r.trim().to_string()),
        department_name: payload.department_name.map(|d| d.trim().to_string()),
        notes: payload.notes,
    };

    let location = LocationRepository::update(&state.db, id, &input).await?;
    Ok(Json(location.into()))
}

/// Delete a location
#[utoipa::path(
    delete,
    path = "/api/locations/{id}",
    params(
        ("id" = i32, Path, description = "Location ID")
    ),
    responses(
        (status = 200, description = "Location deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Location not found"),
        (status = 409, description = "Location still holds assets")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Locations"
)]
pub async fn delete_location(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<()> {
    user.require_admin()?;
    LocationRepository::delete(&state.db, id).await?;
    tracing::info!(location_id = id, "Deleted location");
    Ok(())
}
