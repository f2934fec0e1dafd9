use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};

use crate::entity::sea_orm_active_enums::{AssetCondition, IndividualStatus};
use crate::error::{AppError, AppResult};
use crate::handlers::common::{
    page_bounds, validate_optional, validate_required, LocationSummary, MovementListResponse,
    MovementResponse, PaginationParams, PersonSummary,
};
use crate::middlewares::AuthUser;
use crate::models::{AssetKind, CreateUniqueAsset, UniqueAssetFilter, UpdateUniqueAsset};
use crate::repositories::MovementRepository;
use crate::services::{AssetView, UniqueAssetService};
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUniqueAssetRequest {
    pub name: String,
    pub serial_number: String,
    pub location_id: i32,
    pub keeper_payroll_number: Option<String>,
    /// Defaults to `available`
    pub status: Option<IndividualStatus>,
    pub model_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUniqueAssetRequest {
    pub name: Option<String>,
    pub serial_number: Option<String>,
    pub model_number: Option<String>,
    pub notes: Option<String>,
    pub status: Option<IndividualStatus>,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UniqueAssetQuery {
    /// Matches name, serial number or model number
    pub search: Option<String>,
    pub status: Option<IndividualStatus>,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CurrentAssignmentResponse {
    pub assignment_id: i32,
    pub assigned_to: PersonSummary,
    #[schema(value_type = String)]
    pub date_issued: OffsetDateTime,
    pub condition_issued: AssetCondition,
    pub days_since_issued: i64,
    pub is_overdue: bool,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UniqueAssetResponse {
    pub asset_id: i32,
    pub name: String,
    pub serial_number: String,
    pub model_number: Option<String>,
    pub notes: Option<String>,
    pub status: IndividualStatus,
    pub location: Option<LocationSummary>,
    pub keeper: Option<PersonSummary>,
    pub current_assignment: Option<CurrentAssignmentResponse>,
    pub latest_movement: Option<MovementResponse>,
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
    #[schema(value_type = String)]
    pub updated_at: OffsetDateTime,
}

impl UniqueAssetResponse {
    fn from_view(
        view: AssetView,
        now: OffsetDateTime,
        overdue_after_days: i64,
    ) -> AppResult<Self> {
        let (serial_number, status) = match view.asset.kind {
            AssetKind::Unique {
                serial_number,
                status,
            } => (serial_number, status),
            AssetKind::Bulk(_) => {
                return Err(AppError::NotFound(format!(
                    "Unique asset {}",
                    view.asset.asset_id
                )))
            }
        };

        let assignee = view.assignee;
        let current_assignment = view.current_assignment.map(|a| CurrentAssignmentResponse {
            assignment_id: a.assignment_id,
            days_since_issued: a.days_since_issued(now),
            is_overdue: a.is_overdue(now, overdue_after_days),
            assigned_to: match assignee {
                Some(user) => user.into(),
                None => PersonSummary {
                    payroll_number: a.assigned_to.clone(),
                    name: String::new(),
                },
            },
            date_issued: a.date_issued,
            condition_issued: a.condition_issued,
        });

        Ok(Self {
            asset_id: view.asset.asset_id,
            name: view.asset.name,
            serial_number,
            model_number: view.asset.model_number,
            notes: view.asset.notes,
            status,
            location: view.location.map(Into::into),
            keeper: view.keeper.map(Into::into),
            current_assignment,
            latest_movement: view.latest_movement.map(Into::into),
            created_at: view.asset.created_at,
            updated_at: view.asset.updated_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UniqueAssetListResponse {
    pub data: Vec<UniqueAssetResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

// ============ Handlers ============

/// Register a serialised asset
#[utoipa::path(
    post,
    path = "/api/unique-assets",
    request_body = CreateUniqueAssetRequest,
    responses(
        (status = 200, description = "Unique asset created", body = UniqueAssetResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Viewers cannot create assets"),
        (status = 409, description = "Serial number already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Unique Assets"
)]
pub async fn create_unique_asset(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateUniqueAssetRequest>,
) -> AppResult<Json<UniqueAssetResponse>> {
    user.require_writer()?;
    validate_required(&payload.name, "Name", 200)?;
    validate_required(&payload.serial_number, "Serial number", 100)?;
    validate_optional(&payload.model_number, "Model number", 100)?;
    validate_optional(&payload.notes, "Notes", 1000)?;

    let input = CreateUniqueAsset {
        name: payload.name,
        serial_number: payload.serial_number,
        location_id: payload.location_id,
        keeper_payroll_number: payload.keeper_payroll_number,
        status: payload.status,
        model_number: payload.model_number,
        notes: payload.notes,
    };

    let asset = UniqueAssetService::create(&state.db, input, &user.payroll_number).await?;
    let view = UniqueAssetService::get_view(&state.db, asset.asset_id).await?;
    Ok(Json(UniqueAssetResponse::from_view(
        view,
        OffsetDateTime::now_utc(),
        state.config.overdue_after_days,
    )?))
}

/// Tracking list of serialised assets
#[utoipa::path(
    get,
    path = "/api/unique-assets",
    params(UniqueAssetQuery),
    responses(
        (status = 200, description = "Unique assets with location, keeper and assignment", body = UniqueAssetListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Unique Assets"
)]
pub async fn list_unique_assets(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UniqueAssetQuery>,
) -> AppResult<Json<UniqueAssetListResponse>> {
    let (limit, offset) = page_bounds(params.limit, params.offset);
    let filter = UniqueAssetFilter {
        search: params.search,
        status: params.status,
        location_id: params.location_id,
        keeper_payroll_number: params.keeper_payroll_number,
    };

    let (views, total) = UniqueAssetService::list(&state.db, &filter, limit, offset).await?;

    let now = OffsetDateTime::now_utc();
    let overdue_after_days = state.config.overdue_after_days;
    let data = views
        .into_iter()
        .map(|v| UniqueAssetResponse::from_view(v, now, overdue_after_days))
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(UniqueAssetListResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// Get a unique asset by ID
#[utoipa::path(
    get,
    path = "/api/unique-assets/{id}",
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Unique asset details", body = UniqueAssetResponse),
        (status = 404, description = "Unique asset not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Unique Assets"
)]
pub async fn get_unique_asset(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<UniqueAssetResponse>> {
    let view = UniqueAssetService::get_view(&state.db, id).await?;
    Ok(Json(UniqueAssetResponse::from_view(
        view,
        OffsetDateTime::now_utc(),
        state.config.overdue_after_days,
    )?))
}

/// Update a unique asset
#[utoipa::path(
    put,
    path = "/api/unique-assets/{id}",
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    request_body = UpdateUniqueAssetRequest,
    responses(
        (status = 200, description = "Unique asset updated", body = UniqueAssetResponse),
        (status = 403, description = "Viewers cannot edit assets"),
        (status = 404, description = "Unique asset not found"),
        (status = 409, description = "Serial number already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Unique Assets"
)]
pub async fn update_unique_asset(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateUniqueAssetRequest>,
) -> AppResult<Json<UniqueAssetResponse>> {
    user.require_writer()?;
    validate_optional(&payload.name, "Name", 200)?;
    validate_optional(&payload.serial_number, "Serial number", 100)?;
    validate_optional(&payload.notes, "Notes", 1000)?;

    let input = UpdateUniqueAsset {
        name: payload.name,
        serial_number: payload.serial_number,
        model_number: payload.model_number,
        notes: payload.notes,
        status: payload.status,
        location_id: payload.location_id,
        keeper_payroll_number: payload.keeper_payroll_number,
    };

    UniqueAssetService::update(&state.db, id, input, &user.payroll_number).await?;
    let view = UniqueAssetService::get_view(&state.db, id).await?;
    Ok(Json(UniqueAssetResponse::from_view(
        view,
        OffsetDateTime::now_utc(),
        state.config.overdue_after_days,
    )?))
}

/// Delete a unique asset and its history
#[utoipa::path(
    delete,
    path = "/api/unique-assets/{id}",
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Unique asset deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Unique asset not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Unique Assets"
)]
pub async fn delete_unique_asset(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<()> {
    user.require_admin()?;
    UniqueAssetService::delete(&state.db, id).await
}

/// Movement history of a unique asset
#[utoipa::path(
    get,
    path = "/api/unique-assets/{id}/movements",
    params(
        ("id" = i32, Path, description = "Asset ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Movement history, newest first", body = MovementListResponse),
        (status = 404, description = "Unique asset not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Unique Assets"
)]
pub async fn list_unique_movements(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<MovementListResponse>> {
    let (limit, offset) = params.resolve();
    UniqueAssetService::get(&state.db, id).await?;

    let movements = MovementRepository::list_for_asset(&state.db, id, limit, offset).await?;
    let total = MovementRepository::count_for_asset(&state.db, id).await?;

    Ok(Json(MovementListResponse {
        data: movements.into_iter().map(|m| m.into()).collect(),
        total,
        limit,
        offset,
    }))
}
