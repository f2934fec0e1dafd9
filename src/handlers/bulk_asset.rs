use axum::{
    extract::{Path, Query, State},
    Json,
};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};

use crate::entity::sea_orm_active_enums::BulkStatus;
use crate::error::{AppError, AppResult};
use crate::handlers::common::{
    page_bounds, validate_optional, validate_required, LocationSummary, MovementListResponse,
    MovementResponse, PaginationParams, PersonSummary,
};
use crate::middlewares::AuthUser;
use crate::models::{
    BulkAssetFilter, BulkStatusFilter, CreateBulkAsset, RestockBulkAsset, RestockEntry,
    UpdateBulkAsset,
};
use crate::repositories::{MovementRepository, RestockRepository};
use crate::services::{AssetView, BulkAssetService};
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateBulkAssetRequest {
    pub name: String,
    pub location_id: i32,
    pub keeper_payroll_number: Option<String>,
    pub quantity: i32,
    pub minimum_threshold: i32,
    pub model_number: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateBulkAssetRequest {
    pub name: Option<String>,
    pub model_number: Option<String>,
    pub notes: Option<String>,
    pub quantity: Option<i32>,
    pub minimum_threshold: Option<i32>,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
    /// `discontinued` sticks until another status is requested
    pub status: Option<BulkStatus>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RestockRequest {
    pub quantity: i32,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct BulkAssetQuery {
    /// Matches name or model number
    pub search: Option<String>,
    /// `active`, `out_of_stock`, `discontinued` or `low_stock`
    #[param(value_type = Option<String>)]
    pub status: Option<BulkStatusFilter>,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkAssetResponse {
    pub asset_id: i32,
    pub name: String,
    pub model_number: Option<String>,
    pub notes: Option<String>,
    pub current_stock_level: i32,
    pub minimum_threshold: i32,
    /// Stock as a percentage of the minimum threshold
    #[schema(value_type = Option<String>)]
    pub stock_percentage: Option<Decimal>,
    pub is_low_stock: bool,
    pub status: BulkStatus,
    #[schema(value_type = Option<String>)]
    pub last_restocked: Option<OffsetDateTime>,
    pub location: Option<LocationSummary>,
    pub keeper: Option<PersonSummary>,
    pub latest_movement: Option<MovementResponse>,
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
    #[schema(value_type = String)]
    pub updated_at: OffsetDateTime,
}

impl TryFrom<AssetView> for BulkAssetResponse {
    type Error = AppError;

    fn try_from(view: AssetView) -> Result<Self, Self::Error> {
        let stock = view
            .asset
            .bulk()
            .cloned()
            .ok_or_else(|| AppError::NotFound(format!("Bulk asset {}", view.asset.asset_id)))?;

        Ok(Self {
            asset_id: view.asset.asset_id,
            name: view.asset.name,
            model_number: view.asset.model_number,
            notes: view.asset.notes,
            stock_percentage: stock.stock_percentage(),
            is_low_stock: stock.is_low_stock(),
            current_stock_level: stock.current_stock_level,
            minimum_threshold: stock.minimum_threshold,
            status: stock.status,
            last_restocked: stock.last_restocked,
            location: view.location.map(Into::into),
            keeper: view.keeper.map(Into::into),
            latest_movement: view.latest_movement.map(Into::into),
            created_at: view.asset.created_at,
            updated_at: view.asset.updated_at,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BulkAssetListResponse {
    pub data: Vec<BulkAssetResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestockEntryResponse {
    pub restock_id: i32,
    pub asset_id: i32,
    pub quantity_added: i32,
    pub restocked_by: Option<String>,
    #[schema(value_type = String)]
    pub restocked_at: OffsetDateTime,
    pub notes: Option<String>,
}

impl From<RestockEntry> for RestockEntryResponse {
    fn from(r: RestockEntry) -> Self {
        Self {
            restock_id: r.restock_id,
            asset_id: r.asset_id,
            quantity_added: r.quantity_added,
            restocked_by: r.restocked_by,
            restocked_at: r.restocked_at,
            notes: r.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestockResponse {
    pub asset: BulkAssetResponse,
    pub restock: RestockEntryResponse,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct RestockListResponse {
    pub data: Vec<RestockEntryResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

// ============ Handlers ============

/// Create a bulk asset
#[utoipa::path(
    post,
    path = "/api/bulk-assets",
    request_body = CreateBulkAssetRequest,
    responses(
        (status = 200, description = "Bulk asset created", body = BulkAssetResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Viewers cannot create assets"),
        (status = 404, description = "Location or keeper not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Bulk Assets"
)]
pub async fn create_bulk_asset(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateBulkAssetRequest>,
) -> AppResult<Json<BulkAssetResponse>> {
    user.require_writer()?;
    validate_required(&payload.name, "Name", 200)?;
    validate_optional(&payload.model_number, "Model number", 100)?;
    validate_optional(&payload.notes, "Notes", 1000)?;

    let input = CreateBulkAsset {
        name: payload.name,
        location_id: payload.location_id,
        keeper_payroll_number: payload.keeper_payroll_number,
        quantity: payload.quantity,
        minimum_threshold: payload.minimum_threshold,
        model_number: payload.model_number,
        notes: payload.notes,
    };

    let asset = BulkAssetService::create(&state.db, input, &user.payroll_number).await?;
    let view = BulkAssetService::get_view(&state.db, asset.asset_id).await?;
    Ok(Json(BulkAssetResponse::try_from(view)?))
}

/// List bulk assets
#[utoipa::path(
    get,
    path = "/api/bulk-assets",
    params(BulkAssetQuery),
    responses(
        (status = 200, description = "Bulk assets", body = BulkAssetListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Bulk Assets"
)]
pub async fn list_bulk_assets(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<BulkAssetQuery>,
) -> AppResult<Json<BulkAssetListResponse>> {
    let (limit, offset) = page_bounds(params.limit, params.offset);
    let filter = BulkAssetFilter {
        search: params.search,
        status: params.status,
        location_id: params.location_id,
        keeper_payroll_number: params.keeper_payroll_number,
    };

    let (views, total) = BulkAssetService::list(&state.db, &filter, limit, offset).await?;
    let data = views
        .into_iter()
        .map(BulkAssetResponse::try_from)
        .collect::<AppResult<Vec<_>>>()?;

    Ok(Json(BulkAssetListResponse {
        data,
        total,
        limit,
        offset,
    }))
}

/// Get a bulk asset by ID
#[utoipa::path(
    get,
    path = "/api/bulk-assets/{id}",
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Bulk asset details", body = BulkAssetResponse),
        (status = 404, description = "Bulk asset not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Bulk Assets"
)]
pub async fn get_bulk_asset(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<BulkAssetResponse>> {
    let view = BulkAssetService::get_view(&state.db, id).await?;
    Ok(Json(BulkAssetResponse::try_from(view)?))
}

/// Update a bulk asset
#[utoipa::path(
    put,
    path = "/api/bulk-assets/{id}",
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    request_body = UpdateBulkAssetRequest,
    responses(
        (status = 200, description = "Bulk asset updated", body = BulkAssetResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Viewers cannot edit assets"),
        (status = 404, description = "Bulk asset not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Bulk Assets"
)]
pub async fn update_bulk_asset(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateBulkAssetRequest>,
) -> AppResult<Json<BulkAssetResponse>> {
    user.require_writer()?;
    validate_optional(&payload.name, "Name", 200)?;
    validate_optional(&payload.notes, "Notes", 1000)?;

    let input = UpdateBulkAsset {
        name: payload.name,
        model_number: payload.model_number,
        notes: payload.notes,
        quantity: payload.quantity,
        minimum_threshold: payload.minimum_threshold,
        location_id: payload.location_id,
        keeper_payroll_number: payload.keeper_payroll_number,
        status: payload.status,
    };

    BulkAssetService::update(&state.db, id, input, &user.payroll_number).await?;
    let view = BulkAssetService::get_view(&state.db, id).await?;
    Ok(Json(BulkAssetResponse::try_from(view)?))
}

/// Delete a bulk asset and its history
#[utoipa::path(
    delete,
    path = "/api/bulk-assets/{id}",
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    responses(
        (status = 200, description = "Bulk asset deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "Bulk asset not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Bulk Assets"
)]
pub async fn delete_bulk_asset(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<()> {
    user.require_admin()?;
    BulkAssetService::delete(&state.db, id).await
}

/// Add stock to a bulk asset
#[utoipa::path(
    post,
    path = "/api/bulk-assets/{id}/restock",
    params(
        ("id" = i32, Path, description = "Asset ID")
    ),
    request_body = RestockRequest,
    responses(
        (status = 200, description = "Stock added", body = RestockResponse),
        (status = 400, description = "Quantity must be positive"),
        (status = 403, description = "Viewers cannot restock"),
        (status = 404, description = "Bulk asset not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Bulk Assets"
)]
pub async fn restock_bulk_asset(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<RestockRequest>,
) -> AppResult<Json<RestockResponse>> {
    user.require_writer()?;
    validate_optional(&payload.notes, "Notes", 1000)?;

    let input = RestockBulkAsset {
        quantity: payload.quantity,
        notes: payload.notes,
    };

    let (_, entry) = BulkAssetService::restock(&state.db, id, input, &user.payroll_number).await?;
    let view = BulkAssetService::get_view(&state.db, id).await?;

    Ok(Json(RestockResponse {
        asset: BulkAssetResponse::try_from(view)?,
        restock: entry.into(),
    }))
}

/// Restock history of a bulk asset
#[utoipa::path(
    get,
    path = "/api/bulk-assets/{id}/restocks",
    params(
        ("id" = i32, Path, description = "Asset ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Restock history, newest first", body = RestockListResponse),
        (status = 404, description = "Bulk asset not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Bulk Assets"
)]
pub async fn list_restocks(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<RestockListResponse>> {
    let (limit, offset) = params.resolve();
    BulkAssetService::get(&state.db, id).await?;

    let entries = RestockRepository::list_for_asset(&state.db, id, limit, offset).await?;
    let total = RestockRepository::count_for_asset(&state.db, id).await?;

    Ok(Json(RestockListResponse {
        data: entries.into_iter().map(|e| e.into()).collect(),
        total,
        limit,
        offset,
    }))
}

/// Movement history of a bulk asset
#[utoipa::path(
    get,
    path = "/api/bulk-assets/{id}/movements",
    params(
        ("id" = i32, Path, description = "Asset ID"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Movement history, newest first", body = MovementListResponse),
        (status = 404, description = "Bulk asset not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Bulk Assets"
)]
pub async fn list_bulk_movements(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<MovementListResponse>> {
    let (limit, offset) = params.resolve();
    BulkAssetService::get(&state.db, id).await?;

    let movements = MovementRepository::list_for_asset(&state.db, id, limit, offset).await?;
    let total = MovementRepository::count_for_asset(&state.db, id).await?;

    Ok(Json(MovementListResponse {
        data: movements.into_iter().map(|m| m.into()).collect(),
        total,
        limit,
        offset,
    }))
}
