use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};

use crate::entity::sea_orm_active_enums::AssetCondition;
use crate::error::AppResult;
use crate::handlers::common::{page_bounds, validate_optional};
use crate::middlewares::AuthUser;
use crate::models::{Assignment, AssignmentFilter, CreateAssignment, ReturnAssignment};
use crate::services::AssignmentService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAssignmentRequest {
    pub asset_id: i32,
    pub assigned_to: String,
    /// Defaults to the caller; only admins may record someone else
    pub assigned_by: Option<String>,
    /// Defaults to 1; unique assets only accept 1
    pub quantity: Option<i32>,
    pub condition_issued: Option<AssetCondition>,
    pub notes: Option<String>,
    /// Overrides the assignee's default location
    pub location_id: Option<i32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ReturnAssignmentRequest {
    pub condition_returned: Option<AssetCondition>,
    /// Defaults to the issued quantity
    pub quantity_returned: Option<i32>,
    /// Defaults to the asset's current location
    pub location_id: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct AssignmentQuery {
    pub asset_id: Option<i32>,
    pub assigned_to: Option<String>,
    pub active_only: Option<bool>,
    pub overdue_only: Option<bool>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentResponse {
    pub assignment_id: i32,
    pub asset_id: i32,
    pub assigned_to: String,
    pub assigned_by: String,
    #[schema(value_type = String)]
    pub date_issued: OffsetDateTime,
    pub condition_issued: AssetCondition,
    pub quantity: i32,
    #[schema(value_type = Option<String>)]
    pub date_returned: Option<OffsetDateTime>,
    pub condition_returned: Option<AssetCondition>,
    pub quantity_returned: Option<i32>,
    pub notes: Option<String>,
    pub is_active: bool,
    pub days_since_issued: i64,
    pub is_overdue: bool,
}

impl AssignmentResponse {
    pub fn new(a: Assignment, now: OffsetDateTime, overdue_after_days: i64) -> Self {
        Self {
            is_active: a.is_active(),
            days_since_issued: a.days_since_issued(now),
            is_overdue: a.is_overdue(now, overdue_after_days),
            assignment_id: a.assignment_id,
            asset_id: a.asset_id,
            assigned_to: a.assigned_to,
            assigned_by: a.assigned_by,
            date_issued: a.date_issued,
            condition_issued: a.condition_issued,
            quantity: a.quantity,
            date_returned: a.date_returned,
            condition_returned: a.condition_returned,
            quantity_returned: a.quantity_returned,
            notes: a.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AssignmentListResponse {
    pub data: Vec<AssignmentResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

// ============ Handlers ============

/// Issue an asset to a user
#[utoipa::path(
    post,
    path = "/api/assignments",
    request_body = CreateAssignmentRequest,
    responses(
        (status = 200, description = "Asset assigned", body = AssignmentResponse),
        (status = 400, description = "Invalid quantity or no resolvable location"),
        (status = 403, description = "Viewers cannot assign assets, keepers cannot issue on behalf of others"),
        (status = 404, description = "Asset or user not found"),
        (status = 409, description = "Already assigned or insufficient stock")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Assignments"
)]
pub async fn create_assignment(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateAssignmentRequest>,
) -> AppResult<Json<AssignmentResponse>> {
    user.require_writer()?;
    validate_optional(&payload.notes, "Notes", 1000)?;

    let assigned_by = match payload.assigned_by {
        Some(issuer) => {
            let issuer = issuer.trim().to_string();
            user.require_self_or_admin(&issuer)?;
            issuer
        }
        None => user.payroll_number,
    };

    let input = CreateAssignment {
        asset_id: payload.asset_id,
        assigned_to: payload.assigned_to.trim().to_string(),
        assigned_by,
        quantity: payload.quantity.unwrap_or(1),
        condition_issued: payload.condition_issued,
        notes: payload.notes,
        location_id: payload.location_id,
    };

    let assignment = AssignmentService::create(&state.db, input).await?;
    Ok(Json(AssignmentResponse::new(
        assignment,
        OffsetDateTime::now_utc(),
        state.config.overdue_after_days,
    )))
}

/// List assignments
#[utoipa::path(
    get,
    path = "/api/assignments",
    params(AssignmentQuery),
    responses(
        (status = 200, description = "Assignments, newest first", body = AssignmentListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Assignments"
)]
pub async fn list_assignments(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<AssignmentQuery>,
) -> AppResult<Json<AssignmentListResponse>> {
    let (limit, offset) = page_bounds(params.limit, params.offset);
    let filter = AssignmentFilter {
        asset_id: params.asset_id,
        assigned_to: params.assigned_to,
        active_only: params.active_only.unwrap_or(false),
        overdue_only: params.overdue_only.unwrap_or(false),
    };
    let overdue_after_days = state.config.overdue_after_days;

    let (assignments, total) =
        AssignmentService::list(&state.db, &filter, overdue_after_days, limit, offset).await?;

    let now = OffsetDateTime::now_utc();
    Ok(Json(AssignmentListResponse {
        data: assignments
            .into_iter()
            .map(|a| AssignmentResponse::new(a, now, overdue_after_days))
            .collect(),
        total,
        limit,
        offset,
    }))
}

/// Get an assignment by ID
#[utoipa::path(
    get,
    path = "/api/assignments/{id}",
    params(
        ("id" = i32, Path, description = "Assignment ID")
    ),
    responses(
        (status = 200, description = "Assignment details", body = AssignmentResponse),
        (status = 404, description = "Assignment not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Assignments"
)]
pub async fn get_assignment(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> AppResult<Json<AssignmentResponse>> {
    let assignment = AssignmentService::get(&state.db, id).await?;
    Ok(Json(AssignmentResponse::new(
        assignment,
        OffsetDateTime::now_utc(),
        state.config.overdue_after_days,
    )))
}

/// Return an assigned asset
#[utoipa::path(
    post,
    path = "/api/assignments/{id}/return",
    params(
        ("id" = i32, Path, description = "Assignment ID")
    ),
    request_body = ReturnAssignmentRequest,
    responses(
        (status = 200, description = "Assignment closed", body = AssignmentResponse),
        (status = 400, description = "Invalid returned quantity"),
        (status = 403, description = "Viewers cannot return assets"),
        (status = 404, description = "Assignment not found"),
        (status = 409, description = "Already returned")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Assignments"
)]
pub async fn return_assignment(
    user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
    Json(payload): Json<ReturnAssignmentRequest>,
) -> AppResult<Json<AssignmentResponse>> {
    user.require_writer()?;
    validate_optional(&payload.notes, "Notes", 1000)?;

    let input = ReturnAssignment {
        returned_by: user.payroll_number,
        condition_returned: payload.condition_returned,
        quantity_returned: payload.quantity_returned,
        location_id: payload.location_id,
        notes: payload.notes,
    };

    let assignment = AssignmentService::return_assignment(&state.db, id, input).await?;
    Ok(Json(AssignmentResponse::new(
        assignment,
        OffsetDateTime::now_utc(),
        state.config.overdue_after_days,
    )))
}
