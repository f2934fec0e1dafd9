use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};

use crate::entity::sea_orm_active_enums::UserRole;
use crate::error::{AppError, AppResult};
use crate::handlers::assignment::{AssignmentListResponse, AssignmentResponse};
use crate::handlers::common::{page_bounds, validate_required, PaginationParams};
use crate::middlewares::AuthUser;
use crate::models::{
    AssignmentFilter, CreateUser, LocationSelector, UpdateUser, UserFilter, UserResponse,
};
use crate::repositories::{Repository, UserRepository};
use crate::services::{AssignmentService, UserService};
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub payroll_number: String,
    pub name: String,
    pub role: UserRole,
    /// Omit to have a temporary password generated
    pub password: Option<String>,
    pub default_location_id: Option<i32>,
    /// With `region_name`, finds or creates the default location
    pub department_name: Option<String>,
    pub region_name: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreateUserResponse {
    pub user: UserResponse,
    /// Present only when the password was generated
    pub temporary_password: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    /// Admin only
    pub role: Option<UserRole>,
    pub default_location_id: Option<i32>,
    pub department_name: Option<String>,
    pub region_name: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct UserQuery {
    /// Matches payroll number or name
    pub search: Option<String>,
    pub role: Option<UserRole>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}

// ============ Handlers ============

/// Search users
#[utoipa::path(
    get,
    path = "/api/users",
    params(UserQuery),
    responses(
        (status = 200, description = "Matching users", body = UserListResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn list_users(
    _user: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<UserQuery>,
) -> AppResult<Json<UserListResponse>> {
    let (limit, offset) = page_bounds(params.limit, params.offset);
    let filter = UserFilter {
        search: params.search,
        role: params.role,
    };

    let users = UserRepository::search(&state.db, &filter, limit, offset).await?;
    let total = UserRepository::count_search(&state.db, &filter).await?;

    Ok(Json(UserListResponse {
        data: users.into_iter().map(|u| u.into()).collect(),
        total,
        limit,
        offset,
    }))
}

/// Get a user by payroll number
#[utoipa::path(
    get,
    path = "/api/users/{payroll_number}",
    params(
        ("payroll_number" = String, Path, description = "Payroll number")
    ),
    responses(
        (status = 200, description = "User details", body = UserResponse),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn get_user(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(payroll_number): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = UserRepository::find_by_id(&state.db, payroll_number).await?;
    Ok(Json(user.into()))
}

/// Create a user
#[utoipa::path(
    post,
    path = "/api/users",
    request_body = CreateUserRequest,
    responses(
        (status = 200, description = "User created", body = CreateUserResponse),
        (status = 400, description = "Validation error"),
        (status = 403, description = "Admin role required"),
        (status = 409, description = "Payroll number already exists")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn create_user(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateUserRequest>,
) -> AppResult<Json<CreateUserResponse>> {
    user.require_admin()?;
    validate_required(&payload.payroll_number, "Payroll number", 32)?;
    validate_required(&payload.name, "Name", 100)?;

    let default_location = LocationSelector::from_parts(
        payload.default_location_id,
        payload.department_name,
        payload.region_name,
    )
    .map_err(|e| AppError::Validation(e.to_string()))?;

    let input = CreateUser {
        payroll_number: payload.payroll_number,
        name: payload.name,
        role: payload.role,
        password: payload.password,
        default_location,
    };

    let (created, temporary_password) = UserService::create_user(&state.db, input).await?;

    Ok(Json(CreateUserResponse {
        user: created.into(),
        temporary_password,
    }))
}

/// Update a user's profile
#[utoipa::path(
    put,
    path = "/api/users/{payroll_number}",
    params(
        ("payroll_number" = String, Path, description = "Payroll number")
    ),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Only admins may edit other users or roles"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn update_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(payroll_number): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> AppResult<Json<UserResponse>> {
    user.require_self_or_admin(&payroll_number)?;
    if payload.role.is_some() {
        user.require_admin()?;
    }

    let default_location = LocationSelector::from_parts(
        payload.default_location_id,
        payload.department_name,
        payload.region_name,
    )
    .map_err(|e| AppError::Validation(e.to_string()))?;

    let input = UpdateUser {
        name: payload.name,
        role: payload.role,
        default_location,
    };

    let updated = UserService::update_user(&state.db, &payroll_number, input).await?;
    Ok(Json(updated.into()))
}

/// Delete a user
#[utoipa::path(
    delete,
    path = "/api/users/{payroll_number}",
    params(
        ("payroll_number" = String, Path, description = "Payroll number")
    ),
    responses(
        (status = 200, description = "User deleted"),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found"),
        (status = 409, description = "User still has assignment records")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn delete_user(
    user: AuthUser,
    State(state): State<AppState>,
    Path(payroll_number): Path<String>,
) -> AppResult<()> {
    user.require_admin()?;
    if user.payroll_number == payroll_number {
        return Err(AppError::Validation(
            "You cannot delete your own account".to_string(),
        ));
    }

    UserRepository::delete(&state.db, payroll_number.clone()).await?;
    tracing::info!(%payroll_number, deleted_by = %user.payroll_number, "Deleted user");
    Ok(())
}

/// Assignments issued to a user, newest first
#[utoipa::path(
    get,
    path = "/api/users/{payroll_number}/assignments",
    params(
        ("payroll_number" = String, Path, description = "Payroll number"),
        PaginationParams
    ),
    responses(
        (status = 200, description = "Assignments of the user", body = AssignmentListResponse),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Users"
)]
pub async fn list_user_assignments(
    _user: AuthUser,
    State(state): State<AppState>,
    Path(payroll_number): Path<String>,
    Query(params): Query<PaginationParams>,
) -> AppResult<Json<AssignmentListResponse>> {
    let (limit, offset) = params.resolve();
    let target = UserRepository::find_by_id(&state.db, payroll_number).await?;

    let filter = AssignmentFilter {
        assigned_to: Some(target.payroll_number),
        ..Default::default()
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
