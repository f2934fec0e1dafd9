use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{AppError, AppResult};
use crate::middlewares::AuthUser;
use crate::models::UserResponse;
use crate::repositories::{Repository, UserRepository};
use crate::services::AuthService;
use crate::state::AppState;

// ============ Request/Response DTOs ============

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub payroll_number: String,
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    /// Set when the user still holds a temporary password
    pub must_change_password: bool,
    pub user: UserResponse,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ResetPasswordRequest {
    pub payroll_number: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ResetPasswordResponse {
    pub payroll_number: String,
    /// Shown once; only its hash is stored
    pub temporary_password: String,
    pub must_change_password: bool,
}

// ============ Handlers ============

/// Login with payroll number and password
#[utoipa::path(
    post,
    path = "/api/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "Auth"
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    if payload.payroll_number.trim().is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation(
            "Payroll number and password are required".to_string(),
        ));
    }

    let (token, user) = AuthService::login(
        &state.db,
        &state.config,
        &payload.payroll_number,
        &payload.password,
    )
    .await?;

    Ok(Json(AuthResponse {
        token,
        must_change_password: user.must_change_password,
        user: user.into(),
    }))
}

/// Get current authenticated user
#[utoipa::path(
    get,
    path = "/api/auth/me",
    responses(
        (status = 200, description = "Current user info", body = UserResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn me(user: AuthUser, State(state): State<AppState>) -> AppResult<Json<UserResponse>> {
    let user_data = UserRepository::find_by_id(&state.db, user.payroll_number).await?;
    Ok(Json(user_data.into()))
}

/// Change the current user's password
#[utoipa::path(
    post,
    path = "/api/auth/change-password",
    request_body = ChangePasswordRequest,
    responses(
        (status = 200, description = "Password changed", body = UserResponse),
        (status = 400, description = "New password rejected"),
        (status = 401, description = "Current password is wrong")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn change_password(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<Json<UserResponse>> {
    let updated = AuthService::change_password(
        &state.db,
        &user.payroll_number,
        &payload.current_password,
        &payload.new_password,
    )
    .await?;

    Ok(Json(updated.into()))
}

/// Reset another user's password to a temporary one
#[utoipa::path(
    post,
    path = "/api/auth/reset-password",
    request_body = ResetPasswordRequest,
    responses(
        (status = 200, description = "Temporary password issued", body = ResetPasswordResponse),
        (status = 403, description = "Admin role required"),
        (status = 404, description = "User not found")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn reset_password(
    user: AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> AppResult<Json<ResetPasswordResponse>> {
    user.require_admin()?;

    let (target, temporary_password) =
        AuthService::reset_password(&state.db, payload.payroll_number.trim()).await?;

    Ok(Json(ResetPasswordResponse {
        payroll_number: target.payroll_number,
        temporary_password,
        must_change_password: target.must_change_password,
    }))
}
