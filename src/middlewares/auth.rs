use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};

use crate::entity::sea_orm_active_enums::UserRole;
use crate::error::{AppError, AppResult};
use crate::services::{AuthService, Claims};
use crate::state::AppState;

/// Authenticated user info extracted from JWT
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub payroll_number: String,
    pub role: UserRole,
    pub name: String,
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        Self {
            payroll_number: claims.sub,
            role: claims.role,
            name: claims.name,
        }
    }
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    /// Admins manage users and delete records
    pub fn require_admin(&self) -> AppResult<()> {
        if self.is_admin() {
            Ok(())
        } else {
            tracing::warn!(payroll_number = %self.payroll_number, "Admin role required");
            Err(AppError::Forbidden)
        }
    }

    /// Admins and keepers change assets, locations and assignments
    pub fn require_writer(&self) -> AppResult<()> {
        match self.role {
            UserRole::Admin | UserRole::Keeper => Ok(()),
            UserRole::Viewer => {
                tracing::warn!(payroll_number = %self.payroll_number, "Viewer attempted a write");
                Err(AppError::Forbidden)
            }
        }
    }

    /// Admins, or the user acting on their own record
    pub fn require_self_or_admin(&self, payroll_number: &str) -> AppResult<()> {
        if self.is_admin() || self.payroll_number == payroll_number {
            Ok(())
        } else {
            Err(AppError::Forbidden)
        }
    }
}

/// Extractor for AuthUser - can be used directly in handlers
/// Example: `async fn handler(user: AuthUser) -> ... { }`
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}

/// Auth middleware - validates JWT and injects AuthUser into request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let claims = AuthService::verify_token(token, &state.config)?;

    request.extensions_mut().insert(AuthUser::from(claims));

    Ok(next.run(request).await)
}
