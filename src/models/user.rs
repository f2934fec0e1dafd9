use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::entity::sea_orm_active_enums::UserRole;
use crate::models::LocationSelector;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub payroll_number: String,
    pub name: String,
    pub role: UserRole,
    #[serde(skip_serializing)] // Never expose password hash
    pub password_hash: String,
    pub must_change_password: bool,
    pub default_location_id: Option<i32>,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
}

/// User creation DTO (without timestamps)
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub payroll_number: String,
    pub name: String,
    pub role: UserRole,
    /// When absent a temporary password is issued
    pub password: Option<String>,
    pub default_location: Option<LocationSelector>,
}

/// User update DTO
#[derive(Debug, Default, Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub role: Option<UserRole>,
    pub default_location: Option<LocationSelector>,
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub search: Option<String>,
    pub role: Option<UserRole>,
}

/// Public user response (safe to return via API)
#[derive(Debug, Serialize, ToSchema)]
pub struct UserResponse {
    pub payroll_number: String,
    pub name: String,
    pub role: UserRole,
    pub must_change_password: bool,
    pub default_location_id: Option<i32>,
    #[schema(value_type = String)]
    pub created_at: OffsetDateTime,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            payroll_number: user.payroll_number,
            name: user.name,
            role: user.role,
            must_change_password: user.must_change_password,
            default_location_id: user.default_location_id,
            created_at: user.created_at,
        }
    }
}
