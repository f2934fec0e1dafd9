use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use utoipa::{IntoParams, ToSchema};

use crate::entity::sea_orm_active_enums::MovementType;
use crate::error::{AppError, AppResult};
use crate::models::{Location, Movement, User};

pub const DEFAULT_LIMIT: i64 = 20;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Deserialize, IntoParams)]
pub struct PaginationParams {
    #[param(default = 20, minimum = 1, maximum = 100)]
    pub limit: Option<i64>,
    #[param(default = 0, minimum = 0)]
    pub offset: Option<i64>,
}

impl PaginationParams {
    pub fn resolve(&self) -> (u64, u64) {
        page_bounds(self.limit, self.offset)
    }
}

/// Clamp raw limit/offset query values
pub fn page_bounds(limit: Option<i64>, offset: Option<i64>) -> (u64, u64) {
    let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT) as u64;
    let offset = offset.unwrap_or(0).max(0) as u64;
    (limit, offset)
}

pub fn validate_required(value: &str, field: &str, max_len: usize) -> AppResult<()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::Validation(format!("{} is required", field)));
    }
    if trimmed.chars().count() > max_len {
        return Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        )));
    }
    Ok(())
}

pub fn validate_optional(value: &Option<String>, field: &str, max_len: usize) -> AppResult<()> {
    match value {
        Some(v) if v.chars().count() > max_len => Err(AppError::Validation(format!(
            "{} must be at most {} characters",
            field, max_len
        ))),
        _ => Ok(()),
    }
}

// ============ Shared response fragments ============

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationSummary {
    pub location_id: i32,
    pub department_name: String,
    pub region_name: String,
    pub display_name: String,
}

impl From<Location> for LocationSummary {
    fn from(l: Location) -> Self {
        Self {
            display_name: l.display_name(),
            location_id: l.location_id,
            department_name: l.department_name,
            region_name: l.region_name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PersonSummary {
    pub payroll_number: String,
    pub name: String,
}

impl From<User> for PersonSummary {
    fn from(u: User) -> Self {
        Self {
            payroll_number: u.payroll_number,
            name: u.name,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementResponse {
    pub movement_id: i32,
    pub asset_id: i32,
    pub from_location_id: Option<i32>,
    pub to_location_id: Option<i32>,
    pub moved_by: Option<String>,
    pub movement_type: MovementType,
    pub quantity: i32,
    #[schema(value_type = String)]
    pub moved_at: OffsetDateTime,
    pub notes: Option<String>,
}

impl From<Movement> for MovementResponse {
    fn from(m: Movement) -> Self {
        Self {
            movement_id: m.movement_id,
            asset_id: m.asset_id,
            from_location_id: m.from_location_id,
            to_location_id: m.to_location_id,
            moved_by: m.moved_by,
            movement_type: m.movement_type,
            quantity: m.quantity,
            moved_at: m.moved_at,
            notes: m.notes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MovementListResponse {
    pub data: Vec<MovementResponse>,
    pub total: u64,
    pub limit: u64,
    pub offset: u64,
}
