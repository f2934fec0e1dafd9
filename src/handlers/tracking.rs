use std::collections::BTreeMap;

use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::error::AppResult;
use crate::middlewares::AuthUser;
use crate::services::{TrackingService, TrackingSummary};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackingSummaryResponse {
    /// Unique asset counts keyed by status
    pub unique_by_status: BTreeMap<String, i64>,
    /// Bulk asset counts keyed by status
    pub bulk_by_status: BTreeMap<String, i64>,
    pub low_stock_count: i64,
    pub active_assignments: i64,
    pub overdue_assignments: i64,
    pub overdue_after_days: i64,
    pub total_locations: u64,
    pub total_users: u64,
}

impl TrackingSummaryResponse {
    fn new(summary: TrackingSummary, overdue_after_days: i64) -> Self {
        Self {
            unique_by_status: summary.unique_by_status,
            bulk_by_status: summary.bulk_by_status,
            low_stock_count: summary.low_stock_count,
            active_assignments: summary.active_assignments,
            overdue_assignments: summary.overdue_assignments,
            overdue_after_days,
            total_locations: summary.total_locations,
            total_users: summary.total_users,
        }
    }
}

/// Dashboard counters across assets and assignments
#[utoipa::path(
    get,
    path = "/api/tracking/summary",
    responses(
        (status = 200, description = "Inventory summary", body = TrackingSummaryResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Tracking"
)]
pub async fn tracking_summary(
    _user: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<TrackingSummaryResponse>> {
    let overdue_after_days = state.config.overdue_after_days;
    let summary = TrackingService::summary(&state.db, &state.pg_pool, overdue_after_days).await?;

    Ok(Json(TrackingSummaryResponse::new(summary, overdue_after_days)))
}
