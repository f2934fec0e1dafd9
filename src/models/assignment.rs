use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::entity::asset_assignment;
use crate::entity::sea_orm_active_enums::AssetCondition;

#[derive(Debug, Clone, Serialize)]
pub struct Assignment {
    pub assignment_id: i32,
    pub asset_id: i32,
    pub assigned_to: String,
    pub assigned_by: String,
    pub date_issued: OffsetDateTime,
    pub condition_issued: AssetCondition,
    pub quantity: i32,
    pub date_returned: Option<OffsetDateTime>,
    pub condition_returned: Option<AssetCondition>,
    pub quantity_returned: Option<i32>,
    pub notes: Option<String>,
}

impl Assignment {
    pub fn is_active(&self) -> bool {
        self.date_returned.is_none()
    }

    /// Whole days the assignment has been (or was) out.
    pub fn days_since_issued(&self, now: OffsetDateTime) -> i64 {
        let end = self.date_returned.unwrap_or(now);
        (end - self.date_issued).whole_days().max(0)
    }

    pub fn is_overdue(&self, now: OffsetDateTime, overdue_after_days: i64) -> bool {
        self.is_active() && self.days_since_issued(now) > overdue_after_days
    }
}

impl From<asset_assignment::Model> for Assignment {
    fn from(m: asset_assignment::Model) -> Self {
        Self {
            assignment_id: m.assignment_id,
            asset_id: m.asset_id,
            assigned_to: m.assigned_to,
            assigned_by: m.assigned_by,
            date_issued: m.date_issued,
            condition_issued: m.condition_issued,
            quantity: m.quantity,
            date_returned: m.date_returned,
            condition_returned: m.condition_returned,
            quantity_returned: m.quantity_returned,
            notes: m.notes,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateAssignment {
    pub asset_id: i32,
    pub assigned_to: String,
    pub assigned_by: String,
    pub quantity: i32,
    pub condition_issued: Option<AssetCondition>,
    pub notes: Option<String>,
    /// Overrides the assignee's default location
    pub location_id: Option<i32>,
}

#[derive(Debug, Deserialize)]
pub struct ReturnAssignment {
    pub returned_by: String,
    pub condition_returned: Option<AssetCondition>,
    /// Defaults to the issued quantity
    pub quantity_returned: Option<i32>,
    /// Defaults to the asset's current location
    pub location_id: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct AssignmentFilter {
    pub asset_id: Option<i32>,
    pub assigned_to: Option<String>,
    pub active_only: bool,
    pub overdue_only: bool,
}
