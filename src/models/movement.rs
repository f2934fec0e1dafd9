use serde::Serialize;
use time::OffsetDateTime;

use crate::entity::asset_movement;
use crate::entity::sea_orm_active_enums::MovementType;

/// One row of an asset's movement history. Never updated once written.
#[derive(Debug, Clone, Serialize)]
pub struct Movement {
    pub movement_id: i32,
    pub asset_id: i32,
    pub from_location_id: Option<i32>,
    pub to_location_id: Option<i32>,
    pub moved_by: Option<String>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub moved_at: OffsetDateTime,
    pub notes: Option<String>,
}

impl From<asset_movement::Model> for Movement {
    fn from(m: asset_movement::Model) -> Self {
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

/// Movement about to be appended
#[derive(Debug, Clone)]
pub struct NewMovement {
    pub asset_id: i32,
    pub from_location_id: Option<i32>,
    pub to_location_id: Option<i32>,
    pub moved_by: Option<String>,
    pub movement_type: MovementType,
    pub quantity: i32,
    pub notes: Option<String>,
}
