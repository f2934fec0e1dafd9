use serde::Serialize;
use time::OffsetDateTime;

use crate::entity::restock_log;

#[derive(Debug, Clone, Serialize)]
pub struct RestockEntry {
    pub restock_id: i32,
    pub asset_id: i32,
    pub quantity_added: i32,
    pub restocked_by: Option<String>,
    pub restocked_at: OffsetDateTime,
    pub notes: Option<String>,
}

impl From<restock_log::Model> for RestockEntry {
    fn from(m: restock_log::Model) -> Self {
        Self {
            restock_id: m.restock_id,
            asset_id: m.asset_id,
            quantity_added: m.quantity_added,
            restocked_by: m.restocked_by,
            restocked_at: m.restocked_at,
            notes: m.notes,
        }
    }
}
