use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::{BulkStatus, IndividualStatus};

/// Row shape shared by unique and bulk assets; `is_bulk` selects which
/// group of nullable columns is populated.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "assets")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub asset_id: i32,
    pub name: String,
    pub is_bulk: bool,
    pub serial_number: Option<String>,
    pub individual_status: Option<IndividualStatus>,
    pub current_stock_level: Option<i32>,
    pub minimum_threshold: Option<i32>,
    pub last_restocked: Option<TimeDateTimeWithTimeZone>,
    pub bulk_status: Option<BulkStatus>,
    pub location_id: Option<i32>,
    pub keeper_payroll_number: Option<String>,
    pub model_number: Option<String>,
    pub notes: Option<String>,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::LocationId",
        to = "super::location::Column::LocationId"
    )]
    Location,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::KeeperPayrollNumber",
        to = "super::user::Column::PayrollNumber",
        on_delete = "SetNull"
    )]
    Keeper,
    #[sea_orm(has_many = "super::asset_assignment::Entity")]
    Assignments,
    #[sea_orm(has_many = "super::asset_movement::Entity")]
    Movements,
    #[sea_orm(has_many = "super::restock_log::Entity")]
    Restocks,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Location.def()
    }
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Keeper.def()
    }
}

impl Related<super::asset_assignment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Assignments.def()
    }
}

impl Related<super::asset_movement::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movements.def()
    }
}

impl Related<super::restock_log::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restocks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
