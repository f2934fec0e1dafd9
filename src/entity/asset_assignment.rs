use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::AssetCondition;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "asset_assignment")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub assignment_id: i32,
    pub asset_id: i32,
    pub assigned_to: String,
    pub assigned_by: String,
    pub date_issued: TimeDateTimeWithTimeZone,
    pub condition_issued: AssetCondition,
    pub quantity: i32,
    pub date_returned: Option<TimeDateTimeWithTimeZone>,
    pub condition_returned: Option<AssetCondition>,
    pub quantity_returned: Option<i32>,
    pub notes: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::asset::Entity",
        from = "Column::AssetId",
        to = "super::asset::Column::AssetId",
        on_delete = "Cascade"
    )]
    Asset,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedTo",
        to = "super::user::Column::PayrollNumber"
    )]
    AssignedTo,
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::AssignedBy",
        to = "super::user::Column::PayrollNumber"
    )]
    AssignedBy,
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Asset.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
