use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use super::sea_orm_active_enums::UserRole;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub payroll_number: String,
    pub name: String,
    pub role: UserRole,
    pub password_hash: String,
    pub must_change_password: bool,
    pub default_location_id: Option<i32>,
    pub created_at: TimeDateTimeWithTimeZone,
    pub updated_at: TimeDateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::location::Entity",
        from = "Column::DefaultLocationId",
        to = "super::location::Column::LocationId",
        on_delete = "SetNull"
    )]
    DefaultLocation,
    #[sea_orm(has_many = "super::asset::Entity")]
    KeptAssets,
}

impl Related<super::location::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::DefaultLocation.def()
    }
}

impl Related<super::asset::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::KeptAssets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
