pub mod asset;
pub mod asset_assignment;
pub mod asset_movement;
pub mod location;
pub mod restock_log;
pub mod sea_orm_active_enums;
pub mod user;

pub mod prelude;

pub use prelude::*;
