pub use super::asset::Entity as Asset;
pub use super::asset_assignment::Entity as AssetAssignment;
pub use super::asset_movement::Entity as AssetMovement;
pub use super::location::Entity as Location;
pub use super::restock_log::Entity as RestockLog;
pub use super::user::Entity as User;
