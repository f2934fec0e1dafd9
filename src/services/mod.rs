pub mod assignment;
pub mod auth;
pub mod bulk_asset;
pub mod location;
pub mod tracking;
pub mod unique_asset;
pub mod user;

pub use assignment::AssignmentService;
pub use auth::{AuthService, Claims, MIN_PASSWORD_LENGTH};
pub use bulk_asset::BulkAssetService;
pub use location::LocationService;
pub use tracking::{AssetView, TrackingService, TrackingSummary};
pub use unique_asset::UniqueAssetService;
pub use user::UserService;
