pub mod assignment;
pub mod auth;
pub mod bulk_asset;
pub mod common;
pub mod location;
pub mod tracking;
pub mod unique_asset;
pub mod user;

pub use assignment::{
    create_assignment, get_assignment, list_assignments, return_assignment,
    AssignmentListResponse, AssignmentResponse, CreateAssignmentRequest, ReturnAssignmentRequest,
};
pub use auth::{
    change_password, login, me, reset_password, AuthResponse, ChangePasswordRequest,
    LoginRequest, ResetPasswordRequest, ResetPasswordResponse,
};
pub use bulk_asset::{
    create_bulk_asset, delete_bulk_asset, get_bulk_asset, list_bulk_assets, list_bulk_movements,
    list_restocks, restock_bulk_asset, update_bulk_asset, BulkAssetListResponse,
    BulkAssetResponse, CreateBulkAssetRequest, RestockEntryResponse, RestockListResponse,
    RestockRequest, RestockResponse, UpdateBulkAssetRequest,
};
pub use common::{
    validate_optional, validate_required, LocationSummary, MovementListResponse,
    MovementResponse, PaginationParams, PersonSummary,
};
pub use location::{
    create_location, delete_location, get_location, list_locations, resolve_location,
    update_location, CreateLocationRequest, LocationListResponse, LocationResponse,
    ResolveLocationRequest, UpdateLocationRequest,
};
pub use tracking::{tracking_summary, TrackingSummaryResponse};
pub use unique_asset::{
    create_unique_asset, delete_unique_asset, get_unique_asset, list_unique_assets,
    list_unique_movements, update_unique_asset, CreateUniqueAssetRequest,
    CurrentAssignmentResponse, UniqueAssetListResponse, UniqueAssetResponse,
    UpdateUniqueAssetRequest,
};
pub use user::{
    create_user, delete_user, get_user, list_user_assignments, list_users, update_user,
    CreateUserRequest, CreateUserResponse, UpdateUserRequest, UserListResponse,
};
