// Library crate for the rail asset tracking service
// Exports modules for use by the server binary and tests

pub mod config;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod middlewares;
pub mod models;
pub mod repositories;
pub mod services;
pub mod state;

use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    change_password, create_assignment, create_bulk_asset, create_location, create_unique_asset,
    create_user, delete_bulk_asset, delete_location, delete_unique_asset, delete_user,
    get_assignment, get_bulk_asset, get_location, get_unique_asset, get_user, list_assignments,
    list_bulk_assets, list_bulk_movements, list_locations, list_restocks, list_unique_assets,
    list_unique_movements, list_user_assignments, list_users, login, me, reset_password,
    resolve_location, restock_bulk_asset, return_assignment, tracking_summary, update_bulk_asset,
    update_location, update_unique_asset, update_user,
};
use crate::middlewares::auth_middleware;
use crate::state::AppState;

/// Build the application router with the given state
pub fn build_router(state: AppState) -> Router {
    // Protected routes (require authentication); role checks happen per handler
    let protected_routes = Router::new()
        // Auth routes
        .route("/api/auth/me", get(me))
        .route("/api/auth/change-password", post(change_password))
        .route("/api/auth/reset-password", post(reset_password))
        // User routes
        .route("/api/users", get(list_users).post(create_user))
        .route(
            "/api/users/{payroll_number}",
            get(get_user).put(update_user).delete(delete_user),
        )
        .route(
            "/api/users/{payroll_number}/assignments",
            get(list_user_assignments),
        )
        // Location routes
        .route("/api/locations", get(list_locations).post(create_location))
        .route("/api/locations/resolve", post(resolve_location))
        .route(
            "/api/locations/{id}",
            get(get_location)
                .put(update_location)
                .delete(delete_location),
        )
        // Bulk asset routes
        .route(
            "/api/bulk-assets",
            get(list_bulk_assets).post(create_bulk_asset),
        )
        .route(
            "/api/bulk-assets/{id}",
            get(get_bulk_asset)
                .put(update_bulk_asset)
                .delete(delete_bulk_asset),
        )
        .route("/api/bulk-assets/{id}/restock", post(restock_bulk_asset))
        .route("/api/bulk-assets/{id}/restocks", get(list_restocks))
        .route("/api/bulk-assets/{id}/movements", get(list_bulk_movements))
        // Unique asset routes
        .route(
            "/api/unique-assets",
            get(list_unique_assets).post(create_unique_asset),
        )
        .route(
            "/api/unique-assets/{id}",
            get(get_unique_asset)
                .put(update_unique_asset)
                .delete(delete_unique_asset),
        )
        .route(
            "/api/unique-assets/{id}/movements",
            get(list_unique_movements),
        )
        // Assignment routes
        .route(
            "/api/assignments",
            get(list_assignments).post(create_assignment),
        )
        .route("/api/assignments/{id}", get(get_assignment))
        .route("/api/assignments/{id}/return", post(return_assignment))
        // Tracking
        .route("/api/tracking/summary", get(tracking_summary))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .route("/", get(|| async { "Rail asset tracking service" }))
        // Public auth routes
        .route("/api/auth/login", post(login))
        // Protected routes
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
