use anyhow::Context;
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use railtrack::config::Config;
use railtrack::entity::sea_orm_active_enums::{
    AssetCondition, BulkStatus, IndividualStatus, MovementType, UserRole,
};
use railtrack::handlers::{
    AssignmentListResponse, AssignmentResponse, AuthResponse, BulkAssetListResponse,
    BulkAssetResponse, ChangePasswordRequest, CreateAssignmentRequest, CreateBulkAssetRequest,
    CreateLocationRequest, CreateUniqueAssetRequest, CreateUserRequest, CreateUserResponse,
    CurrentAssignmentResponse, LocationListResponse, LocationResponse, LocationSummary,
    LoginRequest, MovementListResponse, MovementResponse, PersonSummary, ResetPasswordRequest,
    ResetPasswordResponse, ResolveLocationRequest, RestockEntryResponse, RestockListResponse,
    RestockRequest, RestockResponse, ReturnAssignmentRequest, TrackingSummaryResponse,
    UniqueAssetListResponse, UniqueAssetResponse, UpdateBulkAssetRequest, UpdateLocationRequest,
    UpdateUniqueAssetRequest, UpdateUserRequest, UserListResponse,
};
use railtrack::models::UserResponse;
use railtrack::state::AppState;
use railtrack::{build_router, handlers};

/// Security scheme for Bearer token
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::auth::login,
        handlers::auth::me,
        handlers::auth::change_password,
        handlers::auth::reset_password,
        handlers::user::list_users,
        handlers::user::get_user,
        handlers::user::create_user,
        handlers::user::update_user,
        handlers::user::delete_user,
        handlers::user::list_user_assignments,
        handlers::location::list_locations,
        handlers::location::get_location,
        handlers::location::create_location,
        handlers::location::resolve_location,
        handlers::location::update_location,
        handlers::location::delete_location,
        handlers::bulk_asset::create_bulk_asset,
        handlers::bulk_asset::list_bulk_assets,
        handlers::bulk_asset::get_bulk_asset,
        handlers::bulk_asset::update_bulk_asset,
        handlers::bulk_asset::delete_bulk_asset,
        handlers::bulk_asset::restock_bulk_asset,
        handlers::bulk_asset::list_restocks,
        handlers::bulk_asset::list_bulk_movements,
        handlers::unique_asset::create_unique_asset,
        handlers::unique_asset::list_unique_assets,
        handlers::unique_asset::get_unique_asset,
        handlers::unique_asset::update_unique_asset,
        handlers::unique_asset::delete_unique_asset,
        handlers::unique_asset::list_unique_movements,
        handlers::assignment::create_assignment,
        handlers::assignment::list_assignments,
        handlers::assignment::get_assignment,
        handlers::assignment::return_assignment,
        handlers::tracking::tracking_summary,
    ),
    components(schemas(
        UserRole,
        IndividualStatus,
        BulkStatus,
        MovementType,
        AssetCondition,
        LoginRequest,
        AuthResponse,
        ChangePasswordRequest,
        ResetPasswordRequest,
        ResetPasswordResponse,
        UserResponse,
        CreateUserRequest,
        CreateUserResponse,
        UpdateUserRequest,
        UserListResponse,
        LocationSummary,
        PersonSummary,
        CreateLocationRequest,
        UpdateLocationRequest,
        ResolveLocationRequest,
        LocationResponse,
        LocationListResponse,
        MovementResponse,
        MovementListResponse,
        CreateBulkAssetRequest,
        UpdateBulkAssetRequest,
        RestockRequest,
        BulkAssetResponse,
        BulkAssetListResponse,
        RestockEntryResponse,
        RestockResponse,
        RestockListResponse,
        CreateUniqueAssetRequest,
        UpdateUniqueAssetRequest,
        CurrentAssignmentResponse,
        UniqueAssetResponse,
        UniqueAssetListResponse,
        CreateAssignmentRequest,
        ReturnAssignmentRequest,
        AssignmentResponse,
        AssignmentListResponse,
        TrackingSummaryResponse,
    )),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Login and password management"),
        (name = "Users", description = "Staff records keyed by payroll number"),
        (name = "Locations", description = "Department and region locations"),
        (name = "Bulk Assets", description = "Stock-counted consumables and spares"),
        (name = "Unique Assets", description = "Serialised equipment tracking"),
        (name = "Assignments", description = "Issuing and returning assets"),
        (name = "Tracking", description = "Inventory dashboard counters")
    )
)]
struct ApiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,sqlx=warn,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env().context("Failed to load configuration")?;
    let addr = config.server_addr();

    tracing::info!("Connecting to database...");
    let state = AppState::new(config)
        .await
        .context("Failed to initialize application state")?;
    tracing::info!("Database ready, migrations applied");

    let app = build_router(state)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    tracing::info!("Server started on http://{}", addr);
    tracing::info!("Swagger UI: http://{}/swagger-ui/", addr);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
