mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::factory::unique_suffix;
use common::{Factory, TestApp};
use railtrack::entity::sea_orm_active_enums::UserRole;

#[tokio::test]
async fn test_create_user_without_password_gets_temporary_one() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let payroll_number = format!("N{}", unique_suffix());

    let response = app
        .server
        .post("/api/users")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({
            "payroll_number": payroll_number,
            "name": "Grace Points",
            "role": "keeper"
        }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["user"]["payroll_number"], payroll_number.as_str());
    assert_eq!(body["user"]["must_change_password"], true);
    let temporary = body["temporary_password"].as_str().unwrap();
    assert_eq!(temporary.len(), 12);

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "payroll_number": payroll_number,
            "password": temporary
        }))
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_create_user_with_password_has_no_temporary_password() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;

    let response = app
        .server
        .post("/api/users")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({
            "payroll_number": format!("N{}", unique_suffix()),
            "name": "Linus Ballast",
            "role": "viewer",
            "password": "ChosenPassword9"
        }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert!(body["temporary_password"].is_null());
    assert_eq!(body["user"]["must_change_password"], false);
}

#[tokio::test]
async fn test_create_user_resolves_default_location_by_names() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let suffix = unique_suffix();

    let response = app
        .server
        .post("/api/users")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({
            "payroll_number": format!("N{}", suffix),
            "name": "Ada Signal",
            "role": "keeper",
            "department_name": format!("Permanent Way {}", suffix),
            "region_name": "Coast"
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    let location_id = body["user"]["default_location_id"].as_i64().unwrap();

    // Same pair, different case, resolves to the same location
    let response = app
        .server
        .post("/api/locations/resolve")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({
            "department_name": format!("PERMANENT WAY {}", suffix.to_uppercase()),
            "region_name": "coast"
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["location_id"].as_i64().unwrap(), location_id);
}

#[tokio::test]
async fn test_create_user_duplicate_payroll_number() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let existing = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/users")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({
            "payroll_number": existing.payroll_number,
            "name": "Duplicate",
            "role": "viewer"
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_create_user_requires_admin() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;

    let response = app
        .server
        .post("/api/users")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "payroll_number": format!("N{}", unique_suffix()),
            "name": "Not Allowed",
            "role": "viewer"
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_search_users_by_payroll_number() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let viewer = factory.create_viewer().await;
    let target = factory.create_user_record(UserRole::Keeper, None).await;

    let response = app
        .server
        .get("/api/users")
        .add_query_param("search", target.payroll_number.to_lowercase())
        .add_header("Authorization", viewer.auth_header())
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(
        body["data"][0]["payroll_number"],
        target.payroll_number.as_str()
    );
}

#[tokio::test]
async fn test_user_can_edit_own_name_but_not_role() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let viewer = factory.create_viewer().await;
    let path = format!("/api/users/{}", viewer.payroll_number);

    let response = app
        .server
        .put(&path)
        .add_header("Authorization", viewer.auth_header())
        .json(&json!({ "name": "Renamed Viewer" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["name"], "Renamed Viewer");

    let response = app
        .server
        .put(&path)
        .add_header("Authorization", viewer.auth_header())
        .json(&json!({ "role": "admin" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_user_cannot_edit_someone_else() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let other = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .put(&format!("/api/users/{}", other.payroll_number))
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({ "name": "Hijacked" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_admin_changes_role() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let other = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .put(&format!("/api/users/{}", other.payroll_number))
        .add_header("Authorization", admin.auth_header())
        .json(&json!({ "role": "keeper" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["role"], "keeper");
}

#[tokio::test]
async fn test_delete_user() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let other = factory.create_user_record(UserRole::Viewer, None).await;
    let path = format!("/api/users/{}", other.payroll_number);

    let response = app
        .server
        .delete(&path)
        .add_header("Authorization", admin.auth_header())
        .await;
    response.assert_status(StatusCode::OK);

    let response = app
        .server
        .get(&path)
        .add_header("Authorization", admin.auth_header())
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_get_unknown_user() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let viewer = factory.create_viewer().await;

    let response = app
        .server
        .get("/api/users/NOBODY-HERE")
        .add_header("Authorization", viewer.auth_header())
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "User NOBODY-HERE not found");
}
