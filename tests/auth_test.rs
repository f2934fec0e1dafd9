mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::factory::TEST_PASSWORD;
use common::{Factory, TestApp};
use railtrack::entity::sea_orm_active_enums::UserRole;
use railtrack::repositories::{Repository, UserRepository};
use railtrack::services::AuthService;

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let user = factory.create_user_record(UserRole::Keeper, None).await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "payroll_number": user.payroll_number,
            "password": TEST_PASSWORD
        }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert!(body["token"].as_str().is_some());
    assert_eq!(body["must_change_password"], false);
    assert_eq!(body["user"]["payroll_number"], user.payroll_number.as_str());
    assert_eq!(body["user"]["role"], "keeper");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let user = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "payroll_number": user.payroll_number,
            "password": "not-the-password"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);

    let body: serde_json::Value = response.json();
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Invalid credentials");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let app = TestApp::new().await;

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "payroll_number": "NO-SUCH-USER",
            "password": TEST_PASSWORD
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_returns_current_user() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let auth = factory.create_admin().await;

    let response = app
        .server
        .get("/api/auth/me")
        .add_header("Authorization", auth.auth_header())
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    assert_eq!(body["payroll_number"], auth.payroll_number.as_str());
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;

    let response = app.server.get("/api/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = app
        .server
        .get("/api/auth/me")
        .add_header("Authorization", "Bearer not-a-jwt")
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_change_password_with_wrong_current_password_keeps_hash() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let auth = factory.create_keeper().await;

    let before = UserRepository::find_by_id(&app.state.db, auth.payroll_number.clone())
        .await
        .unwrap();

    let response = app
        .server
        .post("/api/auth/change-password")
        .add_header("Authorization", auth.auth_header())
        .json(&json!({
            "current_password": "wrong-password",
            "new_password": "BrandNewPassword1"
        }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);

    let after = UserRepository::find_by_id(&app.state.db, auth.payroll_number.clone())
        .await
        .unwrap();
    assert_eq!(before.password_hash, after.password_hash);
}

#[tokio::test]
async fn test_change_password_success() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let auth = factory.create_keeper().await;

    let response = app
        .server
        .post("/api/auth/change-password")
        .add_header("Authorization", auth.auth_header())
        .json(&json!({
            "current_password": TEST_PASSWORD,
            "new_password": "BrandNewPassword1"
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["must_change_password"], false);

    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "payroll_number": auth.payroll_number,
            "password": "BrandNewPassword1"
        }))
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_change_password_too_short() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let auth = factory.create_viewer().await;

    let response = app
        .server
        .post("/api/auth/change-password")
        .add_header("Authorization", auth.auth_header())
        .json(&json!({
            "current_password": TEST_PASSWORD,
            "new_password": "short"
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reset_password_issues_temporary_password() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let target = factory.create_user_record(UserRole::Keeper, None).await;

    let response = app
        .server
        .post("/api/auth/reset-password")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({ "payroll_number": target.payroll_number }))
        .await;

    response.assert_status(StatusCode::OK);

    let body: serde_json::Value = response.json();
    let temporary = body["temporary_password"].as_str().unwrap().to_string();
    assert_eq!(temporary.len(), 12);
    assert_eq!(body["must_change_password"], true);

    let updated = UserRepository::find_by_id(&app.state.db, target.payroll_number.clone())
        .await
        .unwrap();
    assert!(updated.must_change_password);
    assert_ne!(updated.password_hash, target.password_hash);
    assert!(AuthService::verify_password(&temporary, &updated.password_hash).unwrap());
    assert!(!AuthService::verify_password(TEST_PASSWORD, &updated.password_hash).unwrap());

    // The next login reports the pending password change
    let response = app
        .server
        .post("/api/auth/login")
        .json(&json!({
            "payroll_number": target.payroll_number,
            "password": temporary
        }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["must_change_password"], true);
}

#[tokio::test]
async fn test_reset_password_requires_admin() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let target = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/auth/reset-password")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({ "payroll_number": target.payroll_number }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}
