mod common;

use axum::http::StatusCode;
use sea_orm::{ActiveModelTrait, EntityTrait, Set};
use serde_json::json;
use time::{Duration, OffsetDateTime};

use common::{Factory, TestApp};
use railtrack::entity::asset_assignment;
use railtrack::entity::sea_orm_active_enums::UserRole;
use railtrack::repositories::{AssetRepository, MovementRepository, Repository};

#[tokio::test]
async fn test_assign_bulk_stock_to_user_elsewhere() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let store = factory.create_location().await;
    let depot = factory.create_location().await;
    let asset = factory
        .create_bulk_asset(store.location_id, None, 100, 20)
        .await;
    let worker = factory
        .create_user_record(UserRole::Viewer, Some(depot.location_id))
        .await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": asset.asset_id,
            "assigned_to": worker.payroll_number,
            "quantity": 30
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["quantity"], 30);
    assert_eq!(body["assigned_by"], keeper.payroll_number.as_str());
    assert_eq!(body["condition_issued"], "good");
    assert_eq!(body["is_active"], true);

    let stored = AssetRepository::find_by_id(&app.state.db, asset.asset_id)
        .await
        .unwrap();
    assert_eq!(stored.bulk().unwrap().current_stock_level, 70);
    assert_eq!(stored.location_id, Some(depot.location_id));
    assert_eq!(
        stored.keeper_payroll_number.as_deref(),
        Some(worker.payroll_number.as_str())
    );

    // Opening stock plus one assignment movement
    let movements = MovementRepository::list_for_asset(&app.state.db, asset.asset_id, 10, 0)
        .await
        .unwrap();
    assert_eq!(movements.len(), 2);
    assert_eq!(movements[0].quantity, 30);
    assert_eq!(movements[0].from_location_id, Some(store.location_id));
    assert_eq!(movements[0].to_location_id, Some(depot.location_id));

    let response = app
        .server
        .get("/api/assignments")
        .add_query_param("asset_id", asset.asset_id)
        .add_header("Authorization", keeper.auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 1);
}

#[tokio::test]
async fn test_assign_in_place_logs_no_movement() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let store = factory.create_location().await;
    let asset = factory
        .create_bulk_asset(store.location_id, None, 10, 2)
        .await;
    let worker = factory
        .create_user_record(UserRole::Viewer, Some(store.location_id))
        .await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": asset.asset_id,
            "assigned_to": worker.payroll_number,
            "quantity": 4
        }))
        .await;
    response.assert_status(StatusCode::OK);

    let total = MovementRepository::count_for_asset(&app.state.db, asset.asset_id)
        .await
        .unwrap();
    assert_eq!(total, 1);
}

#[tokio::test]
async fn test_location_override_wins_over_default() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let store = factory.create_location().await;
    let home = factory.create_location().await;
    let site = factory.create_location().await;
    let radio = factory.create_unique_asset(store.location_id).await;
    let worker = factory
        .create_user_record(UserRole::Viewer, Some(home.location_id))
        .await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": worker.payroll_number,
            "location_id": site.location_id
        }))
        .await;
    response.assert_status(StatusCode::OK);

    let stored = AssetRepository::find_by_id(&app.state.db, radio.asset_id)
        .await
        .unwrap();
    assert_eq!(stored.location_id, Some(site.location_id));
}

#[tokio::test]
async fn test_unique_asset_cannot_be_assigned_twice() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;
    let first = factory
        .create_user_record(UserRole::Viewer, Some(location.location_id))
        .await;
    let second = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": first.payroll_number
        }))
        .await;
    response.assert_status(StatusCode::OK);

    let movements_before = MovementRepository::count_for_asset(&app.state.db, radio.asset_id)
        .await
        .unwrap();

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": second.payroll_number
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Asset is already assigned");

    let stored = AssetRepository::find_by_id(&app.state.db, radio.asset_id)
        .await
        .unwrap();
    assert_eq!(
        stored.keeper_payroll_number.as_deref(),
        Some(first.payroll_number.as_str())
    );
    let movements_after = MovementRepository::count_for_asset(&app.state.db, radio.asset_id)
        .await
        .unwrap();
    assert_eq!(movements_before, movements_after);
}

#[tokio::test]
async fn test_unique_asset_quantity_must_be_one() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": worker.payroll_number,
            "quantity": 2
        }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .get("/api/assignments")
        .add_query_param("asset_id", radio.asset_id)
        .add_header("Authorization", keeper.auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 0);
}

#[tokio::test]
async fn test_insufficient_stock_changes_nothing() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let asset = factory
        .create_bulk_asset(location.location_id, None, 5, 2)
        .await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": asset.asset_id,
            "assigned_to": worker.payroll_number,
            "quantity": 6
        }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["error"], "Insufficient stock");

    let stored = AssetRepository::find_by_id(&app.state.db, asset.asset_id)
        .await
        .unwrap();
    assert_eq!(stored.bulk().unwrap().current_stock_level, 5);
}

#[tokio::test]
async fn test_assign_to_unknown_user() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": "NOBODY-HERE"
        }))
        .await;

    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_viewer_cannot_assign() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let viewer = factory.create_viewer().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", viewer.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": viewer.payroll_number
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_return_unique_asset_makes_it_available() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": worker.payroll_number
        }))
        .await;
    let body: serde_json::Value = response.json();
    let assignment_id = body["assignment_id"].as_i64().unwrap();
    let return_path = format!("/api/assignments/{}/return", assignment_id);

    let response = app
        .server
        .post(&return_path)
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({ "condition_returned": "fair" }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["is_active"], false);
    assert_eq!(body["condition_returned"], "fair");
    assert_eq!(body["quantity_returned"], 1);

    let response = app
        .server
        .get(&format!("/api/unique-assets/{}", radio.asset_id))
        .add_header("Authorization", keeper.auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "available");
    assert!(body["current_assignment"].is_null());
    assert_eq!(body["latest_movement"]["movement_type"], "return");

    // A second return is refused
    let response = app
        .server
        .post(&return_path)
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({}))
        .await;
    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "Assignment has already been returned");

    // The asset can be issued again
    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": worker.payroll_number
        }))
        .await;
    response.assert_status(StatusCode::OK);
}

#[tokio::test]
async fn test_partial_bulk_return_restores_stock() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let asset = factory
        .create_bulk_asset(location.location_id, None, 10, 2)
        .await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": asset.asset_id,
            "assigned_to": worker.payroll_number,
            "quantity": 10
        }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    let assignment_id = body["assignment_id"].as_i64().unwrap();

    let stored = AssetRepository::find_by_id(&app.state.db, asset.asset_id)
        .await
        .unwrap();
    assert_eq!(stored.bulk().unwrap().current_stock_level, 0);

    let response = app
        .server
        .post(&format!("/api/assignments/{}/return", assignment_id))
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({ "quantity_returned": 11 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = app
        .server
        .post(&format!("/api/assignments/{}/return", assignment_id))
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({ "quantity_returned": 7 }))
        .await;
    response.assert_status(StatusCode::OK);

    let response = app
        .server
        .get(&format!("/api/bulk-assets/{}", asset.asset_id))
        .add_header("Authorization", keeper.auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["current_stock_level"], 7);
    assert_eq!(body["status"], "active");
    assert_eq!(body["latest_movement"]["movement_type"], "return");
    assert_eq!(body["latest_movement"]["quantity"], 7);
}

#[tokio::test]
async fn test_filter_active_assignments_for_user() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let first = factory.create_unique_asset(location.location_id).await;
    let second = factory.create_unique_asset(location.location_id).await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    let mut ids = Vec::new();
    for asset_id in [first.asset_id, second.asset_id] {
        let response = app
            .server
            .post("/api/assignments")
            .add_header("Authorization", keeper.auth_header())
            .json(&json!({
                "asset_id": asset_id,
                "assigned_to": worker.payroll_number
            }))
            .await;
        response.assert_status(StatusCode::OK);
        let body: serde_json::Value = response.json();
        ids.push(body["assignment_id"].as_i64().unwrap());
    }

    let response = app
        .server
        .post(&format!("/api/assignments/{}/return", ids[0]))
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({}))
        .await;
    response.assert_status(StatusCode::OK);

    let response = app
        .server
        .get("/api/assignments")
        .add_query_param("assigned_to", &worker.payroll_number)
        .add_query_param("active_only", true)
        .add_header("Authorization", keeper.auth_header())
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["assignment_id"], ids[1]);

    let response = app
        .server
        .get(&format!("/api/users/{}/assignments", worker.payroll_number))
        .add_header("Authorization", keeper.auth_header())
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 2);

    let response = app
        .server
        .get(&format!("/api/assignments/{}", ids[0]))
        .add_header("Authorization", keeper.auth_header())
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["is_active"], false);
}

#[tokio::test]
async fn test_cannot_delete_user_with_assignments() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": worker.payroll_number
        }))
        .await;
    response.assert_status(StatusCode::OK);

    let response = app
        .server
        .delete(&format!("/api/users/{}", worker.payroll_number))
        .add_header("Authorization", admin.auth_header())
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: serde_json::Value = response.json();
    assert_eq!(body["message"], "User still has assignment records");
}

async fn backdate_assignment(app: &TestApp, assignment_id: i64, age: Duration) {
    let model = asset_assignment::Entity::find_by_id(assignment_id as i32)
        .one(&app.state.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: asset_assignment::ActiveModel = model.into();
    active.date_issued = Set(OffsetDateTime::now_utc() - age);
    active.update(&app.state.db).await.unwrap();
}

async fn overdue_total(app: &TestApp, auth: &str) -> i64 {
    let response = app
        .server
        .get("/api/tracking/summary")
        .add_header("Authorization", auth)
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    body["overdue_assignments"].as_i64().unwrap()
}

#[tokio::test]
async fn test_overdue_starts_after_threshold_days() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": worker.payroll_number
        }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    let assignment_id = body["assignment_id"].as_i64().unwrap();

    let baseline = overdue_total(&app, &keeper.auth_header()).await;

    // Exactly the threshold: still on time
    backdate_assignment(&app, assignment_id, Duration::days(30)).await;

    let response = app
        .server
        .get("/api/assignments")
        .add_query_param("asset_id", radio.asset_id)
        .add_query_param("overdue_only", true)
        .add_header("Authorization", keeper.auth_header())
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 0);
    assert_eq!(overdue_total(&app, &keeper.auth_header()).await, baseline);

    backdate_assignment(&app, assignment_id, Duration::days(31) + Duration::minutes(1)).await;

    let response = app
        .server
        .get("/api/assignments")
        .add_query_param("asset_id", radio.asset_id)
        .add_query_param("overdue_only", true)
        .add_header("Authorization", keeper.auth_header())
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["total"], 1);
    assert_eq!(body["data"][0]["assignment_id"], assignment_id);
    assert_eq!(body["data"][0]["days_since_issued"], 31);
    assert_eq!(body["data"][0]["is_overdue"], true);
    assert_eq!(
        overdue_total(&app, &keeper.auth_header()).await,
        baseline + 1
    );
}

#[tokio::test]
async fn test_keeper_cannot_issue_on_behalf_of_another_user() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let other_keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": worker.payroll_number,
            "assigned_by": other_keeper.payroll_number
        }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let stored = AssetRepository::find_by_id(&app.state.db, radio.asset_id)
        .await
        .unwrap();
    assert!(stored.keeper_payroll_number.is_none());

    // Naming yourself is the same as leaving it out
    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": worker.payroll_number,
            "assigned_by": keeper.payroll_number
        }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["assigned_by"], keeper.payroll_number.as_str());
}

#[tokio::test]
async fn test_admin_can_record_another_issuer() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let admin = factory.create_admin().await;
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", admin.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": worker.payroll_number,
            "assigned_by": keeper.payroll_number
        }))
        .await;

    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    assert_eq!(body["assigned_by"], keeper.payroll_number.as_str());
}

#[tokio::test]
async fn test_asset_in_maintenance_cannot_be_assigned() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    for status in ["maintenance", "disposed"] {
        let response = app
            .server
            .put(&format!("/api/unique-assets/{}", radio.asset_id))
            .add_header("Authorization", keeper.auth_header())
            .json(&json!({ "status": status }))
            .await;
        response.assert_status(StatusCode::OK);

        let response = app
            .server
            .post("/api/assignments")
            .add_header("Authorization", keeper.auth_header())
            .json(&json!({
                "asset_id": radio.asset_id,
                "assigned_to": worker.payroll_number
            }))
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body: serde_json::Value = response.json();
        assert_eq!(body["message"], "Only available assets can be assigned");

        let response = app
            .server
            .get(&format!("/api/unique-assets/{}", radio.asset_id))
            .add_header("Authorization", keeper.auth_header())
            .await;
        let body: serde_json::Value = response.json();
        assert_eq!(body["status"], status);
        assert!(body["current_assignment"].is_null());
    }
}

#[tokio::test]
async fn test_return_keeps_maintenance_status() {
    let app = TestApp::new().await;
    let factory = Factory::new(&app.state);
    let keeper = factory.create_keeper().await;
    let location = factory.create_location().await;
    let radio = factory.create_unique_asset(location.location_id).await;
    let worker = factory.create_user_record(UserRole::Viewer, None).await;

    let response = app
        .server
        .post("/api/assignments")
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({
            "asset_id": radio.asset_id,
            "assigned_to": worker.payroll_number
        }))
        .await;
    response.assert_status(StatusCode::OK);
    let body: serde_json::Value = response.json();
    let assignment_id = body["assignment_id"].as_i64().unwrap();

    let response = app
        .server
        .put(&format!("/api/unique-assets/{}", radio.asset_id))
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({ "status": "maintenance" }))
        .await;
    response.assert_status(StatusCode::OK);

    let response = app
        .server
        .post(&format!("/api/assignments/{}/return", assignment_id))
        .add_header("Authorization", keeper.auth_header())
        .json(&json!({ "condition_returned": "damaged" }))
        .await;
    response.assert_status(StatusCode::OK);

    let response = app
        .server
        .get(&format!("/api/unique-assets/{}", radio.asset_id))
        .add_header("Authorization", keeper.auth_header())
        .await;
    let body: serde_json::Value = response.json();
    assert_eq!(body["status"], "maintenance");
}
