use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn level_creation_stops_at_the_cap() {
    let ctx = test_support::setup_test_context().await;
    let admin = test_support::insert_user(ctx.state.db(), "admin", "admin-pass", UserRole::Admin).await;
    let token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let cap = ctx.state.settings().academic().max_levels;

    for index in 0..cap {
        let response = ctx
            .app
            .clone()
            .oneshot(test_support::json_request(
                Method::POST,
                "/api/levels",
                Some(&token),
                Some(json!({ "name": format!("Level {index}") })),
            ))
            .await
            .expect("create level");
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/levels",
            Some(&token),
            Some(json!({ "name": "One Too Many" })),
        ))
        .await
        .expect("create level");

    let status = response.status();
    let body = test_support::read_json(response).await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "response: {body}");
    assert_eq!(repositories::levels::count(ctx.state.db()).await.expect("count"), cap);
}

#[tokio::test]
async fn staff_destroy_files_a_request_and_admin_approves_it() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();
    let admin = test_support::insert_user(pool, "admin", "admin-pass", UserRole::Admin).await;
    let staff = test_support::insert_user(pool, "affairs", "affairs-pass", UserRole::StaffAffairs).await;
    let admin_token = test_support::bearer_token(&admin.id, ctx.state.settings());
    let staff_token = test_support::bearer_token(&staff.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/academic-years",
            Some(&staff_token),
            Some(json!({ "year": "2024/2025" })),
        ))
        .await
        .expect("create year");
    assert_eq!(response.status(), StatusCode::CREATED);
    let year_id = test_support::read_json(response).await["id"].as_str().expect("id").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::DELETE,
            &format!("/api/academic-years/{year_id}"),
            Some(&staff_token),
            None,
        ))
        .await
        .expect("destroy year");
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    let body = test_support::read_json(response).await;
    assert_eq!(body["request"]["target_name"], "2024/2025");
    let request_id = body["request"]["id"].as_str().expect("request id").to_string();
    assert!(repositories::academic_years::find_by_id(pool, &year_id).await.expect("find").is_some());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/deletion-requests/approve",
            Some(&staff_token),
            Some(json!({ "ids": [request_id] })),
        ))
        .await
        .expect("approve as staff");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/deletion-requests/approve",
            Some(&admin_token),
            Some(json!({ "ids": [request_id, "missing"] })),
        ))
        .await
        .expect("approve");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["results"][0]["status"], "approved");
    assert_eq!(body["results"][1]["status"], "not_found");
    assert!(repositories::academic_years::find_by_id(pool, &year_id).await.expect("find").is_none());
}

#[tokio::test]
async fn doctors_cannot_create_structure() {
    let ctx = test_support::setup_test_context().await;
    let doctor = test_support::insert_user(ctx.state.db(), "dr", "doctor-pass", UserRole::Doctor).await;
    let token = test_support::bearer_token(&doctor.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/levels",
            Some(&token),
            Some(json!({ "name": "First Year" })),
        ))
        .await
        .expect("create level");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/doctor/courses", Some(&token), None))
        .await
        .expect("doctor courses");
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(test_support::read_json(response).await, json!([]));
}
