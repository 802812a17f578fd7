use axum::http::{Method, StatusCode};
use serde_json::json;
use tower::ServiceExt;

use crate::db::types::UserRole;
use crate::repositories;
use crate::test_support;

#[tokio::test]
async fn issued_password_logs_in_and_must_be_replaced() {
    let ctx = test_support::setup_test_context().await;
    let pool = ctx.state.db();
    let staff = test_support::insert_user(pool, "affairs", "affairs-pass", UserRole::StaffAffairs).await;
    let student = test_support::insert_user(pool, "20231", "unused-pass", UserRole::Student).await;
    let staff_token = test_support::bearer_token(&staff.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            &format!("/api/students/{}/credentials", student.id),
            Some(&staff_token),
            None,
        ))
        .await
        .expect("issue credentials");
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = test_support::read_json(response).await;
    let one_time = body["one_time_password"].as_str().expect("password").to_string();
    assert_ne!(one_time, "20231");

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/token",
            None,
            Some(json!({ "username": "20231", "password": one_time })),
        ))
        .await
        .expect("token");
    assert_eq!(response.status(), StatusCode::OK);
    let body = test_support::read_json(response).await;
    assert_eq!(body["must_reset_password"], true);
    assert_eq!(body["role"], "STUDENT");
    let student_token = body["access_token"].as_str().expect("token").to_string();

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(
            Method::POST,
            "/api/auth/password",
            Some(&student_token),
            Some(json!({ "current_password": one_time, "new_password": "brand-new-pass" })),
        ))
        .await
        .expect("change password");
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let stored = repositories::users::find_by_id(pool, &student.id).await.expect("load").expect("user");
    assert!(!stored.must_reset_password);
}

#[tokio::test]
async fn students_cannot_manage_students() {
    let ctx = test_support::setup_test_context().await;
    let student = test_support::insert_user(ctx.state.db(), "s1", "student-pass", UserRole::Student).await;
    let token = test_support::bearer_token(&student.id, ctx.state.settings());

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::json_request(Method::GET, "/api/students", Some(&token), None))
        .await
        .expect("list students");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .app
        .clone()
        .oneshot(test_support::multipart_request(
            Method::POST,
            "/api/upload-students",
            Some(&token),
            &[],
            Some(("roster.xlsx", b"not a workbook".as_slice())),
        ))
        .await
        .expect("upload roster");
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
