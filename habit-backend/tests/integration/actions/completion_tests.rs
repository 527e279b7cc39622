// tests/integration/actions/completion_tests.rs
use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{
    create_action, create_authenticated_request, read_json, signup_test_user, toggle_day,
};
use habit_backend::domain::action_completion_model;
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_toggle_alternates_completion() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;
    let action_id = create_action(&app, &user, "Drink water").await;

    assert!(toggle_day(&app, &user, action_id, (2024, 5, 5)).await);
    assert!(!toggle_day(&app, &user, action_id, (2024, 5, 5)).await);
    assert!(toggle_day(&app, &user, action_id, (2024, 5, 5)).await);
}

#[tokio::test]
async fn test_toggle_today_is_allowed() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;
    let action_id = create_action(&app, &user, "Walk").await;

    assert!(toggle_day(&app, &user, action_id, (2024, 5, 10)).await);
}

#[tokio::test]
async fn test_toggle_future_day_is_rejected_without_record() {
    let (app, db) = setup_app().await;
    let user = signup_test_user(&app).await;
    let action_id = create_action(&app, &user, "Tomorrow").await;

    for (year, month, day) in [(2024, 5, 11), (2024, 6, 1), (2025, 1, 1)] {
        let response = app
            .clone()
            .oneshot(create_authenticated_request(
                "POST",
                &format!("/actions/{}/toggle", action_id),
                &user.access_token,
                Some(json!({ "year": year, "month": month, "day": day })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "{}-{}-{}", year, month, day);
    }

    let stored = action_completion_model::Entity::find()
        .filter(action_completion_model::Column::ActionId.eq(action_id))
        .count(&db.connection)
        .await
        .unwrap();
    assert_eq!(stored, 0);
}

#[tokio::test]
async fn test_toggle_invalid_date_is_rejected() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;
    let action_id = create_action(&app, &user, "Calendar").await;

    for (year, month, day) in [(2024, 2, 30), (2023, 2, 29), (2024, 4, 31), (2024, 5, 0)] {
        let response = app
            .clone()
            .oneshot(create_authenticated_request(
                "POST",
                &format!("/actions/{}/toggle", action_id),
                &user.access_token,
                Some(json!({ "year": year, "month": month, "day": day })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "{}-{}-{}", year, month, day);
    }

    // 閏年の 2/29 は有効
    assert!(toggle_day(&app, &user, action_id, (2024, 2, 29)).await);
}

#[tokio::test]
async fn test_toggle_other_users_action_is_not_found() {
    let (app, _db) = setup_app().await;
    let alice = signup_test_user(&app).await;
    let bob = signup_test_user(&app).await;
    let action_id = create_action(&app, &alice, "Private").await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "POST",
            &format!("/actions/{}/toggle", action_id),
            &bob.access_token,
            Some(json!({ "year": 2024, "month": 5, "day": 1 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_set_notes_creates_and_updates_record() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;
    let action_id = create_action(&app, &user, "Practice guitar").await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "PATCH",
            &format!("/actions/{}/notes", action_id),
            &user.access_token,
            Some(json!({ "year": 2024, "month": 5, "day": 7, "notes": "  scales only  " })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = read_json(response).await;
    assert_eq!(body["data"]["notes"], "scales only");
    assert_eq!(body["data"]["completed"], false);

    // メモの付いた日を達成にしてもメモは残る
    assert!(toggle_day(&app, &user, action_id, (2024, 5, 7)).await);

    let list = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/actions?year=2024&month=5",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    let body = read_json(list).await;
    let action = &body["data"]["actions"][0];
    assert_eq!(action["completed_days"], json!([7]));
    assert_eq!(action["notes"]["7"], "scales only");

    // 空文字でメモを消す
    let cleared = app
        .clone()
        .oneshot(create_authenticated_request(
            "PATCH",
            &format!("/actions/{}/notes", action_id),
            &user.access_token,
            Some(json!({ "year": 2024, "month": 5, "day": 7, "notes": "   " })),
        ))
        .await
        .unwrap();
    assert_eq!(cleared.status(), 200);

    let body = read_json(cleared).await;
    assert!(body["data"]["notes"].is_null());
    assert_eq!(body["data"]["completed"], true);
}

#[tokio::test]
async fn test_set_notes_rejects_future_day() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;
    let action_id = create_action(&app, &user, "Later").await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "PATCH",
            &format!("/actions/{}/notes", action_id),
            &user.access_token,
            Some(json!({ "year": 2024, "month": 5, "day": 20, "notes": "too early" })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}
