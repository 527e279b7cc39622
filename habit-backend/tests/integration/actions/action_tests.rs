// tests/integration/actions/action_tests.rs
use crate::common::app_helper::setup_app;
use crate::common::auth_helper::{
    create_action, create_authenticated_request, read_json, signup_test_user, toggle_day,
};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_create_action_success() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "POST",
            "/actions",
            &user.access_token,
            Some(json!({ "action_title": "  Read 20 pages  " })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 201);

    let body = read_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["action_title"], "Read 20 pages");
    assert_eq!(body["data"]["user_id"], user.id.to_string());
    assert!(body["data"]["action_id"].is_string());
}

#[tokio::test]
async fn test_create_action_requires_authentication() {
    let (app, _db) = setup_app().await;

    let response = app
        .clone()
        .oneshot(crate::common::auth_helper::json_request(
            "POST",
            "/actions",
            json!({ "action_title": "Stretch" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
}

#[tokio::test]
async fn test_create_action_rejects_blank_title() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    for title in ["", "   "] {
        let response = app
            .clone()
            .oneshot(create_authenticated_request(
                "POST",
                "/actions",
                &user.access_token,
                Some(json!({ "action_title": title })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), 400, "title {:?}", title);
    }
}

#[tokio::test]
async fn test_create_action_in_future_month_is_rejected() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "POST",
            "/actions",
            &user.access_token,
            Some(json!({ "action_title": "Plan ahead", "year": 2024, "month": 6 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_list_actions_for_current_month() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let first = create_action(&app, &user, "Meditate").await;
    let second = create_action(&app, &user, "Run").await;
    toggle_day(&app, &user, first, (2024, 5, 1)).await;
    toggle_day(&app, &user, first, (2024, 5, 3)).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/actions",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = read_json(response).await;
    let data = &body["data"];
    assert_eq!(data["year"], 2024);
    assert_eq!(data["month"], 5);
    assert_eq!(data["days_in_month"], 31);
    assert_eq!(data["is_future_month"], false);

    let actions = data["actions"].as_array().unwrap();
    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0]["action_id"], first.to_string());
    assert_eq!(actions[0]["completed_days"], json!([1, 3]));
    assert_eq!(actions[1]["action_id"], second.to_string());
    assert_eq!(actions[1]["completed_days"], json!([]));
}

#[tokio::test]
async fn test_list_actions_for_other_month_excludes_current_records() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let action_id = create_action(&app, &user, "Journal").await;
    toggle_day(&app, &user, action_id, (2024, 5, 2)).await;
    toggle_day(&app, &user, action_id, (2024, 4, 30)).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/actions?year=2024&month=4",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 200);

    let body = read_json(response).await;
    assert_eq!(body["data"]["days_in_month"], 30);
    assert_eq!(body["data"]["actions"][0]["completed_days"], json!([30]));

    let future = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/actions?year=2024&month=7",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(future.status(), 200);

    let body = read_json(future).await;
    assert_eq!(body["data"]["is_future_month"], true);
}

#[tokio::test]
async fn test_list_actions_rejects_invalid_month() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/actions?year=2024&month=13",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn test_actions_are_scoped_to_owner() {
    let (app, _db) = setup_app().await;
    let alice = signup_test_user(&app).await;
    let bob = signup_test_user(&app).await;

    let action_id = create_action(&app, &alice, "Alice only").await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/actions",
            &bob.access_token,
            None,
        ))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert!(body["data"]["actions"].as_array().unwrap().is_empty());

    // 他人のアクションは存在しないものとして扱う
    let delete = app
        .clone()
        .oneshot(create_authenticated_request(
            "DELETE",
            &format!("/actions/{}", action_id),
            &bob.access_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(delete.status(), 404);
}

#[tokio::test]
async fn test_delete_action_removes_it() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let action_id = create_action(&app, &user, "Temporary").await;
    toggle_day(&app, &user, action_id, (2024, 5, 4)).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "DELETE",
            &format!("/actions/{}", action_id),
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let again = app
        .clone()
        .oneshot(create_authenticated_request(
            "DELETE",
            &format!("/actions/{}", action_id),
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(again.status(), 404);

    let list = app
        .clone()
        .oneshot(create_authenticated_request(
            "GET",
            "/actions",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();
    let body = read_json(list).await;
    assert!(body["data"]["actions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_invalid_action_id_format() {
    let (app, _db) = setup_app().await;
    let user = signup_test_user(&app).await;

    let response = app
        .clone()
        .oneshot(create_authenticated_request(
            "DELETE",
            "/actions/not-a-uuid",
            &user.access_token,
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), 400);
}
