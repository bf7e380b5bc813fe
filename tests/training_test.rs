mod common;

use axum::http::StatusCode;
use coachdiary::models::UserRole;
use serde_json::{json, Value};

fn two_exercises() -> Value {
    json!([
        { "exercise_id": 1, "order_index": 0, "sets_count": 5, "weight": 100.0 },
        { "exercise_id": 2, "order_index": 1, "sets_count": 3, "weight": 80.5 },
    ])
}

fn exercise_ids(training: &Value) -> Vec<i64> {
    training["exercises"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["exercise_id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_full_training_lifecycle() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, training) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        two_exercises(),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(training["status"], "scheduled");
    assert!(training["start_at"].is_null());
    assert!(training["end_at"].is_null());
    let id = training["id"].as_i64().unwrap();

    let (status, started) = common::send(
        &app,
        "PATCH",
        &format!("/trainings/{}/start", id),
        Some(&paired.client_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["status"], "in_progress");
    assert!(started["start_at"].is_string());

    let (status, finished) = common::send(
        &app,
        "PATCH",
        &format!("/trainings/{}/finish", id),
        Some(&paired.client_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finished["status"], "finished");

    let (status, list) =
        common::send(&app, "GET", "/trainings", Some(&paired.client_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0]["id"], id);
    assert!(list[0]["start_at"].is_string());
    assert!(list[0]["end_at"].is_string());
    assert_eq!(exercise_ids(&list[0]), vec![1, 2]);

    let start_at = chrono::DateTime::parse_from_rfc3339(list[0]["start_at"].as_str().unwrap())
        .unwrap();
    let end_at =
        chrono::DateTime::parse_from_rfc3339(list[0]["end_at"].as_str().unwrap()).unwrap();
    assert!(start_at <= end_at);

    // Finished trainings cannot be restarted
    let (status, _) = common::send(
        &app,
        "PATCH",
        &format!("/trainings/{}/start", id),
        Some(&paired.client_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_exercises_are_returned_in_order_index_order() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, training) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        json!([
            { "exercise_id": 4, "order_index": 2, "sets_count": 3, "set_duration": 60 },
            { "exercise_id": 3, "order_index": 0, "sets_count": 1 },
            { "exercise_id": 5, "order_index": 1, "sets_count": 4 },
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(exercise_ids(&training), vec![3, 5, 4]);
    assert_eq!(training["exercises"][2]["set_duration"], 60);
    assert!(training["exercises"][0]["weight"].is_null());
}

#[tokio::test]
async fn test_start_twice_conflicts() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;
    let (_, training) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        json!([]),
    )
    .await;
    let uri = format!("/trainings/{}/start", training["id"]);

    let (status, _) = common::send(&app, "PATCH", &uri, Some(&paired.client_token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        common::send(&app, "PATCH", &uri, Some(&paired.client_token), None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Training already started");
}

#[tokio::test]
async fn test_finish_before_start_conflicts() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;
    let (_, training) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        json!([]),
    )
    .await;

    let (status, body) = common::send(
        &app,
        "PATCH",
        &format!("/trainings/{}/finish", training["id"]),
        Some(&paired.client_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Training has not started yet");
}

#[tokio::test]
async fn test_finish_twice_conflicts() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;
    let (_, training) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        json!([]),
    )
    .await;
    let id = training["id"].as_i64().unwrap();
    let token = Some(paired.client_token.as_str());

    common::send(&app, "PATCH", &format!("/trainings/{}/start", id), token, None).await;
    let finish = format!("/trainings/{}/finish", id);
    let (status, _) = common::send(&app, "PATCH", &finish, token, None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = common::send(&app, "PATCH", &finish, token, None).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Training already finished");
}

#[tokio::test]
async fn test_trainer_cannot_start_or_finish() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;
    let (_, training) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        json!([]),
    )
    .await;
    let id = training["id"].as_i64().unwrap();

    for action in ["start", "finish"] {
        let (status, _) = common::send(
            &app,
            "PATCH",
            &format!("/trainings/{}/{}", id, action),
            Some(&paired.trainer_token),
            None,
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    let (_, list) =
        common::send(&app, "GET", "/trainings", Some(&paired.trainer_token), None).await;
    assert!(list[0]["start_at"].is_null());
}

#[tokio::test]
async fn test_client_of_other_diary_is_forbidden() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let first = common::create_paired_diary(&pool, &app, "a").await;
    let second = common::create_paired_diary(&pool, &app, "b").await;
    let (_, training) = common::create_training(
        &app,
        &first.trainer_token,
        first.diary_id,
        "2024-05-01",
        json!([]),
    )
    .await;
    let id = training["id"].as_i64().unwrap();

    let (status, _) = common::send(
        &app,
        "PATCH",
        &format!("/trainings/{}/start", id),
        Some(&second.client_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = common::send(
        &app,
        "DELETE",
        &format!("/trainings/{}", id),
        Some(&second.trainer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(common::count_rows(&pool, "trainings"), 1);
}

#[tokio::test]
async fn test_missing_training_not_found() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, _) = common::send(
        &app,
        "PATCH",
        "/trainings/999/start",
        Some(&paired.client_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = common::send(
        &app,
        "DELETE",
        "/trainings/999",
        Some(&paired.trainer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_with_missing_exercises_creates_nothing() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, body) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        json!([
            { "exercise_id": 1, "order_index": 0, "sets_count": 3 },
            { "exercise_id": 777, "order_index": 1, "sets_count": 3 },
            { "exercise_id": 555, "order_index": 2, "sets_count": 3 },
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Exercises not found: 555, 777");
    assert_eq!(common::count_rows(&pool, "trainings"), 0);
    assert_eq!(common::count_rows(&pool, "training_exercises"), 0);
}

#[tokio::test]
async fn test_duplicate_exercise_rolls_back_training() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, _) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        json!([
            { "exercise_id": 1, "order_index": 0, "sets_count": 3 },
            { "exercise_id": 1, "order_index": 1, "sets_count": 2 },
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(common::count_rows(&pool, "trainings"), 0);
    assert_eq!(common::count_rows(&pool, "training_exercises"), 0);
}

#[tokio::test]
async fn test_create_in_foreign_diary_forbidden() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let first = common::create_paired_diary(&pool, &app, "a").await;
    let second = common::create_paired_diary(&pool, &app, "b").await;

    let (status, _) = common::create_training(
        &app,
        &first.trainer_token,
        second.diary_id,
        "2024-05-01",
        json!([]),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(common::count_rows(&pool, "trainings"), 0);
}

#[tokio::test]
async fn test_client_cannot_create_or_delete_training() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, _) = common::create_training(
        &app,
        &paired.client_token,
        paired.diary_id,
        "2024-05-01",
        json!([]),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, training) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        json!([]),
    )
    .await;
    let (status, _) = common::send(
        &app,
        "DELETE",
        &format!("/trainings/{}", training["id"]),
        Some(&paired.client_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(common::count_rows(&pool, "trainings"), 1);
}

#[tokio::test]
async fn test_trainer_without_diary_cannot_create() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let (_, token) = common::login_as(&pool, "lonely@example.com", UserRole::Trainer).await;

    let (status, _) = common::create_training(&app, &token, 1, "2024-05-01", json!([])).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_training_removes_exercises() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;
    let (_, training) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        two_exercises(),
    )
    .await;
    assert_eq!(common::count_rows(&pool, "training_exercises"), 2);

    let (status, _) = common::send(
        &app,
        "DELETE",
        &format!("/trainings/{}", training["id"]),
        Some(&paired.trainer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(common::count_rows(&pool, "trainings"), 0);
    assert_eq!(common::count_rows(&pool, "training_exercises"), 0);
}

#[tokio::test]
async fn test_list_orders_and_filters_by_date() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;
    let other = common::create_paired_diary(&pool, &app, "b").await;

    let mut ids = Vec::new();
    for date in ["2024-05-01", "2024-05-03", "2024-05-01", "2024-05-02"] {
        let (status, training) =
            common::create_training(&app, &paired.trainer_token, paired.diary_id, date, json!([]))
                .await;
        assert_eq!(status, StatusCode::CREATED);
        ids.push(training["id"].as_i64().unwrap());
    }
    common::create_training(&app, &other.trainer_token, other.diary_id, "2024-05-01", json!([]))
        .await;

    let (status, list) =
        common::send(&app, "GET", "/trainings", Some(&paired.client_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<i64> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(listed, vec![ids[1], ids[3], ids[0], ids[2]]);

    let (status, filtered) = common::send(
        &app,
        "GET",
        "/trainings?date=2024-05-01",
        Some(&paired.trainer_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let filtered: Vec<i64> = filtered
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["id"].as_i64().unwrap())
        .collect();
    assert_eq!(filtered, vec![ids[0], ids[2]]);

    let (_, empty) = common::send(
        &app,
        "GET",
        "/trainings?dt=2023-01-01",
        Some(&paired.trainer_token),
        None,
    )
    .await;
    assert!(empty.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_list_without_diary_not_found() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let (_, token) = common::login_as(&pool, "c@example.com", UserRole::Client).await;

    let (status, _) = common::send(&app, "GET", "/trainings", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_default_training_name() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, training) = common::send(
        &app,
        "POST",
        "/trainings",
        Some(&paired.trainer_token),
        Some(json!({ "diary_id": paired.diary_id, "date": "2024-06-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(training["name"], "Training");
    assert_eq!(training["date"], "2024-06-10");
    assert!(training["exercises"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_many_repeated_exercises_conflict() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let entries: Vec<Value> = (0..33_000)
        .map(|_| json!({ "exercise_id": 1, "order_index": 0, "sets_count": 1 }))
        .collect();
    let (status, body) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        Value::Array(entries),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Exercise 1 appears more than once");
    assert_eq!(common::count_rows(&pool, "trainings"), 0);
}

#[tokio::test]
async fn test_large_exercise_list_reports_missing() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let entries: Vec<Value> = (1..=32_800)
        .map(|id| json!({ "exercise_id": id, "order_index": 0, "sets_count": 1 }))
        .collect();
    let (status, body) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        Value::Array(entries),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.starts_with("Exercises not found: 9, 10, 11,"));
    assert!(detail.ends_with(", 32800"));
    assert_eq!(common::count_rows(&pool, "trainings"), 0);
}

#[tokio::test]
async fn test_create_rejects_out_of_range_values() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, body) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        json!([
            { "exercise_id": 1, "order_index": 0, "sets_count": 3 },
            { "exercise_id": 2, "order_index": 1, "sets_count": -1, "weight": -10.0 },
        ]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let detail = body["detail"].as_str().unwrap();
    assert!(detail.contains("exercises[1].sets_count"));
    assert!(detail.contains("exercises[1].weight"));
    assert_eq!(common::count_rows(&pool, "trainings"), 0);
}

#[tokio::test]
async fn test_create_requires_order_index() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, body) = common::create_training(
        &app,
        &paired.trainer_token,
        paired.diary_id,
        "2024-05-01",
        json!([{ "exercise_id": 1, "sets_count": 3 }]),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("order_index"));
    assert_eq!(common::count_rows(&pool, "trainings"), 0);
}

#[tokio::test]
async fn test_create_without_date_returns_detail() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, body) = common::send(
        &app,
        "POST",
        "/trainings",
        Some(&paired.trainer_token),
        Some(json!({ "diary_id": paired.diary_id, "name": "Legs" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("date"));
}

#[tokio::test]
async fn test_malformed_date_filter_returns_detail() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, body) = common::send(
        &app,
        "GET",
        "/trainings?date=nope",
        Some(&paired.client_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}

#[tokio::test]
async fn test_non_numeric_training_id_returns_detail() {
    let pool = common::setup_test_db();
    let app = common::create_test_app(pool.clone());
    let paired = common::create_paired_diary(&pool, &app, "a").await;

    let (status, body) = common::send(
        &app,
        "PATCH",
        "/trainings/abc/start",
        Some(&paired.client_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].is_string());
}
