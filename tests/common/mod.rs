#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use coachdiary::db::{create_memory_pool, DbPool};
use coachdiary::migrations::run_migrations_for_tests;
use coachdiary::models::{RegisterUser, User, UserRole};
use coachdiary::repositories::{TokenRepository, UserRepository};

pub const TOKEN_LIFETIME_DAYS: i64 = 7;

pub fn setup_test_db() -> DbPool {
    let pool = create_memory_pool().expect("Failed to create test database");
    run_migrations_for_tests(&pool).expect("Failed to run migrations");
    pool
}

pub fn create_test_app(pool: DbPool) -> Router {
    coachdiary::routes::create_app(pool, TOKEN_LIFETIME_DAYS)
}

pub async fn create_test_user(pool: &DbPool, email: &str, password: &str, role: UserRole) -> User {
    let user_repo = UserRepository::new(pool.clone());
    user_repo
        .create(&RegisterUser {
            first_name: "Test".to_string(),
            second_name: "User".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            role,
        })
        .await
        .unwrap()
}

pub async fn create_token(pool: &DbPool, user: &User) -> String {
    let token_repo = TokenRepository::new(pool.clone(), TOKEN_LIFETIME_DAYS);
    token_repo.create(user.id).await.unwrap()
}

/// Registers a user directly in the store and returns a bearer token for it.
pub async fn login_as(pool: &DbPool, email: &str, role: UserRole) -> (User, String) {
    let user = create_test_user(pool, email, "password123", role).await;
    let token = create_token(pool, &user).await;
    (user, token)
}

/// Sends one request through the router and decodes the JSON body, if any.
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

/// Trainer with a diary and a client who joined it.
pub struct PairedDiary {
    pub diary_id: i64,
    pub trainer: User,
    pub trainer_token: String,
    pub client: User,
    pub client_token: String,
}

pub async fn create_paired_diary(pool: &DbPool, app: &Router, prefix: &str) -> PairedDiary {
    let (trainer, trainer_token) =
        login_as(pool, &format!("{}-trainer@example.com", prefix), UserRole::Trainer).await;
    let (client, client_token) =
        login_as(pool, &format!("{}-client@example.com", prefix), UserRole::Client).await;

    let (status, diary) = send(app, "POST", "/diary", Some(&trainer_token), None).await;
    assert_eq!(status, StatusCode::CREATED);
    let diary_id = diary["id"].as_i64().unwrap();

    let (status, _) = send(
        app,
        "POST",
        "/diary/join",
        Some(&client_token),
        Some(serde_json::json!({ "diary_id": diary_id })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    PairedDiary {
        diary_id,
        trainer,
        trainer_token,
        client,
        client_token,
    }
}

pub async fn create_training(
    app: &Router,
    token: &str,
    diary_id: i64,
    date: &str,
    exercises: Value,
) -> (StatusCode, Value) {
    send(
        app,
        "POST",
        "/trainings",
        Some(token),
        Some(serde_json::json!({
            "diary_id": diary_id,
            "name": "Session",
            "date": date,
            "exercises": exercises,
        })),
    )
    .await
}

pub fn count_rows(pool: &DbPool, table: &str) -> i64 {
    let conn = pool.get().unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
        row.get(0)
    })
    .unwrap()
}
