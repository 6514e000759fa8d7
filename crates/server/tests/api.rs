use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::{ConnectOptions, Database};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use migration::MigratorTrait;
use server::{Authenticator, ServerState, router};

async fn app() -> Router {
    let mut options = ConnectOptions::new("sqlite::memory:");
    options.max_connections(1).sqlx_logging(false);
    let db = Database::connect(options).await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();

    let engine = Engine::builder().database(db).build().await.unwrap();
    let auth = Authenticator::new("test-secret", Duration::from_secs(3600));
    router(ServerState::new(engine, auth, Duration::from_secs(5)))
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn post_json(uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get_with(uri: &str, token: &str) -> Request<Body> {
    Request::get(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, body) = send(
        app,
        post_json(
            "/api/auth",
            None,
            json!({"username": username, "password": password}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    body["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn first_login_registers_the_account() {
    let app = app().await;
    let token = login(&app, "alice", "secret").await;

    let (status, body) = send(&app, get_with("/api/info", &token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "coins": 1000,
            "inventory": [],
            "coinHistory": {"received": [], "sent": []}
        })
    );

    // Same credentials log in again.
    login(&app, "alice", "secret").await;
}

#[tokio::test]
async fn wrong_password_is_unauthorized() {
    let app = app().await;
    login(&app, "alice", "secret").await;

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth",
            None,
            json!({"username": "alice", "password": "guess"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth",
            None,
            json!({"username": "shop", "password": ""}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        post_json(
            "/api/auth",
            None,
            json!({"username": "shop", "password": "anything"}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn protected_routes_need_a_valid_token() {
    let app = app().await;

    let request = Request::get("/api/info").body(Body::empty()).unwrap();
    let (status, _) = send(&app, request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(&app, get_with("/api/info", "not-a-jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn purchase_and_transfer_show_up_in_info() {
    let app = app().await;
    let alice = login(&app, "alice", "a").await;
    let bob = login(&app, "bob", "b").await;

    let (status, _) = send(&app, get_with("/api/buy/cup", &alice)).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(
        &app,
        post_json(
            "/api/sendCoin",
            Some(&alice),
            json!({"toUser": "bob", "amount": 100}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, info) = send(&app, get_with("/api/info", &alice)).await;
    assert_eq!(
        info,
        json!({
            "coins": 880,
            "inventory": [{"type": "cup", "quantity": 1}],
            "coinHistory": {
                "received": [],
                "sent": [
                    {"toUser": "bob", "amount": 100},
                    {"toUser": "shop", "amount": 20}
                ]
            }
        })
    );

    let (_, info) = send(&app, get_with("/api/info", &bob)).await;
    assert_eq!(info["coins"], 1100);
    assert_eq!(
        info["coinHistory"]["received"],
        json!([{"fromUser": "alice", "amount": 100}])
    );
}

#[tokio::test]
async fn business_errors_map_to_statuses() {
    let app = app().await;
    let alice = login(&app, "alice", "a").await;
    login(&app, "bob", "b").await;

    let cases = [
        (json!({"toUser": "alice", "amount": 10}), StatusCode::BAD_REQUEST),
        (json!({"toUser": "bob", "amount": 0}), StatusCode::BAD_REQUEST),
        (json!({"toUser": "", "amount": 10}), StatusCode::BAD_REQUEST),
        (json!({"toUser": "nobody", "amount": 10}), StatusCode::NOT_FOUND),
        (
            json!({"toUser": "bob", "amount": 5000}),
            StatusCode::UNPROCESSABLE_ENTITY,
        ),
    ];
    for (body, expected) in cases {
        let (status, response) =
            send(&app, post_json("/api/sendCoin", Some(&alice), body.clone())).await;
        assert_eq!(status, expected, "{body} -> {response}");
        assert!(response["errors"].is_string());
    }

    let (status, _) = send(&app, get_with("/api/buy/yacht", &alice)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    for _ in 0..2 {
        let (status, _) = send(&app, get_with("/api/buy/pink-hoody", &alice)).await;
        assert_eq!(status, StatusCode::OK);
    }
    let (status, _) = send(&app, get_with("/api/buy/pink-hoody", &alice)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (_, info) = send(&app, get_with("/api/info", &alice)).await;
    assert_eq!(info["coins"], 0);
    assert_eq!(
        info["inventory"],
        json!([{"type": "pink-hoody", "quantity": 2}])
    );
}
