//! Integration tests for the cubedex API, driving the full
//! request/response cycle of every route.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use cubedex_core::{Cubedex, SqliteDatabase};
use cubedex_server::{create_app, ServerContext};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Creates an app backed by a fresh in-memory database
async fn test_app() -> Router {
    let database = SqliteDatabase::new("sqlite::memory:")
        .await
        .expect("test database is created");

    let context = ServerContext {
        app: Arc::new(Cubedex::new(database)),
    };

    create_app(context)
}

fn make_get_request(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn make_post_request(uri: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body))
        .unwrap()
}

fn make_authed_get_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn make_authed_post_request(uri: &str, token: &str, body: String) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .header("authorization", format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

fn make_authed_delete_request(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header("authorization", format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

/// Parses a response body as JSON
async fn body_to_json(body: Body) -> Value {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Reads a response body as plain text, for error responses
async fn body_to_text(body: Body) -> String {
    let bytes = body.collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Registers an account and logs it in, returning the session token
async fn register_and_login(app: &Router, username: &str, password: &str) -> String {
    let credentials = json!({ "username": username, "password": password });

    let response = app
        .clone()
        .oneshot(make_post_request(
            "/v1/auth/register",
            credentials.to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(make_post_request("/v1/auth/login", credentials.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    body["token"].as_str().expect("token is present").to_string()
}

#[tokio::test]
async fn serves_instance_info() {
    let app = test_app().await;

    let response = app.oneshot(make_get_request("/")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["name"], "cubedex");
    assert!(body["version"].as_str().is_some());
}

#[tokio::test]
async fn serves_api_docs() {
    let app = test_app().await;

    let response = app.oneshot(make_get_request("/api.json")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert!(body["openapi"].as_str().is_some());
    assert!(body["paths"]["/v1/auth/login"].is_object());
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = test_app().await;

    let response = app.oneshot(make_get_request("/nothing")).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn registration_returns_the_new_user() {
    let app = test_app().await;

    let body = json!({ "username": "alex", "password": "secret1" });
    let response = app
        .oneshot(make_post_request("/v1/auth/register", body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["username"], "alex");
    assert!(body["id"].as_i64().is_some());
    assert!(body.get("password").is_none(), "hashes never leave the server");
}

#[tokio::test]
async fn registration_rejects_malformed_credentials() {
    let app = test_app().await;

    let cases = [
        json!({ "username": "", "password": "secret1" }),
        json!({ "username": "al ex", "password": "secret1" }),
        json!({ "username": "anoctopusful", "password": "secret1" }),
        json!({ "username": "alex", "password": "hunt2" }),
    ];

    for case in cases {
        let response = app
            .clone()
            .oneshot(make_post_request("/v1/auth/register", case.to_string()))
            .await
            .unwrap();

        assert_eq!(
            response.status(),
            StatusCode::BAD_REQUEST,
            "{case} should be rejected"
        );
    }
}

#[tokio::test]
async fn registration_conflicts_on_taken_usernames() {
    let app = test_app().await;

    let body = json!({ "username": "alex", "password": "secret1" });

    let response = app
        .clone()
        .oneshot(make_post_request("/v1/auth/register", body.to_string()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .oneshot(make_post_request("/v1/auth/register", body.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn login_tells_wrong_username_and_password_apart() {
    let app = test_app().await;

    register_and_login(&app, "alex", "secret1").await;

    let unknown = json!({ "username": "sam", "password": "secret1" });
    let response = app
        .clone()
        .oneshot(make_post_request("/v1/auth/login", unknown.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_to_text(response.into_body()).await, "Wrong username");

    let mismatch = json!({ "username": "alex", "password": "secret2" });
    let response = app
        .oneshot(make_post_request("/v1/auth/login", mismatch.to_string()))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_to_text(response.into_body()).await, "Wrong password");
}

#[tokio::test]
async fn sessions_identify_the_user() {
    let app = test_app().await;

    let token = register_and_login(&app, "alex", "secret1").await;

    let response = app
        .clone()
        .oneshot(make_authed_get_request("/v1/auth/user", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["username"], "alex");

    let response = app
        .clone()
        .oneshot(make_get_request("/v1/auth/user"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(make_authed_get_request("/v1/auth/user", "madeuptoken"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn logout_invalidates_the_session() {
    let app = test_app().await;

    let token = register_and_login(&app, "alex", "secret1").await;

    let response = app
        .clone()
        .oneshot(make_authed_post_request(
            "/v1/auth/logout",
            &token,
            json!({}).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["deleted_account"], false);

    let response = app
        .oneshot(make_authed_get_request("/v1/auth/user", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn account_deletion_removes_everything() {
    let app = test_app().await;

    let token = register_and_login(&app, "alex", "secret1").await;

    let rating = json!({ "algorithmId": 1, "rating": "5" });
    app.clone()
        .oneshot(make_authed_post_request(
            "/v1/algorithms/f2l/ratings",
            &token,
            rating.to_string(),
        ))
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(make_authed_post_request(
            "/v1/auth/logout",
            &token,
            json!({ "confirmDelete": true }).to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["deleted_account"], true);

    // The session is gone along with the account
    let response = app
        .clone()
        .oneshot(make_authed_get_request("/v1/auth/user", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // The ratings are gone too
    let response = app
        .clone()
        .oneshot(make_get_request("/v1/algorithms/f2l"))
        .await
        .unwrap();
    let body = body_to_json(response.into_body()).await;
    assert!(body["ratings"].as_object().unwrap().is_empty());

    // And the username is free again
    let response = app
        .oneshot(make_post_request(
            "/v1/auth/register",
            json!({ "username": "alex", "password": "secret1" }).to_string(),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn lists_an_algorithm_set() {
    let app = test_app().await;

    let response = app
        .oneshot(make_get_request("/v1/algorithms/pll"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["algorithm_set"], "pll");
    assert_eq!(body["sorting_way"], "id");
    assert_eq!(body["algorithms"].as_array().unwrap().len(), 4);
    assert_eq!(body["algorithms"][0]["name"], "T Perm");
    assert!(body["images"].as_array().unwrap().is_empty());
    assert!(body["ratings"].as_object().unwrap().is_empty());
}

#[tokio::test]
async fn sorts_algorithms_by_name_on_request() {
    let app = test_app().await;

    let response = app
        .clone()
        .oneshot(make_get_request("/v1/algorithms/pll?sort=name"))
        .await
        .unwrap();

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["sorting_way"], "name");
    assert_eq!(body["algorithms"][0]["name"], "H Perm");

    // Anything unrecognized falls back to id order
    let response = app
        .oneshot(make_get_request("/v1/algorithms/pll?sort=sideways"))
        .await
        .unwrap();

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["sorting_way"], "id");
    assert_eq!(body["algorithms"][0]["name"], "T Perm");
}

#[tokio::test]
async fn unknown_algorithm_sets_are_not_found() {
    let app = test_app().await;

    let response = app
        .oneshot(make_get_request("/v1/algorithms/megaminx"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ratings_are_stored_and_replaced() {
    let app = test_app().await;

    let token = register_and_login(&app, "alex", "secret1").await;

    let rating = json!({ "algorithmId": 3, "rating": "4" });
    let response = app
        .clone()
        .oneshot(make_authed_post_request(
            "/v1/algorithms/f2l/ratings",
            &token,
            rating.to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["valid_rating"], true);
    assert_eq!(body["is_space"], false);
    assert_eq!(body["in_range"], true);
    assert_eq!(body["ratings"]["3"], 4.0);

    // Rating the same algorithm again replaces, never accumulates
    let rating = json!({ "algorithmId": 3, "rating": "2" });
    let response = app
        .clone()
        .oneshot(make_authed_post_request(
            "/v1/algorithms/f2l/ratings",
            &token,
            rating.to_string(),
        ))
        .await
        .unwrap();

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["ratings"]["3"], 2.0);
    assert_eq!(body["ratings"].as_object().unwrap().len(), 1);

    let response = app
        .oneshot(make_get_request("/v1/algorithms/f2l"))
        .await
        .unwrap();

    let body = body_to_json(response.into_body()).await;
    assert_eq!(body["ratings"]["3"], 2.0);
}

#[tokio::test]
async fn invalid_ratings_report_what_went_wrong() {
    let app = test_app().await;

    let token = register_and_login(&app, "alex", "secret1").await;

    let cases = [
        (json!({ "algorithmId": 3, "rating": " " }), true, true),
        (json!({ "algorithmId": 3, "rating": "great" }), false, false),
        (json!({ "algorithmId": 3, "rating": "9" }), false, false),
    ];

    for (case, is_space, in_range) in cases {
        let response = app
            .clone()
            .oneshot(make_authed_post_request(
                "/v1/algorithms/f2l/ratings",
                &token,
                case.to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_to_json(response.into_body()).await;
        assert_eq!(body["valid_rating"], false, "{case} is invalid");
        assert_eq!(body["is_space"], is_space, "{case} space flag");
        assert_eq!(body["in_range"], in_range, "{case} range flag");
        assert!(body["ratings"].as_object().unwrap().is_empty());
    }
}

#[tokio::test]
async fn ratings_require_a_session() {
    let app = test_app().await;

    let rating = json!({ "algorithmId": 3, "rating": "4" });
    let response = app
        .oneshot(make_post_request(
            "/v1/algorithms/f2l/ratings",
            rating.to_string(),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn timer_records_lists_and_clears() {
    let app = test_app().await;

    let token = register_and_login(&app, "alex", "secret1").await;

    let response = app
        .clone()
        .oneshot(make_authed_get_request("/v1/timer", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());

    for time in ["12.31", "11.05"] {
        let response = app
            .clone()
            .oneshot(make_authed_post_request(
                "/v1/timer/times",
                &token,
                json!({ "time": time }).to_string(),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .clone()
        .oneshot(make_authed_get_request("/v1/timer", &token))
        .await
        .unwrap();

    let body = body_to_json(response.into_body()).await;
    let times: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|entry| entry["time"].as_str().unwrap().to_string())
        .collect();

    assert_eq!(times, ["11.05", "12.31"], "most recent first");

    let response = app
        .clone()
        .oneshot(make_authed_delete_request("/v1/timer/times", &token))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_to_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn timer_logs_are_private() {
    let app = test_app().await;

    let alex = register_and_login(&app, "alex", "secret1").await;
    let sam = register_and_login(&app, "sam", "secret2").await;

    app.clone()
        .oneshot(make_authed_post_request(
            "/v1/timer/times",
            &alex,
            json!({ "time": "12.31" }).to_string(),
        ))
        .await
        .unwrap();

    let response = app
        .oneshot(make_authed_get_request("/v1/timer", &sam))
        .await
        .unwrap();

    let body = body_to_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn timer_requires_a_session() {
    let app = test_app().await;

    let response = app.oneshot(make_get_request("/v1/timer")).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
