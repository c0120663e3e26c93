//! End-to-end HTTP tests: the real router served on an ephemeral port with
//! the in-memory store, driven over the wire with reqwest.

use std::sync::Arc;

use authd::server::{router, AppState};
use authd::store::memory::MemAccountStore;
use authd::store::SharedStore;
use authd::verifier::LoginVerifier;
use serde_json::{json, Value};

async fn spawn_app() -> String {
    let store: SharedStore = Arc::new(MemAccountStore::new());
    let verifier = LoginVerifier::new(store.clone());
    let app = router(AppState { store, verifier });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
async fn health_lists_auth_endpoints() {
    let base = spawn_app().await;
    let resp = reqwest::get(format!("{base}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert!(body["endpoints"].as_array().unwrap().contains(&json!("/auth/register")));
}

#[tokio::test]
async fn register_then_login_scenario() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();

    // Register alice
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({"username": "alice", "email": "a@x.com", "password": "Secret123!"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["user_id"], 1);
    assert!(body.get("secret_hash").is_none());

    // Login by username
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({"identifier": "alice", "password": "Secret123!"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["user_id"], 1);

    // Login by email
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({"identifier": "a@x.com", "password": "Secret123!"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    // Wrong password
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({"identifier": "alice", "password": "wrongwrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let wrong_password: Value = resp.json().await.unwrap();

    // Unknown identifier gets the exact same error body
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({"identifier": "mallory", "password": "wrongwrong"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let unknown_user: Value = resp.json().await.unwrap();
    assert_eq!(wrong_password, unknown_user);

    // Duplicate username is a conflict, even with a fresh email
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({"username": "alice", "email": "b@y.com", "password": "Another123"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "account_exists");
    assert!(!body["message"].as_str().unwrap().contains("username"));
}

#[tokio::test]
async fn duplicate_registration_conflicts_even_with_a_rejected_secret() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({"username": "alice", "email": "a@x.com", "password": "Secret123!"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    // Duplicate username with a secret far below the minimum length: the
    // conflict wins over the secret-quality check.
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({"username": "alice", "email": "b@y.com", "password": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "account_exists");

    // A fresh identifier with the same bad secret is still invalid input.
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({"username": "bob", "email": "b@y.com", "password": "x"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn duplicate_email_conflicts_over_http() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let register = |username: &str, email: &str| {
        client
            .post(format!("{base}/auth/register"))
            .json(&json!({"username": username, "email": email, "password": "Secret123!"}))
            .send()
    };
    assert_eq!(register("alice", "a@x.com").await.unwrap().status(), 201);
    assert_eq!(register("bob", "a@x.com").await.unwrap().status(), 409);
}

#[tokio::test]
async fn legacy_alias_keys_are_rejected() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    // The old debugging aliases (user/pass) must parse-fail, not log in.
    let resp = client
        .post(format!("{base}/auth/login"))
        .json(&json!({"user": "alice", "pass": "Secret123!"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "malformed_payload");
}

#[tokio::test]
async fn non_json_body_is_a_client_error() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/auth/login"))
        .header("content-type", "application/json")
        .body("identifier=alice&password=x")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn short_password_is_rejected_without_echoing_it() {
    let base = spawn_app().await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base}/auth/register"))
        .json(&json!({"username": "alice", "email": "a@x.com", "password": "hunter2"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "password_too_short");
    assert!(!body["message"].as_str().unwrap().contains("hunter2"));
}
