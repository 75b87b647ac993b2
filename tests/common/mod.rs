#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use kotoba_backend::config::Config;
use kotoba_backend::mastery::{Item, MasteryEngine, Tier};
use kotoba_backend::store::MemoryStore;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn item(id: i64, tier: Tier) -> Item {
    Item {
        id,
        tier,
        kanji: format!("漢{id}"),
        kana: format!("かな{id}"),
        romaji: format!("romaji{id}"),
        meaning: format!("meaning {id}"),
        example_sentence: String::new(),
    }
}

/// Ids 1..=base_count in tier 1, then next_count items in tier 2.
pub fn catalog(base_count: i64, next_count: i64) -> Vec<Item> {
    (1..=base_count)
        .map(|id| item(id, 1))
        .chain((base_count + 1..=base_count + next_count).map(|id| item(id, 2)))
        .collect()
}

pub fn test_config() -> Config {
    Config {
        jwt_secret: Some(TEST_SECRET.to_string()),
        ..Config::default()
    }
}

pub fn engine(store: &Arc<MemoryStore>) -> MasteryEngine {
    MasteryEngine::new(
        test_config().mastery,
        store.clone(),
        store.clone(),
    )
}

pub fn create_test_app(store: Arc<MemoryStore>) -> Router {
    let state = kotoba_backend::memory_state(test_config(), store);
    kotoba_backend::build_router(state)
}

pub fn token_for(user_id: i64) -> String {
    kotoba_backend::auth::sign_token(user_id, TEST_SECRET, chrono::Duration::hours(1))
        .expect("sign token")
}

pub async fn get(app: &Router, uri: &str, token: Option<&str>) -> (StatusCode, serde_json::Value) {
    let mut builder = Request::builder().uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    send(app, builder.body(Body::empty()).unwrap()).await
}

pub async fn post_json(
    app: &Router,
    uri: &str,
    token: &str,
    body: serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}
