use std::collections::HashSet;
use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use kotoba_backend::store::MemoryStore;

mod common;

use common::{catalog, create_test_app, get, post_json, token_for};

#[tokio::test]
async fn test_health_root() {
    let app = create_test_app(Arc::new(MemoryStore::new()));

    let (status, body) = get(&app, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["storage"], "memory");
}

#[tokio::test]
async fn test_health_live() {
    let app = create_test_app(Arc::new(MemoryStore::new()));

    let (status, body) = get(&app, "/health/live", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert!(body["started_at"].is_string());
}

#[tokio::test]
async fn test_unknown_route_returns_404_envelope() {
    let app = create_test_app(Arc::new(MemoryStore::new()));

    let (status, body) = get(&app, "/nope", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_api_requires_token() {
    let app = create_test_app(Arc::new(MemoryStore::with_items(catalog(5, 0))));

    for uri in ["/api/flashcards", "/api/stats", "/api/exam-questions", "/api/vocabularies"] {
        let (status, body) = get(&app, uri, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{uri}");
        assert_eq!(body["code"], "UNAUTHORIZED");
    }

    let (status, _) = get(&app, "/api/stats", Some("not.a.token")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_review_then_stats_reaches_full_mastery() {
    let store = Arc::new(MemoryStore::with_items(catalog(3, 2)));
    let app = create_test_app(store.clone());
    let token = token_for(7);

    for (vocab_id, result) in [(1, 0), (2, 1), (3, 2), (1, 2), (2, 2)] {
        let (status, body) = post_json(
            &app,
            "/api/review",
            &token,
            json!({ "vocab_id": vocab_id, "result": result }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["exp_gained"], 10);
        assert!(body["data"]["event_id"].as_i64().is_some());
    }
    assert_eq!(store.event_count(), 5);

    let (status, body) = get(&app, "/api/stats", Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["total_learned"], 3);
    assert_eq!(data["retained_count"], 3);
    assert_eq!(data["uncertain_count"], 0);
    assert_eq!(data["forgotten_count"], 0);
    assert_eq!(data["mastery_percentage"], 100.0);
    assert_eq!(data["unlocked_next_tier"], true);
    assert_eq!(data["retention"]["status"], "OFFLINE");
}

#[tokio::test]
async fn test_stats_are_isolated_per_user() {
    let store = Arc::new(MemoryStore::with_items(catalog(4, 0)));
    let app = create_test_app(store);

    let (status, _) = post_json(
        &app,
        "/api/review",
        &token_for(1),
        json!({ "vocab_id": 1, "result": 2 }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (_, body) = get(&app, "/api/stats", Some(token_for(2).as_str())).await;
    assert_eq!(body["data"]["total_learned"], 0);
    assert_eq!(body["data"]["mastery_percentage"], 0.0);
    assert_eq!(body["data"]["unlocked_next_tier"], false);
}

#[tokio::test]
async fn test_review_rejects_invalid_result() {
    let store = Arc::new(MemoryStore::with_items(catalog(3, 0)));
    let app = create_test_app(store.clone());

    let (status, body) = post_json(
        &app,
        "/api/review",
        &token_for(1),
        json!({ "vocab_id": 1, "result": 3 }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert_eq!(store.event_count(), 0);
}

#[tokio::test]
async fn test_review_rejects_malformed_body() {
    let app = create_test_app(Arc::new(MemoryStore::with_items(catalog(3, 0))));

    let (status, body) = post_json(&app, "/api/review", &token_for(1), json!({ "vocab": 1 })).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_review_unknown_item_is_404() {
    let store = Arc::new(MemoryStore::with_items(catalog(3, 0)));
    let app = create_test_app(store.clone());

    let (status, body) = post_json(
        &app,
        "/api/review",
        &token_for(1),
        json!({ "vocab_id": 999, "result": 2 }),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
    assert_eq!(store.event_count(), 0);
}

#[tokio::test]
async fn test_storage_outage_is_503() {
    let store = Arc::new(MemoryStore::with_items(catalog(3, 0)));
    let app = create_test_app(store.clone());
    store.set_unavailable(true);

    let token = token_for(1);
    let (status, body) = get(&app, "/api/stats", Some(token.as_str())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "STORAGE_UNAVAILABLE");

    let (status, _) = post_json(&app, "/api/review", &token, json!({ "vocab_id": 1, "result": 2 })).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);

    let (status, _) = get(&app, "/api/flashcards", Some(token.as_str())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_flashcards_focus_mode_for_new_user() {
    let app = create_test_app(Arc::new(MemoryStore::with_items(catalog(15, 5))));

    let (status, body) = get(&app, "/api/flashcards", Some(token_for(3).as_str())).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["mode"], "focus");
    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 10);
    assert!(items.iter().all(|item| item["tier"] == 1));
    let ids: HashSet<i64> = items.iter().map(|item| item["id"].as_i64().unwrap()).collect();
    assert_eq!(ids.len(), 10);
}

#[tokio::test]
async fn test_exam_locked_shape() {
    let store = Arc::new(MemoryStore::with_items(catalog(30, 0)));
    let app = create_test_app(store.clone());
    let token = token_for(4);

    for id in 1..=24 {
        let (status, _) = post_json(&app, "/api/review", &token, json!({ "vocab_id": id, "result": 2 })).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = get(&app, "/api/exam-questions", Some(token.as_str())).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "EXAM_LOCKED");
    assert_eq!(body["state"], "locked");
    assert_eq!(body["current"], 24);
    assert_eq!(body["required"], 25);
}

#[tokio::test]
async fn test_exam_composed_from_mastered_items() {
    let store = Arc::new(MemoryStore::with_items(catalog(40, 0)));
    let app = create_test_app(store.clone());
    let token = token_for(5);

    for id in 1..=33 {
        let (status, _) = post_json(&app, "/api/review", &token, json!({ "vocab_id": id, "result": 2 })).await;
        assert_eq!(status, StatusCode::OK);
    }
    // Latest outcome wins: item 33 is no longer mastered.
    let (status, _) = post_json(&app, "/api/review", &token, json!({ "vocab_id": 33, "result": 0 })).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = get(&app, "/api/exam-questions", Some(token.as_str())).await;

    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["state"], "composed");
    assert_eq!(data["total_mastered"], 32);
    assert_eq!(data["exam_size"], 25);
    let items = data["items"].as_array().unwrap();
    assert_eq!(items.len(), 25);
    let ids: HashSet<i64> = items.iter().map(|item| item["id"].as_i64().unwrap()).collect();
    assert_eq!(ids.len(), 25);
    assert!(ids.iter().all(|id| (1..=32).contains(id)));
}

#[tokio::test]
async fn test_vocabularies_filters_by_tier() {
    let app = create_test_app(Arc::new(MemoryStore::with_items(catalog(60, 5))));
    let token = token_for(1);

    let (status, body) = get(&app, "/api/vocabularies", Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 50);

    let (status, body) = get(&app, "/api/vocabularies?tier=2", Some(token.as_str())).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["data"].as_array().unwrap();
    assert_eq!(items.len(), 5);
    assert!(items.iter().all(|item| item["tier"] == 2));
}
