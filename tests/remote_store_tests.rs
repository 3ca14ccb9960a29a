//! Integration Tests for the Remote Store
//!
//! Runs a small in-test key/value service speaking the same HTTP protocol
//! and drives `RemoteStore` against it.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, put},
    Json, Router,
};
use cache_aside::{
    Cache, CacheError, Context, RemoteStore, RemoteStoreConfig, ResolveOptions, Store,
};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::Mutex;

// == Fake Service ==

#[derive(Debug, Deserialize)]
struct SetBody {
    key: String,
    value: String,
    ttl: u64,
}

#[derive(Clone, Default)]
struct Service {
    entries: Arc<Mutex<HashMap<String, (String, Instant)>>>,
    ttls: Arc<Mutex<Vec<u64>>>,
}

async fn set_handler(State(svc): State<Service>, Json(body): Json<SetBody>) -> impl IntoResponse {
    let expires = Instant::now() + Duration::from_secs(body.ttl);
    svc.ttls.lock().await.push(body.ttl);
    svc.entries.lock().await.insert(body.key.clone(), (body.value, expires));
    Json(json!({ "message": "ok", "key": body.key }))
}

async fn get_handler(State(svc): State<Service>, Path(key): Path<String>) -> impl IntoResponse {
    let mut entries = svc.entries.lock().await;
    let now = Instant::now();
    let live = entries
        .get(&key)
        .filter(|(_, expires)| now < *expires)
        .map(|(value, _)| value.clone());

    match live {
        Some(value) => (StatusCode::OK, Json(json!({ "key": key, "value": value }))),
        None => {
            // Expired entries are dropped on read, like the real service
            entries.remove(&key);
            (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" })))
        }
    }
}

async fn del_handler(State(svc): State<Service>, Path(key): Path<String>) -> impl IntoResponse {
    match svc.entries.lock().await.remove(&key) {
        Some(_) => (StatusCode::OK, Json(json!({ "key": key }))),
        None => (StatusCode::NOT_FOUND, Json(json!({ "error": "not found" }))),
    }
}

async fn failing_handler() -> impl IntoResponse {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "error": "Cache full" })),
    )
}

async fn slow_handler() -> impl IntoResponse {
    tokio::time::sleep(Duration::from_secs(5)).await;
    StatusCode::OK
}

async fn serve(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

async fn spawn_service() -> (Service, RemoteStore) {
    let svc = Service::default();
    let router = Router::new()
        .route("/set", put(set_handler))
        .route("/get/:key", get(get_handler))
        .route("/del/:key", delete(del_handler))
        .with_state(svc.clone());
    let addr = serve(router).await;
    let store = RemoteStore::new(&RemoteStoreConfig::new(format!("http://{}", addr))).unwrap();
    (svc, store)
}

async fn spawn_failing_service() -> RemoteStore {
    let router = Router::new()
        .route("/set", put(failing_handler))
        .route("/get/:key", get(failing_handler))
        .route("/del/:key", delete(failing_handler));
    let addr = serve(router).await;
    RemoteStore::new(&RemoteStoreConfig::new(format!("http://{}", addr))).unwrap()
}

// == Store Contract ==

#[tokio::test]
async fn test_set_get_delete() {
    let (_svc, store) = spawn_service().await;
    let ctx = Context::background();

    store
        .set(&ctx, "user:1", "{\"id\":1}".to_string(), Duration::from_secs(60))
        .await
        .unwrap();
    assert_eq!(store.get(&ctx, "user:1").await.unwrap(), "{\"id\":1}");

    store.delete(&ctx, "user:1").await.unwrap();
    assert!(matches!(store.get(&ctx, "user:1").await, Err(CacheError::NoData(_))));
}

#[tokio::test]
async fn test_delete_absent_key_is_ok() {
    let (_svc, store) = spawn_service().await;
    let ctx = Context::background();

    store.delete(&ctx, "never-set").await.unwrap();
}

#[tokio::test]
async fn test_key_with_reserved_characters() {
    let (svc, store) = spawn_service().await;
    let ctx = Context::background();
    let key = "reports/2024 q1?draft";

    store
        .set(&ctx, key, "1".to_string(), Duration::from_secs(60))
        .await
        .unwrap();

    assert_eq!(store.get(&ctx, key).await.unwrap(), "1");
    assert!(svc.entries.lock().await.contains_key(key));
}

#[tokio::test]
async fn test_ttl_sent_in_whole_seconds() {
    let (svc, store) = spawn_service().await;
    let ctx = Context::background();

    store
        .set(&ctx, "a", "1".to_string(), Duration::from_millis(200))
        .await
        .unwrap();
    store
        .set(&ctx, "b", "2".to_string(), Duration::from_millis(2500))
        .await
        .unwrap();

    assert_eq!(*svc.ttls.lock().await, vec![1, 3]);
}

#[tokio::test]
async fn test_service_errors_map_to_backend() {
    let store = spawn_failing_service().await;
    let ctx = Context::background();

    match store.get(&ctx, "k").await {
        Err(CacheError::Backend(msg)) => assert!(msg.contains("Cache full"), "{}", msg),
        other => panic!("expected backend error, got {:?}", other),
    }
    assert!(matches!(
        store.set(&ctx, "k", "v".to_string(), Duration::from_secs(1)).await,
        Err(CacheError::Backend(_))
    ));
    assert!(matches!(store.delete(&ctx, "k").await, Err(CacheError::Backend(_))));
}

#[tokio::test]
async fn test_unreachable_service_is_backend_error() {
    // Bind then drop to get a port nothing listens on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let store = RemoteStore::new(&RemoteStoreConfig::new(format!("http://{}", addr))).unwrap();
    let ctx = Context::background();

    assert!(matches!(store.get(&ctx, "k").await, Err(CacheError::Backend(_))));
}

#[tokio::test]
async fn test_context_deadline_aborts_slow_request() {
    let router = Router::new().route("/get/:key", get(slow_handler));
    let addr = serve(router).await;
    let store = RemoteStore::new(&RemoteStoreConfig::new(format!("http://{}", addr))).unwrap();
    let ctx = Context::background().with_timeout(Duration::from_millis(100));

    let started = Instant::now();
    let result = store.get(&ctx, "k").await;

    assert!(matches!(result, Err(CacheError::DeadlineExceeded)));
    assert!(started.elapsed() < Duration::from_secs(2));
}

// == Cache-Aside Over The Remote Store ==

#[tokio::test]
async fn test_resolve_through_remote_store() {
    let (svc, store) = spawn_service().await;
    let cache = Cache::new(store);
    let ctx = Context::background();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..3 {
        let calls = calls.clone();
        let names: Vec<String> = cache
            .resolve(&ctx, "team:7", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CacheError>(vec!["ada".to_string(), "grace".to_string()])
            })
            .await
            .unwrap();
        assert_eq!(names, vec!["ada", "grace"]);
    }

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert_eq!(svc.ttls.lock().await[0], 1800);
}

#[tokio::test]
async fn test_resolve_survives_failing_remote_store() {
    let cache = Cache::with_options(
        spawn_failing_service().await,
        ResolveOptions::default().with_ttl(Duration::from_secs(5)),
    );
    let ctx = Context::background();
    let calls = Arc::new(AtomicUsize::new(0));

    for _ in 0..2 {
        let calls = calls.clone();
        let value = cache
            .resolve(&ctx, "k", || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, CacheError>(7u32)
            })
            .await
            .unwrap();
        assert_eq!(value, 7);
    }

    // Nothing could be cached, so every call computed
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}
