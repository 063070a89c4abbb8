//! Shared test utilities: an in-process fake key-value store served over HTTP.
#![allow(dead_code)]

use std::collections::{BTreeMap, HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Request, State};
use axum::http::{Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use url::Url;

use ::common::config::{Config, Mode};

#[derive(Debug, Default)]
pub struct Bucket {
    pub props: Option<Bytes>,
    pub values: BTreeMap<String, Bytes>,
}

#[derive(Debug, Default)]
pub struct Inner {
    /// Keyed by (bucket type, bucket).
    pub buckets: BTreeMap<(String, String), Bucket>,
    /// Every request received, as (method, percent-encoded path).
    pub requests: Vec<(Method, String)>,
    /// Status forced on the key listing of a bucket.
    pub key_listing_failures: HashMap<(String, String), StatusCode>,
    /// Bucket types whose bucket listing is not JSON.
    pub garbled_listings: HashSet<String>,
    /// Status forced on GETs of a given key, regardless of bucket.
    pub get_failures: HashMap<String, StatusCode>,
    /// Status forced on PUTs of a given key, regardless of bucket.
    pub put_failures: HashMap<String, StatusCode>,
    /// Status returned by every props GET instead of the stored document.
    pub props_get_status: Option<StatusCode>,
    /// Status returned by every props PUT instead of 204.
    pub props_put_status: Option<StatusCode>,
}

/// A fake store. Cloning shares the same state.
#[derive(Debug, Clone, Default)]
pub struct FakeStore {
    inner: Arc<Mutex<Inner>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<R>(&self, f: impl FnOnce(&mut Inner) -> R) -> R {
        f(&mut self.inner.lock().unwrap())
    }

    pub fn insert(&self, bucket_type: &str, bucket: &str, key: &str, value: &[u8]) {
        self.with(|inner| {
            inner
                .buckets
                .entry((bucket_type.to_string(), bucket.to_string()))
                .or_default()
                .values
                .insert(key.to_string(), Bytes::copy_from_slice(value));
        });
    }

    pub fn set_props(&self, bucket_type: &str, bucket: &str, props: &str) {
        self.with(|inner| {
            inner
                .buckets
                .entry((bucket_type.to_string(), bucket.to_string()))
                .or_default()
                .props = Some(Bytes::copy_from_slice(props.as_bytes()));
        });
    }

    /// A bucket that shows up in listings but answers 404 to a key listing.
    pub fn add_unlisted_bucket(&self, bucket_type: &str, bucket: &str) {
        self.with(|inner| {
            inner
                .buckets
                .entry((bucket_type.to_string(), bucket.to_string()))
                .or_default();
        });
        self.fail_key_listing(bucket_type, bucket, StatusCode::NOT_FOUND);
    }

    pub fn fail_key_listing(&self, bucket_type: &str, bucket: &str, status: StatusCode) {
        self.with(|inner| {
            inner
                .key_listing_failures
                .insert((bucket_type.to_string(), bucket.to_string()), status);
        });
    }

    /// Answer the bucket listing of `bucket_type` with a body that is not JSON.
    pub fn garble_bucket_listing(&self, bucket_type: &str) {
        self.with(|inner| {
            inner.garbled_listings.insert(bucket_type.to_string());
        });
    }

    pub fn fail_get(&self, key: &str, status: StatusCode) {
        self.with(|inner| {
            inner.get_failures.insert(key.to_string(), status);
        });
    }

    pub fn fail_put(&self, key: &str, status: StatusCode) {
        self.with(|inner| {
            inner.put_failures.insert(key.to_string(), status);
        });
    }

    pub fn value(&self, bucket_type: &str, bucket: &str, key: &str) -> Option<Bytes> {
        self.with(|inner| {
            inner
                .buckets
                .get(&(bucket_type.to_string(), bucket.to_string()))
                .and_then(|b| b.values.get(key).cloned())
        })
    }

    pub fn props(&self, bucket_type: &str, bucket: &str) -> Option<Bytes> {
        self.with(|inner| {
            inner
                .buckets
                .get(&(bucket_type.to_string(), bucket.to_string()))
                .and_then(|b| b.props.clone())
        })
    }

    /// Every stored value, keyed by (bucket type, bucket, key).
    pub fn snapshot(&self) -> BTreeMap<(String, String, String), Bytes> {
        self.with(|inner| {
            inner
                .buckets
                .iter()
                .flat_map(|((bt, b), bucket)| {
                    bucket
                        .values
                        .iter()
                        .map(move |(k, v)| ((bt.clone(), b.clone(), k.clone()), v.clone()))
                })
                .collect()
        })
    }

    pub fn requests(&self) -> Vec<(Method, String)> {
        self.with(|inner| inner.requests.clone())
    }

    /// Paths of the requests made with `method`, in arrival order.
    pub fn paths(&self, method: Method) -> Vec<String> {
        self.requests()
            .into_iter()
            .filter(|(m, _)| *m == method)
            .map(|(_, path)| path)
            .collect()
    }

    pub fn clear_requests(&self) {
        self.with(|inner| inner.requests.clear());
    }

    /// Serve on an ephemeral local port. The server lives until the test runtime ends.
    pub async fn serve(&self) -> Url {
        let router = Router::new()
            .route("/types/:bucket_type/buckets", get(list_buckets))
            .route("/types/:bucket_type/buckets/:bucket/keys", get(list_keys))
            .route(
                "/types/:bucket_type/buckets/:bucket/props",
                get(get_props).put(put_props),
            )
            .route(
                "/types/:bucket_type/buckets/:bucket/keys/:key",
                get(get_value).put(put_value),
            )
            .layer(middleware::from_fn_with_state(self.clone(), record))
            .with_state(self.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr: SocketAddr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        Url::parse(&format!("http://{addr}")).unwrap()
    }
}

async fn record(State(store): State<FakeStore>, request: Request, next: Next) -> Response {
    let entry = (request.method().clone(), request.uri().path().to_string());
    store.with(|inner| inner.requests.push(entry));
    next.run(request).await
}

async fn list_buckets(
    State(store): State<FakeStore>,
    Path(bucket_type): Path<String>,
) -> Response {
    store.with(|inner| {
        if inner.garbled_listings.contains(&bucket_type) {
            return (StatusCode::OK, "<html>maintenance</html>").into_response();
        }
        let buckets: Vec<String> = inner
            .buckets
            .keys()
            .filter(|(bt, _)| *bt == bucket_type)
            .map(|(_, b)| b.clone())
            .collect();
        Json(serde_json::json!({ "buckets": buckets })).into_response()
    })
}

async fn list_keys(
    State(store): State<FakeStore>,
    Path((bucket_type, bucket)): Path<(String, String)>,
) -> Response {
    let id = (bucket_type, bucket);
    store.with(|inner| {
        if let Some(status) = inner.key_listing_failures.get(&id).copied() {
            return status.into_response();
        }
        let keys: Vec<String> = inner
            .buckets
            .get(&id)
            .map(|b| b.values.keys().cloned().collect())
            .unwrap_or_default();
        Json(serde_json::json!({ "keys": keys })).into_response()
    })
}

async fn get_props(
    State(store): State<FakeStore>,
    Path((bucket_type, bucket)): Path<(String, String)>,
) -> Response {
    if let Some(status) = store.with(|inner| inner.props_get_status) {
        return status.into_response();
    }
    match store.props(&bucket_type, &bucket) {
        Some(props) => (StatusCode::OK, props).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_props(
    State(store): State<FakeStore>,
    Path((bucket_type, bucket)): Path<(String, String)>,
    body: Bytes,
) -> StatusCode {
    if let Some(status) = store.with(|inner| inner.props_put_status) {
        return status;
    }
    store.set_props(&bucket_type, &bucket, &String::from_utf8_lossy(&body));
    StatusCode::NO_CONTENT
}

async fn get_value(
    State(store): State<FakeStore>,
    Path((bucket_type, bucket, key)): Path<(String, String, String)>,
) -> Response {
    if let Some(status) = store.with(|inner| inner.get_failures.get(&key).copied()) {
        return status.into_response();
    }
    match store.value(&bucket_type, &bucket, &key) {
        Some(value) => (StatusCode::OK, value).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_value(
    State(store): State<FakeStore>,
    Path((bucket_type, bucket, key)): Path<(String, String, String)>,
    body: Bytes,
) -> StatusCode {
    if let Some(status) = store.with(|inner| inner.put_failures.get(&key).copied()) {
        return status;
    }
    store.insert(&bucket_type, &bucket, &key, &body);
    StatusCode::NO_CONTENT
}

/// Config pointing at the given stores, with a short progress period.
pub fn config(source: &Url, destination: &Url, mode: Mode) -> Config {
    Config {
        source: source.clone(),
        destination: destination.clone(),
        mode,
        request_timeout: Duration::from_secs(10),
        progress_interval: Duration::from_millis(50),
        ..Config::default()
    }
}

/// Seed the two-user bucket used throughout the scenarios.
pub fn seed_users(store: &FakeStore) {
    store.insert("default", "users", "a", b"{1}");
    store.insert("default", "users", "b", b"{2}");
    store.set_props("default", "users", r#"{"props":{"n_val":3}}"#);
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}
