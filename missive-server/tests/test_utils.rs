// Utilità condivise dai test di integrazione: store SQLite su file temporaneo
// e richieste HTTP in-process con tower::ServiceExt::oneshot.

#![allow(dead_code)]

use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use missive_server::routes;
pub use missive_server::routes::App;
use missive_server::store::{MessageStore, SqliteMessageStore};
use missive_server::AppState;
use serde_json::Value;
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt; // per `oneshot`

/// Store SQLite su un file in una directory temporanea.
/// La directory vive finché vive `TestStore`.
pub struct TestStore {
    pub store: Arc<SqliteMessageStore>,
    _dir: TempDir,
}

pub async fn sqlite_store() -> anyhow::Result<TestStore> {
    let dir = TempDir::new()?;
    let path = dir.path().join("missive.db");
    let store = SqliteMessageStore::connect(&path.to_string_lossy()).await?;
    Ok(TestStore {
        store: Arc::new(store),
        _dir: dir,
    })
}

pub fn app_with(store: Arc<dyn MessageStore>) -> App {
    routes::app(Arc::new(AppState::new(store)))
}

/// App completa su SQLite temporaneo.
pub async fn test_app() -> anyhow::Result<(App, TestStore)> {
    let ts = sqlite_store().await?;
    let app = app_with(ts.store.clone());
    Ok((app, ts))
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
    pub text: String,
}

pub async fn send(app: &App, request: Request<Body>) -> anyhow::Result<TestResponse> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    let body = serde_json::from_str(&text).unwrap_or(Value::Null);
    Ok(TestResponse {
        status,
        headers,
        body,
        text,
    })
}

pub async fn call(app: &App, method: Method, uri: &str) -> anyhow::Result<TestResponse> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())?;
    send(app, request).await
}

pub async fn call_json(
    app: &App,
    method: Method,
    uri: &str,
    body: &Value,
) -> anyhow::Result<TestResponse> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_vec(body)?))?;
    send(app, request).await
}
