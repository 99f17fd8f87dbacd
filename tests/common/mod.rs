#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode},
};
use grantdesk::config::GrantsGovConfig;
use grantdesk::db::DbActorHandle;
use grantdesk::grants_gov::GrantsGovClient;
use grantdesk::server::router::{GrantDeskState, grantdesk_router};
use serde_json::Value;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::net::TcpListener;
use tower::ServiceExt;
use url::Url;

pub fn unique_sqlite_path(prefix: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "grantdesk-{prefix}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));
    temp_path
}

/// A store actor over a throwaway SQLite file, removed on drop.
pub struct TestDb {
    pub handle: DbActorHandle,
    path: PathBuf,
}

impl TestDb {
    pub async fn spawn(prefix: &str) -> Self {
        let path = unique_sqlite_path(prefix);
        let database_url = format!("sqlite:{}", path.display());
        let handle = grantdesk::db::spawn(&database_url)
            .await
            .expect("failed to spawn store actor");
        Self { handle, path }
    }
}

impl Drop for TestDb {
    fn drop(&mut self) {
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", self.path.display(), suffix));
        }
    }
}

pub async fn spawn_test_server(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    let base = Url::parse(&format!("http://{}", addr)).expect("valid base url");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server run");
    });

    base
}

/// Upstream config pointing at `base`; nothing listens on the default port 9.
pub fn grants_gov_config(base: Option<Url>) -> GrantsGovConfig {
    GrantsGovConfig {
        base_url: base.unwrap_or_else(|| Url::parse("http://127.0.0.1:9").expect("valid url")),
        detail_url_base: "https://detail.test/opportunity".to_string(),
        ..Default::default()
    }
}

pub fn build_app(db: &TestDb, grants_gov: GrantsGovConfig) -> Router {
    let client = GrantsGovClient::new(&grants_gov).expect("failed to build upstream client");
    let state = GrantDeskState::new(db.handle.clone(), client);
    grantdesk_router(state, &["http://localhost:5173".to_string()])
}

/// Sends one request and returns the status and decoded JSON body (`Null` when empty).
pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("failed to build request");

    send_request(app, request).await
}

pub async fn send_request(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(request).await.expect("request failed");
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("response body was not JSON")
    };
    (status, json)
}
