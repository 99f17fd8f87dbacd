use crate::db::DbActorHandle;
use crate::grants_gov::GrantsGovClient;
use crate::server::routes::{dashboard, grants, search, settings};

use axum::{
    Json, Router,
    extract::Request,
    http::{HeaderName, HeaderValue, Method, StatusCode, Version, header::USER_AGENT},
    middleware::{self, Next},
    response::Response,
    routing::get,
};
use base64::Engine as _;
use rand::RngCore;
use serde_json::{Value, json};
use std::time::Instant;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{error, info, warn};

const MAX_REQUEST_ID_LEN: usize = 128;
const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

fn generate_request_id() -> String {
    // 96 bits => 16 chars base64url (no padding).
    let mut bytes = [0u8; 12];
    rand::rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

fn format_http_version(version: Version) -> &'static str {
    match version {
        Version::HTTP_09 => "HTTP/0.9",
        Version::HTTP_10 => "HTTP/1.0",
        Version::HTTP_11 => "HTTP/1.1",
        Version::HTTP_2 => "HTTP/2",
        Version::HTTP_3 => "HTTP/3",
        _ => "HTTP/?",
    }
}

/// Shared handler context: the store handle and the upstream client.
#[derive(Clone)]
pub struct GrantDeskState {
    pub db: DbActorHandle,
    pub grants_gov: GrantsGovClient,
}

impl GrantDeskState {
    pub fn new(db: DbActorHandle, grants_gov: GrantsGovClient) -> Self {
        Self { db, grants_gov }
    }
}

async fn not_found_handler() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": { "code": "NOT_FOUND", "message": "No such route." } })),
    )
}

async fn health_handler() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn access_log(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let version = req.version();

    let request_id = req
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty() && v.len() <= MAX_REQUEST_ID_LEN)
        .map(str::to_string)
        .unwrap_or_else(generate_request_id);

    let user_agent = req
        .headers()
        .get(USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("-")
        .to_string();

    let start = Instant::now();
    let mut resp = next.run(req).await;

    // Always reflect `x-request-id`, even if the client didn't send one.
    if let Ok(value) = HeaderValue::from_str(&request_id) {
        resp.headers_mut().insert(X_REQUEST_ID, value);
    }

    let status = resp.status();
    let line = format!(
        "| {:>3} | {} | {:^7} | {:<8} | {} | {}ms | {}",
        status.as_u16(),
        request_id,
        method.as_str(),
        format_http_version(version),
        uri.path(),
        start.elapsed().as_millis(),
        user_agent
    );
    if status.is_server_error() {
        error!("{line}");
    } else if status.is_client_error() {
        warn!("{line}");
    } else {
        info!("{line}");
    }

    resp
}

/// CORS for the tracker frontend. Unparseable origins are skipped with a warning.
fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers(Any)
}

pub fn grantdesk_router(state: GrantDeskState, cors_origins: &[String]) -> Router {
    let api = Router::new()
        .route("/health", get(health_handler))
        .merge(grants::router())
        .merge(settings::router())
        .merge(dashboard::router())
        .merge(search::router());

    Router::new()
        .nest("/api", api)
        .fallback(not_found_handler)
        .with_state(state)
        .layer(cors_layer(cors_origins))
        .layer(middleware::from_fn(access_log))
}
