use super::extract::ApiJson;
use crate::error::GrantDeskError;
use crate::server::router::GrantDeskState;
use axum::{Json, Router, extract::State, routing::get};
use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use tracing::info;

pub fn router() -> Router<GrantDeskState> {
    Router::new().route("/settings", get(get_settings).post(save_settings))
}

async fn get_settings(
    State(state): State<GrantDeskState>,
) -> Result<Json<BTreeMap<String, String>>, GrantDeskError> {
    Ok(Json(state.db.list_settings().await?))
}

/// POST /settings
///
/// Merges the posted object into storage; keys not mentioned are kept.
async fn save_settings(
    State(state): State<GrantDeskState>,
    ApiJson(body): ApiJson<Map<String, Value>>,
) -> Result<Json<Value>, GrantDeskError> {
    let settings = flatten_settings(body)?;
    // Values are credentials; log keys only.
    let keys: Vec<&str> = settings.keys().map(String::as_str).collect();
    info!(keys = ?keys, "Settings updated");
    state.db.upsert_settings(settings).await?;
    Ok(Json(json!({ "success": true })))
}

/// Scalars become their string form; nested or null values are rejected.
fn flatten_settings(body: Map<String, Value>) -> Result<BTreeMap<String, String>, GrantDeskError> {
    body.into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(GrantDeskError::Validation(format!(
                        "setting `{key}` must be a string"
                    )));
                }
            };
            Ok((key, value))
        })
        .collect()
}
