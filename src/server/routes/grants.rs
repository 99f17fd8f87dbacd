use super::extract::{ApiJson, GrantId};
use crate::db::{Grant, GrantInput, input::normalize_status};
use crate::error::GrantDeskError;
use crate::server::router::GrantDeskState;
use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    routing::{get, patch},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::info;

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: Option<String>,
}

pub fn router() -> Router<GrantDeskState> {
    Router::new()
        .route("/grants", get(list_grants).post(create_grant))
        .route(
            "/grants/{id}",
            get(get_grant).put(update_grant).delete(delete_grant),
        )
        .route("/grants/{id}/status", patch(set_grant_status))
}

/// GET /grants[?status=]
///
/// An empty `status` means no filter.
async fn list_grants(
    State(state): State<GrantDeskState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Grant>>, GrantDeskError> {
    let status = query.status.filter(|s| !s.is_empty());
    let grants = state.db.list_grants(status).await?;
    Ok(Json(grants))
}

async fn create_grant(
    State(state): State<GrantDeskState>,
    ApiJson(input): ApiJson<GrantInput>,
) -> Result<(StatusCode, Json<Grant>), GrantDeskError> {
    let grant = state.db.create_grant(input.into_fields()?).await?;
    info!(
        grant.id = grant.id,
        opportunity_number = grant.opportunity_number.as_deref().unwrap_or("-"),
        "Grant added"
    );
    Ok((StatusCode::CREATED, Json(grant)))
}

async fn get_grant(
    State(state): State<GrantDeskState>,
    GrantId(id): GrantId,
) -> Result<Json<Grant>, GrantDeskError> {
    Ok(Json(state.db.get_grant(id).await?))
}

/// PUT /grants/{id}
///
/// Full replace: fields missing from the body are cleared.
async fn update_grant(
    State(state): State<GrantDeskState>,
    GrantId(id): GrantId,
    ApiJson(input): ApiJson<GrantInput>,
) -> Result<Json<Grant>, GrantDeskError> {
    let grant = state.db.update_grant(id, input.into_fields()?).await?;
    Ok(Json(grant))
}

async fn set_grant_status(
    State(state): State<GrantDeskState>,
    GrantId(id): GrantId,
    ApiJson(change): ApiJson<StatusChange>,
) -> Result<Json<Grant>, GrantDeskError> {
    if change.status.as_deref().is_none_or(|s| s.trim().is_empty()) {
        return Err(GrantDeskError::Validation("status is required".to_string()));
    }
    let grant = state
        .db
        .set_grant_status(id, normalize_status(change.status))
        .await?;
    info!(grant.id = id, status = %grant.status, "Grant status changed");
    Ok(Json(grant))
}

/// DELETE /grants/{id}
///
/// Always reports success, including for ids that do not exist.
async fn delete_grant(
    State(state): State<GrantDeskState>,
    GrantId(id): GrantId,
) -> Result<Json<Value>, GrantDeskError> {
    state.db.delete_grant(id).await?;
    Ok(Json(json!({ "success": true })))
}
