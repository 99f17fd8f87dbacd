use super::extract::ApiJson;
use crate::error::GrantDeskError;
use crate::grants_gov::{
    API_KEY_SETTING, AutofillGrant, DEFAULT_SEARCH_ROWS, MAX_SEARCH_ROWS, SearchResults,
};
use crate::server::router::GrantDeskState;
use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Deserialize)]
pub struct KeywordSearch {
    #[serde(default)]
    pub keyword: String,
    #[serde(default)]
    pub agency: Option<String>,
    #[serde(default = "default_rows")]
    pub rows: u32,
}

fn default_rows() -> u32 {
    DEFAULT_SEARCH_ROWS
}

pub fn router() -> Router<GrantDeskState> {
    Router::new()
        .route("/search", post(keyword_search))
        .route("/search/{opportunity_number}", get(autofill_lookup))
}

/// POST /search
///
/// Requires the `grants_gov_api_key` setting; without it the request fails
/// before anything is sent upstream.
async fn keyword_search(
    State(state): State<GrantDeskState>,
    ApiJson(req): ApiJson<KeywordSearch>,
) -> Result<Json<SearchResults>, GrantDeskError> {
    let api_key = state
        .db
        .get_setting(API_KEY_SETTING)
        .await?
        .filter(|k| !k.trim().is_empty())
        .ok_or(GrantDeskError::MissingApiKey)?;

    if req.rows == 0 || req.rows > MAX_SEARCH_ROWS {
        return Err(GrantDeskError::Validation(format!(
            "rows must be between 1 and {MAX_SEARCH_ROWS}"
        )));
    }

    debug!(
        keyword = %req.keyword,
        agency = req.agency.as_deref().unwrap_or("-"),
        rows = req.rows,
        "Grants.gov keyword search"
    );
    let results = state
        .grants_gov
        .search(api_key.trim(), &req.keyword, req.agency.as_deref(), req.rows)
        .await?;
    Ok(Json(results))
}

/// GET /search/{opportunity_number}
///
/// Unauthenticated upstream lookup used to pre-fill the add-grant form.
async fn autofill_lookup(
    State(state): State<GrantDeskState>,
    Path(opportunity_number): Path<String>,
) -> Result<Json<AutofillGrant>, GrantDeskError> {
    let number = opportunity_number.trim();
    if number.is_empty() {
        return Err(GrantDeskError::Validation(
            "opportunity number is required".to_string(),
        ));
    }
    Ok(Json(state.grants_gov.lookup(number).await?))
}
