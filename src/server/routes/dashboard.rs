use crate::db::Dashboard;
use crate::error::GrantDeskError;
use crate::server::router::GrantDeskState;
use axum::{Json, Router, extract::State, routing::get};
use chrono::Local;

pub fn router() -> Router<GrantDeskState> {
    Router::new().route("/dashboard", get(get_dashboard))
}

/// GET /dashboard, evaluated against the server's local date.
async fn get_dashboard(
    State(state): State<GrantDeskState>,
) -> Result<Json<Dashboard>, GrantDeskError> {
    let today = Local::now().date_naive();
    Ok(Json(state.db.dashboard(today).await?))
}
