use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};

use crate::error::AppResult;
use crate::reports::{Report, Summary};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reports", get(report))
        .route("/reports/summary", get(summary))
}

async fn report(State(state): State<AppState>) -> AppResult<Json<Report>> {
    Ok(Json(state.reports.report()?))
}

async fn summary(State(state): State<AppState>) -> AppResult<Json<Summary>> {
    Ok(Json(state.reports.summary()?))
}
