use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::db::models::Review;
use crate::error::AppResult;
use crate::extractors::ApiJson;
use crate::feedback::{ReviewInput, ReviewUpdate};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reviews", get(list_reviews).post(create_review))
        .route(
            "/reviews/{id}",
            get(get_review).put(update_review).delete(delete_review),
        )
}

async fn list_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<Review>>> {
    Ok(Json(state.feedback.list_reviews()?))
}

async fn get_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.feedback.get_review(&id)?))
}

async fn create_review(
    State(state): State<AppState>,
    ApiJson(input): ApiJson<ReviewInput>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let review = state.feedback.create_review(&input)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Review added successfully", "review": review })),
    ))
}

async fn update_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ReviewUpdate>,
) -> AppResult<Json<Review>> {
    Ok(Json(state.feedback.update_review(&id, &patch)?))
}

async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    state.feedback.delete_review(&id)?;
    Ok(Json(json!({ "message": "Review deleted successfully" })))
}
