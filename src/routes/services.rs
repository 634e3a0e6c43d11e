use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::catalog::ServiceInput;
use crate::db::models::Service;
use crate::error::AppResult;
use crate::extractors::{ApiJson, CurrentUser, MaybeUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/services", get(list_services).post(create_service))
        .route(
            "/services/{id}",
            get(get_service).patch(update_service).delete(delete_service),
        )
}

async fn list_services(State(state): State<AppState>) -> AppResult<Json<Vec<Service>>> {
    Ok(Json(state.catalog.list_services()?))
}

async fn get_service(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Service>> {
    Ok(Json(state.catalog.get_service(&id)?))
}

async fn create_service(
    State(state): State<AppState>,
    MaybeUser(user): MaybeUser,
    ApiJson(input): ApiJson<ServiceInput>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let service = state.catalog.create_service(&input)?;
    if let Some(user) = user {
        tracing::debug!(service_id = %service.id, by = %user.user_id, "service added");
    }
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Service added successfully!", "service": service })),
    ))
}

async fn update_service(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<ServiceInput>,
) -> AppResult<Json<Service>> {
    Ok(Json(state.catalog.update_service(&id, &patch)?))
}

async fn delete_service(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    state.catalog.delete_service(&id)?;
    Ok(Json(json!({ "message": "Service deleted successfully" })))
}
