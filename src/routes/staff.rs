use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::catalog::{StaffInput, StaffView};
use crate::db::models::{Service, Staff, StaffService};
use crate::error::{AppError, AppResult};
use crate::extractors::{ApiJson, CurrentUser};
use crate::feedback::StaffReviews;
use crate::state::AppState;

#[derive(Deserialize)]
struct LinkRequest {
    service_id: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/staff", get(list_staff).post(create_staff))
        .route("/staff/reviews", get(staff_reviews))
        .route(
            "/staff/{id}",
            get(get_staff).patch(update_staff).delete(delete_staff),
        )
        .route(
            "/staff/{id}/services",
            get(staff_services).post(link_service),
        )
        .route(
            "/staff/{id}/services/{service_id}",
            delete(unlink_service),
        )
}

async fn list_staff(State(state): State<AppState>) -> AppResult<Json<Vec<StaffView>>> {
    Ok(Json(state.catalog.list_staff()?))
}

async fn staff_reviews(State(state): State<AppState>) -> AppResult<Json<Vec<StaffReviews>>> {
    Ok(Json(state.feedback.staff_reviews()?))
}

async fn get_staff(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<StaffView>> {
    Ok(Json(state.catalog.get_staff(&id)?))
}

async fn create_staff(
    State(state): State<AppState>,
    _user: CurrentUser,
    ApiJson(input): ApiJson<StaffInput>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let staff = state.catalog.create_staff(&input)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Staff added successfully!", "staff": staff })),
    ))
}

async fn update_staff(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<StaffInput>,
) -> AppResult<Json<Staff>> {
    Ok(Json(state.catalog.update_staff(&id, &patch)?))
}

async fn delete_staff(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    state.catalog.delete_staff(&id)?;
    Ok(Json(json!({ "message": "Staff deleted successfully" })))
}

async fn staff_services(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<Json<Vec<Service>>> {
    Ok(Json(state.catalog.services_for_staff(&id)?))
}

async fn link_service(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<LinkRequest>,
) -> AppResult<(StatusCode, Json<StaffService>)> {
    let service_id = req
        .service_id
        .ok_or_else(|| AppError::validation("Missing required fields"))?;
    let link = state.catalog.link_service(&id, &service_id)?;
    Ok((StatusCode::CREATED, Json(link)))
}

async fn unlink_service(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((id, service_id)): Path<(String, String)>,
) -> AppResult<Json<Value>> {
    state.catalog.unlink_service(&id, &service_id)?;
    Ok(Json(json!({ "message": "Service removed from staff" })))
}
