use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::booking::{BookingRequest, BookingView};
use crate::db::models::Booking;
use crate::error::{AppError, AppResult};
use crate::extractors::{ApiJson, CurrentUser};
use crate::state::AppState;

#[derive(Deserialize)]
struct StatusRequest {
    status: Option<String>,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/bookings", get(list_bookings).post(create_booking))
        .route("/bookings/{id}", patch(update_status))
}

async fn list_bookings(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> AppResult<Json<Vec<BookingView>>> {
    Ok(Json(state.bookings.list_bookings(&claims)?))
}

async fn create_booking(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    ApiJson(req): ApiJson<BookingRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let booking = state.bookings.create_booking(&claims, &req)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Booking created successfully",
            "booking_id": booking.id,
            "booking": booking,
        })),
    ))
}

async fn update_status(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
    Path(id): Path<String>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> AppResult<Json<Booking>> {
    let status = req
        .status
        .ok_or_else(|| AppError::validation("Missing required fields"))?;
    Ok(Json(state.bookings.update_status(&claims, &id, &status)?))
}
