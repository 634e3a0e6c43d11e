use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, patch};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::booking::{TransactionRequest, TransactionView};
use crate::db::models::Transaction;
use crate::error::AppResult;
use crate::extractors::{ApiJson, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/transactions",
            get(list_transactions).post(create_transaction),
        )
        .route("/transactions/{id}/complete", patch(complete_transaction))
}

async fn list_transactions(
    State(state): State<AppState>,
) -> AppResult<Json<Vec<TransactionView>>> {
    Ok(Json(state.bookings.list_transactions()?))
}

async fn create_transaction(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<TransactionRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let transaction = state.bookings.create_transaction(&req)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Transaction successfully added",
            "transaction": transaction,
        })),
    ))
}

async fn complete_transaction(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Transaction>> {
    Ok(Json(state.bookings.complete_transaction(&id)?))
}
