use axum::extract::{Path, State};
use axum::middleware;
use axum::routing::{delete, get};
use axum::{Json, Router};
use serde_json::{json, Value};

use crate::auth::guard::require_admin;
use crate::error::{AppError, AppResult};
use crate::extractors::CurrentUser;
use crate::members::{self, Member};
use crate::state::AppState;

pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/admin/members", get(list_members))
        .route("/admin/members/{id}", delete(delete_member))
        .route_layer(middleware::from_fn_with_state(state, require_admin))
}

async fn list_members(State(state): State<AppState>) -> AppResult<Json<Vec<Member>>> {
    Ok(Json(members::list_members(&state.db)?))
}

async fn delete_member(
    State(state): State<AppState>,
    CurrentUser(admin): CurrentUser,
    Path(id): Path<String>,
) -> AppResult<Json<Value>> {
    if admin.user_id == id {
        return Err(AppError::Conflict("Admins cannot delete their own account".into()));
    }
    members::delete_member(&state.db, &id)?;
    Ok(Json(json!({ "message": "Member deleted successfully" })))
}
