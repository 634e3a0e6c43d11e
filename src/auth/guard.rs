use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::{authorize, session, Claims};
use crate::db::models::UserRole;
use crate::error::{AppError, AppResult};
use crate::extractors::session_token;
use crate::state::AppState;

/// Middleware for admin-only routes. Resolves the session claims, checks the
/// role, and hands the claims to the handler through request extensions.
/// Rejects with 401 without a live session and 403 for any other role.
pub async fn require_admin(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> AppResult<Response> {
    let claims = claims_for(&state, &req)?;

    if let Err(e) = authorize(&claims, UserRole::Admin) {
        tracing::warn!(user_id = %claims.user_id, path = %req.uri().path(), "admin route denied");
        return Err(e);
    }

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

fn claims_for(state: &AppState, req: &Request) -> AppResult<Claims> {
    let token = session_token(req.headers(), &state.config.auth.cookie_name)
        .ok_or_else(|| AppError::Unauthorized("Authentication required".into()))?;

    session::resolve_claims(&state.db, token)?
        .ok_or_else(|| AppError::Unauthorized("Session expired or invalid".into()))
}
