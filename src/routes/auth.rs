use axum::routing::{delete, get, post};
use axum::Router;

use crate::auth::handlers;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/signup", post(handlers::signup))
        .route("/login", post(handlers::login))
        .route("/logout", post(handlers::logout))
        .route("/check_session", get(handlers::check_session))
        .route("/clear_session", delete(handlers::clear_session))
}
