use axum::extract::State;
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rusqlite::{params, OptionalExtension};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::{password, session};
use crate::config::AuthConfig;
use crate::db::models::{Gender, User, UserRole};
use crate::db;
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::extractors::{session_token, ApiJson, CurrentUser};
use crate::state::{AppState, DbPool};

// -- Request types --

#[derive(Deserialize)]
pub struct SignupRequest {
    pub name: Option<String>,
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub image: Option<String>,
    pub gender: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
}

impl From<&User> for UserSummary {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            username: user.username.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }
}

/// Fields for a new account, already validated.
pub struct NewUser<'a> {
    pub name: &'a str,
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub picture: Option<&'a str>,
    pub gender: Option<Gender>,
    pub role: UserRole,
}

// -- Cookie helpers --

fn session_cookie(auth: &AuthConfig, token: &str) -> String {
    let max_age_secs = auth.session_hours * 3600;
    let secure = if auth.secure_cookie { "; Secure" } else { "" };
    format!(
        "{}={}; HttpOnly; SameSite=Lax; Path=/; Max-Age={}{}",
        auth.cookie_name, token, max_age_secs, secure
    )
}

fn clear_session_cookie(auth: &AuthConfig) -> String {
    format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        auth.cookie_name
    )
}

// -- Account store --

/// Insert a user after the uniqueness pre-check. A race that slips past the
/// pre-check is caught by the UNIQUE constraints on insert.
pub fn register_user(pool: &DbPool, new: &NewUser<'_>, bcrypt_cost: u32) -> AppResult<User> {
    let password_hash = password::hash_password(new.password, bcrypt_cost)?;

    let mut conn = pool.get()?;
    let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

    let email_taken: bool = tx.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE email = ?1",
        params![new.email],
        |row| row.get(0),
    )?;
    if email_taken {
        return Err(AppError::Conflict("Email is already registered".into()));
    }

    let username_taken: bool = tx.query_row(
        "SELECT COUNT(*) > 0 FROM users WHERE username = ?1",
        params![new.username],
        |row| row.get(0),
    )?;
    if username_taken {
        return Err(AppError::Conflict("Username is already taken".into()));
    }

    let id = db::new_id();

    tx.execute(
        "INSERT INTO users (id, name, username, email, password_hash, gender, picture, role)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            new.name,
            new.username,
            new.email,
            password_hash,
            new.gender,
            new.picture,
            new.role
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) {
            AppError::Conflict("A user with this email or username already exists".into())
        } else {
            e.into()
        }
    })?;

    let user = tx.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
        params![id],
        User::from_row,
    )?;
    tx.commit()?;

    tracing::info!(user_id = %user.id, username = %user.username, "user registered");
    Ok(user)
}

pub fn find_user(pool: &DbPool, id: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE id = ?1", User::COLUMNS),
            params![id],
            User::from_row,
        )
        .optional()?;
    Ok(user)
}

fn find_user_by_username(pool: &DbPool, username: &str) -> AppResult<Option<User>> {
    let conn = pool.get()?;
    let user = conn
        .query_row(
            &format!("SELECT {} FROM users WHERE username = ?1", User::COLUMNS),
            params![username],
            User::from_row,
        )
        .optional()?;
    Ok(user)
}

fn missing_fields(fields: &[(&str, bool)]) -> Option<String> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect();
    if missing.is_empty() {
        None
    } else {
        Some(format!("Missing fields: {}", missing.join(", ")))
    }
}

fn present(value: &Option<String>) -> bool {
    value.as_deref().is_some_and(|v| !v.trim().is_empty())
}

// -- Handlers --

/// POST /signup
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> AppResult<Response> {
    if let Some(msg) = missing_fields(&[
        ("name", present(&req.name)),
        ("username", present(&req.username)),
        ("email", present(&req.email)),
        ("password", present(&req.password)),
        ("image", req.image.is_some()),
    ]) {
        return Err(AppError::Validation(msg));
    }

    let gender = req
        .gender
        .as_deref()
        .filter(|g| !g.trim().is_empty())
        .map(str::parse::<Gender>)
        .transpose()
        .map_err(AppError::Validation)?;

    // Presence was checked above
    let name = req.name.as_deref().unwrap_or_default().trim().to_string();
    let username = req.username.as_deref().unwrap_or_default().trim().to_string();
    let email = req.email.as_deref().unwrap_or_default().trim().to_string();
    let password = req.password.unwrap_or_default();
    let picture = req.image;

    // bcrypt and the insert run on the blocking pool
    let pool = state.db.clone();
    let cost = state.config.auth.bcrypt_cost;
    let user = password::run_blocking(move || {
        register_user(
            &pool,
            &NewUser {
                name: &name,
                username: &username,
                email: &email,
                password: &password,
                picture: picture.as_deref(),
                gender,
                role: UserRole::User,
            },
            cost,
        )
    })
    .await?;

    let token = session::create_session(
        &state.db,
        &user.id,
        user.role,
        state.config.auth.session_hours,
    )?;

    Ok((
        StatusCode::CREATED,
        [(header::SET_COOKIE, session_cookie(&state.config.auth, &token))],
        Json(json!({
            "message": "User registered successfully",
            "user": UserSummary::from(&user),
        })),
    )
        .into_response())
}

/// POST /login
pub async fn login(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> AppResult<Response> {
    let (Some(username), Some(password)) = (req.username.as_deref(), req.password.as_deref())
    else {
        return Err(AppError::Validation("Username and password are required".into()));
    };

    let found = find_user_by_username(&state.db, username.trim())?;
    let verified = match &found {
        Some(user) => {
            password::verify_password_blocking(password.to_string(), user.password_hash.clone())
                .await
        }
        None => false,
    };
    let user = match found {
        Some(user) if verified => user,
        _ => {
            tracing::warn!(username = %username, "failed login");
            return Err(AppError::Unauthorized("Invalid credentials".into()));
        }
    };

    let token = session::create_session(
        &state.db,
        &user.id,
        user.role,
        state.config.auth.session_hours,
    )?;

    let summary = UserSummary::from(&user);
    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, session_cookie(&state.config.auth, &token))],
        Json(json!({
            "message": "Login successful",
            "id": summary.id,
            "username": summary.username,
            "email": summary.email,
            "role": summary.role,
        })),
    )
        .into_response())
}

/// POST /logout
pub async fn logout(State(state): State<AppState>, headers: HeaderMap) -> AppResult<Response> {
    if let Some(token) = session_token(&headers, &state.config.auth.cookie_name) {
        session::delete_session(&state.db, token)?;
    }

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie(&state.config.auth))],
        Json(json!({ "message": "Logout successful" })),
    )
        .into_response())
}

/// GET /check_session
pub async fn check_session(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> AppResult<Json<UserSummary>> {
    let user = find_user(&state.db, &claims.user_id)?
        .ok_or_else(|| AppError::not_found("User"))?;
    Ok(Json(UserSummary::from(&user)))
}

/// DELETE /clear_session: sign out of every session the caller holds.
pub async fn clear_session(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> AppResult<Response> {
    let removed = session::delete_user_sessions(&state.db, &claims.user_id)?;
    tracing::info!(user_id = %claims.user_id, removed, "sessions cleared");

    Ok((
        StatusCode::OK,
        [(header::SET_COOKIE, clear_session_cookie(&state.config.auth))],
        Json(json!({ "message": "Session cleared" })),
    )
        .into_response())
}
