use chrono::{Duration, Utc};
use rand::Rng;
use rusqlite::{params, OptionalExtension};

use crate::auth::Claims;
use crate::db::{self, models::UserRole};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// Create a new session for a user, capturing the role claim. Returns the
/// session token.
pub fn create_session(
    pool: &DbPool,
    user_id: &str,
    role: UserRole,
    hours: u64,
) -> AppResult<String> {
    let conn = pool.get()?;

    let expires_at = i64::try_from(hours)
        .ok()
        .and_then(Duration::try_hours)
        .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
        .map(db::timestamp)
        .ok_or_else(|| AppError::Internal(format!("session lifetime out of range: {}h", hours)))?;
    let token = generate_token();

    conn.execute(
        "INSERT INTO sessions (id, user_id, token, role, expires_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![db::new_id(), user_id, token, role, expires_at],
    )?;

    Ok(token)
}

/// Resolve a token to its claims. Expired or unknown tokens yield None.
pub fn resolve_claims(pool: &DbPool, token: &str) -> AppResult<Option<Claims>> {
    let conn = pool.get()?;

    let claims = conn
        .query_row(
            "SELECT u.id, u.username, s.role FROM sessions s \
             JOIN users u ON u.id = s.user_id \
             WHERE s.token = ?1 AND s.expires_at > ?2",
            params![token, db::now_timestamp()],
            |row| {
                Ok(Claims {
                    user_id: row.get(0)?,
                    username: row.get(1)?,
                    role: row.get(2)?,
                })
            },
        )
        .optional()?;

    Ok(claims)
}

/// Delete a session by token.
pub fn delete_session(pool: &DbPool, token: &str) -> AppResult<()> {
    let conn = pool.get()?;
    conn.execute("DELETE FROM sessions WHERE token = ?1", params![token])?;
    Ok(())
}

/// Delete every session a user holds. Returns how many were removed.
pub fn delete_user_sessions(pool: &DbPool, user_id: &str) -> AppResult<usize> {
    let conn = pool.get()?;
    let removed = conn.execute("DELETE FROM sessions WHERE user_id = ?1", params![user_id])?;
    Ok(removed)
}

/// Generate a cryptographically random 32-byte hex token.
fn generate_token() -> String {
    let mut rng = rand::thread_rng();
    let bytes: [u8; 32] = rng.gen();
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
