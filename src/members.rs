use rusqlite::params;
use serde::Serialize;

use crate::db::models::UserRole;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

/// A registered client and how often they have visited.
#[derive(Debug, Clone, Serialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: UserRole,
    pub visit_count: i64,
    pub last_visit: Option<String>,
}

/// Every account with the number of transactions linked to it.
pub fn list_members(pool: &DbPool) -> AppResult<Vec<Member>> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare(
        "SELECT u.id, u.name, u.username, u.email, u.role,
                COUNT(t.id), MAX(t.booking_time)
         FROM users u
         LEFT JOIN transactions t ON t.client_id = u.id
         GROUP BY u.id
         ORDER BY COUNT(t.id) DESC, u.name",
    )?;
    let members = stmt
        .query_map([], |row| {
            Ok(Member {
                id: row.get(0)?,
                name: row.get(1)?,
                username: row.get(2)?,
                email: row.get(3)?,
                role: row.get(4)?,
                visit_count: row.get(5)?,
                last_visit: row.get(6)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(members)
}

/// Remove an account. Sessions, reviews, transactions, and bookings it owns
/// go with it through the schema's cascades.
pub fn delete_member(pool: &DbPool, id: &str) -> AppResult<()> {
    let conn = pool.get()?;
    let removed = conn.execute("DELETE FROM users WHERE id = ?1", params![id])?;
    if removed == 0 {
        return Err(AppError::not_found("User"));
    }

    tracing::info!(user_id = %id, "member deleted");
    Ok(())
}
