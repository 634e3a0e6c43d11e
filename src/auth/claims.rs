use serde::Serialize;

use crate::db::models::UserRole;
use crate::error::{AppError, AppResult};

/// Verified identity attached to a live session. The role is the claim
/// captured when the session was issued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Claims {
    pub user_id: String,
    pub username: String,
    pub role: UserRole,
}

impl Claims {
    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }
}

/// Role gate. Admins satisfy every requirement.
pub fn authorize(claims: &Claims, required: UserRole) -> AppResult<()> {
    match (claims.role, required) {
        (UserRole::Admin, _) => Ok(()),
        (role, required) if role == required => Ok(()),
        _ => Err(AppError::Forbidden),
    }
}
