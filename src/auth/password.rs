use crate::error::{AppError, AppResult};

/// Hash a plaintext password with bcrypt at the given cost.
pub fn hash_password(plaintext: &str, cost: u32) -> Result<String, bcrypt::BcryptError> {
    bcrypt::hash(plaintext, cost)
}

/// Constant-time check via bcrypt. A malformed stored hash never verifies.
pub fn verify_password(plaintext: &str, hash: &str) -> bool {
    bcrypt::verify(plaintext, hash).unwrap_or(false)
}

/// Run bcrypt-bound work on tokio's blocking pool instead of an executor
/// thread.
pub async fn run_blocking<T, F>(work: F) -> AppResult<T>
where
    F: FnOnce() -> AppResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AppError::Internal(format!("blocking task failed: {}", e)))?
}

/// `verify_password` on the blocking pool. A failed task never verifies.
pub async fn verify_password_blocking(plaintext: String, hash: String) -> bool {
    tokio::task::spawn_blocking(move || verify_password(&plaintext, &hash))
        .await
        .unwrap_or(false)
}
