//! Services, staff, and the links saying which staff perform which service.
//!
//! Updates are partial patches: only supplied fields change. Deletes are
//! hard deletes; the schema's ON DELETE CASCADE removes every dependent
//! link, review, transaction, and booking in the same statement.

mod services;
mod staff;

pub use services::ServiceInput;
pub use staff::{StaffInput, StaffView};

use crate::state::DbPool;

#[derive(Clone)]
pub struct CatalogManager {
    pool: DbPool,
}

impl CatalogManager {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// Prices and durations must be positive.
pub(crate) fn require_positive(field: &str, value: f64) -> crate::error::AppResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(crate::error::AppError::Validation(format!(
            "{} must be greater than zero",
            field
        )))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
