//! Booking and transaction writes.
//!
//! Each write runs its checks and its insert inside one IMMEDIATE
//! transaction, so no other writer can commit between the check and the
//! insert. The UNIQUE(staff_id, booking_time) index stays the final guard:
//! a violation at insert is reported as the same conflict the check gives.

mod bookings;
mod time;
mod transactions;

pub use bookings::{BookingRequest, BookingView};
pub use time::parse_booking_time;
pub use transactions::{TransactionRequest, TransactionView};

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::models::Service;
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

pub const STAFF_ALREADY_BOOKED: &str = "staff already booked";

#[derive(Clone)]
pub struct BookingCoordinator {
    pool: DbPool,
}

impl BookingCoordinator {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn load_service(conn: &Connection, id: &str) -> AppResult<Service> {
    conn.query_row(
        &format!("SELECT {} FROM services WHERE id = ?1", Service::COLUMNS),
        params![id],
        Service::from_row,
    )
    .optional()?
    .ok_or_else(|| AppError::not_found("Service"))
}

fn require_exists(conn: &Connection, table: &str, entity: &str, id: &str) -> AppResult<()> {
    let exists: bool = conn.query_row(
        &format!("SELECT COUNT(*) > 0 FROM {} WHERE id = ?1", table),
        params![id],
        |row| row.get(0),
    )?;
    if exists {
        Ok(())
    } else {
        Err(AppError::not_found(entity))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
