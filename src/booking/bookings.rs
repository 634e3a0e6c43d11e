use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};

use super::{
    load_service, non_blank, parse_booking_time, require_exists, BookingCoordinator,
    STAFF_ALREADY_BOOKED,
};
use crate::auth::Claims;
use crate::db::{
    self,
    models::{Booking, BookingStatus},
};
use crate::error::{is_unique_violation, AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct BookingRequest {
    pub service_id: Option<String>,
    pub staff_id: Option<String>,
    pub booking_time: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BookingView {
    #[serde(flatten)]
    pub booking: Booking,
    pub service_name: String,
    pub staff_name: String,
}

impl BookingCoordinator {
    /// Book a staff member for a service at a given time on behalf of the
    /// requester. Checks run in order: required fields, time format, service,
    /// staff, then the double-booking check.
    pub fn create_booking(&self, requester: &Claims, req: &BookingRequest) -> AppResult<Booking> {
        let (Some(service_id), Some(staff_id), Some(raw_time)) = (
            non_blank(req.service_id.as_deref()),
            non_blank(req.staff_id.as_deref()),
            non_blank(req.booking_time.as_deref()),
        ) else {
            return Err(AppError::validation("Missing required fields"));
        };
        let booking_time = db::timestamp(parse_booking_time(raw_time)?);

        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        load_service(&tx, service_id)?;
        require_exists(&tx, "staff", "Staff", staff_id)?;

        let taken: bool = tx.query_row(
            "SELECT COUNT(*) > 0 FROM bookings WHERE staff_id = ?1 AND booking_time = ?2",
            params![staff_id, booking_time],
            |row| row.get(0),
        )?;
        if taken {
            tracing::warn!(staff_id = %staff_id, booking_time = %booking_time, "double booking rejected");
            return Err(AppError::Conflict(STAFF_ALREADY_BOOKED.into()));
        }

        let booking = Booking {
            id: db::new_id(),
            service_id: service_id.to_string(),
            user_id: requester.user_id.clone(),
            staff_id: staff_id.to_string(),
            booking_time,
            status: BookingStatus::Pending,
            created_at: db::now_timestamp(),
        };

        tx.execute(
            "INSERT INTO bookings (id, service_id, user_id, staff_id, booking_time, status, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                booking.id,
                booking.service_id,
                booking.user_id,
                booking.staff_id,
                booking.booking_time,
                booking.status,
                booking.created_at
            ],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict(STAFF_ALREADY_BOOKED.into())
            } else {
                e.into()
            }
        })?;
        tx.commit()?;

        tracing::info!(
            booking_id = %booking.id,
            staff_id = %booking.staff_id,
            booking_time = %booking.booking_time,
            "booking created"
        );
        Ok(booking)
    }

    /// Admins see every booking; everyone else sees their own.
    pub fn list_bookings(&self, viewer: &Claims) -> AppResult<Vec<BookingView>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT b.id, b.service_id, b.user_id, b.staff_id, b.booking_time, b.status,
                    b.created_at, sv.name, st.name
             FROM bookings b
             JOIN services sv ON sv.id = b.service_id
             JOIN staff st ON st.id = b.staff_id
             WHERE ?1 OR b.user_id = ?2
             ORDER BY b.booking_time",
        )?;
        let bookings = stmt
            .query_map(params![viewer.is_admin(), viewer.user_id], |row| {
                Ok(BookingView {
                    booking: Booking::from_row(row)?,
                    service_name: row.get(7)?,
                    staff_name: row.get(8)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(bookings)
    }

    pub fn get_booking(&self, id: &str) -> AppResult<Booking> {
        let conn = self.pool.get()?;
        conn.query_row(
            &format!("SELECT {} FROM bookings WHERE id = ?1", Booking::COLUMNS),
            params![id],
            Booking::from_row,
        )
        .optional()?
        .ok_or_else(|| AppError::not_found("Booking"))
    }

    /// Owners may only cancel; admins may set any status. Completed and
    /// canceled bookings are final. The read, the checks, and the write
    /// share one IMMEDIATE transaction, so two racing transitions cannot
    /// both leave a final status.
    pub fn update_status(&self, actor: &Claims, id: &str, status: &str) -> AppResult<Booking> {
        let status: BookingStatus = status.parse().map_err(AppError::Validation)?;

        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut booking = tx
            .query_row(
                &format!("SELECT {} FROM bookings WHERE id = ?1", Booking::COLUMNS),
                params![id],
                Booking::from_row,
            )
            .optional()?
            .ok_or_else(|| AppError::not_found("Booking"))?;

        if !actor.is_admin()
            && (booking.user_id != actor.user_id || status != BookingStatus::Canceled)
        {
            return Err(AppError::Forbidden);
        }
        if booking.status == status {
            return Ok(booking);
        }
        if booking.status.is_terminal() {
            return Err(AppError::Conflict(format!(
                "Booking is already {}",
                booking.status
            )));
        }

        tx.execute(
            "UPDATE bookings SET status = ?2 WHERE id = ?1",
            params![booking.id, status],
        )?;
        tx.commit()?;
        booking.status = status;

        tracing::info!(booking_id = %booking.id, status = %status, "booking status changed");
        Ok(booking)
    }
}
