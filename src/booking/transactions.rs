use chrono::{DateTime, Utc};
use rusqlite::{params, TransactionBehavior};
use serde::{Deserialize, Serialize};

use super::{load_service, non_blank, require_exists, BookingCoordinator};
use crate::catalog::require_positive;
use crate::db::{self, models::Transaction};
use crate::error::{AppError, AppResult};

#[derive(Debug, Default, Deserialize)]
pub struct TransactionRequest {
    pub service_id: Option<String>,
    pub staff_id: Option<String>,
    /// Set only for registered clients; walk-ins are named by client_name.
    pub client_id: Option<String>,
    pub client_name: Option<String>,
    pub amount_paid: Option<f64>,
    pub time_taken: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TransactionView {
    pub id: String,
    pub service_name: String,
    pub staff_name: String,
    pub client_name: String,
    pub amount_paid: f64,
    pub time_taken: f64,
    pub booking_time: String,
    pub completed_at: Option<String>,
}

impl BookingCoordinator {
    pub fn create_transaction(&self, req: &TransactionRequest) -> AppResult<Transaction> {
        self.create_transaction_at(req, Utc::now())
    }

    /// Record a payment. The amount must equal the service's current price;
    /// the caller's figure is never trusted. Checks run in order: required
    /// fields and a positive time_taken, service, amount, staff, then the
    /// optional client.
    pub fn create_transaction_at(
        &self,
        req: &TransactionRequest,
        now: DateTime<Utc>,
    ) -> AppResult<Transaction> {
        let (Some(service_id), Some(staff_id), Some(client_name), Some(amount_paid), Some(time_taken)) = (
            non_blank(req.service_id.as_deref()),
            non_blank(req.staff_id.as_deref()),
            non_blank(req.client_name.as_deref()),
            req.amount_paid,
            req.time_taken,
        ) else {
            return Err(AppError::validation("Missing required fields"));
        };
        let time_taken = require_positive("time_taken", time_taken)?;
        let client_id = non_blank(req.client_id.as_deref());

        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let service = load_service(&tx, service_id)?;
        if amount_paid != service.price {
            return Err(AppError::Validation(format!(
                "Incorrect amount. Expected: {:?}, Received: {:?}",
                service.price, amount_paid
            )));
        }
        require_exists(&tx, "staff", "Staff", staff_id)?;
        if let Some(client_id) = client_id {
            require_exists(&tx, "users", "Client", client_id)?;
        }

        let transaction = Transaction {
            id: db::new_id(),
            service_id: service_id.to_string(),
            staff_id: staff_id.to_string(),
            client_id: client_id.map(str::to_string),
            client_name: client_name.to_string(),
            amount_paid,
            time_taken,
            booking_time: db::timestamp(now),
            completed_at: None,
        };

        tx.execute(
            "INSERT INTO transactions (id, service_id, staff_id, client_id, client_name,
                                       amount_paid, time_taken, booking_time)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                transaction.id,
                transaction.service_id,
                transaction.staff_id,
                transaction.client_id,
                transaction.client_name,
                transaction.amount_paid,
                transaction.time_taken,
                transaction.booking_time
            ],
        )?;
        tx.commit()?;

        tracing::info!(
            transaction_id = %transaction.id,
            service_id = %transaction.service_id,
            amount_paid = transaction.amount_paid,
            "transaction recorded"
        );
        Ok(transaction)
    }

    /// Newest first. Registered clients show their account name.
    pub fn list_transactions(&self) -> AppResult<Vec<TransactionView>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT t.id, sv.name, st.name, COALESCE(u.name, t.client_name),
                    t.amount_paid, t.time_taken, t.booking_time, t.completed_at
             FROM transactions t
             JOIN services sv ON sv.id = t.service_id
             JOIN staff st ON st.id = t.staff_id
             LEFT JOIN users u ON u.id = t.client_id
             ORDER BY t.booking_time DESC",
        )?;
        let rows = stmt
            .query_map([], |row| {
                Ok(TransactionView {
                    id: row.get(0)?,
                    service_name: row.get(1)?,
                    staff_name: row.get(2)?,
                    client_name: row.get(3)?,
                    amount_paid: row.get(4)?,
                    time_taken: row.get(5)?,
                    booking_time: row.get(6)?,
                    completed_at: row.get(7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn complete_transaction(&self, id: &str) -> AppResult<Transaction> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut transaction = tx
            .query_row(
                &format!("SELECT {} FROM transactions WHERE id = ?1", Transaction::COLUMNS),
                params![id],
                Transaction::from_row,
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => AppError::not_found("Transaction"),
                other => other.into(),
            })?;
        if transaction.completed_at.is_some() {
            return Err(AppError::Conflict("Transaction already completed".into()));
        }

        let completed_at = db::now_timestamp();
        tx.execute(
            "UPDATE transactions SET completed_at = ?2 WHERE id = ?1",
            params![id, completed_at],
        )?;
        tx.commit()?;

        transaction.completed_at = Some(completed_at);
        Ok(transaction)
    }
}
