//! Read-only revenue and popularity figures over transaction history.

use chrono::{DateTime, Datelike, Duration, NaiveTime, Utc};
use rusqlite::{params, Connection};
use serde::Serialize;

use crate::db;
use crate::error::AppResult;
use crate::state::DbPool;

const TOP_N: i64 = 3;

/// Starts of the current day, week (Monday), and month, all in UTC.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RevenueWindows {
    pub day: DateTime<Utc>,
    pub week: DateTime<Utc>,
    pub month: DateTime<Utc>,
}

impl RevenueWindows {
    pub fn starting_before(now: DateTime<Utc>) -> Self {
        let day = now.date_naive().and_time(NaiveTime::MIN).and_utc();
        let week = day - Duration::days(i64::from(now.weekday().num_days_from_monday()));
        let month = day - Duration::days(i64::from(now.day0()));
        Self { day, week, month }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Ranked {
    pub name: String,
    pub transaction_count: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub daily_revenue: f64,
    pub weekly_revenue: f64,
    pub monthly_revenue: f64,
    pub most_booked_staff: Vec<Ranked>,
    pub most_booked_service: Vec<Ranked>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub total_services: i64,
    pub total_staff: i64,
    pub daily_revenue: f64,
}

#[derive(Clone)]
pub struct ReportingAggregator {
    pool: DbPool,
}

impl ReportingAggregator {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn report(&self) -> AppResult<Report> {
        self.report_at(Utc::now())
    }

    pub fn report_at(&self, now: DateTime<Utc>) -> AppResult<Report> {
        let conn = self.pool.get()?;
        let windows = RevenueWindows::starting_before(now);

        Ok(Report {
            daily_revenue: revenue_between(&conn, windows.day, now)?,
            weekly_revenue: revenue_between(&conn, windows.week, now)?,
            monthly_revenue: revenue_between(&conn, windows.month, now)?,
            most_booked_staff: top_by_transactions(&conn, "staff", "staff_id")?,
            most_booked_service: top_by_transactions(&conn, "services", "service_id")?,
        })
    }

    pub fn summary(&self) -> AppResult<Summary> {
        self.summary_at(Utc::now())
    }

    pub fn summary_at(&self, now: DateTime<Utc>) -> AppResult<Summary> {
        let conn = self.pool.get()?;
        let windows = RevenueWindows::starting_before(now);

        Ok(Summary {
            total_services: conn.query_row("SELECT COUNT(*) FROM services", [], |r| r.get(0))?,
            total_staff: conn.query_row("SELECT COUNT(*) FROM staff", [], |r| r.get(0))?,
            daily_revenue: revenue_between(&conn, windows.day, now)?,
        })
    }
}

/// Sum of amount_paid from `from` up to `to`. Zero when nothing matches.
/// Stored times are truncated to the second, so `<=` on the truncated `to`
/// still only admits rows recorded before it.
fn revenue_between(conn: &Connection, from: DateTime<Utc>, to: DateTime<Utc>) -> AppResult<f64> {
    let total = conn.query_row(
        "SELECT COALESCE(SUM(amount_paid), 0.0) FROM transactions
         WHERE booking_time >= ?1 AND booking_time <= ?2",
        params![db::timestamp(from), db::timestamp(to)],
        |row| row.get(0),
    )?;
    Ok(total)
}

/// Top entries of `table` by number of transactions referencing them through
/// `fk`. Ties keep insertion order.
fn top_by_transactions(conn: &Connection, table: &str, fk: &str) -> AppResult<Vec<Ranked>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT e.name, COUNT(t.id) AS n FROM {table} e
         JOIN transactions t ON t.{fk} = e.id
         GROUP BY e.id
         ORDER BY n DESC, e.rowid ASC
         LIMIT ?1"
    ))?;
    let ranked = stmt
        .query_map(params![TOP_N], |row| {
            Ok(Ranked {
                name: row.get(0)?,
                transaction_count: row.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn windows_for_midweek_afternoon() {
        // Wednesday
        let now = Utc.with_ymd_and_hms(2026, 10, 21, 15, 45, 10).unwrap();
        let w = RevenueWindows::starting_before(now);
        assert_eq!(w.day, Utc.with_ymd_and_hms(2026, 10, 21, 0, 0, 0).unwrap());
        assert_eq!(w.week, Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap());
        assert_eq!(w.month, Utc.with_ymd_and_hms(2026, 10, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn week_can_start_in_previous_month() {
        // Friday 2026-05-01; Monday was 2026-04-27
        let now = Utc.with_ymd_and_hms(2026, 5, 1, 8, 0, 0).unwrap();
        let w = RevenueWindows::starting_before(now);
        assert_eq!(w.week, Utc.with_ymd_and_hms(2026, 4, 27, 0, 0, 0).unwrap());
        assert_eq!(w.month, Utc.with_ymd_and_hms(2026, 5, 1, 0, 0, 0).unwrap());
        assert!(w.week < w.month);
    }

    #[test]
    fn monday_week_starts_today() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 0, 0, 0).unwrap();
        let w = RevenueWindows::starting_before(now);
        assert_eq!(w.week, w.day);
    }
}
