use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;

use crate::booking::BookingCoordinator;
use crate::catalog::CatalogManager;
use crate::config::Config;
use crate::feedback::FeedbackManager;
use crate::reports::ReportingAggregator;

pub type DbPool = Pool<SqliteConnectionManager>;

/// Shared per-process handles. Every component owns a clone of the same
/// pool; nothing else is shared between requests.
#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Config,
    pub catalog: CatalogManager,
    pub bookings: BookingCoordinator,
    pub feedback: FeedbackManager,
    pub reports: ReportingAggregator,
}

impl AppState {
    pub fn new(db: DbPool, config: Config) -> Self {
        Self {
            catalog: CatalogManager::new(db.clone()),
            bookings: BookingCoordinator::new(db.clone()),
            feedback: FeedbackManager::new(db.clone()),
            reports: ReportingAggregator::new(db.clone()),
            db,
            config,
        }
    }
}
