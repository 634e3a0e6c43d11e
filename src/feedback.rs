//! Reviews and the per-staff average rating derived from them.
//!
//! The average is never stored. It is recomputed from the current review
//! rows on every read, so it cannot drift from them.

use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};

use crate::db::{
    self,
    models::{Review, StaffRole},
};
use crate::error::{AppError, AppResult};
use crate::state::DbPool;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

/// Mean of the given ratings; None when there are none.
pub fn average_rating(ratings: &[f64]) -> Option<f64> {
    if ratings.is_empty() {
        return None;
    }
    Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
}

pub fn validate_rating(rating: f64) -> AppResult<f64> {
    if (MIN_RATING..=MAX_RATING).contains(&rating) {
        Ok(rating)
    } else {
        Err(AppError::Validation(
            "Rating must be between 1 and 5".into(),
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewInput {
    pub staff_id: Option<String>,
    pub client_id: Option<String>,
    pub rating: Option<f64>,
    pub review: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ReviewUpdate {
    pub rating: Option<f64>,
    pub review: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffReviewEntry {
    pub rating: f64,
    pub review: Option<String>,
    pub client: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StaffReviews {
    pub id: String,
    pub name: String,
    pub picture: Option<String>,
    pub role: StaffRole,
    pub average_rating: Option<f64>,
    pub reviews: Vec<StaffReviewEntry>,
}

#[derive(Clone)]
pub struct FeedbackManager {
    pool: DbPool,
}

impl FeedbackManager {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn list_reviews(&self) -> AppResult<Vec<Review>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!("SELECT {} FROM reviews", Review::COLUMNS))?;
        let reviews = stmt
            .query_map([], Review::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(reviews)
    }

    pub fn get_review(&self, id: &str) -> AppResult<Review> {
        let conn = self.pool.get()?;
        conn.query_row(
            &format!("SELECT {} FROM reviews WHERE id = ?1", Review::COLUMNS),
            params![id],
            Review::from_row,
        )
        .optional()?
        .ok_or_else(|| AppError::not_found("Review"))
    }

    pub fn create_review(&self, input: &ReviewInput) -> AppResult<Review> {
        let (Some(staff_id), Some(client_id), Some(rating)) = (
            input.staff_id.as_deref(),
            input.client_id.as_deref(),
            input.rating,
        ) else {
            return Err(AppError::validation("Missing required fields"));
        };
        let rating = validate_rating(rating)?;

        let conn = self.pool.get()?;
        let staff_exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM staff WHERE id = ?1",
            params![staff_id],
            |row| row.get(0),
        )?;
        if !staff_exists {
            return Err(AppError::not_found("Staff"));
        }
        let client_exists: bool = conn.query_row(
            "SELECT COUNT(*) > 0 FROM users WHERE id = ?1",
            params![client_id],
            |row| row.get(0),
        )?;
        if !client_exists {
            return Err(AppError::not_found("Client"));
        }

        let review = Review {
            id: db::new_id(),
            staff_id: staff_id.to_string(),
            client_id: client_id.to_string(),
            rating,
            review: input.review.clone(),
        };
        conn.execute(
            "INSERT INTO reviews (id, staff_id, client_id, rating, review) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                review.id,
                review.staff_id,
                review.client_id,
                review.rating,
                review.review
            ],
        )?;

        tracing::info!(review_id = %review.id, staff_id = %review.staff_id, "review created");
        Ok(review)
    }

    pub fn update_review(&self, id: &str, patch: &ReviewUpdate) -> AppResult<Review> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut review = tx
            .query_row(
                &format!("SELECT {} FROM reviews WHERE id = ?1", Review::COLUMNS),
                params![id],
                Review::from_row,
            )
            .optional()?
            .ok_or_else(|| AppError::not_found("Review"))?;

        if let Some(rating) = patch.rating {
            review.rating = validate_rating(rating)?;
        }
        if let Some(text) = &patch.review {
            review.review = Some(text.clone());
        }

        tx.execute(
            "UPDATE reviews SET rating = ?2, review = ?3 WHERE id = ?1",
            params![review.id, review.rating, review.review],
        )?;
        tx.commit()?;
        Ok(review)
    }

    pub fn delete_review(&self, id: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM reviews WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(AppError::not_found("Review"));
        }
        Ok(())
    }

    /// Every staff member with their reviews and current average.
    pub fn staff_reviews(&self) -> AppResult<Vec<StaffReviews>> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare("SELECT id, name, picture, role FROM staff ORDER BY name")?;
        let mut staff = stmt
            .query_map([], |row| {
                Ok(StaffReviews {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    picture: row.get(2)?,
                    role: row.get(3)?,
                    average_rating: None,
                    reviews: Vec::new(),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut stmt = conn.prepare(
            "SELECT r.rating, r.review, u.name FROM reviews r \
             JOIN users u ON u.id = r.client_id \
             WHERE r.staff_id = ?1",
        )?;
        for entry in &mut staff {
            entry.reviews = stmt
                .query_map(params![entry.id], |row| {
                    Ok(StaffReviewEntry {
                        rating: row.get(0)?,
                        review: row.get(1)?,
                        client: row.get(2)?,
                    })
                })?
                .collect::<Result<Vec<_>, _>>()?;
            let ratings: Vec<f64> = entry.reviews.iter().map(|r| r.rating).collect();
            entry.average_rating = average_rating(&ratings);
        }

        Ok(staff)
    }
}
