use std::collections::HashMap;

use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde::{Deserialize, Serialize};

use super::{non_blank, CatalogManager};
use crate::db::{
    self,
    models::{Gender, Service, Staff, StaffRole, StaffService},
};
use crate::error::{is_unique_violation, AppError, AppResult};
use crate::feedback::average_rating;

#[derive(Debug, Default, Deserialize)]
pub struct StaffInput {
    pub name: Option<String>,
    pub picture: Option<String>,
    pub gender: Option<String>,
    pub role: Option<String>,
}

/// A staff member with the rating derived from their current reviews.
#[derive(Debug, Clone, Serialize)]
pub struct StaffView {
    #[serde(flatten)]
    pub staff: Staff,
    pub average_rating: Option<f64>,
}

fn parse_role(role: &str) -> AppResult<StaffRole> {
    role.parse().map_err(AppError::Validation)
}

fn parse_gender(gender: &str) -> AppResult<Gender> {
    gender.parse().map_err(AppError::Validation)
}

impl CatalogManager {
    pub fn list_staff(&self) -> AppResult<Vec<StaffView>> {
        let conn = self.pool.get()?;

        let mut ratings: HashMap<String, Vec<f64>> = HashMap::new();
        let mut stmt = conn.prepare("SELECT staff_id, rating FROM reviews")?;
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get(1)?)))?;
        for row in rows {
            let (staff_id, rating) = row?;
            ratings.entry(staff_id).or_default().push(rating);
        }

        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM staff ORDER BY name",
            Staff::COLUMNS
        ))?;
        let staff = stmt
            .query_map([], Staff::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(staff
            .into_iter()
            .map(|staff| {
                let average_rating = ratings
                    .get(&staff.id)
                    .and_then(|r| average_rating(r));
                StaffView {
                    staff,
                    average_rating,
                }
            })
            .collect())
    }

    pub fn find_staff(&self, id: &str) -> AppResult<Option<Staff>> {
        let conn = self.pool.get()?;
        let staff = conn
            .query_row(
                &format!("SELECT {} FROM staff WHERE id = ?1", Staff::COLUMNS),
                params![id],
                Staff::from_row,
            )
            .optional()?;
        Ok(staff)
    }

    pub fn get_staff(&self, id: &str) -> AppResult<StaffView> {
        let staff = self
            .find_staff(id)?
            .ok_or_else(|| AppError::not_found("Staff"))?;

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare("SELECT rating FROM reviews WHERE staff_id = ?1")?;
        let ratings = stmt
            .query_map(params![id], |row| row.get::<_, f64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(StaffView {
            staff,
            average_rating: average_rating(&ratings),
        })
    }

    pub fn create_staff(&self, input: &StaffInput) -> AppResult<Staff> {
        let (Some(name), Some(picture), Some(gender), Some(role)) = (
            non_blank(input.name.as_deref()),
            input.picture.as_deref(),
            input.gender.as_deref(),
            input.role.as_deref(),
        ) else {
            return Err(AppError::validation("Missing required fields"));
        };

        let staff = Staff {
            id: db::new_id(),
            name: name.to_string(),
            picture: Some(picture.to_string()),
            gender: Some(parse_gender(gender)?),
            role: parse_role(role)?,
        };

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO staff (id, name, picture, gender, role) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![staff.id, staff.name, staff.picture, staff.gender, staff.role],
        )?;

        tracing::info!(staff_id = %staff.id, role = %staff.role, "staff created");
        Ok(staff)
    }

    pub fn update_staff(&self, id: &str, patch: &StaffInput) -> AppResult<Staff> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut staff = tx
            .query_row(
                &format!("SELECT {} FROM staff WHERE id = ?1", Staff::COLUMNS),
                params![id],
                Staff::from_row,
            )
            .optional()?
            .ok_or_else(|| AppError::not_found("Staff"))?;

        if let Some(name) = patch.name.as_deref() {
            staff.name = non_blank(Some(name))
                .ok_or_else(|| AppError::validation("name must not be empty"))?
                .to_string();
        }
        if let Some(picture) = &patch.picture {
            staff.picture = Some(picture.clone());
        }
        if let Some(gender) = patch.gender.as_deref() {
            staff.gender = Some(parse_gender(gender)?);
        }
        if let Some(role) = patch.role.as_deref() {
            staff.role = parse_role(role)?;
        }

        tx.execute(
            "UPDATE staff SET name = ?2, picture = ?3, gender = ?4, role = ?5 WHERE id = ?1",
            params![staff.id, staff.name, staff.picture, staff.gender, staff.role],
        )?;
        tx.commit()?;

        tracing::info!(staff_id = %staff.id, "staff updated");
        Ok(staff)
    }

    pub fn delete_staff(&self, id: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM staff WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(AppError::not_found("Staff"));
        }

        tracing::info!(staff_id = %id, "staff deleted");
        Ok(())
    }

    /// Record that a staff member performs a service.
    pub fn link_service(&self, staff_id: &str, service_id: &str) -> AppResult<StaffService> {
        if self.find_staff(staff_id)?.is_none() {
            return Err(AppError::not_found("Staff"));
        }
        if self.find_service(service_id)?.is_none() {
            return Err(AppError::not_found("Service"));
        }

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO staff_services (staff_id, service_id) VALUES (?1, ?2)",
            params![staff_id, service_id],
        )
        .map_err(|e| {
            if is_unique_violation(&e) {
                AppError::Conflict("Staff already offers this service".into())
            } else {
                e.into()
            }
        })?;

        Ok(StaffService {
            staff_id: staff_id.to_string(),
            service_id: service_id.to_string(),
        })
    }

    pub fn unlink_service(&self, staff_id: &str, service_id: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        let removed = conn.execute(
            "DELETE FROM staff_services WHERE staff_id = ?1 AND service_id = ?2",
            params![staff_id, service_id],
        )?;
        if removed == 0 {
            return Err(AppError::not_found("Staff service"));
        }
        Ok(())
    }

    pub fn services_for_staff(&self, staff_id: &str) -> AppResult<Vec<Service>> {
        if self.find_staff(staff_id)?.is_none() {
            return Err(AppError::not_found("Staff"));
        }

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(
            "SELECT s.id, s.name, s.picture, s.price, s.time_taken FROM services s \
             JOIN staff_services ss ON ss.service_id = s.id \
             WHERE ss.staff_id = ?1 ORDER BY s.name",
        )?;
        let services = stmt
            .query_map(params![staff_id], Service::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(services)
    }
}
