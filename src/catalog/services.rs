use rusqlite::{params, OptionalExtension, TransactionBehavior};
use serde::Deserialize;

use super::{non_blank, require_positive, CatalogManager};
use crate::db::{self, models::Service};
use crate::error::{AppError, AppResult};

/// Body of POST /services and PATCH /services/{id}. Create needs every
/// field; update applies whichever are present.
#[derive(Debug, Default, Deserialize)]
pub struct ServiceInput {
    pub name: Option<String>,
    pub picture: Option<String>,
    pub price: Option<f64>,
    pub time_taken: Option<f64>,
}

impl CatalogManager {
    pub fn list_services(&self) -> AppResult<Vec<Service>> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM services ORDER BY name",
            Service::COLUMNS
        ))?;
        let services = stmt
            .query_map([], Service::from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(services)
    }

    pub fn find_service(&self, id: &str) -> AppResult<Option<Service>> {
        let conn = self.pool.get()?;
        let service = conn
            .query_row(
                &format!("SELECT {} FROM services WHERE id = ?1", Service::COLUMNS),
                params![id],
                Service::from_row,
            )
            .optional()?;
        Ok(service)
    }

    pub fn get_service(&self, id: &str) -> AppResult<Service> {
        self.find_service(id)?
            .ok_or_else(|| AppError::not_found("Service"))
    }

    pub fn create_service(&self, input: &ServiceInput) -> AppResult<Service> {
        let (Some(name), Some(picture), Some(price), Some(time_taken)) = (
            non_blank(input.name.as_deref()),
            input.picture.as_deref(),
            input.price,
            input.time_taken,
        ) else {
            return Err(AppError::validation("Missing required fields"));
        };

        let service = Service {
            id: db::new_id(),
            name: name.to_string(),
            picture: Some(picture.to_string()),
            price: require_positive("price", price)?,
            time_taken: require_positive("time_taken", time_taken)?,
        };

        let conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO services (id, name, picture, price, time_taken) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                service.id,
                service.name,
                service.picture,
                service.price,
                service.time_taken
            ],
        )?;

        tracing::info!(service_id = %service.id, name = %service.name, "service created");
        Ok(service)
    }

    /// Apply a partial patch. The merge runs inside one IMMEDIATE
    /// transaction so concurrent patches to different fields both land.
    pub fn update_service(&self, id: &str, patch: &ServiceInput) -> AppResult<Service> {
        let mut conn = self.pool.get()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let mut service = tx
            .query_row(
                &format!("SELECT {} FROM services WHERE id = ?1", Service::COLUMNS),
                params![id],
                Service::from_row,
            )
            .optional()?
            .ok_or_else(|| AppError::not_found("Service"))?;

        if let Some(name) = patch.name.as_deref() {
            service.name = non_blank(Some(name))
                .ok_or_else(|| AppError::validation("name must not be empty"))?
                .to_string();
        }
        if let Some(picture) = &patch.picture {
            service.picture = Some(picture.clone());
        }
        if let Some(price) = patch.price {
            service.price = require_positive("price", price)?;
        }
        if let Some(time_taken) = patch.time_taken {
            service.time_taken = require_positive("time_taken", time_taken)?;
        }

        tx.execute(
            "UPDATE services SET name = ?2, picture = ?3, price = ?4, time_taken = ?5 WHERE id = ?1",
            params![
                service.id,
                service.name,
                service.picture,
                service.price,
                service.time_taken
            ],
        )?;
        tx.commit()?;

        tracing::info!(service_id = %service.id, "service updated");
        Ok(service)
    }

    pub fn delete_service(&self, id: &str) -> AppResult<()> {
        let conn = self.pool.get()?;
        let removed = conn.execute("DELETE FROM services WHERE id = ?1", params![id])?;
        if removed == 0 {
            return Err(AppError::not_found("Service"));
        }

        tracing::info!(service_id = %id, "service deleted");
        Ok(())
    }
}
