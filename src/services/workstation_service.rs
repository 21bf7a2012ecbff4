// src/services/workstation_service.rs

use crate::{
    common::error::AppError,
    db::{MainDb, WorkstationRepository},
    models::workstation::WorkstationRoster,
};

#[derive(Clone)]
pub struct WorkstationService {
    db: MainDb,
    repo: WorkstationRepository,
}

impl WorkstationService {
    pub fn new(db: MainDb) -> Self {
        Self {
            db,
            repo: WorkstationRepository::new(),
        }
    }

    pub async fn rosters(&self) -> Result<Vec<WorkstationRoster>, AppError> {
        let mut conn = self.db.lock().await;
        self.repo.list_rosters(&mut conn).await
    }

    pub async fn add_or_update(
        &self,
        workstation: &str,
        available_stations: Option<i64>,
    ) -> Result<(), AppError> {
        let mut conn = self.db.lock().await;
        self.repo
            .upsert(&mut *conn, workstation, available_stations)
            .await?;
        tracing::info!("Workstation '{}' added/updated", workstation);
        Ok(())
    }

    /// Takes the employee off the workstation's eligible list. Returns false
    /// when they were not on it.
    pub async fn remove_employee(
        &self,
        workstation: &str,
        employee_name: &str,
    ) -> Result<bool, AppError> {
        let mut conn = self.db.lock().await;
        if self.repo.find_by_name(&mut *conn, workstation).await?.is_none() {
            return Err(AppError::WorkstationNotFound(workstation.to_string()));
        }
        let removed = self
            .repo
            .remove_eligible(&mut *conn, workstation, employee_name)
            .await?;
        if removed {
            tracing::info!("Employee '{}' removed from '{}'", employee_name, workstation);
        }
        Ok(removed)
    }
}
