// src/services/employee_service.rs

use chrono::NaiveDateTime;
use sqlx::Connection;

use crate::{
    common::error::AppError,
    db::{EmployeeRepository, MainDb, WorkstationRepository},
    models::employee::{Employee, PulseEmployee},
};

/// The only app gate the clients ask about today.
pub const PULSE_APP: &str = "Pulse";

const SHIFT_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// What an add-or-update request changes for one employee.
#[derive(Debug, Default)]
pub struct EmployeeUpdate<'a> {
    pub password: Option<&'a str>,
    pub hourly_rate: Option<f64>,
    pub workstations: &'a [String],
    pub pulse_access: Option<&'a [String]>,
}

#[derive(Clone)]
pub struct EmployeeService {
    db: MainDb,
    employee_repo: EmployeeRepository,
    workstation_repo: WorkstationRepository,
}

impl EmployeeService {
    pub fn new(db: MainDb) -> Self {
        Self {
            db,
            employee_repo: EmployeeRepository::new(),
            workstation_repo: WorkstationRepository::new(),
        }
    }

    pub async fn list(&self) -> Result<Vec<Employee>, AppError> {
        let mut conn = self.db.lock().await;
        self.employee_repo.list(&mut *conn).await
    }

    pub async fn list_pulse(&self) -> Result<Vec<PulseEmployee>, AppError> {
        let mut conn = self.db.lock().await;
        self.employee_repo.list_with_app_access(&mut conn, PULSE_APP).await
    }

    /// Creates the employee or updates the provided fields, then adds them to
    /// each named workstation that exists. All in one transaction.
    pub async fn add_or_update(
        &self,
        employee_name: &str,
        update: EmployeeUpdate<'_>,
    ) -> Result<(), AppError> {
        let mut conn = self.db.lock().await;
        let mut tx = conn.begin().await?;

        self.employee_repo
            .upsert(&mut *tx, employee_name, update.password, update.hourly_rate)
            .await?;

        for workstation in update.workstations {
            if self
                .workstation_repo
                .find_by_name(&mut *tx, workstation)
                .await?
                .is_none()
            {
                tracing::debug!(
                    "Skipping unknown workstation '{}' for '{}'",
                    workstation,
                    employee_name
                );
                continue;
            }
            self.workstation_repo
                .add_eligible(&mut *tx, workstation, employee_name)
                .await?;
        }

        if let Some(apps) = update.pulse_access {
            self.employee_repo
                .replace_app_access(&mut tx, employee_name, apps)
                .await?;
        }

        tx.commit().await?;
        tracing::info!("Employee '{}' added/updated", employee_name);
        Ok(())
    }

    pub async fn set_logged_in(&self, employee_name: &str, logged_in: bool) -> Result<(), AppError> {
        let mut conn = self.db.lock().await;
        let found = self
            .employee_repo
            .set_logged_in(&mut *conn, employee_name, logged_in)
            .await?;
        if !found {
            return Err(AppError::EmployeeNotFound(employee_name.to_string()));
        }
        tracing::info!("Employee '{}' loggedIn={}", employee_name, logged_in);
        Ok(())
    }

    pub async fn login_state(&self, employee_name: &str) -> Result<bool, AppError> {
        let mut conn = self.db.lock().await;
        self.employee_repo
            .logged_in(&mut *conn, employee_name)
            .await?
            .ok_or_else(|| AppError::EmployeeNotFound(employee_name.to_string()))
    }

    pub async fn start_time(&self, employee_name: &str) -> Result<Option<String>, AppError> {
        let mut conn = self.db.lock().await;
        let start = self
            .employee_repo
            .start_time(&mut *conn, employee_name)
            .await?
            .ok_or_else(|| AppError::EmployeeNotFound(employee_name.to_string()))?;
        Ok(start.filter(|s| !s.is_empty()))
    }

    pub async fn log_time(
        &self,
        employee_name: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<(), AppError> {
        parse_shift_time(start_time)?;
        parse_shift_time(end_time)?;

        let mut conn = self.db.lock().await;
        let found = self
            .employee_repo
            .log_time(&mut *conn, employee_name, start_time, end_time)
            .await?;
        if !found {
            return Err(AppError::EmployeeNotFound(employee_name.to_string()));
        }
        Ok(())
    }

    /// Removes the employee together with their eligibility and app access.
    /// Removing an unknown name succeeds.
    pub async fn remove(&self, employee_name: &str) -> Result<(), AppError> {
        let mut conn = self.db.lock().await;
        let mut tx = conn.begin().await?;

        let deleted = self.employee_repo.delete(&mut *tx, employee_name).await?;
        let stations = self
            .workstation_repo
            .remove_employee_everywhere(&mut *tx, employee_name)
            .await?;
        self.employee_repo
            .delete_app_access(&mut *tx, employee_name)
            .await?;

        tx.commit().await?;
        tracing::info!(
            "Removed employee '{}' ({} row(s), {} workstation slot(s))",
            employee_name,
            deleted,
            stations
        );
        Ok(())
    }
}

pub fn parse_shift_time(value: &str) -> Result<NaiveDateTime, AppError> {
    NaiveDateTime::parse_from_str(value, SHIFT_TIME_FORMAT).map_err(|_| {
        AppError::BadRequest(
            "start_time and end_time must be in 'YYYY-MM-DD HH:MM:SS' format".to_string(),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shift_times_use_seconds_precision() {
        assert!(parse_shift_time("2025-03-14 08:00:00").is_ok());
        assert!(parse_shift_time("2025-03-14T08:00:00").is_err());
        assert!(parse_shift_time("2025-03-14 08:00").is_err());
        assert!(parse_shift_time("yesterday").is_err());
    }
}
