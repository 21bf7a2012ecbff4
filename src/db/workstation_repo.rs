// src/db/workstation_repo.rs

use sqlx::{Executor, Sqlite, SqliteConnection};

use crate::{
    common::error::AppError,
    models::workstation::{FacilityWorkstation, WorkstationRoster},
};

#[derive(Clone, Copy, Debug, Default)]
pub struct WorkstationRepository;

impl WorkstationRepository {
    pub fn new() -> Self {
        Self
    }

    /// Every workstation with its eligible names, in insertion order.
    pub async fn list_rosters(
        &self,
        conn: &mut SqliteConnection,
    ) -> Result<Vec<WorkstationRoster>, AppError> {
        let workstations = sqlx::query_as::<_, FacilityWorkstation>(
            "SELECT id, workstation, availableStations FROM facility_workstations
             WHERE workstation IS NOT NULL ORDER BY id",
        )
        .fetch_all(&mut *conn)
        .await?;

        let eligibility: Vec<(String, String)> = sqlx::query_as(
            "SELECT workstation, employeeName FROM workstation_eligibility
             ORDER BY workstation, position",
        )
        .fetch_all(&mut *conn)
        .await?;

        let rosters = workstations
            .into_iter()
            .map(|workstation| {
                let eligible = eligibility
                    .iter()
                    .filter(|(ws, _)| *ws == workstation.workstation)
                    .map(|(_, name)| name.clone())
                    .collect();
                WorkstationRoster {
                    workstation,
                    eligible,
                }
            })
            .collect();
        Ok(rosters)
    }

    pub async fn find_by_name<'e, E>(
        &self,
        executor: E,
        workstation: &str,
    ) -> Result<Option<FacilityWorkstation>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let found = sqlx::query_as::<_, FacilityWorkstation>(
            "SELECT id, workstation, availableStations FROM facility_workstations WHERE workstation = ?",
        )
        .bind(workstation)
        .fetch_optional(executor)
        .await?;
        Ok(found)
    }

    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        workstation: &str,
        available_stations: Option<i64>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO facility_workstations (workstation, availableStations)
            VALUES (?, ?)
            ON CONFLICT (workstation)
            DO UPDATE SET availableStations = COALESCE(excluded.availableStations, availableStations)
            "#,
        )
        .bind(workstation)
        .bind(available_stations)
        .execute(executor)
        .await?;
        Ok(())
    }

    /// Appends the employee to the end of the list. Returns false if already there.
    pub async fn add_eligible<'e, E>(
        &self,
        executor: E,
        workstation: &str,
        employee_name: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT OR IGNORE INTO workstation_eligibility (workstation, employeeName, position)
            SELECT ?, ?, COALESCE(MAX(position) + 1, 0)
            FROM workstation_eligibility
            WHERE workstation = ?
            "#,
        )
        .bind(workstation)
        .bind(employee_name)
        .bind(workstation)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_eligible<'e, E>(
        &self,
        executor: E,
        workstation: &str,
        employee_name: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "DELETE FROM workstation_eligibility WHERE workstation = ? AND employeeName = ?",
        )
        .bind(workstation)
        .bind(employee_name)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn remove_employee_everywhere<'e, E>(
        &self,
        executor: E,
        employee_name: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM workstation_eligibility WHERE employeeName = ?")
            .bind(employee_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
