// src/db/employee_repo.rs

use sqlx::{Executor, Sqlite, SqliteConnection};

use crate::{
    common::error::AppError,
    models::employee::{Employee, PulseEmployee},
};

// Everything keyed by `employeeName`; the numeric id is informational.
#[derive(Clone, Copy, Debug, Default)]
pub struct EmployeeRepository;

impl EmployeeRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list<'e, E>(&self, executor: E) -> Result<Vec<Employee>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let employees = sqlx::query_as::<_, Employee>(
            "SELECT id, employeeName, password, hourlyRate FROM employee_info
             WHERE employeeName IS NOT NULL ORDER BY id",
        )
        .fetch_all(executor)
        .await?;
        Ok(employees)
    }

    /// Inserts the employee or updates the fields that were provided.
    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        employee_name: &str,
        password: Option<&str>,
        hourly_rate: Option<f64>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO employee_info (employeeName, password, hourlyRate)
            VALUES (?, ?, ?)
            ON CONFLICT (employeeName)
            DO UPDATE SET
                password = COALESCE(excluded.password, password),
                hourlyRate = COALESCE(excluded.hourlyRate, hourlyRate)
            "#,
        )
        .bind(employee_name)
        .bind(password)
        .bind(hourly_rate)
        .execute(executor)
        .await?;
        Ok(())
    }

    pub async fn set_logged_in<'e, E>(
        &self,
        executor: E,
        employee_name: &str,
        logged_in: bool,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("UPDATE employee_info SET loggedIn = ? WHERE employeeName = ?")
            .bind(logged_in)
            .bind(employee_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// `None` when the employee is unknown.
    pub async fn logged_in<'e, E>(
        &self,
        executor: E,
        employee_name: &str,
    ) -> Result<Option<bool>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let state: Option<Option<bool>> =
            sqlx::query_scalar("SELECT loggedIn FROM employee_info WHERE employeeName = ?")
                .bind(employee_name)
                .fetch_optional(executor)
                .await?;
        Ok(state.map(|s| s.unwrap_or(false)))
    }

    /// Outer `None` when the employee is unknown, inner `None` when no shift was logged.
    pub async fn start_time<'e, E>(
        &self,
        executor: E,
        employee_name: &str,
    ) -> Result<Option<Option<String>>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let start: Option<Option<String>> = sqlx::query_scalar(
            "SELECT CAST(start_time AS TEXT) FROM employee_info WHERE employeeName = ?",
        )
        .bind(employee_name)
        .fetch_optional(executor)
        .await?;
        Ok(start)
    }

    pub async fn log_time<'e, E>(
        &self,
        executor: E,
        employee_name: &str,
        start_time: &str,
        end_time: &str,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE employee_info SET start_time = ?, end_time = ? WHERE employeeName = ?",
        )
        .bind(start_time)
        .bind(end_time)
        .bind(employee_name)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete<'e, E>(&self, executor: E, employee_name: &str) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM employee_info WHERE employeeName = ?")
            .bind(employee_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // App access (employee_app_access)
    // ---

    pub async fn replace_app_access(
        &self,
        conn: &mut SqliteConnection,
        employee_name: &str,
        apps: &[String],
    ) -> Result<(), AppError> {
        self.delete_app_access(&mut *conn, employee_name).await?;
        for app in apps {
            sqlx::query("INSERT OR IGNORE INTO employee_app_access (employeeName, app) VALUES (?, ?)")
                .bind(employee_name)
                .bind(app)
                .execute(&mut *conn)
                .await?;
        }
        Ok(())
    }

    pub async fn delete_app_access<'e, E>(
        &self,
        executor: E,
        employee_name: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM employee_app_access WHERE employeeName = ?")
            .bind(employee_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Employees granted `app`, each with their full access list.
    pub async fn list_with_app_access(
        &self,
        conn: &mut SqliteConnection,
        app: &str,
    ) -> Result<Vec<PulseEmployee>, AppError> {
        let rows: Vec<(i64, String, Option<String>)> = sqlx::query_as(
            r#"
            SELECT e.id, e.employeeName, e.password
            FROM employee_info e
            WHERE EXISTS (
                SELECT 1 FROM employee_app_access a
                WHERE a.employeeName = e.employeeName AND a.app = ?
            )
            ORDER BY e.id
            "#,
        )
        .bind(app)
        .fetch_all(&mut *conn)
        .await?;

        let mut employees = Vec::with_capacity(rows.len());
        for (id, employee_name, password) in rows {
            let pulse_access: Vec<String> = sqlx::query_scalar(
                "SELECT app FROM employee_app_access WHERE employeeName = ? ORDER BY app",
            )
            .bind(&employee_name)
            .fetch_all(&mut *conn)
            .await?;

            employees.push(PulseEmployee {
                id,
                employee_name,
                password,
                pulse_access,
            });
        }
        Ok(employees)
    }
}
