// src/db/task_repo.rs

use sqlx::{Executor, Sqlite};

use crate::{common::error::AppError, models::task::EmployeeTask};

// `EmployeesTasks` (live task board) and `manualTasks` (task name catalogue).
#[derive(Clone, Copy, Debug, Default)]
pub struct TaskRepository;

impl TaskRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Manual task catalogue
    // ---

    pub async fn list_manual<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let tasks: Vec<String> = sqlx::query_scalar(
            "SELECT task_names FROM manualTasks WHERE task_names IS NOT NULL ORDER BY rowid",
        )
        .fetch_all(executor)
        .await?;
        Ok(tasks)
    }

    /// Returns false when the name was already in the catalogue.
    pub async fn add_manual<'e, E>(&self, executor: E, task_name: &str) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "INSERT INTO manualTasks (task_names)
             SELECT ? WHERE NOT EXISTS (SELECT 1 FROM manualTasks WHERE task_names = ?)",
        )
        .bind(task_name)
        .bind(task_name)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete_manual<'e, E>(&self, executor: E, task_name: &str) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM manualTasks WHERE task_names = ?")
            .bind(task_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    // ---
    // Live employee tasks
    // ---

    pub async fn list_employee_tasks<'e, E>(&self, executor: E) -> Result<Vec<EmployeeTask>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let tasks = sqlx::query_as::<_, EmployeeTask>(
            "SELECT employeeName, liveTask, status, isobarcode FROM EmployeesTasks ORDER BY rowid",
        )
        .fetch_all(executor)
        .await?;
        Ok(tasks)
    }

    /// Deletes only the first row matching employee and task.
    pub async fn delete_one<'e, E>(
        &self,
        executor: E,
        employee_name: &str,
        live_task: &str,
    ) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            DELETE FROM EmployeesTasks
            WHERE rowid = (
                SELECT rowid FROM EmployeesTasks
                WHERE employeeName = ? AND liveTask = ?
                ORDER BY rowid
                LIMIT 1
            )
            "#,
        )
        .bind(employee_name)
        .bind(live_task)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_all_for<'e, E>(&self, executor: E, employee_name: &str) -> Result<u64, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM EmployeesTasks WHERE employeeName = ?")
            .bind(employee_name)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }

    /// Reassigns the task attached to `isobarcode`, whoever held it.
    /// Returns false when no task carries that barcode.
    pub async fn update_by_barcode<'e, E>(
        &self,
        executor: E,
        isobarcode: &str,
        employee_name: &str,
        live_task: Option<&str>,
        status: Option<&str>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            "UPDATE EmployeesTasks SET employeeName = ?, liveTask = ?, status = ? WHERE isobarcode = ?",
        )
        .bind(employee_name)
        .bind(live_task)
        .bind(status)
        .bind(isobarcode)
        .execute(executor)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        employee_name: &str,
        live_task: Option<&str>,
        status: Option<&str>,
        isobarcode: Option<&str>,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            "INSERT INTO EmployeesTasks (employeeName, liveTask, status, isobarcode) VALUES (?, ?, ?, ?)",
        )
        .bind(employee_name)
        .bind(live_task)
        .bind(status)
        .bind(isobarcode)
        .execute(executor)
        .await?;
        Ok(())
    }
}
