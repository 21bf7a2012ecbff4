// src/services/task_service.rs

use crate::{
    common::error::AppError,
    db::{MainDb, TaskRepository},
    models::task::EmployeeTask,
};

/// One live-task change as the scanner clients describe it.
#[derive(Debug, Default)]
pub struct TaskChange<'a> {
    pub employee_name: &'a str,
    pub live_task: Option<&'a str>,
    pub status: Option<&'a str>,
    pub isobarcode: Option<&'a str>,
    pub erase: bool,
}

#[derive(Clone)]
pub struct TaskService {
    db: MainDb,
    repo: TaskRepository,
}

impl TaskService {
    pub fn new(db: MainDb) -> Self {
        Self {
            db,
            repo: TaskRepository::new(),
        }
    }

    pub async fn manual_tasks(&self) -> Result<Vec<String>, AppError> {
        let mut conn = self.db.lock().await;
        self.repo.list_manual(&mut *conn).await
    }

    /// `add = true` inserts the task unless it exists, `false` deletes it.
    pub async fn edit_manual(&self, task_name: &str, add: bool) -> Result<(), AppError> {
        let mut conn = self.db.lock().await;
        if add {
            if !self.repo.add_manual(&mut *conn, task_name).await? {
                tracing::debug!("Manual task '{}' already exists", task_name);
            }
        } else {
            self.repo.delete_manual(&mut *conn, task_name).await?;
        }
        Ok(())
    }

    pub async fn employee_tasks(&self) -> Result<Vec<EmployeeTask>, AppError> {
        let mut conn = self.db.lock().await;
        self.repo.list_employee_tasks(&mut *conn).await
    }

    /// Applies the change and returns the message reported to the client.
    pub async fn update_employee_task(&self, change: TaskChange<'_>) -> Result<String, AppError> {
        let employee = change.employee_name;
        let mut conn = self.db.lock().await;

        if change.erase {
            return match change.live_task {
                Some(task) => {
                    self.repo.delete_one(&mut *conn, employee, task).await?;
                    Ok(format!("Task deleted for employee '{employee}'"))
                }
                None => {
                    self.repo.delete_all_for(&mut *conn, employee).await?;
                    Ok(format!("All tasks deleted for employee '{employee}'"))
                }
            };
        }

        if let Some(barcode) = change.isobarcode {
            let updated = self
                .repo
                .update_by_barcode(&mut *conn, barcode, employee, change.live_task, change.status)
                .await?;
            if updated {
                return Ok(format!("Task updated for barcode {barcode}"));
            }
        }

        self.repo
            .insert(
                &mut *conn,
                employee,
                change.live_task,
                change.status,
                change.isobarcode,
            )
            .await?;
        Ok(format!("Task created for employee '{employee}'"))
    }
}
