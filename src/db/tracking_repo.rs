// src/db/tracking_repo.rs

use sqlx::{Executor, Sqlite};

use crate::models::tracking::{TrackingFields, TrackingRow};

const ROW_COLUMNS: &str = "rowid AS row_id, containerID, orderNumber, leadBarcode, isoBarcode, \
                           itemNum, prodType, size, history";

// Queries on `tracking_data`. Writers only ever reach this through the queue
// worker's connection; readers come from the reader pool. Errors stay as
// `sqlx::Error` because most callers are queued jobs, not HTTP handlers.
#[derive(Clone, Copy, Debug, Default)]
pub struct TrackingRepository;

impl TrackingRepository {
    pub fn new() -> Self {
        Self
    }

    // ---
    // Lookups used by the resolution engine
    // ---

    pub async fn find_by_iso<'e, E>(
        &self,
        executor: E,
        iso_barcode: &str,
    ) -> Result<Option<TrackingRow>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {ROW_COLUMNS} FROM tracking_data WHERE isoBarcode = ?");
        sqlx::query_as::<_, TrackingRow>(&sql)
            .bind(iso_barcode)
            .fetch_optional(executor)
            .await
    }

    /// Rows of the order that have not been individually scanned yet.
    pub async fn placeholders_for_order<'e, E>(
        &self,
        executor: E,
        order_number: &str,
    ) -> Result<Vec<TrackingRow>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {ROW_COLUMNS} FROM tracking_data
             WHERE orderNumber = ? AND isoBarcode IS NULL ORDER BY rowid"
        );
        sqlx::query_as::<_, TrackingRow>(&sql)
            .bind(order_number)
            .fetch_all(executor)
            .await
    }

    /// Rows of the order that have no item number yet.
    pub async fn order_rows_without_item<'e, E>(
        &self,
        executor: E,
        order_number: &str,
    ) -> Result<Vec<TrackingRow>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {ROW_COLUMNS} FROM tracking_data
             WHERE orderNumber = ? AND itemNum IS NULL ORDER BY rowid"
        );
        sqlx::query_as::<_, TrackingRow>(&sql)
            .bind(order_number)
            .fetch_all(executor)
            .await
    }

    /// Oldest row of the order not yet packed into a container.
    pub async fn first_without_container<'e, E>(
        &self,
        executor: E,
        order_number: &str,
    ) -> Result<Option<TrackingRow>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!(
            "SELECT {ROW_COLUMNS} FROM tracking_data
             WHERE orderNumber = ? AND containerID IS NULL ORDER BY rowid LIMIT 1"
        );
        sqlx::query_as::<_, TrackingRow>(&sql)
            .bind(order_number)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_lead<'e, E>(
        &self,
        executor: E,
        lead_barcode: &str,
    ) -> Result<Vec<TrackingRow>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {ROW_COLUMNS} FROM tracking_data WHERE leadBarcode = ? ORDER BY rowid");
        sqlx::query_as::<_, TrackingRow>(&sql)
            .bind(lead_barcode)
            .fetch_all(executor)
            .await
    }

    pub async fn find_by_order<'e, E>(
        &self,
        executor: E,
        order_number: &str,
    ) -> Result<Vec<TrackingRow>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {ROW_COLUMNS} FROM tracking_data WHERE orderNumber = ? ORDER BY rowid");
        sqlx::query_as::<_, TrackingRow>(&sql)
            .bind(order_number)
            .fetch_all(executor)
            .await
    }

    pub async fn find_by_container<'e, E>(
        &self,
        executor: E,
        container_id: i64,
    ) -> Result<Vec<TrackingRow>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {ROW_COLUMNS} FROM tracking_data WHERE containerID = ? ORDER BY rowid");
        sqlx::query_as::<_, TrackingRow>(&sql)
            .bind(container_id)
            .fetch_all(executor)
            .await
    }

    pub async fn container_of_iso<'e, E>(
        &self,
        executor: E,
        iso_barcode: &str,
    ) -> Result<Option<i64>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let found: Option<Option<i64>> =
            sqlx::query_scalar("SELECT containerID FROM tracking_data WHERE isoBarcode = ?")
                .bind(iso_barcode)
                .fetch_optional(executor)
                .await?;
        Ok(found.flatten())
    }

    pub async fn container_of_lead<'e, E>(
        &self,
        executor: E,
        lead_barcode: &str,
    ) -> Result<Option<i64>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let found: Option<i64> = sqlx::query_scalar(
            "SELECT containerID FROM tracking_data
             WHERE leadBarcode = ? AND containerID IS NOT NULL ORDER BY rowid LIMIT 1",
        )
        .bind(lead_barcode)
        .fetch_optional(executor)
        .await?;
        Ok(found)
    }

    /// Distinct positive container ids in ascending order.
    pub async fn container_ids<'e, E>(&self, executor: E) -> Result<Vec<i64>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar(
            "SELECT DISTINCT containerID FROM tracking_data
             WHERE containerID IS NOT NULL AND containerID > 0 ORDER BY containerID",
        )
        .fetch_all(executor)
        .await
    }

    // ---
    // Maintenance
    // ---

    /// isoBarcodes held by more than one row. Only possible in files created
    /// before the UNIQUE constraint existed.
    pub async fn duplicate_isos<'e, E>(&self, executor: E) -> Result<Vec<String>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query_scalar(
            "SELECT isoBarcode FROM tracking_data
             WHERE isoBarcode IS NOT NULL
             GROUP BY isoBarcode HAVING COUNT(*) > 1 ORDER BY MIN(rowid)",
        )
        .fetch_all(executor)
        .await
    }

    pub async fn find_all_by_iso<'e, E>(
        &self,
        executor: E,
        iso_barcode: &str,
    ) -> Result<Vec<TrackingRow>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {ROW_COLUMNS} FROM tracking_data WHERE isoBarcode = ? ORDER BY rowid");
        sqlx::query_as::<_, TrackingRow>(&sql)
            .bind(iso_barcode)
            .fetch_all(executor)
            .await
    }

    pub async fn list_all<'e, E>(&self, executor: E) -> Result<Vec<TrackingRow>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let sql = format!("SELECT {ROW_COLUMNS} FROM tracking_data ORDER BY rowid");
        sqlx::query_as::<_, TrackingRow>(&sql).fetch_all(executor).await
    }

    // ---
    // Writes
    // ---

    pub async fn insert<'e, E>(&self, executor: E, fields: &TrackingFields) -> Result<i64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            INSERT INTO tracking_data
                (containerID, orderNumber, leadBarcode, isoBarcode, itemNum, prodType, size, history)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(fields.container_id)
        .bind(&fields.order_number)
        .bind(&fields.lead_barcode)
        .bind(&fields.iso_barcode)
        .bind(fields.item_num)
        .bind(&fields.prod_type)
        .bind(&fields.size)
        .bind(&fields.history)
        .execute(executor)
        .await?;
        Ok(result.last_insert_rowid())
    }

    /// Overwrites every column of the row with the already-merged values.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        row_id: i64,
        fields: &TrackingFields,
    ) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query(
            r#"
            UPDATE tracking_data
            SET containerID = ?, orderNumber = ?, leadBarcode = ?, isoBarcode = ?,
                itemNum = ?, prodType = ?, size = ?, history = ?
            WHERE rowid = ?
            "#,
        )
        .bind(fields.container_id)
        .bind(&fields.order_number)
        .bind(&fields.lead_barcode)
        .bind(&fields.iso_barcode)
        .bind(fields.item_num)
        .bind(&fields.prod_type)
        .bind(&fields.size)
        .bind(&fields.history)
        .bind(row_id)
        .execute(executor)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete<'e, E>(&self, executor: E, row_id: i64) -> Result<u64, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let result = sqlx::query("DELETE FROM tracking_data WHERE rowid = ?")
            .bind(row_id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected())
    }
}
