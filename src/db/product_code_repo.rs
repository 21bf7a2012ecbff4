// src/db/product_code_repo.rs

use sqlx::{Executor, Sqlite};

use crate::common::error::AppError;

#[derive(Clone, Copy, Debug, Default)]
pub struct ProductCodeRepository;

impl ProductCodeRepository {
    pub fn new() -> Self {
        Self
    }

    pub async fn list_prod_types<'e, E>(&self, executor: E) -> Result<Vec<String>, AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let codes: Vec<String> =
            sqlx::query_scalar("SELECT prod_type FROM product_codes WHERE prod_type IS NOT NULL ORDER BY prod_type")
                .fetch_all(executor)
                .await?;
        Ok(codes)
    }

    /// Canonical worksheet reference for a raw product type, if one is mapped.
    pub async fn worksheet_ref<'e, E>(
        &self,
        executor: E,
        prod_type: &str,
    ) -> Result<Option<String>, sqlx::Error>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        let found: Option<Option<String>> = sqlx::query_scalar(
            "SELECT worksheetRef FROM product_codes WHERE prod_type = ? LIMIT 1",
        )
        .bind(prod_type)
        .fetch_optional(executor)
        .await?;
        Ok(found.flatten())
    }

    pub async fn upsert<'e, E>(
        &self,
        executor: E,
        prod_type: &str,
        worksheet_ref: &str,
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Sqlite>,
    {
        sqlx::query(
            r#"
            INSERT INTO product_codes (prod_type, worksheetRef)
            VALUES (?, ?)
            ON CONFLICT (prod_type) DO UPDATE SET worksheetRef = excluded.worksheetRef
            "#,
        )
        .bind(prod_type)
        .bind(worksheet_ref)
        .execute(executor)
        .await?;
        Ok(())
    }
}
