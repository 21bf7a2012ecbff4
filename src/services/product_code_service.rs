// src/services/product_code_service.rs

use crate::{
    common::error::AppError,
    db::{MainDb, ProductCodeRepository},
};

#[derive(Clone)]
pub struct ProductCodeService {
    db: MainDb,
    repo: ProductCodeRepository,
}

impl ProductCodeService {
    pub fn new(db: MainDb) -> Self {
        Self {
            db,
            repo: ProductCodeRepository::new(),
        }
    }

    pub async fn prod_types(&self) -> Result<Vec<String>, AppError> {
        let mut conn = self.db.lock().await;
        self.repo.list_prod_types(&mut *conn).await
    }

    pub async fn map(&self, prod_type: &str, worksheet_ref: &str) -> Result<(), AppError> {
        let mut conn = self.db.lock().await;
        self.repo.upsert(&mut *conn, prod_type, worksheet_ref).await?;
        tracing::info!("prodType '{}' now maps to '{}'", prod_type, worksheet_ref);
        Ok(())
    }
}
