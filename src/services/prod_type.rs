// src/services/prod_type.rs

use std::{collections::HashSet, io::ErrorKind, path::PathBuf};

use sqlx::SqlitePool;
use tokio::{fs, io::AsyncWriteExt};

use crate::db::ProductCodeRepository;

/// Side file listing raw product types that had no `product_codes` mapping,
/// one per line, each written once.
#[derive(Debug)]
pub struct MissingProdTypeLog {
    path: PathBuf,
    seen: Option<HashSet<String>>,
}

impl MissingProdTypeLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            seen: None,
        }
    }

    async fn load(&self) -> std::io::Result<HashSet<String>> {
        match fs::read_to_string(&self.path).await {
            Ok(content) => Ok(content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string)
                .collect()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(HashSet::new()),
            Err(e) => Err(e),
        }
    }

    /// Returns true when the value was new and got written.
    pub async fn record(&mut self, prod_type: &str) -> std::io::Result<bool> {
        let prod_type = prod_type.trim();
        if prod_type.is_empty() {
            return Ok(false);
        }

        if self.seen.is_none() {
            self.seen = Some(self.load().await?);
        }
        let seen = self.seen.get_or_insert_with(HashSet::new);
        if seen.contains(prod_type) {
            return Ok(false);
        }

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(format!("{prod_type}\n").as_bytes()).await?;
        file.flush().await?;

        seen.insert(prod_type.to_string());
        Ok(true)
    }
}

/// Maps free-text product types to their worksheet reference. Unknown types
/// are logged to the side file and dropped so rows never carry an
/// unrecognized label.
#[derive(Debug)]
pub struct ProdTypeNormalizer {
    main_reader: SqlitePool,
    repo: ProductCodeRepository,
    missing: MissingProdTypeLog,
}

impl ProdTypeNormalizer {
    pub fn new(main_reader: SqlitePool, missing: MissingProdTypeLog) -> Self {
        Self {
            main_reader,
            repo: ProductCodeRepository::new(),
            missing,
        }
    }

    /// Worksheet reference for `raw`, without recording unknown types.
    pub async fn lookup(&self, raw: Option<&str>) -> Option<String> {
        let raw = raw?;
        self.repo
            .worksheet_ref(&self.main_reader, raw)
            .await
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to look up prodType '{}': {}", raw, e);
                None
            })
    }

    pub async fn normalize(&mut self, raw: Option<&str>) -> Option<String> {
        let raw = raw?;

        match self.repo.worksheet_ref(&self.main_reader, raw).await {
            Ok(Some(canonical)) => {
                tracing::debug!("Normalized prodType '{}' -> '{}'", raw, canonical);
                Some(canonical)
            }
            Ok(None) => {
                match self.missing.record(raw).await {
                    Ok(true) => tracing::info!("Logged missing prodType '{}'", raw),
                    Ok(false) => {}
                    Err(e) => tracing::warn!("Failed to log missing prodType '{}': {}", raw, e),
                }
                tracing::debug!("prodType '{}' not in product_codes, dropping it", raw);
                None
            }
            Err(e) => {
                tracing::warn!("Failed to normalize prodType '{}': {}", raw, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_types_are_written_once() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing_prodTypes.txt");
        tokio::fs::write(&path, "banner\n").await.unwrap();

        let mut log = MissingProdTypeLog::new(&path);
        assert!(!log.record("banner").await.unwrap());
        assert!(log.record("poster").await.unwrap());
        assert!(!log.record("poster").await.unwrap());
        assert!(!log.record("  ").await.unwrap());

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(content, "banner\nposter\n");
    }
}
