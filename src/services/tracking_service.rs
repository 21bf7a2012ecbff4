// src/services/tracking_service.rs

use std::collections::HashSet;

use sqlx::SqlitePool;

use crate::{
    common::error::AppError,
    db::TrackingRepository,
    models::tracking::{HistoryRecord, TrackingJob, TrackingRow},
    services::{history, tracking_queue::TrackingQueue},
};

/// Read side of the tracking database plus the handle to its single writer.
#[derive(Clone)]
pub struct TrackingService {
    reader: SqlitePool,
    queue: TrackingQueue,
    repo: TrackingRepository,
}

impl TrackingService {
    pub fn new(reader: SqlitePool, queue: TrackingQueue) -> Self {
        Self {
            reader,
            queue,
            repo: TrackingRepository::new(),
        }
    }

    pub fn submit(&self, job: TrackingJob) -> Result<(), AppError> {
        self.queue.enqueue(job)
    }

    /// Waits until everything submitted so far is committed.
    pub async fn flush(&self) -> Result<(), AppError> {
        self.queue.flush().await
    }

    pub async fn next_container_id(&self) -> Result<i64, AppError> {
        let used = self.repo.container_ids(&self.reader).await?;
        Ok(first_free_container_id(&used))
    }

    /// History of every row reached through any of the keys, ISO first, then
    /// lead, then order. A row reached twice is listed once; rows without
    /// history are skipped.
    pub async fn history(
        &self,
        order_number: Option<&str>,
        lead_barcode: Option<&str>,
        iso_barcode: Option<&str>,
    ) -> Result<Vec<HistoryRecord>, AppError> {
        let mut rows: Vec<TrackingRow> = Vec::new();
        if let Some(iso) = iso_barcode {
            rows.extend(self.repo.find_by_iso(&self.reader, iso).await?);
        }
        if let Some(lead) = lead_barcode {
            rows.extend(self.repo.find_by_lead(&self.reader, lead).await?);
        }
        if let Some(order) = order_number {
            rows.extend(self.repo.find_by_order(&self.reader, order).await?);
        }

        let mut seen = HashSet::new();
        let records = rows
            .into_iter()
            .filter(|row| seen.insert(row.row_id))
            .filter_map(|row| {
                let lines = history::lines(row.fields.history.as_deref());
                (!lines.is_empty()).then(|| HistoryRecord {
                    container_id: row.fields.container_id,
                    iso_barcode: row.fields.iso_barcode,
                    lines,
                })
            })
            .collect();
        Ok(records)
    }
}

/// Smallest positive id missing from `used` (ascending, distinct).
pub fn first_free_container_id(used: &[i64]) -> i64 {
    let mut next = 1;
    for &id in used {
        if id == next {
            next += 1;
        } else if id > next {
            break;
        }
    }
    next
}
