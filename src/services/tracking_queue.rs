// src/services/tracking_queue.rs

use anyhow::Context;
use sqlx::{sqlite::SqliteConnectOptions, Connection, SqliteConnection};
use tokio::{
    sync::{mpsc, oneshot},
    task::JoinHandle,
};

use crate::{
    common::error::AppError,
    db,
    models::tracking::TrackingJob,
    services::tracking_engine::TrackingEngine,
};

#[derive(Debug)]
enum QueueMessage {
    Job(TrackingJob),
    /// Answered once every message queued before it has been committed.
    Flush(oneshot::Sender<()>),
}

/// Handle used by request handlers to hand tracking writes to the worker.
/// Cloning is cheap; the worker exits once every handle is dropped.
#[derive(Clone, Debug)]
pub struct TrackingQueue {
    tx: mpsc::UnboundedSender<QueueMessage>,
}

impl TrackingQueue {
    pub fn enqueue(&self, job: TrackingJob) -> Result<(), AppError> {
        let kind = job.kind();
        self.tx
            .send(QueueMessage::Job(job))
            .map_err(|_| anyhow::anyhow!("tracking worker is not running"))?;
        tracing::debug!("Queued {} job", kind);
        Ok(())
    }

    pub async fn flush(&self) -> Result<(), AppError> {
        let (done_tx, done_rx) = oneshot::channel();
        self.tx
            .send(QueueMessage::Flush(done_tx))
            .map_err(|_| anyhow::anyhow!("tracking worker is not running"))?;
        done_rx
            .await
            .map_err(|_| anyhow::anyhow!("tracking worker stopped before flushing"))?;
        Ok(())
    }
}

/// Starts the single tracking writer. Returns the queue handle and the
/// worker's join handle; await the latter after dropping every queue handle
/// to let the remaining jobs land.
pub fn spawn_worker(
    writer_options: SqliteConnectOptions,
    engine: TrackingEngine,
) -> (TrackingQueue, JoinHandle<()>) {
    let (tx, rx) = mpsc::unbounded_channel();
    let worker = TrackingWorker {
        rx,
        writer_options,
        engine,
    };
    let handle = tokio::spawn(worker.run());
    (TrackingQueue { tx }, handle)
}

struct TrackingWorker {
    rx: mpsc::UnboundedReceiver<QueueMessage>,
    writer_options: SqliteConnectOptions,
    engine: TrackingEngine,
}

impl TrackingWorker {
    async fn run(mut self) {
        tracing::info!("Tracking worker started");

        while let Some(first) = self.rx.recv().await {
            let mut batch = vec![first];
            while let Ok(next) = self.rx.try_recv() {
                batch.push(next);
            }
            self.process(batch).await;
        }

        tracing::info!("Tracking queue closed, worker stopped");
    }

    async fn process(&mut self, batch: Vec<QueueMessage>) {
        let mut jobs = Vec::with_capacity(batch.len());
        let mut waiters = Vec::new();
        for message in batch {
            match message {
                QueueMessage::Job(job) => jobs.push(job),
                QueueMessage::Flush(done) => waiters.push(done),
            }
        }

        if !jobs.is_empty() {
            if let Err(e) = self.write_batch(&jobs).await {
                tracing::error!("Dropped batch of {} tracking job(s): {:#}", jobs.len(), e);
            }
        }

        for done in waiters {
            let _ = done.send(());
        }
    }

    async fn write_batch(&mut self, jobs: &[TrackingJob]) -> anyhow::Result<()> {
        let mut conn = db::open_connection(&self.writer_options)
            .await
            .context("failed to open tracking writer connection")?;
        let result = self.run_jobs(&mut conn, jobs).await;
        db::close_quietly(conn).await;
        result
    }

    async fn run_jobs(&mut self, conn: &mut SqliteConnection, jobs: &[TrackingJob]) -> anyhow::Result<()> {
        let mut tx = conn.begin().await.context("failed to begin tracking batch")?;
        let mut failed = 0usize;

        for job in jobs {
            let mut savepoint = Connection::begin(&mut *tx).await?;
            match self.engine.apply(&mut *savepoint, job).await {
                Ok(outcome) => {
                    savepoint.commit().await?;
                    tracing::debug!(
                        "{} job applied: {} inserted, {} updated",
                        job.kind(),
                        outcome.inserted,
                        outcome.updated
                    );
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!("{} job failed and was skipped: {}", job.kind(), e);
                    savepoint.rollback().await?;
                }
            }
        }

        tx.commit().await.context("failed to commit tracking batch")?;
        tracing::debug!("Committed tracking batch: {} job(s), {} failed", jobs.len(), failed);
        Ok(())
    }
}
