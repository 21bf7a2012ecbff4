// src/services/maintenance.rs

// Offline passes over the tracking file. Both run inside BEGIN EXCLUSIVE so
// the live server's worker waits (busy timeout) instead of interleaving.

use chrono::{NaiveDateTime, TimeDelta};
use sqlx::SqliteConnection;

use crate::{
    db::TrackingRepository,
    models::tracking::{TrackingFields, TrackingRow},
    services::history,
};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PurgeReport {
    pub scanned: usize,
    pub stale: usize,
    pub deleted: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DedupeReport {
    pub duplicate_isos: usize,
    pub rows_removed: usize,
}

async fn begin_exclusive(conn: &mut SqliteConnection) -> Result<(), sqlx::Error> {
    sqlx::query("BEGIN EXCLUSIVE").execute(&mut *conn).await?;
    Ok(())
}

/// Commits (or rolls back when `commit` is false) after a successful pass;
/// always rolls back after a failed one.
async fn finish<T>(
    conn: &mut SqliteConnection,
    result: Result<T, sqlx::Error>,
    commit: bool,
) -> Result<T, sqlx::Error> {
    match result {
        Ok(value) => {
            let statement = if commit { "COMMIT" } else { "ROLLBACK" };
            sqlx::query(statement).execute(&mut *conn).await?;
            Ok(value)
        }
        Err(e) => {
            if let Err(rollback) = sqlx::query("ROLLBACK").execute(&mut *conn).await {
                tracing::warn!("Rollback after failed pass also failed: {}", rollback);
            }
            Err(e)
        }
    }
}

/// `now` minus `days`; `None` when the result falls outside chrono's range.
pub fn purge_cutoff(now: NaiveDateTime, days: i64) -> Option<NaiveDateTime> {
    now.checked_sub_signed(TimeDelta::try_days(days)?)
}

/// Deletes rows whose most recent history stamp is older than `cutoff`.
/// Rows without a readable stamp are kept.
pub async fn purge_stale(
    conn: &mut SqliteConnection,
    cutoff: NaiveDateTime,
    dry_run: bool,
) -> Result<PurgeReport, sqlx::Error> {
    begin_exclusive(conn).await?;
    let result = purge_rows(conn, cutoff, dry_run).await;
    finish(conn, result, !dry_run).await
}

async fn purge_rows(
    conn: &mut SqliteConnection,
    cutoff: NaiveDateTime,
    dry_run: bool,
) -> Result<PurgeReport, sqlx::Error> {
    let repo = TrackingRepository::new();
    let rows = repo.list_all(&mut *conn).await?;
    let mut report = PurgeReport {
        scanned: rows.len(),
        ..Default::default()
    };

    for row in rows {
        let Some(last) = history::last_activity(row.fields.history.as_deref()) else {
            continue;
        };
        if last >= cutoff {
            continue;
        }
        report.stale += 1;
        if dry_run {
            tracing::info!(
                "Would delete row {} (isoBarcode={:?}, last activity {})",
                row.row_id,
                row.fields.iso_barcode,
                last
            );
        } else {
            report.deleted += repo.delete(&mut *conn, row.row_id).await? as usize;
        }
    }
    Ok(report)
}

/// Folds rows sharing one isoBarcode into the oldest of them: each column
/// takes the first non-null value in rowid order and the histories are
/// merged chronologically.
pub fn merge_rows(rows: &[TrackingRow]) -> TrackingFields {
    fn first<T: Clone>(rows: &[TrackingRow], get: impl Fn(&TrackingFields) -> &Option<T>) -> Option<T> {
        rows.iter().find_map(|r| get(&r.fields).clone())
    }

    let history = rows.iter().fold(None, |acc: Option<String>, r| {
        history::merge(acc.as_deref(), r.fields.history.as_deref())
    });

    TrackingFields {
        container_id: first(rows, |f| &f.container_id),
        order_number: first(rows, |f| &f.order_number),
        lead_barcode: first(rows, |f| &f.lead_barcode),
        iso_barcode: first(rows, |f| &f.iso_barcode),
        item_num: first(rows, |f| &f.item_num),
        prod_type: first(rows, |f| &f.prod_type),
        size: first(rows, |f| &f.size),
        history,
    }
}

pub async fn merge_duplicate_isos(conn: &mut SqliteConnection) -> Result<DedupeReport, sqlx::Error> {
    begin_exclusive(conn).await?;
    let result = merge_duplicates(conn).await;
    finish(conn, result, true).await
}

async fn merge_duplicates(conn: &mut SqliteConnection) -> Result<DedupeReport, sqlx::Error> {
    let repo = TrackingRepository::new();
    let mut report = DedupeReport::default();

    for iso in repo.duplicate_isos(&mut *conn).await? {
        let rows = repo.find_all_by_iso(&mut *conn, &iso).await?;
        let Some((keeper, extras)) = rows.split_first() else {
            continue;
        };

        let merged = merge_rows(&rows);
        repo.update(&mut *conn, keeper.row_id, &merged).await?;
        for extra in extras {
            report.rows_removed += repo.delete(&mut *conn, extra.row_id).await? as usize;
        }
        report.duplicate_isos += 1;
        tracing::info!(
            "Merged {} duplicate row(s) of isoBarcode {} into row {}",
            extras.len(),
            iso,
            keeper.row_id
        );
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use sqlx::Connection;

    use crate::db::schema;

    fn day(d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn purge_cutoff_subtracts_days_and_rejects_overflow() {
        assert_eq!(purge_cutoff(day(10), 3), Some(day(7)));
        assert_eq!(purge_cutoff(day(10), 0), Some(day(10)));
        assert_eq!(purge_cutoff(day(10), i64::MAX), None);
        assert_eq!(purge_cutoff(day(10), 1_000_000_000), None);
    }

    // A tracking table from before isoBarcode was UNIQUE.
    async fn legacy_conn() -> SqliteConnection {
        let mut conn = SqliteConnection::connect("sqlite::memory:").await.unwrap();
        sqlx::query(
            "CREATE TABLE tracking_data (containerID INTEGER, orderNumber TEXT, leadBarcode TEXT,
             isoBarcode TEXT, history TEXT)",
        )
        .execute(&mut conn)
        .await
        .unwrap();
        schema::init_tracking_db(&mut conn).await.unwrap();
        conn
    }

    async fn insert(conn: &mut SqliteConnection, fields: TrackingFields) {
        TrackingRepository::new().insert(conn, &fields).await.unwrap();
    }

    #[tokio::test]
    async fn purge_deletes_only_stale_rows() {
        let mut conn = legacy_conn().await;
        insert(
            &mut conn,
            TrackingFields {
                iso_barcode: Some("o0000000001".into()),
                history: Some("2025-03-01T09:00:00 | Scan1 | Alice".into()),
                ..Default::default()
            },
        )
        .await;
        insert(
            &mut conn,
            TrackingFields {
                iso_barcode: Some("o0000000002".into()),
                history: Some("2025-03-01T09:00:00 | Scan1 | Alice\n2025-03-13T09:00:00 | Pack | Bob".into()),
                ..Default::default()
            },
        )
        .await;
        insert(
            &mut conn,
            TrackingFields {
                iso_barcode: Some("o0000000003".into()),
                history: Some("not a stamp".into()),
                ..Default::default()
            },
        )
        .await;

        let dry = purge_stale(&mut conn, day(11), true).await.unwrap();
        assert_eq!(dry, PurgeReport { scanned: 3, stale: 1, deleted: 0 });

        let report = purge_stale(&mut conn, day(11), false).await.unwrap();
        assert_eq!(report.deleted, 1);

        let left: Vec<String> = TrackingRepository::new()
            .list_all(&mut conn)
            .await
            .unwrap()
            .into_iter()
            .filter_map(|r| r.fields.iso_barcode)
            .collect();
        assert_eq!(left, vec!["o0000000002".to_string(), "o0000000003".to_string()]);
    }

    #[tokio::test]
    async fn duplicates_collapse_into_the_oldest_row() {
        let mut conn = legacy_conn().await;
        insert(
            &mut conn,
            TrackingFields {
                iso_barcode: Some("o1234567890".into()),
                order_number: Some("12345678".into()),
                history: Some("2025-03-14T09:00:00 | Scan1 | Alice".into()),
                ..Default::default()
            },
        )
        .await;
        insert(
            &mut conn,
            TrackingFields {
                iso_barcode: Some("o1234567890".into()),
                container_id: Some(4),
                lead_barcode: Some("B123456789".into()),
                history: Some("2025-03-14T09:30:00 | Pack | Bob".into()),
                ..Default::default()
            },
        )
        .await;

        let report = merge_duplicate_isos(&mut conn).await.unwrap();
        assert_eq!(report, DedupeReport { duplicate_isos: 1, rows_removed: 1 });

        let rows = TrackingRepository::new().list_all(&mut conn).await.unwrap();
        assert_eq!(rows.len(), 1);
        let fields = &rows[0].fields;
        assert_eq!(fields.order_number.as_deref(), Some("12345678"));
        assert_eq!(fields.container_id, Some(4));
        assert_eq!(fields.lead_barcode.as_deref(), Some("B123456789"));
        assert_eq!(
            fields.history.as_deref(),
            Some("2025-03-14T09:00:00 | Scan1 | Alice\n2025-03-14T09:30:00 | Pack | Bob")
        );

        let again = merge_duplicate_isos(&mut conn).await.unwrap();
        assert_eq!(again, DedupeReport::default());
    }
}
