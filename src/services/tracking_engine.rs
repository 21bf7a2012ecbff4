// src/services/tracking_engine.rs

// Resolves a tracking job to row mutations. Each branch loads the rows it
// needs, hands them to a pure planner and applies what comes back; branches
// run in order on the same connection so later ones see earlier writes.

use chrono::{Local, NaiveDateTime};
use sqlx::SqliteConnection;

use crate::{
    db::TrackingRepository,
    models::tracking::{ContainerMove, TrackingEvent, TrackingFields, TrackingJob, TrackingRow},
    services::{
        history::{self, HistoryStamp},
        prod_type::ProdTypeNormalizer,
    },
};

#[derive(Debug, Clone, PartialEq)]
pub enum RowMutation {
    Insert(TrackingFields),
    Update { row_id: i64, fields: TrackingFields },
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct JobOutcome {
    pub inserted: usize,
    pub updated: usize,
}

impl JobOutcome {
    pub fn is_noop(&self) -> bool {
        self.inserted == 0 && self.updated == 0
    }
}

// ---
// Planners
// ---

fn pick<T: Clone>(incoming: Option<&T>, existing: &Option<T>) -> Option<T> {
    incoming.cloned().or_else(|| existing.clone())
}

/// New-if-provided-else-keep-existing for every column the event carries.
fn merge_event(
    base: &TrackingFields,
    event: &TrackingEvent,
    prod_type: Option<&str>,
    stamp: &HistoryStamp,
) -> TrackingFields {
    TrackingFields {
        container_id: event.container_id.or(base.container_id),
        order_number: pick(event.order_number.as_ref(), &base.order_number),
        lead_barcode: pick(event.lead_barcode.as_ref(), &base.lead_barcode),
        iso_barcode: base.iso_barcode.clone(),
        item_num: event.item_num.or(base.item_num),
        prod_type: prod_type.map(str::to_string).or_else(|| base.prod_type.clone()),
        size: pick(event.size.as_ref(), &base.size),
        history: Some(history::append(base.history.as_deref(), stamp)),
    }
}

/// Placeholder whose prodType equals `prod_type`, else one with no prodType.
pub fn pick_placeholder<'a>(
    candidates: &'a [TrackingRow],
    prod_type: Option<&str>,
) -> Option<&'a TrackingRow> {
    candidates
        .iter()
        .find(|r| r.fields.prod_type.as_deref() == prod_type)
        .or_else(|| candidates.iter().find(|r| r.fields.prod_type.is_none()))
}

/// `prod_type` is the value stored on the row; `placeholder_type` is the
/// worksheet reference used to choose among the order's placeholders.
pub fn plan_iso(
    event: &TrackingEvent,
    iso_barcode: &str,
    prod_type: Option<&str>,
    placeholder_type: Option<&str>,
    existing: Option<&TrackingRow>,
    placeholders: &[TrackingRow],
    stamp: &HistoryStamp,
) -> RowMutation {
    if let Some(row) = existing {
        return RowMutation::Update {
            row_id: row.row_id,
            fields: merge_event(&row.fields, event, prod_type, stamp),
        };
    }

    if let Some(row) = pick_placeholder(placeholders, placeholder_type) {
        let mut fields = merge_event(&row.fields, event, prod_type, stamp);
        fields.iso_barcode = Some(iso_barcode.to_string());
        return RowMutation::Update {
            row_id: row.row_id,
            fields,
        };
    }

    let mut fields = merge_event(&TrackingFields::default(), event, prod_type, stamp);
    fields.iso_barcode = Some(iso_barcode.to_string());
    RowMutation::Insert(fields)
}

/// Every row of the lead gets the container/order and the stamp.
pub fn plan_lead(rows: &[TrackingRow], event: &TrackingEvent, stamp: &HistoryStamp) -> Vec<RowMutation> {
    rows.iter()
        .map(|row| {
            let mut fields = row.fields.clone();
            fields.container_id = event.container_id.or(fields.container_id);
            fields.order_number = pick(event.order_number.as_ref(), &fields.order_number);
            fields.history = Some(history::append(fields.history.as_deref(), stamp));
            RowMutation::Update {
                row_id: row.row_id,
                fields,
            }
        })
        .collect()
}

pub fn plan_order_only(
    candidates: &[TrackingRow],
    event: &TrackingEvent,
    order_number: &str,
    prod_type: Option<&str>,
    stamp: &HistoryStamp,
) -> RowMutation {
    if let Some(row) = pick_placeholder(candidates, prod_type) {
        let mut fields = row.fields.clone();
        fields.container_id = event.container_id.or(fields.container_id);
        fields.item_num = event.item_num.or(fields.item_num);
        if let Some(p) = prod_type {
            fields.prod_type = Some(p.to_string());
        }
        fields.history = Some(history::append(fields.history.as_deref(), stamp));
        return RowMutation::Update {
            row_id: row.row_id,
            fields,
        };
    }

    RowMutation::Insert(TrackingFields {
        container_id: event.container_id,
        order_number: Some(order_number.to_string()),
        item_num: event.item_num,
        prod_type: prod_type.map(str::to_string),
        size: event.size.clone(),
        history: Some(stamp.as_str().to_string()),
        ..Default::default()
    })
}

/// Print station packed an item of `order_number` into `container_id`.
pub fn plan_print_attach(
    unpacked: Option<&TrackingRow>,
    event: &TrackingEvent,
    container_id: i64,
    order_number: &str,
    stamp: &HistoryStamp,
) -> RowMutation {
    match unpacked {
        Some(row) => {
            let mut fields = row.fields.clone();
            fields.container_id = Some(container_id);
            fields.item_num = event.item_num.or(fields.item_num);
            fields.history = Some(history::append(fields.history.as_deref(), stamp));
            RowMutation::Update {
                row_id: row.row_id,
                fields,
            }
        }
        None => RowMutation::Insert(TrackingFields {
            container_id: Some(container_id),
            order_number: Some(order_number.to_string()),
            item_num: event.item_num,
            prod_type: event.prod_type.clone(),
            size: event.size.clone(),
            history: Some(stamp.as_str().to_string()),
            ..Default::default()
        }),
    }
}

pub fn plan_move(rows: &[TrackingRow], stamp: &HistoryStamp) -> Vec<RowMutation> {
    rows.iter()
        .map(|row| {
            let mut fields = row.fields.clone();
            fields.history = Some(history::append(fields.history.as_deref(), stamp));
            RowMutation::Update {
                row_id: row.row_id,
                fields,
            }
        })
        .collect()
}

// ---
// Engine
// ---

#[derive(Debug)]
pub struct TrackingEngine {
    repo: TrackingRepository,
    normalizer: ProdTypeNormalizer,
}

impl TrackingEngine {
    pub fn new(normalizer: ProdTypeNormalizer) -> Self {
        Self {
            repo: TrackingRepository::new(),
            normalizer,
        }
    }

    pub async fn apply(
        &mut self,
        conn: &mut SqliteConnection,
        job: &TrackingJob,
    ) -> Result<JobOutcome, sqlx::Error> {
        self.apply_at(conn, job, Local::now().naive_local()).await
    }

    pub async fn apply_at(
        &mut self,
        conn: &mut SqliteConnection,
        job: &TrackingJob,
        now: NaiveDateTime,
    ) -> Result<JobOutcome, sqlx::Error> {
        let mut outcome = JobOutcome::default();
        match job {
            TrackingJob::OrderTrack(event) => {
                self.order_track(conn, event, now, &mut outcome).await?
            }
            TrackingJob::PrintData(event) => {
                self.print_data(conn, event, now, &mut outcome).await?
            }
            TrackingJob::MoveContainer(mv) => {
                self.move_container(conn, mv, now, &mut outcome).await?
            }
        }
        Ok(outcome)
    }

    async fn order_track(
        &mut self,
        conn: &mut SqliteConnection,
        event: &TrackingEvent,
        now: NaiveDateTime,
        outcome: &mut JobOutcome,
    ) -> Result<(), sqlx::Error> {
        if !event.has_identifier() {
            tracing::warn!("orderTrack event without any identifier, nothing to do");
            return Ok(());
        }

        let stamp = HistoryStamp::new(now, &event.workstation, &event.employee_name);
        let prod_type = self.normalizer.normalize(event.prod_type.as_deref()).await;

        if let Some(iso) = event.iso_barcode.as_deref() {
            let prod_type = prod_type.as_deref();
            self.iso_branch(conn, event, iso, prod_type, prod_type, &stamp, outcome)
                .await?;
        }

        if let Some(lead) = event.lead_barcode.as_deref() {
            let rows = self.repo.find_by_lead(&mut *conn, lead).await?;
            tracing::debug!("[Lead] {} row(s) for leadBarcode={}", rows.len(), lead);
            for mutation in plan_lead(&rows, event, &stamp) {
                self.execute(conn, mutation, outcome).await?;
            }
        }

        if event.iso_barcode.is_none() && event.lead_barcode.is_none() {
            if let Some(order) = event.order_number.as_deref() {
                let candidates = self.repo.order_rows_without_item(&mut *conn, order).await?;
                tracing::debug!(
                    "[OrderOnly] {} candidate(s) for orderNumber={}",
                    candidates.len(),
                    order
                );
                let mutation =
                    plan_order_only(&candidates, event, order, prod_type.as_deref(), &stamp);
                self.execute(conn, mutation, outcome).await?;
            }
        }

        Ok(())
    }

    async fn print_data(
        &mut self,
        conn: &mut SqliteConnection,
        event: &TrackingEvent,
        now: NaiveDateTime,
        outcome: &mut JobOutcome,
    ) -> Result<(), sqlx::Error> {
        if !event.has_identifier() {
            tracing::warn!("receivePrintData event without any identifier, nothing to do");
            return Ok(());
        }

        let stamp = HistoryStamp::new(now, &event.workstation, &event.employee_name);

        match (
            event.container_id,
            event.order_number.as_deref(),
            event.iso_barcode.as_deref(),
        ) {
            (Some(container_id), Some(order), None) => {
                let unpacked = self.repo.first_without_container(&mut *conn, order).await?;
                let mutation =
                    plan_print_attach(unpacked.as_ref(), event, container_id, order, &stamp);
                self.execute(conn, mutation, outcome).await
            }
            (_, _, Some(iso)) => {
                // Placeholders carry the worksheet reference, the row keeps the raw label.
                let mapped = self.normalizer.lookup(event.prod_type.as_deref()).await;
                self.iso_branch(
                    conn,
                    event,
                    iso,
                    event.prod_type.as_deref(),
                    mapped.as_deref(),
                    &stamp,
                    outcome,
                )
                .await
            }
            _ => {
                tracing::debug!("receivePrintData event matched no branch");
                Ok(())
            }
        }
    }

    async fn move_container(
        &mut self,
        conn: &mut SqliteConnection,
        mv: &ContainerMove,
        now: NaiveDateTime,
        outcome: &mut JobOutcome,
    ) -> Result<(), sqlx::Error> {
        let mut container_id = None;
        if let Some(iso) = mv.iso_barcode.as_deref() {
            container_id = self.repo.container_of_iso(&mut *conn, iso).await?;
        }
        if container_id.is_none() {
            if let Some(lead) = mv.lead_barcode.as_deref() {
                container_id = self.repo.container_of_lead(&mut *conn, lead).await?;
            }
        }

        let Some(container_id) = container_id else {
            tracing::warn!(
                "moveContainer could not resolve a container (isoBarcode={:?}, leadBarcode={:?})",
                mv.iso_barcode,
                mv.lead_barcode
            );
            return Ok(());
        };

        let stamp = HistoryStamp::new(now, &mv.workstation, &mv.employee_name);
        let rows = self.repo.find_by_container(&mut *conn, container_id).await?;
        tracing::debug!("[Move] container {} holds {} row(s)", container_id, rows.len());
        for mutation in plan_move(&rows, &stamp) {
            self.execute(conn, mutation, outcome).await?;
        }
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn iso_branch(
        &mut self,
        conn: &mut SqliteConnection,
        event: &TrackingEvent,
        iso: &str,
        prod_type: Option<&str>,
        placeholder_type: Option<&str>,
        stamp: &HistoryStamp,
        outcome: &mut JobOutcome,
    ) -> Result<(), sqlx::Error> {
        let existing = self.repo.find_by_iso(&mut *conn, iso).await?;
        let placeholders = match (&existing, event.order_number.as_deref()) {
            (None, Some(order)) => self.repo.placeholders_for_order(&mut *conn, order).await?,
            _ => Vec::new(),
        };

        let mutation = plan_iso(
            event,
            iso,
            prod_type,
            placeholder_type,
            existing.as_ref(),
            &placeholders,
            stamp,
        );
        tracing::debug!("[ISO] isoBarcode={} -> {:?}", iso, mutation);
        self.execute(conn, mutation, outcome).await
    }

    async fn execute(
        &self,
        conn: &mut SqliteConnection,
        mutation: RowMutation,
        outcome: &mut JobOutcome,
    ) -> Result<(), sqlx::Error> {
        match mutation {
            RowMutation::Insert(fields) => {
                self.repo.insert(&mut *conn, &fields).await?;
                outcome.inserted += 1;
            }
            RowMutation::Update { row_id, fields } => {
                let affected = self.repo.update(&mut *conn, row_id, &fields).await?;
                outcome.updated += affected as usize;
            }
        }
        Ok(())
    }
}
