// src/models/tracking.rs

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};
use validator::{Validate, ValidationError};

use crate::common::response::ApiStatus;

/// Column values of a `tracking_data` row.
#[derive(Debug, Clone, Default, PartialEq, FromRow)]
pub struct TrackingFields {
    #[sqlx(rename = "containerID")]
    pub container_id: Option<i64>,
    #[sqlx(rename = "orderNumber")]
    pub order_number: Option<String>,
    #[sqlx(rename = "leadBarcode")]
    pub lead_barcode: Option<String>,
    #[sqlx(rename = "isoBarcode")]
    pub iso_barcode: Option<String>,
    #[sqlx(rename = "itemNum")]
    pub item_num: Option<i64>,
    #[sqlx(rename = "prodType")]
    pub prod_type: Option<String>,
    pub size: Option<String>,
    pub history: Option<String>,
}

/// One physical item (or an order-level placeholder) moving through production.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct TrackingRow {
    pub row_id: i64,
    #[sqlx(flatten)]
    pub fields: TrackingFields,
}

/// A tracking stamp as it arrives from a scanner or print station.
/// Identifiers are sparse; empty strings were already turned into `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingEvent {
    pub container_id: Option<i64>,
    pub order_number: Option<String>,
    pub lead_barcode: Option<String>,
    pub iso_barcode: Option<String>,
    pub item_num: Option<i64>,
    pub prod_type: Option<String>,
    pub size: Option<String>,
    pub workstation: String,
    pub employee_name: String,
}

impl TrackingEvent {
    pub fn has_identifier(&self) -> bool {
        self.container_id.is_some()
            || self.order_number.is_some()
            || self.lead_barcode.is_some()
            || self.iso_barcode.is_some()
    }
}

/// Stamp every row sharing the container found through one of the barcodes.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContainerMove {
    pub iso_barcode: Option<String>,
    pub lead_barcode: Option<String>,
    pub workstation: String,
    pub employee_name: String,
}

/// Unit of work handed to the tracking queue.
#[derive(Debug, Clone, PartialEq)]
pub enum TrackingJob {
    /// Scanner stamp: ISO, Lead and Order-only resolution with prodType normalization.
    OrderTrack(TrackingEvent),
    /// Print-station stamp: container attach or ISO resolution, raw prodType.
    PrintData(TrackingEvent),
    MoveContainer(ContainerMove),
}

impl TrackingJob {
    pub fn kind(&self) -> &'static str {
        match self {
            TrackingJob::OrderTrack(_) => "order_track",
            TrackingJob::PrintData(_) => "print_data",
            TrackingJob::MoveContainer(_) => "move_container",
        }
    }
}

// --- Query strings ---

fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

// Unparseable numbers are dropped rather than rejected; scanners send junk.
fn parse_int(value: Option<String>) -> Option<i64> {
    non_empty(value).and_then(|v| v.parse().ok())
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct TrackQuery {
    #[serde(rename = "containerID")]
    #[param(value_type = Option<i64>)]
    pub container_id: Option<String>,
    #[serde(rename = "orderNumber")]
    #[param(example = "12345678")]
    pub order_number: Option<String>,
    #[serde(rename = "isoBarcode")]
    #[param(example = "o1234567890")]
    pub iso_barcode: Option<String>,
    #[serde(rename = "leadBarcode")]
    #[param(example = "B123456789")]
    pub lead_barcode: Option<String>,
    #[param(example = "Scan1")]
    pub workstation: Option<String>,
    #[serde(rename = "employeeName")]
    #[param(example = "Alice")]
    pub employee_name: Option<String>,
    #[serde(rename = "itemNum")]
    #[param(value_type = Option<i64>)]
    pub item_num: Option<String>,
    #[serde(rename = "prodType")]
    #[param(example = "poster 18x24")]
    pub prod_type: Option<String>,
    pub size: Option<String>,
}

impl From<TrackQuery> for TrackingEvent {
    fn from(q: TrackQuery) -> Self {
        Self {
            container_id: parse_int(q.container_id),
            order_number: non_empty(q.order_number),
            lead_barcode: non_empty(q.lead_barcode),
            iso_barcode: non_empty(q.iso_barcode),
            item_num: parse_int(q.item_num),
            prod_type: non_empty(q.prod_type),
            size: non_empty(q.size),
            workstation: q.workstation.unwrap_or_default(),
            employee_name: q.employee_name.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct MoveContainerQuery {
    #[serde(rename = "isoBarcode")]
    pub iso_barcode: Option<String>,
    #[serde(rename = "leadBarcode")]
    pub lead_barcode: Option<String>,
    pub workstation: Option<String>,
    #[serde(rename = "employeeName")]
    pub employee_name: Option<String>,
}

impl From<MoveContainerQuery> for ContainerMove {
    fn from(q: MoveContainerQuery) -> Self {
        Self {
            iso_barcode: non_empty(q.iso_barcode),
            lead_barcode: non_empty(q.lead_barcode),
            workstation: q.workstation.unwrap_or_default(),
            employee_name: q.employee_name.unwrap_or_default(),
        }
    }
}

// --- History lookup ---

fn at_least_one_key(payload: &TrackingHistoryPayload) -> Result<(), ValidationError> {
    let present = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.is_empty());
    if present(&payload.order_number) || present(&payload.lead_barcode) || present(&payload.iso_barcode)
    {
        return Ok(());
    }
    let mut err = ValidationError::new("missing_key");
    err.message =
        Some("Must provide at least one of orderNumber, leadBarcode, or isoBarcode".into());
    Err(err)
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
#[validate(schema(function = "at_least_one_key"))]
pub struct TrackingHistoryPayload {
    #[schema(example = "12345678")]
    pub order_number: Option<String>,
    #[schema(example = "B123456789")]
    pub lead_barcode: Option<String>,
    #[schema(example = "o1234567890")]
    pub iso_barcode: Option<String>,
}

/// `[containerID, isoBarcode, line1, line2, ...]`
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Vec<Value>")]
pub struct HistoryRecord {
    pub container_id: Option<i64>,
    pub iso_barcode: Option<String>,
    pub lines: Vec<String>,
}

impl From<HistoryRecord> for Vec<Value> {
    fn from(record: HistoryRecord) -> Self {
        let mut out = Vec::with_capacity(record.lines.len() + 2);
        out.push(record.container_id.map(Value::from).unwrap_or(Value::Null));
        out.push(record.iso_barcode.map(Value::from).unwrap_or(Value::Null));
        out.extend(record.lines.into_iter().map(Value::from));
        out
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TrackingHistoryResponse {
    pub status: ApiStatus,
    #[schema(value_type = Vec<Vec<Object>>, example = json!([[3, "o1234567890", "2025-03-14T09:12:00 | Scan1 | Alice"]]))]
    pub history: Vec<HistoryRecord>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct NextContainerIdResponse {
    pub status: ApiStatus,
    #[serde(rename = "nextContainerID")]
    #[schema(example = 3)]
    pub next_container_id: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn track_query_drops_blank_and_unparseable_values() {
        let event = TrackingEvent::from(TrackQuery {
            container_id: Some("abc".into()),
            order_number: Some("  ".into()),
            iso_barcode: Some("o1234567890".into()),
            item_num: Some("7".into()),
            workstation: Some("Scan1".into()),
            ..Default::default()
        });

        assert_eq!(event.container_id, None);
        assert_eq!(event.order_number, None);
        assert_eq!(event.iso_barcode.as_deref(), Some("o1234567890"));
        assert_eq!(event.item_num, Some(7));
        assert_eq!(event.workstation, "Scan1");
        assert_eq!(event.employee_name, "");
        assert!(event.has_identifier());
    }

    #[test]
    fn event_without_identifiers_is_flagged() {
        let event = TrackingEvent {
            item_num: Some(2),
            prod_type: Some("poster".into()),
            ..Default::default()
        };
        assert!(!event.has_identifier());
    }

    #[test]
    fn history_payload_requires_a_key() {
        let payload = TrackingHistoryPayload {
            order_number: None,
            lead_barcode: Some(String::new()),
            iso_barcode: None,
        };
        assert!(payload.validate().is_err());
    }

    #[test]
    fn history_record_serializes_as_flat_array() {
        let record = HistoryRecord {
            container_id: Some(4),
            iso_barcode: None,
            lines: vec!["2025-03-14T09:12:00 | Scan1 | Alice".into()],
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(
            json,
            serde_json::json!([4, null, "2025-03-14T09:12:00 | Scan1 | Alice"])
        );
    }
}
