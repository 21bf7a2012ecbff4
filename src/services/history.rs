// src/services/history.rs

// History column format: one stamp per line, oldest first,
// `2025-03-14T09:12:00 | Scan1 | Alice`.

use chrono::{NaiveDateTime, Timelike};

const SEPARATOR: &str = " | ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryStamp {
    line: String,
}

impl HistoryStamp {
    pub fn new(at: NaiveDateTime, workstation: &str, employee_name: &str) -> Self {
        let minute = at
            .with_second(0)
            .and_then(|t| t.with_nanosecond(0))
            .unwrap_or(at);
        Self {
            line: format!(
                "{}{SEPARATOR}{workstation}{SEPARATOR}{employee_name}",
                minute.format("%Y-%m-%dT%H:%M:%S")
            ),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.line
    }
}

/// Everything after the timestamp: `workstation | employeeName`.
fn station_part(line: &str) -> &str {
    line.split_once(SEPARATOR).map_or(line, |(_, rest)| rest)
}

/// Appends `stamp` unless the last line already records the same station and
/// employee. Returns the history unchanged in that case.
pub fn append(existing: Option<&str>, stamp: &HistoryStamp) -> String {
    let existing = existing.map(str::trim).unwrap_or_default();
    if existing.is_empty() {
        return stamp.as_str().to_string();
    }

    let last = existing.lines().last().unwrap_or_default();
    if station_part(last.trim()) == station_part(stamp.as_str()) {
        return existing.to_string();
    }

    format!("{existing}\n{}", stamp.as_str())
}

pub fn lines(history: Option<&str>) -> Vec<String> {
    history
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(|h| h.split('\n').map(str::to_string).collect())
        .unwrap_or_default()
}

/// Timestamp of a history line, `None` if the line does not start with one.
pub fn line_timestamp(line: &str) -> Option<NaiveDateTime> {
    let raw = line.split_once(SEPARATOR).map_or(line, |(ts, _)| ts).trim();
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S"))
        .ok()
}

/// Timestamp of the most recent stamp on a row.
pub fn last_activity(history: Option<&str>) -> Option<NaiveDateTime> {
    lines(history)
        .iter()
        .rev()
        .map(|l| l.trim())
        .find(|l| !l.is_empty())
        .and_then(line_timestamp)
}

/// Merge two histories into one chronological log, dropping repeated
/// consecutive station stamps. Lines without a timestamp go first.
pub fn merge(a: Option<&str>, b: Option<&str>) -> Option<String> {
    let mut all: Vec<(Option<NaiveDateTime>, usize, String)> = lines(a)
        .into_iter()
        .chain(lines(b))
        .enumerate()
        .map(|(i, l)| (line_timestamp(&l), i, l))
        .collect();
    if all.is_empty() {
        return None;
    }
    all.sort_by_key(|(ts, i, _)| (*ts, *i));

    let mut merged: Vec<String> = Vec::with_capacity(all.len());
    for (_, _, line) in all {
        let repeat = merged
            .last()
            .is_some_and(|prev| prev == &line || station_part(prev) == station_part(&line));
        if !repeat {
            merged.push(line);
        }
    }
    Some(merged.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn stamp_is_minute_truncated() {
        let stamp = HistoryStamp::new(at(9, 12, 47), "Scan1", "Alice");
        assert_eq!(stamp.as_str(), "2025-03-14T09:12:00 | Scan1 | Alice");
    }

    #[test]
    fn first_stamp_becomes_the_history() {
        let stamp = HistoryStamp::new(at(9, 0, 0), "Scan1", "Alice");
        assert_eq!(append(None, &stamp), stamp.as_str());
        assert_eq!(append(Some("   "), &stamp), stamp.as_str());
    }

    #[test]
    fn repeated_station_stamp_is_not_appended() {
        let first = HistoryStamp::new(at(9, 0, 0), "Scan1", "Alice");
        let again = HistoryStamp::new(at(9, 5, 0), "Scan1", "Alice");

        let history = append(None, &first);
        let history = append(Some(&history), &again);

        assert_eq!(history, "2025-03-14T09:00:00 | Scan1 | Alice");
    }

    #[test]
    fn different_employee_or_station_is_appended() {
        let history = append(None, &HistoryStamp::new(at(9, 0, 0), "Scan1", "Alice"));
        let history = append(Some(&history), &HistoryStamp::new(at(9, 1, 0), "Scan1", "Bob"));
        let history = append(Some(&history), &HistoryStamp::new(at(9, 2, 0), "Cutting", "Bob"));

        assert_eq!(
            lines(Some(&history)),
            vec![
                "2025-03-14T09:00:00 | Scan1 | Alice",
                "2025-03-14T09:01:00 | Scan1 | Bob",
                "2025-03-14T09:02:00 | Cutting | Bob",
            ]
        );
    }

    #[test]
    fn only_the_last_line_is_compared() {
        let history = "2025-03-14T09:00:00 | Scan1 | Alice\n2025-03-14T09:01:00 | Cutting | Bob";
        let stamp = HistoryStamp::new(at(9, 2, 0), "Scan1", "Alice");
        assert_eq!(lines(Some(&append(Some(history), &stamp))).len(), 3);
    }

    #[test]
    fn last_activity_reads_final_line() {
        let history = "2025-03-10T08:00:00 | Scan1 | Alice\n2025-03-14T09:01:00 | Cutting | Bob\n";
        assert_eq!(last_activity(Some(history)), Some(at(9, 1, 0)));
        assert_eq!(last_activity(Some("garbage")), None);
        assert_eq!(last_activity(None), None);
    }

    #[test]
    fn merge_orders_and_dedups() {
        let a = "2025-03-14T09:00:00 | Scan1 | Alice\n2025-03-14T09:30:00 | Cutting | Bob";
        let b = "2025-03-14T09:00:00 | Scan1 | Alice\n2025-03-14T09:10:00 | Print | Carol";

        assert_eq!(
            merge(Some(a), Some(b)).unwrap(),
            "2025-03-14T09:00:00 | Scan1 | Alice\n\
             2025-03-14T09:10:00 | Print | Carol\n\
             2025-03-14T09:30:00 | Cutting | Bob"
        );
        assert_eq!(merge(None, Some("")), None);
    }
}
