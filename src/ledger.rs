// 📜 Scan Ledger - newest-first history of scans
//
// Lives only as long as the process. Nothing here touches the disk.

use crate::classifier::Category;
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Fixed-width, lexically sortable timestamp format
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanEvent {
    pub event_id: String,
    pub timestamp: String,
    pub payload: String,
    /// Classification at record time, never re-evaluated
    pub category: Category,
}

impl ScanEvent {
    pub fn new(payload: String, category: Category, recorded_at: NaiveDateTime) -> Self {
        ScanEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            timestamp: recorded_at.format(TIMESTAMP_FORMAT).to_string(),
            payload,
            category,
        }
    }
}

#[derive(Debug, Default)]
pub struct ScanLedger {
    /// Index 0 is the newest event
    events: Vec<ScanEvent>,
}

impl ScanLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a scan at the head, stamped with the current local time
    pub fn append(&mut self, payload: impl Into<String>, category: Category) -> &ScanEvent {
        self.append_at(payload, category, Local::now().naive_local())
    }

    pub fn append_at(
        &mut self,
        payload: impl Into<String>,
        category: Category,
        recorded_at: NaiveDateTime,
    ) -> &ScanEvent {
        let event = ScanEvent::new(payload.into(), category, recorded_at);
        debug!(event_id = %event.event_id, kind = event.category.label(), "scan recorded");
        self.events.insert(0, event);
        &self.events[0]
    }

    /// Remove every event at the given positions; returns how many were removed.
    ///
    /// Positions refer to the order before this call. Duplicates collapse, an empty
    /// selection does nothing, and positions past the end are skipped.
    pub fn delete<I: IntoIterator<Item = usize>>(&mut self, indices: I) -> usize {
        let selected: BTreeSet<usize> = indices.into_iter().collect();
        let len = self.events.len();
        let mut removed = 0;

        // Highest first so earlier removals don't shift the rest
        for &index in selected.iter().rev() {
            if index >= len {
                warn!(index, len, "history index out of range, skipped");
                continue;
            }
            self.events.remove(index);
            removed += 1;
        }

        removed
    }

    /// Read-only view, newest first
    pub fn all(&self) -> &[ScanEvent] {
        &self.events
    }

    pub fn get(&self, index: usize) -> Option<&ScanEvent> {
        self.events.get(index)
    }

    pub fn position(&self, event_id: &str) -> Option<usize> {
        self.events.iter().position(|e| e.event_id == event_id)
    }

    pub fn find(&self, event_id: &str) -> Option<&ScanEvent> {
        self.events.iter().find(|e| e.event_id == event_id)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32, sec: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(hour, min, sec)
            .unwrap()
    }

    fn payloads(ledger: &ScanLedger) -> Vec<&str> {
        ledger.all().iter().map(|e| e.payload.as_str()).collect()
    }

    #[test]
    fn test_append_is_newest_first() {
        let mut ledger = ScanLedger::new();
        ledger.append("E1", Category::PlainText);
        ledger.append("E2", Category::Url);
        ledger.append("E3", Category::PhoneNumber);

        assert_eq!(payloads(&ledger), vec!["E3", "E2", "E1"]);
        assert_eq!(ledger.all()[1].category, Category::Url);
    }

    #[test]
    fn test_append_does_not_dedup() {
        let mut ledger = ScanLedger::new();
        ledger.append("same", Category::PlainText);
        ledger.append("same", Category::PlainText);

        assert_eq!(ledger.len(), 2);
        assert_ne!(ledger.all()[0].event_id, ledger.all()[1].event_id);
    }

    #[test]
    fn test_timestamp_format() {
        let mut ledger = ScanLedger::new();
        let event = ledger.append_at("x", Category::PlainText, at(7, 5, 3));
        assert_eq!(event.timestamp, "2024-03-09 07:05:03");

        let live = ledger.append("y", Category::PlainText);
        assert_eq!(live.timestamp.len(), "2024-03-09 07:05:03".len());
    }

    #[test]
    fn test_delete_resolves_indices_before_removal() {
        let mut ledger = ScanLedger::new();
        ledger.append("E1", Category::PlainText);
        ledger.append("E2", Category::PlainText);
        ledger.append("E3", Category::PlainText);

        // [E3, E2, E1] minus positions 0 and 2
        let removed = ledger.delete([0, 2]);
        assert_eq!(removed, 2);
        assert_eq!(payloads(&ledger), vec!["E2"]);
    }

    #[test]
    fn test_delete_empty_selection_is_noop() {
        let mut ledger = ScanLedger::new();
        ledger.append("E1", Category::PlainText);

        assert_eq!(ledger.delete(Vec::<usize>::new()), 0);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn test_delete_duplicates_and_out_of_range() {
        let mut ledger = ScanLedger::new();
        ledger.append("E1", Category::PlainText);
        ledger.append("E2", Category::PlainText);

        let removed = ledger.delete([1, 1, 9]);
        assert_eq!(removed, 1);
        assert_eq!(payloads(&ledger), vec!["E2"]);
    }

    #[test]
    fn test_lookup_by_event_id() {
        let mut ledger = ScanLedger::new();
        let first_id = ledger.append("E1", Category::PlainText).event_id.clone();
        ledger.append("E2", Category::PlainText);

        assert_eq!(ledger.position(&first_id), Some(1));
        assert_eq!(ledger.find(&first_id).unwrap().payload, "E1");
        assert!(ledger.find("nope").is_none());
        assert_eq!(ledger.get(0).unwrap().payload, "E2");
        assert!(ledger.get(5).is_none());
    }
}
