//! Committed patient records and the persistence seam
//!
//! A [`PatientEntry`] is the durable artifact of one encoded patient. It
//! is append-only: unlocking a committed patient re-opens the session
//! state and a later commit appends a fresh record, history is never
//! edited. The sink is capacity-constrained, so commits carry a
//! prune-and-retry recovery policy.

use crate::error::{SessionError, SessionResult};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// How many entries the prune-and-retry recovery keeps.
pub const PRUNE_KEEP: usize = 10;

/// One committed patient: the externally meaningful persisted shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatientEntry {
    /// Zero-based patient position within the scanned batch
    pub patient_index: u32,
    /// Number of pages this patient's sheet spans
    pub pages: u32,
    /// Template the patient was encoded against
    pub sheet_id: String,
    /// Operator-entered doctor identifier
    #[serde(default)]
    pub doctor_id: Option<String>,
    /// Decoded stay number, when a barcode was read
    #[serde(default)]
    pub stay_number: Option<String>,
    /// Operator-entered dates, RFC 3339
    #[serde(default)]
    pub dates: Vec<String>,
    /// Relative page index -> zone id -> checked
    pub zones_checked: BTreeMap<u32, BTreeMap<String, bool>>,
    /// Commit timestamp, RFC 3339, supplied by the caller
    pub created_at: String,
}

/// Persistence collaborator accepting finalized entries.
pub trait EntrySink {
    /// Append one entry. A full store reports
    /// [`SessionError::StorageQuota`].
    fn append(&mut self, entry: &PatientEntry) -> SessionResult<()>;

    /// Drop all but the `keep` most recent entries; returns how many
    /// were removed.
    fn prune_to_most_recent(&mut self, keep: usize) -> SessionResult<usize>;
}

/// Append `entry` to `sink`, recovering once from quota exhaustion by
/// pruning to the [`PRUNE_KEEP`] most recent entries.
///
/// If the retry also fails the error is surfaced and the commit must be
/// treated as failed; callers do not advance session state.
pub fn commit_entry<S: EntrySink>(sink: &mut S, entry: &PatientEntry) -> SessionResult<()> {
    match sink.append(entry) {
        Ok(()) => Ok(()),
        Err(SessionError::StorageQuota) => {
            let removed = sink.prune_to_most_recent(PRUNE_KEEP)?;
            tracing::debug!(removed, "pruned entry store after quota rejection");
            sink.append(entry)
        }
        Err(err) => Err(err),
    }
}

/// In-memory sink with an optional capacity, for tests and previews.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Vec<PatientEntry>,
    capacity: Option<usize>,
}

impl MemorySink {
    /// Unbounded sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sink rejecting appends past `capacity` entries.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::new(),
            capacity: Some(capacity),
        }
    }

    /// Stored entries, oldest first.
    pub fn entries(&self) -> &[PatientEntry] {
        &self.entries
    }
}

impl EntrySink for MemorySink {
    fn append(&mut self, entry: &PatientEntry) -> SessionResult<()> {
        if self.capacity.is_some_and(|cap| self.entries.len() >= cap) {
            return Err(SessionError::StorageQuota);
        }
        self.entries.push(entry.clone());
        Ok(())
    }

    fn prune_to_most_recent(&mut self, keep: usize) -> SessionResult<usize> {
        let excess = self.entries.len().saturating_sub(keep);
        self.entries.drain(..excess);
        Ok(excess)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(index: u32) -> PatientEntry {
        PatientEntry {
            patient_index: index,
            pages: 1,
            sheet_id: "sheet-a".to_string(),
            doctor_id: None,
            stay_number: Some("1234".to_string()),
            dates: vec!["2024-03-01".to_string()],
            zones_checked: BTreeMap::from([(0, BTreeMap::from([("z1".to_string(), true)]))]),
            created_at: "2024-03-01T10:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_commit_appends() {
        let mut sink = MemorySink::new();
        commit_entry(&mut sink, &entry(0)).unwrap();
        assert_eq!(sink.entries().len(), 1);
    }

    #[test]
    fn test_commit_prunes_and_retries_on_quota() {
        let mut sink = MemorySink::with_capacity(12);
        for i in 0..12 {
            commit_entry(&mut sink, &entry(i)).unwrap();
        }
        // Store is full; the next commit prunes to the 10 most recent
        // and then succeeds.
        commit_entry(&mut sink, &entry(12)).unwrap();
        assert_eq!(sink.entries().len(), 11);
        assert_eq!(sink.entries()[0].patient_index, 2);
        assert_eq!(sink.entries().last().unwrap().patient_index, 12);
    }

    #[test]
    fn test_commit_surfaces_double_failure() {
        // Capacity below the prune target: the retry fails too.
        let mut sink = MemorySink::with_capacity(0);
        assert!(matches!(
            commit_entry(&mut sink, &entry(0)),
            Err(SessionError::StorageQuota)
        ));
        assert!(sink.entries().is_empty());
    }

    #[test]
    fn test_entry_serde_shape() {
        let json = serde_json::to_value(entry(3)).unwrap();
        assert_eq!(json["patientIndex"], 3);
        assert_eq!(json["stayNumber"], "1234");
        assert_eq!(json["zonesChecked"]["0"]["z1"], true);
        assert_eq!(json["createdAt"], "2024-03-01T10:00:00Z");
    }
}
