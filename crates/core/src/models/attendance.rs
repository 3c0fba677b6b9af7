use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Attendance decision for one slot on one day. `Pending` is the explicit
/// "nothing decided yet" state; a missing record behaves the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AttendanceStatus {
    Pending,
    Attended,
    NotAttended,
}

impl fmt::Display for AttendanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            AttendanceStatus::Pending => "pending",
            AttendanceStatus::Attended => "attended",
            AttendanceStatus::NotAttended => "not-attended",
        };
        write!(f, "{label}")
    }
}

/// One attendance decision, keyed externally by (date, slot id). All fields
/// besides `status`/`modified`/`exclude` are snapshots of the slot at commit
/// time; later edits to the schedule do not rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttendanceRecord {
    pub status: AttendanceStatus,
    pub modified: bool,
    pub subject_id: String,
    pub subject_name: String,
    pub time_slot: String,
    #[serde(default)]
    pub exclude: bool,
    pub location_name: String,
}

/// The full per-user attendance history: date, then slot id, to record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttendanceLog(BTreeMap<NaiveDate, BTreeMap<String, AttendanceRecord>>);

impl AttendanceLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, date: NaiveDate, slot_id: &str) -> Option<&AttendanceRecord> {
        self.0.get(&date).and_then(|slots| slots.get(slot_id))
    }

    pub fn record_mut(&mut self, date: NaiveDate, slot_id: &str) -> Option<&mut AttendanceRecord> {
        self.0.get_mut(&date).and_then(|slots| slots.get_mut(slot_id))
    }

    pub fn upsert(&mut self, date: NaiveDate, slot_id: impl Into<String>, record: AttendanceRecord) {
        self.0.entry(date).or_default().insert(slot_id.into(), record);
    }

    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &BTreeMap<String, AttendanceRecord>)> {
        self.0.iter().map(|(date, slots)| (*date, slots))
    }

    pub fn len(&self) -> usize {
        self.0.values().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
