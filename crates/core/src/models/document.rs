use serde::{Deserialize, Serialize};

use super::attendance::AttendanceLog;
use super::schedule::Schedule;
use super::subject::Subject;

/// The default minimum attendance requirement for a fresh account.
pub const DEFAULT_MIN_ATTENDANCE_PERCENT: u8 = 75;

fn default_min_percent() -> u8 {
    DEFAULT_MIN_ATTENDANCE_PERCENT
}

/// The one-per-user stored document. Every field defaults so that partial
/// documents written by older sessions still deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDocument {
    #[serde(default)]
    pub subjects: Vec<Subject>,
    #[serde(default)]
    pub schedule: Schedule,
    #[serde(default = "default_min_percent")]
    pub min_attendance_percent: u8,
    #[serde(default)]
    pub attendance_records: AttendanceLog,
}

impl Default for UserDocument {
    fn default() -> Self {
        Self {
            subjects: Vec::new(),
            schedule: Schedule::default(),
            min_attendance_percent: DEFAULT_MIN_ATTENDANCE_PERCENT,
            attendance_records: AttendanceLog::new(),
        }
    }
}

impl UserDocument {
    /// Replaces the fields named by the patch, leaving the rest untouched.
    pub fn apply(&mut self, patch: DocumentPatch) {
        if let Some(subjects) = patch.subjects {
            self.subjects = subjects;
        }
        if let Some(schedule) = patch.schedule {
            self.schedule = schedule;
        }
        if let Some(percent) = patch.min_attendance_percent {
            self.min_attendance_percent = percent;
        }
        if let Some(records) = patch.attendance_records {
            self.attendance_records = records;
        }
    }
}

/// A partial-merge write: only the `Some` fields replace their stored
/// counterparts. Serializes to exactly the named top-level fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subjects: Option<Vec<Subject>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule: Option<Schedule>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_attendance_percent: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attendance_records: Option<AttendanceLog>,
}

impl DocumentPatch {
    pub fn subjects(subjects: Vec<Subject>) -> Self {
        Self {
            subjects: Some(subjects),
            ..Self::default()
        }
    }

    pub fn schedule(schedule: Schedule) -> Self {
        Self {
            schedule: Some(schedule),
            ..Self::default()
        }
    }

    pub fn min_attendance_percent(percent: u8) -> Self {
        Self {
            min_attendance_percent: Some(percent),
            ..Self::default()
        }
    }

    pub fn attendance_records(records: AttendanceLog) -> Self {
        Self {
            attendance_records: Some(records),
            ..Self::default()
        }
    }

    /// A patch that writes every field, used to seed a brand-new document.
    pub fn full(document: &UserDocument) -> Self {
        Self {
            subjects: Some(document.subjects.clone()),
            schedule: Some(document.schedule.clone()),
            min_attendance_percent: Some(document.min_attendance_percent),
            attendance_records: Some(document.attendance_records.clone()),
        }
    }
}
