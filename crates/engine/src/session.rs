//! Per-user session state.
//!
//! A [`Session`] owns the in-memory copy of one user's document and the
//! handle to the document store. Every mutation applies optimistically in
//! memory, then writes the affected top-level field through the store; a
//! store failure is returned to the caller as a `Persistence` error while
//! the in-memory change stands (the caller decides whether to retry).

use std::sync::Arc;

use chrono::NaiveDate;
use geomark_core::errors::{MarkError, MarkResult};
use geomark_core::models::{
    AttendanceLog, AttendanceRecord, AttendanceStatus, DocumentPatch, Location, Schedule, Slot,
    Subject, UserDocument, Weekday,
};
use geomark_store::DocumentStore;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Input for a new weekly slot. Times arrive as "HH:MM" strings, exactly as
/// the scheduling UI produces them.
#[derive(Debug, Clone)]
pub struct NewSlot {
    pub from: String,
    pub to: String,
    pub subject_id: String,
    pub location: Location,
    pub exclude: bool,
}

pub struct Session {
    user_id: String,
    store: Arc<dyn DocumentStore>,
    subjects: Vec<Subject>,
    schedule: Schedule,
    min_attendance_percent: u8,
    records: AttendanceLog,
}

impl Session {
    /// Loads the user's document, seeding a default one the first time this
    /// user is seen.
    pub async fn load(user_id: &str, store: Arc<dyn DocumentStore>) -> MarkResult<Self> {
        let document = match store.read(user_id).await? {
            Some(document) => document,
            None => {
                let document = UserDocument::default();
                store.write(user_id, DocumentPatch::full(&document)).await?;
                document
            }
        };

        let mut session = Self {
            user_id: user_id.to_string(),
            store,
            subjects: document.subjects,
            schedule: document.schedule,
            min_attendance_percent: document.min_attendance_percent,
            records: document.attendance_records,
        };
        session.schedule.normalize();
        Ok(session)
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    pub fn schedule(&self) -> &Schedule {
        &self.schedule
    }

    pub fn min_attendance_percent(&self) -> u8 {
        self.min_attendance_percent
    }

    pub fn records(&self) -> &AttendanceLog {
        &self.records
    }

    /// A feed of store-side document changes for this user.
    pub fn subscribe(&self) -> broadcast::Receiver<UserDocument> {
        self.store.subscribe(&self.user_id)
    }

    /// Wholesale replace of the in-memory state from a store change event.
    pub fn apply_snapshot(&mut self, document: UserDocument) {
        self.subjects = document.subjects;
        self.schedule = document.schedule;
        self.schedule.normalize();
        self.min_attendance_percent = document.min_attendance_percent;
        self.records = document.attendance_records;
    }

    pub async fn add_subject(&mut self, name: &str) -> MarkResult<Subject> {
        let name = name.trim();
        if name.is_empty() {
            return Err(MarkError::Validation(
                "Subject name cannot be empty".to_string(),
            ));
        }

        let subject = Subject {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
        };
        self.subjects.push(subject.clone());
        self.write_subjects().await?;
        Ok(subject)
    }

    /// Removes the subject. Slots referencing it are left in place; records
    /// and existing slots keep the denormalized name snapshot.
    pub async fn delete_subject(&mut self, subject_id: &str) -> MarkResult<()> {
        self.subjects.retain(|subject| subject.id != subject_id);
        self.write_subjects().await
    }

    pub async fn add_slot(&mut self, day: Weekday, new_slot: NewSlot) -> MarkResult<Slot> {
        if new_slot.from.is_empty() || new_slot.to.is_empty() || new_slot.subject_id.is_empty() {
            return Err(MarkError::Validation(
                "From time, to time, and subject are required".to_string(),
            ));
        }
        let from = new_slot.from.parse()?;
        let to = new_slot.to.parse()?;

        let subject_name = self
            .subjects
            .iter()
            .find(|subject| subject.id == new_slot.subject_id)
            .map(|subject| subject.name.clone())
            .unwrap_or_else(|| "Unknown Subject".to_string());

        let slot = Slot {
            id: Uuid::new_v4().to_string(),
            from,
            to,
            subject_id: new_slot.subject_id,
            subject_name,
            location: new_slot.location,
            exclude: new_slot.exclude,
        };

        let entry = self.schedule.day_mut(day);
        entry.slots.push(slot.clone());
        entry.slots.sort_by(|a, b| a.from.cmp(&b.from));

        self.write_schedule().await?;
        Ok(slot)
    }

    pub async fn delete_slot(&mut self, day: Weekday, slot_id: &str) -> MarkResult<()> {
        self.schedule
            .day_mut(day)
            .slots
            .retain(|slot| slot.id != slot_id);
        self.write_schedule().await
    }

    pub async fn set_min_attendance_percent(&mut self, percent: u8) -> MarkResult<()> {
        if percent > 100 {
            return Err(MarkError::Validation(
                "Please enter a percentage between 0 and 100".to_string(),
            ));
        }
        self.min_attendance_percent = percent;
        self.store
            .write(
                &self.user_id,
                DocumentPatch::min_attendance_percent(percent),
            )
            .await?;
        Ok(())
    }

    /// Writes an automatically decided record for `(date, slot_id)`,
    /// overwriting whatever is there. Used by the evaluator.
    pub async fn commit_record(
        &mut self,
        date: NaiveDate,
        slot_id: &str,
        record: AttendanceRecord,
    ) -> MarkResult<()> {
        self.records.upsert(date, slot_id, record);
        self.write_records().await
    }

    /// Manual correction: flips attended and not-attended and marks the
    /// record as modified. `modified` never reverts to false.
    pub async fn toggle_attendance(
        &mut self,
        date: NaiveDate,
        slot_id: &str,
    ) -> MarkResult<AttendanceStatus> {
        let record = self.records.record_mut(date, slot_id).ok_or_else(|| {
            MarkError::Precondition(format!(
                "No attendance record for slot {slot_id} on {date}"
            ))
        })?;

        record.status = match record.status {
            AttendanceStatus::Attended => AttendanceStatus::NotAttended,
            AttendanceStatus::NotAttended | AttendanceStatus::Pending => {
                AttendanceStatus::Attended
            }
        };
        record.modified = true;
        let status = record.status;

        self.write_records().await?;
        Ok(status)
    }

    /// Flips only the exclude flag; status and the modified marker stay.
    pub async fn toggle_exclude(&mut self, date: NaiveDate, slot_id: &str) -> MarkResult<bool> {
        let record = self.records.record_mut(date, slot_id).ok_or_else(|| {
            MarkError::Precondition(format!(
                "No attendance record for slot {slot_id} on {date}"
            ))
        })?;

        record.exclude = !record.exclude;
        let exclude = record.exclude;

        self.write_records().await?;
        Ok(exclude)
    }

    async fn write_subjects(&self) -> MarkResult<()> {
        self.store
            .write(&self.user_id, DocumentPatch::subjects(self.subjects.clone()))
            .await?;
        Ok(())
    }

    async fn write_schedule(&self) -> MarkResult<()> {
        self.store
            .write(&self.user_id, DocumentPatch::schedule(self.schedule.clone()))
            .await?;
        Ok(())
    }

    async fn write_records(&self) -> MarkResult<()> {
        self.store
            .write(
                &self.user_id,
                DocumentPatch::attendance_records(self.records.clone()),
            )
            .await?;
        Ok(())
    }
}
