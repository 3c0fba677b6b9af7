//! # Attendance Aggregator
//!
//! Computes attended/considered counters and percentages over a date range
//! or a calendar month, under two policies:
//!
//! - **Raw** ("no modification"): a record counts as attended only when the
//!   automatic evaluator decided so and nobody touched it since. Manual
//!   edits still count toward the considered total, so under this policy a
//!   correction can only lower the percentage.
//! - **Modified**: attended status counts regardless of how it got there.
//!
//! A record with `exclude` set is omitted from both policies entirely.

use chrono::{Datelike, NaiveDate};
use geomark_core::errors::{MarkError, MarkResult};
use geomark_core::models::{AttendanceLog, AttendanceStatus, Subject};

/// Which subjects a statistics query covers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubjectFilter {
    All,
    Subject(String),
}

/// A statistics request over an inclusive date range.
#[derive(Debug, Clone)]
pub struct StatsQuery {
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub filter: SubjectFilter,
}

/// Counters and percentages for one result row.
#[derive(Debug, Clone, PartialEq)]
pub struct SubjectStats {
    pub subject_name: String,
    pub percent: f64,
    pub percent_modified: f64,
    pub total_attended: u32,
    pub total_considered: u32,
    pub total_attended_modified: u32,
    pub total_considered_modified: u32,
}

/// The dashboard's current-month aggregate: both policies, no subject
/// filter.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlySummary {
    pub percent: f64,
    pub percent_modified: f64,
    pub total_attended: u32,
    pub total_considered: u32,
    pub total_attended_modified: u32,
    pub total_considered_modified: u32,
}

#[derive(Default)]
struct Counters {
    attended: u32,
    considered: u32,
    attended_modified: u32,
    considered_modified: u32,
}

impl Counters {
    fn tally(&mut self, status: AttendanceStatus, modified: bool, exclude: bool) {
        if exclude {
            return;
        }

        self.considered += 1;
        if status == AttendanceStatus::Attended && !modified {
            self.attended += 1;
        }

        self.considered_modified += 1;
        if status == AttendanceStatus::Attended {
            self.attended_modified += 1;
        }
    }
}

/// Computes one result row for the range and filter.
///
/// The end date is inclusive: selection advances the end by one day and
/// applies the half-open comparison `start <= date < end + 1 day`.
pub fn range_stats(
    log: &AttendanceLog,
    subjects: &[Subject],
    query: &StatsQuery,
) -> MarkResult<SubjectStats> {
    if query.start > query.end {
        return Err(MarkError::Validation(
            "Start date cannot be after end date".to_string(),
        ));
    }

    let (subject_name, filter_id) = match &query.filter {
        SubjectFilter::All => ("All Subjects Combined".to_string(), None),
        SubjectFilter::Subject(id) => {
            let subject = subjects
                .iter()
                .find(|subject| subject.id == *id)
                .ok_or_else(|| MarkError::Validation("Selected subject not found".to_string()))?;
            (subject.name.clone(), Some(id.as_str()))
        }
    };

    let end_exclusive = query
        .end
        .succ_opt()
        .ok_or_else(|| MarkError::Validation("End date out of range".to_string()))?;

    let mut counters = Counters::default();
    for (date, slots) in log.iter() {
        if date < query.start || date >= end_exclusive {
            continue;
        }
        for record in slots.values() {
            // The filter matches on the snapshotted subject id, never the
            // denormalized name.
            if filter_id.is_some_and(|id| record.subject_id != id) {
                continue;
            }
            counters.tally(record.status, record.modified, record.exclude);
        }
    }

    Ok(SubjectStats {
        subject_name,
        percent: percentage(counters.attended, counters.considered),
        percent_modified: percentage(counters.attended_modified, counters.considered_modified),
        total_attended: counters.attended,
        total_considered: counters.considered,
        total_attended_modified: counters.attended_modified,
        total_considered_modified: counters.considered_modified,
    })
}

/// Both policies over every record in the given calendar month.
pub fn monthly_summary(log: &AttendanceLog, year: i32, month: u32) -> MonthlySummary {
    let mut counters = Counters::default();
    for (date, slots) in log.iter() {
        if date.year() != year || date.month() != month {
            continue;
        }
        for record in slots.values() {
            counters.tally(record.status, record.modified, record.exclude);
        }
    }

    MonthlySummary {
        percent: percentage(counters.attended, counters.considered),
        percent_modified: percentage(counters.attended_modified, counters.considered_modified),
        total_attended: counters.attended,
        total_considered: counters.considered,
        total_attended_modified: counters.attended_modified,
        total_considered_modified: counters.considered_modified,
    }
}

/// `attended / considered * 100` rounded to two decimals; 0 when nothing was
/// considered.
fn percentage(attended: u32, considered: u32) -> f64 {
    if considered == 0 {
        return 0.0;
    }
    let raw = f64::from(attended) / f64::from(considered) * 100.0;
    (raw * 100.0).round() / 100.0
}
