//! # Attendance Evaluator
//!
//! The evaluator runs on a fixed cadence (60 seconds by default) and, for
//! each slot scheduled today, decides reminders and attendance commits from
//! the device position:
//!
//! 1. Slots that already have a finalized record for today are skipped, so
//!    each slot gets at most one decision per day.
//! 2. Inside the first ten minutes of a slot, with no record yet and the
//!    device outside the geofence, a reminder notification is emitted. This
//!    writes nothing and may repeat on later ticks.
//! 3. Inside a ten-minute window centered on the slot's midpoint, the
//!    distance to the slot's location decides attended versus not-attended
//!    and the record is committed through the session.
//!
//! The two windows are evaluated independently per slot; they only overlap
//! for slots of twenty minutes or less. A failed location fix aborts the
//! whole tick before any slot is touched.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Datelike, Local, NaiveDate, NaiveDateTime, Timelike};
use geomark_core::errors::{MarkError, MarkResult};
use geomark_core::geo;
use geomark_core::models::{AttendanceRecord, AttendanceStatus, Slot, Weekday};
use tokio::sync::broadcast;
use tokio::time::MissedTickBehavior;

use crate::aggregator;
use crate::providers::{self, GeoPoint, LocationProvider, Notification, NotificationSink};
use crate::session::Session;

/// Radius of the attendance geofence around a slot's location.
pub const GEOFENCE_RADIUS_METERS: f64 = 100.0;

/// Minutes after a slot starts during which the not-at-location reminder can
/// fire.
const REMINDER_WINDOW_MINUTES: i64 = 10;

/// Half-width of the commit window around a slot's midpoint.
const COMMIT_HALF_WINDOW_MINUTES: i64 = 5;

/// What one evaluator tick did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    pub reminders: usize,
    pub committed: usize,
}

pub struct Evaluator {
    location: Arc<dyn LocationProvider>,
    sink: Arc<dyn NotificationSink>,
    location_timeout: Duration,
}

impl Evaluator {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        sink: Arc<dyn NotificationSink>,
        location_timeout: Duration,
    ) -> Self {
        Self {
            location,
            sink,
            location_timeout,
        }
    }

    /// Evaluates every slot scheduled for `now`'s weekday. Aborts with a
    /// `Location` error, after a warning notification, when no position fix
    /// arrives within the budget; nothing is written in that case.
    pub async fn tick(&self, session: &mut Session, now: NaiveDateTime) -> MarkResult<TickReport> {
        let mut report = TickReport::default();

        let Some(today) = Weekday::from_chrono(now.date().weekday()) else {
            return Ok(report);
        };
        let slots: Vec<Slot> = match session.schedule().day(today) {
            Some(day) if !day.slots.is_empty() => day.slots.clone(),
            _ => return Ok(report),
        };

        let here = match providers::locate(self.location.as_ref(), self.location_timeout).await {
            Ok(point) => point,
            Err(err) => {
                self.sink
                    .notify(Notification::warning(format!("Location error: {err}")))
                    .await;
                return Err(err.into());
            }
        };

        let date = now.date();
        let now_minutes =
            i64::from(geo::minutes_since_midnight(now.time().hour(), now.time().minute()));

        for slot in slots {
            let start = i64::from(slot.from.minutes());
            let end = i64::from(slot.to.minutes());
            let half_time = start + (end - start) / 2;

            // Already decided today; idempotent per day.
            if matches!(
                session.records().record(date, &slot.id),
                Some(record) if record.status != AttendanceStatus::Pending
            ) {
                continue;
            }

            let in_first_ten =
                now_minutes > start && now_minutes <= start + REMINDER_WINDOW_MINUTES;
            if in_first_ten && session.records().record(date, &slot.id).is_none() {
                let distance = distance_to_slot(&here, &slot);
                if distance >= GEOFENCE_RADIUS_METERS {
                    self.sink
                        .notify(Notification::warning(format!(
                            "Reminder: You are not at the location for {} ({}-{})!",
                            slot.subject_name, slot.from, slot.to
                        )))
                        .await;
                    report.reminders += 1;
                }
            }

            let in_commit_window = now_minutes >= half_time - COMMIT_HALF_WINDOW_MINUTES
                && now_minutes <= half_time + COMMIT_HALF_WINDOW_MINUTES;
            if in_commit_window {
                let distance = distance_to_slot(&here, &slot);
                let status = if distance < GEOFENCE_RADIUS_METERS {
                    AttendanceStatus::Attended
                } else {
                    AttendanceStatus::NotAttended
                };

                let record = AttendanceRecord {
                    status,
                    modified: false,
                    subject_id: slot.subject_id.clone(),
                    subject_name: slot.subject_name.clone(),
                    time_slot: slot.time_range(),
                    exclude: slot.exclude,
                    location_name: slot.location.label(),
                };

                match session.commit_record(date, &slot.id, record).await {
                    Ok(()) => {
                        self.sink
                            .notify(Notification::success(format!(
                                "Attendance for {} ({}-{}) marked as {}.",
                                slot.subject_name, slot.from, slot.to, status
                            )))
                            .await;
                        report.committed += 1;
                    }
                    Err(err) => {
                        tracing::error!("Failed to persist attendance record: {err}");
                        self.sink
                            .notify(Notification::error(format!(
                                "Could not save attendance for {}: {err}",
                                slot.subject_name
                            )))
                            .await;
                    }
                }
            }
        }

        Ok(report)
    }

    /// Emits the below-minimum warning when the current month's
    /// modified-policy percentage has fallen under the configured threshold.
    pub async fn warn_if_below_minimum(&self, session: &Session, today: NaiveDate) {
        let summary =
            aggregator::monthly_summary(session.records(), today.year(), today.month());
        let minimum = f64::from(session.min_attendance_percent());

        if summary.total_considered_modified > 0 && summary.percent_modified < minimum {
            self.sink
                .notify(Notification::warning(format!(
                    "Warning: Your attendance ({}%) is below the minimum required ({}%).",
                    summary.percent_modified,
                    session.min_attendance_percent()
                )))
                .await;
        }
    }

    /// Drives [`Self::tick`] on the given period and applies store-side
    /// document changes between ticks. Location errors skip the tick;
    /// nothing here is fatal.
    pub async fn run(&self, session: &mut Session, period: Duration) -> MarkResult<()> {
        let mut updates = Some(session.subscribe());
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let now = Local::now().naive_local();
                    match self.tick(session, now).await {
                        Ok(report) if report.committed > 0 => {
                            self.warn_if_below_minimum(session, now.date()).await;
                        }
                        Ok(_) => {}
                        Err(MarkError::Location(err)) => {
                            tracing::warn!("Skipping evaluator tick: {err}");
                        }
                        Err(err) => {
                            tracing::error!("Evaluator tick failed: {err}");
                        }
                    }
                }
                update = next_update(&mut updates) => {
                    match update {
                        Ok(document) => session.apply_snapshot(document),
                        Err(broadcast::error::RecvError::Lagged(skipped)) => {
                            tracing::warn!("Dropped {skipped} store updates; resyncing on next event");
                        }
                        Err(broadcast::error::RecvError::Closed) => {
                            updates = None;
                        }
                    }
                }
            }
        }
    }
}

fn distance_to_slot(here: &GeoPoint, slot: &Slot) -> f64 {
    geo::haversine_distance_meters(here.lat, here.lng, slot.location.lat, slot.location.lng)
}

/// Waits for the next store update, or forever once the feed has closed.
async fn next_update(
    updates: &mut Option<broadcast::Receiver<geomark_core::models::UserDocument>>,
) -> Result<geomark_core::models::UserDocument, broadcast::error::RecvError> {
    match updates {
        Some(receiver) => receiver.recv().await,
        None => std::future::pending().await,
    }
}
