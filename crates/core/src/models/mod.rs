pub mod attendance;
pub mod document;
pub mod schedule;
pub mod subject;

pub use attendance::{AttendanceLog, AttendanceRecord, AttendanceStatus};
pub use document::{DocumentPatch, UserDocument};
pub use schedule::{ClockTime, DaySchedule, Location, Schedule, Slot, Weekday};
pub use subject::Subject;
