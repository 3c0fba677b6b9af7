use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::errors::MarkError;
use crate::geo;

/// A zero-padded "HH:MM" wall-clock time. Ordering matches the lexicographic
/// ordering of the padded string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    minutes: u16,
}

impl ClockTime {
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self {
            minutes: geo::minutes_since_midnight(hours, minutes) as u16,
        }
    }

    /// Minutes since midnight.
    pub fn minutes(&self) -> u32 {
        u32::from(self.minutes)
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.minutes / 60, self.minutes % 60)
    }
}

impl FromStr for ClockTime {
    type Err = MarkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let time = NaiveTime::parse_from_str(s, "%H:%M")
            .map_err(|_| MarkError::Validation(format!("Invalid time of day: {s:?}")))?;
        Ok(Self::new(time.hour(), time.minute()))
    }
}

impl TryFrom<String> for ClockTime {
    type Error = MarkError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}

/// Working-week days. Attendance is only tracked Monday through Friday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
}

impl Weekday {
    pub const ALL: [Weekday; 5] = [
        Weekday::Monday,
        Weekday::Tuesday,
        Weekday::Wednesday,
        Weekday::Thursday,
        Weekday::Friday,
    ];

    /// None on Saturday and Sunday.
    pub fn from_chrono(day: chrono::Weekday) -> Option<Self> {
        match day {
            chrono::Weekday::Mon => Some(Weekday::Monday),
            chrono::Weekday::Tue => Some(Weekday::Tuesday),
            chrono::Weekday::Wed => Some(Weekday::Wednesday),
            chrono::Weekday::Thu => Some(Weekday::Thursday),
            chrono::Weekday::Fri => Some(Weekday::Friday),
            chrono::Weekday::Sat | chrono::Weekday::Sun => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Weekday::Monday => "Monday",
            Weekday::Tuesday => "Tuesday",
            Weekday::Wednesday => "Wednesday",
            Weekday::Thursday => "Thursday",
            Weekday::Friday => "Friday",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Location {
    /// The display label for the location: its name when one was given,
    /// otherwise the raw coordinates.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => format!("{}, {}", self.lat, self.lng),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Slot {
    pub id: String,
    pub from: ClockTime,
    pub to: ClockTime,
    pub subject_id: String,
    pub subject_name: String,
    pub location: Location,
    #[serde(default)]
    pub exclude: bool,
}

impl Slot {
    /// The "HH:MM-HH:MM" label snapshotted into attendance records.
    pub fn time_range(&self) -> String {
        format!("{}-{}", self.from, self.to)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    pub day: Weekday,
    #[serde(default)]
    pub slots: Vec<Slot>,
}

impl DaySchedule {
    pub fn empty(day: Weekday) -> Self {
        Self {
            day,
            slots: Vec::new(),
        }
    }
}

/// The full weekly schedule: one entry per weekday Monday through Friday.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Schedule {
    days: Vec<DaySchedule>,
}

impl Default for Schedule {
    fn default() -> Self {
        let mut schedule = Self { days: Vec::new() };
        schedule.normalize();
        schedule
    }
}

impl Schedule {
    /// Synthesizes any missing weekday as an empty day, orders the days
    /// Monday through Friday, and keeps each day's slots sorted by start time.
    pub fn normalize(&mut self) {
        for day in Weekday::ALL {
            if !self.days.iter().any(|d| d.day == day) {
                self.days.push(DaySchedule::empty(day));
            }
        }
        self.days.sort_by_key(|d| d.day);
        for day in &mut self.days {
            day.slots.sort_by(|a, b| a.from.cmp(&b.from));
        }
    }

    pub fn day(&self, day: Weekday) -> Option<&DaySchedule> {
        self.days.iter().find(|d| d.day == day)
    }

    pub fn day_mut(&mut self, day: Weekday) -> &mut DaySchedule {
        if !self.days.iter().any(|d| d.day == day) {
            self.normalize();
        }
        self.days
            .iter_mut()
            .find(|d| d.day == day)
            .expect("normalize always inserts every weekday")
    }

    pub fn days(&self) -> &[DaySchedule] {
        &self.days
    }
}
