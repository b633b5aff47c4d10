use std::{fmt, str::FromStr};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use serde::Deserialize;
use thiserror::Error;

pub const SECONDS_PER_DAY: u32 = 86_400;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("Invalid time of day {0:?}, expected HH:MM")]
    InvalidTime(String),

    #[error("Program {name:?} ends at 00:00, use 24:00 for a program running until midnight")]
    MidnightEnd { name: String },

    #[error("Program {name:?} must end after it starts ({start} - {end})")]
    EmptyInterval {
        name: String,
        start: DayTime,
        end: DayTime,
    },

    #[error("Program {next:?} starts at {start} before {previous:?} ends at {end}")]
    Overlap {
        previous: String,
        next: String,
        start: DayTime,
        end: DayTime,
    },

    #[error("Unknown day of week {0}, expected 0 (Sunday) to 6 (Saturday)")]
    UnknownDay(u8),

    #[error("Invalid schedule document: {0}")]
    Document(String),
}

/// Wall-clock time of day with second resolution. `24:00` is a valid value and
/// stands for the end of the day (second 86400), never for `00:00`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DayTime(u32);

impl DayTime {
    pub const MIDNIGHT: DayTime = DayTime(0);
    pub const END_OF_DAY: DayTime = DayTime(SECONDS_PER_DAY);

    pub fn from_hm(hours: u32, minutes: u32) -> Option<Self> {
        match (hours, minutes) {
            (24, 0) => Some(Self::END_OF_DAY),
            (0..=23, 0..=59) => Some(Self(hours * 3600 + minutes * 60)),
            _ => None,
        }
    }

    pub fn from_seconds(seconds: u32) -> Option<Self> {
        (seconds <= SECONDS_PER_DAY).then_some(Self(seconds))
    }

    pub fn seconds(self) -> u32 {
        self.0
    }

    pub fn is_end_of_day(self) -> bool {
        self == Self::END_OF_DAY
    }

    pub fn hours(self) -> u32 {
        self.0 / 3600
    }

    pub fn minutes(self) -> u32 {
        (self.0 % 3600) / 60
    }

    /// Local date-time of this time of day on `date`. `24:00` lands on the next day.
    pub fn on(self, date: NaiveDate) -> NaiveDateTime {
        date.and_time(NaiveTime::default()) + TimeDelta::seconds(i64::from(self.0))
    }
}

impl FromStr for DayTime {
    type Err = ScheduleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ScheduleError::InvalidTime(s.to_owned());
        let (hours, minutes) = s.trim().split_once(':').ok_or_else(invalid)?;

        let digits = |part: &str| part.bytes().all(|b| b.is_ascii_digit());
        if hours.is_empty() || hours.len() > 2 || minutes.len() != 2 || !digits(hours) || !digits(minutes) {
            return Err(invalid());
        }

        let hours = hours.parse::<u32>().map_err(|_| invalid())?;
        let minutes = minutes.parse::<u32>().map_err(|_| invalid())?;

        Self::from_hm(hours, minutes).ok_or_else(invalid)
    }
}

impl fmt::Display for DayTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hours(), self.minutes())
    }
}

#[derive(Deserialize)]
struct ProgramDocument {
    start: String,
    end: String,
    name: String,
    #[serde(default)]
    subtitle: Option<String>,
}

/// One entry of a day's timetable, covering the half-open interval `[start, end)`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "ProgramDocument")]
pub struct Program {
    start: DayTime,
    end: DayTime,
    name: String,
    subtitle: Option<String>,
}

impl Program {
    pub fn new(start: DayTime, end: DayTime, name: impl Into<String>) -> Result<Self, ScheduleError> {
        let name = name.into();

        if end == DayTime::MIDNIGHT {
            return Err(ScheduleError::MidnightEnd { name });
        }

        if start >= end {
            return Err(ScheduleError::EmptyInterval { name, start, end });
        }

        Ok(Self {
            start,
            end,
            name,
            subtitle: None,
        })
    }

    /// Builds a program for an interval already known to satisfy `start < end`.
    pub(crate) fn spanning(start: DayTime, end: DayTime, name: impl Into<String>) -> Self {
        debug_assert!(start < end);
        Self {
            start,
            end,
            name: name.into(),
            subtitle: None,
        }
    }

    pub fn parse(start: &str, end: &str, name: impl Into<String>) -> Result<Self, ScheduleError> {
        Self::new(start.parse()?, end.parse()?, name)
    }

    pub fn with_subtitle(mut self, subtitle: impl Into<String>) -> Self {
        self.subtitle = Some(subtitle.into());
        self
    }

    pub fn start(&self) -> DayTime {
        self.start
    }

    pub fn end(&self) -> DayTime {
        self.end
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.subtitle.as_deref()
    }

    pub fn duration_seconds(&self) -> u32 {
        self.end.seconds() - self.start.seconds()
    }

    pub fn contains(&self, seconds: u32) -> bool {
        self.start.seconds() <= seconds && seconds < self.end.seconds()
    }

    /// Elapsed share of the program at `seconds`, clamped to `[0, 100]`.
    pub fn progress_percent(&self, seconds: u32) -> f64 {
        let elapsed = f64::from(seconds) - f64::from(self.start.seconds());
        let percent = elapsed / f64::from(self.duration_seconds()) * 100.0;

        percent.clamp(0.0, 100.0)
    }
}

impl TryFrom<ProgramDocument> for Program {
    type Error = ScheduleError;

    fn try_from(value: ProgramDocument) -> Result<Self, Self::Error> {
        let program = Program::parse(&value.start, &value.end, value.name)?;

        Ok(match value.subtitle {
            Some(subtitle) => program.with_subtitle(subtitle),
            None => program,
        })
    }
}
