use std::fmt;

use chrono::{NaiveDate, TimeDelta, Weekday};

use crate::program::{DayTime, Program, SECONDS_PER_DAY};

use super::clock::CivilTime;

/// A program that airs once a week and gets its own countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialBroadcast {
    pub weekday: Weekday,
    pub program: Program,
    pub reminder_key: String,
}

impl SpecialBroadcast {
    pub fn new(weekday: Weekday, program: Program, reminder_key: impl Into<String>) -> Self {
        Self {
            weekday,
            program,
            reminder_key: reminder_key.into(),
        }
    }

    /// Days until the next airing. Zero while the start instant has not passed today.
    pub fn days_until(&self, civil: &CivilTime) -> u32 {
        let target = self.weekday.num_days_from_sunday();
        let current = civil.weekday().num_days_from_sunday();
        let days = (target + 7 - current) % 7;

        if days == 0 && civil.seconds() > self.program.start().seconds() {
            7
        } else {
            days
        }
    }

    pub fn countdown(&self, civil: &CivilTime) -> Countdown {
        let days = i64::from(self.days_until(civil));
        let remaining = days * i64::from(SECONDS_PER_DAY)
            + i64::from(self.program.start().seconds())
            - i64::from(civil.seconds());

        Countdown::from_seconds(remaining)
    }

    pub fn next_airing_date(&self, civil: &CivilTime) -> NaiveDate {
        civil.date() + TimeDelta::days(i64::from(self.days_until(civil)))
    }

    pub fn starts_at(&self) -> DayTime {
        self.program.start()
    }
}

/// Remaining time rendered as zero-padded `HH:MM:SS`; hours keep counting past 24.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Countdown(u64);

impl Countdown {
    pub fn from_seconds(seconds: i64) -> Self {
        Self(seconds.max(0) as u64)
    }

    pub fn total_seconds(self) -> u64 {
        self.0
    }

    pub fn is_due(self) -> bool {
        self.0 == 0
    }

    pub fn parts(self) -> (u64, u64, u64) {
        (self.0 / 3600, (self.0 % 3600) / 60, self.0 % 60)
    }
}

impl From<TimeDelta> for Countdown {
    fn from(value: TimeDelta) -> Self {
        Self::from_seconds(value.num_seconds())
    }
}

impl fmt::Display for Countdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (hours, minutes, seconds) = self.parts();
        write!(f, "{hours:02}:{minutes:02}:{seconds:02}")
    }
}

pub fn weekday_name_pt(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sun => "domingo",
        Weekday::Mon => "segunda-feira",
        Weekday::Tue => "terça-feira",
        Weekday::Wed => "quarta-feira",
        Weekday::Thu => "quinta-feira",
        Weekday::Fri => "sexta-feira",
        Weekday::Sat => "sábado",
    }
}
