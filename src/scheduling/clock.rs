use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::program::{DayTime, SECONDS_PER_DAY};

pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Wall-clock reading in the station's timezone, independent of the host's local zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilTime {
    date: NaiveDate,
    seconds: u32,
}

impl CivilTime {
    pub fn new(date: NaiveDate, seconds: u32) -> Option<Self> {
        (seconds < SECONDS_PER_DAY).then_some(Self { date, seconds })
    }

    pub fn from_naive(local: NaiveDateTime) -> Self {
        Self {
            date: local.date(),
            seconds: local.num_seconds_from_midnight(),
        }
    }

    pub fn from_utc(now: DateTime<Utc>, timezone: Tz) -> Self {
        Self::from_naive(now.with_timezone(&timezone).naive_local())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    pub fn weekday(&self) -> Weekday {
        self.date.weekday()
    }

    pub fn naive(&self) -> NaiveDateTime {
        DayTime::from_seconds(self.seconds)
            .unwrap_or(DayTime::MIDNIGHT)
            .on(self.date)
    }
}

#[cfg(test)]
pub(crate) mod test_clock {
    use chrono::{DateTime, TimeDelta, Utc};
    use tokio::time::Instant;

    use super::Clock;

    /// Clock advancing with tokio's (possibly paused) timer.
    pub struct TokioClock {
        origin: DateTime<Utc>,
        started: Instant,
    }

    impl TokioClock {
        pub fn starting_at(origin: DateTime<Utc>) -> Self {
            Self {
                origin,
                started: Instant::now(),
            }
        }
    }

    impl Clock for TokioClock {
        fn now(&self) -> DateTime<Utc> {
            let elapsed = TimeDelta::from_std(self.started.elapsed()).unwrap();
            self.origin + elapsed
        }
    }
}
