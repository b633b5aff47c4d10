use chrono::{DateTime, TimeDelta, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    program::{DayTime, Program, SECONDS_PER_DAY},
    schedule::WeeklySchedule,
};

use super::clock::CivilTime;

/// Where "next" points once the last program of the day is on air.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RolloverPolicy {
    /// First program of the following day.
    #[default]
    FollowingDay,
    /// First program of the same day's list.
    SameDay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScheduleInfo {
    pub current: Program,
    pub current_index: Option<usize>,
    pub next: Program,
    pub progress_percent: f64,
    pub is_next_day_rollover: bool,
    pub until_next: Option<TimeDelta>,
}

impl ScheduleInfo {
    pub fn is_filler(&self) -> bool {
        self.current_index.is_none()
    }
}

pub struct ScheduleResolver {
    schedule: WeeklySchedule,
    timezone: Tz,
    policy: RolloverPolicy,
    filler_name: String,
}

impl ScheduleResolver {
    pub fn new(
        schedule: WeeklySchedule,
        timezone: Tz,
        policy: RolloverPolicy,
        filler_name: impl Into<String>,
    ) -> Self {
        Self {
            schedule,
            timezone,
            policy,
            filler_name: filler_name.into(),
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    pub fn schedule(&self) -> &WeeklySchedule {
        &self.schedule
    }

    pub fn civil_time(&self, now: DateTime<Utc>) -> CivilTime {
        CivilTime::from_utc(now, self.timezone)
    }

    pub fn resolve(&self, now: DateTime<Utc>) -> ScheduleInfo {
        self.resolve_at(&self.civil_time(now))
    }

    pub fn resolve_at(&self, civil: &CivilTime) -> ScheduleInfo {
        let today = self.schedule.day(civil.weekday());
        let t = civil.seconds();

        let current_index = today.iter().position(|program| program.contains(t));

        let (current, progress_percent) = match current_index {
            Some(index) => (today[index].clone(), today[index].progress_percent(t)),
            None => (self.filler_for_gap(today, t), 0.0),
        };

        let upcoming = match current_index {
            Some(index) => today.get(index + 1),
            None => today.iter().find(|program| program.start().seconds() > t),
        };

        let (next, is_next_day_rollover) = match upcoming {
            Some(program) => (Some(program.clone()), false),
            None => (self.rollover_program(civil).cloned(), true),
        };

        let until_next = next.as_ref().map(|program| {
            let mut remaining = i64::from(program.start().seconds()) - i64::from(t);
            if is_next_day_rollover {
                remaining += i64::from(SECONDS_PER_DAY);
            }
            TimeDelta::seconds(remaining)
        });

        ScheduleInfo {
            current,
            current_index,
            next: next.unwrap_or_else(|| self.filler_for_gap(&[], 0)),
            progress_percent,
            is_next_day_rollover: is_next_day_rollover && until_next.is_some(),
            until_next,
        }
    }

    fn rollover_program(&self, civil: &CivilTime) -> Option<&Program> {
        let today = self.schedule.day(civil.weekday()).first();
        let tomorrow = self.schedule.day(civil.weekday().succ()).first();

        match self.policy {
            RolloverPolicy::FollowingDay => tomorrow.or(today),
            RolloverPolicy::SameDay => today.or(tomorrow),
        }
    }

    /// Generic filler spanning the uncovered stretch of the day around `t`.
    fn filler_for_gap(&self, programs: &[Program], t: u32) -> Program {
        let start = programs
            .iter()
            .map(Program::end)
            .filter(|end| end.seconds() <= t)
            .max()
            .unwrap_or(DayTime::MIDNIGHT);

        let end = programs
            .iter()
            .map(Program::start)
            .filter(|start| start.seconds() > t)
            .min()
            .unwrap_or(DayTime::END_OF_DAY);

        Program::spanning(start, end, self.filler_name.as_str())
    }
}
