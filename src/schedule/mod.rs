pub mod radio520;

use std::{collections::BTreeMap, path::Path};

use chrono::Weekday;

use crate::program::{DayTime, Program, ScheduleError};

pub const DAYS_PER_WEEK: usize = 7;

/// Timetable of one week, indexed by day with 0 = Sunday.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WeeklySchedule {
    days: [Vec<Program>; DAYS_PER_WEEK],
}

impl WeeklySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the programs of one day. Programs must be in chronological order and
    /// must not overlap; gaps are accepted and reported by the resolver as filler.
    pub fn with_day(mut self, weekday: Weekday, programs: Vec<Program>) -> Result<Self, ScheduleError> {
        validate_day(&programs)?;

        let gaps = count_gaps(&programs);
        if gaps > 0 {
            log::warn!("Schedule for {weekday} has {gaps} gap(s) not covered by any program");
        }

        self.days[day_index(weekday)] = programs;
        Ok(self)
    }

    pub fn day(&self, weekday: Weekday) -> &[Program] {
        &self.days[day_index(weekday)]
    }

    pub fn days(&self) -> impl Iterator<Item = (Weekday, &[Program])> {
        (0..DAYS_PER_WEEK).map(|index| (weekday_from_index(index), self.days[index].as_slice()))
    }

    pub fn is_empty(&self) -> bool {
        self.days.iter().all(Vec::is_empty)
    }

    /// Parses a document shaped as `{ "0": [program, ...], ..., "6": [...] }`.
    pub fn from_json_str(document: &str) -> Result<Self, ScheduleError> {
        let days: BTreeMap<u8, Vec<Program>> = serde_json::from_str(document)
            .map_err(|e| ScheduleError::Document(e.to_string()))?;

        days.into_iter().try_fold(Self::new(), |schedule, (day, programs)| {
            let index = usize::from(day);
            if index >= DAYS_PER_WEEK {
                return Err(ScheduleError::UnknownDay(day));
            }

            schedule.with_day(weekday_from_index(index), programs)
        })
    }

    pub async fn from_json_file(path: &Path) -> anyhow::Result<Self> {
        let document = tokio::fs::read_to_string(path).await?;
        let schedule = Self::from_json_str(&document)?;

        log::info!("Loaded weekly schedule from {}", path.display());
        Ok(schedule)
    }
}

pub fn day_index(weekday: Weekday) -> usize {
    weekday.num_days_from_sunday() as usize
}

pub fn weekday_from_index(index: usize) -> Weekday {
    match index % DAYS_PER_WEEK {
        0 => Weekday::Sun,
        1 => Weekday::Mon,
        2 => Weekday::Tue,
        3 => Weekday::Wed,
        4 => Weekday::Thu,
        5 => Weekday::Fri,
        _ => Weekday::Sat,
    }
}

fn validate_day(programs: &[Program]) -> Result<(), ScheduleError> {
    for pair in programs.windows(2) {
        let (previous, next) = (&pair[0], &pair[1]);
        if next.start() < previous.end() {
            return Err(ScheduleError::Overlap {
                previous: previous.name().to_owned(),
                next: next.name().to_owned(),
                start: next.start(),
                end: previous.end(),
            });
        }
    }

    Ok(())
}

fn count_gaps(programs: &[Program]) -> usize {
    let (Some(first), Some(last)) = (programs.first(), programs.last()) else {
        return 0;
    };

    let inner = programs
        .windows(2)
        .filter(|pair| pair[1].start() > pair[0].end())
        .count();

    inner + usize::from(first.start() != DayTime::MIDNIGHT) + usize::from(!last.end().is_end_of_day())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(start: &str, end: &str, name: &str) -> Program {
        Program::parse(start, end, name).unwrap()
    }

    #[test]
    fn rejects_overlapping_programs() {
        let result = WeeklySchedule::new().with_day(
            Weekday::Sun,
            vec![program("20:00", "21:10", "ZONA MISTA"), program("21:00", "24:00", "TOP BILLBOARD")],
        );

        assert!(matches!(result, Err(ScheduleError::Overlap { .. })));
    }

    #[test]
    fn rejects_out_of_order_programs() {
        let result = WeeklySchedule::new().with_day(
            Weekday::Mon,
            vec![program("10:00", "11:00", "LATER"), program("08:00", "09:00", "EARLIER")],
        );

        assert!(matches!(result, Err(ScheduleError::Overlap { .. })));
    }

    #[test]
    fn accepts_gaps() {
        let schedule = WeeklySchedule::new()
            .with_day(
                Weekday::Tue,
                vec![program("08:00", "09:00", "MORNING"), program("10:00", "11:00", "LATE MORNING")],
            )
            .unwrap();

        assert_eq!(schedule.day(Weekday::Tue).len(), 2);
        assert_eq!(count_gaps(schedule.day(Weekday::Tue)), 3);
        assert!(schedule.day(Weekday::Wed).is_empty());
    }

    #[test]
    fn empty_only_without_programs() {
        assert!(WeeklySchedule::new().is_empty());
        assert!(WeeklySchedule::from_json_str(r#"{ "1": [] }"#).unwrap().is_empty());

        let schedule = WeeklySchedule::new()
            .with_day(Weekday::Fri, vec![program("08:00", "09:00", "MORNING")])
            .unwrap();
        assert!(!schedule.is_empty());
    }

    #[test]
    fn parses_document_keyed_by_day_number() {
        let schedule = WeeklySchedule::from_json_str(
            r#"{
                "0": [
                    { "start": "20:00", "end": "21:10", "name": "ZONA MISTA" },
                    { "start": "21:10", "end": "24:00", "name": "TOP BILLBOARD" }
                ],
                "6": [{ "start": "00:00", "end": "24:00", "name": "SABADO" }]
            }"#,
        )
        .unwrap();

        assert_eq!(schedule.day(Weekday::Sun).len(), 2);
        assert_eq!(schedule.day(Weekday::Sat)[0].name(), "SABADO");
        assert!(schedule.day(Weekday::Mon).is_empty());
    }

    #[test]
    fn document_with_unknown_day_is_rejected() {
        let result = WeeklySchedule::from_json_str(r#"{ "7": [] }"#);

        assert_eq!(result, Err(ScheduleError::UnknownDay(7)));
    }

    #[test]
    fn weekday_index_round_trips() {
        for index in 0..DAYS_PER_WEEK {
            assert_eq!(day_index(weekday_from_index(index)), index);
        }
    }
}
