//! iCalendar (RFC 5545) reminders for upcoming programs.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Days, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

use crate::{
    program::Program,
    scheduling::{CivilTime, SpecialBroadcast},
};

pub const ICS_MIME: &str = "text/calendar;charset=utf-8";

const PRODID: &str = "-//Rádio 520//WebApp//PT";
const LOCAL_FORMAT: &str = "%Y%m%dT%H%M%S";
const UTC_FORMAT: &str = "%Y%m%dT%H%M%SZ";
const MAX_LINE_OCTETS: usize = 75;

/// Station details embedded in every exported event.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StationInfo {
    pub name: String,
    pub url: String,
    pub uid_domain: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CalendarEvent {
    uid: String,
    stamp: DateTime<Utc>,
    start: NaiveDateTime,
    end: NaiveDateTime,
    timezone: Tz,
    summary: String,
    description: String,
    location: String,
    file_stem: String,
}

impl CalendarEvent {
    /// Event for a program airing today, or tomorrow when `rollover` is set.
    pub fn for_program(
        program: &Program,
        rollover: bool,
        now: DateTime<Utc>,
        timezone: Tz,
        station: &StationInfo,
    ) -> Self {
        let today = CivilTime::from_utc(now, timezone).date();
        let date = if rollover { today + Days::new(1) } else { today };
        let uid_stem: String = program
            .name()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        Self::on_date(program, date, &uid_stem, slug(program.name()), now, timezone, station)
    }

    /// Event for the next occurrence of a weekly special broadcast.
    /// The UID and file name come from the reminder key, not the display name.
    pub fn for_special(
        special: &SpecialBroadcast,
        now: DateTime<Utc>,
        timezone: Tz,
        station: &StationInfo,
    ) -> Self {
        let civil = CivilTime::from_utc(now, timezone);
        let date = special.next_airing_date(&civil);
        let file_stem = slug(&special.reminder_key);
        let uid_stem = file_stem.replace('-', "");

        Self::on_date(&special.program, date, &uid_stem, file_stem, now, timezone, station)
    }

    fn on_date(
        program: &Program,
        date: NaiveDate,
        uid_stem: &str,
        file_stem: String,
        now: DateTime<Utc>,
        timezone: Tz,
        station: &StationInfo,
    ) -> Self {
        let start = program.start().on(date);
        let end = program.end().on(date);
        let name = program.name();

        Self {
            uid: format!("{}-{uid_stem}@{}", start.format(LOCAL_FORMAT), station.uid_domain),
            stamp: now,
            start,
            end,
            timezone,
            summary: name.to_owned(),
            description: format!(
                "Lembrete para ouvir {name} na {}. Acesse: {}",
                station.name, station.url
            ),
            location: station.name.clone(),
            file_stem,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn file_name(&self) -> String {
        format!("lembrete-{}.ics", self.file_stem)
    }

    pub fn to_ics(&self) -> String {
        let tzid = self.timezone.name();
        let lines = [
            "BEGIN:VCALENDAR".to_owned(),
            "VERSION:2.0".to_owned(),
            format!("PRODID:{PRODID}"),
            "BEGIN:VEVENT".to_owned(),
            format!("UID:{}", escape_text(&self.uid)),
            format!("DTSTAMP:{}", self.stamp.format(UTC_FORMAT)),
            format!("DTSTART;TZID={tzid}:{}", self.start.format(LOCAL_FORMAT)),
            format!("DTEND;TZID={tzid}:{}", self.end.format(LOCAL_FORMAT)),
            format!("SUMMARY:{}", escape_text(&self.summary)),
            format!("DESCRIPTION:{}", escape_text(&self.description)),
            format!("LOCATION:{}", escape_text(&self.location)),
            "END:VEVENT".to_owned(),
            "END:VCALENDAR".to_owned(),
        ];

        let mut ics = String::new();
        for line in &lines {
            ics.push_str(&fold_line(line));
            ics.push_str("\r\n");
        }
        ics
    }

    /// Writes the event into `dir` under [`Self::file_name`].
    pub async fn save(&self, dir: &Path) -> std::io::Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(self.file_name());
        tokio::fs::write(&path, self.to_ics()).await?;

        log::info!("Calendar reminder for {} written to {}", self.summary, path.display());
        Ok(path)
    }
}

/// Lowercased name with each whitespace run replaced by `-`.
pub fn slug(name: &str) -> String {
    name.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

fn escape_text(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            ';' => escaped.push_str("\\;"),
            ',' => escaped.push_str("\\,"),
            '\n' => escaped.push_str("\\n"),
            '\r' => {}
            other => escaped.push(other),
        }
    }
    escaped
}

// Continuation lines start with a single space, which counts towards the limit.
fn fold_line(line: &str) -> String {
    let mut folded = String::with_capacity(line.len());
    let mut width = 0;

    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > MAX_LINE_OCTETS {
            folded.push_str("\r\n ");
            width = 1;
        }
        folded.push(ch);
        width += len;
    }

    folded
}
