//! Rádio 520 weekly programming, in São Paulo civil time.

use chrono::Weekday;

use super::WeeklySchedule;
use crate::program::{Program, ScheduleError};

pub const FILLER_PROGRAM_NAME: &str = "Música na 520";

type Entry = (&'static str, &'static str, &'static str, Option<&'static str>);

pub fn weekly_schedule() -> Result<WeeklySchedule, ScheduleError> {
    [
        (Weekday::Sun, SUNDAY),
        (Weekday::Mon, MONDAY),
        (Weekday::Tue, TUESDAY),
        (Weekday::Wed, WEDNESDAY),
        (Weekday::Thu, THURSDAY),
        (Weekday::Fri, FRIDAY),
        (Weekday::Sat, SATURDAY),
    ]
    .into_iter()
    .try_fold(WeeklySchedule::new(), |schedule, (weekday, entries)| {
        schedule.with_day(weekday, programs(entries)?)
    })
}

fn programs(entries: &[Entry]) -> Result<Vec<Program>, ScheduleError> {
    entries
        .iter()
        .map(|&(start, end, name, subtitle)| {
            let program = Program::parse(start, end, name)?;
            Ok(match subtitle {
                Some(subtitle) => program.with_subtitle(subtitle),
                None => program,
            })
        })
        .collect()
}

const SUNDAY: &[Entry] = &[
    ("00:00", "02:00", "520 LOVE HITS", None),
    ("02:00", "05:00", "SUPERSEQUÊNCIA • DOMINGO", None),
    ("05:00", "07:00", "ORASOM 520", None),
    ("07:00", "11:50", "SUPERSEQUÊNCIA • DOMINGO", None),
    ("11:50", "12:00", "REP520 • DOM", None),
    ("12:00", "14:00", "ZIRIGUIDUM", None),
    ("14:00", "14:10", "REP520 • DOM", None),
    ("14:10", "18:00", "BR520", None),
    ("18:00", "18:10", "HORA DA VE MARIA - DOMINGO", None),
    ("18:10", "20:00", "A ERA DO ROCK #05", None),
    ("20:00", "21:10", "ZONA MISTA", Some("A resenha mais legal e ordinária do rádio.")),
    ("21:10", "24:00", "TOP BILLBOARD", None),
];

const MONDAY: &[Entry] = &[
    ("00:00", "01:20", "MÚSICA DO DIA 520 • SEG", Some("playlist encerra às 00:12")),
    ("01:20", "01:30", "REP520 • SEG", None),
    ("01:30", "05:00", "INSÔNIA", None),
    ("05:00", "08:00", "GIRO520 • SEG", None),
    ("08:00", "08:10", "MÚSICA DO DIA 520 • SEG", None),
    ("08:10", "10:00", "CAFEINA", None),
    ("10:00", "10:10", "REP520 • SEG", None),
    ("10:10", "13:10", "POP SHOW", None),
    ("13:10", "13:20", "MÚSICA DO DIA 520 • SEG", None),
    ("13:20", "16:50", "MARATONA • SEG", None),
    ("16:50", "17:00", "RESENHA 520", None),
    ("17:00", "18:00", "BR520", None),
    ("18:00", "18:10", "HORA DA AVE MARIA - SEGUNDA", None),
    ("18:10", "20:00", "MIX520 GEN", None),
    ("20:00", "20:10", "REP520 • SEG", None),
    ("20:10", "22:00", "RÁDIO520 - LIVE CONCERT", None),
    ("22:00", "22:10", "MÚSICA DO DIA 520 • SEG", None),
    ("22:10", "24:00", "RADIO520 CLASSIC HITS", None),
];

const TUESDAY: &[Entry] = &[
    ("00:00", "01:20", "MUSICA DO DIA • TER", Some("playlist encerra às 00:11")),
    ("01:20", "01:30", "REP520 • TER", None),
    ("01:30", "05:00", "INSÔNIA", None),
    ("05:00", "08:00", "GIRO520 • TER", None),
    ("08:00", "08:10", "MUSICA DO DIA • TER", None),
    ("08:10", "10:00", "CAFEINA", None),
    ("10:00", "10:10", "REP520 • TER", None),
    ("10:10", "13:00", "POP SHOW", None),
    ("13:00", "13:10", "MUSICA DO DIA • TER", None),
    ("13:10", "16:50", "MARATONA 520 • TERÇA", None),
    ("16:50", "17:00", "RESENHA 520", None),
    ("17:00", "18:00", "BR520", None),
    ("18:00", "18:10", "HORA DA AVE MARIA - TERÇA-FEIRA", None),
    ("18:10", "20:00", "MIX520 GEN", None),
    ("20:00", "20:10", "REP520 • TER", None),
    ("20:10", "22:00", "BUSINESS ROCK", None),
    ("22:00", "22:10", "MUSICA DO DIA • TER", None),
    ("22:10", "24:00", "RADIO520 CLASSIC HITS", None),
];

const WEDNESDAY: &[Entry] = &[
    ("00:00", "01:20", "MÚSICA DO DIA • QUA", Some("playlist encerra às 00:11")),
    ("01:20", "01:30", "REP520 • QUA", None),
    ("01:30", "05:00", "INSÔNIA", None),
    ("05:00", "08:00", "GIRO 520 • QUA", None),
    ("08:00", "08:10", "MÚSICA DO DIA • QUA", None),
    ("08:10", "10:00", "CAFEINA", None),
    ("10:00", "10:10", "REP520 • QUA", None),
    ("10:10", "13:10", "POP SHOW", None),
    ("13:10", "13:20", "MÚSICA DO DIA • QUA", None),
    ("13:20", "16:50", "MARATONA QUARTA", None),
    ("16:50", "17:00", "RESENHA 520", None),
    ("17:00", "18:00", "BR520", None),
    ("18:00", "18:10", "HORA DA AVE MARIA - QUARTA-FEIRA", None),
    ("18:10", "20:00", "MIX520 COM GUI MYNSSEN", None),
    ("20:00", "20:10", "REP520 • QUA", None),
    ("20:10", "22:00", "BEATS520", None),
    ("22:00", "22:10", "MÚSICA DO DIA • QUA", None),
    ("22:10", "24:00", "RADIO520 CLASSIC HITS", None),
];

const THURSDAY: &[Entry] = &[
    ("00:00", "01:20", "MÚSICA DO DIA • QUI", Some("playlist encerra às 00:11")),
    ("01:20", "01:30", "REP520 • QUI", None),
    ("01:30", "05:00", "INSÔNIA", None),
    ("05:00", "08:00", "GIRO520 • QUI", None),
    ("08:00", "08:10", "MÚSICA DO DIA • QUI", None),
    ("08:10", "10:00", "CAFEINA", None),
    ("10:00", "10:10", "REP520 • QUI", None),
    ("10:10", "13:10", "POP SHOW", None),
    ("13:10", "13:20", "MÚSICA DO DIA • QUI", None),
    ("13:20", "16:50", "MARATONA QUINTA", None),
    ("16:50", "17:00", "RESENHA 520", None),
    ("17:00", "18:00", "BR520", None),
    ("18:00", "18:10", "HORA DA AVE MARIA", None),
    ("18:10", "20:00", "MIX520 COM GUI MYNSSEN", None),
    ("20:00", "20:10", "REP520 • QUI", None),
    ("20:10", "21:50", "RÁDIO520 TOP20 #SEM16", Some("playlist encerra às 21:42")),
    ("21:50", "22:00", "RADIO520 CLASSIC HITS", None),
    ("22:00", "22:10", "MÚSICA DO DIA • QUI", None),
    ("22:10", "24:00", "RADIO520 CLASSIC HITS", None),
];

const FRIDAY: &[Entry] = &[
    ("00:00", "01:20", "MÚSICA DO DIA • SEX", Some("playlist encerra às 00:10")),
    ("01:20", "01:30", "REP 520 • SEX", None),
    ("01:30", "05:00", "INSÔNIA", None),
    ("05:00", "08:00", "GIRO520 • SEX", None),
    ("08:00", "08:10", "MÚSICA DO DIA • SEX", None),
    ("08:10", "10:00", "CAFEINA", None),
    ("10:00", "10:10", "REP 520 • SEX", None),
    ("10:10", "13:10", "POP SHOW", None),
    ("13:10", "13:20", "MÚSICA DO DIA • SEX", None),
    ("13:20", "16:50", "MARATONA • SEXTA", None),
    ("16:50", "17:00", "RESENHA 520", None),
    ("17:00", "18:00", "BR520", None),
    ("18:00", "18:10", "HORA DA AVE MARIA - SEXTA", None),
    ("18:10", "20:00", "MIX520 COM GUI MYNSSEN", None),
    ("20:00", "20:10", "REPÓRTER 520", None),
    ("20:10", "22:00", "A ERA DO ROCK #05", None),
    ("22:00", "22:10", "MÚSICA DO DIA • SEX", None),
    ("22:10", "24:00", "RADIO520 CLASSIC HITS", None),
];

const SATURDAY: &[Entry] = &[
    ("00:00", "00:10", "MÚSICA DO DIA • SAB", None),
    ("00:10", "02:00", "520 LOVE HITS", None),
    ("02:00", "10:10", "SUPERSEQUENCIA • SÁBADO", None),
    ("10:10", "10:20", "REP520 • SAB", None),
    ("10:20", "11:50", "RÁDIO520 TOP20 #SEM16", None),
    ("11:50", "12:00", "VIVA MELHOR com LU SKYLARK", None),
    ("12:00", "14:00", "ZIRIGUIDUM", None),
    ("14:00", "14:10", "MÚSICA DO DIA • SAB", None),
    ("14:10", "18:00", "MARATONA SAB", None),
    ("18:00", "18:10", "HORA DA AVE MARIA - SÁBADO", None),
    ("18:10", "19:50", "BR520", None),
    ("19:50", "20:00", "MÚSICA DO DIA • SAB", None),
    ("20:00", "22:00", "RADIO520 DANCE CLUB", None),
    ("22:00", "24:00", "RADIO520, A SUA RÁDIO", None),
];

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::SECONDS_PER_DAY;

    #[test]
    fn every_day_covers_the_whole_day_without_gaps() {
        let schedule = weekly_schedule().unwrap();

        for (weekday, programs) in schedule.days() {
            assert_eq!(programs.first().unwrap().start().seconds(), 0, "{weekday}");
            assert!(programs.last().unwrap().end().is_end_of_day(), "{weekday}");

            let covered: u32 = programs.iter().map(Program::duration_seconds).sum();
            assert_eq!(covered, SECONDS_PER_DAY, "{weekday}");
        }
    }

    #[test]
    fn sunday_evening_lineup() {
        let schedule = weekly_schedule().unwrap();
        let sunday = schedule.day(Weekday::Sun);
        let zona_mista = &sunday[sunday.len() - 2];

        assert_eq!(zona_mista.name(), "ZONA MISTA");
        assert_eq!(zona_mista.start().to_string(), "20:00");
        assert_eq!(zona_mista.end().to_string(), "21:10");
        assert_eq!(sunday.last().unwrap().name(), "TOP BILLBOARD");
    }
}
