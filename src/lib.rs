//! Program schedule engine for Rádio 520: weekly timetable resolution,
//! the special-broadcast countdown, calendar reminders and weather reports.

pub mod appsettings;
pub mod calendar;
pub mod delivery;
pub mod program;
pub mod schedule;
pub mod scheduling;
pub mod storage;
pub mod task;
pub mod weather;
