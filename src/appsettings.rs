use std::{
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::Context;
use chrono::Weekday;
use chrono_tz::Tz;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::{
    calendar::StationInfo,
    program::Program,
    scheduling::{RolloverPolicy, SpecialBroadcast},
    weather::{AlertPolicy, WeatherLocation},
};

#[derive(Deserialize, Debug, Clone)]
pub struct StationSettings {
    pub name: String,
    pub url: String,
    pub uid_domain: String,
    pub timezone: String,
    pub filler_program: String,
}

#[derive(Deserialize, Debug, Clone)]
pub struct ScheduleSettings {
    pub rollover: RolloverPolicy,
    /// Weekly timetable as JSON; the built-in station lineup is used when unset.
    pub file: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct SpecialBroadcastSettings {
    pub name: String,
    pub reminder_key: String,
    pub weekday: String,
    pub start: String,
    pub end: String,
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct StorageSettings {
    pub path: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct WeatherSettings {
    pub alerts_enabled: bool,
    pub refresh_interval_secs: u64,
    pub location: Option<WeatherLocation>,
    /// Saved provider response polled by the monitor in `run`.
    pub response_file: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct AppSettings {
    pub station: StationSettings,
    pub schedule: ScheduleSettings,
    pub special_broadcast: SpecialBroadcastSettings,
    #[serde(default)]
    pub storage: StorageSettings,
    pub weather: WeatherSettings,
}

impl AppSettings {
    /// Layers defaults, `appsettings`, `appsettings.local` (or `config_path`) and `RADIO520__*` variables.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder()
            .set_default("station.name", "Rádio 520")?
            .set_default("station.url", "https://www.radio520.com.br")?
            .set_default("station.uid_domain", "radio520.com.br")?
            .set_default("station.timezone", "America/Sao_Paulo")?
            .set_default("station.filler_program", crate::schedule::radio520::FILLER_PROGRAM_NAME)?
            .set_default("schedule.rollover", "following_day")?
            .set_default("special_broadcast.name", "RÁDIO520 - DANCE CLUB")?
            .set_default("special_broadcast.reminder_key", "DANCE CLUB")?
            .set_default("special_broadcast.weekday", "sat")?
            .set_default("special_broadcast.start", "20:00")?
            .set_default("special_broadcast.end", "22:00")?
            .set_default("weather.alerts_enabled", true)?
            .set_default("weather.refresh_interval_secs", 600)?
            .add_source(File::with_name("appsettings").required(false))
            .add_source(File::with_name("appsettings.local").required(false));

        if let Some(path) = config_path {
            builder = builder.add_source(File::from(path).required(true));
        }

        builder
            .add_source(Environment::with_prefix("RADIO520").separator("__"))
            .build()?
            .try_deserialize()
    }

    pub fn timezone(&self) -> anyhow::Result<Tz> {
        self.station
            .timezone
            .parse()
            .map_err(|error| anyhow::anyhow!("invalid station timezone {}: {error}", self.station.timezone))
    }

    pub fn station_info(&self) -> StationInfo {
        StationInfo {
            name: self.station.name.clone(),
            url: self.station.url.clone(),
            uid_domain: self.station.uid_domain.clone(),
        }
    }

    pub fn special_broadcast(&self) -> anyhow::Result<SpecialBroadcast> {
        let special = &self.special_broadcast;
        let weekday: Weekday = special
            .weekday
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid special broadcast weekday {}", special.weekday))?;
        let program = Program::parse(&special.start, &special.end, special.name.clone())
            .context("invalid special broadcast times")?;

        Ok(SpecialBroadcast::new(weekday, program, special.reminder_key.clone()))
    }

    pub fn storage_path(&self) -> PathBuf {
        self.storage.path.clone().unwrap_or_else(|| {
            dirs::data_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join("radio520")
                .join("store.json")
        })
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            enabled: self.weather.alerts_enabled,
        }
    }

    pub fn weather_refresh_interval(&self) -> Duration {
        Duration::from_secs(self.weather.refresh_interval_secs)
    }
}
