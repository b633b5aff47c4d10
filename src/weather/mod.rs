//! Weather report built from an already-fetched forecast response.
//!
//! The response follows the Open-Meteo `forecast` shape requested with
//! `current=temperature_2m,weather_code,uv_index` and
//! `daily=precipitation_probability_max,uv_index_max`.

mod location;
mod monitor;

use std::fmt;

use serde::Deserialize;
use thiserror::Error;

pub use location::{
    ConfiguredLocationProvider, LocationProvider, WeatherLocation, default_location, resolve_location,
};
pub use monitor::{FileWeatherSource, WeatherMonitor, WeatherSource, WeatherState};

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("Dados meteorológicos inválidos recebidos.")]
    InvalidResponse,
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Deserialize)]
pub struct WeatherResponse {
    pub current: Option<CurrentConditions>,
    pub daily: Option<DailyForecast>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentConditions {
    pub temperature_2m: f64,
    pub weather_code: u16,
    #[serde(default)]
    pub uv_index: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DailyForecast {
    #[serde(default)]
    pub precipitation_probability_max: Vec<Option<f64>>,
    #[serde(default)]
    pub uv_index_max: Vec<Option<f64>>,
}

impl DailyForecast {
    fn first(values: &[Option<f64>]) -> Option<f64> {
        values.first().copied().flatten()
    }

    pub fn precipitation_probability(&self) -> Option<f64> {
        Self::first(&self.precipitation_probability_max)
    }

    pub fn uv_index_max(&self) -> Option<f64> {
        Self::first(&self.uv_index_max)
    }
}

impl WeatherResponse {
    pub fn from_json(document: &str) -> Result<Self, WeatherError> {
        Ok(serde_json::from_str(document)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherAlert {
    Thunderstorm,
    HeavyPrecipitation,
    ExtremeUv,
    HighRainChance,
}

impl fmt::Display for WeatherAlert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            WeatherAlert::Thunderstorm => "Alerta de Trovoada",
            WeatherAlert::HeavyPrecipitation => "Alerta de Chuva/Neve Forte",
            WeatherAlert::ExtremeUv => "Índice UV Extremo",
            WeatherAlert::HighRainChance => "Alta Chance de Chuva",
        };
        f.write_str(text)
    }
}

const THUNDERSTORM_CODES: [u16; 3] = [95, 96, 99];
const HEAVY_PRECIPITATION_CODES: [u16; 5] = [65, 67, 75, 82, 86];
const EXTREME_UV_THRESHOLD: f64 = 8.0;
const HIGH_RAIN_CHANCE_THRESHOLD: f64 = 80.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertPolicy {
    pub enabled: bool,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self { enabled: true }
    }
}

impl AlertPolicy {
    /// First matching alert in priority order: storm, heavy precipitation, UV, rain chance.
    pub fn classify(&self, current: &CurrentConditions, daily: &DailyForecast) -> Option<WeatherAlert> {
        if !self.enabled {
            return None;
        }

        if THUNDERSTORM_CODES.contains(&current.weather_code) {
            Some(WeatherAlert::Thunderstorm)
        } else if HEAVY_PRECIPITATION_CODES.contains(&current.weather_code) {
            Some(WeatherAlert::HeavyPrecipitation)
        } else if daily.uv_index_max().is_some_and(|uv| uv > EXTREME_UV_THRESHOLD) {
            Some(WeatherAlert::ExtremeUv)
        } else if daily
            .precipitation_probability()
            .is_some_and(|chance| chance > HIGH_RAIN_CHANCE_THRESHOLD)
        {
            Some(WeatherAlert::HighRainChance)
        } else {
            None
        }
    }
}

/// Portuguese description of a WMO weather interpretation code.
pub fn describe_weather_code(code: u16) -> &'static str {
    match code {
        0 => "Céu limpo",
        1 => "Principalmente limpo",
        2 => "Parcialmente nublado",
        3 => "Nublado",
        45 => "Nevoeiro",
        48 => "Nevoeiro com geada",
        51 => "Garoa leve",
        53 => "Garoa moderada",
        55 => "Garoa forte",
        56 => "Garoa gelada leve",
        57 => "Garoa gelada forte",
        61 => "Chuva fraca",
        63 => "Chuva moderada",
        65 => "Chuva forte",
        66 => "Chuva gelada leve",
        67 => "Chuva gelada forte",
        71 => "Neve fraca",
        73 => "Neve moderada",
        75 => "Neve forte",
        77 => "Grãos de neve",
        80 => "Pancadas de chuva fracas",
        81 => "Pancadas de chuva moderadas",
        82 => "Pancadas de chuva violentas",
        85 => "Pancadas de neve fracas",
        86 => "Pancadas de neve fortes",
        95 => "Trovoada",
        96 => "Trovoada com granizo fraco",
        99 => "Trovoada com granizo forte",
        _ => "Condição desconhecida",
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherReport {
    pub temperature: i64,
    pub precipitation_chance: f64,
    pub uv_index: i64,
    pub description: &'static str,
    pub alert: Option<WeatherAlert>,
    pub location_name: String,
    pub weather_code: u16,
}

impl WeatherReport {
    pub fn from_response(
        response: &WeatherResponse,
        location: &WeatherLocation,
        policy: AlertPolicy,
    ) -> Result<Self, WeatherError> {
        let (Some(current), Some(daily)) = (&response.current, &response.daily) else {
            return Err(WeatherError::InvalidResponse);
        };

        Ok(Self {
            temperature: current.temperature_2m.round() as i64,
            precipitation_chance: daily.precipitation_probability().unwrap_or(0.0),
            uv_index: current.uv_index.unwrap_or(0.0).round() as i64,
            description: describe_weather_code(current.weather_code),
            alert: policy.classify(current, daily),
            location_name: location.name.clone(),
            weather_code: current.weather_code,
        })
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}°C, {} (chuva {}%, UV {})",
            self.location_name, self.temperature, self.description, self.precipitation_chance, self.uv_index
        )?;
        if let Some(alert) = self.alert {
            write!(f, " [{alert}]")?;
        }
        Ok(())
    }
}
