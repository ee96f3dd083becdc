//! Weather snapshot model and the collaborator that produces it.

pub mod fixed;
pub mod owm;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub use fixed::FixedSource;
pub use owm::OwmClient;

/// Accumulation window the display reports.
pub const LAST_HOUR: &str = "1h";

/// Failure to produce a snapshot. Always recoverable: the driver keeps the
/// last good snapshot and retries.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("no API key configured")]
    MissingApiKey,
    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("weather service answered {code}: {body}")]
    Status { code: u16, body: String },
    #[error("could not decode weather response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("weather response carried no condition")]
    MissingCondition,
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Rain or snow accumulation in millimetres keyed by window ("1h", "3h").
/// Empty when the service reported nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Precipitation(BTreeMap<String, f64>);

impl Precipitation {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, window: &str, millimetres: f64) -> Self {
        self.0.insert(window.to_string(), millimetres);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn window(&self, window: &str) -> Option<f64> {
        self.0.get(window).copied()
    }

    pub fn last_hour(&self) -> Option<f64> {
        self.window(LAST_HOUR)
    }
}

/// One fetch worth of weather for a place. Replaced wholesale on refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    /// Short condition group, e.g. "Rain", "Snow", "Clear".
    pub status: String,
    /// Longer human description shown on the display.
    pub detailed_status: String,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub rain: Precipitation,
    pub snow: Precipitation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Units {
    #[default]
    Metric,
    Imperial,
}

impl Units {
    pub fn as_query(&self) -> &'static str {
        match self {
            Units::Metric => "metric",
            Units::Imperial => "imperial",
        }
    }
}

impl FromStr for Units {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "metric" | "celsius" => Ok(Units::Metric),
            "imperial" | "fahrenheit" => Ok(Units::Imperial),
            other => Err(format!("unknown units '{other}' (expected metric or imperial)")),
        }
    }
}

impl fmt::Display for Units {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_query())
    }
}

/// Anything that can produce a snapshot for a named place.
pub trait WeatherSource {
    fn fetch(&mut self, place: &str) -> Result<WeatherSnapshot, WeatherError>;
}

impl<W: WeatherSource + ?Sized> WeatherSource for Box<W> {
    fn fetch(&mut self, place: &str) -> Result<WeatherSnapshot, WeatherError> {
        (**self).fetch(place)
    }
}
