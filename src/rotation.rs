//! Cycles the display through the fields of the current snapshot.
//!
//! Status -> Temperature -> Humidity -> Wind -> Status, with a detour through
//! Rain or Snow after Wind when that is the reported condition.

use crate::weather::{Precipitation, WeatherSnapshot};

/// Condition groups that earn an accumulation page.
const RAIN_STATUS: &str = "Rain";
const SNOW_STATUS: &str = "Snow";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotationState {
    #[default]
    Status,
    Temperature,
    Humidity,
    Wind,
    Rain,
    Snow,
}

impl RotationState {
    /// Text for this page, without the place label.
    pub fn render(self, snapshot: &WeatherSnapshot) -> String {
        match self {
            RotationState::Status => snapshot.detailed_status.clone(),
            RotationState::Temperature => format!(
                "T={:2.0}, Tfl={:2.0}",
                snapshot.temperature, snapshot.feels_like
            ),
            RotationState::Humidity => format!("Humidity={}%", snapshot.humidity),
            RotationState::Wind => format!("Wind speed={}", snapshot.wind_speed),
            RotationState::Rain => accumulation(&snapshot.rain, "rain"),
            RotationState::Snow => accumulation(&snapshot.snow, "snow"),
        }
    }

    /// Page shown after this one.
    pub fn successor(self, snapshot: &WeatherSnapshot) -> RotationState {
        match self {
            RotationState::Status => RotationState::Temperature,
            RotationState::Temperature => RotationState::Humidity,
            RotationState::Humidity => RotationState::Wind,
            RotationState::Wind => match snapshot.status.as_str() {
                RAIN_STATUS => RotationState::Rain,
                SNOW_STATUS => RotationState::Snow,
                _ => RotationState::Status,
            },
            RotationState::Rain | RotationState::Snow => RotationState::Status,
        }
    }
}

// A window map without a "1h" entry reads the same as no data at all.
fn accumulation(precipitation: &Precipitation, kind: &str) -> String {
    match precipitation.last_hour() {
        Some(mm) => format!("1h: {mm}mm"),
        None => format!("No {kind} as now."),
    }
}

/// Current page plus the transition applied once per tick.
#[derive(Debug, Clone, Default)]
pub struct Rotation {
    state: RotationState,
}

impl Rotation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RotationState {
        self.state
    }

    /// Render the current page, then advance to its successor.
    pub fn step(&mut self, snapshot: &WeatherSnapshot) -> String {
        let body = self.state.render(snapshot);
        self.state = self.state.successor(snapshot);
        body
    }
}
