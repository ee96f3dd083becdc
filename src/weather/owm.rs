//! OpenWeatherMap "current weather" client.
//!
//! The daemon loop is synchronous, so the client owns a current-thread tokio
//! runtime and blocks on each request. The request timeout bounds every fetch.

use serde::Deserialize;
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};

use super::{Precipitation, Units, WeatherError, WeatherSnapshot, WeatherSource};

pub const DEFAULT_ENDPOINT: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Longest error body kept in [`WeatherError::Status`].
const MAX_ERROR_BODY: usize = 200;

pub struct OwmClient {
    runtime: Runtime,
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    units: Units,
}

impl OwmClient {
    pub fn new(api_key: &str, units: Units, timeout: Duration) -> Result<Self, WeatherError> {
        if api_key.trim().is_empty() {
            return Err(WeatherError::MissingApiKey);
        }
        let runtime = Builder::new_current_thread().enable_all().build()?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("serial-weather/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            runtime,
            http,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.trim().to_string(),
            units,
        })
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    async fn request(&self, place: &str) -> Result<String, WeatherError> {
        let response = self
            .http
            .get(&self.endpoint)
            .query(&[
                ("q", place),
                ("appid", self.api_key.as_str()),
                ("units", self.units.as_query()),
            ])
            .send()
            .await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(WeatherError::Status {
                code: status.as_u16(),
                body: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        Ok(body)
    }
}

impl WeatherSource for OwmClient {
    fn fetch(&mut self, place: &str) -> Result<WeatherSnapshot, WeatherError> {
        let body = self.runtime.block_on(self.request(place))?;
        parse_response(&body)
    }
}

#[derive(Deserialize)]
struct CurrentWeather {
    weather: Vec<Condition>,
    main: MainReadings,
    wind: Wind,
    #[serde(default)]
    rain: Option<Precipitation>,
    #[serde(default)]
    snow: Option<Precipitation>,
}

#[derive(Deserialize)]
struct Condition {
    main: String,
    description: String,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: f64,
    feels_like: f64,
    humidity: u8,
}

#[derive(Deserialize)]
struct Wind {
    speed: f64,
}

/// Decode a current-weather JSON body into a snapshot.
pub fn parse_response(raw: &str) -> Result<WeatherSnapshot, WeatherError> {
    let current: CurrentWeather = serde_json::from_str(raw)?;
    let condition = current
        .weather
        .into_iter()
        .next()
        .ok_or(WeatherError::MissingCondition)?;
    Ok(WeatherSnapshot {
        status: condition.main,
        detailed_status: condition.description,
        temperature: current.main.temp,
        feels_like: current.main.feels_like,
        humidity: current.main.humidity,
        wind_speed: current.wind.speed,
        rain: current.rain.unwrap_or_default(),
        snow: current.snow.unwrap_or_default(),
    })
}
