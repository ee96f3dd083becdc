use super::{Precipitation, WeatherError, WeatherSnapshot, WeatherSource};

/// Serves one canned snapshot forever. Backs `--demo`.
#[derive(Debug, Clone)]
pub struct FixedSource {
    snapshot: WeatherSnapshot,
}

impl FixedSource {
    pub fn new(snapshot: WeatherSnapshot) -> Self {
        Self { snapshot }
    }

    /// A drizzly afternoon, so the demo walks through the rain page too.
    pub fn demo() -> Self {
        Self::new(WeatherSnapshot {
            status: "Rain".into(),
            detailed_status: "light rain".into(),
            temperature: 12.6,
            feels_like: 11.8,
            humidity: 87,
            wind_speed: 4.1,
            rain: Precipitation::none().with("1h", 0.42),
            snow: Precipitation::none(),
        })
    }
}

impl WeatherSource for FixedSource {
    fn fetch(&mut self, _place: &str) -> Result<WeatherSnapshot, WeatherError> {
        Ok(self.snapshot.clone())
    }
}
