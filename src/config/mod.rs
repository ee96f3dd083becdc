use crate::{serial::FlowControlMode, weather::Units, Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub mod loader;

pub const DEFAULT_DEVICE: &str = "/dev/ttyUSB0";
pub const DEFAULT_BAUD: u32 = 500_000;
pub const DEFAULT_SERIAL_TIMEOUT_MS: u64 = 500;
pub const DEFAULT_CITY: &str = "Kingston, CA";
pub const DEFAULT_LABEL_PADDING: usize = 4;
pub const DEFAULT_REFRESH_INTERVAL: Duration = crate::scheduler::DEFAULT_REFRESH_INTERVAL;
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(2);
pub const DEFAULT_RETRY_INITIAL: Duration = Duration::from_secs(5);
pub const DEFAULT_RETRY_MAX: Duration = Duration::from_secs(300);
pub const DEFAULT_FETCH_TIMEOUT: Duration = Duration::from_secs(10);
pub const API_KEY_ENV: &str = "SERIAL_WEATHER_API_KEY";
const CONFIG_DIR_NAME: &str = ".serial_weather";
const CONFIG_FILE_NAME: &str = "config.toml";

/// User-supplied settings loaded from the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub device: String,
    pub baud: u32,
    pub serial_timeout_ms: u64,
    pub flow_control: FlowControlMode,
    pub city: String,
    /// Text shown before every reading; the city name when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub label_padding: usize,
    pub api_key: String,
    pub units: Units,
    #[serde(with = "duration_text")]
    pub refresh_interval: Duration,
    #[serde(with = "duration_text")]
    pub tick_interval: Duration,
    #[serde(with = "duration_text")]
    pub retry_initial: Duration,
    #[serde(with = "duration_text")]
    pub retry_max: Duration,
    #[serde(with = "duration_text")]
    pub fetch_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: DEFAULT_BAUD,
            serial_timeout_ms: DEFAULT_SERIAL_TIMEOUT_MS,
            flow_control: FlowControlMode::default(),
            city: DEFAULT_CITY.to_string(),
            label: None,
            label_padding: DEFAULT_LABEL_PADDING,
            api_key: String::new(),
            units: Units::default(),
            refresh_interval: DEFAULT_REFRESH_INTERVAL,
            tick_interval: DEFAULT_TICK_INTERVAL,
            retry_initial: DEFAULT_RETRY_INITIAL,
            retry_max: DEFAULT_RETRY_MAX,
            fetch_timeout: DEFAULT_FETCH_TIMEOUT,
        }
    }
}

impl Config {
    pub fn load_or_default() -> Result<Self> {
        loader::load_or_default()
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        loader::load_from_path(path)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        loader::save_to_path(self, path)
    }

    pub fn parse(raw: &str) -> Result<Self> {
        loader::parse(raw)
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.city)
    }
}

pub(crate) fn validate(cfg: &Config) -> Result<()> {
    if cfg.device.trim().is_empty() {
        return Err(Error::Config("device must not be empty".into()));
    }
    if cfg.baud == 0 {
        return Err(Error::Config("baud must be greater than zero".into()));
    }
    if cfg.city.trim().is_empty() {
        return Err(Error::Config("city must not be empty".into()));
    }
    if cfg.label_padding > crate::display::DISPLAY_CELLS {
        return Err(Error::Config(format!(
            "label_padding must be at most {}",
            crate::display::DISPLAY_CELLS
        )));
    }
    if cfg.tick_interval.is_zero() {
        return Err(Error::Config("tick_interval must be greater than zero".into()));
    }
    if cfg.refresh_interval.is_zero() {
        return Err(Error::Config("refresh_interval must be greater than zero".into()));
    }
    if cfg.retry_initial > cfg.retry_max {
        return Err(Error::Config(
            "retry_initial must not exceed retry_max".into(),
        ));
    }
    Ok(())
}

/// Durations as humantime text ("1h", "2s", "5m 30s").
mod duration_text {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*value).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(raw.trim()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{env, fs, sync::Mutex};

    static ENV_LOCK: Mutex<()> = Mutex::new(());

    /// Run `f` with the API key variable pinned, restoring it afterwards.
    fn with_api_key_env<T>(value: Option<&str>, f: impl FnOnce() -> T) -> T {
        let _guard = ENV_LOCK.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        let saved = env::var_os(API_KEY_ENV);
        match value {
            Some(key) => env::set_var(API_KEY_ENV, key),
            None => env::remove_var(API_KEY_ENV),
        }
        let out = f();
        match saved {
            Some(key) => env::set_var(API_KEY_ENV, key),
            None => env::remove_var(API_KEY_ENV),
        }
        out
    }

    #[test]
    fn loads_default_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = with_api_key_env(None, || {
            Config::load_from_path(&dir.path().join("missing.toml")).unwrap()
        });
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn api_key_env_overrides_file() {
        let cfg = with_api_key_env(Some("from-env"), || {
            Config::parse("api_key = \"from-file\"").unwrap()
        });
        assert_eq!(cfg.api_key, "from-env");

        let cfg = with_api_key_env(Some("  "), || {
            Config::parse("api_key = \"from-file\"").unwrap()
        });
        assert_eq!(cfg.api_key, "from-file");
    }

    #[test]
    fn parses_valid_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let contents = r#"
            device = "/dev/ttyACM0"
            baud = 115200
            city = "Toronto, CA"
            label = "TO"
            label_padding = 2
            units = "imperial"
            flow_control = "hardware"
            refresh_interval = "30m"
            tick_interval = "3s"
            retry_initial = "10s"
            retry_max = "2m"
        "#;
        fs::write(&path, contents).unwrap();
        let cfg = Config::load_from_path(&path).unwrap();
        assert_eq!(cfg.device, "/dev/ttyACM0");
        assert_eq!(cfg.baud, 115_200);
        assert_eq!(cfg.display_label(), "TO");
        assert_eq!(cfg.label_padding, 2);
        assert_eq!(cfg.units, Units::Imperial);
        assert_eq!(cfg.flow_control, FlowControlMode::Hardware);
        assert_eq!(cfg.refresh_interval, Duration::from_secs(1800));
        assert_eq!(cfg.tick_interval, Duration::from_secs(3));
        assert_eq!(cfg.retry_initial, Duration::from_secs(10));
        assert_eq!(cfg.retry_max, Duration::from_secs(120));
        assert_eq!(cfg.fetch_timeout, DEFAULT_FETCH_TIMEOUT);
    }

    #[test]
    fn label_falls_back_to_city() {
        let cfg = Config::default();
        assert_eq!(cfg.display_label(), DEFAULT_CITY);
    }

    #[test]
    fn rejects_unknown_key() {
        let err = Config::parse("nope = 1").unwrap_err();
        assert!(format!("{err}").contains("nope"), "{err}");
    }

    #[test]
    fn rejects_bad_duration() {
        let err = Config::parse("tick_interval = \"soon\"").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn rejects_inverted_retry_bounds() {
        let err = Config::parse("retry_initial = \"10m\"\nretry_max = \"1m\"").unwrap_err();
        assert!(format!("{err}").contains("retry_initial"));
    }

    #[test]
    fn rejects_zero_tick() {
        let err = Config::parse("tick_interval = \"0s\"").unwrap_err();
        assert!(format!("{err}").contains("tick_interval"));
    }

    #[test]
    fn saves_and_loads_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let cfg = Config {
            device: "/dev/ttyS1".into(),
            label: Some("Home".into()),
            refresh_interval: Duration::from_secs(900),
            ..Config::default()
        };
        cfg.save_to_path(&path).unwrap();
        let loaded = with_api_key_env(None, || Config::load_from_path(&path).unwrap());
        assert_eq!(cfg, loaded);
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("refresh_interval = \"15m\""));
    }
}
