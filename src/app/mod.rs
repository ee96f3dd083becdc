use crate::{
    cli::RunOptions,
    config::{Config, DEFAULT_BAUD, DEFAULT_DEVICE, DEFAULT_SERIAL_TIMEOUT_MS},
    display::padded_label,
    serial::{echo::EchoSink, errors::classify_error, CommandSink, FlowControlMode, SerialOptions, SerialPort},
    weather::{FixedSource, OwmClient, Units, WeatherSource},
    Error, Result,
};
use std::{path::Path, str::FromStr, sync::atomic::AtomicBool, time::Duration};

pub mod driver;
mod lifecycle;
mod logger;

pub use driver::{Driver, DriverPhase, DriverSettings, BOOT_MESSAGE};
pub use lifecycle::FAREWELL;
pub use logger::{LogLevel, Logger};

/// Config for the daemon: the config file with CLI overrides applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub device: String,
    pub baud: u32,
    pub serial_timeout_ms: u64,
    pub flow_control: FlowControlMode,
    pub city: String,
    pub label: String,
    pub api_key: String,
    pub units: Units,
    pub refresh_interval: Duration,
    pub tick_interval: Duration,
    pub retry_initial: Duration,
    pub retry_max: Duration,
    pub fetch_timeout: Duration,
    pub log_level: Option<LogLevel>,
    pub log_file: Option<String>,
    pub demo: bool,
    pub dry_run: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        let cfg = Config::default();
        Self {
            device: DEFAULT_DEVICE.to_string(),
            baud: DEFAULT_BAUD,
            serial_timeout_ms: DEFAULT_SERIAL_TIMEOUT_MS,
            flow_control: FlowControlMode::default(),
            label: padded_label(cfg.display_label(), cfg.label_padding),
            city: cfg.city,
            api_key: cfg.api_key,
            units: cfg.units,
            refresh_interval: cfg.refresh_interval,
            tick_interval: cfg.tick_interval,
            retry_initial: cfg.retry_initial,
            retry_max: cfg.retry_max,
            fetch_timeout: cfg.fetch_timeout,
            log_level: None,
            log_file: None,
            demo: false,
            dry_run: false,
        }
    }
}

impl AppConfig {
    pub fn from_sources(config: Config, opts: RunOptions) -> Result<Self> {
        let log_level = opts
            .log_level
            .as_deref()
            .map(LogLevel::from_str)
            .transpose()
            .map_err(Error::InvalidArgs)?;
        let city = opts.city.unwrap_or_else(|| config.city.clone());
        // An explicit label in the file wins; otherwise the label follows the city.
        let label_text = config.label.clone().unwrap_or_else(|| city.clone());
        if city.trim().is_empty() {
            return Err(Error::InvalidArgs("city must not be empty".into()));
        }
        Ok(Self {
            device: opts.device.unwrap_or_else(|| config.device.clone()),
            baud: opts.baud.unwrap_or(config.baud),
            serial_timeout_ms: config.serial_timeout_ms,
            flow_control: config.flow_control,
            label: padded_label(&label_text, config.label_padding),
            city,
            api_key: opts.api_key.unwrap_or_else(|| config.api_key.clone()),
            units: opts.units.unwrap_or(config.units),
            refresh_interval: config.refresh_interval,
            tick_interval: config.tick_interval,
            retry_initial: config.retry_initial,
            retry_max: config.retry_max,
            fetch_timeout: config.fetch_timeout,
            log_level,
            log_file: opts.log_file,
            demo: opts.demo,
            dry_run: opts.dry_run,
        })
    }

    pub fn serial_options(&self) -> SerialOptions {
        SerialOptions {
            baud: self.baud,
            timeout_ms: self.serial_timeout_ms,
            flow_control: self.flow_control,
        }
    }

    pub fn driver_settings(&self) -> DriverSettings {
        DriverSettings {
            place: self.city.clone(),
            label: self.label.clone(),
            refresh_interval: self.refresh_interval,
            retry_initial: self.retry_initial,
            retry_max: self.retry_max,
        }
    }
}

pub struct App {
    config: AppConfig,
}

impl App {
    pub fn new(config: AppConfig) -> Result<Self> {
        Logger::new(config.log_level, config.log_file.clone())?.install();
        Ok(Self { config })
    }

    pub fn from_options(opts: RunOptions) -> Result<Self> {
        let cfg_file = match opts.config_file.as_deref() {
            Some(path) => Config::load_from_path(Path::new(path))?,
            None => Config::load_or_default()?,
        };
        let merged = AppConfig::from_sources(cfg_file, opts)?;
        Self::new(merged)
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Entry point for the daemon: open the display channel and rotate
    /// readings until ctrl-c.
    pub fn run(&self) -> Result<()> {
        let running = lifecycle::create_shutdown_flag()?;
        self.run_until(&running)
    }

    pub fn run_until(&self, running: &AtomicBool) -> Result<()> {
        let config = &self.config;
        log::info!(
            "daemon start (device={}, baud={}, place={}, demo={}, dry_run={})",
            config.device,
            config.baud,
            config.city,
            config.demo,
            config.dry_run
        );
        let source = self.weather_source()?;

        if config.dry_run {
            drive(config, EchoSink::stdout(), source, running)?;
        } else {
            let port = SerialPort::connect(&config.device, config.serial_options())?;
            log::info!("serial connected to {} at {} baud", port.device(), port.baud());
            drive(config, port, source, running)?;
        }
        lifecycle::print_farewell();
        Ok(())
    }

    fn weather_source(&self) -> Result<Box<dyn WeatherSource>> {
        if self.config.demo {
            log::info!("demo mode enabled: serving a built-in snapshot");
            return Ok(Box::new(FixedSource::demo()));
        }
        let client = OwmClient::new(
            &self.config.api_key,
            self.config.units,
            self.config.fetch_timeout,
        )?;
        Ok(Box::new(client))
    }
}

/// Run the driver over `sink` until `running` clears, releasing the channel
/// on every exit path. Returns the released sink.
pub fn drive<S, W>(config: &AppConfig, sink: S, source: W, running: &AtomicBool) -> Result<S>
where
    S: CommandSink,
    W: WeatherSource,
{
    let mut driver = Driver::new(sink, source, config.driver_settings());
    let outcome = driver
        .show_boot_message()
        .and_then(|()| driver.run(running, config.tick_interval));
    let released = driver.release();

    if let Err(err) = outcome {
        log::error!(
            "display channel failed ({}): {err}",
            classify_error(&err)
        );
        if let Err(close_err) = released {
            log::warn!("releasing display channel also failed: {close_err}");
        }
        return Err(err);
    }
    released?;
    Ok(driver.into_sink())
}
