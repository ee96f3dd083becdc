use serial_weather::{
    app::{drive, AppConfig, Driver, DriverPhase, DriverSettings},
    display::DISPLAY_CELLS,
    rotation::RotationState,
    serial::fake::FakeSerialPort,
    weather::{Precipitation, WeatherError, WeatherSnapshot, WeatherSource},
};
use std::{
    collections::VecDeque,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    time::{Duration, Instant},
};

const HOUR: Duration = Duration::from_secs(3600);
const TICK: Duration = Duration::from_secs(2);

/// Replies in order, then keeps failing.
struct ScriptedSource {
    replies: VecDeque<Result<WeatherSnapshot, WeatherError>>,
}

impl ScriptedSource {
    fn new(replies: Vec<Result<WeatherSnapshot, WeatherError>>) -> Self {
        Self {
            replies: replies.into(),
        }
    }
}

impl WeatherSource for ScriptedSource {
    fn fetch(&mut self, place: &str) -> Result<WeatherSnapshot, WeatherError> {
        assert_eq!(place, "Kingston, CA");
        self.replies
            .pop_front()
            .unwrap_or(Err(WeatherError::MissingCondition))
    }
}

/// Clears the running flag as soon as it is asked for weather.
struct InterruptingSource {
    running: Arc<AtomicBool>,
}

impl WeatherSource for InterruptingSource {
    fn fetch(&mut self, _place: &str) -> Result<WeatherSnapshot, WeatherError> {
        self.running.store(false, Ordering::SeqCst);
        Ok(clear_day())
    }
}

fn clear_day() -> WeatherSnapshot {
    WeatherSnapshot {
        status: "Clear".into(),
        detailed_status: "Clear".into(),
        temperature: 21.4,
        feels_like: 20.9,
        humidity: 55,
        wind_speed: 3.2,
        rain: Precipitation::none(),
        snow: Precipitation::none(),
    }
}

fn settings(label: &str) -> DriverSettings {
    DriverSettings {
        place: "Kingston, CA".into(),
        label: label.into(),
        refresh_interval: HOUR,
        retry_initial: Duration::from_secs(5),
        retry_max: Duration::from_secs(300),
    }
}

fn lines(port: &FakeSerialPort) -> Vec<String> {
    port.frames(DISPLAY_CELLS)
        .into_iter()
        .map(|frame| frame.trim_end().to_string())
        .collect()
}

#[test]
fn clear_day_rotates_and_wraps_to_status() {
    let source = ScriptedSource::new(vec![Ok(clear_day())]);
    let mut driver = Driver::new(FakeSerialPort::new(), source, settings(""));
    let start = Instant::now();
    for step in 0..5u32 {
        driver.tick(start + TICK * step).unwrap();
    }
    assert_eq!(
        lines(driver.sink()),
        vec!["Clear", "T=21, Tfl=21", "Humidity=55%", "Wind speed=3.2", "Clear"]
    );
    assert_eq!(driver.sink().writes().len(), 5 * DISPLAY_CELLS);
}

#[test]
fn every_line_carries_the_label() {
    let source = ScriptedSource::new(vec![Ok(clear_day())]);
    let mut driver = Driver::new(FakeSerialPort::new(), source, settings("Kingston, CA    "));
    let start = Instant::now();
    driver.tick(start).unwrap();
    driver.tick(start + TICK).unwrap();
    assert_eq!(
        lines(driver.sink()),
        vec!["Kingston, CA    Clear", "Kingston, CA    T=21, Tfl=21"]
    );
}

#[test]
fn snowy_day_visits_snow_page() {
    let snowy = WeatherSnapshot {
        status: "Snow".into(),
        detailed_status: "light snow".into(),
        snow: Precipitation::none().with("1h", 1.5),
        ..clear_day()
    };
    let source = ScriptedSource::new(vec![Ok(snowy)]);
    let mut driver = Driver::new(FakeSerialPort::new(), source, settings(""));
    let start = Instant::now();
    for step in 0..6u32 {
        driver.tick(start + TICK * step).unwrap();
    }
    let shown = lines(driver.sink());
    assert_eq!(shown[4], "1h: 1.5mm");
    assert_eq!(shown[5], "light snow");
}

#[test]
fn refreshes_after_an_hour_and_swaps_snapshot() {
    let rainy = WeatherSnapshot {
        status: "Rain".into(),
        detailed_status: "moderate rain".into(),
        ..clear_day()
    };
    let source = ScriptedSource::new(vec![Ok(clear_day()), Ok(rainy)]);
    let mut driver = Driver::new(FakeSerialPort::new(), source, settings(""));
    let start = Instant::now();

    assert_eq!(driver.tick(start).unwrap(), DriverPhase::Standby);
    assert_eq!(driver.tick(start + HOUR).unwrap(), DriverPhase::Standby);
    assert_eq!(
        driver.tick(start + HOUR + Duration::from_secs(1)).unwrap(),
        DriverPhase::Fetching
    );
    // The next tick performs the refresh and shows the new data.
    assert_eq!(
        driver.tick(start + HOUR + Duration::from_secs(3)).unwrap(),
        DriverPhase::Standby
    );
    assert_eq!(driver.snapshot().unwrap().status, "Rain");
    assert_eq!(driver.rotation_state(), RotationState::Rain);
}

#[test]
fn failed_refresh_keeps_showing_cached_snapshot() {
    let source = ScriptedSource::new(vec![Ok(clear_day()), Err(WeatherError::MissingCondition)]);
    let mut driver = Driver::new(FakeSerialPort::new(), source, settings(""));
    let start = Instant::now();

    driver.tick(start).unwrap();
    let stale = start + HOUR + Duration::from_secs(1);
    assert_eq!(driver.tick(stale).unwrap(), DriverPhase::Fetching);
    // Refresh fails: still fetching, still rendering the old data.
    assert_eq!(driver.tick(stale + TICK).unwrap(), DriverPhase::Fetching);
    assert_eq!(driver.snapshot().unwrap(), &clear_day());
    assert_eq!(
        lines(driver.sink()),
        vec!["Clear", "T=21, Tfl=21", "Humidity=55%"]
    );
}

#[test]
fn retries_wait_for_backoff() {
    let source = ScriptedSource::new(vec![
        Err(WeatherError::MissingCondition),
        Ok(clear_day()),
    ]);
    let mut driver = Driver::new(FakeSerialPort::new(), source, settings(""));
    let start = Instant::now();

    assert_eq!(driver.tick(start).unwrap(), DriverPhase::Fetching);
    // Inside the 5 s backoff window no fetch is attempted.
    assert_eq!(driver.tick(start + TICK).unwrap(), DriverPhase::Fetching);
    assert!(driver.snapshot().is_none());
    assert!(driver.sink().writes().is_empty());

    assert_eq!(
        driver.tick(start + Duration::from_secs(6)).unwrap(),
        DriverPhase::Standby
    );
    assert_eq!(lines(driver.sink()), vec!["Clear"]);
}

#[test]
fn serial_failure_is_fatal_and_releases_channel() {
    let config = AppConfig {
        tick_interval: Duration::from_millis(1),
        ..AppConfig::default()
    };
    let running = AtomicBool::new(true);
    let source = ScriptedSource::new(vec![Ok(clear_day())]);
    let port = FakeSerialPort::failing_after(DISPLAY_CELLS + 3);
    let closed = port.closed_flag();
    let err = drive(&config, port, source, &running)
        .err()
        .expect("write failure must stop the loop");
    assert!(format!("{err}").contains("fake serial write rejected"));
    assert!(closed.load(Ordering::SeqCst), "channel left open after a failed write");
}

#[test]
fn channel_is_released_when_boot_line_fails() {
    let config = AppConfig {
        tick_interval: Duration::from_millis(1),
        ..AppConfig::default()
    };
    let running = AtomicBool::new(true);
    let port = FakeSerialPort::failing_after(0);
    let closed = port.closed_flag();
    let source = ScriptedSource::new(vec![Ok(clear_day())]);
    assert!(drive(&config, port, source, &running).is_err());
    assert!(closed.load(Ordering::SeqCst));
}

#[test]
fn interrupt_is_observed_between_ticks() {
    let running = Arc::new(AtomicBool::new(true));
    let config = AppConfig {
        label: String::new(),
        tick_interval: Duration::from_millis(1),
        ..AppConfig::default()
    };
    let source = InterruptingSource {
        running: running.clone(),
    };
    let port = drive(&config, FakeSerialPort::new(), source, &running).unwrap();
    assert!(port.is_closed());
    // Boot line plus the one page rendered in the tick that saw the interrupt.
    assert_eq!(lines(&port), vec!["Reading weather...", "Clear"]);
}
