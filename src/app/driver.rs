use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use crate::{
    display::{write_string, DisplayLine},
    rotation::{Rotation, RotationState},
    scheduler::{BackoffController, PollPhase, PollScheduler},
    serial::CommandSink,
    weather::{WeatherSnapshot, WeatherSource},
    Result,
};

/// Shown once at startup while the first fetch runs.
pub const BOOT_MESSAGE: &str = "Reading weather...";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverPhase {
    Fetching,
    Standby,
    Exit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverSettings {
    /// Place name handed to the weather source.
    pub place: String,
    /// Prefix for every line, padding included.
    pub label: String,
    pub refresh_interval: Duration,
    pub retry_initial: Duration,
    pub retry_max: Duration,
}

/// Owns the snapshot, the rotation and the poll schedule, and is the only
/// writer to the display channel.
pub struct Driver<S, W> {
    sink: S,
    source: W,
    place: String,
    label: String,
    phase: DriverPhase,
    snapshot: Option<WeatherSnapshot>,
    rotation: Rotation,
    scheduler: PollScheduler,
}

impl<S, W> Driver<S, W>
where
    S: CommandSink,
    W: WeatherSource,
{
    pub fn new(sink: S, source: W, settings: DriverSettings) -> Self {
        let backoff = BackoffController::new(settings.retry_initial, settings.retry_max);
        Self {
            sink,
            source,
            place: settings.place,
            label: settings.label,
            phase: DriverPhase::Fetching,
            snapshot: None,
            rotation: Rotation::new(),
            scheduler: PollScheduler::new(settings.refresh_interval, backoff),
        }
    }

    pub fn phase(&self) -> DriverPhase {
        self.phase
    }

    pub fn snapshot(&self) -> Option<&WeatherSnapshot> {
        self.snapshot.as_ref()
    }

    pub fn rotation_state(&self) -> RotationState {
        self.rotation.state()
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn show_boot_message(&mut self) -> Result<()> {
        self.show(BOOT_MESSAGE)
    }

    pub fn request_exit(&mut self) {
        self.phase = DriverPhase::Exit;
    }

    /// One pass of the loop: fetch if due, render one page of the cached
    /// snapshot, then let the scheduler decide the next phase.
    ///
    /// A failed fetch is logged and retried later. A failed write to the
    /// channel is returned to the caller.
    pub fn tick(&mut self, now: Instant) -> Result<DriverPhase> {
        if self.phase == DriverPhase::Exit {
            return Ok(DriverPhase::Exit);
        }

        if self.scheduler.fetch_due(now) {
            self.fetch(now);
        }

        if let Some(snapshot) = self.snapshot.as_ref() {
            let body = self.rotation.step(snapshot);
            self.show(&body)?;
        }

        self.phase = match self.scheduler.tick(now) {
            PollPhase::Fetching => DriverPhase::Fetching,
            PollPhase::Standby => DriverPhase::Standby,
        };
        Ok(self.phase)
    }

    /// Tick every `tick_interval` until `running` is cleared or a write fails.
    /// The flag is only read between ticks.
    pub fn run(&mut self, running: &AtomicBool, tick_interval: Duration) -> Result<()> {
        loop {
            if !running.load(Ordering::SeqCst) {
                log::info!("interrupt received, leaving display loop");
                self.request_exit();
            }
            if self.tick(Instant::now())? == DriverPhase::Exit {
                return Ok(());
            }
            thread::sleep(tick_interval);
        }
    }

    /// Enter `Exit` and release the channel.
    pub fn release(&mut self) -> Result<()> {
        self.phase = DriverPhase::Exit;
        self.sink.close()
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    fn fetch(&mut self, now: Instant) {
        log::info!("reading weather for {}", self.place);
        match self.source.fetch(&self.place) {
            Ok(snapshot) => {
                log::info!(
                    "weather for {}: {} {:.1} (feels {:.1}), humidity {}%, wind {}",
                    self.place,
                    snapshot.status,
                    snapshot.temperature,
                    snapshot.feels_like,
                    snapshot.humidity,
                    snapshot.wind_speed
                );
                self.snapshot = Some(snapshot);
                self.scheduler.mark_success(now);
            }
            Err(err) => {
                let delay = self.scheduler.mark_failure(now);
                log::warn!(
                    "weather fetch failed: {err}; retrying in {}",
                    humantime::format_duration(delay)
                );
            }
        }
    }

    fn show(&mut self, body: &str) -> Result<()> {
        let line = DisplayLine::compose(&self.label, body);
        log::debug!("display: {line}");
        write_string(&mut self.sink, line.as_str())?;
        Ok(())
    }
}
