pub mod app;
pub mod cli;
pub mod config;
pub mod display;
pub mod rotation;
pub mod scheduler;
pub mod serial;
pub mod weather;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("weather error: {0}")]
    Weather(#[from] weather::WeatherError),
}
