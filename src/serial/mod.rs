pub mod echo;
pub mod errors;
pub mod fake;
pub mod sync;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Result;

pub use sync::SerialPort;

/// Ordered, fire-and-forget channel for display commands.
pub trait CommandSink {
    /// Transmit one command. Commands reach the device in call order.
    fn send_command(&mut self, command: &str) -> Result<()>;

    /// Flush and release the underlying channel. Further sends fail.
    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}

impl<S: CommandSink + ?Sized> CommandSink for Box<S> {
    fn send_command(&mut self, command: &str) -> Result<()> {
        (**self).send_command(command)
    }

    fn close(&mut self) -> Result<()> {
        (**self).close()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowControlMode {
    #[default]
    None,
    Software,
    Hardware,
}

impl FromStr for FlowControlMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(FlowControlMode::None),
            "software" | "xonxoff" => Ok(FlowControlMode::Software),
            "hardware" | "rtscts" => Ok(FlowControlMode::Hardware),
            other => Err(format!("unknown flow control '{other}'")),
        }
    }
}

impl fmt::Display for FlowControlMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FlowControlMode::None => "none",
            FlowControlMode::Software => "software",
            FlowControlMode::Hardware => "hardware",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialOptions {
    pub baud: u32,
    pub timeout_ms: u64,
    pub flow_control: FlowControlMode,
}

impl Default for SerialOptions {
    fn default() -> Self {
        Self {
            baud: crate::config::DEFAULT_BAUD,
            timeout_ms: crate::config::DEFAULT_SERIAL_TIMEOUT_MS,
            flow_control: FlowControlMode::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flow_control_parses_aliases() {
        assert_eq!("RTSCTS".parse::<FlowControlMode>(), Ok(FlowControlMode::Hardware));
        assert_eq!("xonxoff".parse::<FlowControlMode>(), Ok(FlowControlMode::Software));
        assert!("sometimes".parse::<FlowControlMode>().is_err());
    }

    #[test]
    fn boxed_sink_forwards() {
        let mut boxed: Box<dyn CommandSink> = Box::new(fake::FakeSerialPort::default());
        boxed.send_command("w 41 0\r").unwrap();
        boxed.close().unwrap();
        assert!(boxed.send_command("w 41 1\r").is_err());
    }
}
