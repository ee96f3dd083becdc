use crate::Error;
use std::fmt;
use std::io::{self, ErrorKind};

// errno values a tty write can surface once the adapter goes away.
const EIO: i32 = 5;
const ENXIO: i32 = 6;
const ENODEV: i32 = 19;

/// Why a write to an already-open display channel failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SerialFailureKind {
    /// The adapter was unplugged or the port was already released.
    Disconnected,
    /// The write did not drain within the port timeout.
    Timeout,
    Unknown,
}

impl fmt::Display for SerialFailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SerialFailureKind::Disconnected => "disconnected",
            SerialFailureKind::Timeout => "timeout",
            SerialFailureKind::Unknown => "unknown",
        })
    }
}

/// Reason attached to the fatal log line when the display loop stops.
pub fn classify_error(err: &Error) -> SerialFailureKind {
    match err {
        Error::Io(io_err) => classify_io_error(io_err),
        // Sinks only raise this for writes after the port was released.
        Error::InvalidArgs(_) => SerialFailureKind::Disconnected,
        Error::Config(_) | Error::Weather(_) => SerialFailureKind::Unknown,
    }
}

pub fn classify_io_error(err: &io::Error) -> SerialFailureKind {
    match err.kind() {
        ErrorKind::TimedOut | ErrorKind::WouldBlock => SerialFailureKind::Timeout,
        ErrorKind::BrokenPipe | ErrorKind::ConnectionReset | ErrorKind::ConnectionAborted => {
            SerialFailureKind::Disconnected
        }
        _ => match err.raw_os_error() {
            Some(EIO | ENXIO | ENODEV) => SerialFailureKind::Disconnected,
            _ => SerialFailureKind::Unknown,
        },
    }
}
