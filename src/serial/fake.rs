use crate::{Error, Result};
use std::io;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use super::CommandSink;

/// Recording sink used in tests. Can be told to fail after a number of
/// successful writes to exercise the fatal-channel path.
#[derive(Debug, Default)]
pub struct FakeSerialPort {
    writes: Vec<String>,
    fail_after: Option<usize>,
    closed: Arc<AtomicBool>,
}

impl FakeSerialPort {
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `count` commands, then reject every later write.
    pub fn failing_after(count: usize) -> Self {
        Self {
            fail_after: Some(count),
            ..Self::default()
        }
    }

    pub fn writes(&self) -> &[String] {
        &self.writes
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// Handle that observes `close` after the port has been moved away.
    pub fn closed_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.closed)
    }

    /// Reassemble the characters written to each cell, in write order,
    /// grouped into full-display frames.
    pub fn frames(&self, cells: usize) -> Vec<String> {
        self.writes
            .chunks(cells)
            .map(|chunk| chunk.iter().filter_map(|cmd| decode_char(cmd)).collect())
            .collect()
    }
}

impl CommandSink for FakeSerialPort {
    fn send_command(&mut self, command: &str) -> Result<()> {
        if self.is_closed() {
            return Err(Error::InvalidArgs("serial port not connected".into()));
        }
        if self.fail_after.is_some_and(|limit| self.writes.len() >= limit) {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "fake serial write rejected",
            )));
        }
        self.writes.push(command.to_string());
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }
}

fn decode_char(command: &str) -> Option<char> {
    let mut parts = command.trim_end_matches('\r').split(' ');
    if parts.next() != Some("w") {
        return None;
    }
    let code = u32::from_str_radix(parts.next()?, 16).ok()?;
    char::from_u32(code)
}
