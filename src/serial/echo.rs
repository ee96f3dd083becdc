use crate::Result;
use std::io::{self, Write};

use super::CommandSink;

/// Writes each wire command on its own line to `out`. Used by `--dry-run` to
/// watch the protocol without a device attached.
pub struct EchoSink<W: Write> {
    out: W,
}

impl EchoSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> EchoSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> CommandSink for EchoSink<W> {
    fn send_command(&mut self, command: &str) -> Result<()> {
        writeln!(self.out, "{}", command.escape_debug())?;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}
