//! Cell-addressed wire codec for the serial character display.
//!
//! The device accepts one command per cell: `w <char> <addr>\r`, with both the
//! character code and the cell address in lowercase hex without a prefix.
//! Nothing is read back.

use std::fmt;
use std::iter;

use crate::{serial::CommandSink, Result};

/// Cells the display can physically show (16x2).
pub const DISPLAY_CELLS: usize = 32;

/// Cells covered by one full-line render. The protocol walks four cells past
/// the physical display; those commands are dropped by [`encode_char`].
pub const PROTOCOL_CELLS: usize = 36;

/// A single "write character to cell" command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellCommand {
    code: u32,
    address: usize,
}

impl CellCommand {
    pub fn code(&self) -> u32 {
        self.code
    }

    pub fn address(&self) -> usize {
        self.address
    }

    pub fn character(&self) -> Option<char> {
        char::from_u32(self.code)
    }

    pub fn to_wire(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for CellCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "w {:x} {:x}\r", self.code, self.address)
    }
}

/// Encode `ch` for cell `address`. Addresses outside the physical display
/// yield `None` rather than an error.
pub fn encode_char(ch: char, address: usize) -> Option<CellCommand> {
    if address >= DISPLAY_CELLS {
        return None;
    }
    Some(CellCommand {
        code: ch as u32,
        address,
    })
}

/// Lay `text` across [`PROTOCOL_CELLS`] cells, truncating long input and
/// padding short input with spaces, then encode each cell in address order.
pub fn render_string(text: &str) -> Vec<CellCommand> {
    text.chars()
        .chain(iter::repeat(' '))
        .take(PROTOCOL_CELLS)
        .enumerate()
        .filter_map(|(address, ch)| encode_char(ch, address))
        .collect()
}

/// Render `text` and push every command to `sink` in cell order.
/// Returns the number of commands written.
pub fn write_string<S>(sink: &mut S, text: &str) -> Result<usize>
where
    S: CommandSink + ?Sized,
{
    let commands = render_string(text);
    for command in &commands {
        sink.send_command(&command.to_wire())?;
    }
    Ok(commands.len())
}
