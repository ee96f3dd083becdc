pub mod codec;

pub use codec::{encode_char, render_string, write_string, CellCommand, DISPLAY_CELLS, PROTOCOL_CELLS};

/// One screenful of text: the place label followed by a reading, bounded to
/// the cells the display can show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayLine(String);

impl DisplayLine {
    pub fn compose(label: &str, body: &str) -> Self {
        Self(label.chars().chain(body.chars()).take(DISPLAY_CELLS).collect())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn cells(&self) -> usize {
        self.0.chars().count()
    }
}

impl std::fmt::Display for DisplayLine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Pad the place label with trailing spaces so the reading starts after a gap.
pub fn padded_label(label: &str, padding: usize) -> String {
    let mut out = String::with_capacity(label.len() + padding);
    out.push_str(label);
    out.extend(std::iter::repeat(' ').take(padding));
    out
}
