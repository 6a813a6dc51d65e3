use std::io::Write;
use tracing::warn;

use crate::DisplayState;

/// Something that can show a [`DisplayState`].
pub trait Screen: Send {
    fn show(&mut self, state: DisplayState);
}

/// Draws the 5x5 picture as text.
pub struct TerminalScreen<W> {
    out: W,
}

impl<W: Write + Send> TerminalScreen<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn draw(&mut self, state: DisplayState) -> std::io::Result<()> {
        writeln!(self.out, "[{}]", state.name())?;
        for row in state.glyph() {
            writeln!(self.out, "{row}")?;
        }
        self.out.flush()
    }
}

impl<W: Write + Send> Screen for TerminalScreen<W> {
    fn show(&mut self, state: DisplayState) {
        if let Err(e) = self.draw(state) {
            warn!(error = %e, "failed drawing display");
        }
    }
}
