//! Line-mode display: one right-aligned line per frame, like a paper tape.

use std::io::Write;

use tracing::warn;

use pocketcalc_core::{DisplaySink, MAX_DISPLAY_LEN};

pub struct TapeDisplay<W: Write> {
    out: W,
    every_frame: bool,
}

impl<W: Write> TapeDisplay<W> {
    /// With `every_frame` off, nothing is printed until [`TapeDisplay::print`].
    pub fn new(out: W, every_frame: bool) -> Self {
        Self { out, every_frame }
    }

    pub fn print(&mut self, text: &str) {
        let written = writeln!(self.out, "{text:>width$}", width = MAX_DISPLAY_LEN)
            .and_then(|()| self.out.flush());
        if let Err(e) = written {
            warn!("display write failed: {e}");
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> DisplaySink for TapeDisplay<W> {
    fn render(&mut self, text: &str) {
        if self.every_frame {
            self.print(text);
        }
    }
}
