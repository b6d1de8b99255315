use tracing::debug;

use crate::engine::Calculator;
use crate::io::{DisplaySink, InputSource};
use crate::key::KeyEvent;

/// A calculator wired to a display: each key press renders exactly once.
pub struct Session<D: DisplaySink> {
    calculator: Calculator,
    display: D,
}

impl<D: DisplaySink> Session<D> {
    pub fn new(calculator: Calculator, display: D) -> Self {
        Self {
            calculator,
            display,
        }
    }

    /// Paint the current text without pressing anything.
    pub fn render_current(&mut self) {
        self.display.render(self.calculator.current_display());
    }

    pub fn press(&mut self, key: KeyEvent) -> &str {
        let text = self.calculator.handle_key(key);
        self.display.render(text);
        text
    }

    /// Feed every key from `source` in order. Returns the number of keys.
    pub fn run<S: InputSource + ?Sized>(&mut self, source: &mut S) -> usize {
        let mut count = 0;
        while let Some(key) = source.next_key() {
            self.press(key);
            count += 1;
        }
        debug!("session processed {count} keys");
        count
    }

    pub fn calculator(&self) -> &Calculator {
        &self.calculator
    }

    pub fn display(&self) -> &D {
        &self.display
    }

    pub fn display_mut(&mut self) -> &mut D {
        &mut self.display
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{KeyScript, RecordingDisplay};

    fn recording_session() -> Session<RecordingDisplay> {
        Session::new(Calculator::new(), RecordingDisplay::new())
    }

    #[test]
    fn test_one_render_per_key() {
        let mut session = recording_session();
        let processed = session.run(&mut KeyScript::new("2 + 3 +"));
        assert_eq!(processed, 4);
        assert_eq!(session.display().frames(), ["2", "2", "3", "5"]);
    }

    #[test]
    fn test_render_current_paints_initial_zero() {
        let mut session = recording_session();
        session.render_current();
        assert_eq!(session.display().frames(), ["0"]);
    }

    #[test]
    fn test_press_returns_rendered_text() {
        let mut session = recording_session();
        assert_eq!(session.press(KeyEvent::Digit(8)), "8");
        assert_eq!(session.display().last(), Some("8"));
    }

    #[test]
    fn test_borrowed_sink() {
        let mut frames = RecordingDisplay::new();
        {
            let mut session = Session::new(Calculator::new(), &mut frames);
            session.run(&mut KeyScript::new("9 sqrt"));
        }
        assert_eq!(frames.frames(), ["9", "3"]);
    }
}
