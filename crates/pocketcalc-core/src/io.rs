//! Collaborators at the edge of the engine: where key presses come from and
//! where display text goes.

use std::collections::VecDeque;

use tracing::warn;

use crate::key::KeyEvent;

// ---------------------------------------------------------------------------
// DisplaySink
// ---------------------------------------------------------------------------

pub trait DisplaySink {
    /// Show the display text produced by one key press.
    fn render(&mut self, text: &str);
}

impl<T: DisplaySink + ?Sized> DisplaySink for &mut T {
    fn render(&mut self, text: &str) {
        (**self).render(text);
    }
}

/// Keeps every rendered frame in order.
#[derive(Debug, Default, Clone)]
pub struct RecordingDisplay {
    frames: Vec<String>,
}

impl RecordingDisplay {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> &[String] {
        &self.frames
    }

    pub fn last(&self) -> Option<&str> {
        self.frames.last().map(String::as_str)
    }
}

impl DisplaySink for RecordingDisplay {
    fn render(&mut self, text: &str) {
        self.frames.push(text.to_string());
    }
}

// ---------------------------------------------------------------------------
// InputSource
// ---------------------------------------------------------------------------

pub trait InputSource {
    /// Next key press, or `None` once the source is exhausted.
    fn next_key(&mut self) -> Option<KeyEvent>;
}

/// Adapts any iterator of keys.
pub struct Keys<I>(pub I);

impl<I: Iterator<Item = KeyEvent>> InputSource for Keys<I> {
    fn next_key(&mut self) -> Option<KeyEvent> {
        self.0.next()
    }
}

/// Keys read from a whitespace-separated script such as `12.5 + 3 =`.
///
/// A token is first read as one key (`sqrt`, `M+`, `AC`). Otherwise each of
/// its characters must name a key, so numerals expand into digit presses.
/// Tokens that match neither rule are logged and skipped.
#[derive(Debug, Default)]
pub struct KeyScript {
    keys: VecDeque<KeyEvent>,
    skipped: Vec<String>,
}

impl KeyScript {
    pub fn new(script: &str) -> Self {
        let mut parsed = Self::default();
        for token in script.split_whitespace() {
            if let Ok(key) = token.parse::<KeyEvent>() {
                parsed.keys.push_back(key);
                continue;
            }

            let expanded: Option<Vec<KeyEvent>> = token.chars().map(KeyEvent::from_char).collect();
            match expanded {
                Some(keys) => parsed.keys.extend(keys),
                None => {
                    warn!("skipping unrecognised key: {token}");
                    parsed.skipped.push(token.to_string());
                }
            }
        }
        parsed
    }

    /// Tokens that did not name any key.
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn remaining(&self) -> usize {
        self.keys.len()
    }
}

impl InputSource for KeyScript {
    fn next_key(&mut self) -> Option<KeyEvent> {
        self.keys.pop_front()
    }
}
