pub mod arithmetic;
pub mod engine;
pub mod error;
pub mod format;
pub mod io;
pub mod key;
pub mod memory;
pub mod session;
pub mod state;

pub use arithmetic::apply;
pub use engine::{Calculator, EngineOptions, EqualsPolicy};
pub use error::{CalcError, CalcResult};
pub use format::{ERROR_TOKEN, MAX_DISPLAY_LEN};
pub use io::{DisplaySink, InputSource, KeyScript, Keys, RecordingDisplay};
pub use key::{KeyEvent, Operator};
pub use memory::{MemoryBank, Recall, RecallState};
pub use session::Session;
pub use state::{LastOperation, StateSnapshot};
