use serde::Serialize;

/// Whether the previous key press was a memory recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallState {
    #[default]
    Idle,
    JustRecalled,
}

/// Outcome of pressing the recall/clear key.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Recall {
    Shown(f64),
    Cleared,
}

/// Memory register with its recall/clear toggle.
#[derive(Debug, Clone, Default)]
pub struct MemoryBank {
    value: f64,
    recall: RecallState,
}

impl MemoryBank {
    pub fn value(&self) -> f64 {
        self.value
    }

    pub fn recall_state(&self) -> RecallState {
        self.recall
    }

    pub fn add(&mut self, amount: f64) {
        self.value += amount;
    }

    pub fn subtract(&mut self, amount: f64) {
        self.value -= amount;
    }

    /// First press shows the stored value; a second consecutive press
    /// zeroes the register instead.
    pub fn recall(&mut self) -> Recall {
        match self.recall {
            RecallState::Idle => {
                self.recall = RecallState::JustRecalled;
                Recall::Shown(self.value)
            }
            RecallState::JustRecalled => {
                self.clear();
                Recall::Cleared
            }
        }
    }

    /// Return to `Idle`. Called before every key other than recall.
    pub fn settle(&mut self) {
        self.recall = RecallState::Idle;
    }

    pub fn clear(&mut self) {
        self.value = 0.0;
        self.recall = RecallState::Idle;
    }
}
