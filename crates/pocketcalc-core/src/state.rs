use serde::Serialize;

use crate::format::ERROR_TOKEN;
use crate::key::Operator;
use crate::memory::{MemoryBank, RecallState};

// ---------------------------------------------------------------------------
// CalculatorState
// ---------------------------------------------------------------------------

/// Operation replayed by a repeated `=` under [`EqualsPolicy::Repeat`].
///
/// [`EqualsPolicy::Repeat`]: crate::engine::EqualsPolicy::Repeat
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LastOperation {
    pub operator: Operator,
    pub operand: f64,
}

/// Everything the calculator remembers between key presses.
#[derive(Debug, Clone)]
pub(crate) struct CalculatorState {
    pub(crate) display: String,
    pub(crate) first_operand: Option<f64>,
    pub(crate) operator: Option<Operator>,
    pub(crate) awaiting_second_operand: bool,
    pub(crate) memory: MemoryBank,
    pub(crate) last_operation: Option<LastOperation>,
}

impl Default for CalculatorState {
    fn default() -> Self {
        Self {
            display: "0".into(),
            first_operand: None,
            operator: None,
            awaiting_second_operand: false,
            memory: MemoryBank::default(),
            last_operation: None,
        }
    }
}

impl CalculatorState {
    /// Back to a blank display with nothing pending. Memory survives.
    pub(crate) fn reset_pending(&mut self) {
        self.display = "0".into();
        self.first_operand = None;
        self.operator = None;
        self.awaiting_second_operand = false;
        self.last_operation = None;
    }

    /// Full reset including the memory register.
    pub(crate) fn reset_all(&mut self) {
        self.reset_pending();
        self.memory.clear();
    }

    pub(crate) fn clear_pending_operation(&mut self) {
        self.first_operand = None;
        self.operator = None;
    }

    pub(crate) fn shows_error(&self) -> bool {
        self.display == ERROR_TOKEN
    }

    pub(crate) fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            display: self.display.clone(),
            first_operand: self.first_operand,
            operator: self.operator,
            awaiting_second_operand: self.awaiting_second_operand,
            memory: self.memory.value(),
            memory_just_recalled: self.memory.recall_state() == RecallState::JustRecalled,
            last_operation: self.last_operation,
        }
    }
}

// ---------------------------------------------------------------------------
// StateSnapshot
// ---------------------------------------------------------------------------

/// Read-only copy of the calculator state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSnapshot {
    pub display: String,
    pub first_operand: Option<f64>,
    pub operator: Option<Operator>,
    pub awaiting_second_operand: bool,
    pub memory: f64,
    pub memory_just_recalled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_operation: Option<LastOperation>,
}
