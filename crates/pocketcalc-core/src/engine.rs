//! The calculator engine: one key press in, one display string out.
//!
//! Every key is handled synchronously against a single [`CalculatorState`].
//! Failures never leave this module; they put the error token on the
//! display and reset whatever operation was pending.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, trace, warn};

use crate::arithmetic::{apply, percent_of};
use crate::error::{CalcError, CalcResult};
use crate::format::{clamp, exceeds_display, format_number, parse_display, ERROR_TOKEN};
use crate::key::{KeyEvent, Operator};
use crate::memory::{MemoryBank, Recall};
use crate::state::{CalculatorState, LastOperation, StateSnapshot};

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

/// What a repeated `=` does once the pending operation has been completed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EqualsPolicy {
    /// The operator is consumed by `=`; pressing `=` again does nothing.
    #[default]
    Clear,
    /// Pressing `=` again reapplies the last operator and second operand.
    Repeat,
}

impl fmt::Display for EqualsPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clear => write!(f, "clear"),
            Self::Repeat => write!(f, "repeat"),
        }
    }
}

impl std::str::FromStr for EqualsPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "clear" => Ok(Self::Clear),
            "repeat" => Ok(Self::Repeat),
            _ => Err(format!("invalid equals policy: {s}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EngineOptions {
    pub equals: EqualsPolicy,
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct Calculator {
    state: CalculatorState,
    options: EngineOptions,
}

impl Calculator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: EngineOptions) -> Self {
        Self {
            state: CalculatorState::default(),
            options,
        }
    }

    pub fn options(&self) -> EngineOptions {
        self.options
    }

    pub fn current_display(&self) -> &str {
        &self.state.display
    }

    pub fn memory(&self) -> f64 {
        self.state.memory.value()
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.snapshot()
    }

    /// Process one key press and return the new display text.
    pub fn handle_key(&mut self, key: KeyEvent) -> &str {
        trace!(%key, display = %self.state.display, "key");

        if let KeyEvent::Digit(d) = key {
            if d > 9 {
                warn!("ignoring digit key out of range: {d}");
                return &self.state.display;
            }
        }

        if key != KeyEvent::MemoryRecallOrClear {
            self.state.memory.settle();
        }
        if key != KeyEvent::Equals {
            self.state.last_operation = None;
        }

        match key {
            KeyEvent::Digit(d) => self.input_digit(d),
            KeyEvent::Decimal => self.input_decimal(),
            KeyEvent::Operator(op) => self.input_operator(op),
            KeyEvent::Equals => self.equals(),
            KeyEvent::ClearAll => self.state.reset_all(),
            KeyEvent::ClearEntry => self.state.display = "0".into(),
            KeyEvent::Percent => self.percent(),
            KeyEvent::SquareRoot => self.square_root(),
            KeyEvent::Negate => self.negate(),
            KeyEvent::MemoryAdd => self.memory_update(|bank, v| bank.add(v)),
            KeyEvent::MemorySubtract => self.memory_update(|bank, v| bank.subtract(v)),
            KeyEvent::MemoryRecallOrClear => self.memory_recall(),
        }

        self.enforce_length();
        &self.state.display
    }

    // --- Number entry ---

    fn input_digit(&mut self, d: u8) {
        let Some(digit) = char::from_digit(u32::from(d), 10) else {
            return;
        };
        if self.entry_locked() {
            return;
        }

        let state = &mut self.state;
        if state.awaiting_second_operand {
            state.display = digit.to_string();
            state.awaiting_second_operand = false;
        } else if state.display == "0" {
            if digit != '0' {
                state.display = digit.to_string();
            }
        } else {
            state.display.push(digit);
        }
    }

    fn input_decimal(&mut self) {
        if self.entry_locked() {
            return;
        }

        let state = &mut self.state;
        if state.awaiting_second_operand {
            state.display = "0.".into();
            state.awaiting_second_operand = false;
        } else if !state.display.contains('.') {
            state.display.push('.');
        }
    }

    /// An overflowed display accepts no further digits until it is cleared
    /// or replaced by a new operation.
    fn entry_locked(&self) -> bool {
        self.state.shows_error() && !self.state.awaiting_second_operand
    }

    // --- Operations ---

    fn input_operator(&mut self, op: Operator) {
        let input = match parse_display(&self.state.display) {
            Ok(v) => v,
            Err(e) => return self.fail(e),
        };

        match (self.state.first_operand, self.state.operator) {
            (None, _) => self.state.first_operand = Some(input),
            (Some(first), Some(pending)) => match compute(first, input, pending) {
                Ok((result, text)) => {
                    self.state.display = text;
                    self.state.first_operand = Some(result);
                }
                Err(e) => return self.fail(e),
            },
            (Some(_), None) => {}
        }

        self.state.operator = Some(op);
        self.state.awaiting_second_operand = true;
    }

    fn equals(&mut self) {
        let (Some(first), Some(op)) = (self.state.first_operand, self.state.operator) else {
            self.repeat_last_operation();
            return;
        };

        if self.state.shows_error() {
            self.state.reset_pending();
            return;
        }

        match parse_display(&self.state.display) {
            Ok(second) => self.complete(first, second, op),
            Err(e) => self.fail(e),
        }
    }

    fn repeat_last_operation(&mut self) {
        if self.options.equals != EqualsPolicy::Repeat {
            return;
        }
        let Some(last) = self.state.last_operation else {
            return;
        };
        if let Ok(first) = parse_display(&self.state.display) {
            self.complete(first, last.operand, last.operator);
        }
    }

    fn complete(&mut self, first: f64, second: f64, op: Operator) {
        match compute(first, second, op) {
            Ok((_, text)) => {
                self.state.display = text;
                self.state.clear_pending_operation();
                self.state.awaiting_second_operand = true;
                if self.options.equals == EqualsPolicy::Repeat {
                    self.state.last_operation = Some(LastOperation {
                        operator: op,
                        operand: second,
                    });
                }
            }
            Err(e) => self.fail(e),
        }
    }

    fn percent(&mut self) {
        let current = match parse_display(&self.state.display) {
            Ok(v) => v,
            Err(e) => return self.fail(e),
        };

        let value = match (self.state.first_operand, self.state.operator) {
            (Some(first), Some(op)) => match op {
                Operator::Add | Operator::Subtract => apply(first, percent_of(first, current), op),
                Operator::Multiply => Ok(percent_of(first, current)),
                Operator::Divide => apply(first, current, op).map(|ratio| ratio * 100.0),
            },
            _ => Ok(current / 100.0),
        };

        match value.and_then(clamp) {
            Ok(text) => {
                self.state.display = text;
                self.state.clear_pending_operation();
                self.state.awaiting_second_operand = true;
            }
            Err(e) => self.fail(e),
        }
    }

    fn square_root(&mut self) {
        let value = match parse_display(&self.state.display) {
            Ok(v) => v,
            Err(e) => return self.fail(e),
        };
        if value < 0.0 {
            return self.fail(CalcError::NegativeRoot(value));
        }

        match clamp(value.sqrt()) {
            Ok(text) => {
                self.state.display = text;
                self.state.awaiting_second_operand = true;
            }
            Err(e) => self.fail(e),
        }
    }

    fn negate(&mut self) {
        if let Ok(value) = parse_display(&self.state.display) {
            self.state.display = format_number(-value);
            self.state.awaiting_second_operand = true;
        }
    }

    // --- Memory ---

    fn memory_update(&mut self, update: impl FnOnce(&mut MemoryBank, f64)) {
        if let Ok(value) = parse_display(&self.state.display) {
            update(&mut self.state.memory, value);
        }
        self.state.awaiting_second_operand = true;
    }

    fn memory_recall(&mut self) {
        match self.state.memory.recall() {
            Recall::Shown(value) => match clamp(value) {
                Ok(text) => {
                    self.state.display = text;
                    self.state.awaiting_second_operand = true;
                }
                Err(e) => self.fail(e),
            },
            Recall::Cleared => self.state.display = "0".into(),
        }
    }

    // --- Errors ---

    fn fail(&mut self, cause: CalcError) {
        debug!(%cause, "computation failed");
        self.state.reset_pending();
        self.state.display = ERROR_TOKEN.into();
        self.state.awaiting_second_operand = true;
    }

    fn enforce_length(&mut self) {
        if exceeds_display(&self.state.display) {
            debug!(display = %self.state.display, "display overflow");
            self.state.display = ERROR_TOKEN.into();
            self.state.awaiting_second_operand = false;
        }
    }
}

/// Apply `op` and format the result for the display.
fn compute(a: f64, b: f64, op: Operator) -> CalcResult<(f64, String)> {
    let result = apply(a, b, op)?;
    let text = clamp(result)?;
    Ok((result, text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::{InputSource, KeyScript};

    fn calc_after(script: &str) -> Calculator {
        calc_with(EngineOptions::default(), script)
    }

    fn calc_with(options: EngineOptions, script: &str) -> Calculator {
        let mut calc = Calculator::with_options(options);
        press(&mut calc, script);
        calc
    }

    fn press(calc: &mut Calculator, script: &str) {
        let mut keys = KeyScript::new(script);
        while let Some(key) = keys.next_key() {
            calc.handle_key(key);
        }
    }

    fn display_after(script: &str) -> String {
        calc_after(script).current_display().to_string()
    }

    // === Number entry ===

    #[test]
    fn test_initial_state() {
        let calc = Calculator::new();
        let snap = calc.snapshot();
        assert_eq!(snap.display, "0");
        assert_eq!(snap.first_operand, None);
        assert_eq!(snap.operator, None);
        assert!(!snap.awaiting_second_operand);
        assert_eq!(snap.memory, 0.0);
        assert!(!snap.memory_just_recalled);
    }

    #[test]
    fn test_leading_zeros_suppressed() {
        assert_eq!(display_after("0 0 5"), "5");
        assert_eq!(display_after("0 0 0"), "0");
        assert_eq!(display_after("1 0 0"), "100");
    }

    #[test]
    fn test_digits_concatenate() {
        assert_eq!(display_after("1 2 3 4 5 6 7 8 9"), "123456789");
    }

    #[test]
    fn test_decimal_idempotent() {
        assert_eq!(display_after(". . ."), "0.");
        assert_eq!(display_after("1 . 5 . 2 ."), "1.52");
    }

    #[test]
    fn test_decimal_starts_fresh_numeral_after_operator() {
        let calc = calc_after("7 + .");
        assert_eq!(calc.current_display(), "0.");
        assert!(!calc.snapshot().awaiting_second_operand);
        assert_eq!(display_after("7 + . 5 ="), "7.5");
    }

    #[test]
    fn test_digit_after_result_starts_new_number() {
        assert_eq!(display_after("2 + 3 = 4"), "4");
    }

    // === Operators ===

    #[test]
    fn test_simple_operations() {
        assert_eq!(display_after("2 + 3 ="), "5");
        assert_eq!(display_after("9 - 1 2 ="), "-3");
        assert_eq!(display_after("6 * 7 ="), "42");
        assert_eq!(display_after("1 / 4 ="), "0.25");
    }

    #[test]
    fn test_chained_operators_compute_eagerly() {
        let calc = calc_after("2 + 3 +");
        let snap = calc.snapshot();
        assert_eq!(snap.display, "5");
        assert_eq!(snap.first_operand, Some(5.0));
        assert_eq!(snap.operator, Some(Operator::Add));
        assert!(snap.awaiting_second_operand);

        assert_eq!(display_after("2 + 3 * 4 ="), "20");
    }

    #[test]
    fn test_repeated_operator_reuses_display() {
        // The displayed value becomes the second operand.
        assert_eq!(display_after("2 + +"), "4");
    }

    #[test]
    fn test_division_by_zero_while_chaining() {
        let calc = calc_after("8 / 0 +");
        let snap = calc.snapshot();
        assert_eq!(snap.display, ERROR_TOKEN);
        assert_eq!(snap.first_operand, None);
        assert_eq!(snap.operator, None);
        assert!(snap.awaiting_second_operand);
    }

    #[test]
    fn test_digit_after_error_starts_new_number() {
        assert_eq!(display_after("8 / 0 = 7"), "7");
        assert_eq!(display_after("8 / 0 = 3 + 4 ="), "7");
    }

    #[test]
    fn test_operator_on_error_display_fails() {
        let calc = calc_after("8 / 0 = -");
        assert_eq!(calc.current_display(), ERROR_TOKEN);
        assert_eq!(calc.snapshot().operator, None);
    }

    // === Equals ===

    #[test]
    fn test_equals_without_pending_operation_is_noop() {
        assert_eq!(display_after("4 2 ="), "42");
        assert_eq!(display_after("="), "0");
    }

    #[test]
    fn test_equals_division_by_zero_resets() {
        let calc = calc_after("5 / 0 =");
        let snap = calc.snapshot();
        assert_eq!(snap.display, ERROR_TOKEN);
        assert_eq!(snap.first_operand, None);
        assert_eq!(snap.operator, None);
        assert!(snap.awaiting_second_operand);
    }

    #[test]
    fn test_equals_clears_operator_by_default() {
        let calc = calc_after("2 + 3 =");
        let snap = calc.snapshot();
        assert_eq!(snap.first_operand, None);
        assert_eq!(snap.operator, None);
        assert!(snap.awaiting_second_operand);
        assert_eq!(display_after("2 + 3 = = ="), "5");
    }

    #[test]
    fn test_repeat_policy_reapplies_last_operation() {
        let options = EngineOptions {
            equals: EqualsPolicy::Repeat,
        };
        let mut calc = calc_with(options, "2 + 3 =");
        assert_eq!(calc.current_display(), "5");
        assert_eq!(calc.handle_key(KeyEvent::Equals), "8");
        assert_eq!(calc.handle_key(KeyEvent::Equals), "11");
        // Any other key forgets the remembered operation.
        calc.handle_key(KeyEvent::Digit(1));
        assert_eq!(calc.handle_key(KeyEvent::Equals), "1");
    }

    #[test]
    fn test_repeat_policy_keeps_invariant() {
        let options = EngineOptions {
            equals: EqualsPolicy::Repeat,
        };
        let snap = calc_with(options, "6 / 2 = =").snapshot();
        assert_eq!(snap.display, "1.5");
        assert_eq!(snap.operator, None);
        assert_eq!(
            snap.last_operation,
            Some(LastOperation {
                operator: Operator::Divide,
                operand: 2.0
            })
        );
    }

    #[test]
    fn test_overflow_on_compute_resets() {
        let calc = calc_after("9 9 9 9 9 9 9 9 * 1 0 =");
        let snap = calc.snapshot();
        assert_eq!(snap.display, ERROR_TOKEN);
        assert_eq!(snap.first_operand, None);
        assert!(snap.awaiting_second_operand);

        let chained = calc_after("9 9 9 9 9 9 9 9 + 1 +");
        assert_eq!(chained.current_display(), ERROR_TOKEN);
        assert_eq!(chained.snapshot().operator, None);
    }

    #[test]
    fn test_results_are_clamped() {
        assert_eq!(display_after("1 / 3 ="), "0.333333");
        assert_eq!(display_after("2 0 / 3 ="), "6.666667");
        assert_eq!(display_after(". 1 + . 2 ="), "0.3");
    }

    // === Percent ===

    #[test]
    fn test_percent_with_addition() {
        let calc = calc_after("2 0 0 + 1 0 %");
        let snap = calc.snapshot();
        assert_eq!(snap.display, "220");
        assert_eq!(snap.first_operand, None);
        assert_eq!(snap.operator, None);
        assert!(snap.awaiting_second_operand);
    }

    #[test]
    fn test_percent_with_subtraction() {
        assert_eq!(display_after("2 0 0 - 1 0 %"), "180");
    }

    #[test]
    fn test_percent_with_multiplication() {
        assert_eq!(display_after("2 0 0 * 1 0 %"), "20");
    }

    #[test]
    fn test_percent_with_division() {
        // 50 is what percent of 200: 50 / 200 * 100
        assert_eq!(display_after("5 0 / 2 0 0 %"), "25");
        assert_eq!(display_after("5 0 / 0 %"), ERROR_TOKEN);
    }

    #[test]
    fn test_percent_without_operator() {
        assert_eq!(display_after("5 0 %"), "0.5");
        assert_eq!(display_after("2 + 3 = %"), "0.05");
    }

    #[test]
    fn test_percent_on_error_display() {
        let calc = calc_after("1 / 0 = %");
        assert_eq!(calc.current_display(), ERROR_TOKEN);
        assert!(calc.snapshot().awaiting_second_operand);
    }

    // === Square root and negate ===

    #[test]
    fn test_square_root() {
        let calc = calc_after("1 6 sqrt");
        assert_eq!(calc.current_display(), "4");
        assert!(calc.snapshot().awaiting_second_operand);
        assert_eq!(display_after("2 sqrt"), "1.414214");
    }

    #[test]
    fn test_square_root_of_negative_resets() {
        let calc = calc_after("9 + 4 neg sqrt");
        let snap = calc.snapshot();
        assert_eq!(snap.display, ERROR_TOKEN);
        assert_eq!(snap.first_operand, None);
        assert_eq!(snap.operator, None);
        assert!(snap.awaiting_second_operand);
    }

    #[test]
    fn test_negate() {
        let calc = calc_after("4 . 5 neg");
        assert_eq!(calc.current_display(), "-4.5");
        assert!(calc.snapshot().awaiting_second_operand);
        assert_eq!(display_after("4 neg neg"), "4");
        assert_eq!(display_after("neg"), "0");
    }

    #[test]
    fn test_negate_leaves_error_alone() {
        let calc = calc_after("1 / 0 = neg");
        assert_eq!(calc.current_display(), ERROR_TOKEN);
    }

    #[test]
    fn test_negated_operand_in_calculation() {
        assert_eq!(display_after("1 0 + 4 neg ="), "6");
    }

    // === Clearing ===

    #[test]
    fn test_clear_entry_keeps_pending_operation() {
        let calc = calc_after("2 + 9 CE CE CE");
        let snap = calc.snapshot();
        assert_eq!(snap.display, "0");
        assert_eq!(snap.first_operand, Some(2.0));
        assert_eq!(snap.operator, Some(Operator::Add));
        assert_eq!(display_after("2 + 9 CE 3 ="), "5");
    }

    #[test]
    fn test_clear_entry_keeps_memory() {
        let calc = calc_after("7 M+ CE CE");
        assert_eq!(calc.memory(), 7.0);
        assert_eq!(calc.current_display(), "0");
    }

    #[test]
    fn test_clear_all_resets_everything() {
        let calc = calc_after("7 M+ 2 + 3 AC");
        assert_eq!(calc.snapshot(), Calculator::new().snapshot());
    }

    // === Memory ===

    #[test]
    fn test_memory_add_and_subtract() {
        let calc = calc_after("1 0 M+ 4 M- 1 M+");
        assert_eq!(calc.memory(), 7.0);
        assert!(calc.snapshot().awaiting_second_operand);
    }

    #[test]
    fn test_memory_add_ignores_error_display() {
        let calc = calc_after("5 M+ 1 / 0 = M+");
        assert_eq!(calc.memory(), 5.0);
    }

    #[test]
    fn test_memory_recall_then_recall_clears() {
        let mut calc = calc_after("5 M+ MRC");
        assert_eq!(calc.current_display(), "5");
        assert!(calc.snapshot().memory_just_recalled);

        assert_eq!(calc.handle_key(KeyEvent::MemoryRecallOrClear), "0");
        assert_eq!(calc.memory(), 0.0);
        assert!(!calc.snapshot().memory_just_recalled);
    }

    #[test]
    fn test_memory_recall_interrupted_by_digit() {
        let calc = calc_after("5 M+ MRC 3 MRC");
        assert_eq!(calc.current_display(), "5");
        assert_eq!(calc.memory(), 5.0);
    }

    #[test]
    fn test_memory_recall_used_as_operand() {
        assert_eq!(display_after("4 M+ AC 1 0 + MRC ="), "10");
        assert_eq!(display_after("4 M+ CE 1 0 + MRC ="), "14");
    }

    #[test]
    fn test_recalled_value_is_not_extended() {
        assert_eq!(display_after("8 M+ CE MRC 1"), "1");
    }

    // === Display overflow ===

    #[test]
    fn test_tenth_digit_overflows() {
        let calc = calc_after("1 2 3 4 5 6 7 8 9 0");
        let snap = calc.snapshot();
        assert_eq!(snap.display, ERROR_TOKEN);
        assert!(!snap.awaiting_second_operand);
    }

    #[test]
    fn test_overflow_suppresses_digit_entry_until_cleared() {
        assert_eq!(display_after("1 2 3 4 5 6 7 8 9 0 5 5 ."), ERROR_TOKEN);
        assert_eq!(display_after("1 2 3 4 5 6 7 8 9 0 CE 5"), "5");
        assert_eq!(display_after("1 2 3 4 5 6 7 8 9 0 AC 5"), "5");
    }

    #[test]
    fn test_negating_nine_digits_overflows() {
        assert_eq!(display_after("1 2 3 4 5 6 7 8 9 neg"), ERROR_TOKEN);
    }

    #[test]
    fn test_negative_eight_digit_result_truncated() {
        // Integers keep their first eight characters, sign included.
        assert_eq!(display_after("0 - 1 2 3 4 5 6 7 8 ="), "-1234567");
    }

    #[test]
    fn test_out_of_range_digit_ignored() {
        let mut calc = Calculator::new();
        calc.handle_key(KeyEvent::Digit(4));
        assert_eq!(calc.handle_key(KeyEvent::Digit(12)), "4");

        // A bad key must not settle the recall toggle either.
        let mut calc = calc_after("5 M+ MRC");
        let before = calc.snapshot();
        assert!(before.memory_just_recalled);
        assert_eq!(calc.handle_key(KeyEvent::Digit(12)), "5");
        assert_eq!(calc.snapshot(), before);
        assert_eq!(calc.handle_key(KeyEvent::MemoryRecallOrClear), "0");
        assert_eq!(calc.memory(), 0.0);
    }

    #[test]
    fn test_out_of_range_digit_keeps_repeat_operation() {
        let options = EngineOptions {
            equals: EqualsPolicy::Repeat,
        };
        let mut calc = calc_with(options, "2 + 3 =");
        let before = calc.snapshot();
        calc.handle_key(KeyEvent::Digit(10));
        assert_eq!(calc.snapshot(), before);
        assert_eq!(calc.handle_key(KeyEvent::Equals), "8");
    }

    #[test]
    fn test_equals_on_overflowed_display_resets() {
        let mut calc = calc_after("1 + 1234567890");
        let before = calc.snapshot();
        assert_eq!(before.display, "Error");
        assert_eq!(before.first_operand, Some(1.0));
        assert_eq!(before.operator, Some(Operator::Add));
        assert!(!before.awaiting_second_operand);

        assert_eq!(calc.handle_key(KeyEvent::Equals), "0");
        let after = calc.snapshot();
        assert_eq!(after.first_operand, None);
        assert_eq!(after.operator, None);
        assert!(!after.awaiting_second_operand);
    }
}
