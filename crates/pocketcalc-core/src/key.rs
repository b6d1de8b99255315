use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CalcError;

// ---------------------------------------------------------------------------
// Operator
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
}

impl Operator {
    pub fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl std::str::FromStr for Operator {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "+" | "add" => Ok(Self::Add),
            "-" | "−" | "sub" => Ok(Self::Subtract),
            "*" | "×" | "x" | "mul" => Ok(Self::Multiply),
            "/" | "÷" | "div" => Ok(Self::Divide),
            _ => Err(CalcError::UnknownOperator(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// KeyEvent
// ---------------------------------------------------------------------------

/// One discrete key press on the calculator face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "key", content = "value", rename_all = "snake_case")]
pub enum KeyEvent {
    /// A single decimal digit, always in `0..=9`.
    Digit(u8),
    Decimal,
    Operator(Operator),
    Equals,
    ClearAll,
    ClearEntry,
    Percent,
    SquareRoot,
    Negate,
    MemoryAdd,
    MemorySubtract,
    MemoryRecallOrClear,
}

impl KeyEvent {
    /// Build a digit key, rejecting anything outside `0..=9`.
    pub fn digit(d: u8) -> Result<Self, CalcError> {
        if d <= 9 {
            Ok(Self::Digit(d))
        } else {
            Err(CalcError::InvalidKey(d.to_string()))
        }
    }

    /// Map a single character to a key, if the character names one.
    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0'..='9' => Some(Self::Digit(c as u8 - b'0')),
            '.' | ',' => Some(Self::Decimal),
            '=' => Some(Self::Equals),
            '%' => Some(Self::Percent),
            '√' => Some(Self::SquareRoot),
            '±' => Some(Self::Negate),
            _ => c.to_string().parse::<Operator>().ok().map(Self::Operator),
        }
    }
}

impl fmt::Display for KeyEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Digit(d) => write!(f, "{d}"),
            Self::Decimal => write!(f, "."),
            Self::Operator(op) => write!(f, "{op}"),
            Self::Equals => write!(f, "="),
            Self::ClearAll => write!(f, "AC"),
            Self::ClearEntry => write!(f, "CE"),
            Self::Percent => write!(f, "%"),
            Self::SquareRoot => write!(f, "sqrt"),
            Self::Negate => write!(f, "neg"),
            Self::MemoryAdd => write!(f, "M+"),
            Self::MemorySubtract => write!(f, "M-"),
            Self::MemoryRecallOrClear => write!(f, "MRC"),
        }
    }
}

impl std::str::FromStr for KeyEvent {
    type Err = CalcError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        let mut chars = token.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            if let Some(key) = Self::from_char(c) {
                return Ok(key);
            }
        }

        match token.to_lowercase().as_str() {
            "ac" | "clear-all" | "clearall" => Ok(Self::ClearAll),
            "ce" | "c" | "clear-entry" | "clearentry" => Ok(Self::ClearEntry),
            "sqrt" | "root" => Ok(Self::SquareRoot),
            "neg" | "negate" | "+/-" => Ok(Self::Negate),
            "m+" | "memory-add" => Ok(Self::MemoryAdd),
            "m-" | "memory-subtract" => Ok(Self::MemorySubtract),
            "mrc" | "mr" | "recall" => Ok(Self::MemoryRecallOrClear),
            "add" | "sub" | "mul" | "div" => token.parse().map(Self::Operator),
            _ => Err(CalcError::InvalidKey(token.to_string())),
        }
    }
}
