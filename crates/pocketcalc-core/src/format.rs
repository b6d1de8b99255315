//! Display text: number formatting, width clamping and defensive parsing.
//!
//! The display is nine characters wide. One position is reserved for a sign,
//! leaving eight for digits and the decimal point.

use crate::error::{CalcError, CalcResult};

/// Widest text the display can show, sign and decimal point included.
pub const MAX_DISPLAY_LEN: usize = 9;

/// Shown in place of a number after any failed computation or overflow.
pub const ERROR_TOKEN: &str = "Error";

const MAX_DIGITS: usize = MAX_DISPLAY_LEN - 1;

/// Shortest decimal text for `value`, without exponent notation.
///
/// Negative zero is rendered as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".into();
    }
    format!("{value}")
}

/// Format a computed result so it fits on the display.
///
/// Fractions are rounded to as many places as fit. Integers keep their
/// leading eight characters, so a negative eight-digit integer loses its
/// last digit; long-standing behaviour that existing users rely on.
pub fn clamp(value: f64) -> CalcResult<String> {
    if !value.is_finite() {
        return Err(CalcError::NonFinite);
    }

    let int_digits = integer_digits(&format_number(value.abs().trunc()));
    if int_digits > MAX_DIGITS {
        return Err(CalcError::Overflow(value));
    }

    if value.fract() == 0.0 {
        return Ok(format_number(value).chars().take(MAX_DIGITS).collect());
    }

    // One position goes to the decimal point itself.
    let decimals = MAX_DIGITS.saturating_sub(int_digits + 1);
    let rounded = format!("{value:.decimals$}");
    let trimmed = if rounded.contains('.') {
        rounded.trim_end_matches('0').trim_end_matches('.')
    } else {
        rounded.as_str()
    };

    // Rounding may carry into a ninth integer digit (99999999.6).
    if integer_digits(trimmed) > MAX_DIGITS {
        return Err(CalcError::Overflow(value));
    }

    Ok(match trimmed {
        "-0" => "0".to_string(),
        other => other.to_string(),
    })
}

/// Parse display text back into a number.
///
/// Only plain numerals are accepted: an optional leading `-`, digits and at
/// most one `.`. Everything else, the error token included, is `NotANumber`.
pub fn parse_display(text: &str) -> CalcResult<f64> {
    if !is_numeral(text) {
        return Err(CalcError::NotANumber(text.to_string()));
    }
    text.parse::<f64>()
        .map_err(|_| CalcError::NotANumber(text.to_string()))
}

/// True when the text is longer than the display can show.
pub fn exceeds_display(text: &str) -> bool {
    text.chars().count() > MAX_DISPLAY_LEN
}

fn is_numeral(text: &str) -> bool {
    let body = text.strip_prefix('-').unwrap_or(text);
    let mut digits = 0;
    let mut points = 0;
    for c in body.chars() {
        match c {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

fn integer_digits(text: &str) -> usize {
    text.trim_start_matches('-')
        .split('.')
        .next()
        .map_or(0, str::len)
}
