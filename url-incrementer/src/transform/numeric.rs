//! Integer selections in radix 2-36.

use super::{BaseCase, Direction};
use crate::errors::TransformError;

/// Largest integer a step may reach, `2^53 - 1`.
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Parses a selection as an unsigned integer in the given radix.
pub fn parse_numeric(selection: &str, radix: u32) -> Result<u64, TransformError> {
    if !(2..=36).contains(&radix) {
        return Err(TransformError::UnsupportedRadix(radix));
    }
    if selection.is_empty() || !selection.chars().all(|c| c.is_digit(radix)) {
        return Err(TransformError::InvalidNumber {
            selection: selection.to_string(),
            radix,
        });
    }
    u64::from_str_radix(selection, radix).map_err(|_| TransformError::InvalidNumber {
        selection: selection.to_string(),
        radix,
    })
}

/// Renders a value in the given radix using lowercase digits.
#[must_use]
pub fn render_radix(mut value: u64, radix: u32) -> String {
    if value == 0 {
        return "0".to_string();
    }
    let radix64 = u64::from(radix);
    let mut digits = Vec::new();
    while value > 0 {
        #[allow(clippy::cast_possible_truncation)]
        let digit = (value % radix64) as u32;
        if let Some(c) = char::from_digit(digit, radix) {
            digits.push(c);
        }
        value /= radix64;
    }
    digits.iter().rev().collect()
}

/// Steps a numeric selection, clamping to `[0, MAX_SAFE_INTEGER]`.
pub fn step_numeric(
    direction: Direction,
    selection: &str,
    radix: u32,
    interval: u64,
    base_case: BaseCase,
    leading_zeros: bool,
) -> Result<String, TransformError> {
    let value = parse_numeric(selection, radix)?;
    let stepped = match direction {
        Direction::Increment => value.saturating_add(interval).min(MAX_SAFE_INTEGER),
        Direction::Decrement => value.saturating_sub(interval),
    };

    let mut rendered = render_radix(stepped, radix);
    let width = selection.chars().count();
    if leading_zeros && width > rendered.len() {
        rendered = format!("{}{}", "0".repeat(width - rendered.len()), rendered);
    }
    if rendered.chars().any(|c| c.is_ascii_alphabetic()) {
        rendered = base_case.apply(&rendered);
    }
    Ok(rendered)
}
