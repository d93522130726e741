//! Positional numeral systems over a caller-supplied alphabet.
//!
//! The first character of the alphabet is the zero digit, so an alphabet of
//! `"abc"` counts `a, b, c, ba, bb, ...`. Digits are compared exactly; no
//! case folding is applied.

use super::{Direction, MAX_SAFE_INTEGER};
use crate::errors::TransformError;

fn digits(alphabet: &str) -> Result<Vec<char>, TransformError> {
    let chars: Vec<char> = alphabet.chars().collect();
    if chars.len() < 2 {
        return Err(TransformError::InvalidAlphabet(
            "at least two characters are required".to_string(),
        ));
    }
    for (idx, c) in chars.iter().enumerate() {
        if chars[..idx].contains(c) {
            return Err(TransformError::InvalidAlphabet(format!(
                "character '{c}' appears more than once"
            )));
        }
    }
    Ok(chars)
}

fn parse(selection: &str, digits: &[char]) -> Option<u64> {
    let radix = u64::try_from(digits.len()).ok()?;
    selection.chars().try_fold(0u64, |acc, c| {
        let digit = u64::try_from(digits.iter().position(|d| *d == c)?).ok()?;
        acc.checked_mul(radix)?.checked_add(digit)
    })
}

fn render(mut value: u64, digits: &[char]) -> String {
    let radix = digits.len() as u64;
    let mut out = Vec::new();
    loop {
        #[allow(clippy::cast_possible_truncation)]
        out.push(digits[(value % radix) as usize]);
        value /= radix;
        if value == 0 {
            break;
        }
    }
    out.iter().rev().collect()
}

/// Steps a selection in the numeral system defined by `alphabet`.
pub fn step_alphabet(
    direction: Direction,
    selection: &str,
    alphabet: &str,
    interval: u64,
    leading_zeros: bool,
) -> Result<String, TransformError> {
    let digits = digits(alphabet)?;
    let value = parse(selection, &digits).ok_or_else(|| {
        TransformError::InvalidAlphabet(format!("'{selection}' is not written in '{alphabet}'"))
    })?;

    let stepped = match direction {
        Direction::Increment => value.saturating_add(interval).min(MAX_SAFE_INTEGER),
        Direction::Decrement => value.saturating_sub(interval),
    };

    let mut rendered = render(stepped, &digits);
    let width = selection.chars().count();
    let rendered_width = rendered.chars().count();
    if leading_zeros && width > rendered_width {
        let pad: String = std::iter::repeat(digits[0]).take(width - rendered_width).collect();
        rendered.insert_str(0, &pad);
    }
    Ok(rendered)
}
