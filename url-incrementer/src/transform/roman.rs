//! Roman numeral selections (I..=MMMCMXCIX).

use super::Direction;
use crate::errors::TransformError;

/// Largest value expressible in standard roman notation.
pub const ROMAN_MAX: u32 = 3999;

const NUMERALS: [(u32, &str); 13] = [
    (1000, "M"),
    (900, "CM"),
    (500, "D"),
    (400, "CD"),
    (100, "C"),
    (90, "XC"),
    (50, "L"),
    (40, "XL"),
    (10, "X"),
    (9, "IX"),
    (5, "V"),
    (4, "IV"),
    (1, "I"),
];

/// Encodes a value in canonical uppercase roman notation.
#[must_use]
pub fn to_roman(mut value: u32) -> Option<String> {
    if value == 0 || value > ROMAN_MAX {
        return None;
    }
    let mut out = String::new();
    for (weight, symbol) in NUMERALS {
        while value >= weight {
            out.push_str(symbol);
            value -= weight;
        }
    }
    Some(out)
}

/// Decodes a canonical roman numeral, case-insensitively.
#[must_use]
pub fn from_roman(numeral: &str) -> Option<u32> {
    if numeral.is_empty() {
        return None;
    }
    let upper = numeral.to_ascii_uppercase();
    let mut rest = upper.as_str();
    let mut value = 0u32;
    for (weight, symbol) in NUMERALS {
        while let Some(stripped) = rest.strip_prefix(symbol) {
            value += weight;
            rest = stripped;
        }
    }
    if !rest.is_empty() {
        return None;
    }
    // Reject non-canonical spellings such as IIII or VX.
    (to_roman(value).as_deref() == Some(upper.as_str())).then_some(value)
}

/// Steps a roman numeral, clamping to `1..=3999`.
///
/// The result keeps the selection's case: an all-lowercase numeral stays
/// lowercase, anything else renders uppercase.
pub fn step_roman(
    direction: Direction,
    selection: &str,
    interval: u64,
) -> Result<String, TransformError> {
    let value = from_roman(selection)
        .ok_or_else(|| TransformError::InvalidRoman(selection.to_string()))?;
    let interval = u32::try_from(interval).unwrap_or(u32::MAX);
    let stepped = match direction {
        Direction::Increment => value.saturating_add(interval).min(ROMAN_MAX),
        Direction::Decrement => value.saturating_sub(interval).max(1),
    };
    let rendered =
        to_roman(stepped).ok_or_else(|| TransformError::InvalidRoman(selection.to_string()))?;

    if selection.chars().all(|c| c.is_ascii_lowercase()) {
        Ok(rendered.to_ascii_lowercase())
    } else {
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode() {
        assert_eq!(to_roman(1).as_deref(), Some("I"));
        assert_eq!(to_roman(14).as_deref(), Some("XIV"));
        assert_eq!(to_roman(1994).as_deref(), Some("MCMXCIV"));
        assert_eq!(to_roman(3999).as_deref(), Some("MMMCMXCIX"));
        assert_eq!(to_roman(0), None);
        assert_eq!(to_roman(4000), None);
    }

    #[test]
    fn test_decode() {
        assert_eq!(from_roman("XIV"), Some(14));
        assert_eq!(from_roman("mcmxciv"), Some(1994));
        assert_eq!(from_roman("IIII"), None);
        assert_eq!(from_roman("VX"), None);
        assert_eq!(from_roman("ABC"), None);
        assert_eq!(from_roman(""), None);
    }

    #[test]
    fn test_step() {
        assert_eq!(step_roman(Direction::Increment, "IX", 1).unwrap(), "X");
        assert_eq!(step_roman(Direction::Decrement, "x", 1).unwrap(), "ix");
        assert_eq!(step_roman(Direction::Increment, "XIV", 6).unwrap(), "XX");
    }

    #[test]
    fn test_step_clamps() {
        assert_eq!(step_roman(Direction::Decrement, "II", 5).unwrap(), "I");
        assert_eq!(step_roman(Direction::Increment, "MMMCM", 500).unwrap(), "MMMCMXCIX");
    }

    #[test]
    fn test_step_rejects_invalid() {
        assert_eq!(
            step_roman(Direction::Increment, "page", 1),
            Err(TransformError::InvalidRoman("page".to_string()))
        );
    }
}
