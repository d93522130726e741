//! Value transformation of a URL selection.
//!
//! A transformation takes the selected substring of a URL and returns the
//! substring that should replace it after one increment or decrement step.
//! The interpretation of the selection depends on the [`Base`]:
//!
//! - **Numeric** bases 2-36 with case folding and leading-zero padding
//! - **Date** selections described by a token format such as `yyyy/mm/dd`
//! - **Roman** numerals (1-3999)
//! - **Custom** alphabets forming a positional numeral system
//!
//! All transforms are pure. Failures are reported as [`TransformError`];
//! [`transform_or_sentinel`] converts them into the sentinel string callers
//! treat as a failed, no-op transform.

mod alphabet;
mod date;
mod numeric;
mod roman;

pub use alphabet::step_alphabet;
pub use date::step_date;
pub use numeric::{parse_numeric, render_radix, step_numeric, MAX_SAFE_INTEGER};
pub use roman::{from_roman, step_roman, to_roman, ROMAN_MAX};

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::TransformError;

/// Sentinel returned by [`transform_or_sentinel`] when a transform fails.
pub const ERROR_SENTINEL: &str = "DateError";

/// Direction of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Move forward (larger values, later dates).
    #[default]
    Increment,
    /// Move backward (smaller values, earlier dates).
    Decrement,
}

impl Direction {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Increment => Self::Decrement,
            Self::Decrement => Self::Increment,
        }
    }

    /// Returns the direction name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Increment => "increment",
            Self::Decrement => "decrement",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Letter case used when a rendered value contains letters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseCase {
    /// `a-z`
    #[default]
    Lowercase,
    /// `A-Z`
    Uppercase,
}

impl BaseCase {
    /// Applies this case to a string.
    #[must_use]
    pub fn apply(self, value: &str) -> String {
        match self {
            Self::Lowercase => value.to_lowercase(),
            Self::Uppercase => value.to_uppercase(),
        }
    }
}

/// How a selection is interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Base {
    /// Integer in the given radix (2-36).
    Numeric(u32),
    /// Date described by a token format, e.g. `yyyy/mm/dd`.
    Date(String),
    /// Roman numeral.
    Roman,
    /// Positional numeral system over the given alphabet.
    Custom(String),
}

impl Default for Base {
    fn default() -> Self {
        Self::Numeric(10)
    }
}

impl Base {
    /// Returns the radix when this is a numeric base.
    #[must_use]
    pub const fn radix(&self) -> Option<u32> {
        match self {
            Self::Numeric(radix) => Some(*radix),
            _ => None,
        }
    }

    /// Whether this is a numeric base.
    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Numeric(_))
    }
}

/// Parameters of a transformation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformParams {
    /// Step size, always positive.
    pub interval: u64,
    /// Interpretation of the selection.
    pub base: Base,
    /// Case of letters in rendered numeric values.
    pub base_case: BaseCase,
    /// Left-pad results to the original selection width.
    pub leading_zeros: bool,
}

impl Default for TransformParams {
    fn default() -> Self {
        Self {
            interval: 1,
            base: Base::default(),
            base_case: BaseCase::default(),
            leading_zeros: false,
        }
    }
}

impl TransformParams {
    /// Creates decimal parameters with the given interval.
    #[must_use]
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            ..Default::default()
        }
    }

    /// Sets the base.
    #[must_use]
    pub fn with_base(mut self, base: Base) -> Self {
        self.base = base;
        self
    }

    /// Sets the letter case.
    #[must_use]
    pub fn with_case(mut self, base_case: BaseCase) -> Self {
        self.base_case = base_case;
        self
    }

    /// Enables or disables leading-zero padding.
    #[must_use]
    pub fn with_leading_zeros(mut self, leading_zeros: bool) -> Self {
        self.leading_zeros = leading_zeros;
        self
    }
}

/// Transforms a selection one step in the given direction.
pub fn transform(
    direction: Direction,
    selection: &str,
    params: &TransformParams,
) -> Result<String, TransformError> {
    if selection.is_empty() {
        return Err(TransformError::EmptySelection);
    }

    match &params.base {
        Base::Numeric(radix) => step_numeric(
            direction,
            selection,
            *radix,
            params.interval,
            params.base_case,
            params.leading_zeros,
        ),
        Base::Date(format) => step_date(direction, selection, params.interval, format),
        Base::Roman => step_roman(direction, selection, params.interval),
        Base::Custom(alphabet) => step_alphabet(
            direction,
            selection,
            alphabet,
            params.interval,
            params.leading_zeros,
        ),
    }
}

/// Transforms a selection, returning [`ERROR_SENTINEL`] on failure.
#[must_use]
pub fn transform_or_sentinel(
    direction: Direction,
    selection: &str,
    params: &TransformParams,
) -> String {
    transform(direction, selection, params).unwrap_or_else(|error| {
        tracing::debug!(%direction, selection, %error, "Transform failed");
        ERROR_SENTINEL.to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(radix: u32, base_case: BaseCase, leading_zeros: bool) -> TransformParams {
        TransformParams::new(1)
            .with_base(Base::Numeric(radix))
            .with_case(base_case)
            .with_leading_zeros(leading_zeros)
    }

    #[test]
    fn test_leading_zeros() {
        let p = params(10, BaseCase::Lowercase, true);
        assert_eq!(transform(Direction::Increment, "007", &p).unwrap(), "008");
        assert_eq!(transform(Direction::Increment, "09", &p).unwrap(), "10");
        assert_eq!(transform(Direction::Increment, "099", &p).unwrap(), "100");
    }

    #[test]
    fn test_case_and_carry() {
        let p = params(16, BaseCase::Uppercase, false);
        assert_eq!(transform(Direction::Increment, "ff", &p).unwrap(), "100");
        assert_eq!(transform(Direction::Increment, "fe", &p).unwrap(), "FF");
    }

    #[test]
    fn test_round_trip_all_radixes() {
        for radix in 2..=36 {
            let p = TransformParams::new(7).with_base(Base::Numeric(radix));
            let original = render_radix(12_345, radix);
            let up = transform(Direction::Increment, &original, &p).unwrap();
            let down = transform(Direction::Decrement, &up, &p).unwrap();
            assert_eq!(down, original, "radix {radix}");
        }
    }

    #[test]
    fn test_date_dispatch() {
        let p = TransformParams::new(1).with_base(Base::Date("yyyy-mm-dd".to_string()));
        assert_eq!(
            transform(Direction::Increment, "2023-01-31", &p).unwrap(),
            "2023-02-01"
        );
    }

    #[test]
    fn test_empty_selection() {
        let p = TransformParams::default();
        assert_eq!(
            transform(Direction::Increment, "", &p),
            Err(TransformError::EmptySelection)
        );
    }

    #[test]
    fn test_sentinel_on_failure() {
        let p = TransformParams::new(1).with_base(Base::Date("yyyy-mm-dd".to_string()));
        assert_eq!(
            transform_or_sentinel(Direction::Increment, "not-a-date", &p),
            ERROR_SENTINEL
        );
    }

    #[test]
    fn test_base_serde() {
        let json = serde_json::to_value(Base::Date("yyyy/mm/dd".to_string())).unwrap();
        assert_eq!(json, serde_json::json!({"type": "date", "value": "yyyy/mm/dd"}));

        let base: Base = serde_json::from_value(serde_json::json!({"type": "numeric", "value": 16})).unwrap();
        assert_eq!(base, Base::Numeric(16));

        let roman: Base = serde_json::from_value(serde_json::json!({"type": "roman"})).unwrap();
        assert_eq!(roman, Base::Roman);
    }

    #[test]
    fn test_direction_reverse() {
        assert_eq!(Direction::Increment.reverse(), Direction::Decrement);
        assert_eq!(Direction::Decrement.to_string(), "decrement");
    }
}
