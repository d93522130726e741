//! Date selections described by a token format.
//!
//! Format alphabet: `y` year, `m`/`M` month, `d` day, `h` hour, `i` minute,
//! `s` second, `l` millisecond. Supported tokens:
//!
//! | Field  | Tokens                                         |
//! |--------|------------------------------------------------|
//! | year   | `yyyy`, `yy`                                   |
//! | month  | `mmmm`, `Mmmm`, `MMMM`, `mmm`, `Mmm`, `MMM`, `mm`, `m` |
//! | day    | `dd`, `d`                                      |
//! | hour   | `hh`, `h`                                      |
//! | minute | `ii`, `i`                                      |
//! | second | `ss`, `s`                                      |
//! | milli  | `ll`, `l`                                      |
//!
//! Other letter runs from the alphabet (`yyy`, `MM`) consume their slice of
//! the selection and are copied through unchanged.
//!
//! Any other character run is a literal delimiter. Only the finest field in
//! the format is stepped; calendar arithmetic carries into coarser fields.

use chrono::{Datelike, Months, NaiveDate, NaiveDateTime, TimeDelta, Timelike};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

use super::Direction;
use crate::errors::TransformError;

const MONTHS_SHORT: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

const MONTHS_LONG: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

#[allow(clippy::expect_used)]
static TOKEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"y+|Mm+|M+|m+|d+|h+|i+|s+|l+|[^ymMdhisl]+").expect("token pattern is valid")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NameCase {
    Lower,
    Capitalized,
    Upper,
}

impl NameCase {
    fn apply(self, name: &str) -> String {
        match self {
            Self::Lower => name.to_string(),
            Self::Upper => name.to_uppercase(),
            Self::Capitalized => {
                let mut chars = name.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year4,
    Year2,
    MonthLong(NameCase),
    MonthShort(NameCase),
    Month { padded: bool },
    Day { padded: bool },
    Hour { padded: bool },
    Minute { padded: bool },
    Second { padded: bool },
    Milli { padded: bool },
    /// An unrecognized run; its text is carried over as is.
    Ignored,
}

/// Calendar granularity, finest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Granularity {
    Milli,
    Second,
    Minute,
    Hour,
    Day,
    Month,
    Year,
}

impl Field {
    fn classify(text: &str) -> Option<Self> {
        let field = match text {
            "yyyy" => Self::Year4,
            "yy" => Self::Year2,
            "mmmm" => Self::MonthLong(NameCase::Lower),
            "Mmmm" => Self::MonthLong(NameCase::Capitalized),
            "MMMM" => Self::MonthLong(NameCase::Upper),
            "mmm" => Self::MonthShort(NameCase::Lower),
            "Mmm" => Self::MonthShort(NameCase::Capitalized),
            "MMM" => Self::MonthShort(NameCase::Upper),
            "mm" => Self::Month { padded: true },
            "m" => Self::Month { padded: false },
            "dd" => Self::Day { padded: true },
            "d" => Self::Day { padded: false },
            "hh" => Self::Hour { padded: true },
            "h" => Self::Hour { padded: false },
            "ii" => Self::Minute { padded: true },
            "i" => Self::Minute { padded: false },
            "ss" => Self::Second { padded: true },
            "s" => Self::Second { padded: false },
            "ll" => Self::Milli { padded: true },
            "l" => Self::Milli { padded: false },
            _ => return None,
        };
        Some(field)
    }

    const fn granularity(self) -> Option<Granularity> {
        let granularity = match self {
            Self::Year4 | Self::Year2 => Granularity::Year,
            Self::MonthLong(_) | Self::MonthShort(_) | Self::Month { .. } => Granularity::Month,
            Self::Day { .. } => Granularity::Day,
            Self::Hour { .. } => Granularity::Hour,
            Self::Minute { .. } => Granularity::Minute,
            Self::Second { .. } => Granularity::Second,
            Self::Milli { .. } => Granularity::Milli,
            Self::Ignored => return None,
        };
        Some(granularity)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Token {
    Field { field: Field, width: usize },
    Literal(String),
}

fn tokenize(format: &str) -> Result<Vec<Token>, TransformError> {
    let mut tokens = Vec::new();
    for m in TOKEN_RE.find_iter(format) {
        let text = m.as_str();
        let is_field = text
            .chars()
            .next()
            .is_some_and(|c| "ymMdhisl".contains(c));
        if is_field {
            let field = Field::classify(text).unwrap_or_else(|| {
                debug!(format, token = text, "Ignoring unknown date token");
                Field::Ignored
            });
            tokens.push(Token::Field {
                field,
                width: text.chars().count(),
            });
        } else {
            tokens.push(Token::Literal(text.to_string()));
        }
    }
    if !tokens.iter().any(|t| matches!(t, Token::Field { .. })) {
        return Err(TransformError::date_format(format, "no date fields"));
    }
    Ok(tokens)
}

/// Slices a delimiter-free chunk of the selection across consecutive fields.
fn slice_fields<'a>(
    chunk: &'a str,
    fields: &[(Field, usize)],
    selection: &str,
) -> Result<Vec<(Field, &'a str)>, TransformError> {
    if let [(field, _)] = fields {
        return Ok(vec![(*field, chunk)]);
    }

    let expected: usize = fields.iter().map(|(_, width)| width).sum();
    if chunk.chars().count() != expected {
        return Err(TransformError::date_value(
            selection,
            format!("expected {expected} characters for fixed-width fields"),
        ));
    }

    let mut out = Vec::with_capacity(fields.len());
    let mut rest = chunk;
    for (field, width) in fields {
        let split = rest
            .char_indices()
            .nth(*width)
            .map_or(rest.len(), |(idx, _)| idx);
        out.push((*field, &rest[..split]));
        rest = &rest[split..];
    }
    Ok(out)
}

/// Aligns the selection with the format's field tokens.
fn align<'a>(
    tokens: &[Token],
    selection: &'a str,
) -> Result<Vec<(Field, &'a str)>, TransformError> {
    let mut values = Vec::new();
    let mut pending: Vec<(Field, usize)> = Vec::new();
    let mut rest = selection;

    for token in tokens {
        match token {
            Token::Field { field, width } => pending.push((*field, *width)),
            Token::Literal(delimiter) => {
                let pos = rest.find(delimiter.as_str()).ok_or_else(|| {
                    TransformError::date_value(selection, format!("missing delimiter '{delimiter}'"))
                })?;
                let chunk = &rest[..pos];
                if pending.is_empty() {
                    if !chunk.is_empty() {
                        return Err(TransformError::date_value(
                            selection,
                            format!("unexpected text before '{delimiter}'"),
                        ));
                    }
                } else {
                    values.extend(slice_fields(chunk, &pending, selection)?);
                    pending.clear();
                }
                rest = &rest[pos + delimiter.len()..];
            }
        }
    }

    if pending.is_empty() {
        if !rest.is_empty() {
            return Err(TransformError::date_value(selection, "trailing text"));
        }
    } else {
        values.extend(slice_fields(rest, &pending, selection)?);
    }
    Ok(values)
}

#[derive(Debug, Clone, Copy)]
struct DateParts {
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
    second: u32,
    milli: u32,
}

impl Default for DateParts {
    fn default() -> Self {
        Self {
            year: 2000,
            month: 1,
            day: 15,
            hour: 12,
            minute: 0,
            second: 0,
            milli: 0,
        }
    }
}

fn parse_digits(value: &str, selection: &str) -> Result<u32, TransformError> {
    if value.is_empty() || !value.chars().all(|c| c.is_ascii_digit()) {
        return Err(TransformError::date_value(
            selection,
            format!("'{value}' is not a number"),
        ));
    }
    value
        .parse()
        .map_err(|_| TransformError::date_value(selection, format!("'{value}' is out of range")))
}

fn month_index(table: &[&str; 12], value: &str, selection: &str) -> Result<u32, TransformError> {
    let lower = value.to_lowercase();
    table
        .iter()
        .position(|name| *name == lower)
        .and_then(|idx| u32::try_from(idx + 1).ok())
        .ok_or_else(|| TransformError::date_value(selection, format!("unknown month '{value}'")))
}

fn parse_parts(values: &[(Field, &str)], selection: &str) -> Result<DateParts, TransformError> {
    let mut parts = DateParts::default();
    for (field, value) in values {
        match field {
            Field::Year4 => {
                parts.year = i32::try_from(parse_digits(value, selection)?)
                    .map_err(|_| TransformError::date_value(selection, "year out of range"))?;
            }
            Field::Year2 => {
                let short = i32::try_from(parse_digits(value, selection)?)
                    .map_err(|_| TransformError::date_value(selection, "year out of range"))?;
                parts.year = if short < 71 { 2000 + short } else { 1900 + short };
            }
            Field::MonthLong(_) => parts.month = month_index(&MONTHS_LONG, value, selection)?,
            Field::MonthShort(_) => parts.month = month_index(&MONTHS_SHORT, value, selection)?,
            Field::Month { .. } => parts.month = parse_digits(value, selection)?,
            Field::Day { .. } => parts.day = parse_digits(value, selection)?,
            Field::Hour { .. } => parts.hour = parse_digits(value, selection)?,
            Field::Minute { .. } => parts.minute = parse_digits(value, selection)?,
            Field::Second { .. } => parts.second = parse_digits(value, selection)?,
            Field::Milli { .. } => parts.milli = parse_digits(value, selection)?,
            Field::Ignored => {}
        }
    }
    Ok(parts)
}

fn build_datetime(parts: DateParts, selection: &str) -> Result<NaiveDateTime, TransformError> {
    NaiveDate::from_ymd_opt(parts.year, parts.month, parts.day)
        .and_then(|date| date.and_hms_milli_opt(parts.hour, parts.minute, parts.second, parts.milli))
        .ok_or_else(|| TransformError::date_value(selection, "not a valid calendar date"))
}

fn add_months(dt: NaiveDateTime, months: i64) -> Option<NaiveDateTime> {
    let magnitude = u32::try_from(months.unsigned_abs()).ok()?;
    if months >= 0 {
        dt.checked_add_months(Months::new(magnitude))
    } else {
        dt.checked_sub_months(Months::new(magnitude))
    }
}

fn shift(dt: NaiveDateTime, granularity: Granularity, amount: i64) -> Option<NaiveDateTime> {
    match granularity {
        Granularity::Milli => dt.checked_add_signed(TimeDelta::try_milliseconds(amount)?),
        Granularity::Second => dt.checked_add_signed(TimeDelta::try_seconds(amount)?),
        Granularity::Minute => dt.checked_add_signed(TimeDelta::try_minutes(amount)?),
        Granularity::Hour => dt.checked_add_signed(TimeDelta::try_hours(amount)?),
        Granularity::Day => dt.checked_add_signed(TimeDelta::try_days(amount)?),
        Granularity::Month => {
            // Month steps land on the first of the month so short months never clamp.
            let first = dt.with_day(1)?;
            add_months(first, amount)
        }
        Granularity::Year => add_months(dt, amount.checked_mul(12)?),
    }
}

fn render(field: Field, original: &str, dt: &NaiveDateTime) -> String {
    let month0 = dt.month0() as usize;
    let pad = |padded: bool, value: u32| {
        if padded {
            format!("{value:02}")
        } else {
            value.to_string()
        }
    };
    match field {
        Field::Year4 => format!("{:04}", dt.year()),
        Field::Year2 => format!("{:02}", dt.year().rem_euclid(100)),
        Field::MonthLong(case) => case.apply(MONTHS_LONG[month0]),
        Field::MonthShort(case) => case.apply(MONTHS_SHORT[month0]),
        Field::Month { padded } => pad(padded, dt.month()),
        Field::Day { padded } => pad(padded, dt.day()),
        Field::Hour { padded } => pad(padded, dt.hour()),
        Field::Minute { padded } => pad(padded, dt.minute()),
        Field::Second { padded } => pad(padded, dt.second()),
        Field::Milli { padded } => {
            let milli = dt.nanosecond() / 1_000_000;
            if padded {
                format!("{milli:03}")
            } else {
                milli.to_string()
            }
        }
        Field::Ignored => original.to_string(),
    }
}

/// Steps a date selection by `interval` units of the format's finest field.
pub fn step_date(
    direction: Direction,
    selection: &str,
    interval: u64,
    format: &str,
) -> Result<String, TransformError> {
    let tokens = tokenize(format)?;
    let values = align(&tokens, selection)?;
    let parts = parse_parts(&values, selection)?;
    let dt = build_datetime(parts, selection)?;

    let lowest = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Field { field, .. } => field.granularity(),
            Token::Literal(_) => None,
        })
        .min()
        .ok_or_else(|| TransformError::date_format(format, "no date fields"))?;

    let magnitude = i64::try_from(interval)
        .map_err(|_| TransformError::date_value(selection, "interval out of range"))?;
    let amount = match direction {
        Direction::Increment => magnitude,
        Direction::Decrement => -magnitude,
    };
    let shifted = shift(dt, lowest, amount)
        .ok_or_else(|| TransformError::date_value(selection, "date out of range"))?;

    let mut originals = values.iter().map(|(_, value)| *value);
    let rendered = tokens
        .iter()
        .map(|token| match token {
            Token::Field { field, .. } => {
                render(*field, originals.next().unwrap_or_default(), &shifted)
            }
            Token::Literal(text) => text.clone(),
        })
        .collect();
    Ok(rendered)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inc(selection: &str, format: &str) -> Result<String, TransformError> {
        step_date(Direction::Increment, selection, 1, format)
    }

    fn dec(selection: &str, format: &str) -> Result<String, TransformError> {
        step_date(Direction::Decrement, selection, 1, format)
    }

    #[test]
    fn test_day_rollover() {
        assert_eq!(inc("2023-01-31", "yyyy-mm-dd").unwrap(), "2023-02-01");
        assert_eq!(inc("2023/12/31", "yyyy/mm/dd").unwrap(), "2024/01/01");
        assert_eq!(dec("2024-03-01", "yyyy-mm-dd").unwrap(), "2024-02-29");
    }

    #[test]
    fn test_month_is_lowest_field() {
        assert_eq!(inc("2023/12", "yyyy/mm").unwrap(), "2024/01");
        assert_eq!(dec("01-2023", "mm-yyyy").unwrap(), "12-2022");
    }

    #[test]
    fn test_year_only() {
        assert_eq!(step_date(Direction::Increment, "1999", 5, "yyyy").unwrap(), "2004");
    }

    #[test]
    fn test_two_digit_year() {
        assert_eq!(inc("12/31/70", "mm/dd/yy").unwrap(), "01/01/71");
        assert_eq!(inc("12/31/99", "mm/dd/yy").unwrap(), "01/01/00");
    }

    #[test]
    fn test_month_names() {
        assert_eq!(inc("jan-2020", "mmm-yyyy").unwrap(), "feb-2020");
        assert_eq!(inc("Dec-2020", "Mmm-yyyy").unwrap(), "Jan-2021");
        assert_eq!(inc("MARCH 2020", "MMMM yyyy").unwrap(), "APRIL 2020");
        assert_eq!(inc("september/2020", "Mmmm/yyyy").unwrap(), "October/2020");
    }

    #[test]
    fn test_unpadded_fields() {
        assert_eq!(inc("9-9-2020", "m-d-yyyy").unwrap(), "9-10-2020");
        assert_eq!(inc("2020-1-31", "yyyy-m-d").unwrap(), "2020-2-1");
    }

    #[test]
    fn test_time_fields() {
        assert_eq!(
            inc("2020-01-01 23:59:59", "yyyy-mm-dd hh:ii:ss").unwrap(),
            "2020-01-02 00:00:00"
        );
        assert_eq!(inc("10:59", "hh:ii").unwrap(), "11:00");
        assert_eq!(inc("12:00:00.999", "hh:ii:ss.ll").unwrap(), "12:00:01.000");
    }

    #[test]
    fn test_fixed_width_without_delimiters() {
        assert_eq!(inc("20230131", "yyyymmdd").unwrap(), "20230201");
        assert_eq!(dec("200001", "yyyymm").unwrap(), "199912");
    }

    #[test]
    fn test_fixed_width_mismatch_fails_closed() {
        assert!(inc("2023131", "yyyymmdd").is_err());
    }

    #[test]
    fn test_mixed_delimited_and_fixed_segments() {
        assert_eq!(inc("2023/0131", "yyyy/mmdd").unwrap(), "2023/0201");
    }

    #[test]
    fn test_unknown_tokens_are_carried_over() {
        assert_eq!(inc("abc-05", "yyy-mm").unwrap(), "abc-06");
        assert_eq!(inc("2023-01-XY", "yyyy-mm-MM").unwrap(), "2023-02-XY");
        assert_eq!(inc("2023ab31", "yyyyMMdd").unwrap(), "2023ab01");
    }

    #[test]
    fn test_only_unknown_tokens_rejected() {
        assert!(matches!(inc("2023", "yyy"), Err(TransformError::DateFormat { .. })));
        assert!(matches!(inc("01", "MM"), Err(TransformError::DateFormat { .. })));
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(inc("2023-02-30", "yyyy-mm-dd").is_err());
        assert!(inc("2023-ab-01", "yyyy-mm-dd").is_err());
        assert!(inc("2023/01/01", "yyyy-mm-dd").is_err());
        assert!(inc("foo-2020", "mmm-yyyy").is_err());
    }

    #[test]
    fn test_multi_unit_interval() {
        assert_eq!(
            step_date(Direction::Increment, "2023-01-25", 10, "yyyy-mm-dd").unwrap(),
            "2023-02-04"
        );
    }

    #[test]
    fn test_name_case() {
        assert_eq!(NameCase::Capitalized.apply("may"), "May");
        assert_eq!(NameCase::Upper.apply("may"), "MAY");
        assert_eq!(NameCase::Lower.apply("may"), "may");
    }
}
