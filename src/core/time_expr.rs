//! Interpretation of `after` values as fire times.
//!
//! An `after` value is loosely typed: whatever the spec author (or a bound
//! pattern variable) put there. It is classified into a [`TimeExpr`] by trying
//! a fixed sequence of readings, then resolved against a reference instant.
//!
//! | Input                           | Reading                      |
//! |---------------------------------|------------------------------|
//! | JSON number                     | seconds from now             |
//! | string holding an integer       | seconds from now             |
//! | string `YYYY-MM-DD HH:MM:SSZ`   | that UTC instant             |
//! | string like `90s`, `1h30m`      | that duration from now       |
//!
//! String readings are attempted in the order listed and the first that
//! parses wins, so `"30"` is always thirty seconds.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use serde_json::{Number, Value};
use thiserror::Error;

/// Layout of absolute timestamps: UTC, second precision, literal `Z`.
pub const CLOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%SZ";

const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Errors produced while interpreting an `after` value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimeExprError {
    #[error("unsupported \"after\" {value} ({kind})")]
    Unsupported { value: String, kind: &'static str },

    #[error("unsupported \"after\" {0:?}: not seconds, a clock time, or a duration")]
    Unparseable(String),

    #[error("\"after\" {0} is out of range")]
    OutOfRange(String),
}

/// A classified `after` value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimeExpr {
    /// A count of seconds from the reference instant.
    RelativeSeconds(Duration),
    /// A literal UTC instant.
    Absolute(DateTime<Utc>),
    /// A unit-suffixed duration from the reference instant.
    Duration(Duration),
}

impl TimeExpr {
    /// Classify a JSON value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use implicit_timers::core::TimeExpr;
    /// use chrono::Duration;
    /// use serde_json::json;
    ///
    /// assert_eq!(
    ///     TimeExpr::parse(&json!("30")).unwrap(),
    ///     TimeExpr::RelativeSeconds(Duration::seconds(30))
    /// );
    /// assert_eq!(
    ///     TimeExpr::parse(&json!("2m")).unwrap(),
    ///     TimeExpr::Duration(Duration::minutes(2))
    /// );
    /// assert!(TimeExpr::parse(&json!(true)).is_err());
    /// ```
    pub fn parse(value: &Value) -> Result<Self, TimeExprError> {
        match value {
            Value::Number(n) => Self::from_number(n),
            Value::String(s) => Self::parse_str(s),
            other => Err(TimeExprError::Unsupported {
                value: other.to_string(),
                kind: json_kind(other),
            }),
        }
    }

    /// Classify a string, trying integer seconds, then clock time, then
    /// duration.
    pub fn parse_str(s: &str) -> Result<Self, TimeExprError> {
        if let Ok(secs) = s.parse::<i64>() {
            return relative_seconds(secs).ok_or_else(|| TimeExprError::OutOfRange(s.to_string()));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, CLOCK_TIME_FORMAT) {
            return Ok(Self::Absolute(Utc.from_utc_datetime(&naive)));
        }
        if let Some(d) = parse_duration(s) {
            return Ok(Self::Duration(d));
        }
        Err(TimeExprError::Unparseable(s.to_string()))
    }

    fn from_number(n: &Number) -> Result<Self, TimeExprError> {
        let out_of_range = || TimeExprError::OutOfRange(n.to_string());
        if let Some(secs) = n.as_i64() {
            return relative_seconds(secs).ok_or_else(out_of_range);
        }
        // u64 beyond i64::MAX cannot fit as nanoseconds either.
        if n.is_u64() {
            return Err(out_of_range());
        }
        n.as_f64()
            .and_then(fractional_seconds)
            .ok_or_else(out_of_range)
    }

    /// Fire time of this expression relative to `now`.
    pub fn resolve(&self, now: DateTime<Utc>) -> Result<DateTime<Utc>, TimeExprError> {
        match self {
            Self::Absolute(t) => Ok(*t),
            Self::RelativeSeconds(d) | Self::Duration(d) => now
                .checked_add_signed(*d)
                .ok_or_else(|| TimeExprError::OutOfRange(d.to_string())),
        }
    }
}

/// Interpret `value` as a fire time relative to the current wall clock.
pub fn interpret(value: &Value) -> Result<DateTime<Utc>, TimeExprError> {
    interpret_at(value, Utc::now())
}

/// Interpret `value` as a fire time relative to `now`.
pub fn interpret_at(value: &Value, now: DateTime<Utc>) -> Result<DateTime<Utc>, TimeExprError> {
    TimeExpr::parse(value)?.resolve(now)
}

/// Parse a signed, unit-suffixed duration such as `300ms`, `-1.5h` or
/// `2h45m`.
///
/// Valid units are `ns`, `us` (or `µs`), `ms`, `s`, `m` and `h`. Every number
/// needs a unit except a lone `0`. The total must fit in signed 64-bit
/// nanoseconds.
pub fn parse_duration(input: &str) -> Option<Duration> {
    let (negative, mut rest) = match input.as_bytes().first() {
        Some(b'-') => (true, &input[1..]),
        Some(b'+') => (false, &input[1..]),
        _ => (false, input),
    };
    if rest == "0" {
        return Some(Duration::zero());
    }
    if rest.is_empty() {
        return None;
    }

    let limit = i64::MAX as u128 + 1;
    let mut total: u128 = 0;
    while !rest.is_empty() {
        let (whole, tail) = split_digits(rest);
        let (fraction, tail) = match tail.strip_prefix('.') {
            Some(after_dot) => split_digits(after_dot),
            None => ("", tail),
        };
        if whole.is_empty() && fraction.is_empty() {
            return None;
        }

        let unit_len = tail
            .bytes()
            .take_while(|c| *c != b'.' && !c.is_ascii_digit())
            .count();
        if unit_len == 0 {
            return None;
        }
        let (unit, tail) = tail.split_at(unit_len);
        let scale = unit_nanos(unit)?;

        let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
        let mut value = whole.checked_mul(scale)?;
        if !fraction.is_empty() {
            value = value.checked_add(fraction_nanos(fraction, scale))?;
        }

        total = total.checked_add(value)?;
        if total > limit {
            return None;
        }
        rest = tail;
    }

    let nanos = if negative {
        -i128::try_from(total).ok()?
    } else {
        i128::try_from(total).ok()?
    };
    i64::try_from(nanos).ok().map(Duration::nanoseconds)
}

fn split_digits(s: &str) -> (&str, &str) {
    let n = s.bytes().take_while(u8::is_ascii_digit).count();
    s.split_at(n)
}

/// `0.<digits>` of `scale` nanoseconds, truncated.
///
/// Folds digits right to left, carrying `floor((d * scale + carry) / 10)`;
/// the final carry is exactly `floor(0.<digits> * scale)`.
fn fraction_nanos(digits: &str, scale: u128) -> u128 {
    digits
        .bytes()
        .rev()
        .fold(0, |carry, d| (u128::from(d - b'0') * scale + carry) / 10)
}

fn unit_nanos(unit: &str) -> Option<u128> {
    let nanos = match unit {
        "ns" => 1,
        "us" | "µs" | "μs" => 1_000,
        "ms" => 1_000_000,
        "s" => 1_000_000_000,
        "m" => 60 * 1_000_000_000,
        "h" => 3_600 * 1_000_000_000,
        _ => return None,
    };
    Some(nanos)
}

fn relative_seconds(secs: i64) -> Option<TimeExpr> {
    secs.checked_mul(NANOS_PER_SECOND)
        .map(|nanos| TimeExpr::RelativeSeconds(Duration::nanoseconds(nanos)))
}

fn fractional_seconds(secs: f64) -> Option<TimeExpr> {
    let nanos = (secs * NANOS_PER_SECOND as f64).trunc();
    if !nanos.is_finite() || nanos >= i64::MAX as f64 || nanos < i64::MIN as f64 {
        return None;
    }
    Some(TimeExpr::RelativeSeconds(Duration::nanoseconds(nanos as i64)))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
