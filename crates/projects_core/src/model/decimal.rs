//! Two-digit fixed-point decimal used for hours and costs.
//!
//! # Invariants
//! - Values are held as integer hundredths; there is no rounding anywhere.
//! - Parsing accepts extra fractional digits only when they are zeros
//!   (`"5.500"` is `5.50`, `"5.555"` is rejected).
//! - Display always renders exactly two fractional digits.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const SCALE: i64 = 100;
const FRACTION_DIGITS: usize = 2;

/// Signed decimal with exactly two fractional digits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Decimal2(i64);

impl Decimal2 {
    pub const ZERO: Self = Self(0);

    /// Builds a value from integer hundredths (`550` is `5.50`).
    pub const fn from_hundredths(hundredths: i64) -> Self {
        Self(hundredths)
    }

    pub const fn hundredths(self) -> i64 {
        self.0
    }
}

/// Reasons a decimal string is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecimalParseError {
    Empty,
    InvalidFormat(String),
    /// Non-zero digits beyond the second fractional place.
    TooPrecise(String),
    Overflow(String),
}

impl Display for DecimalParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Empty => write!(f, "decimal value must not be empty"),
            Self::InvalidFormat(value) => write!(f, "`{value}` is not a decimal number"),
            Self::TooPrecise(value) => {
                write!(f, "`{value}` has more than {FRACTION_DIGITS} decimal places")
            }
            Self::Overflow(value) => write!(f, "`{value}` is out of range"),
        }
    }
}

impl Error for DecimalParseError {}

impl FromStr for Decimal2 {
    type Err = DecimalParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(DecimalParseError::Empty);
        }

        let invalid = || DecimalParseError::InvalidFormat(trimmed.to_string());
        let (negative, unsigned) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (whole, fraction) = match unsigned.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (unsigned, ""),
        };
        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if !whole.bytes().all(|b| b.is_ascii_digit())
            || !fraction.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let (kept, dropped) = fraction.split_at(fraction.len().min(FRACTION_DIGITS));
        if dropped.bytes().any(|b| b != b'0') {
            return Err(DecimalParseError::TooPrecise(trimmed.to_string()));
        }

        let overflow = || DecimalParseError::Overflow(trimmed.to_string());
        let whole_value = if whole.is_empty() {
            0
        } else {
            whole.parse::<i64>().map_err(|_| overflow())?
        };
        let mut fraction_value = 0_i64;
        for position in 0..FRACTION_DIGITS {
            let digit = kept
                .as_bytes()
                .get(position)
                .map_or(0, |b| i64::from(b - b'0'));
            fraction_value = fraction_value * 10 + digit;
        }

        let magnitude = whole_value
            .checked_mul(SCALE)
            .and_then(|value| value.checked_add(fraction_value))
            .ok_or_else(overflow)?;
        Ok(Self(if negative { -magnitude } else { magnitude }))
    }
}

impl Display for Decimal2 {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let magnitude = self.0.unsigned_abs();
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(
            f,
            "{sign}{}.{:02}",
            magnitude / SCALE as u64,
            magnitude % SCALE as u64
        )
    }
}

impl Serialize for Decimal2 {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Decimal2 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
