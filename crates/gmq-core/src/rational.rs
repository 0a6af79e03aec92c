//! Small exact rational type for charges and spins.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, GmqError};

/// Largest denominator tried when approximating a stored float.
pub const MAX_APPROX_DENOMINATOR: i64 = 12;

// 2^63; numerators at or above it do not fit in i64.
const I64_BOUND: f64 = 9_223_372_036_854_775_808.0;

/// Reduced fraction `numer / denom` with `denom > 0`.
///
/// Serialized as a string such as `"2/3"` or `"-1"`. Plain numbers are
/// accepted when deserializing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRational", into = "String")]
pub struct Rational {
    numer: i64,
    denom: i64,
}

/// Wire forms accepted for a [`Rational`].
#[doc(hidden)]
#[derive(Deserialize)]
#[serde(untagged)]
pub enum RawRational {
    /// Whole number.
    Integer(i64),
    /// Float approximated with a small denominator.
    Float(f64),
    /// Text such as `"2/3"`.
    Text(String),
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a
}

fn rational_error(message: impl Into<String>, raw: &str) -> GmqError {
    GmqError::Serde(ErrorInfo::new("rational_parse", message).with_context("value", raw))
}

impl Rational {
    /// Zero.
    pub const ZERO: Rational = Rational { numer: 0, denom: 1 };

    /// Builds a reduced fraction. Returns `None` when `denom == 0` or when
    /// the reduced form does not fit in `i64` (e.g. `1 / i64::MIN`).
    pub fn new(numer: i64, denom: i64) -> Option<Self> {
        if denom == 0 {
            return None;
        }
        let g = i128::from(gcd(numer.unsigned_abs(), denom.unsigned_abs()).max(1));
        let sign: i128 = if denom < 0 { -1 } else { 1 };
        Some(Self {
            numer: i64::try_from(sign * i128::from(numer) / g).ok()?,
            denom: i64::try_from(sign * i128::from(denom) / g).ok()?,
        })
    }

    /// Whole number.
    pub const fn integer(value: i64) -> Self {
        Self {
            numer: value,
            denom: 1,
        }
    }

    /// Numerator of the reduced fraction.
    pub fn numer(&self) -> i64 {
        self.numer
    }

    /// Denominator of the reduced fraction (always positive).
    pub fn denom(&self) -> i64 {
        self.denom
    }

    /// Floating point value.
    pub fn to_f64(&self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    /// Returns true when the fraction is negative.
    pub fn is_negative(&self) -> bool {
        self.numer < 0
    }

    /// Closest fraction with denominator at most `max_denom`, or `None` when
    /// the value is not finite or no candidate lies within `1e-6`.
    pub fn approximate(value: f64, max_denom: i64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        (1..=max_denom.max(1)).find_map(|denom| {
            let numer = (value * denom as f64).round();
            if numer.abs() >= I64_BOUND {
                return None;
            }
            if (numer / denom as f64 - value).abs() <= 1e-6 {
                Self::new(numer as i64, denom)
            } else {
                None
            }
        })
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.denom == 1 {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}/{}", self.numer, self.denom)
        }
    }
}

impl FromStr for Rational {
    type Err = GmqError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Some((numer, denom)) = trimmed.split_once('/') {
            let numer: i64 = numer
                .trim()
                .parse()
                .map_err(|_| rational_error("invalid numerator", raw))?;
            let denom: i64 = denom
                .trim()
                .parse()
                .map_err(|_| rational_error("invalid denominator", raw))?;
            if denom == 0 {
                return Err(rational_error("zero denominator", raw));
            }
            return Self::new(numer, denom).ok_or_else(|| rational_error("fraction out of range", raw));
        }
        if let Ok(value) = trimmed.parse::<i64>() {
            return Ok(Self::integer(value));
        }
        let value: f64 = trimmed
            .parse()
            .map_err(|_| rational_error("not a number or fraction", raw))?;
        Self::approximate(value, MAX_APPROX_DENOMINATOR)
            .ok_or_else(|| rational_error("no small-denominator fraction matches", raw))
    }
}

impl TryFrom<String> for Rational {
    type Error = GmqError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<RawRational> for Rational {
    type Error = GmqError;

    fn try_from(value: RawRational) -> Result<Self, Self::Error> {
        match value {
            RawRational::Integer(value) => Ok(Self::integer(value)),
            RawRational::Float(value) => Self::approximate(value, MAX_APPROX_DENOMINATOR)
                .ok_or_else(|| rational_error("no small-denominator fraction matches", &value.to_string())),
            RawRational::Text(text) => text.parse(),
        }
    }
}

impl From<Rational> for String {
    fn from(value: Rational) -> Self {
        value.to_string()
    }
}
