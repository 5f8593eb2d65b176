//! Positive money amounts at currency scale.
//!
//! Amounts are parsed as exact decimals, rounded half away from zero to whole
//! cents and stored as an integer number of cents.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Error;

/// The number of decimal places money is kept to.
const CURRENCY_SCALE: u32 = 2;
/// The largest amount accepted, one hundred billion in whole currency units.
pub const MAX_CENTS: i64 = 10_000_000_000_000;

pub const NOT_A_NUMBER_MSG: &str = "Amount must be a number.";
pub const NOT_POSITIVE_MSG: &str = "Amount must be greater than zero.";
pub const TOO_LARGE_MSG: &str = "Amount is too large.";

/// A strictly positive amount of money.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Amount(i64);

impl Amount {
    /// Create an amount from a whole number of cents.
    ///
    /// # Errors
    /// Returns [Error::Validation] if `cents` is not greater than zero or is
    /// greater than [MAX_CENTS].
    pub fn from_cents(cents: i64) -> Result<Self, Error> {
        if cents <= 0 {
            return Err(Error::Validation(NOT_POSITIVE_MSG.to_owned()));
        }

        if cents > MAX_CENTS {
            return Err(Error::Validation(TOO_LARGE_MSG.to_owned()));
        }

        Ok(Self(cents))
    }

    /// Create an amount from a decimal, rounding to the nearest cent.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the rounded amount is not greater than
    /// zero or is greater than [MAX_CENTS].
    pub fn from_decimal(value: Decimal) -> Result<Self, Error> {
        let rounded =
            value.round_dp_with_strategy(CURRENCY_SCALE, RoundingStrategy::MidpointAwayFromZero);

        let cents = rounded
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|cents| cents.to_i64())
            .ok_or_else(|| Error::Validation(TOO_LARGE_MSG.to_owned()))?;

        Self::from_cents(cents)
    }

    /// The amount as a whole number of cents.
    pub fn cents(self) -> i64 {
        self.0
    }

    /// The amount as a decimal with two decimal places.
    pub fn as_decimal(self) -> Decimal {
        cents_to_decimal(self.0)
    }
}

/// Convert a whole number of cents, which may be negative, to a decimal with
/// two decimal places.
pub fn cents_to_decimal(cents: i64) -> Decimal {
    Decimal::new(cents, CURRENCY_SCALE)
}

/// Add two signed amounts of cents.
///
/// # Errors
/// Returns [Error::Overflow] if the sum does not fit in an `i64`.
pub fn checked_sum(a: i64, b: i64) -> Result<i64, Error> {
    a.checked_add(b).ok_or(Error::Overflow)
}

impl FromStr for Amount {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = Decimal::from_str(trimmed)
            .or_else(|_| Decimal::from_scientific(trimmed))
            .map_err(|_| Error::Validation(NOT_A_NUMBER_MSG.to_owned()))?;

        Self::from_decimal(value)
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_decimal().fmt(f)
    }
}

/// An amount as it arrives in a request body.
///
/// Browser forms submit numbers as strings while other clients send JSON
/// numbers, so both are accepted and validated by [RawAmount::parse].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawAmount {
    /// A JSON number, e.g. `12.5`.
    Number(serde_json::Number),
    /// A JSON string, e.g. `"12.50"`.
    Text(String),
}

impl RawAmount {
    /// Parse and validate the raw amount.
    ///
    /// # Errors
    /// Returns [Error::Validation] with a message for the client if the value
    /// is not a number, is not positive once rounded to cents, or is too large.
    pub fn parse(&self) -> Result<Amount, Error> {
        match self {
            RawAmount::Number(number) => number.to_string().parse(),
            RawAmount::Text(text) => text.parse(),
        }
    }
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        RawAmount::deserialize(deserializer)?
            .parse()
            .map_err(serde::de::Error::custom)
    }
}

impl ToSql for Amount {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.0))
    }
}

impl FromSql for Amount {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let cents = i64::column_result(value)?;

        Amount::from_cents(cents).map_err(|_| FromSqlError::OutOfRange(cents))
    }
}
