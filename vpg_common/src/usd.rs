use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const USD_CURRENCY_CODE: &str = "USD";
pub const USD_CURRENCY_CODE_LOWER: &str = "usd";

//--------------------------------------     UsdPrice       ----------------------------------------------------------
/// A monetary amount in US dollars, stored as an integer number of cents.
///
/// All pricing arithmetic that starts from fractional dollar values must round exactly once, via
/// [`UsdPrice::from_dollars_f64`], which rounds half-away-from-zero to the nearest cent.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct UsdPrice(i64);

op!(binary UsdPrice, Add, add);
op!(binary UsdPrice, Sub, sub);
op!(inplace UsdPrice, SubAssign, sub_assign);
op!(unary UsdPrice, Neg, neg);

impl Mul<i64> for UsdPrice {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from_cents(self.value() * rhs)
    }
}

impl Sum for UsdPrice {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented in US cents: {0}")]
pub struct UsdConversionError(String);

impl From<i64> for UsdPrice {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for UsdPrice {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for UsdPrice {}

impl TryFrom<u64> for UsdPrice {
    type Error = UsdConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(UsdConversionError(format!("Value {} is too large to convert to UsdPrice", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for UsdPrice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.abs();
        write!(f, "{sign}${}.{:02}", cents / 100, cents % 100)
    }
}

impl UsdPrice {
    /// The amount in cents.
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn from_dollars(dollars: i64) -> Self {
        Self(dollars * 100)
    }

    /// Converts a fractional dollar amount into cents, rounding half-away-from-zero.
    ///
    /// This is the single rounding point for all computed prices.
    pub fn from_dollars_f64(dollars: f64) -> Self {
        let cents = (dollars.abs() * 100.0 + 0.5).floor() as i64;
        Self(if dollars.is_sign_negative() { -cents } else { cents })
    }

    pub fn to_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }
}
