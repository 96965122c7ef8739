use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, AddAssign, Neg, Sub, SubAssign},
};

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const DEFAULT_CURRENCY_CODE: &str = "gbp";
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

//--------------------------------------     MinorUnits       ---------------------------------------------------------
/// An amount of money in the minor unit of the configured currency (pence, cents).
///
/// All spend accounting happens in this unit. Conversions from decimal major-unit prices round exactly once, half
/// away from zero, so that `12.995` becomes `1300`.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct MinorUnits(i64);

op!(binary MinorUnits, Add, add);
op!(binary MinorUnits, Sub, sub);
op!(inplace MinorUnits, AddAssign, add_assign);
op!(inplace MinorUnits, SubAssign, sub_assign);
op!(unary MinorUnits, Neg, neg);

impl Sum for MinorUnits {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MinorUnitsConversionError {
    #[error("Amount cannot be negative: {0}")]
    Negative(String),
    #[error("Amount is too large to be represented in minor units: {0}")]
    Overflow(String),
}

impl From<i64> for MinorUnits {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for MinorUnits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        let per_major = MINOR_UNITS_PER_MAJOR.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / per_major, abs % per_major)
    }
}

impl MinorUnits {
    pub const ZERO: MinorUnits = MinorUnits(0);

    pub fn value(&self) -> i64 {
        self.0
    }

    /// Converts a non-negative decimal amount in major units (e.g. pounds) into minor units, rounding half-up.
    pub fn from_major(amount: Decimal) -> Result<Self, MinorUnitsConversionError> {
        if amount.is_sign_negative() && !amount.is_zero() {
            return Err(MinorUnitsConversionError::Negative(amount.to_string()));
        }
        let scaled = amount
            .checked_mul(Decimal::from(MINOR_UNITS_PER_MAJOR))
            .ok_or_else(|| MinorUnitsConversionError::Overflow(amount.to_string()))?;
        scaled
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Self)
            .ok_or_else(|| MinorUnitsConversionError::Overflow(amount.to_string()))
    }

    /// The value expressed in major units, for display and admin reporting.
    pub fn to_major(&self) -> Decimal {
        Decimal::new(self.0, 2)
    }

    pub fn checked_mul(&self, rhs: i64) -> Option<Self> {
        self.0.checked_mul(rhs).map(Self)
    }

    pub fn checked_add(&self, rhs: Self) -> Option<Self> {
        self.0.checked_add(rhs.0).map(Self)
    }
}
