use std::{
    fmt::Display,
    iter::Sum,
    ops::{Add, Mul, Neg, Sub, SubAssign},
    str::FromStr,
};

use serde::{Deserialize, Serialize};
use sqlx::Type;
use thiserror::Error;

use crate::op;

pub const DEFAULT_CURRENCY_CODE: &str = "SAR";

//--------------------------------------     Money       -------------------------------------------------------------
/// A monetary amount, stored as an integer number of minor units (cents / halalas).
///
/// All settlement arithmetic happens on this type so that floating point never touches a balance.
/// The `Display` and `FromStr` impls speak the decimal form (`250.00`) that gateways and humans use.
#[derive(Debug, Clone, Copy, Default, Type, Ord, PartialOrd, Serialize, Deserialize)]
#[sqlx(transparent)]
pub struct Money(i64);

op!(binary Money, Add, add);
op!(binary Money, Sub, sub);
op!(inplace Money, SubAssign, sub_assign);
op!(unary Money, Neg, neg);

impl Mul<i64> for Money {
    type Output = Self;

    fn mul(self, rhs: i64) -> Self::Output {
        Self::from(self.value() * rhs)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), Add::add)
    }
}

#[derive(Debug, Clone, Error)]
#[error("Value cannot be represented as a monetary amount: {0}")]
pub struct MoneyConversionError(pub String);

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl PartialEq for Money {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for Money {}

impl TryFrom<u64> for Money {
    type Error = MoneyConversionError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        if value > i64::MAX as u64 {
            Err(MoneyConversionError(format!("Value {} is too large to convert to Money", value)))
        } else {
            #[allow(clippy::cast_possible_wrap)]
            Ok(Self(value as i64))
        }
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let cents = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", cents / 100, cents % 100)
    }
}

impl FromStr for Money {
    type Err = MoneyConversionError;

    /// Parses a decimal amount such as `250`, `250.5` or `250.00`. More than two decimal places is an error,
    /// since sub-cent amounts cannot be settled.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let (sign, digits) = match s.strip_prefix('-') {
            Some(rest) => (-1i64, rest),
            None => (1i64, s),
        };
        let (whole, frac) = match digits.split_once('.') {
            Some((w, f)) => (w, f),
            None => (digits, ""),
        };
        if whole.is_empty() && frac.is_empty() {
            return Err(MoneyConversionError(format!("'{s}' is not a monetary amount")));
        }
        if frac.len() > 2 {
            return Err(MoneyConversionError(format!("'{s}' has sub-cent precision")));
        }
        let whole: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| MoneyConversionError(format!("'{s}' is not a monetary amount")))?
        };
        let mut frac_cents: i64 = if frac.is_empty() {
            0
        } else {
            frac.parse().map_err(|_| MoneyConversionError(format!("'{s}' is not a monetary amount")))?
        };
        if frac.len() == 1 {
            frac_cents *= 10;
        }
        Ok(Self(sign * (whole * 100 + frac_cents)))
    }
}

impl Money {
    pub fn value(&self) -> i64 {
        self.0
    }

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Construct an amount from a whole number of currency units.
    pub fn from_units(units: i64) -> Self {
        Self(units * 100)
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_renders_decimal_form() {
        assert_eq!(Money::from_cents(25_000).to_string(), "250.00");
        assert_eq!(Money::from_cents(105).to_string(), "1.05");
        assert_eq!(Money::from_cents(-9).to_string(), "-0.09");
    }

    #[test]
    fn parse_decimal_amounts() {
        assert_eq!("250.00".parse::<Money>().unwrap(), Money::from_cents(25_000));
        assert_eq!("250.5".parse::<Money>().unwrap(), Money::from_cents(25_050));
        assert_eq!("250".parse::<Money>().unwrap(), Money::from_cents(25_000));
        assert_eq!("-1.25".parse::<Money>().unwrap(), Money::from_cents(-125));
        assert!("12.345".parse::<Money>().is_err());
        assert!("abc".parse::<Money>().is_err());
        assert!(".".parse::<Money>().is_err());
    }

    #[test]
    fn arithmetic_round_trips() {
        let a = Money::from_units(100);
        let b = Money::from_cents(50);
        assert_eq!((a + b).to_string(), "100.50");
        assert_eq!((a - b).value(), 9_950);
        assert_eq!((-b).value(), -50);
        let total: Money = [a, b, b].into_iter().sum();
        assert_eq!(total.value(), 10_100);
    }
}
