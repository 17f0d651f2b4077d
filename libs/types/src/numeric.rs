//! Fixed-point monetary values
//!
//! `Money` is a signed amount stored as an `i64` scaled by 10^5: five digits
//! of internal precision, the first two of which are the "cents" used for
//! display. Comparisons and arithmetic always operate on the scaled integer;
//! floats and `Decimal` only appear at construction and rendering time.

use crate::errors::MoneyParseError;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Div, DivAssign, Mul, MulAssign, Neg, Sub, SubAssign};
use std::str::FromStr;

/// Scaled units per whole unit
pub const WHOLE_OFFSET: i64 = 100_000;

/// Scaled units per hundredth
pub const CENT_OFFSET: i64 = 1_000;

/// Number of fractional digits carried internally
pub const DECIMAL_SCALE: u32 = 5;

const POSTFIXES: [&str; 5] = ["", "K", "M", "B", "T"];

/// Fixed-point money value (price, notional, aggregate)
///
/// Serialized as its full decimal string, e.g. `"101.25000"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Money(i64);

impl Money {
    pub const ZERO: Money = Money(0);

    /// Build directly from the scaled integer
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    pub const fn from_whole(whole: i64) -> Self {
        Self(whole * WHOLE_OFFSET)
    }

    /// `from_whole_and_cents(-3, 25)` is `-3.25`; the cents follow the sign of the whole part
    pub fn from_whole_and_cents(whole: i64, cents: u32) -> Self {
        let magnitude = whole.abs() * WHOLE_OFFSET + i64::from(cents) * CENT_OFFSET;
        if whole < 0 {
            Self(-magnitude)
        } else {
            Self(magnitude)
        }
    }

    /// Convert a float, truncating toward negative infinity at the fifth decimal
    ///
    /// The float is first taken at its shortest round-trip decimal form so
    /// that `1.005` means exactly `1.00500` rather than `1.00499...`.
    pub fn from_f64(value: f64) -> Self {
        if !value.is_finite() {
            return Self::ZERO;
        }
        Decimal::from_str(&value.to_string())
            .ok()
            .or_else(|| Decimal::from_f64(value))
            .map(Self::from_decimal)
            .unwrap_or(Self::ZERO)
    }

    /// Convert a decimal, truncating toward negative infinity at the fifth decimal
    ///
    /// Values outside the representable range saturate.
    pub fn from_decimal(value: Decimal) -> Self {
        let saturated = if value.is_sign_negative() { i64::MIN } else { i64::MAX };
        let raw = value
            .checked_mul(Decimal::from(WHOLE_OFFSET))
            .and_then(|scaled| scaled.floor().to_i64())
            .unwrap_or(saturated);
        Self(raw)
    }

    pub const fn raw(&self) -> i64 {
        self.0
    }

    pub fn to_decimal(&self) -> Decimal {
        Decimal::new(self.0, DECIMAL_SCALE)
    }

    pub fn to_f64(&self) -> f64 {
        self.0 as f64 / WHOLE_OFFSET as f64
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub fn abs(&self) -> Self {
        Self(self.0.abs())
    }

    /// Whole units, truncated toward zero
    pub fn whole(&self) -> i64 {
        self.0 / WHOLE_OFFSET
    }

    /// Magnitude of the hundredths digit pair (0..=99)
    pub fn cents(&self) -> u32 {
        ((self.0.abs() % WHOLE_OFFSET) / CENT_OFFSET) as u32
    }

    pub fn floor(&self) -> Self {
        Self(floor_to(self.0, WHOLE_OFFSET))
    }

    pub fn ceil(&self) -> Self {
        Self(ceil_to(self.0, WHOLE_OFFSET))
    }

    /// Round to whole units, halves away from zero
    pub fn round(&self) -> Self {
        Self(round_to(self.0, WHOLE_OFFSET))
    }

    pub fn floor_to_cents(&self) -> Self {
        Self(floor_to(self.0, CENT_OFFSET))
    }

    pub fn ceil_to_cents(&self) -> Self {
        Self(ceil_to(self.0, CENT_OFFSET))
    }

    /// Round to hundredths, halves away from zero (`1.005` becomes `1.01`)
    pub fn round_to_cents(&self) -> Self {
        Self(round_to(self.0, CENT_OFFSET))
    }

    /// All five fractional digits, e.g. `"1.00500"`
    pub fn to_full_string(&self) -> String {
        self.to_decimal().to_string()
    }

    /// Truncated to hundredths, e.g. `"1.00"`
    pub fn to_cent_string(&self) -> String {
        let mut full = self.to_full_string();
        full.truncate(full.len() - (DECIMAL_SCALE as usize - 2));
        full
    }

    /// Whole-unit rendering compacted with K/M/B/T
    ///
    /// The magnitude is divided by 1000 (rounding half up) until it no longer
    /// exceeds `10^digits_before_postfix` or the `T` postfix is reached.
    pub fn to_postfixed_string(&self, digits_before_postfix: u32) -> String {
        let cap = 10i64.checked_pow(digits_before_postfix).unwrap_or(i64::MAX);
        let mut whole = self.whole().abs();
        let mut postfix = 0;
        while whole > cap && postfix < POSTFIXES.len() - 1 {
            let rem = whole % 1000;
            whole /= 1000;
            if rem >= 500 {
                whole += 1;
            }
            postfix += 1;
        }

        let sign = if self.is_negative() { "-" } else { "" };
        format!("{}{}{}", sign, group_thousands(whole), POSTFIXES[postfix])
    }
}

fn floor_to(raw: i64, unit: i64) -> i64 {
    raw.div_euclid(unit) * unit
}

fn ceil_to(raw: i64, unit: i64) -> i64 {
    -floor_to(-raw, unit)
}

fn round_to(raw: i64, unit: i64) -> i64 {
    let half = unit / 2;
    if raw >= 0 {
        floor_to(raw + half, unit)
    } else {
        -floor_to(-raw + half, unit)
    }
}

fn group_thousands(value: i64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl FromStr for Money {
    type Err = MoneyParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let decimal = Decimal::from_str(s.trim()).map_err(|_| MoneyParseError {
            input: s.to_string(),
        })?;
        Ok(Self::from_decimal(decimal))
    }
}

impl TryFrom<String> for Money {
    type Error = MoneyParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Money> for String {
    fn from(value: Money) -> Self {
        value.to_full_string()
    }
}

impl From<i64> for Money {
    fn from(whole: i64) -> Self {
        Self::from_whole(whole)
    }
}

impl Add for Money {
    type Output = Money;
    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl Sub for Money {
    type Output = Money;
    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

/// Truncated toward zero
impl Mul for Money {
    type Output = Money;
    fn mul(self, rhs: Money) -> Money {
        Money((i128::from(self.0) * i128::from(rhs.0) / i128::from(WHOLE_OFFSET)) as i64)
    }
}

/// Truncated toward zero
impl Div for Money {
    type Output = Money;
    fn div(self, rhs: Money) -> Money {
        Money((i128::from(self.0) * i128::from(WHOLE_OFFSET) / i128::from(rhs.0)) as i64)
    }
}

// Integer operands are whole units for + and -, plain factors for * and /.
impl Add<i64> for Money {
    type Output = Money;
    fn add(self, rhs: i64) -> Money {
        self + Money::from_whole(rhs)
    }
}

impl Sub<i64> for Money {
    type Output = Money;
    fn sub(self, rhs: i64) -> Money {
        self - Money::from_whole(rhs)
    }
}

impl Mul<i64> for Money {
    type Output = Money;
    fn mul(self, rhs: i64) -> Money {
        Money(self.0 * rhs)
    }
}

impl Div<i64> for Money {
    type Output = Money;
    fn div(self, rhs: i64) -> Money {
        Money(self.0 / rhs)
    }
}

impl Add<f64> for Money {
    type Output = Money;
    fn add(self, rhs: f64) -> Money {
        self + Money::from_f64(rhs)
    }
}

impl Sub<f64> for Money {
    type Output = Money;
    fn sub(self, rhs: f64) -> Money {
        self - Money::from_f64(rhs)
    }
}

impl Mul<f64> for Money {
    type Output = Money;
    fn mul(self, rhs: f64) -> Money {
        Money((self.0 as f64 * rhs) as i64)
    }
}

impl Div<f64> for Money {
    type Output = Money;
    fn div(self, rhs: f64) -> Money {
        Money((self.0 as f64 / rhs) as i64)
    }
}

impl Neg for Money {
    type Output = Money;
    fn neg(self) -> Money {
        Money(-self.0)
    }
}

macro_rules! forward_assign {
    ($($trait:ident::$method:ident => $op:tt, $rhs:ty);* $(;)?) => {
        $(
            impl $trait<$rhs> for Money {
                fn $method(&mut self, rhs: $rhs) {
                    *self = *self $op rhs;
                }
            }
        )*
    };
}

forward_assign! {
    AddAssign::add_assign => +, Money;
    SubAssign::sub_assign => -, Money;
    MulAssign::mul_assign => *, Money;
    DivAssign::div_assign => /, Money;
    AddAssign::add_assign => +, i64;
    SubAssign::sub_assign => -, i64;
    MulAssign::mul_assign => *, i64;
    DivAssign::div_assign => /, i64;
    AddAssign::add_assign => +, f64;
    SubAssign::sub_assign => -, f64;
    MulAssign::mul_assign => *, f64;
    DivAssign::div_assign => /, f64;
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}
