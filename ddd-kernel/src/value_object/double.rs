use super::{ValueObject, check_limits, format_grouped};
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::marker::PhantomData;

/// 浮点数的取值范围
pub trait DoubleLimits: 'static {
    const TYPE_NAME: &'static str = "double";
    const MIN: Option<f64> = None;
    const MAX: Option<f64> = None;
}

/// 不限制范围的浮点数
#[derive(Debug)]
pub enum AnyDouble {}

impl DoubleLimits for AnyDouble {}

/// 有限浮点数
///
/// `NaN` 与无穷大不是合法值，因此除以 0 等运算会返回错误。
pub struct Double<L = AnyDouble> {
    value: f64,
    _limits: PhantomData<fn() -> L>,
}

impl<L: DoubleLimits> Double<L> {
    pub fn new(value: f64) -> DomainResult<Self> {
        let double = Self {
            value,
            _limits: PhantomData,
        };
        double.validate()?;
        Ok(double)
    }

    pub fn min_value() -> Option<f64> {
        L::MIN
    }

    pub fn max_value() -> Option<f64> {
        L::MAX
    }

    pub fn as_f64(&self) -> f64 {
        self.value
    }

    /// 四舍五入到两位小数，整数部分按千位分组
    pub fn format(&self, decimal_separator: char, thousands_separator: char) -> String {
        let rounded = format!("{:.2}", self.value.abs());
        let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
        let negative = self.value < 0.0 && rounded.bytes().any(|b| b.is_ascii_digit() && b != b'0');
        format_grouped(
            negative,
            whole,
            fraction,
            decimal_separator,
            thousands_separator,
        )
    }

    pub fn is_more_than(&self, other: f64) -> bool {
        self.value > other
    }

    pub fn is_less_than(&self, other: f64) -> bool {
        self.value < other
    }

    pub fn is_equal(&self, other: f64) -> bool {
        self.value == other
    }

    pub fn add(&self, other: f64) -> DomainResult<Self> {
        Self::new(self.value + other)
    }

    pub fn subtract(&self, other: f64) -> DomainResult<Self> {
        Self::new(self.value - other)
    }

    pub fn multiply_by(&self, multiplier: f64) -> DomainResult<Self> {
        Self::new(self.value * multiplier)
    }

    pub fn divide_by(&self, divider: f64) -> DomainResult<Self> {
        Self::new(self.value / divider)
    }

    pub fn percent(&self, percent: f64) -> DomainResult<Self> {
        Self::new(self.value / 100.0 * percent)
    }
}

impl<L: DoubleLimits> ValueObject for Double<L> {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if !self.value.is_finite() {
            return Err(DomainError::InvalidValue {
                type_name: L::TYPE_NAME,
                reason: format!("{} is not a finite number", self.value),
            });
        }
        check_limits(L::TYPE_NAME, L::MIN, L::MAX, self.value)
    }
}

impl<L> Clone for Double<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for Double<L> {}

impl<L> PartialEq for Double<L> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<L> PartialOrd for Double<L> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.value.partial_cmp(&other.value)
    }
}

impl<L: DoubleLimits> fmt::Debug for Double<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(L::TYPE_NAME).field(&self.value).finish()
    }
}

impl<L: DoubleLimits> fmt::Display for Double<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(',', ' '))
    }
}

impl<L: DoubleLimits> TryFrom<f64> for Double<L> {
    type Error = DomainError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<L> From<Double<L>> for f64 {
    fn from(double: Double<L>) -> Self {
        double.value
    }
}

impl<L> Serialize for Double<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.value)
    }
}

impl<'de, L: DoubleLimits> Deserialize<'de> for Double<L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = f64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
