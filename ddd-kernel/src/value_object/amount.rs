use super::{ValueObject, check_limits, format_grouped};
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// 金额的取值范围（以最小货币单位计，如“分”）
pub trait AmountLimits: 'static {
    const TYPE_NAME: &'static str = "amount";
    const MIN: Option<i64> = None;
    const MAX: Option<i64> = None;
}

/// 不限制范围的金额
#[derive(Debug)]
pub enum AnyAmount {}

impl AmountLimits for AnyAmount {}

/// 金额
///
/// 以最小货币单位的整数保存，对外按两位小数展示；
/// 每次运算都会产生新的金额并重新校验范围。
///
/// ```
/// use ddd_kernel::value_object::Amount;
///
/// let price: Amount = Amount::new(123_456).unwrap();
/// assert_eq!(price.as_f64(), 1234.56);
/// assert_eq!(price.to_string(), "1 234,56");
/// assert_eq!(price.format('.', ','), "1,234.56");
/// ```
pub struct Amount<L = AnyAmount> {
    minor: i64,
    _limits: PhantomData<fn() -> L>,
}

impl<L: AmountLimits> Amount<L> {
    pub fn new(minor: i64) -> DomainResult<Self> {
        let amount = Self {
            minor,
            _limits: PhantomData,
        };
        amount.validate()?;
        Ok(amount)
    }

    pub fn min_value() -> Option<i64> {
        L::MIN
    }

    pub fn max_value() -> Option<i64> {
        L::MAX
    }

    /// 最小货币单位的数值
    pub fn as_minor(&self) -> i64 {
        self.minor
    }

    pub fn as_f64(&self) -> f64 {
        self.minor as f64 / 100.0
    }

    /// 两位小数，整数部分按千位分组
    pub fn format(&self, decimal_separator: char, thousands_separator: char) -> String {
        let abs = self.minor.unsigned_abs();
        format_grouped(
            self.minor < 0,
            &(abs / 100).to_string(),
            &format!("{:02}", abs % 100),
            decimal_separator,
            thousands_separator,
        )
    }

    pub fn is_more_than(&self, other: f64) -> bool {
        self.as_f64() > other
    }

    pub fn is_less_than(&self, other: f64) -> bool {
        self.as_f64() < other
    }

    pub fn is_equal(&self, other: f64) -> bool {
        self.as_f64() == other
    }

    pub fn add<M: AmountLimits>(&self, other: &Amount<M>) -> DomainResult<Self> {
        self.checked(self.minor.checked_add(other.minor))
    }

    pub fn subtract<M: AmountLimits>(&self, other: &Amount<M>) -> DomainResult<Self> {
        self.checked(self.minor.checked_sub(other.minor))
    }

    /// 乘以系数，结果向零截断到最小货币单位
    pub fn multiply_by(&self, multiplier: f64) -> DomainResult<Self> {
        self.scaled(self.minor as f64 * multiplier)
    }

    /// 除以系数，结果向零截断到最小货币单位
    pub fn divide_by(&self, divider: f64) -> DomainResult<Self> {
        self.scaled(self.minor as f64 / divider)
    }

    /// 取百分比：`percent` 为 10.0 时得到原金额的 10%
    pub fn percent(&self, percent: f64) -> DomainResult<Self> {
        self.scaled(self.minor as f64 / 100.0 * percent)
    }

    fn checked(&self, minor: Option<i64>) -> DomainResult<Self> {
        match minor {
            Some(minor) => Self::new(minor),
            None => Err(DomainError::OutOfRange {
                reason: format!("{} arithmetic overflow", L::TYPE_NAME),
            }),
        }
    }

    fn scaled(&self, value: f64) -> DomainResult<Self> {
        if !value.is_finite() || value >= i64::MAX as f64 || value < i64::MIN as f64 {
            return Err(DomainError::OutOfRange {
                reason: format!("{} cannot represent {value}", L::TYPE_NAME),
            });
        }
        Self::new(value.trunc() as i64)
    }
}

impl<L: AmountLimits> ValueObject for Amount<L> {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        check_limits(L::TYPE_NAME, L::MIN, L::MAX, self.minor)
    }
}

impl<L> Clone for Amount<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for Amount<L> {}

impl<L> PartialEq for Amount<L> {
    fn eq(&self, other: &Self) -> bool {
        self.minor == other.minor
    }
}

impl<L> Eq for Amount<L> {}

impl<L> PartialOrd for Amount<L> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<L> Ord for Amount<L> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.minor.cmp(&other.minor)
    }
}

impl<L> Hash for Amount<L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.minor.hash(state);
    }
}

impl<L: AmountLimits> fmt::Debug for Amount<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(L::TYPE_NAME).field(&self.minor).finish()
    }
}

impl<L: AmountLimits> fmt::Display for Amount<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format(',', ' '))
    }
}

impl<L: AmountLimits> TryFrom<i64> for Amount<L> {
    type Error = DomainError;

    fn try_from(minor: i64) -> Result<Self, Self::Error> {
        Self::new(minor)
    }
}

impl<L> From<Amount<L>> for i64 {
    fn from(amount: Amount<L>) -> Self {
        amount.minor
    }
}

/// 序列化为最小货币单位的整数
impl<L> Serialize for Amount<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.minor)
    }
}

impl<'de, L: AmountLimits> Deserialize<'de> for Amount<L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let minor = i64::deserialize(deserializer)?;
        Self::new(minor).map_err(serde::de::Error::custom)
    }
}
