use super::{ValueObject, check_limits};
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// 整数的取值范围
pub trait IntegerLimits: 'static {
    const TYPE_NAME: &'static str = "integer";
    const MIN: Option<i64> = None;
    const MAX: Option<i64> = None;
}

/// 不限制范围的整数
#[derive(Debug)]
pub enum AnyInteger {}

impl IntegerLimits for AnyInteger {}

/// 整数
pub struct Integer<L = AnyInteger> {
    value: i64,
    _limits: PhantomData<fn() -> L>,
}

impl<L: IntegerLimits> Integer<L> {
    pub fn new(value: i64) -> DomainResult<Self> {
        let integer = Self {
            value,
            _limits: PhantomData,
        };
        integer.validate()?;
        Ok(integer)
    }

    pub fn as_i64(&self) -> i64 {
        self.value
    }

    pub fn add(&self, other: i64) -> DomainResult<Self> {
        self.checked(self.value.checked_add(other))
    }

    pub fn subtract(&self, other: i64) -> DomainResult<Self> {
        self.checked(self.value.checked_sub(other))
    }

    fn checked(&self, value: Option<i64>) -> DomainResult<Self> {
        value.map_or_else(
            || {
                Err(DomainError::OutOfRange {
                    reason: format!("{} arithmetic overflow", L::TYPE_NAME),
                })
            },
            Self::new,
        )
    }
}

impl<L: IntegerLimits> ValueObject for Integer<L> {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        check_limits(L::TYPE_NAME, L::MIN, L::MAX, self.value)
    }
}

impl<L> Clone for Integer<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for Integer<L> {}

impl<L> PartialEq for Integer<L> {
    fn eq(&self, other: &Self) -> bool {
        self.value == other.value
    }
}

impl<L> Eq for Integer<L> {}

impl<L> PartialOrd for Integer<L> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<L> Ord for Integer<L> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.value.cmp(&other.value)
    }
}

impl<L> Hash for Integer<L> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.value.hash(state);
    }
}

impl<L: IntegerLimits> fmt::Debug for Integer<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple(L::TYPE_NAME).field(&self.value).finish()
    }
}

impl<L> fmt::Display for Integer<L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value)
    }
}

impl<L: IntegerLimits> TryFrom<i64> for Integer<L> {
    type Error = DomainError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl<L> From<Integer<L>> for i64 {
    fn from(integer: Integer<L>) -> Self {
        integer.value
    }
}

impl<L> Serialize for Integer<L> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(self.value)
    }
}

impl<'de, L: IntegerLimits> Deserialize<'de> for Integer<L> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = i64::deserialize(deserializer)?;
        Self::new(value).map_err(serde::de::Error::custom)
    }
}
