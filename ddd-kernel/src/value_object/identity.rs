use super::ValueObject;
use crate::error::{DomainError, DomainResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::{Uuid, Variant};

/// 可排序的唯一标识（UUID）
///
/// - `generate` 基于当前时间戳生成（UUIDv7），先生成者排序在前；
/// - `parse` 接受 RFC 4122 变体、版本号为 4 或 7 的 UUID 字符串；
/// - 序列化为小写带连字符的字符串形式。
///
/// ```
/// use ddd_kernel::value_object::Identity;
///
/// let older = Identity::generate();
/// let raw = older.as_string();
///
/// let parsed: Identity = raw.parse().unwrap();
/// assert_eq!(parsed, older);
/// assert!(Identity::parse("not-a-uuid").is_err());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identity(Uuid);

/// 聚合标识
pub type AggregateId = Identity;

/// 事件标识
pub type EventId = Identity;

impl Identity {
    const TYPE_NAME: &'static str = "Identity";

    /// 基于当前时间生成新的标识
    pub fn generate() -> Self {
        Self(Uuid::now_v7())
    }

    /// 从字符串解析标识（带或不带连字符）
    pub fn parse(raw: &str) -> DomainResult<Self> {
        let uuid = Uuid::try_parse(raw).map_err(|e| DomainError::InvalidValue {
            type_name: Self::TYPE_NAME,
            reason: e.to_string(),
        })?;
        Self::from_uuid(uuid)
    }

    pub fn from_uuid(uuid: Uuid) -> DomainResult<Self> {
        let id = Self(uuid);
        id.validate()?;
        Ok(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }

    pub fn as_string(&self) -> String {
        self.0.hyphenated().to_string()
    }

    /// 与字符串形式比较；字符串本身必须是合法标识
    pub fn same_as(&self, raw: &str) -> DomainResult<bool> {
        Ok(*self == Self::parse(raw)?)
    }

    /// 当前标识是否晚于 `other` 生成
    pub fn is_newer_than(&self, other: &Identity) -> bool {
        self.0 > other.0
    }

    /// 当前标识是否早于 `other` 生成
    pub fn is_older_than(&self, other: &Identity) -> bool {
        self.0 < other.0
    }

    /// 生成时间（仅 UUIDv7 可还原）
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        let (secs, nanos) = self.0.get_timestamp()?.to_unix();
        DateTime::from_timestamp(i64::try_from(secs).ok()?, nanos)
    }
}

impl ValueObject for Identity {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.0.get_variant() != Variant::RFC4122 {
            return Err(DomainError::InvalidValue {
                type_name: Self::TYPE_NAME,
                reason: format!("unsupported variant {:?}", self.0.get_variant()),
            });
        }

        match self.0.get_version_num() {
            4 | 7 => Ok(()),
            other => Err(DomainError::InvalidValue {
                type_name: Self::TYPE_NAME,
                reason: format!("unsupported version {other}"),
            }),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl fmt::Debug for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identity({})", self.0.hyphenated())
    }
}

impl FromStr for Identity {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Identity {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Identity> for String {
    fn from(id: Identity) -> Self {
        id.as_string()
    }
}
