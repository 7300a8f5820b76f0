use super::ValueObject;
use crate::error::{DomainError, DomainResult};
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

const MAX_LEN: usize = 255;
const MAX_LOCAL_LEN: usize = 64;

static ADDRESS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
    )
    .expect("email pattern is valid")
});

/// 邮箱地址
///
/// 按原样保存（不做大小写归一化）；本地部分不能以点开头或结尾，
/// 也不能包含连续的点，域名至少包含两级。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Email(String);

impl Email {
    pub fn new(address: impl Into<String>) -> DomainResult<Self> {
        let email = Self(address.into());
        email.validate()?;
        Ok(email)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `@` 之前的部分
    pub fn local_part(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(local, _)| local)
    }

    pub fn domain(&self) -> &str {
        self.0.rsplit_once('@').map_or("", |(_, domain)| domain)
    }

    fn invalid(&self, reason: &str) -> DomainError {
        DomainError::InvalidValue {
            type_name: "email",
            reason: format!("{reason}: {:?}", self.0),
        }
    }
}

impl ValueObject for Email {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.0.chars().count() > MAX_LEN {
            return Err(self.invalid("address is too long"));
        }
        if !ADDRESS.is_match(&self.0) {
            return Err(self.invalid("malformed address"));
        }
        let local = self.local_part();
        if local.len() > MAX_LOCAL_LEN || local.split('.').any(str::is_empty) {
            return Err(self.invalid("malformed local part"));
        }
        Ok(())
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Email {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for Email {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for Email {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}
