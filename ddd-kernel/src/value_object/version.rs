use serde::{Deserialize, Serialize};
use std::fmt;

/// 版本号（用于乐观锁和并发控制）
///
/// 聚合上的版本号是可选的（尚未持久化的聚合没有版本），一旦设置，
/// 后续设置的值必须严格大于当前值。
///
/// # 示例
///
/// ```
/// use ddd_kernel::value_object::Version;
///
/// let v1 = Version::from_value(1);
/// let v2 = v1.next();
///
/// assert_eq!(v2.value(), 2);
/// assert!(v2 > v1);
/// assert_eq!(v2.to_string(), "v2");
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Version(u64);

impl Version {
    /// 版本号 0
    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_value(value: u64) -> Self {
        Self(value)
    }

    /// 获取下一个版本号
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub const fn value(&self) -> u64 {
        self.0
    }

    pub fn is_new(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Self::from_value(value)
    }
}

impl From<Version> for u64 {
    fn from(version: Version) -> Self {
        version.value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_next_and_ordering() {
        let v0 = Version::new();
        let v1 = v0.next();
        let v5 = Version::from_value(5);

        assert!(v0.is_new());
        assert!(!v1.is_new());
        assert!(v1 > v0);
        assert!(v5 > v1);
        assert_eq!(Version::new().next().next().value(), 2);
    }

    #[test]
    fn test_version_conversions() {
        let v: Version = 42.into();
        assert_eq!(v.value(), 42);

        let raw: u64 = v.into();
        assert_eq!(raw, 42);
        assert_eq!(format!("{v}"), "v42");
    }

    #[test]
    fn test_version_serde() {
        let v = Version::from_value(42);

        let json = serde_json::to_string(&v).unwrap();
        assert_eq!(json, "42");

        let back: Version = serde_json::from_str(&json).unwrap();
        assert_eq!(back, v);
    }
}
