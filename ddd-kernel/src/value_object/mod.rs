//! 值对象（Value Object）
//!
//! 无标识、以值相等为准的对象，用于封装不可变的概念性值与校验逻辑。
//!
//! - 聚合/事件协议所需：标识（`Identity`）与版本号（`Version`）；
//! - 常用标量：金额（`Amount`）、浮点数（`Double`）、整数（`Integer`）、
//!   文本（`Text`）与邮箱（`Email`）。
//!
//! 标量值对象的取值范围由类型参数上的关联常量声明，例如：
//!
//! ```
//! use ddd_kernel::value_object::{Amount, AmountLimits};
//!
//! enum Price {}
//! impl AmountLimits for Price {
//!     const TYPE_NAME: &'static str = "price";
//!     const MIN: Option<i64> = Some(0);
//! }
//!
//! assert!(Amount::<Price>::new(1_99).is_ok());
//! assert!(Amount::<Price>::new(-1).is_err());
//! ```
//!
mod amount;
mod double;
mod email;
mod identity;
mod integer;
mod text;
mod version;

pub use amount::{Amount, AmountLimits, AnyAmount};
pub use double::{AnyDouble, Double, DoubleLimits};
pub use email::Email;
pub use identity::{AggregateId, EventId, Identity};
pub use integer::{AnyInteger, Integer, IntegerLimits};
pub use text::{AnyText, Text, TextLimits};
pub use version::Version;

use crate::error::{DomainError, DomainResult};
use std::fmt::Display;

/// 值对象抽象
pub trait ValueObject {
    /// 业务校验失败时的错误类型
    type Error;

    /// 创建值对象时进行验证
    fn validate(&self) -> Result<(), Self::Error>;
}

/// 检查 `actual` 是否落在 `[min, max]` 内（任一端为 `None` 时不限制）
pub(crate) fn check_limits<T>(
    type_name: &'static str,
    min: Option<T>,
    max: Option<T>,
    actual: T,
) -> DomainResult<()>
where
    T: PartialOrd + Display + Copy,
{
    if let (Some(min), Some(max)) = (min, max) {
        if min > max {
            return Err(DomainError::InvalidLimits {
                type_name,
                min: min.to_string(),
                max: max.to_string(),
            });
        }
    }
    if let Some(min) = min {
        if actual < min {
            return Err(DomainError::ValueTooSmall {
                type_name,
                min: min.to_string(),
                actual: actual.to_string(),
            });
        }
    }
    if let Some(max) = max {
        if actual > max {
            return Err(DomainError::ValueTooLarge {
                type_name,
                max: max.to_string(),
                actual: actual.to_string(),
            });
        }
    }
    Ok(())
}

/// 按两位小数、千位分组格式化：`whole` 为整数部分的十进制数字串
pub(crate) fn format_grouped(
    negative: bool,
    whole: &str,
    fraction: &str,
    decimal_separator: char,
    thousands_separator: char,
) -> String {
    let mut out = String::with_capacity(whole.len() + whole.len() / 3 + fraction.len() + 2);
    if negative {
        out.push('-');
    }
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            out.push(thousands_separator);
        }
        out.push(digit);
    }
    out.push(decimal_separator);
    out.push_str(fraction);
    out
}
