use super::DomainEvent;
use std::fmt;

/// 处理函数的分发键：(事件类型, 事件版本)
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EventKey {
    pub event_type: String,
    pub event_version: u32,
}

impl EventKey {
    pub fn new(event_type: impl Into<String>, event_version: u32) -> Self {
        Self {
            event_type: event_type.into(),
            event_version,
        }
    }

    /// 按事件自身的类型与版本计算分发键
    pub fn of(event: &dyn DomainEvent) -> Self {
        Self::new(event.event_type(), event.event_version())
    }
}

/// 版本 1 显示为 `Type`，其余显示为 `TypeV{n}`
impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.event_version > 1 {
            write!(f, "{}V{}", self.event_type, self.event_version)
        } else {
            write!(f, "{}", self.event_type)
        }
    }
}
