use super::header::EventHeader;
use crate::value_object::{AggregateId, EventId, Version};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 领域事件需要满足的通用能力边界
///
/// 该 trait 是对象安全的：聚合内部以 `Arc<dyn DomainEvent>` 排队，
/// 通过 `as_any` 下转型到具体事件类型再交给处理函数。
/// 通常由 `#[domain_event]` 宏生成实现。
pub trait DomainEvent: Any + fmt::Debug + Send + Sync {
    fn header(&self) -> &EventHeader;

    /// 具体事件种类的名称（未显式设置类型时作为 `event_type`）
    fn kind(&self) -> &'static str;

    /// 事件头未显式设置版本时使用的版本号
    fn default_version(&self) -> u32 {
        1
    }

    fn as_any(&self) -> &dyn Any;

    /// 可发布能力：是集成事件时返回 Some
    fn as_integration_event(&self) -> Option<&dyn IntegrationEvent>;

    fn into_integration_event(
        self: Arc<Self>,
    ) -> Result<Arc<dyn IntegrationEvent>, Arc<dyn DomainEvent>>;

    fn event_id(&self) -> EventId {
        self.header().event_id()
    }

    fn event_type(&self) -> &str {
        self.header().event_type_or(self.kind())
    }

    fn event_version(&self) -> u32 {
        self.header()
            .event_version()
            .unwrap_or_else(|| self.default_version())
    }

    fn aggregate_id(&self) -> Option<AggregateId> {
        self.header().aggregate_id()
    }

    /// 发布集成事件时聚合所处的版本
    fn aggregate_version(&self) -> Option<Version> {
        self.header().aggregate_version()
    }
}

/// 集成事件：可在聚合发布后推送到外部系统的领域事件
pub trait IntegrationEvent: DomainEvent {}

/// 事件种类的静态信息，用于注册处理函数
pub trait EventKind: DomainEvent + Sized {
    const EVENT_TYPE: &'static str;
    const EVENT_VERSION: u32 = 1;
}

/// 取类型名最后一段（去掉模块路径与泛型参数），便于手写 `DomainEvent::kind`
pub fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

#[cfg(test)]
mod tests {
    use super::*;

    mod nested {
        pub struct Placed;
        pub struct Wrapper<T>(pub T);
    }

    #[test]
    fn short_type_name_strips_module_path_and_generics() {
        assert_eq!(short_type_name::<nested::Placed>(), "Placed");
        assert_eq!(short_type_name::<nested::Wrapper<nested::Placed>>(), "Wrapper");
    }
}
