use crate::error::{DomainError, DomainResult};
use crate::value_object::{AggregateId, EventId, Version};
use bon::bon;
use std::num::NonZeroU32;
use std::sync::OnceLock;

/// 事件头：事件的标识、类型、版本以及所属聚合信息
///
/// 除显式设置外，所有字段只会被写入一次：
/// - `event_id` / `event_type` 在首次读取时生成并缓存；
/// - `aggregate_id` 由第一个记录该事件的聚合写入；
/// - `aggregate_version` 在发布集成事件时由聚合写入。
///
/// 后两者的写入口仅对本 crate 可见，外部只能读取。
#[derive(Debug, Clone, Default)]
pub struct EventHeader {
    event_id: OnceLock<EventId>,
    event_type: OnceLock<String>,
    event_version: Option<NonZeroU32>,
    aggregate_id: OnceLock<AggregateId>,
    aggregate_version: OnceLock<Version>,
}

#[bon]
impl EventHeader {
    /// 显式构造事件头
    ///
    /// - `event_version` 必须 >= 1；
    /// - `aggregate_id` 用于从历史中重建的事件（已归属于某个聚合）。
    #[builder]
    pub fn new(
        event_id: Option<EventId>,
        #[builder(into)] event_type: Option<String>,
        event_version: Option<u32>,
        aggregate_id: Option<AggregateId>,
    ) -> DomainResult<Self> {
        let header = Self::default();

        if let Some(id) = event_id {
            let _ = header.event_id.set(id);
        }

        if let Some(ty) = event_type {
            if ty.is_empty() {
                return Err(DomainError::InvalidValue {
                    type_name: "EventHeader",
                    reason: "event_type must not be empty".into(),
                });
            }
            let _ = header.event_type.set(ty);
        }

        if let Some(id) = aggregate_id {
            let _ = header.aggregate_id.set(id);
        }

        let event_version = match event_version {
            None => None,
            Some(v) => Some(NonZeroU32::new(v).ok_or_else(|| DomainError::InvalidValue {
                type_name: "EventHeader",
                reason: "event_version must be >= 1".into(),
            })?),
        };

        Ok(Self {
            event_version,
            ..header
        })
    }
}

impl EventHeader {
    /// 从历史中重建的事件：已归属于 `aggregate_id`，再次应用时不会重复入队
    pub fn rehydrated(aggregate_id: AggregateId) -> Self {
        let header = Self::default();
        let _ = header.aggregate_id.set(aggregate_id);
        header
    }

    /// 事件标识，首次读取时生成
    pub fn event_id(&self) -> EventId {
        *self.event_id.get_or_init(EventId::generate)
    }

    /// 事件类型，未显式设置时在首次读取时取 `kind`
    pub fn event_type_or(&self, kind: &str) -> &str {
        self.event_type.get_or_init(|| kind.to_string())
    }

    /// 显式设置的事件版本
    pub fn event_version(&self) -> Option<u32> {
        self.event_version.map(NonZeroU32::get)
    }

    pub fn aggregate_id(&self) -> Option<AggregateId> {
        self.aggregate_id.get().copied()
    }

    pub fn aggregate_version(&self) -> Option<Version> {
        self.aggregate_version.get().copied()
    }

    /// 归属到聚合；已归属时返回 false 且不做任何修改
    pub(crate) fn assign_aggregate(&self, id: AggregateId) -> bool {
        self.aggregate_id.set(id).is_ok()
    }

    /// 写入发布时的聚合版本；已写入时返回 false
    pub(crate) fn stamp_aggregate_version(&self, version: Version) -> bool {
        self.aggregate_version.set(version).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_header_is_unowned_and_lazy() {
        let header = EventHeader::default();

        assert_eq!(header.event_version(), None);
        assert_eq!(header.aggregate_id(), None);
        assert_eq!(header.aggregate_version(), None);

        let first = header.event_id();
        assert_eq!(header.event_id(), first);
        assert_eq!(header.event_type_or("Foo"), "Foo");
        // 已缓存，后续传入的 kind 不再生效
        assert_eq!(header.event_type_or("Bar"), "Foo");
    }

    #[test]
    fn builder_sets_explicit_values() {
        let event_id = EventId::generate();
        let aggregate_id = AggregateId::generate();
        let header = EventHeader::builder()
            .event_id(event_id)
            .event_type("Renamed")
            .event_version(2)
            .aggregate_id(aggregate_id)
            .build()
            .unwrap();

        assert_eq!(header.event_id(), event_id);
        assert_eq!(header.event_type_or("Ignored"), "Renamed");
        assert_eq!(header.event_version(), Some(2));
        assert_eq!(header.aggregate_id(), Some(aggregate_id));
    }

    #[test]
    fn builder_rejects_zero_version_and_empty_type() {
        assert!(matches!(
            EventHeader::builder().event_version(0).build(),
            Err(DomainError::InvalidValue { .. })
        ));
        assert!(EventHeader::builder().event_type("").build().is_err());
    }

    #[test]
    fn rehydrated_header_is_already_owned() {
        let owner = AggregateId::generate();
        let header = EventHeader::rehydrated(owner);

        assert_eq!(header.aggregate_id(), Some(owner));
        assert!(!header.assign_aggregate(AggregateId::generate()));
    }

    #[test]
    fn aggregate_fields_are_written_once() {
        let header = EventHeader::default();
        let first = AggregateId::generate();

        assert!(header.assign_aggregate(first));
        assert!(!header.assign_aggregate(AggregateId::generate()));
        assert_eq!(header.aggregate_id(), Some(first));

        assert!(header.stamp_aggregate_version(Version::from_value(3)));
        assert!(!header.stamp_aggregate_version(Version::from_value(4)));
        assert_eq!(header.aggregate_version(), Some(Version::from_value(3)));
    }
}
