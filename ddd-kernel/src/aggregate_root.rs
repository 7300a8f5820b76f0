//! 聚合根状态（AggregateRoot）
//!
//! 每个聚合内嵌一个 `AggregateRoot`，保存标识、版本与两条事件队列，
//! 并实现事件记录、版本推进与两阶段发布的状态机：
//!
//! ```text
//! unmodified → modified → versioned → domain-released → integration-released
//!                 ↑  (apply*)  │
//!                 └────────────┘
//! ```
//!
//! 修改入口统一经由 `Aggregate` trait 暴露，这里仅提供只读访问。
//!
use crate::error::{DomainError, DomainResult};
use crate::event::{DomainEvent, IntegrationEvent};
use crate::value_object::{AggregateId, Version};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct AggregateRoot {
    id: AggregateId,
    version: Option<Version>,
    is_modified: bool,
    is_version_updated: bool,
    domain_events: Vec<Arc<dyn DomainEvent>>,
    integration_events: Vec<Arc<dyn DomainEvent>>,
}

/// 领域事件发布结果：发布的事件以及被覆盖掉的未发布集成事件数量
pub(crate) struct DomainRelease {
    pub(crate) events: Vec<Arc<dyn DomainEvent>>,
    pub(crate) discarded: usize,
}

impl AggregateRoot {
    /// 以给定标识创建（版本未设置）
    pub fn new(id: AggregateId) -> Self {
        Self {
            id,
            version: None,
            is_modified: false,
            is_version_updated: false,
            domain_events: Vec::new(),
            integration_events: Vec::new(),
        }
    }

    /// 以新生成的标识创建
    pub fn generate() -> Self {
        Self::new(AggregateId::generate())
    }

    /// 从存储中恢复：带有已持久化的版本号，状态为未修改
    pub fn restored(id: AggregateId, version: Version) -> Self {
        Self {
            version: Some(version),
            ..Self::new(id)
        }
    }

    pub fn id(&self) -> AggregateId {
        self.id
    }

    pub fn version(&self) -> Option<Version> {
        self.version
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    pub fn is_version_updated(&self) -> bool {
        self.is_version_updated
    }

    /// 尚未发布的领域事件（按应用顺序）
    pub fn domain_events(&self) -> &[Arc<dyn DomainEvent>] {
        &self.domain_events
    }

    /// 已从领域事件转出、等待对外发布的事件
    pub fn integration_events(&self) -> &[Arc<dyn DomainEvent>] {
        &self.integration_events
    }

    /// 记录事件：未归属时写入聚合标识并入队；已归属时不做任何事
    pub(crate) fn record(&mut self, event: Arc<dyn DomainEvent>) -> bool {
        if !event.header().assign_aggregate(self.id) {
            return false;
        }

        self.domain_events.push(event);
        self.is_modified = true;
        true
    }

    pub(crate) fn set_version(
        &mut self,
        aggregate_type: &'static str,
        version: Version,
    ) -> DomainResult<()> {
        if !self.is_modified {
            return Err(DomainError::ImpossibleToChangeVersionForUnmodifiedAggregate {
                aggregate_type,
            });
        }

        // 未设置的版本按 0 比较，因此首个版本必须 >= 1
        let current = self.version.unwrap_or_default();
        if version <= current {
            return Err(DomainError::IncorrectAggregateVersion {
                current: self.version,
                requested: version,
            });
        }

        self.version = Some(version);
        self.is_version_updated = true;
        Ok(())
    }

    /// 将领域事件整体转入集成事件队列（覆盖而非追加）
    pub(crate) fn release_domain_events(&mut self) -> DomainResult<DomainRelease> {
        if !self.is_version_updated {
            return Err(DomainError::ImpossibleToReleaseDomainEventsWithoutVersionUpdate);
        }

        let events = std::mem::take(&mut self.domain_events);
        let discarded = std::mem::replace(&mut self.integration_events, events.clone()).len();
        self.is_version_updated = false;

        Ok(DomainRelease { events, discarded })
    }

    /// 取出全部集成事件并写入当前聚合版本
    ///
    /// 所有前置检查在修改队列之前完成：失败时队列保持原样。
    pub(crate) fn release_integration_events(
        &mut self,
    ) -> DomainResult<Vec<Arc<dyn IntegrationEvent>>> {
        if !self.domain_events.is_empty() || self.integration_events.is_empty() {
            return Err(DomainError::ImpossibleToReleaseIntegrationEvents {
                pending_domain_events: self.domain_events.len(),
                queued_integration_events: self.integration_events.len(),
            });
        }

        let released = self
            .integration_events
            .iter()
            .map(|event| {
                Arc::clone(event)
                    .into_integration_event()
                    .map_err(|event| DomainError::ImpossibleToReleaseNonIntegrationEvents {
                        event_type: event.event_type().to_string(),
                    })
            })
            .collect::<DomainResult<Vec<_>>>()?;

        self.integration_events.clear();

        if let Some(version) = self.version {
            for event in &released {
                if !event.header().stamp_aggregate_version(version) {
                    tracing::warn!(
                        event_id = %event.event_id(),
                        event_type = %event.event_type(),
                        "integration event already carries an aggregate version"
                    );
                }
            }
        }

        Ok(released)
    }
}
