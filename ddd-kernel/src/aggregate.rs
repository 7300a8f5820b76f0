//! 聚合（Aggregate）抽象
//!
//! 约束一个聚合的核心行为：
//! - `apply` 是改变状态的唯一入口：查找处理函数 → 记录事件 → 执行处理函数 → 校验不变量；
//! - `set_version` 在修改之后单调推进版本；
//! - `release_domain_events` / `release_integration_events` 两阶段发布事件。
//!
//! 聚合结构体内嵌 [`AggregateRoot`] 保存上述状态，通过 `root()` / `root_mut()` 暴露给 trait。
//!
use crate::aggregate_root::AggregateRoot;
use crate::error::DomainResult;
use crate::event::{DomainEvent, IntegrationEvent};
use crate::handlers::{EventHandlers, not_implemented};
use crate::value_object::{AggregateId, Version};
use std::any::TypeId;
use std::sync::Arc;
use tracing::{debug, warn};

/// 聚合根接口
pub trait Aggregate: Send + Sync + Sized + 'static {
    const TYPE: &'static str;

    fn root(&self) -> &AggregateRoot;

    fn root_mut(&mut self) -> &mut AggregateRoot;

    /// 该聚合的事件处理函数表
    fn event_handlers() -> &'static EventHandlers<Self>;

    /// 聚合级不变量校验，每次 `apply` 之后执行
    fn validate(&self) -> DomainResult<()> {
        Ok(())
    }

    fn id(&self) -> AggregateId {
        self.root().id()
    }

    fn version(&self) -> Option<Version> {
        self.root().version()
    }

    fn is_modified(&self) -> bool {
        self.root().is_modified()
    }

    /// 记录事件；事件已归属于某个聚合时不入队、不标记修改，返回 false
    fn record_event(&mut self, event: Arc<dyn DomainEvent>) -> bool {
        self.root_mut().record(event)
    }

    /// 应用事件
    fn apply<E: DomainEvent>(&mut self, event: E) -> DomainResult<()> {
        self.apply_shared(Arc::new(event))
    }

    /// 应用已共享的事件实例（例如从历史中重放）
    ///
    /// 找不到处理函数时直接失败，队列保持不变；处理函数或校验失败时，
    /// 事件已经入队，错误原样返回。
    fn apply_shared(&mut self, event: Arc<dyn DomainEvent>) -> DomainResult<()> {
        let handlers = Self::event_handlers();
        if !handlers.supports(event.as_ref()) {
            return Err(not_implemented(event.as_ref()));
        }

        let recorded = self.record_event(Arc::clone(&event));
        debug!(
            aggregate_type = Self::TYPE,
            aggregate_id = %self.id(),
            event_type = event.event_type(),
            event_version = event.event_version(),
            recorded,
            "applying event"
        );

        let ctx = ApplyContext::for_aggregate::<Self>(self.id());
        handlers.dispatch(self, event.as_ref(), &ctx)?;
        self.validate()
    }

    /// 设置版本：必须已修改，且新版本严格大于当前版本
    fn set_version(&mut self, version: impl Into<Version>) -> DomainResult<()> {
        let version = version.into();
        self.root_mut().set_version(Self::TYPE, version)?;
        debug!(
            aggregate_type = Self::TYPE,
            aggregate_id = %self.id(),
            %version,
            "aggregate version updated"
        );
        Ok(())
    }

    /// 发布领域事件：返回自上次发布以来应用的全部事件，并转入集成事件队列
    fn release_domain_events(&mut self) -> DomainResult<Vec<Arc<dyn DomainEvent>>> {
        let release = self.root_mut().release_domain_events()?;
        if release.discarded > 0 {
            warn!(
                aggregate_type = Self::TYPE,
                aggregate_id = %self.id(),
                discarded = release.discarded,
                "unpublished integration events replaced by a new domain release"
            );
        }
        debug!(
            aggregate_type = Self::TYPE,
            aggregate_id = %self.id(),
            count = release.events.len(),
            "domain events released"
        );
        Ok(release.events)
    }

    /// 发布集成事件：写入当前版本并清空队列
    fn release_integration_events(&mut self) -> DomainResult<Vec<Arc<dyn IntegrationEvent>>> {
        let events = self.root_mut().release_integration_events()?;
        debug!(
            aggregate_type = Self::TYPE,
            aggregate_id = %self.id(),
            version = ?self.version(),
            count = events.len(),
            "integration events released"
        );
        Ok(events)
    }
}

/// 事件应用上下文
///
/// 只能由 [`Aggregate::apply`] 创建并传给处理函数，
/// 实体据此确认调用确实来自其所属的聚合。
#[derive(Debug)]
pub struct ApplyContext {
    aggregate: TypeId,
    aggregate_type: &'static str,
    aggregate_id: AggregateId,
}

impl ApplyContext {
    pub(crate) fn for_aggregate<A: Aggregate>(aggregate_id: AggregateId) -> Self {
        Self {
            aggregate: TypeId::of::<A>(),
            aggregate_type: A::TYPE,
            aggregate_id,
        }
    }

    /// 正在应用事件的聚合类型名
    pub fn aggregate_type(&self) -> &'static str {
        self.aggregate_type
    }

    pub fn aggregate_id(&self) -> AggregateId {
        self.aggregate_id
    }

    pub fn is_owned_by<A: Aggregate>(&self) -> bool {
        self.aggregate == TypeId::of::<A>()
    }
}
