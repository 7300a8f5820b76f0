//! 实体（Entity）基础抽象
//!
//! 实体是聚合内部的子对象，同样通过事件改变自身状态，但不持有独立版本。
//! 实体的 `apply` 只接受其所属聚合在 `Aggregate::apply` 中传入的 [`ApplyContext`]，
//! 其他来源的调用一律拒绝。事件按类型分发，不区分版本。
//!
use crate::aggregate::{Aggregate, ApplyContext};
use crate::error::{DomainError, DomainResult};
use crate::event::{DomainEvent, short_type_name};
use crate::handlers::EventHandlers;
use tracing::warn;

/// 聚合内部实体
pub trait Entity: Send + Sync + Sized + 'static {
    /// 所属聚合
    type Owner: Aggregate;

    /// 处理函数表，需以 `EventHandlers::builder().unversioned()` 构建
    fn event_handlers() -> &'static EventHandlers<Self>;

    /// 在所属聚合的上下文中应用事件
    fn apply(&mut self, ctx: &ApplyContext, event: &dyn DomainEvent) -> DomainResult<()> {
        if !ctx.is_owned_by::<Self::Owner>() {
            let entity = short_type_name::<Self>();
            warn!(
                entity,
                expected = Self::Owner::TYPE,
                found = ctx.aggregate_type(),
                aggregate_id = %ctx.aggregate_id(),
                event_type = event.event_type(),
                "entity called outside of its aggregate"
            );
            return Err(DomainError::CallContextViolation {
                entity,
                expected: Self::Owner::TYPE,
                found: ctx.aggregate_type(),
            });
        }

        Self::event_handlers().dispatch(self, event, ctx)
    }
}
