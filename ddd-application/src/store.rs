//! 聚合存储（AggregateStore）
//!
//! 保存一次工作单元中发布的领域事件，并以聚合版本做乐观锁：
//! 调用方给出保存前读到的版本 `expected`，与存储中的版本不一致时返回
//! `DomainError::VersionConflict`，由事务管理器决定是否重试。
//!
use crate::error::AppResult;
use async_trait::async_trait;
use ddd_kernel::aggregate::Aggregate;
use ddd_kernel::event::DomainEvent;
use ddd_kernel::value_object::{AggregateId, Version};
use std::sync::Arc;

/// 聚合存储接口
#[async_trait]
pub trait AggregateStore<A: Aggregate>: Send + Sync {
    /// 保存聚合在当前版本下的事件
    ///
    /// - `expected`：保存前的版本（新聚合为 `None`）；
    /// - `events`：本次发布的领域事件，按应用顺序。
    async fn save(
        &self,
        aggregate: &A,
        expected: Option<Version>,
        events: &[Arc<dyn DomainEvent>],
    ) -> AppResult<()>;

    /// 存储中的当前版本
    async fn current_version(&self, id: AggregateId) -> AppResult<Option<Version>>;
}

#[async_trait]
impl<A, S> AggregateStore<A> for Arc<S>
where
    A: Aggregate,
    S: AggregateStore<A> + ?Sized,
{
    async fn save(
        &self,
        aggregate: &A,
        expected: Option<Version>,
        events: &[Arc<dyn DomainEvent>],
    ) -> AppResult<()> {
        (**self).save(aggregate, expected, events).await
    }

    async fn current_version(&self, id: AggregateId) -> AppResult<Option<Version>> {
        (**self).current_version(id).await
    }
}

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryAggregateStore;

#[cfg(feature = "inmemory")]
mod inmemory {
    use super::*;
    use dashmap::DashMap;
    use ddd_kernel::error::DomainError;
    use std::marker::PhantomData;
    use tracing::debug;

    #[derive(Debug, Default)]
    struct Stream {
        version: Option<Version>,
        events: Vec<Arc<dyn DomainEvent>>,
    }

    /// 基于内存的事件流存储
    ///
    /// 保存的事件已归属于聚合，可直接通过 `Aggregate::apply_shared` 重放。
    #[derive(Debug)]
    pub struct InMemoryAggregateStore<A> {
        streams: DashMap<AggregateId, Stream>,
        _aggregate: PhantomData<fn() -> A>,
    }

    impl<A> Default for InMemoryAggregateStore<A> {
        fn default() -> Self {
            Self {
                streams: DashMap::new(),
                _aggregate: PhantomData,
            }
        }
    }

    impl<A> InMemoryAggregateStore<A> {
        pub fn new() -> Self {
            Self::default()
        }

        /// 聚合的全部历史事件
        pub fn history(&self, id: AggregateId) -> Vec<Arc<dyn DomainEvent>> {
            self.streams
                .get(&id)
                .map(|s| s.events.clone())
                .unwrap_or_default()
        }
    }

    #[async_trait]
    impl<A: Aggregate> AggregateStore<A> for InMemoryAggregateStore<A> {
        async fn save(
            &self,
            aggregate: &A,
            expected: Option<Version>,
            events: &[Arc<dyn DomainEvent>],
        ) -> AppResult<()> {
            let mut stream = self.streams.entry(aggregate.id()).or_default();
            if stream.version != expected {
                return Err(DomainError::VersionConflict {
                    expected,
                    actual: stream.version,
                }
                .into());
            }

            stream.version = aggregate.version();
            stream.events.extend(events.iter().cloned());
            debug!(
                aggregate_type = A::TYPE,
                aggregate_id = %aggregate.id(),
                version = ?stream.version,
                count = events.len(),
                "aggregate events saved"
            );
            Ok(())
        }

        async fn current_version(&self, id: AggregateId) -> AppResult<Option<Version>> {
            Ok(self.streams.get(&id).and_then(|s| s.version))
        }
    }
}
