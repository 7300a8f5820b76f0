//! 聚合提交（AggregateCommitter）
//!
//! 一次工作单元的收尾流程：
//! 1. 版本推进到 `current + 1`；
//! 2. 发布领域事件；
//! 3. 在事务中：以保存前的版本为期望值持久化事件，随后发布并分发集成事件。
//!
//! 前两步只修改内存中的聚合，在事务之外执行一次；事务重试时只重做第 3 步。
//! 集成事件在首次保存成功后从聚合中发布一次并缓存，之后的重试分发同一批事件。
//!
use crate::dispatcher::EventDispatcher;
use crate::error::AppResult;
use crate::store::AggregateStore;
use crate::transaction::{TransactionManager, UnitOfWork};
use async_trait::async_trait;
use bon::Builder;
use ddd_kernel::aggregate::Aggregate;
use ddd_kernel::event::{DomainEvent, IntegrationEvent};
use ddd_kernel::value_object::Version;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::info;

/// 提交配置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct CommitConfig {
    /// 事务最多尝试次数
    #[builder(default = NonZeroU32::MIN)]
    pub attempts: NonZeroU32,
}

impl Default for CommitConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// 一次提交的结果
#[derive(Debug, Clone)]
pub struct Committed {
    pub version: Version,
    pub domain_events: Vec<Arc<dyn DomainEvent>>,
    pub integration_events: Vec<Arc<dyn IntegrationEvent>>,
}

/// 聚合提交器
#[derive(Debug, Clone)]
pub struct AggregateCommitter<T, S, D> {
    transactions: T,
    store: S,
    dispatcher: D,
    config: CommitConfig,
}

impl<T, S, D> AggregateCommitter<T, S, D>
where
    T: TransactionManager,
{
    pub fn new(transactions: T, store: S, dispatcher: D, config: CommitConfig) -> Self {
        Self {
            transactions,
            store,
            dispatcher,
            config,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn dispatcher(&self) -> &D {
        &self.dispatcher
    }

    /// 提交聚合在本次工作单元中的全部变更
    pub async fn commit<A>(&self, aggregate: &mut A) -> AppResult<Committed>
    where
        A: Aggregate,
        S: AggregateStore<A>,
        D: EventDispatcher<A>,
    {
        let expected = aggregate.version();
        let version = expected.map_or(Version::from_value(1), |v| v.next());

        aggregate.set_version(version)?;
        let domain_events = aggregate.release_domain_events()?;

        let mut work = CommitWork {
            aggregate: &mut *aggregate,
            expected,
            events: &domain_events,
            store: &self.store,
            dispatcher: &self.dispatcher,
            released: None,
        };
        self.transactions
            .transaction(&mut work, self.config.attempts)
            .await?;
        let integration_events = work.released.unwrap_or_default();

        info!(
            aggregate_type = A::TYPE,
            aggregate_id = %aggregate.id(),
            %version,
            domain_events = domain_events.len(),
            integration_events = integration_events.len(),
            "aggregate committed"
        );

        Ok(Committed {
            version,
            domain_events,
            integration_events,
        })
    }
}

struct CommitWork<'a, A, S, D> {
    aggregate: &'a mut A,
    expected: Option<Version>,
    events: &'a [Arc<dyn DomainEvent>],
    store: &'a S,
    dispatcher: &'a D,
    released: Option<Vec<Arc<dyn IntegrationEvent>>>,
}

#[async_trait]
impl<'a, A, S, D> UnitOfWork for CommitWork<'a, A, S, D>
where
    A: Aggregate,
    S: AggregateStore<A>,
    D: EventDispatcher<A>,
{
    async fn run(&mut self) -> AppResult<()> {
        self.store
            .save(&*self.aggregate, self.expected, self.events)
            .await?;

        let events = match self.released.take() {
            Some(events) => events,
            None => self.aggregate.release_integration_events()?,
        };
        let dispatched = self.dispatcher.dispatch(&*self.aggregate, &events).await;
        self.released = Some(events);
        dispatched
    }
}
