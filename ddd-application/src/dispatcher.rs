//! 事件分发（EventDispatcher）
//!
//! - `EventDispatcher`：将聚合已发布的集成事件交给投递方；
//! - `OutboxEventDispatcher`：为每个集成事件、每个生产者登记一条出箱记录；
//! - `OutboxRelay`：按出箱记录的状态机把单个事件经由 `MessageProducer` 投递出去。
//!
use crate::error::AppResult;
use crate::message::{Message, MessageProducer};
use crate::outbox::OutboxService;
use async_trait::async_trait;
use bon::Builder;
use ddd_kernel::aggregate::Aggregate;
use ddd_kernel::event::IntegrationEvent;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// 事件分发器
///
/// 接收聚合已发布（已盖上聚合版本）的集成事件。事务重试时会以同一批事件
/// 再次调用，因此实现不能依赖聚合中的集成事件队列。
#[async_trait]
pub trait EventDispatcher<A: Aggregate>: Send + Sync {
    async fn dispatch(&self, aggregate: &A, events: &[Arc<dyn IntegrationEvent>]) -> AppResult<()>;
}

/// 基于出箱的事件分发器
#[derive(Debug, Clone, Builder)]
pub struct OutboxEventDispatcher<O> {
    outbox: O,
    /// 监听集成事件的生产者名称
    #[builder(default)]
    producers: Vec<String>,
}

impl<O> OutboxEventDispatcher<O> {
    pub fn producers(&self) -> &[String] {
        &self.producers
    }

    pub fn outbox(&self) -> &O {
        &self.outbox
    }
}

#[async_trait]
impl<A, O> EventDispatcher<A> for OutboxEventDispatcher<O>
where
    A: Aggregate,
    O: OutboxService,
{
    async fn dispatch(&self, aggregate: &A, events: &[Arc<dyn IntegrationEvent>]) -> AppResult<()> {
        if self.producers.is_empty() {
            warn!(
                aggregate_type = A::TYPE,
                aggregate_id = %aggregate.id(),
                count = events.len(),
                "no producers configured, integration events are not registered"
            );
        }

        for event in events {
            for producer in &self.producers {
                self.outbox.register_event(event.as_ref(), producer).await?;
            }
        }

        debug!(
            aggregate_type = A::TYPE,
            aggregate_id = %aggregate.id(),
            events = events.len(),
            producers = self.producers.len(),
            "integration events registered in outbox"
        );
        Ok(())
    }
}

/// 出箱投递器：process → produce → success / failed
#[derive(Debug, Clone)]
pub struct OutboxRelay<O, P> {
    outbox: O,
    producer_name: String,
    producer: P,
}

impl<O, P> OutboxRelay<O, P>
where
    O: OutboxService,
    P: MessageProducer,
{
    pub fn new(outbox: O, producer_name: impl Into<String>, producer: P) -> Self {
        Self {
            outbox,
            producer_name: producer_name.into(),
            producer,
        }
    }

    /// 投递单个事件；发送失败时记录为 failed 并返回发送错误
    ///
    /// 标记 failed 本身出错只记录日志，返回的始终是发送错误。
    pub async fn relay(&self, event: &dyn IntegrationEvent, message: &Message) -> AppResult<()> {
        let producer = self.producer_name.as_str();
        self.outbox.process_event(event, producer).await?;

        match self.producer.produce_message(message).await {
            Ok(()) => self.outbox.mark_as_success(event, producer).await,
            Err(err) => {
                error!(
                    event_id = %event.event_id(),
                    event_type = event.event_type(),
                    producer,
                    error = %err,
                    "message delivery failed"
                );
                if let Err(mark_err) = self.outbox.mark_as_failed(event, producer).await {
                    error!(
                        event_id = %event.event_id(),
                        producer,
                        error = %mark_err,
                        "failed to mark outbox record as failed"
                    );
                }
                Err(err)
            }
        }
    }
}
