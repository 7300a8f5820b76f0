//! 出箱（Outbox）
//!
//! 为每个集成事件、每个生产者（监听方）维护一条投递记录，
//! 通过状态与尝试次数实现至少一次投递：
//!
//! ```text
//! pending → inProgress → success
//!               │
//!               └──────→ failed → (重新 process) → inProgress ...
//! ```
//!
//! 具体存储由实现方决定；`inmemory` 特性下提供基于 `DashMap` 的内存实现。
//!
use crate::error::AppResult;
use async_trait::async_trait;
use bon::Builder;
use chrono::{DateTime, Utc};
use ddd_kernel::event::IntegrationEvent;
use ddd_kernel::value_object::EventId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// 出箱记录状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OutboxStatus {
    /// 已登记，等待处理
    Pending,
    /// 正在投递
    InProgress,
    /// 投递成功
    Success,
    /// 投递失败
    Failed,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::InProgress => "inProgress",
            OutboxStatus::Success => "success",
            OutboxStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 出箱记录：以 (event_id, producer) 为键
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Builder)]
#[serde(rename_all = "camelCase")]
pub struct OutboxRecord {
    pub event_id: EventId,
    #[builder(into)]
    pub event_type: String,
    /// 序列化后的事件体（格式由实现方决定）
    #[builder(into)]
    pub event_body: String,
    #[builder(into)]
    pub producer: String,
    #[builder(default = OutboxStatus::Pending)]
    pub status: OutboxStatus,
    #[builder(default)]
    pub tries_count: u32,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
}

/// 失败记录查询条件；各列表为空表示不限制
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct FailedRecordsQuery {
    #[builder(default)]
    pub types: Vec<String>,
    #[builder(default)]
    pub ids: Vec<EventId>,
    #[builder(default)]
    pub producers: Vec<String>,
    /// 只返回尝试次数小于该值的记录
    #[builder(default = FailedRecordsQuery::DEFAULT_MAX_TRIES)]
    pub max_tries: u32,
}

impl FailedRecordsQuery {
    pub const DEFAULT_MAX_TRIES: u32 = 4;

    /// 记录是否满足查询条件
    pub fn matches(&self, record: &OutboxRecord) -> bool {
        record.status == OutboxStatus::Failed
            && record.tries_count < self.max_tries
            && (self.types.is_empty() || self.types.contains(&record.event_type))
            && (self.ids.is_empty() || self.ids.contains(&record.event_id))
            && (self.producers.is_empty() || self.producers.contains(&record.producer))
    }
}

impl Default for FailedRecordsQuery {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// 出箱服务
#[async_trait]
pub trait OutboxService: Send + Sync {
    /// 为 (事件, 生产者) 登记一条 `pending` 记录
    async fn register_event(&self, event: &dyn IntegrationEvent, producer: &str) -> AppResult<()>;

    /// 转为 `inProgress` 并累加尝试次数
    async fn process_event(&self, event: &dyn IntegrationEvent, producer: &str) -> AppResult<()>;

    async fn mark_as_success(&self, event: &dyn IntegrationEvent, producer: &str) -> AppResult<()>;

    async fn mark_as_failed(&self, event: &dyn IntegrationEvent, producer: &str) -> AppResult<()>;

    /// 删除早于 `before` 创建且已成功的记录，返回删除数量
    async fn remove_old_success_events(&self, before: DateTime<Utc>) -> AppResult<usize>;

    async fn get_failed_event_records(
        &self,
        query: &FailedRecordsQuery,
    ) -> AppResult<Vec<OutboxRecord>>;
}

#[async_trait]
impl<T: OutboxService + ?Sized> OutboxService for std::sync::Arc<T> {
    async fn register_event(&self, event: &dyn IntegrationEvent, producer: &str) -> AppResult<()> {
        (**self).register_event(event, producer).await
    }

    async fn process_event(&self, event: &dyn IntegrationEvent, producer: &str) -> AppResult<()> {
        (**self).process_event(event, producer).await
    }

    async fn mark_as_success(&self, event: &dyn IntegrationEvent, producer: &str) -> AppResult<()> {
        (**self).mark_as_success(event, producer).await
    }

    async fn mark_as_failed(&self, event: &dyn IntegrationEvent, producer: &str) -> AppResult<()> {
        (**self).mark_as_failed(event, producer).await
    }

    async fn remove_old_success_events(&self, before: DateTime<Utc>) -> AppResult<usize> {
        (**self).remove_old_success_events(before).await
    }

    async fn get_failed_event_records(
        &self,
        query: &FailedRecordsQuery,
    ) -> AppResult<Vec<OutboxRecord>> {
        (**self).get_failed_event_records(query).await
    }
}

#[cfg(feature = "inmemory")]
pub use inmemory::InMemoryOutboxService;

#[cfg(feature = "inmemory")]
mod inmemory {
    use super::*;
    use crate::error::AppError;
    use dashmap::DashMap;
    use dashmap::mapref::entry::Entry;
    use tracing::debug;

    type RecordKey = (EventId, String);

    /// 基于内存的出箱实现
    ///
    /// 事件体保存为事件的 `Debug` 形式，仅用于测试与示例。
    #[derive(Debug, Default)]
    pub struct InMemoryOutboxService {
        records: DashMap<RecordKey, OutboxRecord>,
    }

    impl InMemoryOutboxService {
        pub fn new() -> Self {
            Self::default()
        }

        /// 当前全部记录（按创建时间、生产者排序）
        pub fn records(&self) -> Vec<OutboxRecord> {
            let mut records: Vec<OutboxRecord> =
                self.records.iter().map(|r| r.value().clone()).collect();
            records.sort_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.producer.cmp(&b.producer))
            });
            records
        }

        pub fn get(&self, event_id: EventId, producer: &str) -> Option<OutboxRecord> {
            self.records
                .get(&(event_id, producer.to_string()))
                .map(|r| r.value().clone())
        }

        fn update(
            &self,
            event: &dyn IntegrationEvent,
            producer: &str,
            f: impl FnOnce(&mut OutboxRecord),
        ) -> AppResult<()> {
            let key = (event.event_id(), producer.to_string());
            let mut record = self.records.get_mut(&key).ok_or_else(|| AppError::Outbox {
                reason: format!(
                    "record not found: event_id={}, producer={producer}",
                    event.event_id()
                ),
            })?;
            f(record.value_mut());
            debug!(
                event_id = %record.event_id,
                producer,
                status = %record.status,
                tries = record.tries_count,
                "outbox record updated"
            );
            Ok(())
        }
    }

    #[async_trait]
    impl OutboxService for InMemoryOutboxService {
        async fn register_event(
            &self,
            event: &dyn IntegrationEvent,
            producer: &str,
        ) -> AppResult<()> {
            match self.records.entry((event.event_id(), producer.to_string())) {
                Entry::Occupied(_) => Err(AppError::Outbox {
                    reason: format!(
                        "event already registered: event_id={}, producer={producer}",
                        event.event_id()
                    ),
                }),
                Entry::Vacant(slot) => {
                    slot.insert(
                        OutboxRecord::builder()
                            .event_id(event.event_id())
                            .event_type(event.event_type())
                            .event_body(format!("{event:?}"))
                            .producer(producer)
                            .build(),
                    );
                    Ok(())
                }
            }
        }

        async fn process_event(
            &self,
            event: &dyn IntegrationEvent,
            producer: &str,
        ) -> AppResult<()> {
            self.update(event, producer, |record| {
                record.status = OutboxStatus::InProgress;
                record.tries_count += 1;
            })
        }

        async fn mark_as_success(
            &self,
            event: &dyn IntegrationEvent,
            producer: &str,
        ) -> AppResult<()> {
            self.update(event, producer, |record| {
                record.status = OutboxStatus::Success
            })
        }

        async fn mark_as_failed(
            &self,
            event: &dyn IntegrationEvent,
            producer: &str,
        ) -> AppResult<()> {
            self.update(event, producer, |record| record.status = OutboxStatus::Failed)
        }

        async fn remove_old_success_events(&self, before: DateTime<Utc>) -> AppResult<usize> {
            let total = self.records.len();
            self.records.retain(|_, record| {
                !(record.status == OutboxStatus::Success && record.created_at < before)
            });
            Ok(total - self.records.len())
        }

        async fn get_failed_event_records(
            &self,
            query: &FailedRecordsQuery,
        ) -> AppResult<Vec<OutboxRecord>> {
            Ok(self
                .records()
                .into_iter()
                .filter(|record| query.matches(record))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(status: OutboxStatus, tries: u32, producer: &str) -> OutboxRecord {
        OutboxRecord::builder()
            .event_id(EventId::generate())
            .event_type("order.placed")
            .event_body("{}")
            .producer(producer)
            .status(status)
            .tries_count(tries)
            .build()
    }

    #[test]
    fn status_serializes_camel_case() {
        assert_eq!(
            serde_json::to_string(&OutboxStatus::InProgress).unwrap(),
            "\"inProgress\""
        );
        let back: OutboxStatus = serde_json::from_str("\"failed\"").unwrap();
        assert_eq!(back, OutboxStatus::Failed);
        assert_eq!(OutboxStatus::Pending.to_string(), "pending");
    }

    #[test]
    fn record_builder_defaults_to_pending() {
        let r = OutboxRecord::builder()
            .event_id(EventId::generate())
            .event_type("t")
            .event_body("{}")
            .producer("p")
            .build();
        assert_eq!(r.status, OutboxStatus::Pending);
        assert_eq!(r.tries_count, 0);
    }

    #[test]
    fn failed_query_defaults_and_filters() {
        let query = FailedRecordsQuery::default();
        assert_eq!(query.max_tries, 4);

        assert!(query.matches(&record(OutboxStatus::Failed, 3, "mail")));
        assert!(!query.matches(&record(OutboxStatus::Failed, 4, "mail")));
        assert!(!query.matches(&record(OutboxStatus::Pending, 0, "mail")));

        let only_sms = FailedRecordsQuery::builder()
            .producers(vec!["sms".into()])
            .build();
        assert!(!only_sms.matches(&record(OutboxStatus::Failed, 1, "mail")));
        assert!(only_sms.matches(&record(OutboxStatus::Failed, 1, "sms")));

        let typed = FailedRecordsQuery::builder()
            .types(vec!["order.paid".into()])
            .build();
        assert!(!typed.matches(&record(OutboxStatus::Failed, 1, "sms")));
    }
}
