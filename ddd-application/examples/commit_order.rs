/// 提交流程示例
/// 演示：聚合变更 → 事务内保存事件并登记出箱 → 经由消息生产者投递
use anyhow::Result as AnyResult;
use async_trait::async_trait;
use ddd_application::error::AppResult;
use ddd_application::message::{Message, MessageProducer};
use ddd_application::outbox::{InMemoryOutboxService, OutboxService};
use ddd_application::store::InMemoryAggregateStore;
use ddd_application::transaction::{FactoryTransactionManager, Transaction, TransactionFactory};
use ddd_application::{AggregateCommitter, CommitConfig, OutboxEventDispatcher, OutboxRelay};
use ddd_kernel::aggregate::{Aggregate, ApplyContext};
use ddd_kernel::aggregate_root::AggregateRoot;
use ddd_kernel::domain_event;
use ddd_kernel::error::DomainResult;
use ddd_kernel::event::{DomainEvent, EventHeader};
use ddd_kernel::handlers::EventHandlers;
use std::sync::{Arc, LazyLock};
use tracing_subscriber::EnvFilter;

// ============================================================================
// 领域模型
// ============================================================================

#[domain_event(event_type = "ticket.opened")]
struct TicketOpened {
    title: String,
}

#[domain_event(event_type = "ticket.closed")]
struct TicketClosed {}

#[derive(Debug)]
struct Ticket {
    root: AggregateRoot,
    title: String,
    closed: bool,
}

impl Ticket {
    fn open(title: &str) -> DomainResult<Self> {
        let mut ticket = Self {
            root: AggregateRoot::generate(),
            title: String::new(),
            closed: false,
        };
        ticket.apply(TicketOpened {
            header: EventHeader::default(),
            title: title.into(),
        })?;
        Ok(ticket)
    }

    fn close(&mut self) -> DomainResult<()> {
        self.apply(TicketClosed {
            header: EventHeader::default(),
        })
    }

    fn opened(&mut self, event: &TicketOpened, _: &ApplyContext) -> DomainResult<()> {
        self.title = event.title.clone();
        Ok(())
    }

    fn closed(&mut self, _: &TicketClosed, _: &ApplyContext) -> DomainResult<()> {
        self.closed = true;
        Ok(())
    }
}

impl Aggregate for Ticket {
    const TYPE: &'static str = "ticket";

    fn root(&self) -> &AggregateRoot {
        &self.root
    }

    fn root_mut(&mut self) -> &mut AggregateRoot {
        &mut self.root
    }

    fn event_handlers() -> &'static EventHandlers<Self> {
        static HANDLERS: LazyLock<EventHandlers<Ticket>> = LazyLock::new(|| {
            EventHandlers::builder()
                .on(Ticket::opened)
                .on(Ticket::closed)
                .build()
        });
        &HANDLERS
    }
}

// ============================================================================
// 基础设施（示例用）
// ============================================================================

#[derive(Clone, Default)]
struct NoopTransactions;

struct NoopTransaction;

#[async_trait]
impl Transaction for NoopTransaction {
    async fn begin(&mut self) -> AppResult<()> {
        Ok(())
    }

    async fn commit(&mut self) -> AppResult<()> {
        Ok(())
    }

    async fn rollback(&mut self) -> AppResult<()> {
        Ok(())
    }
}

impl TransactionFactory for NoopTransactions {
    type Transaction = NoopTransaction;

    fn new_transaction(&self) -> NoopTransaction {
        NoopTransaction
    }
}

struct StdoutProducer;

#[async_trait]
impl MessageProducer for StdoutProducer {
    async fn produce_message(&self, message: &Message) -> AppResult<()> {
        println!("produce {}", serde_json::to_string(message)?);
        Ok(())
    }
}

#[tokio::main]
async fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let outbox = Arc::new(InMemoryOutboxService::new());
    let store = Arc::new(InMemoryAggregateStore::<Ticket>::new());
    let dispatcher = OutboxEventDispatcher::builder()
        .outbox(outbox.clone())
        .producers(vec!["stdout".to_string()])
        .build();
    let committer = AggregateCommitter::new(
        FactoryTransactionManager::new(NoopTransactions),
        store.clone(),
        dispatcher,
        CommitConfig::default(),
    );
    let relay = OutboxRelay::new(outbox.clone(), "stdout", StdoutProducer);

    let mut ticket = Ticket::open("printer is on fire")?;
    ticket.close()?;
    let committed = committer.commit(&mut ticket).await?;

    for event in &committed.integration_events {
        let message = Message::builder()
            .body(serde_json::json!({
                "ticket": ticket.id().as_string(),
                "title": ticket.title,
                "closed": ticket.closed,
            }))
            .build()
            .with_header("event_type", event.event_type())
            .with_header("event_id", event.event_id().as_string());
        relay.relay(event.as_ref(), &message).await?;
    }

    for record in outbox.records() {
        println!(
            "outbox {} {} {} tries={}",
            record.event_type, record.producer, record.status, record.tries_count
        );
    }
    let failed = outbox.get_failed_event_records(&Default::default()).await?;
    println!("version={} failed={}", committed.version, failed.len());

    Ok(())
}
