/// Order 聚合示例
/// 演示事件应用、版本推进与两阶段发布：下单、加购、支付
use anyhow::Result as AnyResult;
use ddd_kernel::aggregate::{Aggregate, ApplyContext};
use ddd_kernel::aggregate_root::AggregateRoot;
use ddd_kernel::domain_event;
use ddd_kernel::error::{DomainError, DomainResult};
use ddd_kernel::event::{DomainEvent, EventHeader};
use ddd_kernel::handlers::EventHandlers;
use ddd_kernel::value_object::{AggregateId, Version};
use std::sync::{Arc, LazyLock};
use tracing_subscriber::EnvFilter;

// ============================================================================
// 领域模型定义
// ============================================================================

#[domain_event(event_type = "order.placed")]
struct OrderPlaced {
    customer: String,
}

#[domain_event(event_type = "order.item_added")]
struct ItemAdded {
    sku: String,
    price: u64,
}

/// 第二版：带数量
#[domain_event(event_type = "order.item_added", version = 2)]
struct ItemAddedV2 {
    sku: String,
    price: u64,
    quantity: u64,
}

#[domain_event(event_type = "order.paid")]
struct OrderPaid {
    amount: u64,
}

#[derive(Debug)]
struct Order {
    root: AggregateRoot,
    customer: Option<String>,
    total: u64,
    paid: bool,
}

impl Order {
    fn place(customer: &str) -> DomainResult<Self> {
        let mut order = Self::blank(AggregateRoot::generate());
        order.apply(OrderPlaced {
            header: EventHeader::default(),
            customer: customer.to_string(),
        })?;
        Ok(order)
    }

    fn blank(root: AggregateRoot) -> Self {
        Self {
            root,
            customer: None,
            total: 0,
            paid: false,
        }
    }

    fn add_item(&mut self, sku: &str, price: u64, quantity: u64) -> DomainResult<()> {
        if self.paid {
            return Err(DomainError::invariant("order already paid"));
        }
        self.apply(ItemAddedV2 {
            header: EventHeader::default(),
            sku: sku.to_string(),
            price,
            quantity,
        })
    }

    fn pay(&mut self) -> DomainResult<()> {
        let amount = self.total;
        self.apply(OrderPaid {
            header: EventHeader::default(),
            amount,
        })
    }

    fn placed(&mut self, event: &OrderPlaced, _: &ApplyContext) -> DomainResult<()> {
        self.customer = Some(event.customer.clone());
        Ok(())
    }

    fn item_added(&mut self, event: &ItemAdded, _: &ApplyContext) -> DomainResult<()> {
        self.total += event.price;
        Ok(())
    }

    fn item_added_v2(&mut self, event: &ItemAddedV2, _: &ApplyContext) -> DomainResult<()> {
        self.total += event.price * event.quantity;
        Ok(())
    }

    fn order_paid(&mut self, _: &OrderPaid, _: &ApplyContext) -> DomainResult<()> {
        self.paid = true;
        Ok(())
    }
}

impl Aggregate for Order {
    const TYPE: &'static str = "order";

    fn root(&self) -> &AggregateRoot {
        &self.root
    }

    fn root_mut(&mut self) -> &mut AggregateRoot {
        &mut self.root
    }

    fn event_handlers() -> &'static EventHandlers<Self> {
        static HANDLERS: LazyLock<EventHandlers<Order>> = LazyLock::new(|| {
            EventHandlers::builder()
                .on(Order::placed)
                .on(Order::item_added)
                .on(Order::item_added_v2)
                .on(Order::order_paid)
                .build()
        });
        &HANDLERS
    }

    fn validate(&self) -> DomainResult<()> {
        if self.customer.is_none() {
            return Err(DomainError::invariant("order must be placed first"));
        }
        Ok(())
    }
}

fn next_version(order: &Order) -> Version {
    order.version().map(|v| v.next()).unwrap_or(Version::from_value(1))
}

// ============================================================================
// 运行示例
// ============================================================================

fn main() -> AnyResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    // 1) 下单并加购（同一个工作单元）
    let mut order = Order::place("alice")?;
    order.add_item("book", 30, 2)?;
    order.set_version(next_version(&order))?;

    let persisted = order.release_domain_events()?;
    println!("persist {} events at {:?}", persisted.len(), order.version());

    let published = order.release_integration_events()?;
    for event in &published {
        println!(
            "publish {} v{} aggregate_version={:?}",
            event.event_type(),
            event.event_version(),
            event.aggregate_version()
        );
    }

    // 2) 从历史中重建：事件已归属，不会再次入队
    let id: AggregateId = order.id();
    let mut replayed = Order::blank(AggregateRoot::restored(id, Version::from_value(1)));
    let history: Vec<Arc<dyn DomainEvent>> = vec![
        Arc::new(OrderPlaced {
            header: EventHeader::rehydrated(id),
            customer: "alice".into(),
        }),
        Arc::new(ItemAdded {
            header: EventHeader::rehydrated(id),
            sku: "pen".into(),
            price: 5,
        }),
    ];
    for event in history {
        replayed.apply_shared(event)?;
    }
    println!(
        "replayed total={} modified={}",
        replayed.total,
        replayed.is_modified()
    );

    // 3) 支付（新的工作单元）
    replayed.pay()?;
    replayed.set_version(next_version(&replayed))?;
    replayed.release_domain_events()?;
    let published = replayed.release_integration_events()?;
    println!(
        "paid={} published={} at {:?}",
        replayed.paid,
        published.len(),
        replayed.version()
    );

    Ok(())
}
