//! 领域事件（Domain Event）
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`）、可对外发布的能力
//! （`IntegrationEvent`）、用于注册处理函数的静态种类信息（`EventKind`），
//! 以及承载标识/类型/版本/归属聚合的 `EventHeader`。

mod domain_event_trait;
mod event_key;
mod header;

pub use domain_event_trait::{DomainEvent, EventKind, IntegrationEvent, short_type_name};
pub use event_key::EventKey;
pub use header::EventHeader;
