//! DDD 领域内核（ddd-kernel）
//!
//! 以聚合根为中心的事件溯源内核，提供：
//! - 聚合（`aggregate`）：事件应用、乐观版本与两阶段事件发布的状态机；
//! - 领域事件（`event`）：事件头、对象安全的 `DomainEvent` 与可发布的 `IntegrationEvent`；
//! - 处理函数表（`handlers`）：按 (事件类型, 事件版本) 显式登记的状态变更函数；
//! - 实体（`entity`）：只能在所属聚合上下文中应用事件的子对象；
//! - 值对象（`value_object`）与分页（`pagination`）等通用构件。
//!
//! 本 crate 不做任何 I/O，也不负责事件的序列化与传输，
//! 持久化、事务与投递由应用层（`ddd-application`）中的协作者接口完成。
//!
//! 典型用法：
//! 1. 用 `#[domain_event]` 定义事件，在聚合上用 `EventHandlers` 登记处理函数；
//! 2. 多次 `apply` 事件，随后 `set_version` 推进版本；
//! 3. `release_domain_events` 取出待持久化的事件；
//! 4. `release_integration_events` 取出带聚合版本的集成事件交给投递方。
//!
pub mod aggregate;
pub mod aggregate_root;
pub mod entity;
pub mod error;
pub mod event;
pub mod handlers;
pub mod pagination;
pub mod value_object;

pub use ddd_kernel_macros::domain_event;

// 允许在本 crate 内部通过 ::ddd_kernel 进行自引用，
// 以便过程宏在本 crate 的单元测试中也能解析到 ::ddd_kernel 路径。
extern crate self as ddd_kernel;
