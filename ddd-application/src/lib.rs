//! DDD 应用层（ddd-application）
//!
//! 围绕 `ddd-kernel` 的聚合定义应用层协作者接口，并提供一次工作单元的提交流程：
//! - 出箱（`outbox`）：每个集成事件、每个生产者一条投递记录；
//! - 事务（`transaction`）：工作单元、事务管理器与数据库事务接口；
//! - 存储（`store`）：以聚合版本做乐观锁的事件存储接口；
//! - 分发（`dispatcher`）：把集成事件登记到出箱并经由消息生产者投递；
//! - 消息（`message`）：消息结构与生产者/消费者接口；
//! - 提交（`committer`）：版本推进 → 发布领域事件 → 事务内保存并分发。
//!
//! 开启 `inmemory` 特性（默认）时提供出箱与存储的内存实现，便于示例与测试。
//!
pub mod committer;
pub mod dispatcher;
pub mod error;
pub mod message;
pub mod outbox;
pub mod store;
pub mod transaction;

pub use committer::{AggregateCommitter, CommitConfig};
pub use dispatcher::{EventDispatcher, OutboxEventDispatcher, OutboxRelay};
pub use error::{AppError, AppResult};
