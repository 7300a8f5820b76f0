//! 事务（Transaction）
//!
//! - `TransactionManager`：在一个事务中执行工作单元，失败时回滚，按次数重试；
//! - `Transaction` / `TransactionFactory`：底层数据库事务的开启、提交与回滚；
//! - `FactoryTransactionManager`：基于事务工厂的通用实现，不含退避策略。
//!
//! 典型场景：保存聚合的同时登记出箱记录，任一步失败时聚合也不应被持久化。
//!
use crate::error::{AppError, AppResult};
use async_trait::async_trait;
use std::num::NonZeroU32;
use tracing::{error, warn};

/// 在事务中执行的工作单元，重试时会被再次调用
#[async_trait]
pub trait UnitOfWork: Send {
    async fn run(&mut self) -> AppResult<()>;
}

/// 事务管理器
#[async_trait]
pub trait TransactionManager: Send + Sync {
    /// 执行工作单元，最多尝试 `attempts` 次
    async fn transaction(
        &self,
        work: &mut (dyn UnitOfWork + '_),
        attempts: NonZeroU32,
    ) -> AppResult<()>;
}

/// 数据库事务
#[async_trait]
pub trait Transaction: Send {
    async fn begin(&mut self) -> AppResult<()>;

    async fn commit(&mut self) -> AppResult<()>;

    async fn rollback(&mut self) -> AppResult<()>;
}

/// 事务工厂：每次尝试获取一个新的事务对象
pub trait TransactionFactory: Send + Sync {
    type Transaction: Transaction;

    fn new_transaction(&self) -> Self::Transaction;
}

/// 基于 `TransactionFactory` 的事务管理器
///
/// 每次尝试：begin → run → commit，run 或 commit 失败则 rollback 并进入下一次尝试。
/// 尝试次数用尽后，单次尝试时原样返回错误，多次尝试时返回 `RetriesExhausted`。
#[derive(Debug, Clone)]
pub struct FactoryTransactionManager<F> {
    factory: F,
}

impl<F: TransactionFactory> FactoryTransactionManager<F> {
    pub fn new(factory: F) -> Self {
        Self { factory }
    }

    async fn attempt(&self, work: &mut (dyn UnitOfWork + '_)) -> AppResult<()> {
        let mut tx = self.factory.new_transaction();
        tx.begin().await?;

        let outcome = match work.run().await {
            Ok(()) => tx.commit().await,
            Err(err) => Err(err),
        };

        if let Err(err) = &outcome {
            if let Err(rollback) = tx.rollback().await {
                error!(error = %err, rollback_error = %rollback, "transaction rollback failed");
            }
        }
        outcome
    }
}

#[async_trait]
impl<F: TransactionFactory> TransactionManager for FactoryTransactionManager<F> {
    async fn transaction(
        &self,
        work: &mut (dyn UnitOfWork + '_),
        attempts: NonZeroU32,
    ) -> AppResult<()> {
        let attempts = attempts.get();
        let mut attempt = 1;

        loop {
            match self.attempt(work).await {
                Ok(()) => return Ok(()),
                Err(err) if attempt < attempts => {
                    warn!(attempt, attempts, error = %err, "unit of work failed, retrying");
                    attempt += 1;
                }
                Err(err) if attempts > 1 => {
                    error!(attempts, error = %err, "unit of work failed, retries exhausted");
                    return Err(AppError::RetriesExhausted {
                        attempts,
                        last: Box::new(err),
                    });
                }
                Err(err) => {
                    error!(error = %err, "unit of work failed");
                    return Err(err);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Journal {
        entries: Arc<Mutex<Vec<&'static str>>>,
    }

    impl Journal {
        fn push(&self, entry: &'static str) {
            self.entries.lock().unwrap().push(entry);
        }

        fn take(&self) -> Vec<&'static str> {
            std::mem::take(&mut *self.entries.lock().unwrap())
        }
    }

    struct Tx {
        journal: Journal,
        fail_commit: bool,
    }

    #[async_trait]
    impl Transaction for Tx {
        async fn begin(&mut self) -> AppResult<()> {
            self.journal.push("begin");
            Ok(())
        }

        async fn commit(&mut self) -> AppResult<()> {
            self.journal.push("commit");
            if self.fail_commit {
                return Err(AppError::Transaction {
                    reason: "commit refused".into(),
                });
            }
            Ok(())
        }

        async fn rollback(&mut self) -> AppResult<()> {
            self.journal.push("rollback");
            Ok(())
        }
    }

    struct Factory {
        journal: Journal,
        fail_commit: bool,
    }

    impl TransactionFactory for Factory {
        type Transaction = Tx;

        fn new_transaction(&self) -> Tx {
            Tx {
                journal: self.journal.clone(),
                fail_commit: self.fail_commit,
            }
        }
    }

    /// 前 `failures` 次执行失败
    struct Flaky {
        calls: Arc<AtomicUsize>,
        failures: usize,
        journal: Journal,
    }

    #[async_trait]
    impl UnitOfWork for Flaky {
        async fn run(&mut self) -> AppResult<()> {
            self.journal.push("run");
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            if call < self.failures {
                return Err(AppError::Infra(format!("boom #{call}")));
            }
            Ok(())
        }
    }

    fn manager(journal: &Journal, fail_commit: bool) -> FactoryTransactionManager<Factory> {
        FactoryTransactionManager::new(Factory {
            journal: journal.clone(),
            fail_commit,
        })
    }

    fn flaky(journal: &Journal, failures: usize) -> Flaky {
        Flaky {
            calls: Arc::new(AtomicUsize::new(0)),
            failures,
            journal: journal.clone(),
        }
    }

    fn attempts(n: u32) -> NonZeroU32 {
        NonZeroU32::new(n).unwrap()
    }

    #[tokio::test]
    async fn commits_when_work_succeeds() {
        let journal = Journal::default();
        let mut work = flaky(&journal, 0);

        manager(&journal, false)
            .transaction(&mut work, attempts(1))
            .await
            .unwrap();

        assert_eq!(journal.take(), vec!["begin", "run", "commit"]);
    }

    #[tokio::test]
    async fn single_attempt_returns_original_error_after_rollback() {
        let journal = Journal::default();
        let mut work = flaky(&journal, 1);

        let err = manager(&journal, false)
            .transaction(&mut work, attempts(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Infra(_)));
        assert_eq!(journal.take(), vec!["begin", "run", "rollback"]);
    }

    #[tokio::test]
    async fn retries_until_success() {
        let journal = Journal::default();
        let mut work = flaky(&journal, 2);

        manager(&journal, false)
            .transaction(&mut work, attempts(3))
            .await
            .unwrap();

        assert_eq!(work.calls.load(Ordering::SeqCst), 3);
        assert_eq!(
            journal.take(),
            vec![
                "begin", "run", "rollback", "begin", "run", "rollback", "begin", "run", "commit"
            ]
        );
    }

    #[tokio::test]
    async fn exhausted_retries_wrap_last_error() {
        let journal = Journal::default();
        let mut work = flaky(&journal, 5);

        let err = manager(&journal, false)
            .transaction(&mut work, attempts(2))
            .await
            .unwrap_err();

        match err {
            AppError::RetriesExhausted { attempts, last } => {
                assert_eq!(attempts, 2);
                assert_eq!(last.to_string(), "infra: boom #1");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn failed_commit_is_rolled_back() {
        let journal = Journal::default();
        let mut work = flaky(&journal, 0);

        let err = manager(&journal, true)
            .transaction(&mut work, attempts(1))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Transaction { .. }));
        assert_eq!(journal.take(), vec!["begin", "run", "commit", "rollback"]);
    }
}
