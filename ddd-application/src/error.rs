use ddd_kernel::error::DomainError;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("outbox: {reason}")]
    Outbox { reason: String },

    #[error("transaction: {reason}")]
    Transaction { reason: String },

    #[error("message: {reason}")]
    Message { reason: String },

    #[error("retries exhausted after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: Box<AppError> },

    #[error("infra: {0}")]
    Infra(String),
}

impl AppError {
    /// 是否为乐观锁冲突（重试前需要重新加载聚合）
    pub fn is_version_conflict(&self) -> bool {
        match self {
            AppError::Domain(DomainError::VersionConflict { .. }) => true,
            AppError::RetriesExhausted { last, .. } => last.is_version_conflict(),
            _ => false,
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Message {
            reason: err.to_string(),
        }
    }
}
