//! 领域层统一错误定义
//!
//! 聚焦聚合事件应用/版本/发布状态机、实体调用上下文与值对象校验，
//! 便于在各实现层统一转换为 `DomainError`。
//!
use crate::value_object::Version;
use thiserror::Error;

/// 统一错误类型（内核最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 事件应用 ---
    #[error("event not implemented: type={event_type}, version={event_version}")]
    EventNotImplemented {
        event_type: String,
        event_version: u32,
    },
    #[error("invariant violation: {reason}")]
    InvariantViolation { reason: String },

    // --- 聚合版本 ---
    #[error("impossible to change version for unmodified aggregate: {aggregate_type}")]
    ImpossibleToChangeVersionForUnmodifiedAggregate { aggregate_type: &'static str },
    #[error("incorrect aggregate version: current={current:?}, requested={requested}")]
    IncorrectAggregateVersion {
        current: Option<Version>,
        requested: Version,
    },
    #[error("version conflict: expected={expected:?}, actual={actual:?}")]
    VersionConflict {
        expected: Option<Version>,
        actual: Option<Version>,
    },

    // --- 事件发布 ---
    #[error("impossible to release domain events without aggregate version update")]
    ImpossibleToReleaseDomainEventsWithoutVersionUpdate,
    #[error(
        "impossible to release integration events: pending_domain_events={pending_domain_events}, queued_integration_events={queued_integration_events}"
    )]
    ImpossibleToReleaseIntegrationEvents {
        pending_domain_events: usize,
        queued_integration_events: usize,
    },
    #[error("impossible to release non-integration event: type={event_type}")]
    ImpossibleToReleaseNonIntegrationEvents { event_type: String },

    // --- 实体 ---
    #[error("entity {entity} called outside of its aggregate: expected={expected}, found={found}")]
    CallContextViolation {
        entity: &'static str,
        expected: &'static str,
        found: &'static str,
    },

    // --- 值对象 ---
    #[error("invalid value: {type_name}: {reason}")]
    InvalidValue {
        type_name: &'static str,
        reason: String,
    },
    #[error("out of range: {reason}")]
    OutOfRange { reason: String },
    #[error("{type_name} must not be less than {min}, got {actual}")]
    ValueTooSmall {
        type_name: &'static str,
        min: String,
        actual: String,
    },
    #[error("{type_name} must not be greater than {max}, got {actual}")]
    ValueTooLarge {
        type_name: &'static str,
        max: String,
        actual: String,
    },
    #[error("{type_name}: minimum {min} is greater than maximum {max}")]
    InvalidLimits {
        type_name: &'static str,
        min: String,
        max: String,
    },
}

impl DomainError {
    pub fn invariant(reason: impl Into<String>) -> Self {
        Self::InvariantViolation {
            reason: reason.into(),
        }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;
