//! 事件处理函数注册表（EventHandlers）
//!
//! 以 `(事件类型, 事件版本)` 为键显式登记状态变更函数，代替按方法名查找：
//! - `on(handler)`：按事件种类自身的 `EVENT_TYPE` / `EVENT_VERSION` 注册；
//! - `on_version(n, handler)`：为同名事件的第 n 版注册独立的处理函数；
//! - `unversioned()`：忽略版本，仅按类型分发（实体使用）。
//!
//! 同一个键下可以登记多个具体类型（同名事件位于不同模块），
//! 分发时选择具体类型与事件实例一致的那一个。
//!
//! 注册表通常在 `static LazyLock` 中构建一次：
//!
//! ```ignore
//! fn event_handlers() -> &'static EventHandlers<Self> {
//!     static HANDLERS: LazyLock<EventHandlers<Order>> = LazyLock::new(|| {
//!         EventHandlers::builder()
//!             .on(Order::apply_placed)
//!             .on_version(2, Order::apply_placed_v2)
//!             .build()
//!     });
//!     &HANDLERS
//! }
//! ```
use crate::aggregate::ApplyContext;
use crate::error::{DomainError, DomainResult};
use crate::event::{DomainEvent, EventKey, EventKind};
use std::any::TypeId;
use std::collections::HashMap;
use std::fmt;

type HandlerFn<T> =
    Box<dyn Fn(&mut T, &dyn DomainEvent, &ApplyContext) -> DomainResult<()> + Send + Sync>;

struct HandlerEntry<T> {
    event: TypeId,
    call: HandlerFn<T>,
}

/// 某个聚合（或实体）类型的事件处理函数表
pub struct EventHandlers<T> {
    versioned: bool,
    entries: HashMap<String, HashMap<u32, Vec<HandlerEntry<T>>>>,
}

impl<T: 'static> EventHandlers<T> {
    pub fn builder() -> EventHandlersBuilder<T> {
        EventHandlersBuilder {
            handlers: Self {
                versioned: true,
                entries: HashMap::new(),
            },
        }
    }

    pub fn is_versioned(&self) -> bool {
        self.versioned
    }

    /// 该事件实例在表中的分发键
    pub fn key_for(&self, event: &dyn DomainEvent) -> EventKey {
        if self.versioned {
            EventKey::of(event)
        } else {
            EventKey::new(event.event_type(), 1)
        }
    }

    /// 是否登记过该键
    pub fn contains(&self, key: &EventKey) -> bool {
        self.entries
            .get(&key.event_type)
            .is_some_and(|by_version| by_version.contains_key(&key.event_version))
    }

    /// 是否存在能处理该事件实例的函数
    pub fn supports(&self, event: &dyn DomainEvent) -> bool {
        self.resolve(event).is_some()
    }

    /// 已注册的全部键（按类型、版本排序）
    pub fn keys(&self) -> Vec<EventKey> {
        let mut keys: Vec<EventKey> = self
            .entries
            .iter()
            .flat_map(|(ty, by_version)| by_version.keys().map(|v| EventKey::new(ty.as_str(), *v)))
            .collect();
        keys.sort_by(|a, b| {
            a.event_type
                .cmp(&b.event_type)
                .then(a.event_version.cmp(&b.event_version))
        });
        keys
    }

    /// 调用匹配的处理函数；不存在时返回 `EventNotImplemented`
    pub fn dispatch(
        &self,
        target: &mut T,
        event: &dyn DomainEvent,
        ctx: &ApplyContext,
    ) -> DomainResult<()> {
        match self.resolve(event) {
            Some(entry) => (entry.call)(target, event, ctx),
            None => Err(not_implemented(event)),
        }
    }

    fn resolve(&self, event: &dyn DomainEvent) -> Option<&HandlerEntry<T>> {
        let version = if self.versioned {
            event.event_version()
        } else {
            1
        };
        let concrete = event.as_any().type_id();

        self.entries
            .get(event.event_type())?
            .get(&version)?
            .iter()
            .find(|entry| entry.event == concrete)
    }
}

impl<T> fmt::Debug for EventHandlers<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut keys: Vec<(&str, u32)> = self
            .entries
            .iter()
            .flat_map(|(ty, by_version)| by_version.keys().map(move |v| (ty.as_str(), *v)))
            .collect();
        keys.sort();
        f.debug_struct("EventHandlers")
            .field("versioned", &self.versioned)
            .field("keys", &keys)
            .finish()
    }
}

pub(crate) fn not_implemented(event: &dyn DomainEvent) -> DomainError {
    DomainError::EventNotImplemented {
        event_type: event.event_type().to_string(),
        event_version: event.event_version(),
    }
}

/// `EventHandlers` 构建器
pub struct EventHandlersBuilder<T> {
    handlers: EventHandlers<T>,
}

impl<T: 'static> EventHandlersBuilder<T> {
    /// 忽略事件版本，仅按类型分发
    pub fn unversioned(mut self) -> Self {
        self.handlers.versioned = false;
        self
    }

    /// 以事件种类默认的类型与版本注册
    pub fn on<E, F>(self, handler: F) -> Self
    where
        E: EventKind,
        F: Fn(&mut T, &E, &ApplyContext) -> DomainResult<()> + Send + Sync + 'static,
    {
        self.on_version(E::EVENT_VERSION, handler)
    }

    /// 以指定版本注册（版本 > 1 对应事件结构的演进）
    pub fn on_version<E, F>(mut self, version: u32, handler: F) -> Self
    where
        E: EventKind,
        F: Fn(&mut T, &E, &ApplyContext) -> DomainResult<()> + Send + Sync + 'static,
    {
        let call: HandlerFn<T> = Box::new(
            move |target: &mut T, event: &dyn DomainEvent, ctx: &ApplyContext| match event
                .as_any()
                .downcast_ref::<E>()
            {
                Some(typed) => handler(target, typed, ctx),
                None => Err(not_implemented(event)),
            },
        );

        self.handlers
            .entries
            .entry(E::EVENT_TYPE.to_string())
            .or_default()
            .entry(version)
            .or_default()
            .push(HandlerEntry {
                event: TypeId::of::<E>(),
                call,
            });
        self
    }

    /// 无版本表在此把所有版本折叠到版本 1，与 `unversioned()` 的调用位置无关
    pub fn build(mut self) -> EventHandlers<T> {
        if !self.handlers.versioned {
            for by_version in self.handlers.entries.values_mut() {
                let merged: Vec<HandlerEntry<T>> = std::mem::take(by_version)
                    .into_values()
                    .flatten()
                    .collect();
                by_version.insert(1, merged);
            }
        }
        self.handlers
    }
}
