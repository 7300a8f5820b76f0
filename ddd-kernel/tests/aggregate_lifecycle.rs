use anyhow::Result as AnyResult;
use ddd_kernel::aggregate::{Aggregate, ApplyContext};
use ddd_kernel::aggregate_root::AggregateRoot;
use ddd_kernel::domain_event;
use ddd_kernel::error::{DomainError, DomainResult};
use ddd_kernel::event::{DomainEvent, EventHeader, EventKey};
use ddd_kernel::handlers::EventHandlers;
use ddd_kernel::value_object::{AggregateId, Version};
use std::sync::{Arc, LazyLock};

#[domain_event]
struct FooEvent {}

#[domain_event]
struct BarEvent {}

#[domain_event(integration = false)]
struct FooBarEvent {}

#[derive(Debug)]
struct Foo {
    root: AggregateRoot,
    var: u32,
}

impl Foo {
    fn new(id: AggregateId) -> Self {
        Self {
            root: AggregateRoot::new(id),
            var: 1,
        }
    }

    fn apply_foo(&mut self, _: &FooEvent, _: &ApplyContext) -> DomainResult<()> {
        self.var = 2;
        Ok(())
    }

    fn apply_foo_v2(&mut self, _: &FooEvent, _: &ApplyContext) -> DomainResult<()> {
        self.var = 10;
        Ok(())
    }

    fn apply_foo_bar(&mut self, _: &FooBarEvent, _: &ApplyContext) -> DomainResult<()> {
        self.var = 20;
        Ok(())
    }
}

impl Aggregate for Foo {
    const TYPE: &'static str = "foo";

    fn root(&self) -> &AggregateRoot {
        &self.root
    }

    fn root_mut(&mut self) -> &mut AggregateRoot {
        &mut self.root
    }

    fn event_handlers() -> &'static EventHandlers<Self> {
        static HANDLERS: LazyLock<EventHandlers<Foo>> = LazyLock::new(|| {
            EventHandlers::builder()
                .on(Foo::apply_foo)
                .on_version(2, Foo::apply_foo_v2)
                .on(Foo::apply_foo_bar)
                .build()
        });
        &HANDLERS
    }
}

fn foo_event() -> FooEvent {
    FooEvent {
        header: EventHeader::default(),
    }
}

fn foo_event_v(version: u32) -> AnyResult<FooEvent> {
    Ok(FooEvent {
        header: EventHeader::builder().event_version(version).build()?,
    })
}

fn fresh() -> Foo {
    Foo::new(AggregateId::generate())
}

#[test]
fn handler_table_lists_registered_keys() {
    let keys = Foo::event_handlers().keys();
    assert_eq!(
        keys,
        vec![
            EventKey::new("FooBarEvent", 1),
            EventKey::new("FooEvent", 1),
            EventKey::new("FooEvent", 2),
        ]
    );
    assert!(Foo::event_handlers().contains(&EventKey::new("FooEvent", 2)));
    assert!(!Foo::event_handlers().contains(&EventKey::new("FooEvent", 3)));
}

#[test]
fn fresh_aggregate_is_unmodified_with_unset_version() {
    let foo = fresh();

    assert!(!foo.is_modified());
    assert_eq!(foo.version(), None);
    assert!(foo.root().domain_events().is_empty());
    assert!(foo.root().integration_events().is_empty());
}

#[test]
fn apply_dispatches_by_type_and_version() -> AnyResult<()> {
    let mut foo = fresh();

    foo.apply(foo_event())?;
    assert_eq!(foo.var, 2);

    foo.apply(foo_event_v(2)?)?;
    assert_eq!(foo.var, 10);

    foo.set_version(1u64)?;
    assert_eq!(foo.release_domain_events()?.len(), 2);
    Ok(())
}

#[test]
fn apply_stamps_aggregate_id_on_recorded_events() -> AnyResult<()> {
    let mut foo = fresh();
    foo.apply(foo_event())?;

    let queued = foo.root().domain_events();
    assert_eq!(queued.len(), 1);
    assert_eq!(queued[0].aggregate_id(), Some(foo.id()));
    assert_eq!(queued[0].event_type(), "FooEvent");
    Ok(())
}

#[test]
fn is_modified_turns_true_after_first_apply_and_stays() -> AnyResult<()> {
    let mut foo = fresh();
    assert!(!foo.is_modified());

    foo.apply(foo_event())?;
    assert!(foo.is_modified());

    foo.set_version(1u64)?;
    foo.release_domain_events()?;
    foo.release_integration_events()?;
    assert!(foo.is_modified());
    Ok(())
}

#[test]
fn unknown_type_or_version_is_not_implemented() -> AnyResult<()> {
    let mut foo = fresh();
    let err = foo
        .apply(BarEvent {
            header: EventHeader::default(),
        })
        .unwrap_err();
    assert!(matches!(err, DomainError::EventNotImplemented { .. }));

    // 只有 v1/v2 的处理函数时，v3 同样失败
    let err = foo.apply(foo_event_v(3)?).unwrap_err();
    match err {
        DomainError::EventNotImplemented {
            event_type,
            event_version,
        } => {
            assert_eq!(event_type, "FooEvent");
            assert_eq!(event_version, 3);
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(!foo.is_modified());
    assert_eq!(foo.var, 1);
    Ok(())
}

#[test]
fn unknown_event_fails_regardless_of_queue_state() -> AnyResult<()> {
    let mut foo = fresh();
    foo.apply(foo_event())?;

    let err = foo
        .apply(BarEvent {
            header: EventHeader::default(),
        })
        .unwrap_err();
    assert!(matches!(err, DomainError::EventNotImplemented { .. }));
    assert_eq!(foo.root().domain_events().len(), 1);
    Ok(())
}

#[test]
fn version_cannot_change_for_unmodified_aggregate() {
    let mut foo = fresh();
    let err = foo.set_version(2u64).unwrap_err();
    assert!(matches!(
        err,
        DomainError::ImpossibleToChangeVersionForUnmodifiedAggregate { aggregate_type: "foo" }
    ));
    assert_eq!(foo.version(), None);
}

#[test]
fn version_must_strictly_increase() -> AnyResult<()> {
    let mut foo = fresh();
    foo.apply(foo_event())?;
    foo.set_version(1u64)?;

    for requested in [0u64, 1] {
        let err = foo.set_version(requested).unwrap_err();
        match err {
            DomainError::IncorrectAggregateVersion { current, requested: r } => {
                assert_eq!(current, Some(Version::from_value(1)));
                assert_eq!(r, Version::from_value(requested));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    foo.set_version(5u64)?;
    assert_eq!(foo.version(), Some(Version::from_value(5)));
    Ok(())
}

#[test]
fn first_version_must_be_positive() -> AnyResult<()> {
    let mut foo = fresh();
    foo.apply(foo_event())?;

    assert!(matches!(
        foo.set_version(0u64),
        Err(DomainError::IncorrectAggregateVersion { current: None, .. })
    ));
    foo.set_version(1u64)?;
    Ok(())
}

#[test]
fn restored_aggregate_continues_from_stored_version() -> AnyResult<()> {
    let mut foo = Foo {
        root: AggregateRoot::restored(AggregateId::generate(), Version::from_value(7)),
        var: 1,
    };
    assert!(!foo.is_modified());
    assert!(foo.set_version(8u64).is_err());

    foo.apply(foo_event())?;
    assert!(foo.set_version(7u64).is_err());
    foo.set_version(8u64)?;
    Ok(())
}

#[test]
fn domain_release_requires_version_update() -> AnyResult<()> {
    let mut foo = fresh();
    foo.apply(foo_event())?;

    let err = foo.release_domain_events().unwrap_err();
    assert!(matches!(
        err,
        DomainError::ImpossibleToReleaseDomainEventsWithoutVersionUpdate
    ));

    foo.set_version(1u64)?;
    foo.release_domain_events()?;

    // 发布之后需要再次推进版本
    foo.apply(foo_event())?;
    assert!(foo.release_domain_events().is_err());
    Ok(())
}

#[test]
fn domain_release_returns_events_in_order_and_drains_queue() -> AnyResult<()> {
    let mut foo = fresh();
    let first = foo_event();
    let second = foo_event_v(2)?;
    let ids = [first.event_id(), second.event_id()];

    foo.apply(first)?;
    foo.apply(second)?;
    foo.set_version(1u64)?;

    let released = foo.release_domain_events()?;
    let released_ids: Vec<_> = released.iter().map(|e| e.event_id()).collect();
    assert_eq!(released_ids, ids);
    assert!(foo.root().domain_events().is_empty());
    assert_eq!(foo.root().integration_events().len(), 2);
    assert!(!foo.root().is_version_updated());
    Ok(())
}

#[test]
fn integration_release_requires_domain_release_first() -> AnyResult<()> {
    let mut foo = fresh();
    assert!(matches!(
        foo.release_integration_events(),
        Err(DomainError::ImpossibleToReleaseIntegrationEvents {
            pending_domain_events: 0,
            queued_integration_events: 0,
        })
    ));

    foo.apply(foo_event())?;
    foo.set_version(1u64)?;
    assert!(matches!(
        foo.release_integration_events(),
        Err(DomainError::ImpossibleToReleaseIntegrationEvents {
            pending_domain_events: 1,
            ..
        })
    ));
    Ok(())
}

#[test]
fn created_then_versioned_then_released_twice() -> AnyResult<()> {
    let mut foo = fresh();
    foo.apply(foo_event())?;
    assert!(foo.is_modified());

    foo.set_version(1u64)?;
    let domain = foo.release_domain_events()?;
    assert_eq!(domain.len(), 1);
    assert!(foo.root().domain_events().is_empty());

    let integration = foo.release_integration_events()?;
    assert_eq!(integration.len(), 1);
    assert_eq!(integration[0].event_id(), domain[0].event_id());
    assert_eq!(integration[0].aggregate_version(), Some(Version::from_value(1)));
    assert!(foo.root().integration_events().is_empty());

    // 同一个 Arc：领域事件一侧也能看到写入的版本
    assert_eq!(domain[0].aggregate_version(), Some(Version::from_value(1)));
    Ok(())
}

#[test]
fn integration_events_carry_version_at_release_time() -> AnyResult<()> {
    let mut foo = fresh();
    foo.apply(foo_event())?;
    foo.apply(foo_event())?;
    foo.set_version(3u64)?;
    foo.release_domain_events()?;

    let released = foo.release_integration_events()?;
    assert_eq!(released.len(), 2);
    for event in &released {
        assert_eq!(event.aggregate_version(), Some(Version::from_value(3)));
        assert_eq!(event.aggregate_id(), Some(foo.id()));
    }
    Ok(())
}

#[test]
fn owned_event_is_not_recorded_but_still_applied() -> AnyResult<()> {
    let id = AggregateId::generate();
    let mut foo = Foo::new(id);

    foo.apply(FooEvent {
        header: EventHeader::rehydrated(id),
    })?;

    assert_eq!(foo.var, 2);
    assert!(!foo.is_modified());
    assert!(foo.root().domain_events().is_empty());
    Ok(())
}

#[test]
fn event_owned_by_another_aggregate_keeps_its_owner() -> AnyResult<()> {
    let other = AggregateId::generate();
    let mut foo = fresh();
    let event: Arc<dyn DomainEvent> = Arc::new(FooEvent {
        header: EventHeader::builder().aggregate_id(other).build()?,
    });

    foo.apply_shared(Arc::clone(&event))?;

    assert_eq!(event.aggregate_id(), Some(other));
    assert!(!foo.is_modified());
    Ok(())
}

#[test]
fn shared_event_is_recorded_only_once() -> AnyResult<()> {
    let mut foo = fresh();
    let event: Arc<dyn DomainEvent> = Arc::new(foo_event());

    foo.apply_shared(Arc::clone(&event))?;
    foo.apply_shared(event)?;

    assert_eq!(foo.root().domain_events().len(), 1);
    Ok(())
}

#[test]
fn non_integration_event_blocks_integration_release() -> AnyResult<()> {
    let mut foo = fresh();
    foo.apply(foo_event())?;
    foo.apply(FooBarEvent {
        header: EventHeader::default(),
    })?;
    assert_eq!(foo.var, 20);

    foo.set_version(1u64)?;
    foo.release_domain_events()?;

    let err = foo.release_integration_events().unwrap_err();
    match err {
        DomainError::ImpossibleToReleaseNonIntegrationEvents { event_type } => {
            assert_eq!(event_type, "FooBarEvent");
        }
        other => panic!("unexpected {other:?}"),
    }

    // 检查先于任何修改：队列与版本戳保持原样
    let queued = foo.root().integration_events();
    assert_eq!(queued.len(), 2);
    assert!(queued.iter().all(|e| e.aggregate_version().is_none()));
    Ok(())
}

#[test]
fn second_domain_release_discards_unpublished_batch() -> AnyResult<()> {
    let mut foo = fresh();
    let first = foo_event();
    let first_id = first.event_id();
    foo.apply(first)?;
    foo.set_version(1u64)?;
    foo.release_domain_events()?;

    let second = foo_event();
    let second_id = second.event_id();
    foo.apply(second)?;
    foo.set_version(2u64)?;
    foo.release_domain_events()?;

    let released = foo.release_integration_events()?;
    assert_eq!(released.len(), 1);
    assert_eq!(released[0].event_id(), second_id);
    assert_ne!(released[0].event_id(), first_id);
    assert_eq!(released[0].aggregate_version(), Some(Version::from_value(2)));
    Ok(())
}
