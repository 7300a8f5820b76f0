use ddd_kernel::event::{DomainEvent, EventKind, IntegrationEvent};
use ddd_kernel_macros::domain_event;

#[domain_event]
struct AccountOpened {
    owner: String,
}

fn assert_integration<T: IntegrationEvent>() {}

fn main() {
    assert_integration::<AccountOpened>();
    assert_eq!(AccountOpened::EVENT_TYPE, "AccountOpened");
    assert_eq!(AccountOpened::EVENT_VERSION, 1);

    let event = AccountOpened {
        header: Default::default(),
        owner: "alice".into(),
    };
    let copy = event.clone();
    assert_eq!(copy.owner, "alice");
    assert_eq!(event.event_type(), "AccountOpened");
    assert_eq!(event.event_version(), 1);
    assert!(event.as_integration_event().is_some());
    assert!(event.aggregate_id().is_none());
    println!("{event:?}");
}
