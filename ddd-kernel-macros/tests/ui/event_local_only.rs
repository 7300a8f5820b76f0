use ddd_kernel::event::{DomainEvent, EventHeader};
use ddd_kernel_macros::domain_event;
use std::sync::Arc;

#[domain_event(integration = false)]
struct CacheWarmed {
    header: EventHeader,
    keys: usize,
}

fn main() {
    let event = CacheWarmed {
        header: EventHeader::default(),
        keys: 3,
    };
    assert!(event.as_integration_event().is_none());

    let shared: Arc<dyn DomainEvent> = Arc::new(event);
    assert!(shared.into_integration_event().is_err());
}
