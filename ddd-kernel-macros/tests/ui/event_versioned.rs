use ddd_kernel::domain_event;
use ddd_kernel::event::{DomainEvent, EventHeader, EventKind};

#[domain_event(event_type = "account.renamed", version = 2)]
#[derive(Debug)]
struct AccountRenamed {
    to: String,
}

fn main() {
    assert_eq!(AccountRenamed::EVENT_TYPE, "account.renamed");
    assert_eq!(AccountRenamed::EVENT_VERSION, 2);

    let event = AccountRenamed {
        header: EventHeader::default(),
        to: "bob".into(),
    };
    assert_eq!(event.kind(), "account.renamed");
    assert_eq!(event.event_type(), "account.renamed");
    assert_eq!(event.event_version(), 2);

    // 事件头显式设置的版本优先
    let explicit = AccountRenamed {
        header: EventHeader::builder().event_version(3).build().unwrap(),
        to: "carol".into(),
    };
    assert_eq!(explicit.event_version(), 3);
}
