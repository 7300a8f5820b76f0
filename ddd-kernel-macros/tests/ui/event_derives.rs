use ddd_kernel::domain_event;
use ddd_kernel::event::{DomainEvent, EventHeader};

// 带路径的 Debug 不会被重复派生；用户自行声明的 header 字段保持原位
#[domain_event(event_type = "stock.counted")]
#[derive(std::fmt::Debug)]
#[allow(dead_code)]
struct StockCounted {
    sku: String,
    header: EventHeader,
}

fn main() {
    let event = StockCounted {
        sku: "apple".into(),
        header: EventHeader::default(),
    };
    let copy = event.clone();
    assert_eq!(copy.event_type(), "stock.counted");
    assert!(format!("{copy:?}").contains("apple"));
}
