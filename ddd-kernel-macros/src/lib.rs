//! ddd-kernel 的过程宏
//!
//! - `#[domain_event]`：为事件结构体补齐 `header` 字段并生成
//!   `EventKind` / `DomainEvent`（以及默认的 `IntegrationEvent`）实现。
//!
use proc_macro::TokenStream;

mod domain_event;
mod utils;

/// 领域事件宏
///
/// ```ignore
/// use ddd_kernel::domain_event;
///
/// #[domain_event]
/// struct OrderPlaced {
///     amount: i64,
/// }
///
/// // 同名事件的新版本：放在其他模块中，版本号 > 1
/// mod v2 {
///     #[ddd_kernel::domain_event(event_type = "OrderPlaced", version = 2)]
///     pub struct OrderPlaced {
///         pub amount: i64,
///         pub currency: String,
///     }
/// }
///
/// // 仅用于聚合内部、不可对外发布的事件
/// #[domain_event(integration = false)]
/// struct DraftTouched {}
/// ```
#[proc_macro_attribute]
pub fn domain_event(attr: TokenStream, item: TokenStream) -> TokenStream {
    domain_event::expand(attr, item)
}
