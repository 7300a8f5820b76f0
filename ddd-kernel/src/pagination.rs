//! 分页（Pagination）
//!
//! `PageInfo` 根据总数、页码与每页数量计算总页数与前后页标记；
//! `Page<T>` 将一页数据与分页信息打包返回给调用方。
//!
use crate::error::{DomainError, DomainResult};
use crate::value_object::ValueObject;
use serde::{Deserialize, Serialize};

/// 分页信息
///
/// 页码不会被限制在总页数之内：总数为 0 时第 1 页依然合法。
///
/// ```
/// use ddd_kernel::pagination::PageInfo;
///
/// let info = PageInfo::new(21, 2, 10).unwrap();
/// assert_eq!(info.total_pages(), 3);
/// assert!(info.has_next_page());
/// assert!(info.has_previous_page());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    total_items: i64,
    page: i64,
    per_page: i64,
    total_pages: i64,
    has_next_page: bool,
    has_previous_page: bool,
}

impl PageInfo {
    pub fn new(total_items: i64, page: i64, per_page: i64) -> DomainResult<Self> {
        let total_pages = if per_page > 0 && total_items >= 0 {
            total_items / per_page + i64::from(total_items % per_page != 0)
        } else {
            0
        };

        let info = Self {
            total_items,
            page,
            per_page,
            total_pages,
            has_next_page: page < total_pages,
            has_previous_page: page > 1,
        };
        info.validate()?;
        Ok(info)
    }

    pub fn total_items(&self) -> i64 {
        self.total_items
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn per_page(&self) -> i64 {
        self.per_page
    }

    pub fn total_pages(&self) -> i64 {
        self.total_pages
    }

    pub fn has_next_page(&self) -> bool {
        self.has_next_page
    }

    pub fn has_previous_page(&self) -> bool {
        self.has_previous_page
    }

    /// 当前页第一条记录的偏移量
    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.per_page)
    }
}

impl ValueObject for PageInfo {
    type Error = DomainError;

    fn validate(&self) -> Result<(), Self::Error> {
        if self.total_items < 0 {
            return Err(DomainError::OutOfRange {
                reason: format!("total_items must be >= 0, got {}", self.total_items),
            });
        }
        if self.page < 1 {
            return Err(DomainError::OutOfRange {
                reason: format!("page must be >= 1, got {}", self.page),
            });
        }
        if self.per_page < 1 {
            return Err(DomainError::OutOfRange {
                reason: format!("per_page must be >= 1, got {}", self.per_page),
            });
        }
        Ok(())
    }
}

/// 一页数据
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    items: Vec<T>,
    page_info: PageInfo,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, page_info: PageInfo) -> Self {
        Self { items, page_info }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn page_info(&self) -> &PageInfo {
        &self.page_info
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    /// 转换每一项，分页信息保持不变
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page_info: self.page_info,
        }
    }
}
