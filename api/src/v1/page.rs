use serde::{Deserialize, Serialize};

pub const DEFAULT_PAGE_SIZE: i64 = 15;

/// One page of an ordered query together with its position in the whole
/// result set.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub total: i64,
    #[serde(rename = "pageSize")]
    pub page_size: i64,
    pub current_page: i64,
    pub items: Vec<T>,
    pub from: i64,
    pub to: i64,
    pub total_page: i64,
    pub last_page: i64,
}

impl<T> PagedResult<T> {
    /// Builds the envelope for `items`, the rows found at page `current_page`.
    ///
    /// `page_size` must already be clamped to at least one. When the page lies
    /// past the end, `items` is empty and `to` ends up below `from`.
    pub fn new(items: Vec<T>, total: i64, current_page: i64, page_size: i64) -> Self {
        let from = if total == 0 {
            0
        } else {
            (current_page - 1).saturating_mul(page_size).saturating_add(1)
        };
        let to = from.saturating_add(items.len() as i64) - 1;
        let total_page = total / page_size + i64::from(total % page_size != 0);

        Self {
            total,
            page_size,
            current_page,
            items,
            from,
            to,
            total_page,
            last_page: total_page,
        }
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PagedResult<U> {
        PagedResult {
            total: self.total,
            page_size: self.page_size,
            current_page: self.current_page,
            items: self.items.into_iter().map(f).collect(),
            from: self.from,
            to: self.to,
            total_page: self.total_page,
            last_page: self.last_page,
        }
    }
}
