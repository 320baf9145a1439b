use serde::Deserialize;
use todo_api::v1::DEFAULT_PAGE_SIZE;

/// A clamped page request. Pages are one-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pagination {
    page: i64,
    page_size: i64,
}

impl Pagination {
    pub fn new(page: i64, page_size: i64) -> Self {
        Self {
            page: page.max(1),
            page_size: if page_size < 1 {
                DEFAULT_PAGE_SIZE
            } else {
                page_size
            },
        }
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// Query string of the list endpoint, `?page=2&pageSize=5`.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<i64>,
    #[serde(rename = "pageSize", alias = "page_size")]
    pub page_size: Option<i64>,
}

impl From<PageQuery> for Pagination {
    fn from(query: PageQuery) -> Self {
        Self::new(
            query.page.unwrap_or(1),
            query.page_size.unwrap_or(DEFAULT_PAGE_SIZE),
        )
    }
}
