//! Search queries, raw payloads and the fetcher's dispatch/result states.
use thiserror::Error;

use crate::pagination::Page;

/// Products per search page.
pub const PAGE_SIZE: u32 = 48;

/// Offset of the first product on `page`.
pub fn start_index(page: Page) -> u64 {
    u64::from(page.get() - 1) * u64::from(PAGE_SIZE)
}

/// `max(1, ceil(total_products / PAGE_SIZE))`.
pub fn total_pages(total_products: u64) -> Page {
    let pages = total_products.div_ceil(u64::from(PAGE_SIZE)).max(1);
    Page::new(u32::try_from(pages).unwrap_or(u32::MAX)).unwrap_or(Page::MIN)
}

/// Trims text input; blank text is treated as absent.
pub fn normalize_text(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim)
        .filter(|text| !text.is_empty())
        .map(ToOwned::to_owned)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub store_id: Option<String>,
    pub category_id: Option<String>,
    pub keyword: Option<String>,
    pub page: Page,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum QueryError {
    #[error("please enter a keyword and/or category")]
    InvalidQuery,
}

impl SearchQuery {
    pub fn new(
        store_id: Option<&str>,
        category_id: Option<&str>,
        keyword: Option<&str>,
        page: Page,
    ) -> Result<Self, QueryError> {
        let query = Self {
            store_id: normalize_text(store_id),
            category_id: normalize_text(category_id),
            keyword: normalize_text(keyword),
            page,
        };
        if query.category_id.is_none() && query.keyword.is_none() {
            return Err(QueryError::InvalidQuery);
        }
        Ok(query)
    }

    pub fn start_index(&self) -> u64 {
        start_index(self.page)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductRecord {
    pub item_id: String,
    pub product_url: String,
    pub image_url_template: String,
    pub brand_name: Option<String>,
    pub label: String,
    pub special_price: f64,
    /// As sent by the service; 0 when the record carries no pricing.
    pub percentage_off: f64,
    pub sellable_qty: Option<u32>,
}

impl ProductRecord {
    pub fn is_discounted(&self) -> bool {
        self.percentage_off > 0.0
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPayload {
    pub total_products: u64,
    pub products: Vec<ProductRecord>,
}

/// An external call errored or timed out.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("service failure: {0}")]
pub struct ServiceFailure(pub String);

/// Request the search chain wants issued, stamped with the pass that made it.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SearchDispatch {
    #[default]
    Idle,
    Invalid,
    Fetch {
        ticket: u64,
        query: SearchQuery,
        /// Issued by a submit rather than next/back.
        fresh: bool,
    },
}

impl SearchDispatch {
    pub fn ticket(&self) -> Option<u64> {
        match self {
            SearchDispatch::Fetch { ticket, .. } => Some(*ticket),
            SearchDispatch::Idle | SearchDispatch::Invalid => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub ticket: u64,
    pub outcome: Result<SearchPayload, ServiceFailure>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResultState {
    #[default]
    Unset,
    Error(QueryError),
    ServiceFailure,
    Payload(SearchPayload),
}

impl ResultState {
    pub fn payload(&self) -> Option<&SearchPayload> {
        match self {
            ResultState::Payload(payload) => Some(payload),
            _ => None,
        }
    }
}
