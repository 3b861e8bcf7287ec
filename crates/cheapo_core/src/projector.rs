//! Turns a [`ResultState`] into what the results panel shows.
use crate::pagination::Page;
use crate::search::{total_pages, ProductRecord, QueryError, ResultState};

/// Base the product links are resolved against.
pub const PRODUCT_BASE_URL: &str = "https://homedepot.com/";

/// Size placeholder in image URL templates.
pub const IMAGE_SIZE_PLACEHOLDER: &str = "<SIZE>";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    InvalidQuery,
    ServiceFailure,
    EmptyResult,
    NoDiscountsOnPage,
}

impl Banner {
    pub fn message(self) -> &'static str {
        match self {
            Banner::InvalidQuery => "Please enter a keyword and/or category",
            Banner::ServiceFailure => "The search service is unavailable, please try again",
            Banner::EmptyResult => "Sorry, no results were returned",
            Banner::NoDiscountsOnPage => "No discounts in these results, try the next page",
        }
    }

    pub fn is_error(self) -> bool {
        matches!(self, Banner::InvalidQuery | Banner::ServiceFailure)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductView {
    pub image_url: String,
    pub title: String,
    pub detail_link: String,
    pub price_label: String,
    pub item_label: String,
    pub inventory_label: String,
}

/// Exactly one of: nothing, a banner, or a product list.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Projection {
    #[default]
    Hidden,
    Banner(Banner),
    Items(Vec<ProductView>),
}

impl Projection {
    pub fn banner(&self) -> Option<Banner> {
        match self {
            Projection::Banner(banner) => Some(*banner),
            _ => None,
        }
    }

    pub fn items(&self) -> &[ProductView] {
        match self {
            Projection::Items(items) => items,
            _ => &[],
        }
    }
}

pub fn discounted<'a>(products: impl IntoIterator<Item = &'a ProductRecord>) -> Vec<&'a ProductRecord> {
    products
        .into_iter()
        .filter(|product| product.is_discounted())
        .collect()
}

pub fn page_count(result: &ResultState) -> Option<Page> {
    result
        .payload()
        .map(|payload| total_pages(payload.total_products))
}

pub fn project(result: &ResultState, store_selected: bool) -> Projection {
    match result {
        ResultState::Unset => Projection::Hidden,
        ResultState::Error(QueryError::InvalidQuery) => Projection::Banner(Banner::InvalidQuery),
        ResultState::ServiceFailure => Projection::Banner(Banner::ServiceFailure),
        ResultState::Payload(payload) if payload.total_products == 0 => {
            Projection::Banner(Banner::EmptyResult)
        }
        ResultState::Payload(payload) => {
            let items: Vec<ProductView> = discounted(&payload.products)
                .into_iter()
                .map(|product| product_view(product, store_selected))
                .collect();
            if items.is_empty() {
                Projection::Banner(Banner::NoDiscountsOnPage)
            } else {
                Projection::Items(items)
            }
        }
    }
}

pub fn product_view(product: &ProductRecord, store_selected: bool) -> ProductView {
    let inventory_label = match product.sellable_qty {
        Some(qty) if store_selected && qty > 0 => format!("{qty} in Store"),
        _ if store_selected => "Not in Store".to_string(),
        _ => String::new(),
    };
    ProductView {
        image_url: product
            .image_url_template
            .replace(IMAGE_SIZE_PLACEHOLDER, "100"),
        title: format!(
            "{} - {}",
            product.brand_name.as_deref().unwrap_or_default(),
            product.label
        ),
        detail_link: format!("{PRODUCT_BASE_URL}{}", product.product_url),
        price_label: format!(
            "${:.2} ({}% Off)",
            product.special_price, product.percentage_off
        ),
        item_label: format!("Item ID: {}", product.item_id),
        inventory_label,
    }
}
