//! JSON shapes of the store-lookup and product-search services.
//!
//! Both services are loose about scalar types (ids and coordinates show up as
//! numbers or strings), so those fields go through [`Lenient`].

use cheapo_core::{store_label, ProductRecord, SearchPayload, Store};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum Lenient {
    Number(serde_json::Number),
    Text(String),
}

impl Lenient {
    fn into_string(self) -> String {
        match self {
            Lenient::Number(number) => number.to_string(),
            Lenient::Text(text) => text,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            Lenient::Number(number) => number.as_f64(),
            Lenient::Text(text) => text.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StoreLookupBody {
    #[serde(default)]
    stores: Vec<StoreEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoreEntry {
    store_id: Lenient,
    #[serde(default)]
    name: String,
    #[serde(default)]
    address: Address,
    coordinates: Coordinates,
}

#[derive(Debug, Default, Deserialize)]
struct Address {
    #[serde(default)]
    city: String,
    #[serde(default)]
    state: String,
}

#[derive(Debug, Deserialize)]
struct Coordinates {
    lat: Lenient,
    lng: Lenient,
}

impl StoreLookupBody {
    /// Stores with unreadable coordinates are dropped.
    pub fn into_stores(self) -> Vec<Store> {
        self.stores
            .into_iter()
            .filter_map(|entry| {
                let lat = entry.coordinates.lat.as_f64()?;
                let lon = entry.coordinates.lng.as_f64()?;
                let id = entry.store_id.into_string();
                let label = store_label(
                    &entry.address.city,
                    &entry.address.state,
                    &entry.name,
                    &id,
                );
                Some(Store { id, label, lat, lon })
            })
            .collect()
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    search_report: SearchReport,
    #[serde(default)]
    skus: Vec<Sku>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchReport {
    total_products: u64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Sku {
    item_id: Lenient,
    #[serde(default)]
    product_url: String,
    info: SkuInfo,
    #[serde(default)]
    store_sku: StoreSku,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SkuInfo {
    #[serde(default)]
    image_url: String,
    brand_name: Option<String>,
    #[serde(default)]
    product_label: String,
}

#[derive(Debug, Default, Deserialize)]
struct StoreSku {
    pricing: Option<Pricing>,
    inventory: Option<Vec<Inventory>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Pricing {
    special_price: Option<Lenient>,
    percentage_off: Option<Lenient>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Inventory {
    sellable_qty: Option<Lenient>,
}

impl SearchBody {
    pub fn into_payload(self) -> SearchPayload {
        SearchPayload {
            total_products: self.search_report.total_products,
            products: self.skus.into_iter().map(Sku::into_record).collect(),
        }
    }
}

impl Sku {
    fn into_record(self) -> ProductRecord {
        let (special_price, percentage_off) = match &self.store_sku.pricing {
            Some(pricing) => (
                pricing
                    .special_price
                    .as_ref()
                    .and_then(Lenient::as_f64)
                    .unwrap_or(0.0),
                pricing
                    .percentage_off
                    .as_ref()
                    .and_then(Lenient::as_f64)
                    .filter(|off| off.is_finite() && *off > 0.0)
                    .unwrap_or(0.0),
            ),
            None => (0.0, 0.0),
        };
        let sellable_qty = self
            .store_sku
            .inventory
            .as_deref()
            .and_then(<[Inventory]>::first)
            .and_then(|entry| entry.sellable_qty.as_ref())
            .and_then(Lenient::as_f64)
            .map(|qty| qty.max(0.0) as u32);

        ProductRecord {
            item_id: self.item_id.into_string(),
            product_url: self.product_url,
            image_url_template: self.info.image_url,
            brand_name: self.info.brand_name,
            label: self.info.product_label,
            special_price,
            percentage_off,
            sellable_qty,
        }
    }
}
