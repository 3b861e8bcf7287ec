use crate::search::SearchQuery;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Find stores near a point; answer with `Msg::StoresLoaded { ticket, .. }`.
    LookupStores { ticket: u64, lat: f64, lon: f64 },
    /// Fetch one page of results; answer with `Msg::SearchLoaded { ticket, .. }`.
    SearchProducts { ticket: u64, query: SearchQuery },
    /// The search chain no longer wants the in-flight page.
    CancelSearch,
}
