use crate::catalog::{Store, Viewport};
use crate::search::{SearchPayload, ServiceFailure};

#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    /// User edited the keyword box.
    KeywordChanged(String),
    /// User picked a category (or cleared it).
    CategorySelected(Option<String>),
    /// User picked a store from the dropdown (or cleared it).
    StoreSelected(Option<String>),
    /// User clicked a map marker; carries the marker label.
    MarkerClicked(String),
    /// Intermediate pan/zoom frame; committed once the map is quiet.
    ViewportMoved { viewport: Viewport, at_ms: u64 },
    /// Pan/zoom finished; commits immediately.
    ViewportSettled(Viewport),
    SubmitClicked { at_ms: u64 },
    NextClicked { at_ms: u64 },
    BackClicked { at_ms: u64 },
    /// Engine answer to `Effect::LookupStores`.
    StoresLoaded {
        ticket: u64,
        outcome: Result<Vec<Store>, ServiceFailure>,
    },
    /// Engine answer to `Effect::SearchProducts`.
    SearchLoaded {
        ticket: u64,
        outcome: Result<SearchPayload, ServiceFailure>,
    },
    /// Periodic clock, drives the viewport debounce.
    Tick { now_ms: u64 },
}
