use crate::locator::marker_store_id;
use crate::pagination::ClickStamp;
use crate::search::normalize_text;
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
///
/// Every UI message writes exactly one root cell; engine answers are applied
/// only while their ticket is still the current one.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let cells = state.cells();
    let effects = match msg {
        Msg::KeywordChanged(text) => state.write(cells.keyword, normalize_text(Some(text.as_str()))),
        Msg::CategorySelected(id) => state.write(cells.category, normalize_text(id.as_deref())),
        Msg::StoreSelected(id) => state.write(cells.store_id, normalize_text(id.as_deref())),
        Msg::MarkerClicked(label) => {
            let id = marker_store_id(&label).map(ToOwned::to_owned);
            if id.is_none() {
                return (state, Vec::new());
            }
            state.write(cells.store_id, id)
        }
        Msg::ViewportMoved { viewport, at_ms } => {
            state.viewport_moved(viewport, at_ms);
            Vec::new()
        }
        Msg::ViewportSettled(viewport) => state.commit_viewport(viewport),
        Msg::SubmitClicked { at_ms } => state.write(cells.submit, ClickStamp::At(at_ms)),
        Msg::NextClicked { at_ms } => state.write(cells.next, ClickStamp::At(at_ms)),
        Msg::BackClicked { at_ms } => state.write(cells.back, ClickStamp::At(at_ms)),
        Msg::StoresLoaded { ticket, outcome } => state.apply_lookup(ticket, outcome),
        Msg::SearchLoaded { ticket, outcome } => state.apply_search(ticket, outcome),
        Msg::Tick { now_ms } => state.tick(now_ms),
    };

    (state, effects)
}
