use engine_logging::{engine_debug, engine_error, engine_warn};

use crate::catalog::{Store, StoreCatalog, Viewport};
use crate::cells::{self, Cells};
use crate::effect::Effect;
use crate::graph::{CellValue, Graph, Pass, Writes};
use crate::locator::{LookupDispatch, LookupResponse, ViewportDebounce};
use crate::pagination::PaginationState;
use crate::projector::Projection;
use crate::search::{ResultState, SearchDispatch, SearchPayload, SearchResponse, ServiceFailure};
use crate::view_model::AppViewModel;

#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    graph: Graph,
    cells: Cells,
    debounce: ViewportDebounce,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    /// # Panics
    /// Only if the static cell wiring references an undeclared cell.
    pub fn new() -> Self {
        let (graph, cells) = cells::wire().expect("static cell wiring is well-formed");
        Self {
            graph,
            cells,
            debounce: ViewportDebounce::default(),
            dirty: false,
        }
    }

    pub fn view(&self) -> AppViewModel {
        let graph = &self.graph;
        let cells = &self.cells;
        let pagination = graph.get(cells.pagination);
        AppViewModel {
            keyword: graph.get(cells.keyword).clone(),
            category_id: graph.get(cells.category).clone(),
            store_id: graph.get(cells.store_id).clone(),
            store_options: graph.get(cells.store_options).clone(),
            markers: graph.get(cells.markers).clone(),
            viewport: *graph.get(cells.map_view),
            viewport_pending: self.debounce.is_pending(),
            current_page: pagination.current_page,
            total_pages: *graph.get(cells.total_pages_display),
            results_visible: *graph.get(cells.results_visible),
            error_visible: *graph.get(cells.error_visible),
            projection: graph.get(cells.projection).clone(),
            searching: self.search_in_flight(),
        }
    }

    /// Returns whether a render is due and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn catalog(&self) -> &StoreCatalog {
        self.graph.get(self.cells.catalog)
    }

    pub fn result(&self) -> &ResultState {
        self.graph.get(self.cells.result)
    }

    pub fn pagination(&self) -> PaginationState {
        *self.graph.get(self.cells.pagination)
    }

    pub fn projection(&self) -> &Projection {
        self.graph.get(self.cells.projection)
    }

    pub fn search_dispatch(&self) -> &SearchDispatch {
        self.graph.get(self.cells.search)
    }

    pub fn lookup_dispatch(&self) -> LookupDispatch {
        *self.graph.get(self.cells.lookup)
    }

    /// Id of the last graph pass.
    pub fn last_pass(&self) -> u64 {
        self.graph.last_pass()
    }

    fn search_in_flight(&self) -> bool {
        let Some(ticket) = self.search_dispatch().ticket() else {
            return false;
        };
        self.graph
            .get(self.cells.search_response)
            .as_ref()
            .is_none_or(|response| response.ticket != ticket)
    }

    pub(crate) fn cells(&self) -> Cells {
        self.cells
    }

    /// Writes one root cell and collects the effects of the pass.
    pub(crate) fn write<T: CellValue>(
        &mut self,
        cell: crate::graph::Cell<T>,
        value: T,
    ) -> Vec<Effect> {
        self.apply(Writes::new().set(cell, value))
    }

    fn apply(&mut self, writes: Writes) -> Vec<Effect> {
        let pass = match self.graph.update_many(writes) {
            Ok(pass) => pass,
            Err(err) => {
                engine_error!("root write rejected: {err}");
                return Vec::new();
            }
        };
        if pass.is_noop() {
            return Vec::new();
        }
        self.dirty = true;
        self.effects_for(&pass)
    }

    fn effects_for(&mut self, pass: &Pass) -> Vec<Effect> {
        let mut effects = Vec::new();

        if pass.has_changed(self.cells.lookup) {
            if let LookupDispatch::Fetch { ticket, lat, lon } = self.lookup_dispatch() {
                effects.push(Effect::LookupStores { ticket, lat, lon });
            }
        }

        if pass.has_changed(self.cells.search) {
            match self.search_dispatch() {
                SearchDispatch::Fetch { ticket, query, .. } => {
                    effects.push(Effect::SearchProducts {
                        ticket: *ticket,
                        query: query.clone(),
                    });
                }
                SearchDispatch::Idle | SearchDispatch::Invalid => {
                    effects.push(Effect::CancelSearch);
                }
            }
        }

        // Selecting a store moves the map, which may start a lookup.
        let target = *self.graph.get(self.cells.recenter);
        if let (true, Some(target)) = (pass.was_recomputed(self.cells.recenter), target) {
            effects.extend(self.commit_viewport(target));
        }

        effects
    }

    /// Commits a settled viewport. Moving onto the current viewport is a no-op.
    pub(crate) fn commit_viewport(&mut self, viewport: Viewport) -> Vec<Effect> {
        self.debounce.clear();
        self.write(self.cells.viewport, Some(viewport))
    }

    pub(crate) fn viewport_moved(&mut self, viewport: Viewport, at_ms: u64) {
        self.debounce.moved(viewport, at_ms);
    }

    pub(crate) fn tick(&mut self, now_ms: u64) -> Vec<Effect> {
        match self.debounce.poll(now_ms) {
            Some(viewport) => self.commit_viewport(viewport),
            None => Vec::new(),
        }
    }

    pub(crate) fn apply_lookup(
        &mut self,
        ticket: u64,
        outcome: Result<Vec<Store>, ServiceFailure>,
    ) -> Vec<Effect> {
        if self.lookup_dispatch().ticket() != Some(ticket) {
            engine_debug!("discarding stale store lookup (ticket {ticket})");
            return Vec::new();
        }

        let response = Some(LookupResponse {
            ticket,
            outcome: outcome.clone(),
        });
        let writes = match outcome {
            Ok(stores) => {
                let catalog = self.catalog().with_discovered(&stores);
                Writes::new()
                    .set(self.cells.catalog, catalog)
                    .set(self.cells.lookup_response, response)
            }
            Err(failure) => {
                engine_warn!("store lookup failed: {failure}");
                Writes::new().set(self.cells.lookup_response, response)
            }
        };
        self.apply(writes)
    }

    pub(crate) fn apply_search(
        &mut self,
        ticket: u64,
        outcome: Result<SearchPayload, ServiceFailure>,
    ) -> Vec<Effect> {
        if self.search_dispatch().ticket() != Some(ticket) {
            engine_debug!("discarding stale search page (ticket {ticket})");
            return Vec::new();
        }
        if let Err(failure) = &outcome {
            engine_warn!("search failed: {failure}");
        }
        self.write(
            self.cells.search_response,
            Some(SearchResponse { ticket, outcome }),
        )
    }
}
