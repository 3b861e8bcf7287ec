//! The statically declared cell graph of the search screen.
use crate::catalog::{Store, StoreCatalog, Viewport, DEFAULT_VIEWPORT};
use crate::graph::{Cell, Graph, GraphError, Later};
use crate::locator::{self, LookupDispatch, LookupResponse, StoreOption};
use crate::pagination::{next_page, ClickStamp, Clicks, Page, PageAction, PaginationState};
use crate::projector::{self, Projection};
use crate::search::{QueryError, ResultState, SearchDispatch, SearchQuery, SearchResponse};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct Cells {
    // Roots, written by `update`.
    pub keyword: Cell<Option<String>>,
    pub category: Cell<Option<String>>,
    pub store_id: Cell<Option<String>>,
    /// Last committed viewport; `None` until the user moves the map.
    pub viewport: Cell<Option<Viewport>>,
    pub submit: Cell<ClickStamp>,
    pub next: Cell<ClickStamp>,
    pub back: Cell<ClickStamp>,
    pub catalog: Cell<StoreCatalog>,
    pub lookup_response: Cell<Option<LookupResponse>>,
    pub search_response: Cell<Option<SearchResponse>>,

    // Store chain.
    pub map_view: Cell<Viewport>,
    pub lookup: Cell<LookupDispatch>,
    pub markers: Cell<Vec<Store>>,
    pub store_options: Cell<Vec<StoreOption>>,
    pub recenter: Cell<Option<Viewport>>,

    // Search chain.
    pub current_page: Cell<Option<Page>>,
    pub search: Cell<SearchDispatch>,
    pub result: Cell<ResultState>,
    pub total_pages: Cell<Option<Page>>,
    pub projection: Cell<Projection>,
    pub pagination: Cell<PaginationState>,

    // Visibility.
    pub results_visible: Cell<bool>,
    pub error_visible: Cell<bool>,
    pub total_pages_display: Cell<Option<Page>>,
}

pub(crate) fn wire() -> Result<(Graph, Cells), GraphError> {
    let mut graph = Graph::new();

    let keyword = graph.root("keyword", None::<String>);
    let category = graph.root("category", None::<String>);
    let store_id = graph.root("store_id", None::<String>);
    let viewport = graph.root("viewport", None::<Viewport>);
    let submit = graph.root("submit_clicked", ClickStamp::Never);
    let next = graph.root("next_clicked", ClickStamp::Never);
    let back = graph.root("back_clicked", ClickStamp::Never);
    let catalog = graph.root("store_catalog", StoreCatalog::with_presets());
    let lookup_response = graph.root("lookup_response", None::<LookupResponse>);
    let search_response = graph.root("search_response", None::<SearchResponse>);

    let map_view = graph.define("map_view", &[viewport.id()], move |ctx| {
        (*ctx.get(viewport)).unwrap_or(DEFAULT_VIEWPORT)
    })?;
    let lookup = graph.define("store_lookup", &[viewport.id()], move |ctx| {
        LookupDispatch::for_viewport(ctx.pass_id(), ctx.get(viewport).as_ref())
    })?;
    let markers = graph.define("store_markers", &[lookup_response.id()], move |ctx| {
        locator::markers(ctx.get(lookup_response).as_ref())
    })?;
    let store_options = graph.define("store_options", &[lookup_response.id()], move |ctx| {
        locator::display_set(ctx.get(lookup_response).as_ref())
    })?;
    let recenter = graph.define("recenter", &[store_id.id()], move |ctx| {
        locator::recenter(ctx.get(catalog), ctx.get(store_id).as_deref())
    })?;

    let pagination_later: Later<PaginationState> = Later::new();
    let position = pagination_later.clone();
    let current_page = graph.define(
        "current_page",
        &[submit.id(), next.id(), back.id()],
        move |ctx| {
            let clicks = Clicks {
                submit: *ctx.get(submit),
                next: *ctx.get(next),
                back: *ctx.get(back),
            };
            let state = ctx.get_later(&position).copied().unwrap_or_default();
            next_page(&clicks, state.current_page, state.total_pages)
        },
    )?;
    let search = graph.define("search_dispatch", &[current_page.id()], move |ctx| {
        let Some(page) = *ctx.get(current_page) else {
            return SearchDispatch::Idle;
        };
        let query = SearchQuery::new(
            ctx.get(store_id).as_deref(),
            ctx.get(category).as_deref(),
            ctx.get(keyword).as_deref(),
            page,
        );
        match query {
            Err(QueryError::InvalidQuery) => SearchDispatch::Invalid,
            Ok(query) => {
                let clicks = Clicks {
                    submit: *ctx.get(submit),
                    next: *ctx.get(next),
                    back: *ctx.get(back),
                };
                SearchDispatch::Fetch {
                    ticket: ctx.pass_id(),
                    query,
                    fresh: clicks.action() == PageAction::Fresh,
                }
            }
        }
    })?;
    let result = graph.define(
        "search_result",
        &[search.id(), search_response.id()],
        move |ctx| match ctx.get(search) {
            SearchDispatch::Idle => ResultState::Unset,
            SearchDispatch::Invalid => ResultState::Error(QueryError::InvalidQuery),
            SearchDispatch::Fetch { ticket, fresh, .. } => match ctx.get(search_response) {
                Some(response) if response.ticket == *ticket => match &response.outcome {
                    Ok(payload) => ResultState::Payload(payload.clone()),
                    Err(_) => ResultState::ServiceFailure,
                },
                // Waiting: a submit starts over, paging keeps the old page up.
                _ if *fresh => ResultState::Unset,
                _ => ctx.prior::<ResultState>().cloned().unwrap_or_default(),
            },
        },
    )?;
    let total_pages = graph.define("total_pages", &[result.id()], move |ctx| {
        projector::page_count(ctx.get(result))
    })?;
    let projection = graph.define("projection", &[result.id()], move |ctx| {
        projector::project(ctx.get(result), ctx.get(store_id).is_some())
    })?;
    let pagination = graph.define(
        "pagination",
        &[current_page.id(), total_pages.id()],
        move |ctx| PaginationState::new(*ctx.get(current_page), *ctx.get(total_pages)),
    )?;
    pagination_later.bind(pagination)?;

    let results_visible = graph.define("results_visible", &[result.id()], move |ctx| {
        ctx.get(result).payload().is_some()
    })?;
    let error_visible = graph.define("error_visible", &[result.id()], move |ctx| {
        matches!(
            ctx.get(result),
            ResultState::Error(_) | ResultState::ServiceFailure
        )
    })?;
    let total_pages_display = graph.define(
        "total_pages_display",
        &[result.id(), total_pages.id()],
        move |ctx| match ctx.get(result) {
            ResultState::Payload(_) => *ctx.get(total_pages),
            _ => None,
        },
    )?;

    let cells = Cells {
        keyword,
        category,
        store_id,
        viewport,
        submit,
        next,
        back,
        catalog,
        lookup_response,
        search_response,
        map_view,
        lookup,
        markers,
        store_options,
        recenter,
        current_page,
        search,
        result,
        total_pages,
        projection,
        pagination,
        results_visible,
        error_visible,
        total_pages_display,
    };
    Ok((graph, cells))
}
