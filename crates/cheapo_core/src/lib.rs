//! Cheapo core: the pure derived-state graph behind the discount search screen.
mod catalog;
mod cells;
mod effect;
mod graph;
mod locator;
mod msg;
mod pagination;
mod projector;
mod search;
mod state;
mod update;
mod view_model;

pub use catalog::{
    category, Category, PresetStore, Store, StoreCatalog, Viewport, CATEGORIES, DEFAULT_VIEWPORT,
    PRESET_STORES, RECENTER_ZOOM,
};
pub use effect::Effect;
pub use graph::{Cell, CellId, CellValue, Graph, GraphError, Later, Pass, PassContext, Writes};
pub use locator::{
    display_set, marker_store_id, markers, recenter, store_label, LookupDispatch, LookupResponse,
    StoreOption, ViewportDebounce, VIEWPORT_SETTLE_MS,
};
pub use msg::Msg;
pub use pagination::{next_page, ClickStamp, Clicks, Page, PageAction, PaginationState, FIRST_PAGE};
pub use projector::{
    discounted, page_count, product_view, project, Banner, ProductView, Projection,
    IMAGE_SIZE_PLACEHOLDER, PRODUCT_BASE_URL,
};
pub use search::{
    normalize_text, start_index, total_pages, ProductRecord, QueryError, ResultState,
    SearchDispatch, SearchPayload, SearchQuery, SearchResponse, ServiceFailure, PAGE_SIZE,
};
pub use state::AppState;
pub use update::update;
pub use view_model::AppViewModel;
