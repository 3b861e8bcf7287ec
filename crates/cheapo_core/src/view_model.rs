use crate::catalog::{Store, Viewport};
use crate::locator::StoreOption;
use crate::pagination::Page;
use crate::projector::Projection;

/// Everything the rendering layer needs for one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct AppViewModel {
    pub keyword: Option<String>,
    pub category_id: Option<String>,
    pub store_id: Option<String>,
    pub store_options: Vec<StoreOption>,
    pub markers: Vec<Store>,
    pub viewport: Viewport,
    /// The map is moving and has not settled yet.
    pub viewport_pending: bool,
    pub current_page: Option<Page>,
    /// Shown only while a payload is present.
    pub total_pages: Option<Page>,
    pub results_visible: bool,
    pub error_visible: bool,
    pub projection: Projection,
    pub searching: bool,
}
