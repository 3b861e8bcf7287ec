//! Store discovery around the map center and the store ↔ map reverse path.
use crate::catalog::{Store, StoreCatalog, Viewport, PRESET_STORES, RECENTER_ZOOM};
use crate::search::ServiceFailure;

/// Quiet period after the last pan/zoom frame before the viewport commits.
pub const VIEWPORT_SETTLE_MS: u64 = 300;

/// Lookup the store chain wants issued, stamped with the pass that made it.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LookupDispatch {
    #[default]
    Idle,
    Fetch { ticket: u64, lat: f64, lon: f64 },
}

impl LookupDispatch {
    pub fn for_viewport(ticket: u64, viewport: Option<&Viewport>) -> Self {
        match viewport {
            Some(viewport) => LookupDispatch::Fetch {
                ticket,
                lat: viewport.lat,
                lon: viewport.lon,
            },
            None => LookupDispatch::Idle,
        }
    }

    pub fn ticket(&self) -> Option<u64> {
        match self {
            LookupDispatch::Fetch { ticket, .. } => Some(*ticket),
            LookupDispatch::Idle => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LookupResponse {
    pub ticket: u64,
    pub outcome: Result<Vec<Store>, ServiceFailure>,
}

/// Dropdown entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOption {
    pub id: String,
    pub label: String,
}

/// `"<city>, <state> - <name> - #<id>"`.
pub fn store_label(city: &str, state: &str, name: &str, id: &str) -> String {
    format!("{city}, {state} - {name} - #{id}")
}

/// Store id encoded in a marker label: everything after the last `#`, or the
/// whole label when there is none.
pub fn marker_store_id(label: &str) -> Option<&str> {
    let id = label.rsplit('#').next().unwrap_or(label).trim();
    (!id.is_empty()).then_some(id)
}

/// Stores shown as map markers for the latest lookup.
pub fn markers(response: Option<&LookupResponse>) -> Vec<Store> {
    match response.map(|response| &response.outcome) {
        Some(Ok(stores)) => stores.clone(),
        Some(Err(_)) | None => Vec::new(),
    }
}

/// Dropdown options: discovered stores first, then presets not discovered.
/// Presets alone before any lookup; empty after a failed lookup.
pub fn display_set(response: Option<&LookupResponse>) -> Vec<StoreOption> {
    let discovered: &[Store] = match response.map(|response| &response.outcome) {
        None => &[],
        Some(Err(_)) => return Vec::new(),
        Some(Ok(stores)) => stores,
    };

    let mut options: Vec<StoreOption> = discovered
        .iter()
        .map(|store| StoreOption {
            id: store.id.clone(),
            label: store.label.clone(),
        })
        .collect();
    options.extend(
        PRESET_STORES
            .iter()
            .filter(|preset| !discovered.iter().any(|store| store.id == preset.id))
            .map(|preset| StoreOption {
                id: preset.id.to_string(),
                label: preset.label.to_string(),
            }),
    );
    options
}

/// Viewport to move to when `store_id` is selected.
pub fn recenter(catalog: &StoreCatalog, store_id: Option<&str>) -> Option<Viewport> {
    let store = catalog.get(store_id?)?;
    Some(Viewport::centered_on(store, RECENTER_ZOOM))
}

/// Debounces map movement: intermediate frames are held until the map has
/// been quiet for [`VIEWPORT_SETTLE_MS`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ViewportDebounce {
    pending: Option<(Viewport, u64)>,
}

impl ViewportDebounce {
    pub fn moved(&mut self, viewport: Viewport, at_ms: u64) {
        self.pending = Some((viewport, at_ms));
    }

    /// Returns the settled viewport once the quiet period has elapsed.
    pub fn poll(&mut self, now_ms: u64) -> Option<Viewport> {
        match self.pending {
            Some((viewport, at)) if now_ms.saturating_sub(at) >= VIEWPORT_SETTLE_MS => {
                self.pending = None;
                Some(viewport)
            }
            _ => None,
        }
    }

    pub fn clear(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(id: &str) -> Store {
        Store {
            id: id.to_string(),
            label: store_label("Los Angeles", "CA", "Hyde Park", id),
            lat: 34.0,
            lon: -118.3,
        }
    }

    #[test]
    fn marker_id_is_text_after_last_hash() {
        assert_eq!(
            marker_store_id("Los Angeles, CA - Hyde #2 - #1039"),
            Some("1039")
        );
        assert_eq!(marker_store_id("6175"), Some("6175"));
        assert_eq!(marker_store_id("broken #"), None);
    }

    #[test]
    fn display_set_puts_discovered_first_and_drops_shadowed_presets() {
        let response = LookupResponse {
            ticket: 1,
            outcome: Ok(vec![store("1039"), store("7777")]),
        };

        let options = display_set(Some(&response));

        assert_eq!(options[0].id, "1039");
        assert_eq!(options[1].id, "7777");
        assert_eq!(options.iter().filter(|o| o.id == "1039").count(), 1);
        assert_eq!(options.len(), 2 + PRESET_STORES.len() - 1);
    }

    #[test]
    fn display_set_before_lookup_is_presets_and_after_failure_is_empty() {
        assert_eq!(display_set(None).len(), PRESET_STORES.len());
        let failed = LookupResponse {
            ticket: 3,
            outcome: Err(ServiceFailure("timeout".into())),
        };
        assert!(display_set(Some(&failed)).is_empty());
        assert!(markers(Some(&failed)).is_empty());
    }

    #[test]
    fn debounce_waits_for_quiet_period() {
        let mut debounce = ViewportDebounce::default();
        let frame = Viewport {
            lat: 1.0,
            lon: 2.0,
            zoom: 5.0,
        };
        debounce.moved(frame, 1_000);
        assert_eq!(debounce.poll(1_100), None);
        debounce.moved(frame, 1_200);
        assert_eq!(debounce.poll(1_400), None);
        assert_eq!(debounce.poll(1_500), Some(frame));
        assert!(!debounce.is_pending());
    }

    #[test]
    fn recenter_uses_catalog_coordinates_at_fixed_zoom() {
        let catalog = StoreCatalog::with_presets();
        let viewport = recenter(&catalog, Some("6175")).unwrap();
        assert_eq!(viewport.zoom, RECENTER_ZOOM);
        assert_eq!(viewport.lat, 40.741983);
        assert!(recenter(&catalog, Some("0000")).is_none());
        assert!(recenter(&catalog, None).is_none());
    }
}
