//! Static catalogs (categories, preset stores) and the runtime store registry.
use std::collections::BTreeMap;

/// Default map center: a continental view.
pub const DEFAULT_VIEWPORT: Viewport = Viewport {
    lat: 38.135_913_663_975_97,
    lon: -96.726_471_297_063_26,
    zoom: 3.0,
};

/// Zoom used when the map recenters onto a selected store.
pub const RECENTER_ZOOM: f64 = 9.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub lat: f64,
    pub lon: f64,
    pub zoom: f64,
}

impl Viewport {
    pub fn centered_on(store: &Store, zoom: f64) -> Self {
        Self {
            lat: store.lat,
            lon: store.lon,
            zoom,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Store {
    pub id: String,
    pub label: String,
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub label: &'static str,
    pub id: &'static str,
}

pub const CATEGORIES: &[Category] = &[
    Category { label: "Appliances", id: "553460" },
    Category { label: "Bath & Faucets", id: "558975" },
    Category { label: "Blinds & Decor", id: "501728" },
    Category { label: "Building Materials", id: "501112" },
    Category { label: "Cleaning", id: "547938" },
    Category { label: "Decor", id: "503089" },
    Category { label: "Doors & Windows", id: "500921" },
    Category { label: "Electrical", id: "501997" },
    Category { label: "Flooring & Area Rugs", id: "500535" },
    Category { label: "Furniture", id: "569856" },
    Category { label: "Hardware", id: "562522" },
    Category { label: "Heating & Cooling", id: "565784" },
    Category { label: "Holiday", id: "530294" },
    Category { label: "Kitchen", id: "501714" },
    Category { label: "Lighting & Ceiling Fans", id: "554225" },
    Category { label: "Lumber & Composites", id: "547828" },
    Category { label: "Outdoors", id: "556274" },
    Category { label: "Paint", id: "501637" },
    Category { label: "Plumbing", id: "547448" },
    Category { label: "Smart Home", id: "561884" },
    Category { label: "Storage & Organization", id: "503114" },
];

pub fn category(id: &str) -> Option<&'static Category> {
    CATEGORIES.iter().find(|category| category.id == id)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PresetStore {
    pub label: &'static str,
    pub id: &'static str,
    pub lat: f64,
    pub lon: f64,
}

impl PresetStore {
    pub fn to_store(&self) -> Store {
        Store {
            id: self.id.to_string(),
            label: self.label.to_string(),
            lat: self.lat,
            lon: self.lon,
        }
    }
}

pub const PRESET_STORES: &[PresetStore] = &[
    PresetStore {
        label: "New York, NY - Manhattan West 23rd St - #6175",
        id: "6175",
        lat: 40.741983,
        lon: -73.990877,
    },
    PresetStore {
        label: "Los Angeles, CA - Hyde Park - #1039",
        id: "1039",
        lat: 33.987317,
        lon: -118.312092,
    },
    PresetStore {
        label: "Chicago, IL - South Loop - #1950",
        id: "1950",
        lat: 41.865722,
        lon: -87.641322,
    },
    PresetStore {
        label: "Houston, TX - Brinkman - #0577",
        id: "0577",
        lat: 29.81123,
        lon: -95.417796,
    },
    PresetStore {
        label: "Phoenix, AZ - Thomas Rd - #0477",
        id: "0477",
        lat: 33.478746,
        lon: -112.0033,
    },
    PresetStore {
        label: "Philadelphia, PA - S Philadelphia - #4101",
        id: "4101",
        lat: 39.92591,
        lon: -75.143004,
    },
    PresetStore {
        label: "Jacksonville, FL - Jacksonville (lane Ave) - #6346",
        id: "6346",
        lat: 30.310197,
        lon: -81.749904,
    },
    PresetStore {
        label: "Columbus, OH - West Broad - #3819",
        id: "3819",
        lat: 39.949139,
        lon: -83.121624,
    },
];

/// Store id → store. Discovered entries shadow presets with the same id.
///
/// Lives in a root cell of the graph; the locator is its only writer.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreCatalog {
    presets: BTreeMap<String, Store>,
    discovered: BTreeMap<String, Store>,
}

impl StoreCatalog {
    pub fn with_presets() -> Self {
        Self {
            presets: PRESET_STORES
                .iter()
                .map(|preset| (preset.id.to_string(), preset.to_store()))
                .collect(),
            discovered: BTreeMap::new(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Store> {
        self.discovered.get(id).or_else(|| self.presets.get(id))
    }

    pub fn is_discovered(&self, id: &str) -> bool {
        self.discovered.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.presets
            .keys()
            .filter(|id| !self.discovered.contains_key(*id))
            .count()
            + self.discovered.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Inserts or overwrites discovered stores. Returns the new catalog.
    pub fn with_discovered<'a>(&self, stores: impl IntoIterator<Item = &'a Store>) -> Self {
        let mut next = self.clone();
        for store in stores {
            next.discovered.insert(store.id.clone(), store.clone());
        }
        next
    }
}

impl Default for StoreCatalog {
    fn default() -> Self {
        Self::with_presets()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn discovered_1039() -> Store {
        Store {
            id: "1039".into(),
            label: "Los Angeles, CA - Slauson - #1039".into(),
            lat: 34.0,
            lon: -118.0,
        }
    }

    #[test]
    fn presets_are_seeded() {
        let catalog = StoreCatalog::with_presets();
        assert_eq!(catalog.len(), PRESET_STORES.len());
        assert_eq!(catalog.get("6175").unwrap().lat, 40.741983);
        assert!(catalog.get("9999").is_none());
    }

    #[test]
    fn discovered_entry_shadows_preset() {
        let catalog = StoreCatalog::with_presets().with_discovered([&discovered_1039()]);

        let store = catalog.get("1039").unwrap();
        assert_eq!((store.lat, store.lon), (34.0, -118.0));
        assert!(catalog.is_discovered("1039"));
        assert_eq!(catalog.len(), PRESET_STORES.len());
    }

    #[test]
    fn category_lookup_by_id() {
        assert_eq!(category("501997").map(|c| c.label), Some("Electrical"));
        assert!(category("nope").is_none());
    }
}
