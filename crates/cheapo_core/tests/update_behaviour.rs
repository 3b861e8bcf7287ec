use std::sync::Once;

use cheapo_core::{
    update, AppState, Banner, Effect, Msg, Page, ProductRecord, Projection, QueryError,
    ResultState, SearchPayload, ServiceFailure, Store, Viewport, PRESET_STORES, RECENTER_ZOOM,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(engine_logging::initialize_for_tests);
}

fn product(item_id: &str, percentage_off: f64) -> ProductRecord {
    ProductRecord {
        item_id: item_id.to_string(),
        product_url: format!("p/{item_id}"),
        image_url_template: "img_<SIZE>.jpg".to_string(),
        brand_name: None,
        label: format!("Item {item_id}"),
        special_price: 10.0,
        percentage_off,
        sellable_qty: Some(2),
    }
}

fn payload(total_products: u64, products: Vec<ProductRecord>) -> SearchPayload {
    SearchPayload {
        total_products,
        products,
    }
}

fn search_ticket(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::SearchProducts { ticket, .. } => Some(*ticket),
            _ => None,
        })
        .expect("search effect")
}

fn lookup_ticket(effects: &[Effect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            Effect::LookupStores { ticket, .. } => Some(*ticket),
            _ => None,
        })
        .expect("lookup effect")
}

/// Keyword "drill", submitted at `at_ms`, with page 1 answered by `page_one`.
fn searched(page_one: SearchPayload) -> AppState {
    let (state, _) = update(AppState::new(), Msg::KeywordChanged("drill".into()));
    let (state, effects) = update(state, Msg::SubmitClicked { at_ms: 10 });
    let ticket = search_ticket(&effects);
    let (state, effects) = update(
        state,
        Msg::SearchLoaded {
            ticket,
            outcome: Ok(page_one),
        },
    );
    assert!(effects.is_empty());
    state
}

#[test]
fn scenario_b_submit_without_keyword_or_category_is_invalid() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::KeywordChanged(String::new()));
    assert!(effects.is_empty());

    let (state, effects) = update(state, Msg::SubmitClicked { at_ms: 5 });

    assert!(!effects
        .iter()
        .any(|effect| matches!(effect, Effect::SearchProducts { .. })));
    assert_eq!(
        state.result(),
        &ResultState::Error(QueryError::InvalidQuery)
    );
    let view = state.view();
    assert!(view.error_visible);
    assert!(!view.results_visible);
    assert_eq!(view.projection, Projection::Banner(Banner::InvalidQuery));
}

#[test]
fn submit_fetches_first_page_with_query_inputs() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::StoreSelected(Some("6175".into())));
    let (state, _) = update(state, Msg::CategorySelected(Some("501997".into())));
    let (state, _) = update(state, Msg::KeywordChanged("  led  ".into()));

    let (state, effects) = update(state, Msg::SubmitClicked { at_ms: 42 });

    let query = effects
        .iter()
        .find_map(|effect| match effect {
            Effect::SearchProducts { query, .. } => Some(query.clone()),
            _ => None,
        })
        .expect("search effect");
    assert_eq!(query.store_id.as_deref(), Some("6175"));
    assert_eq!(query.category_id.as_deref(), Some("501997"));
    assert_eq!(query.keyword.as_deref(), Some("led"));
    assert_eq!(query.start_index(), 0);
    assert_eq!(state.pagination().current_page, Page::new(1));
    assert!(state.view().searching);
}

#[test]
fn editing_inputs_does_not_fetch() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::KeywordChanged("saw".into()));
    assert!(effects.is_empty());
    let (_state, effects) = update(state, Msg::CategorySelected(Some("562522".into())));
    assert!(effects.is_empty());
}

#[test]
fn loaded_page_drives_total_pages_and_display_list() {
    init_logging();
    let state = searched(payload(100, vec![product("1", 0.0), product("2", 10.0)]));

    let view = state.view();
    assert_eq!(view.total_pages, Page::new(3));
    assert_eq!(view.current_page, Page::new(1));
    assert!(view.results_visible);
    assert!(!view.error_visible);
    assert!(!view.searching);
    assert_eq!(view.projection.items().len(), 1);
    assert_eq!(view.projection.items()[0].item_label, "Item ID: 2");
}

#[test]
fn next_page_requests_the_following_offset() {
    init_logging();
    let state = searched(payload(100, vec![product("1", 5.0)]));

    let (state, effects) = update(state, Msg::NextClicked { at_ms: 20 });
    let (state, next_effects) = update(state, Msg::NextClicked { at_ms: 30 });

    let offsets: Vec<u64> = effects
        .iter()
        .chain(&next_effects)
        .filter_map(|effect| match effect {
            Effect::SearchProducts { query, .. } => Some(query.start_index()),
            _ => None,
        })
        .collect();
    assert_eq!(offsets, vec![48, 96]);
    assert_eq!(state.pagination().current_page, Page::new(3));
}

#[test]
fn next_on_last_page_stays_put() {
    init_logging();
    let state = searched(payload(96, vec![product("1", 5.0)]));
    let (state, effects) = update(state, Msg::NextClicked { at_ms: 20 });
    let ticket = search_ticket(&effects);
    let (state, _) = update(
        state,
        Msg::SearchLoaded {
            ticket,
            outcome: Ok(payload(96, vec![product("2", 5.0)])),
        },
    );
    let (state, _) = update(state, Msg::BackClicked { at_ms: 21 });
    let (state, _) = update(state, Msg::NextClicked { at_ms: 30 });
    let (state, _) = update(state, Msg::NextClicked { at_ms: 40 });

    let pagination = state.pagination();
    assert_eq!(pagination.current_page, Page::new(2));
    assert_eq!(pagination.total_pages, Page::new(2));
}

#[test]
fn paging_keeps_the_previous_page_visible_until_the_next_arrives() {
    init_logging();
    let state = searched(payload(100, vec![product("1", 5.0)]));

    let (state, _) = update(state, Msg::NextClicked { at_ms: 20 });

    assert!(state.view().results_visible);
    assert!(state.view().searching);
    assert_eq!(state.projection().items().len(), 1);
}

#[test]
fn resubmitting_starts_over_from_unset() {
    init_logging();
    let state = searched(payload(100, vec![product("1", 5.0)]));

    let (state, effects) = update(state, Msg::SubmitClicked { at_ms: 50 });

    assert!(effects
        .iter()
        .any(|effect| matches!(effect, Effect::SearchProducts { .. })));
    assert_eq!(state.result(), &ResultState::Unset);
    assert!(!state.view().results_visible);
}

#[test]
fn scenario_e_superseded_page_is_discarded() {
    init_logging();
    let state = searched(payload(100, vec![product("1", 5.0)]));

    let (state, effects) = update(state, Msg::NextClicked { at_ms: 20 });
    let page_two = search_ticket(&effects);
    let (state, effects) = update(state, Msg::BackClicked { at_ms: 30 });
    let page_one = search_ticket(&effects);
    assert_ne!(page_one, page_two);

    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::SearchLoaded {
            ticket: page_two,
            outcome: Ok(payload(100, vec![product("page-two", 50.0)])),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state, before);
    assert_eq!(state.pagination().current_page, Page::new(1));
    assert_eq!(state.projection().items()[0].item_label, "Item ID: 1");

    let (state, _) = update(
        state,
        Msg::SearchLoaded {
            ticket: page_one,
            outcome: Ok(payload(100, vec![product("fresh", 5.0)])),
        },
    );
    assert_eq!(state.projection().items()[0].item_label, "Item ID: fresh");
}

#[test]
fn service_failure_is_recoverable_by_resubmitting() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::KeywordChanged("drill".into()));
    let (state, effects) = update(state, Msg::SubmitClicked { at_ms: 10 });
    let ticket = search_ticket(&effects);

    let (state, _) = update(
        state,
        Msg::SearchLoaded {
            ticket,
            outcome: Err(ServiceFailure("timeout".into())),
        },
    );
    let view = state.view();
    assert!(view.error_visible);
    assert!(!view.results_visible);
    assert_eq!(view.total_pages, None);
    assert_eq!(view.projection.banner(), Some(Banner::ServiceFailure));

    let (_state, effects) = update(state, Msg::SubmitClicked { at_ms: 20 });
    assert_ne!(search_ticket(&effects), ticket);
}

#[test]
fn selecting_a_store_recenters_the_map_and_looks_up_nearby_stores() {
    init_logging();
    let (state, effects) = update(AppState::new(), Msg::StoreSelected(Some("6175".into())));

    match effects.as_slice() {
        [Effect::LookupStores { lat, lon, .. }] => {
            assert_eq!((*lat, *lon), (40.741983, -73.990877));
        }
        other => panic!("unexpected effects {other:?}"),
    }
    assert_eq!(state.view().viewport.zoom, RECENTER_ZOOM);
}

#[test]
fn recentering_onto_the_current_viewport_does_not_look_up_again() {
    init_logging();
    let (state, _) = update(AppState::new(), Msg::StoreSelected(Some("6175".into())));
    let (state, _) = update(state, Msg::StoreSelected(None));

    let (state, effects) = update(
        state,
        Msg::MarkerClicked("New York, NY - Manhattan West 23rd St - #6175".into()),
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().store_id.as_deref(), Some("6175"));
}

#[test]
fn discovered_store_overrides_preset_coordinates() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::ViewportSettled(Viewport {
            lat: 34.0,
            lon: -118.3,
            zoom: 10.0,
        }),
    );
    let ticket = lookup_ticket(&effects);
    let moved = Store {
        id: "1039".into(),
        label: "Los Angeles, CA - Hyde Park - #1039".into(),
        lat: 33.9,
        lon: -118.2,
    };

    let (state, _) = update(
        state,
        Msg::StoresLoaded {
            ticket,
            outcome: Ok(vec![moved.clone()]),
        },
    );

    assert_eq!(state.catalog().get("1039"), Some(&moved));
    let view = state.view();
    assert_eq!(view.markers, vec![moved]);
    assert_eq!(view.store_options[0].id, "1039");
    assert_eq!(
        view.store_options.iter().filter(|o| o.id == "1039").count(),
        1
    );
    assert_eq!(view.store_options.len(), PRESET_STORES.len());

    let (state, _) = update(state, Msg::StoreSelected(Some("1039".into())));
    assert_eq!((state.view().viewport.lat, state.view().viewport.lon), (33.9, -118.2));
}

#[test]
fn failed_lookup_empties_the_display_set_and_keeps_the_catalog() {
    init_logging();
    let (state, effects) = update(
        AppState::new(),
        Msg::ViewportSettled(Viewport {
            lat: 40.0,
            lon: -75.0,
            zoom: 8.0,
        }),
    );
    let ticket = lookup_ticket(&effects);
    let catalog = state.catalog().clone();

    let (state, _) = update(
        state,
        Msg::StoresLoaded {
            ticket,
            outcome: Err(ServiceFailure("502".into())),
        },
    );

    assert_eq!(state.catalog(), &catalog);
    assert!(state.view().store_options.is_empty());
    assert!(state.view().markers.is_empty());
}

#[test]
fn stale_store_lookup_is_discarded() {
    init_logging();
    let first = Viewport {
        lat: 40.0,
        lon: -75.0,
        zoom: 8.0,
    };
    let second = Viewport { lat: 41.0, ..first };
    let (state, effects) = update(AppState::new(), Msg::ViewportSettled(first));
    let stale = lookup_ticket(&effects);
    let (state, _) = update(state, Msg::ViewportSettled(second));

    let (state, effects) = update(
        state,
        Msg::StoresLoaded {
            ticket: stale,
            outcome: Ok(Vec::new()),
        },
    );

    assert!(effects.is_empty());
    assert_eq!(state.view().store_options.len(), PRESET_STORES.len());
}

#[test]
fn map_movement_is_debounced_until_quiet() {
    init_logging();
    let frame = |lat: f64| Viewport {
        lat,
        lon: -90.0,
        zoom: 6.0,
    };
    let (state, effects) = update(
        AppState::new(),
        Msg::ViewportMoved {
            viewport: frame(30.0),
            at_ms: 1_000,
        },
    );
    assert!(effects.is_empty());
    let (state, _) = update(
        state,
        Msg::ViewportMoved {
            viewport: frame(31.0),
            at_ms: 1_100,
        },
    );
    let (state, effects) = update(state, Msg::Tick { now_ms: 1_200 });
    assert!(effects.is_empty());
    assert!(state.view().viewport_pending);

    let (state, effects) = update(state, Msg::Tick { now_ms: 1_450 });

    match effects.as_slice() {
        [Effect::LookupStores { lat, .. }] => assert_eq!(*lat, 31.0),
        other => panic!("unexpected effects {other:?}"),
    }
    assert!(!state.view().viewport_pending);
}

#[test]
fn inventory_shows_once_a_store_is_selected() {
    init_logging();
    let state = searched(payload(1, vec![product("1", 5.0)]));
    assert_eq!(state.projection().items()[0].inventory_label, "");

    let (mut state, _) = update(state, Msg::StoreSelected(Some("1950".into())));
    assert!(state.consume_dirty());
    // The list is re-derived on the next page load, not on store changes.
    assert_eq!(state.projection().items()[0].inventory_label, "");
}
