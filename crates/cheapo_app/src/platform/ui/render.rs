use std::fmt::Write;

use cheapo_core::{category, AppViewModel, Projection, CATEGORIES};

/// Plain-text frame for one view model.
pub fn render(view: &AppViewModel) -> String {
    let mut out = String::new();

    let moving = if view.viewport_pending { " (moving)" } else { "" };
    let _ = writeln!(
        out,
        "Map: {:.4}, {:.4} @ zoom {}{}",
        view.viewport.lat, view.viewport.lon, view.viewport.zoom, moving
    );
    let _ = writeln!(out, "Markers: {}", view.markers.len());

    let _ = writeln!(out, "Stores ({}):", view.store_options.len());
    for option in &view.store_options {
        let selected = view.store_id.as_deref() == Some(option.id.as_str());
        let _ = writeln!(out, "  {} {}", if selected { '*' } else { ' ' }, option.label);
    }

    let category_label = view
        .category_id
        .as_deref()
        .map(|id| category(id).map_or(id, |category| category.label))
        .unwrap_or("-");
    let _ = writeln!(
        out,
        "Keyword: {} | Category: {} | Store: {}",
        view.keyword.as_deref().unwrap_or("-"),
        category_label,
        view.store_id.as_deref().unwrap_or("-")
    );

    let page = match (view.current_page, view.total_pages) {
        (Some(current), Some(total)) => format!("Page {current} / {total}"),
        (Some(current), None) => format!("Page {current}"),
        (None, _) => "Page -".to_string(),
    };
    let searching = if view.searching { " [searching]" } else { "" };
    let _ = writeln!(out, "{page}{searching}");

    match &view.projection {
        Projection::Hidden => {}
        Projection::Banner(banner) => {
            let marker = if banner.is_error() { "!" } else { "i" };
            let _ = writeln!(out, "[{marker}] {}", banner.message());
        }
        Projection::Items(items) => {
            for item in items {
                let _ = writeln!(out, "- {}", item.title);
                let _ = writeln!(out, "    {} | {}", item.price_label, item.item_label);
                if !item.inventory_label.is_empty() {
                    let _ = writeln!(out, "    {}", item.inventory_label);
                }
                let _ = writeln!(out, "    {}", item.detail_link);
                let _ = writeln!(out, "    {}", item.image_url);
            }
        }
    }

    out
}

pub fn render_categories() -> String {
    let mut out = String::new();
    for entry in CATEGORIES {
        let _ = writeln!(out, "  {:>10}  {}", entry.id, entry.label);
    }
    out
}
