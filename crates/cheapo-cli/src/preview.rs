//! `preview`: run one search against the backend and print what the bot
//! would send, without touching Telegram or the state store.

use std::fmt::Write as _;

use cheapo_core::{AppConfig, Coordinates};
use cheapo_engine::{build_search_state, render_state, EngineConfig, RenderedView};
use cheapo_search::SearchClient;

pub(crate) async fn run(
    config: &AppConfig,
    lat: f64,
    lng: f64,
    radius: Option<u32>,
    page: usize,
) -> anyhow::Result<String> {
    validate_args(lat, lng, page)?;

    let catalog = cheapo_core::load_catalog(config.catalog_path.as_deref())?;
    let engine_config = EngineConfig::from_app_config(config, catalog);
    let client = SearchClient::from_app_config(config)?;

    let center = Coordinates::new(lat, lng);
    let response = client.search_locations(center, radius).await?;
    tracing::info!(
        records = response.records.len(),
        radius_meters = response.search_radius_meters,
        "search returned"
    );

    let mut state = build_search_state(&engine_config, center, response, None);
    state.current_page = page;
    let view = render_state(&engine_config, &state);

    Ok(format_view(&view))
}

fn validate_args(lat: f64, lng: f64, page: usize) -> anyhow::Result<()> {
    anyhow::ensure!(
        (-90.0..=90.0).contains(&lat),
        "latitude {lat} is outside [-90, 90]"
    );
    anyhow::ensure!(
        (-180.0..=180.0).contains(&lng),
        "longitude {lng} is outside [-180, 180]"
    );
    anyhow::ensure!(page >= 1, "pages start at 1");
    Ok(())
}

/// Message text, a summary line, then one line per keyboard row with each
/// button shown as `[label](trigger)`.
pub(crate) fn format_view(view: &RenderedView) -> String {
    let mut out = String::new();
    out.push_str(&view.text);
    if !view.text.ends_with('\n') {
        out.push('\n');
    }
    let _ = writeln!(
        out,
        "\n{} result(s), {} page(s)",
        view.total_items, view.max_page
    );
    for row in &view.keyboard.rows {
        let line: Vec<String> = row
            .iter()
            .map(|b| format!("[{}]({})", b.label, b.trigger))
            .collect();
        let _ = writeln!(out, "{}", line.join("  "));
    }
    out
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use cheapo_engine::{KeyButton, Keyboard};

    fn button(label: &str, trigger: &str) -> KeyButton {
        KeyButton {
            label: label.to_string(),
            trigger: trigger.to_string(),
        }
    }

    #[test]
    fn format_view_lists_rows_after_text() {
        let view = RenderedView {
            text: "*Nearby deals*\nA. Kopi Corner".to_string(),
            keyboard: Keyboard {
                rows: vec![
                    vec![button("Page 2 »", "2")],
                    vec![button("- 250m", "250"), button("+ 250m", "750")],
                ],
            },
            sources_present: BTreeSet::new(),
            total_items: 25,
            max_page: 2,
        };

        let out = format_view(&view);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "*Nearby deals*");
        assert_eq!(lines[1], "A. Kopi Corner");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "25 result(s), 2 page(s)");
        assert_eq!(lines[4], "[Page 2 »](2)");
        assert_eq!(lines[5], "[- 250m](250)  [+ 250m](750)");
    }

    #[test]
    fn format_view_without_keyboard_has_only_summary() {
        let view = RenderedView {
            text: "No deals found.\n".to_string(),
            keyboard: Keyboard::default(),
            sources_present: BTreeSet::new(),
            total_items: 0,
            max_page: 0,
        };

        assert_eq!(
            format_view(&view),
            "No deals found.\n\n0 result(s), 0 page(s)\n"
        );
    }

    #[test]
    fn rejects_out_of_range_arguments() {
        assert!(validate_args(1.3, 103.8, 1).is_ok());
        assert!(validate_args(91.0, 103.8, 1).is_err());
        assert!(validate_args(1.3, -181.0, 1).is_err());
        assert!(validate_args(1.3, 103.8, 0).is_err());
    }
}
