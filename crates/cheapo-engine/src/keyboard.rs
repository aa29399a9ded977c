//! Builds the inline keyboard shown under a result page.

use std::collections::BTreeSet;

use cheapo_core::SourceId;

use crate::callback::CallbackAction;
use crate::config::EngineConfig;

const ACTIVE_MARKER: &str = "\u{2705}";
const INACTIVE_MARKER: &str = "\u{2B1C}";
const UNAVAILABLE_MARKER: &str = "\u{1F6AB}";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyButton {
    pub label: String,
    pub trigger: String,
}

impl KeyButton {
    fn new(label: impl Into<String>, action: &CallbackAction) -> Self {
        Self {
            label: label.into(),
            trigger: action.encode(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Keyboard {
    pub rows: Vec<Vec<KeyButton>>,
}

impl Keyboard {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn buttons(&self) -> impl Iterator<Item = &KeyButton> {
        self.rows.iter().flatten()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct KeyboardInput<'a> {
    pub current_page: usize,
    pub max_page: usize,
    pub radius_meters: u32,
    pub source_filter: &'a BTreeSet<SourceId>,
    pub sources_available: &'a BTreeSet<SourceId>,
}

/// Lays out page, radius, and source-toggle rows for the current state.
///
/// The page row is dropped when there is at most one page. Page buttons whose
/// target would decode as a radius are never emitted, so navigation stops at
/// the page before `radius_step`. The radius and source rows are dropped
/// together when no source is available.
#[must_use]
pub fn build_keyboard(input: &KeyboardInput<'_>, config: &EngineConfig) -> Keyboard {
    let mut rows = Vec::new();

    if input.max_page > 1 {
        let mut row = Vec::new();
        if input.current_page > 1 {
            let target = (input.current_page - 1).min(input.max_page);
            if page_is_addressable(target, config) {
                row.push(KeyButton::new(
                    format!("\u{00AB} Page {target}"),
                    &CallbackAction::Page(target),
                ));
            }
        }
        if input.current_page < input.max_page {
            let target = input.current_page + 1;
            if page_is_addressable(target, config) {
                row.push(KeyButton::new(
                    format!("Page {target} \u{00BB}"),
                    &CallbackAction::Page(target),
                ));
            }
        }
        if !row.is_empty() {
            rows.push(row);
        }
    }

    if input.sources_available.is_empty() {
        return Keyboard { rows };
    }

    let mut radius_row = Vec::new();
    if input.radius_meters > config.min_radius {
        let target = input
            .radius_meters
            .saturating_sub(config.radius_step)
            .max(config.min_radius);
        radius_row.push(KeyButton::new(
            format!("- {}m", config.radius_step),
            &CallbackAction::Radius(target),
        ));
    }
    if input.radius_meters < config.max_radius {
        let target = input
            .radius_meters
            .saturating_add(config.radius_step)
            .min(config.max_radius);
        radius_row.push(KeyButton::new(
            format!("+ {}m", config.radius_step),
            &CallbackAction::Radius(target),
        ));
    }
    if !radius_row.is_empty() {
        rows.push(radius_row);
    }

    let source_row = config
        .catalog
        .sources
        .iter()
        .map(|source| {
            if !input.sources_available.contains(&source.id) {
                KeyButton::new(
                    format!("{UNAVAILABLE_MARKER} {}", source.code),
                    &CallbackAction::Noop,
                )
            } else if input.source_filter.contains(&source.id) {
                KeyButton::new(
                    format!("{ACTIVE_MARKER} {}", source.code),
                    &CallbackAction::ToggleSource(source.code.clone()),
                )
            } else {
                KeyButton::new(
                    format!("{INACTIVE_MARKER} {}", source.code),
                    &CallbackAction::ToggleSource(source.code.clone()),
                )
            }
        })
        .collect();
    rows.push(source_row);

    Keyboard { rows }
}

/// Page payloads share the integer space with radii; only pages below the
/// radius step round-trip through [`CallbackAction::parse`].
fn page_is_addressable(page: usize, config: &EngineConfig) -> bool {
    page < usize::try_from(config.radius_step).unwrap_or(usize::MAX)
}
