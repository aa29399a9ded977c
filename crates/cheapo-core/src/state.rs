//! The per-conversation snapshot persisted after every trigger.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::types::{Coordinates, MerchantRecord, SourceId};

/// The last search of a conversation plus its current filter, radius, and page.
///
/// `locations` holds every category-approved record of the search, sorted by
/// ascending distance from `center`. Source filtering is applied at render
/// time so that re-enabling a source never requires a new search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchState {
    pub search_center: Coordinates,
    pub search_radius_meters: u32,
    pub source_filter: BTreeSet<SourceId>,
    pub sources_available: BTreeSet<SourceId>,
    pub locations: Vec<MerchantRecord>,
    pub current_page: usize,
}

impl SearchState {
    /// Checks the invariants a snapshot must hold before a callback may reuse it.
    ///
    /// - `current_page` is 1-based.
    /// - `source_filter` is a subset of `sources_available`.
    /// - `source_filter` is empty only when nothing is available.
    /// - every source seen in `locations` is listed in `sources_available`.
    #[must_use]
    pub fn is_consistent(&self) -> bool {
        if self.current_page == 0 {
            return false;
        }
        if !self.source_filter.is_subset(&self.sources_available) {
            return false;
        }
        if self.source_filter.is_empty() && !self.sources_available.is_empty() {
            return false;
        }
        self.locations
            .iter()
            .all(|record| self.sources_available.contains(&record.source))
    }
}
