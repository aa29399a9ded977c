//! The filter → sort → paginate pipeline over a result set.
//!
//! Every transform borrows or consumes its input and returns a new value; none
//! keeps state between calls.

use std::collections::BTreeSet;

use cheapo_core::{Coordinates, MerchantRecord, SourceCatalog, SourceId};

use crate::distance::geodesic_distance;

/// Output of [`filter_records`].
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOutcome {
    pub records: Vec<MerchantRecord>,
    /// Sources present among category-approved records, before source filtering.
    pub sources_available: BTreeSet<SourceId>,
}

/// One page of a sorted result set.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<MerchantRecord>,
    pub page: usize,
    /// 1-based index of the first item on this page; 0 when the page is empty.
    pub start_item_number: usize,
    /// 1-based inclusive index of the last item on this page; 0 when empty.
    pub end_item_number: usize,
    pub total_items: usize,
}

impl Page {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Keeps records whose category is approved, whose source is known to the
/// catalog, and (when `source_filter` is given) whose source is selected.
///
/// Input order is preserved. `sources_available` ignores `source_filter`, so
/// toggling a source never shrinks the set of toggles offered.
#[must_use]
pub fn filter_records(
    records: &[MerchantRecord],
    catalog: &SourceCatalog,
    source_filter: Option<&BTreeSet<SourceId>>,
) -> FilterOutcome {
    let mut sources_available = BTreeSet::new();
    let mut kept = Vec::with_capacity(records.len());

    for record in records {
        if !catalog.is_approved(record.category) || catalog.by_id(record.source).is_none() {
            continue;
        }
        sources_available.insert(record.source);
        if source_filter.is_none_or(|selected| selected.contains(&record.source)) {
            kept.push(record.clone());
        }
    }

    FilterOutcome {
        records: kept,
        sources_available,
    }
}

/// Attaches the distance from `center` to every record and orders them nearest
/// first. Ties keep their input order.
#[must_use]
pub fn sort_by_distance(records: Vec<MerchantRecord>, center: Coordinates) -> Vec<MerchantRecord> {
    let mut ranked: Vec<MerchantRecord> = records
        .into_iter()
        .map(|mut record| {
            record.distance_meters = Some(geodesic_distance(center, record.coordinates));
            record
        })
        .collect();
    ranked.sort_by(|a, b| distance_key(a).total_cmp(&distance_key(b)));
    ranked
}

fn distance_key(record: &MerchantRecord) -> f64 {
    record.distance_meters.unwrap_or(f64::INFINITY)
}

/// Slices out the 1-based `page` of `page_size` records.
///
/// A page past the end (or page 0) is returned empty with `total_items` still set.
#[must_use]
pub fn paginate(records: &[MerchantRecord], page: usize, page_size: usize) -> Page {
    let total_items = records.len();
    let empty = Page {
        items: Vec::new(),
        page,
        start_item_number: 0,
        end_item_number: 0,
        total_items,
    };

    if page == 0 || page_size == 0 {
        return empty;
    }

    let start = (page - 1).saturating_mul(page_size);
    if start >= total_items {
        return empty;
    }
    let end = start.saturating_add(page_size).min(total_items);

    Page {
        items: records[start..end].to_vec(),
        page,
        start_item_number: start + 1,
        end_item_number: end,
        total_items,
    }
}

/// Number of pages needed for `total_items`; zero when there is nothing to show.
#[must_use]
pub fn page_count(total_items: usize, page_size: usize) -> usize {
    if page_size == 0 {
        return 0;
    }
    total_items.div_ceil(page_size)
}
