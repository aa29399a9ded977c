//! Conversion of backend items into [`MerchantRecord`]s.

use cheapo_core::{CategoryCode, Coordinates, MerchantRecord, SourceId};
use thiserror::Error;

use crate::types::{AdditionalDetails, GeoPoint, RawLocation};

/// Why a single backend item could not be turned into a record.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("unexpected item shape: {0}")]
    Shape(#[source] serde_json::Error),

    #[error("invalid {field}: {reason}")]
    Field { field: &'static str, reason: String },
}

fn field_error(field: &'static str, reason: impl ToString) -> RecordError {
    RecordError::Field {
        field,
        reason: reason.to_string(),
    }
}

/// Decodes one attribute-typed item.
///
/// # Errors
///
/// Returns [`RecordError`] if the item is missing a field, a numeric
/// attribute does not parse, or a nested JSON attribute is malformed.
pub fn decode_location(value: serde_json::Value) -> Result<MerchantRecord, RecordError> {
    let raw: RawLocation = serde_json::from_value(value).map_err(RecordError::Shape)?;

    let category = raw
        .category
        .value
        .trim()
        .parse::<u32>()
        .map_err(|e| field_error("Type", e))?;
    let source = raw
        .source
        .value
        .trim()
        .parse::<u32>()
        .map_err(|e| field_error("Source", e))?;

    let point: GeoPoint =
        serde_json::from_str(&raw.geo_json.value).map_err(|e| field_error("geoJson", e))?;
    let [longitude, latitude] = point.coordinates;
    if !(latitude.is_finite() && (-90.0..=90.0).contains(&latitude)) {
        return Err(field_error("geoJson", format!("latitude {latitude} out of range")));
    }
    if !(longitude.is_finite() && (-180.0..=180.0).contains(&longitude)) {
        return Err(field_error("geoJson", format!("longitude {longitude} out of range")));
    }

    let details: AdditionalDetails = serde_json::from_str(&raw.additional_details.value)
        .map_err(|e| field_error("AdditionalDetails", e))?;

    let name = raw.name.value.trim().to_string();
    if name.is_empty() {
        return Err(field_error("Name", "empty"));
    }
    let id = raw
        .range_key
        .map(|k| k.value)
        .filter(|k| !k.trim().is_empty())
        .unwrap_or_else(|| name.clone());

    Ok(MerchantRecord {
        id,
        name,
        category: CategoryCode(category),
        source: SourceId(source),
        coordinates: Coordinates::new(latitude, longitude),
        offer_details: details
            .offer_details
            .map(|o| o.trim().to_string())
            .filter(|o| !o.is_empty()),
        source_website: details.source_website,
        distance_meters: None,
    })
}

/// Decodes every item, skipping (and logging) the malformed ones.
#[must_use]
pub fn decode_locations(values: Vec<serde_json::Value>) -> Vec<MerchantRecord> {
    let total = values.len();
    let records: Vec<MerchantRecord> = values
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| match decode_location(value) {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(index, error = %e, "skipping malformed search record");
                None
            }
        })
        .collect();

    if records.len() < total {
        tracing::debug!(
            total,
            kept = records.len(),
            "search response contained malformed records"
        );
    }
    records
}
