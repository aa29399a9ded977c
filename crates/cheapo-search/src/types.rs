//! Wire types for the location search backend.
//!
//! The backend returns items in an attribute-typed layout: every field is an
//! object keyed by its type tag (`{"S": "..."}` for strings, `{"N": "..."}`
//! for numbers, always encoded as strings). Two string attributes,
//! `geoJson` and `AdditionalDetails`, hold nested JSON documents.

use serde::{Deserialize, Serialize};

/// Body of `POST /search`.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub latitude: f64,
    pub longitude: f64,
    /// Omitted to let the backend choose its default radius.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_radius: Option<u32>,
}

/// Top-level response envelope.
///
/// `locations` stays untyped so each record can be decoded (and skipped)
/// on its own.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchEnvelope {
    pub search_radius: NumberOrString,
    #[serde(default)]
    pub locations: Vec<serde_json::Value>,
}

/// The backend is inconsistent about quoting numbers.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum NumberOrString {
    Number(u64),
    Float(f64),
    Text(String),
}

impl NumberOrString {
    /// Whole meters, or `None` when the value is negative or not numeric.
    #[must_use]
    pub fn as_meters(&self) -> Option<u32> {
        match self {
            Self::Number(n) => u32::try_from(*n).ok(),
            Self::Float(f) => float_meters(*f),
            Self::Text(s) => {
                let s = s.trim();
                s.parse::<u32>()
                    .ok()
                    .or_else(|| s.parse::<f64>().ok().and_then(float_meters))
            }
        }
    }
}

fn float_meters(value: f64) -> Option<u32> {
    if !value.is_finite() || value < 0.0 || value > f64::from(u32::MAX) {
        return None;
    }
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    Some(value.round() as u32)
}

/// `{"S": "..."}`
#[derive(Debug, Deserialize)]
pub struct StringAttr {
    #[serde(rename = "S")]
    pub value: String,
}

/// `{"N": "..."}`
#[derive(Debug, Deserialize)]
pub struct NumberAttr {
    #[serde(rename = "N")]
    pub value: String,
}

/// One item of `locations`.
#[derive(Debug, Deserialize)]
pub struct RawLocation {
    #[serde(rename = "rangeKey", default)]
    pub range_key: Option<StringAttr>,
    #[serde(rename = "Name")]
    pub name: StringAttr,
    #[serde(rename = "Type")]
    pub category: NumberAttr,
    #[serde(rename = "Source")]
    pub source: NumberAttr,
    #[serde(rename = "geoJson")]
    pub geo_json: StringAttr,
    #[serde(rename = "AdditionalDetails")]
    pub additional_details: StringAttr,
}

/// Decoded `geoJson` attribute. Coordinates are `[longitude, latitude]`.
#[derive(Debug, Deserialize)]
pub struct GeoPoint {
    pub coordinates: [f64; 2],
}

/// Decoded `AdditionalDetails` attribute.
#[derive(Debug, Deserialize)]
pub struct AdditionalDetails {
    #[serde(rename = "SourceWebsite")]
    pub source_website: String,
    #[serde(rename = "OfferDetails", default)]
    pub offer_details: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_omits_missing_radius() {
        let body = serde_json::to_value(SearchRequest {
            latitude: 1.3,
            longitude: 103.8,
            search_radius: None,
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"latitude": 1.3, "longitude": 103.8}));
    }

    #[test]
    fn request_includes_radius_in_camel_case() {
        let body = serde_json::to_value(SearchRequest {
            latitude: 1.3,
            longitude: 103.8,
            search_radius: Some(750),
        })
        .unwrap();
        assert_eq!(body["searchRadius"], 750);
    }

    #[test]
    fn radius_accepts_numbers_and_strings() {
        assert_eq!(NumberOrString::Number(500).as_meters(), Some(500));
        assert_eq!(NumberOrString::Float(499.6).as_meters(), Some(500));
        assert_eq!(NumberOrString::Text(" 750 ".into()).as_meters(), Some(750));
        assert_eq!(NumberOrString::Text("250.0".into()).as_meters(), Some(250));
        assert_eq!(NumberOrString::Text("wide".into()).as_meters(), None);
        assert_eq!(NumberOrString::Float(-1.0).as_meters(), None);
    }
}
