//! Record fixtures shared by the unit tests.

use cheapo_core::{CategoryCode, Coordinates, MerchantRecord, SourceId};

pub(crate) const CENTER: Coordinates = Coordinates {
    latitude: 1.30,
    longitude: 103.80,
};

/// A food-category record `offset_m` meters (roughly) north of [`CENTER`].
pub(crate) fn merchant(id: &str, source: u32, offset_m: f64) -> MerchantRecord {
    MerchantRecord {
        id: id.to_string(),
        name: format!("Merchant {id}"),
        category: CategoryCode(1),
        source: SourceId(source),
        coordinates: Coordinates::new(CENTER.latitude + offset_m / 110_574.0, CENTER.longitude),
        offer_details: None,
        source_website: format!("https://deals.example.com/{id}"),
        distance_meters: None,
    }
}

pub(crate) fn with_category(mut record: MerchantRecord, category: u32) -> MerchantRecord {
    record.category = CategoryCode(category);
    record
}
