use cheapo_core::{AppConfig, SourceCatalog};

/// Tunables the engine needs, passed in explicitly at construction.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Maximum records rendered on one page.
    pub page_size: usize,
    /// Granularity of radius adjustment; callback payloads at or above this
    /// value are radii, below it page numbers.
    pub radius_step: u32,
    pub min_radius: u32,
    pub max_radius: u32,
    /// Offer descriptions at or above this many characters are not shown.
    pub offer_summary_max_chars: usize,
    pub catalog: SourceCatalog,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            page_size: 20,
            radius_step: 250,
            min_radius: 250,
            max_radius: 5000,
            offer_summary_max_chars: 100,
            catalog: SourceCatalog::builtin(),
        }
    }
}

impl EngineConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig, catalog: SourceCatalog) -> Self {
        Self {
            page_size: config.page_size,
            radius_step: config.radius_step,
            min_radius: config.min_radius,
            max_radius: config.max_radius,
            offer_summary_max_chars: config.offer_summary_max_chars,
            catalog,
        }
    }

    #[must_use]
    pub fn clamp_radius(&self, radius_meters: u32) -> u32 {
        radius_meters.clamp(self.min_radius, self.max_radius)
    }

    #[must_use]
    pub fn radius_in_bounds(&self, radius_meters: u32) -> bool {
        (self.min_radius..=self.max_radius).contains(&radius_meters)
    }
}
