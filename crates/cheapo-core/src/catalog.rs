//! Known discount sources and the merchant categories allowed on screen.

use std::collections::{BTreeSet, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::types::{CategoryCode, SourceId};
use crate::ConfigError;

/// Reserved callback payload for buttons that do nothing when pressed.
pub const NOOP_TRIGGER: &str = "NIL";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDefinition {
    pub id: SourceId,
    /// Short code shown on toggle buttons and used as their callback payload.
    pub code: String,
    /// Display name used in result lines.
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCatalog {
    pub approved_categories: BTreeSet<CategoryCode>,
    pub sources: Vec<SourceDefinition>,
}

impl SourceCatalog {
    /// The catalog of the current deployment: food category only, three sources.
    #[must_use]
    pub fn builtin() -> Self {
        Self {
            approved_categories: BTreeSet::from([CategoryCode(1)]),
            sources: vec![
                SourceDefinition {
                    id: SourceId(1),
                    code: "ENTR".to_string(),
                    name: "Entertainer".to_string(),
                },
                SourceDefinition {
                    id: SourceId(2),
                    code: "CITI".to_string(),
                    name: "Citi".to_string(),
                },
                SourceDefinition {
                    id: SourceId(3),
                    code: "OCBC".to_string(),
                    name: "OCBC".to_string(),
                },
            ],
        }
    }

    #[must_use]
    pub fn by_id(&self, id: SourceId) -> Option<&SourceDefinition> {
        self.sources.iter().find(|s| s.id == id)
    }

    #[must_use]
    pub fn by_code(&self, code: &str) -> Option<&SourceDefinition> {
        self.sources.iter().find(|s| s.code == code)
    }

    #[must_use]
    pub fn is_approved(&self, category: CategoryCode) -> bool {
        self.approved_categories.contains(&category)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::Validation(
                "at least one source must be defined".to_string(),
            ));
        }
        if self.approved_categories.is_empty() {
            return Err(ConfigError::Validation(
                "at least one approved category must be defined".to_string(),
            ));
        }

        let mut seen_ids = HashSet::new();
        let mut seen_codes = HashSet::new();

        for source in &self.sources {
            let code = source.code.trim();
            if code.is_empty() {
                return Err(ConfigError::Validation(format!(
                    "source {} has an empty code",
                    source.id
                )));
            }
            if code.chars().all(|c| c.is_ascii_digit()) {
                return Err(ConfigError::Validation(format!(
                    "source code '{code}' is numeric and would collide with page or radius callbacks"
                )));
            }
            if code == NOOP_TRIGGER {
                return Err(ConfigError::Validation(format!(
                    "source code '{NOOP_TRIGGER}' is reserved"
                )));
            }
            if !seen_ids.insert(source.id) {
                return Err(ConfigError::Validation(format!(
                    "duplicate source id: {}",
                    source.id
                )));
            }
            if !seen_codes.insert(code.to_string()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate source code: '{code}'"
                )));
            }
        }

        Ok(())
    }
}

impl Default for SourceCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Load and validate a source catalog from a YAML file.
///
/// `None` selects [`SourceCatalog::builtin`].
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_catalog(path: Option<&Path>) -> Result<SourceCatalog, ConfigError> {
    let Some(path) = path else {
        return Ok(SourceCatalog::builtin());
    };

    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::CatalogFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_catalog(&content)
}

fn parse_catalog(content: &str) -> Result<SourceCatalog, ConfigError> {
    let catalog: SourceCatalog =
        serde_yaml::from_str(content).map_err(ConfigError::CatalogFileParse)?;
    catalog.validate()?;
    Ok(catalog)
}
