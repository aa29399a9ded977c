pub mod app_config;
pub mod catalog;
pub mod config;
pub mod error;
pub mod state;
pub mod types;

pub use app_config::{AppConfig, Environment};
pub use catalog::{load_catalog, SourceCatalog, SourceDefinition, NOOP_TRIGGER};
pub use config::{load_app_config, load_app_config_from_env};
pub use error::ConfigError;
pub use state::SearchState;
pub use types::{CategoryCode, ChatId, Coordinates, MerchantRecord, MessageId, SourceId};
