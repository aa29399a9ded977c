pub mod client;
pub mod decode;
pub mod error;
pub(crate) mod retry;
pub mod types;

pub use client::SearchClient;
pub use decode::{decode_location, decode_locations};
pub use error::SearchError;
