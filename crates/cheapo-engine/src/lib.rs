//! Interactive result-state engine for the Cheapo bot.
//!
//! Owns the per-conversation [`SearchState`](cheapo_core::SearchState), runs the
//! filter → sort → paginate pipeline over it, and renders the reply text and
//! inline keyboard for every trigger. All I/O goes through the traits in
//! [`ports`].

pub mod callback;
pub mod config;
pub mod controller;
pub mod distance;
pub mod error;
pub mod format;
pub mod keyboard;
pub mod memory;
pub mod offer;
pub mod ports;
pub mod transform;

pub use callback::CallbackAction;
pub use config::EngineConfig;
pub use controller::{
    build_search_state, render_state, Controller, IgnoreReason, Outcome, RenderedView, Trigger,
};
pub use distance::geodesic_distance;
pub use error::{BoxError, EngineError};
pub use keyboard::{KeyButton, Keyboard};
pub use memory::MemoryStateStore;
pub use ports::{
    Delivery, DeliveryTarget, LocationSearch, MessagingGateway, SearchQuery, SearchResponse,
    StateStore,
};

#[cfg(test)]
mod test_support;
