//! Collaborator traits the engine drives.
//!
//! The controller owns no I/O. Search, persistence, and message delivery are
//! reached through these traits so the HTTP, Postgres, and Telegram adapters
//! can be swapped for in-memory ones in tests.

use async_trait::async_trait;
use cheapo_core::{ChatId, Coordinates, MerchantRecord, MessageId, SearchState};

use crate::error::BoxError;
use crate::keyboard::Keyboard;

/// A geo query against the merchant backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchQuery {
    pub center: Coordinates,
    /// `None` lets the backend pick its default radius.
    pub radius_meters: Option<u32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SearchResponse {
    pub records: Vec<MerchantRecord>,
    /// Radius the backend actually searched with.
    pub search_radius_meters: u32,
}

#[async_trait]
pub trait LocationSearch: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<SearchResponse, BoxError>;
}

/// Per-conversation snapshot storage. The last `put` for a chat wins.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn get(&self, chat_id: ChatId) -> Result<Option<SearchState>, BoxError>;

    async fn put(&self, chat_id: ChatId, state: &SearchState) -> Result<(), BoxError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryTarget {
    /// Send a new message quoting the user's location message.
    NewReply { reply_to: MessageId },
    /// Rewrite the message whose keyboard was pressed.
    Edit { message_id: MessageId },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub chat_id: ChatId,
    pub target: DeliveryTarget,
    pub text: String,
    pub keyboard: Keyboard,
}

#[async_trait]
pub trait MessagingGateway: Send + Sync {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), BoxError>;

    /// Clears the loading indicator on the pressed button.
    async fn acknowledge(&self, callback_query_id: &str) -> Result<(), BoxError>;
}
