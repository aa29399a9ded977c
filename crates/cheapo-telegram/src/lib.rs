//! Telegram Bot API plumbing for Cheapo.
//!
//! [`types`] decodes inbound webhook updates and encodes outbound method
//! payloads. [`TelegramClient`] calls the Bot API and implements the engine's
//! [`MessagingGateway`](cheapo_engine::MessagingGateway).

pub mod client;
pub mod error;
pub mod gateway;
pub mod types;

pub use client::TelegramClient;
pub use error::TelegramError;
pub use gateway::keyboard_markup;
pub use types::{CallbackQuery, Chat, ChatKind, Location, Message, Update, User};
