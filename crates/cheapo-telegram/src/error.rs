use thiserror::Error;

/// Errors returned by the Telegram Bot API client.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Network or TLS failure. The request URL is stripped because it embeds
    /// the bot token.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid Telegram API base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// The Bot API answered `"ok": false`.
    #[error("Telegram API error {code} on {method}: {description}")]
    Api {
        method: String,
        code: i64,
        description: String,
    },

    /// A non-2xx status without a Bot API envelope.
    #[error("unexpected HTTP status {status} from {method}")]
    UnexpectedStatus { method: String, status: u16 },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },
}

impl TelegramError {
    /// Telegram rejects edits that would leave a message unchanged.
    #[must_use]
    pub fn is_message_not_modified(&self) -> bool {
        matches!(self, Self::Api { description, .. } if description.contains("message is not modified"))
    }
}
