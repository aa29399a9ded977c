//! Bot API types: inbound updates and outbound method payloads.
//!
//! Only the fields Cheapo reads or writes are modelled; unknown fields are
//! ignored on decode.

use serde::{Deserialize, Serialize};

/// Envelope of every Bot API response.
#[derive(Debug, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    #[serde(default)]
    pub error_code: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

/// One webhook delivery.
#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    #[serde(default)]
    pub from: Option<User>,
    pub chat: Chat,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub location: Option<Location>,
    #[serde(default)]
    pub reply_to_message: Option<Box<Message>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub is_bot: bool,
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
    #[serde(rename = "type")]
    pub kind: ChatKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatKind {
    Private,
    Group,
    Supergroup,
    Channel,
    #[serde(other)]
    Unknown,
}

impl ChatKind {
    #[must_use]
    pub fn is_group(self) -> bool {
        matches!(self, Self::Group | Self::Supergroup)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    /// Absent when the pressed message is too old for Telegram to include.
    #[serde(default)]
    pub message: Option<Message>,
    #[serde(default)]
    pub data: Option<String>,
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

pub const PARSE_MODE_MARKDOWN: &str = "Markdown";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardMarkup {
    pub inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

/// `sendMessage`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SendMessage {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to_message_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

impl SendMessage {
    /// A plain-text message with no formatting and no keyboard.
    #[must_use]
    pub fn plain(chat_id: i64, text: impl Into<String>) -> Self {
        Self {
            chat_id,
            text: text.into(),
            parse_mode: None,
            reply_to_message_id: None,
            reply_markup: None,
        }
    }

    #[must_use]
    pub fn reply_to(mut self, message_id: i64) -> Self {
        self.reply_to_message_id = Some(message_id);
        self
    }
}

/// `editMessageText`
#[derive(Debug, Clone, Serialize)]
pub struct EditMessageText {
    pub chat_id: i64,
    pub message_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parse_mode: Option<String>,
    /// Omitting the markup removes any keyboard from the message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<InlineKeyboardMarkup>,
}

/// `answerCallbackQuery`
#[derive(Debug, Clone, Serialize)]
pub struct AnswerCallbackQuery {
    pub callback_query_id: String,
}

/// `setWebhook`
#[derive(Debug, Clone, Serialize)]
pub struct SetWebhook {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<String>,
    pub allowed_updates: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_location_reply_in_group() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 1,
            "message": {
                "message_id": 20,
                "from": {"id": 7, "is_bot": false, "first_name": "Ada"},
                "chat": {"id": -100, "type": "supergroup", "title": "Lunch"},
                "location": {"latitude": 1.3, "longitude": 103.8},
                "reply_to_message": {
                    "message_id": 19,
                    "from": {"id": 99, "is_bot": true, "first_name": "Cheapo"},
                    "chat": {"id": -100, "type": "supergroup"},
                    "text": "Hello I am Cheapo!"
                }
            }
        }))
        .unwrap();

        let message = update.message.unwrap();
        assert!(message.chat.kind.is_group());
        assert!((message.location.unwrap().longitude - 103.8).abs() < f64::EPSILON);
        assert_eq!(message.reply_to_message.unwrap().from.unwrap().id, 99);
        assert!(update.callback_query.is_none());
    }

    #[test]
    fn decodes_callback_query() {
        let update: Update = serde_json::from_value(json!({
            "update_id": 2,
            "callback_query": {
                "id": "cbq-1",
                "from": {"id": 7, "first_name": "Ada"},
                "message": {"message_id": 21, "chat": {"id": 7, "type": "private"}},
                "chat_instance": "x",
                "data": "CITI"
            }
        }))
        .unwrap();

        let query = update.callback_query.unwrap();
        assert_eq!(query.id, "cbq-1");
        assert_eq!(query.data.as_deref(), Some("CITI"));
        assert_eq!(query.message.unwrap().chat.kind, ChatKind::Private);
    }

    #[test]
    fn unknown_chat_type_is_tolerated() {
        let chat: Chat = serde_json::from_value(json!({"id": 1, "type": "forum"})).unwrap();
        assert_eq!(chat.kind, ChatKind::Unknown);
    }

    #[test]
    fn send_message_skips_unset_fields() {
        let body = serde_json::to_value(SendMessage::plain(5, "hi").reply_to(3)).unwrap();
        assert_eq!(
            body,
            json!({"chat_id": 5, "text": "hi", "reply_to_message_id": 3})
        );
    }
}
