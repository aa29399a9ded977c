use async_trait::async_trait;
use cheapo_engine::{BoxError, Delivery, DeliveryTarget, Keyboard, MessagingGateway};

use crate::client::TelegramClient;
use crate::types::{
    EditMessageText, InlineKeyboardButton, InlineKeyboardMarkup, SendMessage, PARSE_MODE_MARKDOWN,
};

/// Converts an engine keyboard to reply markup; `None` when it has no rows.
#[must_use]
pub fn keyboard_markup(keyboard: &Keyboard) -> Option<InlineKeyboardMarkup> {
    if keyboard.is_empty() {
        return None;
    }
    Some(InlineKeyboardMarkup {
        inline_keyboard: keyboard
            .rows
            .iter()
            .map(|row| {
                row.iter()
                    .map(|button| InlineKeyboardButton {
                        text: button.label.clone(),
                        callback_data: button.trigger.clone(),
                    })
                    .collect()
            })
            .collect(),
    })
}

#[async_trait]
impl MessagingGateway for TelegramClient {
    async fn deliver(&self, delivery: &Delivery) -> Result<(), BoxError> {
        let reply_markup = keyboard_markup(&delivery.keyboard);
        match delivery.target {
            DeliveryTarget::NewReply { reply_to } => {
                self.send_message(&SendMessage {
                    chat_id: delivery.chat_id,
                    text: delivery.text.clone(),
                    parse_mode: Some(PARSE_MODE_MARKDOWN.to_owned()),
                    reply_to_message_id: Some(reply_to),
                    reply_markup,
                })
                .await?;
            }
            DeliveryTarget::Edit { message_id } => {
                self.edit_message_text(&EditMessageText {
                    chat_id: delivery.chat_id,
                    message_id,
                    text: delivery.text.clone(),
                    parse_mode: Some(PARSE_MODE_MARKDOWN.to_owned()),
                    reply_markup,
                })
                .await?;
            }
        }
        Ok(())
    }

    async fn acknowledge(&self, callback_query_id: &str) -> Result<(), BoxError> {
        Ok(self.answer_callback_query(callback_query_id).await?)
    }
}
