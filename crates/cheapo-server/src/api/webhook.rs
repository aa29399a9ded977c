//! Telegram webhook: decodes an update, decides what it is, and dispatches it.
//!
//! Telegram redelivers any update that does not get a 2xx, so the handler
//! answers 200 even when decoding or processing fails and logs instead.

use std::collections::HashSet;

use axum::{body::Bytes, extract::State, http::StatusCode, Extension};
use cheapo_core::Coordinates;
use cheapo_engine::Trigger;
use cheapo_telegram::types::SendMessage;
use cheapo_telegram::{Message, Update};

use super::AppState;
use crate::middleware::RequestId;

pub(crate) const GREETING_TEXT: &str = "Hello I am Cheapo! Reply this message to talk to me!";

/// Who may talk to the bot.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    pub approved_users: HashSet<i64>,
    /// When set, replies to messages written by anyone else are ignored.
    pub bot_user_id: Option<i64>,
}

impl AccessPolicy {
    fn is_approved(&self, user_id: i64) -> bool {
        self.approved_users.contains(&user_id)
    }
}

/// What an update asks for.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Route {
    Engine(Trigger),
    Reply(Box<SendMessage>),
    /// A callback the engine cannot act on; answered so the button stops spinning.
    Acknowledge {
        callback_query_id: String,
        reason: &'static str,
    },
    Ignore(&'static str),
}

pub(crate) fn route_update(update: Update, access: &AccessPolicy) -> Route {
    if let Some(query) = update.callback_query {
        let Some(message) = query.message else {
            return Route::Acknowledge {
                callback_query_id: query.id,
                reason: "callback without message",
            };
        };
        let Some(data) = query.data else {
            return Route::Acknowledge {
                callback_query_id: query.id,
                reason: "callback without data",
            };
        };
        return Route::Engine(Trigger::Callback {
            chat_id: message.chat.id,
            message_id: message.message_id,
            callback_query_id: query.id,
            data,
        });
    }

    let Some(message) = update.message else {
        return Route::Ignore("no message");
    };
    route_message(message, access)
}

fn route_message(message: Message, access: &AccessPolicy) -> Route {
    if let (Some(bot_id), Some(replied)) = (access.bot_user_id, &message.reply_to_message) {
        if replied.from.as_ref().map(|u| u.id) != Some(bot_id) {
            return Route::Ignore("reply to another user");
        }
    }

    let Some(sender) = message.from else {
        return Route::Ignore("no sender");
    };

    if !access.is_approved(sender.id) {
        let asks_for_id = message
            .text
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains("get id"));
        if asks_for_id {
            return Route::Reply(Box::new(SendMessage::plain(
                sender.id,
                format!("Your details are:\n{}\n{}", sender.id, sender.first_name),
            )));
        }
        return Route::Ignore("sender not approved");
    }

    if message.chat.kind.is_group()
        && message
            .text
            .as_deref()
            .is_some_and(|t| t.trim().eq_ignore_ascii_case("/hello"))
    {
        return Route::Reply(Box::new(
            SendMessage::plain(message.chat.id, GREETING_TEXT).reply_to(message.message_id),
        ));
    }

    if let Some(location) = message.location {
        return Route::Engine(Trigger::Location {
            chat_id: message.chat.id,
            message_id: message.message_id,
            center: Coordinates::new(location.latitude, location.longitude),
        });
    }

    Route::Ignore("message without location")
}

pub(super) async fn receive_update(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    body: Bytes,
) -> StatusCode {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            tracing::warn!(request_id = %req_id.0, error = %e, "ignoring undecodable update");
            return StatusCode::OK;
        }
    };
    let update_id = update.update_id;

    match route_update(update, &state.access) {
        Route::Engine(trigger) => match state.controller.handle(trigger).await {
            Ok(outcome) => {
                tracing::debug!(request_id = %req_id.0, update_id, ?outcome, "update handled");
            }
            Err(e) => {
                tracing::error!(request_id = %req_id.0, update_id, error = %e, "update failed");
            }
        },
        Route::Reply(message) => {
            if let Err(e) = state.telegram.send_message(&message).await {
                tracing::error!(request_id = %req_id.0, update_id, error = %e, "reply failed");
            }
        }
        Route::Acknowledge {
            callback_query_id,
            reason,
        } => {
            tracing::debug!(request_id = %req_id.0, update_id, reason, "callback acknowledged only");
            if let Err(e) = state.telegram.answer_callback_query(&callback_query_id).await {
                tracing::warn!(request_id = %req_id.0, update_id, error = %e, "callback ack failed");
            }
        }
        Route::Ignore(reason) => {
            tracing::debug!(request_id = %req_id.0, update_id, reason, "update ignored");
        }
    }

    StatusCode::OK
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn policy() -> AccessPolicy {
        AccessPolicy {
            approved_users: HashSet::from([7]),
            bot_user_id: Some(99),
        }
    }

    fn update(value: serde_json::Value) -> Update {
        serde_json::from_value(value).expect("valid update")
    }

    fn message(from: i64, chat_type: &str, extra: serde_json::Value) -> serde_json::Value {
        let chat_id = if chat_type == "private" { from } else { -100 };
        let mut msg = json!({
            "message_id": 20,
            "from": {"id": from, "first_name": "Ada"},
            "chat": {"id": chat_id, "type": chat_type}
        });
        if let (Some(obj), Some(extra)) = (msg.as_object_mut(), extra.as_object()) {
            obj.extend(extra.clone());
        }
        json!({"update_id": 1, "message": msg})
    }

    #[test]
    fn callback_routes_to_engine_without_allow_list() {
        let route = route_update(
            update(json!({
                "update_id": 1,
                "callback_query": {
                    "id": "cbq",
                    "from": {"id": 12345, "first_name": "Stranger"},
                    "message": {"message_id": 21, "chat": {"id": -100, "type": "group"}},
                    "data": "2"
                }
            })),
            &policy(),
        );
        assert_eq!(
            route,
            Route::Engine(Trigger::Callback {
                chat_id: -100,
                message_id: 21,
                callback_query_id: "cbq".to_string(),
                data: "2".to_string(),
            })
        );
    }

    #[test]
    fn approved_location_routes_to_engine() {
        let route = route_update(
            update(message(
                7,
                "private",
                json!({"location": {"latitude": 1.3, "longitude": 103.8}}),
            )),
            &policy(),
        );
        assert_eq!(
            route,
            Route::Engine(Trigger::Location {
                chat_id: 7,
                message_id: 20,
                center: Coordinates::new(1.3, 103.8),
            })
        );
    }

    #[test]
    fn reply_to_someone_else_is_ignored() {
        let route = route_update(
            update(message(
                7,
                "group",
                json!({
                    "location": {"latitude": 1.3, "longitude": 103.8},
                    "reply_to_message": {
                        "message_id": 5,
                        "from": {"id": 8, "first_name": "Bob"},
                        "chat": {"id": -100, "type": "group"}
                    }
                }),
            )),
            &policy(),
        );
        assert_eq!(route, Route::Ignore("reply to another user"));
    }

    #[test]
    fn reply_to_bot_is_processed() {
        let route = route_update(
            update(message(
                7,
                "group",
                json!({
                    "location": {"latitude": 1.3, "longitude": 103.8},
                    "reply_to_message": {
                        "message_id": 5,
                        "from": {"id": 99, "is_bot": true, "first_name": "Cheapo"},
                        "chat": {"id": -100, "type": "group"}
                    }
                }),
            )),
            &policy(),
        );
        assert!(matches!(route, Route::Engine(Trigger::Location { chat_id: -100, .. })));
    }

    #[test]
    fn unapproved_get_id_gets_private_details() {
        let route = route_update(
            update(message(555, "group", json!({"text": "Please GET ID"}))),
            &policy(),
        );
        let Route::Reply(reply) = route else {
            panic!("expected reply, got {route:?}");
        };
        assert_eq!(reply.chat_id, 555);
        assert_eq!(reply.text, "Your details are:\n555\nAda");
        assert!(reply.reply_to_message_id.is_none());
    }

    #[test]
    fn unapproved_location_is_ignored() {
        let route = route_update(
            update(message(
                555,
                "private",
                json!({"location": {"latitude": 1.3, "longitude": 103.8}}),
            )),
            &policy(),
        );
        assert_eq!(route, Route::Ignore("sender not approved"));
    }

    #[test]
    fn hello_in_group_gets_greeting() {
        let route = route_update(
            update(message(7, "supergroup", json!({"text": "/Hello"}))),
            &policy(),
        );
        let Route::Reply(reply) = route else {
            panic!("expected reply, got {route:?}");
        };
        assert_eq!(reply.chat_id, -100);
        assert_eq!(reply.text, GREETING_TEXT);
        assert_eq!(reply.reply_to_message_id, Some(20));
    }

    #[test]
    fn hello_in_private_chat_is_ignored() {
        let route = route_update(
            update(message(7, "private", json!({"text": "/hello"}))),
            &policy(),
        );
        assert_eq!(route, Route::Ignore("message without location"));
    }

    #[test]
    fn group_text_without_location_is_ignored() {
        let route = route_update(
            update(message(7, "group", json!({"text": "anyone hungry?"}))),
            &policy(),
        );
        assert_eq!(route, Route::Ignore("message without location"));
    }

    #[test]
    fn inline_callback_without_message_is_still_acknowledged() {
        let route = route_update(
            update(json!({
                "update_id": 1,
                "callback_query": {
                    "id": "cbq-inline",
                    "from": {"id": 7, "first_name": "Ada"},
                    "inline_message_id": "AAQ123",
                    "data": "2"
                }
            })),
            &policy(),
        );
        assert_eq!(
            route,
            Route::Acknowledge {
                callback_query_id: "cbq-inline".to_string(),
                reason: "callback without message",
            }
        );
    }

    #[test]
    fn callback_without_data_is_still_acknowledged() {
        let route = route_update(
            update(json!({
                "update_id": 1,
                "callback_query": {
                    "id": "cbq-empty",
                    "from": {"id": 7, "first_name": "Ada"},
                    "message": {"message_id": 21, "chat": {"id": 7, "type": "private"}}
                }
            })),
            &policy(),
        );
        assert!(matches!(
            route,
            Route::Acknowledge { ref callback_query_id, .. } if callback_query_id == "cbq-empty"
        ));
    }
}
