//! HTTP client for the Telegram Bot API.
//!
//! Every method is `POST {base}/bot{token}/{method}` with a JSON body. The
//! `"ok"` flag of the response envelope is checked on every call and a
//! failure surfaces as [`TelegramError::Api`].

use std::fmt;
use std::time::Duration;

use cheapo_core::AppConfig;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::TelegramError;
use crate::types::{
    AnswerCallbackQuery, ApiResponse, EditMessageText, Message, SendMessage, SetWebhook,
};

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";

/// Client for the Telegram Bot API.
///
/// Use [`TelegramClient::new`] for production or
/// [`TelegramClient::with_base_url`] to point at a mock server in tests.
#[derive(Clone)]
pub struct TelegramClient {
    client: Client,
    token: String,
    base_url: Url,
}

impl fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramClient")
            .field("token", &"[redacted]")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl TelegramClient {
    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(token: &str, timeout_secs: u64) -> Result<Self, TelegramError> {
        Self::with_base_url(token, timeout_secs, DEFAULT_BASE_URL)
    }

    /// # Errors
    ///
    /// Returns [`TelegramError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`TelegramError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        token: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, TelegramError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| TelegramError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            token: token.to_owned(),
            base_url,
        })
    }

    /// # Errors
    ///
    /// See [`TelegramClient::with_base_url`].
    pub fn from_app_config(config: &AppConfig) -> Result<Self, TelegramError> {
        Self::with_base_url(
            &config.telegram_bot_token,
            config.http_timeout_secs,
            &config.telegram_api_url,
        )
    }

    /// # Errors
    ///
    /// Returns [`TelegramError`] if the request fails or the API rejects it.
    pub async fn send_message(&self, request: &SendMessage) -> Result<Message, TelegramError> {
        self.call("sendMessage", request).await
    }

    /// Edits a message's text and keyboard. An edit that changes nothing is
    /// reported by Telegram as an error; here it counts as success.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] if the request fails or the API rejects it.
    pub async fn edit_message_text(&self, request: &EditMessageText) -> Result<(), TelegramError> {
        match self
            .call::<_, serde_json::Value>("editMessageText", request)
            .await
        {
            Ok(_) => Ok(()),
            Err(e) if e.is_message_not_modified() => {
                tracing::debug!(
                    chat_id = request.chat_id,
                    message_id = request.message_id,
                    "edit left message unchanged"
                );
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// # Errors
    ///
    /// Returns [`TelegramError`] if the request fails or the API rejects it.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<(), TelegramError> {
        let request = AnswerCallbackQuery {
            callback_query_id: callback_query_id.to_owned(),
        };
        self.call::<_, bool>("answerCallbackQuery", &request)
            .await
            .map(|_| ())
    }

    /// Registers `url` as the webhook, limited to message and callback updates.
    ///
    /// # Errors
    ///
    /// Returns [`TelegramError`] if the request fails or the API rejects it.
    pub async fn set_webhook(
        &self,
        url: &str,
        secret_token: Option<&str>,
    ) -> Result<(), TelegramError> {
        let request = SetWebhook {
            url: url.to_owned(),
            secret_token: secret_token.map(str::to_owned),
            allowed_updates: vec!["message".to_owned(), "callback_query".to_owned()],
        };
        self.call::<_, bool>("setWebhook", &request)
            .await
            .map(|_| ())
    }

    fn method_url(&self, method: &str) -> Result<Url, TelegramError> {
        // The token contains a colon; without "./" it would parse as a scheme.
        self.base_url
            .join(&format!("./bot{}/{method}", self.token))
            .map_err(|e| TelegramError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })
    }

    /// Posts `body` to `method` and unwraps the response envelope.
    ///
    /// Telegram answers rejected calls with a 4xx status and an `"ok": false`
    /// envelope, so the body is decoded before the status is considered.
    async fn call<B, T>(&self, method: &str, body: &B) -> Result<T, TelegramError>
    where
        B: Serialize + Sync,
        T: DeserializeOwned,
    {
        let url = self.method_url(method)?;
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(reqwest::Error::without_url)?;
        let status = response.status();
        let text = response.text().await.map_err(reqwest::Error::without_url)?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&text) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(TelegramError::UnexpectedStatus {
                    method: method.to_owned(),
                    status: status.as_u16(),
                })
            }
            Err(e) => {
                return Err(TelegramError::Deserialize {
                    context: method.to_owned(),
                    source: e,
                })
            }
        };

        if !envelope.ok {
            return Err(TelegramError::Api {
                method: method.to_owned(),
                code: envelope
                    .error_code
                    .unwrap_or_else(|| i64::from(status.as_u16())),
                description: envelope
                    .description
                    .unwrap_or_else(|| "unknown error".to_owned()),
            });
        }

        envelope.result.ok_or_else(|| TelegramError::Deserialize {
            context: format!("{method}: missing result"),
            source: serde::de::Error::missing_field("result"),
        })
    }
}
