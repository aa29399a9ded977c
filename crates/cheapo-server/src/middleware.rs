use std::{fmt, sync::Arc};

use axum::{
    extract::{Request, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use cheapo_core::{AppConfig, Environment};
use serde::Serialize;
use subtle::ConstantTimeEq;
use uuid::Uuid;

/// Header Telegram echoes back with the secret given to `setWebhook`.
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Newtype wrapping a request ID string, stored as a request extension.
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Webhook secret-token settings used by middleware.
#[derive(Clone)]
pub struct WebhookAuth {
    secret: Option<Arc<str>>,
}

impl fmt::Debug for WebhookAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookAuth")
            .field("enabled", &self.secret.is_some())
            .finish()
    }
}

impl WebhookAuth {
    #[must_use]
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()).map(Arc::from),
        }
    }

    /// Configuration validation already requires a secret in production, so a
    /// missing one here only happens in development and test.
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        let auth = Self::new(config.webhook_secret.clone());
        if auth.secret.is_none() && config.env != Environment::Production {
            tracing::warn!(
                "CHEAPO_WEBHOOK_SECRET not set; webhook secret check disabled in {} environment",
                config.env
            );
        }
        auth
    }

    fn allows(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = self.secret.as_deref() else {
            return true;
        };
        headers
            .get(SECRET_TOKEN_HEADER)
            .map(HeaderValue::as_bytes)
            .is_some_and(|presented| bool::from(presented.ct_eq(expected.as_bytes())))
    }
}

#[derive(Debug, Serialize)]
struct MiddlewareErrorBody {
    error: MiddlewareError,
}

#[derive(Debug, Serialize)]
struct MiddlewareError {
    code: &'static str,
    message: &'static str,
}

impl IntoResponse for MiddlewareErrorBody {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, Json(self)).into_response()
    }
}

/// Axum middleware that extracts or generates a request ID.
///
/// If the incoming request has an `x-request-id` header, that value is used.
/// Otherwise a new `UUIDv4` is generated. The ID is:
/// - Inserted into request extensions as [`RequestId`]
/// - Set on the response as the `x-request-id` header
pub async fn request_id(mut req: Request, next: Next) -> Response {
    let id = req
        .headers()
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .map_or_else(|| Uuid::new_v4().to_string(), String::from);

    req.extensions_mut().insert(RequestId(id.clone()));

    let mut res = next.run(req).await;

    if let Ok(val) = HeaderValue::from_str(&id) {
        res.headers_mut().insert("x-request-id", val);
    }

    res
}

/// Middleware rejecting webhook calls that do not carry the configured secret.
pub async fn require_webhook_secret(
    State(auth): State<WebhookAuth>,
    req: Request,
    next: Next,
) -> Response {
    if auth.allows(req.headers()) {
        return next.run(req).await;
    }

    tracing::warn!("webhook call rejected: missing or invalid secret token");
    MiddlewareErrorBody {
        error: MiddlewareError {
            code: "unauthorized",
            message: "missing or invalid secret token",
        },
    }
    .into_response()
}
