//! Database operations for the `conversation_states` table.
//!
//! Each chat holds exactly one JSONB snapshot. Writes replace it wholesale, so
//! concurrent triggers on the same chat resolve as last writer wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use cheapo_core::{ChatId, SearchState};
use cheapo_engine::{BoxError, StateStore};
use sqlx::PgPool;

use crate::DbError;

/// A row from the `conversation_states` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ConversationStateRow {
    pub chat_id: i64,
    pub state: serde_json::Value,
    pub updated_at: DateTime<Utc>,
}

/// Returns the raw row for `chat_id`, or `None` if the chat has no snapshot.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_conversation_state_row(
    pool: &PgPool,
    chat_id: ChatId,
) -> Result<Option<ConversationStateRow>, DbError> {
    let row = sqlx::query_as::<_, ConversationStateRow>(
        "SELECT chat_id, state, updated_at FROM conversation_states WHERE chat_id = $1",
    )
    .bind(chat_id)
    .fetch_optional(pool)
    .await?;

    Ok(row)
}

/// Returns the decoded snapshot for `chat_id`.
///
/// A stored value that no longer decodes (for example after a format change)
/// is logged and treated as absent.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn get_conversation_state(
    pool: &PgPool,
    chat_id: ChatId,
) -> Result<Option<SearchState>, DbError> {
    let Some(row) = get_conversation_state_row(pool, chat_id).await? else {
        return Ok(None);
    };

    match serde_json::from_value::<SearchState>(row.state) {
        Ok(state) => Ok(Some(state)),
        Err(e) => {
            tracing::warn!(
                chat_id,
                updated_at = %row.updated_at,
                error = %e,
                "stored conversation state does not decode; treating as absent"
            );
            Ok(None)
        }
    }
}

/// Inserts or replaces the snapshot for `chat_id`.
///
/// # Errors
///
/// Returns [`DbError::Encode`] if the state cannot be serialized, or
/// [`DbError::Sqlx`] if the query fails.
pub async fn put_conversation_state(
    pool: &PgPool,
    chat_id: ChatId,
    state: &SearchState,
) -> Result<(), DbError> {
    let value = serde_json::to_value(state).map_err(DbError::Encode)?;

    sqlx::query(
        "INSERT INTO conversation_states (chat_id, state, updated_at) \
         VALUES ($1, $2, NOW()) \
         ON CONFLICT (chat_id) DO UPDATE \
         SET state = EXCLUDED.state, updated_at = NOW()",
    )
    .bind(chat_id)
    .bind(value)
    .execute(pool)
    .await?;

    Ok(())
}

/// Deletes the snapshot for `chat_id`. Returns `true` if a row was removed.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails.
pub async fn delete_conversation_state(pool: &PgPool, chat_id: ChatId) -> Result<bool, DbError> {
    let result = sqlx::query("DELETE FROM conversation_states WHERE chat_id = $1")
        .bind(chat_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// [`StateStore`] backed by the `conversation_states` table.
#[derive(Debug, Clone)]
pub struct PgStateStore {
    pool: PgPool,
}

impl PgStateStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl StateStore for PgStateStore {
    async fn get(&self, chat_id: ChatId) -> Result<Option<SearchState>, BoxError> {
        Ok(get_conversation_state(&self.pool, chat_id).await?)
    }

    async fn put(&self, chat_id: ChatId, state: &SearchState) -> Result<(), BoxError> {
        Ok(put_conversation_state(&self.pool, chat_id, state).await?)
    }
}
