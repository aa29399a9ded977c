use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use cheapo_core::{ChatId, SearchState};

use crate::error::BoxError;
use crate::ports::StateStore;

/// Process-local [`StateStore`] used by tests and the CLI preview.
#[derive(Debug, Default)]
pub struct MemoryStateStore {
    states: Mutex<HashMap<ChatId, SearchState>>,
}

impl MemoryStateStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of conversations with a stored snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the lock was poisoned.
    pub fn conversation_count(&self) -> Result<usize, BoxError> {
        Ok(self.lock()?.len())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<ChatId, SearchState>>, BoxError> {
        self.states
            .lock()
            .map_err(|_| "conversation state lock poisoned".into())
    }
}

#[async_trait]
impl StateStore for MemoryStateStore {
    async fn get(&self, chat_id: ChatId) -> Result<Option<SearchState>, BoxError> {
        Ok(self.lock()?.get(&chat_id).cloned())
    }

    async fn put(&self, chat_id: ChatId, state: &SearchState) -> Result<(), BoxError> {
        self.lock()?.insert(chat_id, state.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::test_support::CENTER;

    fn state(page: usize) -> SearchState {
        SearchState {
            search_center: CENTER,
            search_radius_meters: 500,
            source_filter: BTreeSet::new(),
            sources_available: BTreeSet::new(),
            locations: Vec::new(),
            current_page: page,
        }
    }

    #[tokio::test]
    async fn put_then_get_returns_latest_snapshot() {
        let store = MemoryStateStore::new();
        assert!(store.get(7).await.unwrap().is_none());

        store.put(7, &state(1)).await.unwrap();
        store.put(7, &state(2)).await.unwrap();

        assert_eq!(store.get(7).await.unwrap().unwrap().current_page, 2);
        assert!(store.get(8).await.unwrap().is_none());
        assert_eq!(store.conversation_count().unwrap(), 1);
    }
}
