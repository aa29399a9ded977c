//! Trigger handling: the state machine behind every reply and keyboard press.
//!
//! A location message always starts a fresh snapshot. Callback presses reuse
//! the stored snapshot, apply one change (page, radius, or source toggle), and
//! re-render it in place. Rejected presses are acknowledged and leave both the
//! snapshot and the message untouched.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use cheapo_core::{ChatId, Coordinates, MessageId, SearchState, SourceId};

use crate::callback::CallbackAction;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::format::{format_page, FormatContext};
use crate::keyboard::{build_keyboard, Keyboard, KeyboardInput};
use crate::ports::{
    Delivery, DeliveryTarget, LocationSearch, MessagingGateway, SearchQuery, SearchResponse,
    StateStore,
};
use crate::transform::{filter_records, page_count, paginate, sort_by_distance};

#[derive(Debug, Clone, PartialEq)]
pub enum Trigger {
    Location {
        chat_id: ChatId,
        message_id: MessageId,
        center: Coordinates,
    },
    Callback {
        chat_id: ChatId,
        message_id: MessageId,
        callback_query_id: String,
        data: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// A new result message was sent.
    Replied,
    /// The pressed message was rewritten.
    Edited,
    /// Nothing changed.
    Ignored(IgnoreReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    MissingState,
    InconsistentState,
    UnrecognizedPayload,
    NoopButton,
    InvalidPage,
    RadiusOutOfRange,
    UnknownSource,
    SourceUnavailable,
    LastActiveSource,
}

impl IgnoreReason {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MissingState => "missing_state",
            Self::InconsistentState => "inconsistent_state",
            Self::UnrecognizedPayload => "unrecognized_payload",
            Self::NoopButton => "noop_button",
            Self::InvalidPage => "invalid_page",
            Self::RadiusOutOfRange => "radius_out_of_range",
            Self::UnknownSource => "unknown_source",
            Self::SourceUnavailable => "source_unavailable",
            Self::LastActiveSource => "last_active_source",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text and keyboard for one snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedView {
    pub text: String,
    pub keyboard: Keyboard,
    pub sources_present: BTreeSet<SourceId>,
    pub total_items: usize,
    pub max_page: usize,
}

/// Turns a backend response into a page-1 snapshot centred on `center`.
///
/// With `preserved_filter` the previous selection is carried over, narrowed to
/// what the new result offers. If none of it survives, every available source
/// is selected again.
#[must_use]
pub fn build_search_state(
    config: &EngineConfig,
    center: Coordinates,
    response: SearchResponse,
    preserved_filter: Option<&BTreeSet<SourceId>>,
) -> SearchState {
    let outcome = filter_records(&response.records, &config.catalog, None);
    let sources_available = outcome.sources_available;
    let locations = sort_by_distance(outcome.records, center);

    let source_filter = match preserved_filter {
        Some(previous) => {
            let kept: BTreeSet<SourceId> =
                previous.intersection(&sources_available).copied().collect();
            if kept.is_empty() {
                sources_available.clone()
            } else {
                kept
            }
        }
        None => sources_available.clone(),
    };

    SearchState {
        search_center: center,
        search_radius_meters: config.clamp_radius(response.search_radius_meters),
        source_filter,
        sources_available,
        locations,
        current_page: 1,
    }
}

/// Runs filter → sort → paginate → format over `state` and lays out its keyboard.
#[must_use]
pub fn render_state(config: &EngineConfig, state: &SearchState) -> RenderedView {
    let filtered = filter_records(&state.locations, &config.catalog, Some(&state.source_filter));
    let records = sort_by_distance(filtered.records, state.search_center);
    let page = paginate(&records, state.current_page, config.page_size);
    let max_page = page_count(records.len(), config.page_size);

    let formatted = format_page(
        &page,
        &FormatContext {
            center: state.search_center,
            radius_meters: state.search_radius_meters,
            catalog: &config.catalog,
            offer_summary_max_chars: config.offer_summary_max_chars,
        },
    );
    let keyboard = build_keyboard(
        &KeyboardInput {
            current_page: state.current_page,
            max_page,
            radius_meters: state.search_radius_meters,
            source_filter: &state.source_filter,
            sources_available: &state.sources_available,
        },
        config,
    );

    RenderedView {
        text: formatted.text,
        keyboard,
        sources_present: formatted.sources_present,
        total_items: page.total_items,
        max_page,
    }
}

/// Applies triggers against the stored snapshots and delivers the result.
pub struct Controller {
    config: EngineConfig,
    search: Arc<dyn LocationSearch>,
    store: Arc<dyn StateStore>,
    gateway: Arc<dyn MessagingGateway>,
}

impl Controller {
    #[must_use]
    pub fn new(
        config: EngineConfig,
        search: Arc<dyn LocationSearch>,
        store: Arc<dyn StateStore>,
        gateway: Arc<dyn MessagingGateway>,
    ) -> Self {
        Self {
            config,
            search,
            store,
            gateway,
        }
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Handles one trigger end to end.
    ///
    /// Callback queries are acknowledged after the change is applied, whether
    /// it succeeded, was ignored, or failed. A failed acknowledgement is logged
    /// and does not change the returned outcome.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError`] if the search backend, the state store, or the
    /// messaging gateway fails while applying the trigger.
    pub async fn handle(&self, trigger: Trigger) -> Result<Outcome, EngineError> {
        match trigger {
            Trigger::Location {
                chat_id,
                message_id,
                center,
            } => self.on_location(chat_id, message_id, center).await,
            Trigger::Callback {
                chat_id,
                message_id,
                callback_query_id,
                data,
            } => {
                let result = self.on_callback(chat_id, message_id, &data).await;
                if let Err(e) = self.gateway.acknowledge(&callback_query_id).await {
                    tracing::warn!(
                        chat_id,
                        callback_query_id = %callback_query_id,
                        error = %e,
                        "failed to acknowledge callback query"
                    );
                }
                result
            }
        }
    }

    async fn on_location(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        center: Coordinates,
    ) -> Result<Outcome, EngineError> {
        let response = self
            .search
            .search(&SearchQuery {
                center,
                radius_meters: None,
            })
            .await
            .map_err(EngineError::Search)?;
        let state = build_search_state(&self.config, center, response, None);
        tracing::info!(
            chat_id,
            radius_meters = state.search_radius_meters,
            total_items = state.locations.len(),
            "new search"
        );

        self.persist_and_deliver(chat_id, &state, DeliveryTarget::NewReply { reply_to: message_id })
            .await?;
        Ok(Outcome::Replied)
    }

    async fn on_callback(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        data: &str,
    ) -> Result<Outcome, EngineError> {
        let Some(action) = CallbackAction::parse(data, self.config.radius_step) else {
            return Ok(ignored(chat_id, IgnoreReason::UnrecognizedPayload));
        };
        if action == CallbackAction::Noop {
            return Ok(ignored(chat_id, IgnoreReason::NoopButton));
        }

        let Some(mut state) = self.store.get(chat_id).await.map_err(EngineError::Store)? else {
            return Ok(ignored(chat_id, IgnoreReason::MissingState));
        };
        if !state.is_consistent() {
            return Ok(ignored(chat_id, IgnoreReason::InconsistentState));
        }

        let next = match action {
            CallbackAction::Noop => return Ok(ignored(chat_id, IgnoreReason::NoopButton)),
            CallbackAction::Page(0) => return Ok(ignored(chat_id, IgnoreReason::InvalidPage)),
            CallbackAction::Page(page) => {
                tracing::debug!(chat_id, page, "page navigation");
                state.current_page = page;
                state
            }
            CallbackAction::Radius(radius) => {
                if !self.config.radius_in_bounds(radius) {
                    return Ok(ignored(chat_id, IgnoreReason::RadiusOutOfRange));
                }
                let response = self
                    .search
                    .search(&SearchQuery {
                        center: state.search_center,
                        radius_meters: Some(radius),
                    })
                    .await
                    .map_err(EngineError::Search)?;
                let next = build_search_state(
                    &self.config,
                    state.search_center,
                    response,
                    Some(&state.source_filter),
                );
                tracing::info!(
                    chat_id,
                    radius_meters = next.search_radius_meters,
                    total_items = next.locations.len(),
                    "radius changed"
                );
                next
            }
            CallbackAction::ToggleSource(code) => {
                let Some(source) = self.config.catalog.by_code(&code) else {
                    return Ok(ignored(chat_id, IgnoreReason::UnknownSource));
                };
                let id = source.id;
                if !state.sources_available.contains(&id) {
                    return Ok(ignored(chat_id, IgnoreReason::SourceUnavailable));
                }
                if state.source_filter.contains(&id) {
                    if state.source_filter.len() == 1 {
                        return Ok(ignored(chat_id, IgnoreReason::LastActiveSource));
                    }
                    state.source_filter.remove(&id);
                } else {
                    state.source_filter.insert(id);
                }
                tracing::debug!(chat_id, source = %code, "source toggled");
                state.current_page = 1;
                state
            }
        };

        self.persist_and_deliver(chat_id, &next, DeliveryTarget::Edit { message_id })
            .await?;
        Ok(Outcome::Edited)
    }

    async fn persist_and_deliver(
        &self,
        chat_id: ChatId,
        state: &SearchState,
        target: DeliveryTarget,
    ) -> Result<(), EngineError> {
        self.store
            .put(chat_id, state)
            .await
            .map_err(EngineError::Store)?;

        let view = render_state(&self.config, state);
        self.gateway
            .deliver(&Delivery {
                chat_id,
                target,
                text: view.text,
                keyboard: view.keyboard,
            })
            .await
            .map_err(EngineError::Gateway)
    }
}

fn ignored(chat_id: ChatId, reason: IgnoreReason) -> Outcome {
    tracing::debug!(chat_id, reason = %reason, "callback ignored");
    Outcome::Ignored(reason)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::NO_RESULTS_TEXT;
    use crate::test_support::{merchant, with_category, CENTER};

    fn response(records: Vec<cheapo_core::MerchantRecord>, radius: u32) -> SearchResponse {
        SearchResponse {
            records,
            search_radius_meters: radius,
        }
    }

    #[test]
    fn fresh_state_selects_every_available_source() {
        let config = EngineConfig::default();
        let state = build_search_state(
            &config,
            CENTER,
            response(
                vec![
                    merchant("b", 2, 300.0),
                    merchant("a", 1, 100.0),
                    with_category(merchant("x", 3, 50.0), 9),
                ],
                500,
            ),
            None,
        );

        assert_eq!(state.current_page, 1);
        assert_eq!(state.search_radius_meters, 500);
        assert_eq!(
            state.sources_available,
            BTreeSet::from([SourceId(1), SourceId(2)])
        );
        assert_eq!(state.source_filter, state.sources_available);
        let ids: Vec<&str> = state.locations.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert!(state.is_consistent());
    }

    #[test]
    fn preserved_filter_is_intersected_with_new_sources() {
        let config = EngineConfig::default();
        let previous = BTreeSet::from([SourceId(1), SourceId(3)]);
        let state = build_search_state(
            &config,
            CENTER,
            response(vec![merchant("a", 1, 100.0), merchant("b", 2, 200.0)], 750),
            Some(&previous),
        );
        assert_eq!(state.source_filter, BTreeSet::from([SourceId(1)]));
        assert!(state.is_consistent());
    }

    #[test]
    fn empty_intersection_falls_back_to_all_available() {
        let config = EngineConfig::default();
        let previous = BTreeSet::from([SourceId(3)]);
        let state = build_search_state(
            &config,
            CENTER,
            response(vec![merchant("a", 1, 100.0), merchant("b", 2, 200.0)], 750),
            Some(&previous),
        );
        assert_eq!(state.source_filter, BTreeSet::from([SourceId(1), SourceId(2)]));
    }

    #[test]
    fn backend_radius_is_clamped() {
        let config = EngineConfig::default();
        let state = build_search_state(&config, CENTER, response(Vec::new(), 40_000), None);
        assert_eq!(state.search_radius_meters, config.max_radius);
    }

    #[test]
    fn render_of_empty_state_has_no_keyboard() {
        let config = EngineConfig::default();
        let state = build_search_state(&config, CENTER, response(Vec::new(), 500), None);
        let view = render_state(&config, &state);
        assert_eq!(view.text, NO_RESULTS_TEXT);
        assert!(view.keyboard.is_empty());
        assert!(view.sources_present.is_empty());
        assert_eq!(view.total_items, 0);
        assert_eq!(view.max_page, 0);
    }

    #[test]
    fn render_hides_filtered_out_sources() {
        let config = EngineConfig::default();
        let mut state = build_search_state(
            &config,
            CENTER,
            response(vec![merchant("a", 1, 100.0), merchant("b", 2, 200.0)], 500),
            None,
        );
        state.source_filter = BTreeSet::from([SourceId(2)]);
        let view = render_state(&config, &state);
        assert_eq!(view.total_items, 1);
        assert_eq!(view.sources_present, BTreeSet::from([SourceId(2)]));
        assert!(view.text.contains("Merchant b"));
        assert!(!view.text.contains("Merchant a"));
    }

    #[test]
    fn ignore_reasons_render_as_snake_case() {
        assert_eq!(IgnoreReason::LastActiveSource.to_string(), "last_active_source");
        assert_eq!(IgnoreReason::MissingState.as_str(), "missing_state");
    }
}
