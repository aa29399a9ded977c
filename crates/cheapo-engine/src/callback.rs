//! Encoding and decoding of inline-keyboard callback payloads.
//!
//! Payloads are plain strings so they stay well inside Telegram's 64-byte
//! limit:
//!
//! - an integer below the radius step is a page number,
//! - an integer at or above the radius step is a new radius in meters,
//! - [`NOOP_TRIGGER`] is a button that does nothing,
//! - anything else is a source code to toggle.

use cheapo_core::NOOP_TRIGGER;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallbackAction {
    Page(usize),
    Radius(u32),
    ToggleSource(String),
    Noop,
}

impl CallbackAction {
    /// Returns `None` for empty or out-of-range numeric payloads.
    #[must_use]
    pub fn parse(data: &str, radius_step: u32) -> Option<Self> {
        let data = data.trim();
        if data.is_empty() {
            return None;
        }
        if data == NOOP_TRIGGER {
            return Some(Self::Noop);
        }
        if data.bytes().all(|b| b.is_ascii_digit()) {
            let value = data.parse::<u32>().ok()?;
            return Some(if value >= radius_step {
                Self::Radius(value)
            } else {
                Self::Page(usize::try_from(value).ok()?)
            });
        }
        Some(Self::ToggleSource(data.to_string()))
    }

    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Page(page) => page.to_string(),
            Self::Radius(meters) => meters.to_string(),
            Self::ToggleSource(code) => code.clone(),
            Self::Noop => NOOP_TRIGGER.to_string(),
        }
    }
}
