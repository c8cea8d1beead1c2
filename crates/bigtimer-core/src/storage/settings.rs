//! Persisted timer preferences.
//!
//! The stored shape grew over time: version 1 documents held only the focus
//! lock and display style, version 2 added the custom duration and the sound
//! toggles. Documents without a `version` field are version 1. Every field
//! has a default, so any older or partial document still loads.

use serde::{Deserialize, Deserializer, Serialize};

use crate::timer::{TimerStyle, MAX_CUSTOM_MINUTES, MIN_CUSTOM_MINUTES};

/// Current schema version of [`TimerSettings`].
pub const SETTINGS_VERSION: u32 = 2;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerSettings {
    #[serde(default = "legacy_version")]
    pub version: u32,
    #[serde(default)]
    pub focus_lock_enabled: bool,
    #[serde(default, deserialize_with = "style_from_name_or_ordinal")]
    pub style: TimerStyle,
    #[serde(default = "default_custom_minutes")]
    pub last_custom_minutes: u32,
    #[serde(default = "default_true")]
    pub sound_enabled: bool,
    #[serde(default)]
    pub sound_halfway: bool,
    #[serde(default)]
    pub sound_last_ten: bool,
}

fn legacy_version() -> u32 {
    1
}
fn default_custom_minutes() -> u32 {
    10
}
fn default_true() -> bool {
    true
}

impl Default for TimerSettings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            focus_lock_enabled: false,
            style: TimerStyle::default(),
            last_custom_minutes: default_custom_minutes(),
            sound_enabled: true,
            sound_halfway: false,
            sound_last_ten: false,
        }
    }
}

impl TimerSettings {
    /// Bring a loaded document up to [`SETTINGS_VERSION`] and clamp values
    /// into range.
    pub fn upgrade(mut self) -> Self {
        if self.version < SETTINGS_VERSION {
            tracing::info!(
                from = self.version,
                to = SETTINGS_VERSION,
                "upgrading timer settings schema"
            );
            self.version = SETTINGS_VERSION;
        } else if self.version > SETTINGS_VERSION {
            tracing::warn!(
                found = self.version,
                supported = SETTINGS_VERSION,
                "timer settings written by a newer version; unknown fields ignored"
            );
        }
        self.normalized()
    }

    pub fn normalized(mut self) -> Self {
        let clamped = self
            .last_custom_minutes
            .clamp(MIN_CUSTOM_MINUTES, MAX_CUSTOM_MINUTES);
        if clamped != self.last_custom_minutes {
            tracing::warn!(
                value = self.last_custom_minutes,
                clamped,
                "last_custom_minutes out of range"
            );
            self.last_custom_minutes = clamped;
        }
        self
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StyleRepr {
    Ordinal(u64),
    Name(String),
}

/// Accepts `"pie"`, `"PIE"` or the ordinal `1`. Unknown values fall back to
/// the default style rather than failing the whole document.
fn style_from_name_or_ordinal<'de, D>(deserializer: D) -> Result<TimerStyle, D::Error>
where
    D: Deserializer<'de>,
{
    let style = match StyleRepr::deserialize(deserializer)? {
        StyleRepr::Ordinal(n) => TimerStyle::from_ordinal(n),
        StyleRepr::Name(name) => TimerStyle::from_name(&name),
    };
    Ok(style.unwrap_or_default())
}
