mod config;
mod settings;

pub use config::{Config, ConfigSettingsStore};
pub use settings::{TimerSettings, SETTINGS_VERSION};

use std::cell::RefCell;
use std::path::PathBuf;

use crate::error::Result;

/// Returns `<base>/bigtimer[-dev]/`, creating it if needed.
///
/// `<base>` is `$BIGTIMER_CONFIG_DIR` when set, otherwise `~/.config`.
/// Set BIGTIMER_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the config directory fails.
pub fn data_dir() -> Result<PathBuf> {
    let base_dir = match std::env::var_os("BIGTIMER_CONFIG_DIR") {
        Some(dir) => PathBuf::from(dir),
        None => dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".config"),
    };

    let env = std::env::var("BIGTIMER_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("bigtimer-dev")
    } else {
        base_dir.join("bigtimer")
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}

/// Key-value store holding the persisted [`TimerSettings`].
pub trait SettingsStore {
    /// Load the stored snapshot, upgraded to the current schema. A store with
    /// nothing saved yet returns defaults.
    fn load(&self) -> Result<TimerSettings>;
    fn save(&self, settings: &TimerSettings) -> Result<()>;
}

/// In-memory store keeping the serialized JSON document, so loads go through
/// the same schema handling as a file would.
#[derive(Debug, Default)]
pub struct MemorySettingsStore {
    document: RefCell<Option<String>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with a raw document, e.g. one written by an older
    /// version.
    pub fn with_document(json: &str) -> Self {
        Self {
            document: RefCell::new(Some(json.to_string())),
        }
    }

    pub fn document(&self) -> Option<String> {
        self.document.borrow().clone()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> Result<TimerSettings> {
        match self.document.borrow().as_deref() {
            Some(json) => {
                let settings: TimerSettings = serde_json::from_str(json)?;
                Ok(settings.upgrade())
            }
            None => Ok(TimerSettings::default()),
        }
    }

    fn save(&self, settings: &TimerSettings) -> Result<()> {
        let json = serde_json::to_string(settings)?;
        *self.document.borrow_mut() = Some(json);
        Ok(())
    }
}
