//! TOML-based application configuration.
//!
//! Stores:
//! - Timer preferences (`[timer]`, see [`TimerSettings`])
//! - One-tap preset durations
//! - Routine scheduling knobs (tick rate, step hand-off delay, countdown mode)
//! - Saved routines (`[[routines]]`)
//!
//! Configuration is stored at `~/.config/bigtimer/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::settings::TimerSettings;
use super::{data_dir, SettingsStore};
use crate::error::{ConfigError, CoreError, Result, ValidationError};
use crate::routine::{Routine, StepCountdown};

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/bigtimer/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Preset durations in minutes, offered as one-tap shortcuts.
    #[serde(default = "default_presets")]
    pub presets: Vec<u32>,
    /// Pause between a finished step and the next one.
    #[serde(default = "default_advance_delay")]
    pub routine_advance_delay_secs: u64,
    #[serde(default = "default_tick_interval")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_routine_countdown")]
    pub routine_countdown: StepCountdown,
    #[serde(default)]
    pub timer: TimerSettings,
    #[serde(default)]
    pub routines: Vec<Routine>,
}

// Default functions
fn default_presets() -> Vec<u32> {
    vec![1, 2, 5, 10, 15, 20, 30, 45, 60, 90, 120]
}
fn default_advance_delay() -> u64 {
    2
}
fn default_tick_interval() -> u64 {
    250
}
fn default_routine_countdown() -> StepCountdown {
    StepCountdown::Elapsed
}

impl Default for Config {
    fn default() -> Self {
        Self {
            presets: default_presets(),
            routine_advance_delay_secs: default_advance_delay(),
            tick_interval_ms: default_tick_interval(),
            routine_countdown: default_routine_countdown(),
            timer: TimerSettings::default(),
            routines: Vec::new(),
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(root: &mut serde_json::Value, key: &str, value: &str) -> Result<()> {
        let unknown = || CoreError::from(ConfigError::UnknownKey(key.to_string()));
        let invalid = |message: String| {
            CoreError::from(ConfigError::InvalidValue {
                key: key.to_string(),
                message,
            })
        };

        let mut parts = key.split('.').peekable();
        if key.is_empty() {
            return Err(unknown());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            let is_leaf = parts.peek().is_none();
            if is_leaf {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Bool(_) => serde_json::Value::Bool(
                        value
                            .parse::<bool>()
                            .map_err(|e| invalid(e.to_string()))?,
                    ),
                    serde_json::Value::Number(_) => {
                        if let Ok(n) = value.parse::<u64>() {
                            serde_json::Value::Number(n.into())
                        } else if let Ok(n) = value.parse::<f64>() {
                            serde_json::Number::from_f64(n)
                                .map(serde_json::Value::Number)
                                .ok_or_else(|| invalid(format!("cannot parse '{value}' as number")))?
                        } else {
                            return Err(invalid(format!("cannot parse '{value}' as number")));
                        }
                    }
                    serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                        serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                    }
                    _ => serde_json::Value::String(value.into()),
                };

                obj.insert(part.to_string(), new_value);
                return Ok(());
            }

            current = current.get_mut(part).ok_or_else(unknown)?;
        }

        Err(unknown())
    }

    /// Default location of the config file.
    pub fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the default location, writing defaults there if the file
    /// does not exist yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        let path = Self::path()?;
        if !path.exists() {
            let cfg = Self::default();
            cfg.save_to(&path)?;
            return Ok(cfg);
        }
        Self::load_from(&path)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                }
                .into())
            }
        };
        let mut cfg: Config = toml::from_str(&content)?;
        cfg.timer = cfg.timer.upgrade();
        cfg.routines = std::mem::take(&mut cfg.routines)
            .into_iter()
            .filter_map(|routine| {
                if routine.is_runnable() {
                    Some(routine.normalized())
                } else {
                    tracing::warn!(routine = %routine.name, "dropping saved routine without steps");
                    None
                }
            })
            .collect();
        Ok(cfg)
    }

    /// Persist to the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(())
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Get a config value as string by dot-separated key, e.g. `timer.style`.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key, keeping the existing value's
    /// type. Does not write to disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value cannot be parsed
    /// as the key's type.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let mut updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.timer = updated.timer.normalized();
        *self = updated;
        Ok(())
    }

    /// Find a routine by id, or by name ignoring case.
    pub fn find_routine(&self, key: &str) -> Option<&Routine> {
        self.routines
            .iter()
            .find(|r| r.id == key)
            .or_else(|| self.routines.iter().find(|r| r.name.eq_ignore_ascii_case(key)))
    }

    /// Add a routine, replacing any saved routine with the same id.
    ///
    /// # Errors
    ///
    /// Routines without steps are rejected.
    pub fn upsert_routine(&mut self, routine: Routine) -> Result<()> {
        if !routine.is_runnable() {
            return Err(ValidationError::EmptyRoutine(routine.name).into());
        }
        match self.routines.iter_mut().find(|r| r.id == routine.id) {
            Some(existing) => *existing = routine,
            None => self.routines.push(routine),
        }
        Ok(())
    }

    pub fn remove_routine(&mut self, key: &str) -> Result<Routine> {
        let id = self
            .find_routine(key)
            .map(|r| r.id.clone())
            .ok_or_else(|| ValidationError::UnknownRoutine(key.to_string()))?;
        let index = self
            .routines
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| ValidationError::UnknownRoutine(key.to_string()))?;
        Ok(self.routines.remove(index))
    }
}

/// [`SettingsStore`] backed by the `[timer]` table of a config file. Other
/// tables in the file are left as they are.
#[derive(Debug, Clone)]
pub struct ConfigSettingsStore {
    path: PathBuf,
}

impl ConfigSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Store at the default config location.
    pub fn open_default() -> Result<Self> {
        Ok(Self::new(Config::path()?))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for ConfigSettingsStore {
    fn load(&self) -> Result<TimerSettings> {
        Ok(Config::load_from(&self.path)?.timer)
    }

    fn save(&self, settings: &TimerSettings) -> Result<()> {
        let mut cfg = Config::load_from(&self.path)?;
        cfg.timer = settings.clone();
        cfg.save_to(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routine::RoutineStep;
    use crate::timer::TimerStyle;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
    }

    #[test]
    fn config_with_routines_roundtrip() {
        let mut cfg = Config::default();
        cfg.upsert_routine(Routine::new(
            "Bedtime",
            Some("🌙"),
            vec![RoutineStep::new(5, Some("Bath")), RoutineStep::new(10, None)],
        ))
        .unwrap();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        assert!(toml_str.contains("[[routines]]"));
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.routines, cfg.routines);
    }

    #[test]
    fn partial_document_fills_defaults() {
        let cfg: Config = toml::from_str("tick_interval_ms = 100\n").unwrap();
        assert_eq!(cfg.tick_interval_ms, 100);
        assert_eq!(cfg.presets, default_presets());
        assert_eq!(cfg.routine_advance_delay_secs, 2);
        assert_eq!(cfg.routine_countdown, StepCountdown::Elapsed);
        assert!(cfg.routines.is_empty());
    }

    #[test]
    fn get_supports_dot_path_keys() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.style").as_deref(), Some("numbers"));
        assert_eq!(cfg.get("timer.sound_enabled").as_deref(), Some("true"));
        assert_eq!(cfg.get("routine_advance_delay_secs").as_deref(), Some("2"));
        assert!(cfg.get("timer.missing_key").is_none());
        assert!(cfg.get("").is_none());
    }

    #[test]
    fn set_updates_nested_values() {
        let mut cfg = Config::default();
        cfg.set("timer.sound_halfway", "true").unwrap();
        cfg.set("timer.style", "pie").unwrap();
        cfg.set("timer.last_custom_minutes", "25").unwrap();
        cfg.set("presets", "[3, 6, 9]").unwrap();
        assert!(cfg.timer.sound_halfway);
        assert_eq!(cfg.timer.style, TimerStyle::Pie);
        assert_eq!(cfg.timer.last_custom_minutes, 25);
        assert_eq!(cfg.presets, vec![3, 6, 9]);
    }

    #[test]
    fn set_clamps_custom_minutes() {
        let mut cfg = Config::default();
        cfg.set("timer.last_custom_minutes", "999").unwrap();
        assert_eq!(cfg.timer.last_custom_minutes, 180);
    }

    #[test]
    fn set_rejects_unknown_key() {
        let mut cfg = Config::default();
        let result = cfg.set("timer.nonexistent_key", "value");
        assert!(matches!(
            result,
            Err(CoreError::Config(ConfigError::UnknownKey(_)))
        ));
    }

    #[test]
    fn set_rejects_invalid_type() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.focus_lock_enabled", "not_a_bool").is_err());
        assert!(cfg.set("tick_interval_ms", "fast").is_err());
        assert!(cfg.set("routine_countdown", "sometimes").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn routine_lookup_and_removal() {
        let mut cfg = Config::default();
        let routine = Routine::new("Morning", None, vec![RoutineStep::new(3, None)]);
        let id = routine.id.clone();
        cfg.upsert_routine(routine).unwrap();
        assert!(cfg.find_routine("morning").is_some());
        assert!(cfg.find_routine(&id).is_some());
        assert!(cfg.find_routine("evening").is_none());

        let removed = cfg.remove_routine("MORNING").unwrap();
        assert_eq!(removed.id, id);
        assert!(cfg.routines.is_empty());
        assert!(cfg.remove_routine("morning").is_err());
    }

    #[test]
    fn upsert_replaces_by_id_and_rejects_empty() {
        let mut cfg = Config::default();
        let mut routine = Routine::new("School", None, vec![RoutineStep::new(3, None)]);
        cfg.upsert_routine(routine.clone()).unwrap();
        routine.steps.push(RoutineStep::new(4, None));
        cfg.upsert_routine(routine).unwrap();
        assert_eq!(cfg.routines.len(), 1);
        assert_eq!(cfg.routines[0].total_minutes(), 7);

        let empty = Routine::new("Empty", None, vec![]);
        assert!(cfg.upsert_routine(empty).is_err());
    }
}
