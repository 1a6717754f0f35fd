//! TOML-based application configuration.
//!
//! Stores:
//! - Working hours, lunch break and search step (`[work_calendar]`)
//! - Google Calendar target calendar and API root (`[google]`)
//!
//! Configuration is stored at `~/.config/taskslot/config.toml`.

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::data_dir;
use crate::error::ConfigError;
use crate::integrations::google::DEFAULT_BASE_URL;
use crate::scheduler::WorkCalendarConfig;

/// Working-day layout as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkCalendarSettings {
    #[serde(default = "default_work_start")]
    pub work_start: u32,
    #[serde(default = "default_work_end")]
    pub work_end: u32,
    #[serde(default = "default_lunch_start")]
    pub lunch_start: u32,
    #[serde(default = "default_lunch_end")]
    pub lunch_end: u32,
    #[serde(default = "default_search_step")]
    pub search_step_minutes: u32,
    /// Offset all working hours are local to, e.g. "+08:00".
    #[serde(default = "default_utc_offset")]
    pub utc_offset: String,
}

/// Google Calendar settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoogleSettings {
    /// Calendar new events are inserted into.
    #[serde(default = "default_calendar_id")]
    pub calendar_id: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/taskslot/config.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub work_calendar: WorkCalendarSettings,
    #[serde(default)]
    pub google: GoogleSettings,
}

// Default functions
fn default_work_start() -> u32 {
    9
}
fn default_work_end() -> u32 {
    18
}
fn default_lunch_start() -> u32 {
    12
}
fn default_lunch_end() -> u32 {
    13
}
fn default_search_step() -> u32 {
    15
}
fn default_utc_offset() -> String {
    "+00:00".into()
}
fn default_calendar_id() -> String {
    "primary".into()
}
fn default_base_url() -> String {
    DEFAULT_BASE_URL.into()
}

impl Default for WorkCalendarSettings {
    fn default() -> Self {
        Self {
            work_start: default_work_start(),
            work_end: default_work_end(),
            lunch_start: default_lunch_start(),
            lunch_end: default_lunch_end(),
            search_step_minutes: default_search_step(),
            utc_offset: default_utc_offset(),
        }
    }
}

impl Default for GoogleSettings {
    fn default() -> Self {
        Self {
            calendar_id: default_calendar_id(),
            base_url: default_base_url(),
        }
    }
}

impl WorkCalendarSettings {
    pub fn offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset.parse::<FixedOffset>().map_err(|_| {
            ConfigError::invalid(
                "work_calendar.utc_offset",
                format!("'{}' is not an offset like +08:00", self.utc_offset),
            )
        })
    }

    /// Validate into the scheduler's config.
    pub fn to_config(&self) -> Result<WorkCalendarConfig, ConfigError> {
        let config = WorkCalendarConfig::new(
            self.work_start,
            self.work_end,
            self.lunch_start,
            self.lunch_end,
            self.search_step_minutes,
        )?;
        Ok(config.with_offset(self.offset()?))
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

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
    ) -> Result<(), ConfigError> {
        let unknown = || ConfigError::invalid(key, "unknown config key");
        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(ConfigError::invalid(key, "config key is empty"));
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_none() {
                let obj = current.as_object_mut().ok_or_else(unknown)?;
                let existing = obj.get(part).ok_or_else(unknown)?;

                let new_value = match existing {
                    serde_json::Value::Number(_) => value
                        .parse::<u64>()
                        .map(|n| serde_json::Value::Number(n.into()))
                        .map_err(|_| {
                            ConfigError::invalid(key, format!("cannot parse '{value}' as number"))
                        })?,
                    serde_json::Value::Bool(_) => value
                        .parse::<bool>()
                        .map(serde_json::Value::Bool)
                        .map_err(|_| {
                            ConfigError::invalid(key, format!("cannot parse '{value}' as bool"))
                        })?,
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
    pub fn path() -> Result<PathBuf, ConfigError> {
        let dir = data_dir().map_err(|e| ConfigError::LoadFailed {
            path: PathBuf::from("~/.config/taskslot"),
            message: e.to_string(),
        })?;
        Ok(dir.join("config.toml"))
    }

    /// Load from the default location, writing defaults if no file exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load from `path`, writing defaults there if it does not exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(content) => toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
        }
    }

    /// Persist to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&Self::path()?)
    }

    /// Persist to `path`.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value in memory by dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown, the value cannot be parsed,
    /// or the resulting working calendar is invalid. On error `self` is
    /// left unchanged.
    pub fn set_value(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        let mut json =
            serde_json::to_value(&*self).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        Self::set_json_value_by_path(&mut json, key, value)?;
        let updated: Config =
            serde_json::from_value(json).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        updated.work_calendar.to_config()?;
        *self = updated;
        Ok(())
    }

    /// Set a config value and save to the default location.
    pub fn set(&mut self, key: &str, value: &str) -> Result<(), ConfigError> {
        self.set_value(key, value)?;
        self.save()
    }

    /// Validated scheduler config.
    pub fn work_calendar(&self) -> Result<WorkCalendarConfig, ConfigError> {
        self.work_calendar.to_config()
    }
}
