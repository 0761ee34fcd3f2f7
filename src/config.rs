//! Loading `docs-lint.yaml` and reading per-check settings.

use crate::types::{Config, Issue};
use serde::de::DeserializeOwned;
use std::path::Path;

pub const CONFIG_FILENAME: &str = "docs-lint.yaml";

/// A loaded configuration plus any problems found while reading it.
///
/// A malformed file never aborts the run: defaults are used and the parse
/// error is carried here so the runner can report it.
#[derive(Debug)]
pub struct LoadedConfig {
    pub config: Config,
    pub problems: Vec<Issue>,
}

/// Load configuration from `<root>/docs-lint.yaml`, falling back to defaults.
pub fn load_config(root: &Path) -> LoadedConfig {
    let path = root.join(CONFIG_FILENAME);
    let text = match std::fs::read_to_string(&path) {
        Ok(text) => text,
        Err(_) => {
            log::debug!("no {} at {}, using defaults", CONFIG_FILENAME, root.display());
            return LoadedConfig {
                config: Config::default(),
                problems: Vec::new(),
            };
        }
    };
    parse_config(&text)
}

/// Parse configuration text. Empty or null documents yield the defaults.
pub fn parse_config(text: &str) -> LoadedConfig {
    if text.trim().is_empty() {
        return LoadedConfig {
            config: Config::default(),
            problems: Vec::new(),
        };
    }
    match serde_yaml::from_str::<Option<Config>>(text) {
        Ok(config) => LoadedConfig {
            config: config.unwrap_or_default(),
            problems: Vec::new(),
        },
        Err(e) => {
            log::warn!("invalid {}: {}", CONFIG_FILENAME, e);
            let line = e.location().map(|loc| loc.line());
            LoadedConfig {
                config: Config::default(),
                problems: vec![Issue::new(
                    CONFIG_FILENAME,
                    line,
                    format!("Invalid configuration, defaults used: {}", e),
                )],
            }
        }
    }
}

impl Config {
    /// Deserialize the settings block of one check, if present and well-formed.
    pub fn check_settings<T: DeserializeOwned>(&self, check_id: &str) -> Option<T> {
        let value = self.checks.settings.get(check_id)?;
        match serde_yaml::from_value(value.clone()) {
            Ok(settings) => Some(settings),
            Err(e) => {
                log::warn!("ignoring malformed settings for {}: {}", check_id, e);
                None
            }
        }
    }

    pub fn is_disabled(&self, check_id: &str) -> bool {
        self.checks.disable.iter().any(|id| id == check_id)
    }

    pub fn is_warn_only(&self, check_id: &str) -> bool {
        self.checks.warn_only.iter().any(|id| id == check_id)
    }
}
