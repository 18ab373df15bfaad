use std::path::Path;

use serde::Deserialize;

use crate::session::Settings;

/// Editor configuration loaded from `shaderbox.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub history: HistoryConfig,
    /// Initial settings of the session.
    pub settings: Settings,
}

/// Undo history behavior.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct HistoryConfig {
    /// Start with recording enabled.
    pub enabled: bool,
    /// Oldest entries are dropped past this many. Unbounded when absent.
    pub max_undo: Option<usize>,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_undo: None,
        }
    }
}

/// Parses a config from TOML text.
pub fn parse_config(content: &str) -> Result<EditorConfig, String> {
    toml::from_str(content).map_err(|e| e.to_string())
}

/// Load an editor config from a TOML file.
///
/// Returns `Err` with a human-readable message if the file cannot be read
/// or parsed.
pub fn load_config(path: &Path) -> Result<EditorConfig, String> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| format!("failed to read {}: {e}", path.display()))?;
    parse_config(&content).map_err(|e| format!("failed to parse {}: {e}", path.display()))
}

/// Load the config, falling back to defaults if the file doesn't exist or
/// is invalid.
pub fn load_or_default(path: &Path) -> EditorConfig {
    if !path.exists() {
        log::info!("No config at {}, using defaults", path.display());
        return EditorConfig::default();
    }
    match load_config(path) {
        Ok(config) => {
            log::info!(
                "Loaded config {} (history {}, max_undo {:?})",
                path.display(),
                if config.history.enabled { "on" } else { "off" },
                config.history.max_undo
            );
            config
        }
        Err(e) => {
            log::warn!("{e}, using defaults");
            EditorConfig::default()
        }
    }
}
