use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::AshResult;
use crate::shelf::{Alignment, AutoHideBehavior, AUTO_HIDE_SIZE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub shelf: ShelfConfig,
    pub extensions: ExtensionsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShelfConfig {
    pub alignment: Alignment,
    pub auto_hide_behavior: AutoHideBehavior,
    /// Strip left on screen while auto-hidden, in pixels.
    pub auto_hide_size: i32,
    /// Thickness of the edge strip that reveals an auto-hidden shelf.
    pub hover_thickness: i32,
    pub auto_hide_delay_ms: u64,
    pub animation_duration_ms: u64,
    pub background_alpha: u8,
    pub background_duration_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtensionsConfig {
    /// Functions (or whole namespaces) callable outside blessed contexts.
    pub unprivileged_functions: Vec<String>,
    /// Namespaces every extension may call without declaring a permission.
    pub implicit_permissions: Vec<String>,
    /// Drop contexts whose frame is gone before broadcasting.
    pub sweep_detached_on_dispatch: bool,
}

#[allow(clippy::derivable_impls)]
impl Default for Config {
    fn default() -> Self {
        Self {
            shelf: ShelfConfig::default(),
            extensions: ExtensionsConfig::default(),
        }
    }
}

impl Default for ShelfConfig {
    fn default() -> Self {
        Self {
            alignment: Alignment::Bottom,
            auto_hide_behavior: AutoHideBehavior::Default,
            auto_hide_size: AUTO_HIDE_SIZE,
            hover_thickness: AUTO_HIDE_SIZE,
            auto_hide_delay_ms: 200,
            animation_duration_ms: 200,
            background_alpha: 128,
            background_duration_ms: 200,
        }
    }
}

impl Default for ExtensionsConfig {
    fn default() -> Self {
        Self {
            unprivileged_functions: [
                "extension",
                "i18n",
                "runtime.sendMessage",
                "runtime.connect",
                "runtime.getURL",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            implicit_permissions: ["extension", "i18n", "runtime"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            sweep_detached_on_dispatch: true,
        }
    }
}

impl ShelfConfig {
    pub fn auto_hide_delay(&self) -> Duration {
        Duration::from_millis(self.auto_hide_delay_ms)
    }

    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    pub fn background_duration(&self) -> Duration {
        Duration::from_millis(self.background_duration_ms)
    }
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| {
                dirs::home_dir()
                    .map(|h| h.join(".config"))
                    .unwrap_or_else(|| PathBuf::from("/tmp"))
            })
            .join("ash")
            .join("config.toml")
    }

    /// Load config from the default path, or return defaults if not found
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Load config from `path`. Missing or broken files fall back to
    /// defaults; the problem is logged.
    pub fn load_from(path: &Path) -> Self {
        let mut config = if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match Self::from_toml_str(&content) {
                    Ok(config) => config,
                    Err(e) => {
                        tracing::warn!(path = %path.display(), "Failed to parse config: {}", e);
                        Self::default()
                    }
                },
                Err(e) => {
                    tracing::warn!(path = %path.display(), "Failed to read config: {}", e);
                    Self::default()
                }
            }
        } else {
            Self::default()
        };

        config.validate();
        config
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> AshResult<Self> {
        let mut config: Config = toml::from_str(content)?;
        config.validate();
        Ok(config)
    }

    /// Validate and clamp config values to acceptable ranges
    fn validate(&mut self) {
        let shelf = &mut self.shelf;
        shelf.auto_hide_size = shelf.auto_hide_size.clamp(1, 16);
        shelf.hover_thickness = shelf.hover_thickness.clamp(1, 32);
        shelf.auto_hide_delay_ms = shelf.auto_hide_delay_ms.min(5000);
        shelf.animation_duration_ms = shelf.animation_duration_ms.min(2000);
        shelf.background_duration_ms = shelf.background_duration_ms.min(2000);
    }

    /// Save config to the default path
    pub fn save(&self) -> AshResult<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> AshResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;

        Ok(())
    }
}
