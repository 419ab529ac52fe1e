use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::ui::theme::Theme;

pub const DEFAULT_API_URL: &str = "http://localhost:8888";

/// kapactl application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Chronograf API URL
    pub api_url: String,

    /// Source to manage; the default source is used when unset
    pub source_id: Option<String>,

    /// Hide the Kapacitor picker and start with a blank connection
    pub on_boarding: bool,

    /// UI theme
    pub theme: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            source_id: None,
            on_boarding: false,
            theme: "dark".to_string(),
        }
    }
}

impl AppConfig {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;

        Ok(config_dir.join("kapactl").join("config.yaml"))
    }

    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::default_path()?)
    }

    /// Load configuration from a file, defaulting when it does not exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let config: AppConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("Invalid configuration in {}", path.display()))?;
        Ok(config)
    }

    /// Load configuration for a session from the default location.
    ///
    /// See [`AppConfig::load_or_default_from`].
    pub fn load_or_default() -> (Self, bool) {
        match Self::default_path() {
            Ok(path) => Self::load_or_default_from(&path),
            Err(err) => {
                tracing::warn!(error = %err, "no configuration directory, using defaults");
                (Self::default(), false)
            }
        }
    }

    /// Load configuration, falling back to defaults when the file is broken.
    ///
    /// The flag is false when the file exists but could not be read; the
    /// session must not save over it then.
    pub fn load_or_default_from(path: &Path) -> (Self, bool) {
        match Self::load_from(path) {
            Ok(config) => (config, true),
            Err(err) => {
                tracing::warn!(
                    error = %format!("{:#}", err),
                    "falling back to default configuration, leaving the file untouched"
                );
                (Self::default(), false)
            }
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::default_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = serde_yaml::to_string(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    /// Merge command line arguments into config
    pub fn merge_cli(&mut self, api_url: Option<String>, source_id: Option<String>) {
        if let Some(url) = api_url {
            self.api_url = url;
        }

        if let Some(id) = source_id {
            self.source_id = Some(id);
        }
    }

    pub fn get_theme(&self) -> Theme {
        Theme::from_str(&self.theme)
    }

    pub fn set_theme(&mut self, theme: Theme) {
        self.theme = theme.as_str().to_string();
    }
}
