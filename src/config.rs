use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::core::{ColorVariant, TemplateStore, UploadedImage, DEFAULT_MODEL};

/// Public Gemini REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub templates: TemplatesConfig,

    #[serde(skip)]
    pub config_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default)]
    pub color: ColorVariant,
    #[serde(default)]
    pub adjustment: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_output_directory")]
    pub directory: String,
    #[serde(default = "default_display")]
    pub display: DisplayMode,
}

/// Reference hoodie image file per color
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemplatesConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub green: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub black: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub white: Option<String>,
}

impl TemplatesConfig {
    pub fn path(&self, color: ColorVariant) -> Option<&str> {
        match color {
            ColorVariant::Green => self.green.as_deref(),
            ColorVariant::Black => self.black.as_deref(),
            ColorVariant::White => self.white.as_deref(),
        }
    }

    pub fn set_path(&mut self, color: ColorVariant, path: Option<String>) {
        match color {
            ColorVariant::Green => self.green = path,
            ColorVariant::Black => self.black = path,
            ColorVariant::White => self.white = path,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DisplayMode {
    #[default]
    Terminal,
    None,
}

impl DisplayMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DisplayMode::Terminal => "terminal",
            DisplayMode::None => "none",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "none" => DisplayMode::None,
            _ => DisplayMode::Terminal,
        }
    }

    pub fn variants() -> &'static [&'static str] {
        &["terminal", "none"]
    }
}

// Default value functions
fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_output_directory() -> String {
    "./hoodie-output".to_string()
}

fn default_display() -> DisplayMode {
    DisplayMode::Terminal
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            model: default_model(),
            base_url: default_base_url(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: default_output_directory(),
            display: DisplayMode::Terminal,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "hoodie-portrait", "hoodie")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().to_path_buf())
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file or create default
    pub fn load_or_create() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load config from `config_path`, writing defaults there if it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        // Check for API key in environment first
        let env_key = std::env::var("GEMINI_API_KEY").ok();

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .context("Failed to read config file")?;
            let mut config: Config = toml::from_str(&content)
                .context("Failed to parse config file")?;
            config.config_path = config_path.to_path_buf();
            config
        } else {
            let config = Config {
                config_path: config_path.to_path_buf(),
                ..Default::default()
            };
            config.save()?;
            config
        };

        // Environment variable takes precedence
        if let Some(key) = env_key.filter(|k| !k.is_empty()) {
            config.api.key = Some(key);
        }

        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.config_path.parent() {
            fs::create_dir_all(parent)
                .context("Failed to create config directory")?;
        }

        let content = toml::to_string_pretty(self)
            .context("Failed to serialize config")?;
        fs::write(&self.config_path, content)
            .context("Failed to write config file")?;

        Ok(())
    }

    /// Get API key (from config or environment)
    pub fn api_key(&self) -> Option<&str> {
        self.api.key.as_deref()
    }

    /// Build the template map: built-in defaults overlaid with the configured files.
    ///
    /// A configured file that can't be read is skipped with a warning.
    pub async fn template_store(&self) -> TemplateStore {
        let mut store = TemplateStore::new();
        for color in ColorVariant::all() {
            let Some(path) = self.templates.path(*color) else {
                continue;
            };
            match UploadedImage::load(Path::new(path)).await {
                Ok(image) => store.set(*color, image.data_url),
                Err(e) => tracing::warn!("Skipping {} template {}: {:#}", color, path, e),
            }
        }
        store
    }

    /// Set a config value by key path (e.g., "api.key", "defaults.color")
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "api.key" => self.api.key = Some(value.to_string()),
            "api.model" => self.api.model = value.to_string(),
            "api.base_url" => self.api.base_url = value.to_string(),
            "defaults.color" => {
                self.defaults.color = value.parse()?;
            }
            "defaults.adjustment" => self.defaults.adjustment = value.to_string(),
            "output.directory" => self.output.directory = value.to_string(),
            "output.display" => {
                if !DisplayMode::variants().contains(&value.to_lowercase().as_str()) {
                    anyhow::bail!(
                        "Invalid display mode. Valid values: {}",
                        DisplayMode::variants().join(", ")
                    );
                }
                self.output.display = DisplayMode::from_str(value);
            }
            _ => {
                let color = template_key(key)
                    .ok_or_else(|| anyhow::anyhow!("Unknown config key: {}", key))?;
                let path = (!value.is_empty()).then(|| value.to_string());
                self.templates.set_path(color, path);
            }
        }
        Ok(())
    }

    /// Get a config value by key path
    pub fn get(&self, key: &str) -> Option<String> {
        match key {
            "api.key" => self.api.key.clone().map(|_| "****".to_string()), // Mask API key
            "api.model" => Some(self.api.model.clone()),
            "api.base_url" => Some(self.api.base_url.clone()),
            "defaults.color" => Some(self.defaults.color.as_str().to_string()),
            "defaults.adjustment" => Some(self.defaults.adjustment.clone()),
            "output.directory" => Some(self.output.directory.clone()),
            "output.display" => Some(self.output.display.as_str().to_string()),
            _ => template_key(key).and_then(|c| self.templates.path(c).map(str::to_string)),
        }
    }

    /// Get all config keys
    pub fn keys() -> &'static [&'static str] {
        &[
            "api.key",
            "api.model",
            "api.base_url",
            "defaults.color",
            "defaults.adjustment",
            "output.directory",
            "output.display",
            "templates.green",
            "templates.black",
            "templates.white",
        ]
    }
}

fn template_key(key: &str) -> Option<ColorVariant> {
    key.strip_prefix("templates.")?.parse().ok()
}
