use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

fn default_endpoint() -> String {
    "http://127.0.0.1:8000".to_string()
}

fn default_base() -> String {
    "USD".to_string()
}

fn default_target() -> String {
    "EUR".to_string()
}

/// Optional hex color overrides for the theme (`#RRGGBB` or `#RGB`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub green: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amber: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub red: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub neutral: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accent: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Signal endpoint base URL
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Currency pair preselected at startup
    #[serde(default = "default_base")]
    pub base: String,
    #[serde(default = "default_target")]
    pub target: String,

    /// Desktop notification with the verdict in one-shot mode
    #[serde(default)]
    pub notifications: bool,

    /// Theme color overrides
    #[serde(default)]
    pub colors: ColorOverrides,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            base: default_base(),
            target: default_target(),
            notifications: false,
            colors: ColorOverrides::default(),
        }
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?
            .join("fxcheck");

        if let Err(e) = std::fs::create_dir_all(&config_dir) {
            tracing::warn!("Could not create config directory: {}", e);
        }

        Ok(config_dir.join("config.toml"))
    }

    /// Load config from file, or create default
    pub fn load() -> Result<Self> {
        let path = match Self::config_path() {
            Ok(p) => p,
            Err(_) => return Ok(AppConfig::default()),
        };

        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return Ok(config),
                    Err(e) => tracing::warn!("Failed to parse config: {}", e),
                },
                Err(e) => tracing::warn!("Failed to read config: {}", e),
            }
        }

        let config = AppConfig::default();
        let _ = config.save();
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        // Normalize before saving: uppercase codes, no trailing slash
        let mut clean_config = self.clone();
        clean_config.base = clean_config.base.trim().to_ascii_uppercase();
        clean_config.target = clean_config.target.trim().to_ascii_uppercase();
        clean_config.endpoint = clean_config.endpoint.trim_end_matches('/').to_string();

        let content = toml::to_string_pretty(&clean_config)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}
