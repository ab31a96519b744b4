use crate::error::{FrontdeskError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

const CONFIG_FILENAME: &str = "config.json";
const DEFAULT_API_BASE: &str = "https://sheets.googleapis.com";

/// Configuration for frontdesk, stored in the data dir as config.json
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FrontdeskConfig {
    /// Identifier of the remote spreadsheet holding the roster
    #[serde(default)]
    pub spreadsheet_id: String,

    /// Base URL of the values API (overridable for testing)
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

fn default_api_base() -> String {
    DEFAULT_API_BASE.to_string()
}

impl Default for FrontdeskConfig {
    fn default() -> Self {
        Self {
            spreadsheet_id: String::new(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl FrontdeskConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path).map_err(FrontdeskError::Io)?;
        let config: FrontdeskConfig = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();

        if !config_dir.exists() {
            fs::create_dir_all(config_dir).map_err(FrontdeskError::Io)?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);
        let content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, content).map_err(FrontdeskError::Io)?;
        Ok(())
    }

    /// Get one configuration value by key.
    pub fn get(&self, key: &str) -> Result<String> {
        match key {
            "spreadsheet-id" => Ok(self.spreadsheet_id.clone()),
            "api-base" => Ok(self.api_base.clone()),
            _ => Err(FrontdeskError::Config(format!("Unknown config key: {}", key))),
        }
    }

    /// Set one configuration value by key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "spreadsheet-id" => {
                self.spreadsheet_id = value.to_string();
                Ok(())
            }
            "api-base" => {
                self.api_base = value.trim_end_matches('/').to_string();
                Ok(())
            }
            _ => Err(FrontdeskError::Config(format!("Unknown config key: {}", key))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = FrontdeskConfig::default();
        assert_eq!(config.api_base, DEFAULT_API_BASE);
        assert!(config.spreadsheet_id.is_empty());
    }

    #[test]
    fn test_load_missing_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = FrontdeskConfig::load(dir.path().join("nope")).unwrap();
        assert_eq!(config, FrontdeskConfig::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = FrontdeskConfig::default();
        config.set("spreadsheet-id", "1abcDEF").unwrap();
        config.save(dir.path()).unwrap();

        let loaded = FrontdeskConfig::load(dir.path()).unwrap();
        assert_eq!(loaded.spreadsheet_id, "1abcDEF");
    }

    #[test]
    fn test_unknown_key_is_an_error() {
        let mut config = FrontdeskConfig::default();
        assert!(config.get("nope").is_err());
        assert!(config.set("nope", "x").is_err());
    }

    #[test]
    fn test_api_base_trailing_slash_is_normalized() {
        let mut config = FrontdeskConfig::default();
        config.set("api-base", "http://localhost:9999/").unwrap();
        assert_eq!(config.api_base, "http://localhost:9999");
    }

    #[test]
    fn test_serialization_roundtrip() {
        let config = FrontdeskConfig {
            spreadsheet_id: "sheet123".to_string(),
            api_base: "http://localhost:1234".to_string(),
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: FrontdeskConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(config, parsed);
    }
}
