use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};

use crate::ai::gemini::DEFAULT_MODEL;
use crate::persona::DEFAULT_PERSONA;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Config {
    pub api_key: Option<String>,
    pub model: Option<String>,
    /// Replacement system-instruction persona; the built-in default is used
    /// when unset.
    pub persona: Option<String>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::get_config_path()?)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::get_config_path()?)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&config_content)?;
        Ok(config)
    }

    fn save_to(&self, path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(path, config_content)?;
        Ok(())
    }

    pub fn resolved_model(&self) -> String {
        self.model
            .clone()
            .unwrap_or_else(|| DEFAULT_MODEL.to_string())
    }

    pub fn resolved_persona(&self) -> String {
        self.persona
            .clone()
            .unwrap_or_else(|| DEFAULT_PERSONA.to_string())
    }

    fn get_config_path() -> Result<PathBuf> {
        let config_dir =
            dirs::config_dir().ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("equityeye").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_used_when_unset() {
        let config = Config::new();
        assert_eq!(config.resolved_model(), DEFAULT_MODEL);
        assert_eq!(config.resolved_persona(), DEFAULT_PERSONA);
    }

    #[test]
    fn test_configured_values_win() {
        let config = Config {
            api_key: Some("key".to_string()),
            model: Some("gemini-3-flash".to_string()),
            persona: Some("You are terse.".to_string()),
        };
        assert_eq!(config.resolved_model(), "gemini-3-flash");
        assert_eq!(config.resolved_persona(), "You are terse.");
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert!(config.api_key.is_none());
        assert!(config.model.is_none());
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let config = Config {
            api_key: Some("key".to_string()),
            model: Some("gemini-3-flash".to_string()),
            persona: None,
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("key"));
        assert_eq!(loaded.model.as_deref(), Some("gemini-3-flash"));
        assert!(loaded.persona.is_none());
    }
}
