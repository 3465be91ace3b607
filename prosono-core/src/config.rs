//! Configuration management
//!
//! settings.json in the ProSono directory:
//! ```json
//! {
//!   "apiBaseUrl": "https://api.prosono.example",
//!   "enforceAgeRange": true
//! }
//! ```
//! Environment variables override the file for CI and local testing.

use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

/// Backend used when nothing is configured
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001";

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    api_base_url: Option<String>,
    #[serde(default)]
    enforce_age_range: bool,
}

/// ProSono client configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the ProSono backend
    pub api_base_url: String,
    /// Reject registrations outside the 15-18 age window
    pub enforce_age_range: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            enforce_age_range: false,
        }
    }
}

impl Config {
    /// Load config from the ProSono directory
    ///
    /// Overrides, highest priority first:
    /// 1. `PROSONO_API_URL` / `PROSONO_ENFORCE_AGE_RANGE` environment variables
    /// 2. settings.json
    /// 3. built-in defaults
    pub fn load(prosono_dir: &Path) -> Result<Self> {
        let settings_path = prosono_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let api_base_url = std::env::var("PROSONO_API_URL")
            .ok()
            .or(raw.api_base_url)
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());

        let enforce_age_range = match std::env::var("PROSONO_ENFORCE_AGE_RANGE").ok().as_deref() {
            Some("true" | "1" | "yes" | "TRUE" | "YES") => true,
            Some("false" | "0" | "no" | "FALSE" | "NO") => false,
            _ => raw.enforce_age_range,
        };

        Ok(Self {
            api_base_url,
            enforce_age_range,
        })
    }

    /// Save config to the ProSono directory
    pub fn save(&self, prosono_dir: &Path) -> Result<()> {
        let settings_path = prosono_dir.join("settings.json");
        let settings = SettingsFile {
            api_base_url: Some(self.api_base_url.clone()),
            enforce_age_range: self.enforce_age_range,
        };
        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_when_no_settings_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(!config.enforce_age_range);
    }

    #[test]
    fn test_settings_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            api_base_url: "https://api.prosono.example".to_string(),
            enforce_age_range: true,
        };
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.api_base_url, "https://api.prosono.example");
        assert!(loaded.enforce_age_range);
    }

    #[test]
    fn test_corrupt_settings_fall_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{ broken").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
    }
}
