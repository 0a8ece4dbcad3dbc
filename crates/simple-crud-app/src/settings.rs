//! Settings file
//!
//! Read from `<config dir>/simple-crud/settings.json`. Every section falls
//! back to defaults, so a partial or missing file is fine.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use simple_crud_services::{CrudOptions, DEFAULT_DIRECT_LINKS_COUNT};
use std::path::{Path, PathBuf};

pub fn config_dir() -> Result<PathBuf> {
    dirs::config_dir()
        .context("Could not determine config directory")
        .map(|p| p.join("simple-crud"))
}

pub fn data_dir() -> Result<PathBuf> {
    dirs::data_dir()
        .context("Could not determine data directory")
        .map(|p| p.join("simple-crud"))
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppSettings {
    pub database: DatabaseSettings,
    pub crud: CrudSettings,
    pub logging: LoggingSettings,
}

impl AppSettings {
    pub fn settings_path() -> Result<PathBuf> {
        config_dir().map(|dir| dir.join("settings.json"))
    }

    /// Load from the default location
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::settings_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings from {:?}", path))?;
        serde_json::from_str(&content).with_context(|| "Failed to parse settings JSON")
    }

    /// Save to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::settings_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write settings to {:?}", path))?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseSettings {
    /// SQLite file, `~/` is expanded
    pub path: String,
}

impl DatabaseSettings {
    /// The configured path with a leading `~/` replaced by the home directory
    pub fn resolved_path(&self) -> String {
        match (self.path.strip_prefix("~/"), dirs::home_dir()) {
            (Some(rest), Some(home)) => home.join(rest).to_string_lossy().to_string(),
            _ => self.path.clone(),
        }
    }
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        let path = data_dir()
            .map(|dir| dir.join("simple-crud.db").to_string_lossy().to_string())
            .unwrap_or_else(|_| "simple-crud.db".to_string());
        Self { path }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrudSettings {
    pub items_per_page: usize,
    pub direct_links_count: usize,
}

impl Default for CrudSettings {
    fn default() -> Self {
        let defaults = CrudOptions::default();
        Self {
            items_per_page: defaults.items_per_page,
            direct_links_count: DEFAULT_DIRECT_LINKS_COUNT,
        }
    }
}

impl CrudSettings {
    pub fn options(&self) -> CrudOptions {
        CrudOptions {
            items_per_page: self.items_per_page.max(1),
            direct_links_count: self.direct_links_count,
            ..CrudOptions::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LoggingSettings {
    /// Also write JSON logs to daily rolling files
    pub json_logs: bool,
    /// Filter directive used when `RUST_LOG` is unset
    pub filter: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = AppSettings::load_from(&dir.path().join("settings.json")).unwrap();
        assert_eq!(settings.crud.items_per_page, 10);
        assert_eq!(settings.crud.direct_links_count, 3);
        assert!(!settings.logging.json_logs);
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"crud": {"items_per_page": 25}}"#).unwrap();

        let settings = AppSettings::load_from(&path).unwrap();
        assert_eq!(settings.crud.items_per_page, 25);
        assert_eq!(settings.crud.direct_links_count, 3);
        assert_eq!(settings.database, DatabaseSettings::default());
    }

    #[test]
    fn save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.json");
        let mut settings = AppSettings::default();
        settings.database.path = "/tmp/lists.db".into();
        settings.logging.filter = Some("debug".into());

        settings.save_to(&path).unwrap();
        assert_eq!(AppSettings::load_from(&path).unwrap(), settings);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(AppSettings::load_from(&path).is_err());
    }

    #[test]
    fn home_relative_database_path_is_expanded() {
        let settings = DatabaseSettings {
            path: "~/lists.db".into(),
        };
        let resolved = settings.resolved_path();
        assert!(!resolved.starts_with('~'));
        assert!(resolved.ends_with("lists.db"));

        let absolute = DatabaseSettings {
            path: "/var/lib/lists.db".into(),
        };
        assert_eq!(absolute.resolved_path(), "/var/lib/lists.db");
    }

    #[test]
    fn zero_page_size_is_not_passed_to_widgets() {
        let settings = CrudSettings {
            items_per_page: 0,
            direct_links_count: 5,
        };
        let options = settings.options();
        assert_eq!(options.items_per_page, 1);
        assert_eq!(options.direct_links_count, 5);
        assert_eq!(options.first_page, 0);
    }
}
