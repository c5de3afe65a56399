// Configuration file handling

use crate::medium::{FileMedium, Medium, SqliteMedium};
use crate::store::DEFAULT_KEY;
use eyre::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which storage medium backs the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MediumKind {
    /// `todostore.db` SQLite key-value table
    #[default]
    Sqlite,
    /// One `<key>.json` file per key
    File,
}

/// Settings read from `todostore.yml`
///
/// Every field is optional in the file; missing ones take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the storage files
    pub store_path: PathBuf,
    pub medium: MediumKind,
    /// Storage key for the collection
    pub key: String,
}

impl Default for Config {
    fn default() -> Self {
        let store_path = dirs::data_dir()
            .map(|d| d.join("todostore"))
            .unwrap_or_else(|| PathBuf::from(".todostore"));

        Self {
            store_path,
            medium: MediumKind::default(),
            key: DEFAULT_KEY.to_string(),
        }
    }
}

impl Config {
    /// `<config_dir>/todostore/todostore.yml`, if the platform has a config dir
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("todostore").join("todostore.yml"))
    }

    /// Load from an explicit path, else from the default path if it exists, else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        match Self::default_path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => {
                debug!("No config file, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config =
            serde_yaml::from_str(&content).with_context(|| format!("Failed to parse config file {}", path.display()))?;
        debug!(?path, ?config, "Loaded config");
        Ok(config)
    }

    /// Open the configured medium under `store_path`
    pub fn open_medium(&self) -> Result<Box<dyn Medium>> {
        let medium: Box<dyn Medium> = match self.medium {
            MediumKind::Sqlite => {
                let db_path = self.store_path.join("todostore.db");
                Box::new(SqliteMedium::open(&db_path).context("Failed to open SQLite database")?)
            }
            MediumKind::File => {
                Box::new(FileMedium::open(&self.store_path).context("Failed to create store directory")?)
            }
        };
        Ok(medium)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.medium, MediumKind::Sqlite);
        assert_eq!(config.key, "todos");
        assert!(config.store_path.ends_with("todostore") || config.store_path.ends_with(".todostore"));
    }

    #[test]
    fn test_from_file_full() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todostore.yml");
        fs::write(&path, "store_path: /tmp/my-todos\nmedium: file\nkey: work\n").unwrap();

        let config = Config::load(Some(path.as_path())).unwrap();
        assert_eq!(config.store_path, PathBuf::from("/tmp/my-todos"));
        assert_eq!(config.medium, MediumKind::File);
        assert_eq!(config.key, "work");
    }

    #[test]
    fn test_from_file_partial_uses_defaults() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todostore.yml");
        fs::write(&path, "key: home\n").unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.key, "home");
        assert_eq!(config.medium, MediumKind::Sqlite);
        assert_eq!(config.store_path, Config::default().store_path);
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let temp = TempDir::new().unwrap();
        assert!(Config::load(Some(temp.path().join("nope.yml").as_path())).is_err());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("todostore.yml");
        fs::write(&path, "medium: [not, a, medium]\n").unwrap();

        assert!(Config::from_file(&path).is_err());
    }

    #[test]
    fn test_open_medium_kinds() {
        let temp = TempDir::new().unwrap();

        let mut config = Config {
            store_path: temp.path().join("store"),
            medium: MediumKind::File,
            key: "todos".to_string(),
        };
        let mut medium = config.open_medium().unwrap();
        medium.save("todos", "[]").unwrap();
        assert!(temp.path().join("store/todos.json").exists());

        config.medium = MediumKind::Sqlite;
        let mut medium = config.open_medium().unwrap();
        medium.save("todos", "[]").unwrap();
        assert!(temp.path().join("store/todostore.db").exists());
    }
}
