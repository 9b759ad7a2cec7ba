//! Configuration file handling.
//!
//! The configuration file is stored at `$EXPENSES_HOME/config.json` and holds the storage key of
//! the transaction snapshot, the currency symbol and any keyword overrides for classification.

use crate::model::{Category, KeywordTable, DEFAULT_CURRENCY_SYMBOL};
use crate::store::{FileBlobStore, TransactionStore};
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::debug;

const APP_NAME: &str = "voice-expenses";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const STORE_DIR: &str = "store";
const DEFAULT_STORAGE_KEY: &str = "voice-expenses-v3";

/// When set to a non-empty value the program runs without a speech engine.
pub const TEST_MODE_ENV: &str = "EXPENSES_IN_TEST_MODE";

/// Whether real external capabilities are used.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq)]
pub enum Mode {
    /// Dictation is read from stdin.
    #[default]
    Live,
    /// No speech engine is available.
    Test,
}

impl Mode {
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(v) if !v.is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$EXPENSES_HOME` and from there it loads `$EXPENSES_HOME/config.json`.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    store_dir: PathBuf,
    config_file: ConfigFile,
    keywords: KeywordTable,
}

impl Config {
    /// Creates the data directory, its `store` subdirectory and an initial `config.json` with
    /// default settings.
    ///
    /// # Errors
    /// - Returns an error if the directory already holds a `config.json`.
    /// - Returns an error if any file operations fail.
    pub async fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the expenses home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!(
                "A config file already exists at '{}'",
                config_path.display()
            )
        }

        let store_dir = root.join(STORE_DIR);
        utils::make_dir(&store_dir).await?;

        let config_file = ConfigFile::default();
        config_file.save(&config_path).await?;

        Ok(Self {
            keywords: config_file.keyword_table(),
            root,
            config_path,
            store_dir,
            config_file,
        })
    }

    /// This will
    /// - validate that `home` exists and that the config file exists
    /// - load the config file
    /// - validate that the store directory exists
    /// - return the loaded configuration object
    pub async fn load(home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The expenses home directory is missing, run `expenses init` first")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!(
                "The config file is missing '{}', run `expenses init` first",
                config_path.display()
            )
        }
        let config_file = ConfigFile::load(&config_path).await?;

        let store_dir = root.join(STORE_DIR);
        if !store_dir.is_dir() {
            bail!("The store directory is missing '{}'", store_dir.display())
        }
        debug!("Loaded config from {}", config_path.display());

        Ok(Self {
            keywords: config_file.keyword_table(),
            root,
            config_path,
            store_dir,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    pub fn store_dir(&self) -> &Path {
        &self.store_dir
    }

    pub fn storage_key(&self) -> &str {
        &self.config_file.storage_key
    }

    pub fn currency_symbol(&self) -> &str {
        &self.config_file.currency_symbol
    }

    /// The classification table: built-in keywords with the config file's overrides applied.
    pub fn keywords(&self) -> &KeywordTable {
        &self.keywords
    }

    /// Loads the transaction store from its file in the store directory.
    pub async fn open_store(&self) -> Result<TransactionStore> {
        let blob = FileBlobStore::new(&self.store_dir);
        TransactionStore::load(Box::new(blob), self.storage_key()).await
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "voice-expenses",
///   "config_version": 1,
///   "storage_key": "voice-expenses-v3",
///   "currency_symbol": "₹",
///   "keywords": {
///     "food": ["food", "pizza", "biryani"]
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "voice-expenses"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// The name under which the transaction snapshot is stored
    #[serde(default = "default_storage_key")]
    storage_key: String,

    /// Put in front of every displayed amount
    #[serde(default = "default_currency_symbol")]
    currency_symbol: String,

    /// Replaces the built-in keywords of the categories it names
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    keywords: BTreeMap<Category, Vec<String>>,
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_currency_symbol() -> String {
    DEFAULT_CURRENCY_SYMBOL.to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            storage_key: default_storage_key(),
            currency_symbol: default_currency_symbol(),
            keywords: BTreeMap::new(),
        }
    }
}

impl ConfigFile {
    /// Loads a ConfigFile from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or names another app or a newer
    /// config version.
    async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = utils::read(path).await?;

        let config: ConfigFile = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file at {}", path.display()))?;

        anyhow::ensure!(
            config.app_name == APP_NAME,
            "Invalid app_name in config file: expected '{}', got '{}'",
            APP_NAME,
            config.app_name
        );
        anyhow::ensure!(
            config.config_version <= CONFIG_VERSION,
            "Config version {} is newer than this program understands ({})",
            config.config_version,
            CONFIG_VERSION
        );

        Ok(config)
    }

    /// Saves the ConfigFile to the specified path.
    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn keyword_table(&self) -> KeywordTable {
        KeywordTable::with_overrides(&self.keywords)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_create_then_load() {
        let dir = TempDir::new().unwrap();
        let home = dir.path().join("expenses");
        let created = Config::create(&home).await.unwrap();
        assert!(created.config_path().is_file());
        assert!(created.store_dir().is_dir());

        let loaded = Config::load(&home).await.unwrap();
        assert_eq!(loaded.root(), created.root());
        assert_eq!(loaded.storage_key(), "voice-expenses-v3");
        assert_eq!(loaded.currency_symbol(), "₹");
        assert_eq!(loaded.keywords(), &KeywordTable::default());
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let dir = TempDir::new().unwrap();
        Config::create(dir.path()).await.unwrap();
        assert!(Config::create(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_load_missing_home() {
        let dir = TempDir::new().unwrap();
        let err = Config::load(dir.path().join("nope")).await.unwrap_err();
        assert!(format!("{err:#}").contains("expenses init"));
    }

    #[tokio::test]
    async fn test_load_missing_config() {
        let dir = TempDir::new().unwrap();
        assert!(Config::load(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_keyword_overrides_and_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).await.unwrap();
        std::fs::write(
            config.config_path(),
            r#"{
                "app_name": "voice-expenses",
                "config_version": 1,
                "currency_symbol": "$",
                "keywords": { "food": ["Biryani"] }
            }"#,
        )
        .unwrap();

        let loaded = Config::load(dir.path()).await.unwrap();
        assert_eq!(loaded.storage_key(), "voice-expenses-v3");
        assert_eq!(loaded.currency_symbol(), "$");
        assert_eq!(loaded.keywords().classify("biryani 200"), Category::Food);
        assert_eq!(loaded.keywords().classify("pizza 200"), Category::Other);
    }

    #[tokio::test]
    async fn test_wrong_app_name() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).await.unwrap();
        std::fs::write(
            config.config_path(),
            r#"{"app_name": "budget-sheet", "config_version": 1}"#,
        )
        .unwrap();
        assert!(Config::load(dir.path()).await.is_err());
    }

    #[tokio::test]
    async fn test_newer_version_rejected() {
        let dir = TempDir::new().unwrap();
        let config = Config::create(dir.path()).await.unwrap();
        std::fs::write(
            config.config_path(),
            r#"{"app_name": "voice-expenses", "config_version": 9}"#,
        )
        .unwrap();
        assert!(Config::load(dir.path()).await.is_err());
    }

    #[test]
    fn test_default_config_file_json() {
        let json = serde_json::to_value(ConfigFile::default()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "app_name": "voice-expenses",
                "config_version": 1,
                "storage_key": "voice-expenses-v3",
                "currency_symbol": "₹"
            })
        );
    }
}
