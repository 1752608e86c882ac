//! Configuration file handling for beans-to-bars.
//!
//! The configuration file is stored at `$BARS_HOME/config.json` and records where the sales data
//! lives, where exports are written, and how malformed amounts are treated when loading.

use crate::model::AmountPolicy;
use crate::{utils, Result};
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const APP_NAME: &str = "beans-to-bars";
const CONFIG_VERSION: u8 = 1;
const CONFIG_JSON: &str = "config.json";
const EXPORTS: &str = "exports";

/// The `Config` object represents the configuration of the app. You instantiate it by providing
/// the path to `$BARS_HOME` and from there it loads `$BARS_HOME/config.json`. Relative paths in
/// the file are resolved against the home directory.
#[derive(Debug, Clone)]
pub struct Config {
    root: PathBuf,
    config_path: PathBuf,
    config_file: ConfigFile,
}

impl Config {
    /// Creates the home directory, its exports directory and an initial `config.json` that points
    /// at `source`.
    ///
    /// # Arguments
    /// - `dir` - The directory that will be the home directory, e.g. `$HOME/beans-to-bars`
    /// - `source` - The sales CSV. It must exist; its absolute path is recorded.
    /// - `amount_policy` - How rows with malformed amounts are treated when loading.
    ///
    /// # Errors
    /// - Returns an error if `source` does not exist, a config file is already present, or any
    ///   file operation fails.
    pub async fn create(
        dir: impl Into<PathBuf>,
        source: &Path,
        amount_policy: AmountPolicy,
    ) -> Result<Self> {
        let source = utils::canonicalize(source)
            .await
            .context("Unable to find the sales data")?;

        let maybe_relative = dir.into();
        utils::make_dir(&maybe_relative)
            .await
            .context("Unable to create the beans-to-bars home directory")?;
        let root = utils::canonicalize(&maybe_relative).await?;

        let config_path = root.join(CONFIG_JSON);
        if config_path.exists() {
            bail!("A config file already exists at '{}'", config_path.display())
        }

        let config_file = ConfigFile {
            app_name: APP_NAME.to_string(),
            config_version: CONFIG_VERSION,
            source,
            export_dir: None,
            amount_policy,
        };
        config_file.save(&config_path).await?;

        let config = Self {
            root,
            config_path,
            config_file,
        };
        utils::make_dir(config.export_dir()).await?;
        Ok(config)
    }

    /// This will
    /// - validate that `bars_home` exists and that the config file exists
    /// - load the config file
    /// - return the loaded configuration object
    pub async fn load(bars_home: impl Into<PathBuf>) -> Result<Self> {
        let maybe_relative = bars_home.into();
        let root = utils::canonicalize(&maybe_relative)
            .await
            .context("The beans-to-bars home directory is missing")?;

        let config_path = root.join(CONFIG_JSON);
        if !config_path.is_file() {
            bail!("The config file is missing '{}'", config_path.display())
        }
        let config_file = ConfigFile::load(&config_path).await?;

        Ok(Self {
            root,
            config_path,
            config_file,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// The sales CSV. Absolute, or resolved against the home directory.
    pub fn source(&self) -> PathBuf {
        self.resolve(self.config_file.source.clone())
    }

    /// Where exports are written. Defaults to `$BARS_HOME/exports`.
    pub fn export_dir(&self) -> PathBuf {
        self.resolve(self.config_file.export_dir())
    }

    pub fn amount_policy(&self) -> AmountPolicy {
        self.config_file.amount_policy
    }

    /// Checks if `p` is relative, and if so, resolves it. Returns it unchanged if it is absolute.
    fn resolve(&self, p: PathBuf) -> PathBuf {
        if p.is_absolute() {
            return p;
        }
        self.root.join(p)
    }
}

/// Represents the serialization and deserialization format of the configuration file.
///
/// Example configuration:
/// ```json
/// {
///   "app_name": "beans-to-bars",
///   "config_version": 1,
///   "source": "/home/me/data/Chocolate Sales.csv",
///   "export_dir": "exports",
///   "amount_policy": "drop"
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
struct ConfigFile {
    /// Application name, should always be "beans-to-bars"
    app_name: String,

    /// Configuration file version
    config_version: u8,

    /// Path to the sales CSV (relative to config.json or absolute)
    source: PathBuf,

    /// Path to the export directory (optional, relative to config.json or absolute)
    /// Defaults to $BARS_HOME/exports if not specified
    #[serde(default, skip_serializing_if = "Option::is_none")]
    export_dir: Option<PathBuf>,

    /// What to do with a row whose amount or box count cannot be parsed
    #[serde(default)]
    amount_policy: AmountPolicy,
}

impl ConfigFile {
    /// Loads a ConfigFile asynchronously from the specified path.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed, or if it belongs to another app
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

        Ok(config)
    }

    async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let p = path.as_ref();
        let data = serde_json::to_string_pretty(self).context("Unable to serialize config")?;
        utils::write(p, data)
            .await
            .context("Unable to write config file")
    }

    fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(EXPORTS))
    }
}
