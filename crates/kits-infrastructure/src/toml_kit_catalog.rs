//! TOML-backed kit catalog and page configuration.

use crate::config::KitsConfig;
use kits_core::error::{KitsError, Result};
use kits_core::kit::StaticKitCatalog;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads `kits.toml`, falling back to built-in defaults when it is absent.
///
/// Responsibilities:
/// - Resolve the config path (`~/.config/kits/kits.toml` by default)
/// - Parse and validate the file into `KitsConfig`
/// - Write the default file for `kits init-config`
pub struct TomlKitCatalog {
    path: PathBuf,
}

impl TomlKitCatalog {
    const CONFIG_DIR: &'static str = "kits";
    const CONFIG_FILENAME: &'static str = "kits.toml";

    /// Creates a loader for the default config path.
    pub fn new() -> Result<Self> {
        Ok(Self {
            path: Self::default_config_path()?,
        })
    }

    /// Creates a loader for a custom path (for testing and `--config`).
    pub fn with_path(path: PathBuf) -> Self {
        Self { path }
    }

    /// Gets the default config path (~/.config/kits/kits.toml).
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join(Self::CONFIG_DIR).join(Self::CONFIG_FILENAME))
            .ok_or_else(|| KitsError::config("Cannot find config directory"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the config; a missing file yields the defaults.
    pub fn load(&self) -> Result<KitsConfig> {
        if !self.path.exists() {
            tracing::info!(
                "[TomlKitCatalog] No config at {}, using built-in kits",
                self.path.display()
            );
            return Ok(KitsConfig::default());
        }

        let content = fs::read_to_string(&self.path)?;
        let config = KitsConfig::from_toml_str(&content).map_err(|e| match e {
            KitsError::Serialization { format, message } => KitsError::Serialization {
                format,
                message: format!("{}: {}", self.path.display(), message),
            },
            other => other,
        })?;
        tracing::info!(
            "[TomlKitCatalog] Loaded {} kit(s) from {}",
            config.kits.len(),
            self.path.display()
        );
        Ok(config)
    }

    /// Loads only the kits.
    pub fn load_catalog(&self) -> Result<StaticKitCatalog> {
        self.load()?.catalog()
    }

    /// Writes `config`, creating parent directories.
    pub fn save(&self, config: &KitsConfig) -> Result<()> {
        config.validate()?;
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, config.to_toml_string()?)?;
        Ok(())
    }

    /// Writes the default config unless a file already exists (or `force`).
    /// Returns whether a file was written.
    pub fn write_default(&self, force: bool) -> Result<bool> {
        if self.path.exists() && !force {
            return Ok(false);
        }
        self.save(&KitsConfig::default())?;
        Ok(true)
    }
}
