//! Configuration file schema.
//!
//! ```toml
//! [page]
//! template = "Pages/KitsPage.ui"
//! refresh_interval_secs = 1
//! grant_timeout_secs = 5
//!
//! [[kit]]
//! id = "basic"
//! display_name = "Basic Kit"
//! ...
//! ```

use kits_core::error::{KitsError, Result};
use kits_core::kit::{KitDefinition, StaticKitCatalog, default_kits};
use kits_core::session::{DEFAULT_GRANT_TIMEOUT, DEFAULT_TEMPLATE, PageSettings};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The `[page]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PageConfig {
    pub template: String,
    pub refresh_interval_secs: u64,
    pub grant_timeout_secs: u64,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            template: DEFAULT_TEMPLATE.to_string(),
            refresh_interval_secs: kits_core::scheduler::DEFAULT_REFRESH_INTERVAL.as_secs(),
            grant_timeout_secs: DEFAULT_GRANT_TIMEOUT.as_secs(),
        }
    }
}

/// Root of `kits.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KitsConfig {
    #[serde(default)]
    pub page: PageConfig,
    /// Kits in display order. Omitting every `[[kit]]` table keeps the
    /// built-in kits.
    #[serde(rename = "kit", default = "default_kits")]
    pub kits: Vec<KitDefinition>,
}

impl Default for KitsConfig {
    fn default() -> Self {
        Self {
            page: PageConfig::default(),
            kits: default_kits(),
        }
    }
}

impl KitsConfig {
    /// Parses and validates a config document.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: KitsConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// The defaults rendered as a config file.
    pub fn default_toml() -> Result<String> {
        Self::default().to_toml_string()
    }

    pub fn validate(&self) -> Result<()> {
        if self.page.template.trim().is_empty() {
            return Err(KitsError::config("page.template must not be empty"));
        }
        if self.page.refresh_interval_secs == 0 {
            return Err(KitsError::config("page.refresh_interval_secs must be at least 1"));
        }
        if self.page.grant_timeout_secs == 0 {
            return Err(KitsError::config("page.grant_timeout_secs must be at least 1"));
        }
        StaticKitCatalog::new(self.kits.clone()).map(|_| ())
    }

    pub fn page_settings(&self) -> PageSettings {
        PageSettings {
            template: self.page.template.clone(),
            refresh_interval: Duration::from_secs(self.page.refresh_interval_secs),
            grant_timeout: Duration::from_secs(self.page.grant_timeout_secs),
        }
    }

    pub fn catalog(&self) -> Result<StaticKitCatalog> {
        StaticKitCatalog::new(self.kits.clone())
    }
}
