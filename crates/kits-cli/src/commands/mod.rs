pub mod catalog;
pub mod init_config;
pub mod session;

use anyhow::Result;
use kits_infrastructure::TomlKitCatalog;
use std::path::PathBuf;

/// Config loader for `--config`, or the default location.
pub fn config_store(path: Option<PathBuf>) -> Result<TomlKitCatalog> {
    Ok(match path {
        Some(path) => TomlKitCatalog::with_path(path),
        None => TomlKitCatalog::new()?,
    })
}
