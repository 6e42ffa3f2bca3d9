use kits_core::kit::KitCatalog;
use kits_infrastructure::{KitsConfig, TomlKitCatalog};
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_missing_file_yields_defaults() {
    let temp_dir = TempDir::new().unwrap();
    let repo = TomlKitCatalog::with_path(temp_dir.path().join("kits.toml"));

    let config = repo.load().expect("Should fall back to defaults");
    assert_eq!(config, KitsConfig::default());

    let catalog = repo.load_catalog().unwrap();
    assert!(catalog.lookup("basic").is_some());
    assert!(catalog.lookup("vip").is_some());
}

#[test]
fn test_write_default_then_load() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("kits.toml");
    let repo = TomlKitCatalog::with_path(path.clone());

    assert!(repo.write_default(false).unwrap());
    assert!(path.exists());
    assert!(!repo.write_default(false).unwrap(), "Should not overwrite");

    let config = repo.load().unwrap();
    assert_eq!(config.page.template, "Pages/KitsPage.ui");
    assert_eq!(config.page_settings().grant_timeout, Duration::from_secs(5));
}

#[test]
fn test_load_custom_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("kits.toml");
    fs::write(
        &path,
        r#"
[page]
template = "Pages/CustomKits.ui"
refresh_interval_secs = 2

[[kit]]
id = "daily"
display_name = "Daily Kit"
description = "Once a day"
cooldown_secs = 86400
vip = true
icon_item = "Plant_Fruit_Apple"

[[kit.items]]
item_id = "Plant_Fruit_Apple"
quantity = 8
"#,
    )
    .unwrap();

    let repo = TomlKitCatalog::with_path(path);
    let config = repo.load().unwrap();
    assert_eq!(config.page.template, "Pages/CustomKits.ui");
    assert_eq!(config.page.grant_timeout_secs, 5);

    let catalog = config.catalog().unwrap();
    assert_eq!(catalog.kits().len(), 1);
    let daily = catalog.lookup("daily").unwrap();
    assert!(daily.vip);
    assert_eq!(daily.cooldown(), Duration::from_secs(86400));
    assert_eq!(daily.items.len(), 1);
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("kits.toml");
    fs::write(
        &path,
        r#"
[[kit]]
id = "basic"
display_name = "A"
description = ""
cooldown_secs = 10
icon_item = "x"

[[kit]]
id = "basic"
display_name = "B"
description = ""
cooldown_secs = 10
icon_item = "x"
"#,
    )
    .unwrap();

    let err = TomlKitCatalog::with_path(path).load().unwrap_err();
    assert!(err.is_config());
}

#[test]
fn test_malformed_file_names_the_path() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("kits.toml");
    fs::write(&path, "[page\n").unwrap();

    let err = TomlKitCatalog::with_path(path).load().unwrap_err();
    assert!(err.to_string().contains("kits.toml"));
}
