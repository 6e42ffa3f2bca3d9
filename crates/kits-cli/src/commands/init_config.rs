use anyhow::Result;
use kits_infrastructure::TomlKitCatalog;

pub fn write(store: &TomlKitCatalog, force: bool) -> Result<()> {
    if store.write_default(force)? {
        println!("Wrote default config to {}", store.path().display());
    } else {
        println!(
            "Config already exists at {} (use --force to overwrite)",
            store.path().display()
        );
    }
    Ok(())
}
