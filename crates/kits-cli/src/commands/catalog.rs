use anyhow::Result;
use kits_core::cooldown::format_cooldown_label;
use kits_infrastructure::TomlKitCatalog;

pub fn list(store: &TomlKitCatalog) -> Result<()> {
    let config = store.load()?;

    println!("Config: {}", store.path().display());
    println!("Template: {}", config.page.template);
    println!();
    for kit in &config.kits {
        let vip = if kit.vip { " [VIP]" } else { "" };
        println!(
            "{} - {}{} (cooldown {})",
            kit.id,
            kit.display_name,
            vip,
            format_cooldown_label(kit.cooldown_secs)
        );
        if !kit.description.is_empty() {
            println!("    {}", kit.description);
        }
        for item in &kit.items {
            println!("    x{:<4} {}", item.quantity, item.short_name());
        }
    }

    Ok(())
}
