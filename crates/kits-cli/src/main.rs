use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "kits")]
#[command(about = "Kits - claim cooldown-gated kits from an interactive page", long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.config/kits/kits.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the configured kits
    Catalog,
    /// Write the default config file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Open a kits page and drive it over stdin/stdout (JSON lines)
    Session {
        /// Player to open the page for
        #[arg(long)]
        subject: String,
        /// Inventory slots of the simulated player
        #[arg(long, default_value_t = kits_infrastructure::in_memory_inventory::DEFAULT_CAPACITY)]
        capacity: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    kits_infrastructure::logging::init(kits_infrastructure::logging::DEFAULT_FILTER)?;

    let store = commands::config_store(cli.config)?;
    match cli.command {
        Commands::Catalog => commands::catalog::list(&store)?,
        Commands::InitConfig { force } => commands::init_config::write(&store, force)?,
        Commands::Session { subject, capacity } => commands::session::run(&store, subject, capacity)?,
    }

    Ok(())
}
