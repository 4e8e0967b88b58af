use anyhow::{Result, bail};
use clap::{Args, Subcommand};

use crate::config::{ConfigLoader, TabshareConfig};

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Show current configuration (merged)
    Show,
    /// Show configuration file paths
    Path,
    /// Write the default configuration to the user config file
    Init {
        /// Replace an existing file
        #[arg(long)]
        force: bool,
    },
}

pub fn run(args: ConfigArgs, config: &TabshareConfig) -> Result<()> {
    match args.command {
        ConfigCommands::Show => show_config(config),
        ConfigCommands::Path => show_paths(),
        ConfigCommands::Init { force } => init_config(force),
    }
}

fn show_config(config: &TabshareConfig) -> Result<()> {
    let toml_str = toml::to_string_pretty(config)?;
    println!("{}", toml_str);
    Ok(())
}

fn show_paths() -> Result<()> {
    println!("User config:    {}", ConfigLoader::user_config_path().display());
    println!(
        "Project config: {}",
        ConfigLoader::project_config_path().display()
    );
    Ok(())
}

fn init_config(force: bool) -> Result<()> {
    let path = ConfigLoader::user_config_path();
    if path.exists() && !force {
        bail!("{} already exists (use --force to replace it)", path.display());
    }
    ConfigLoader::save_to_path(&TabshareConfig::default(), &path)?;
    println!("Wrote {}", path.display());
    Ok(())
}
