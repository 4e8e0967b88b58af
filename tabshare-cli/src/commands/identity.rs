//! Local participant identity commands

use anyhow::Result;
use clap::{Args, Subcommand};
use tabshare_core::IdentityStore;

#[derive(Args, Debug)]
pub struct IdentityArgs {
    #[command(subcommand)]
    pub command: IdentityCommands,
}

#[derive(Subcommand, Debug)]
pub enum IdentityCommands {
    /// Show this device's participant id and name
    Show,
    /// Set the display name used when joining
    SetName {
        /// New display name
        name: String,
    },
    /// Forget this identity; a new id is generated on next use
    Reset,
}

pub async fn run(args: IdentityArgs) -> Result<()> {
    let store = IdentityStore::default_location();

    match args.command {
        IdentityCommands::Show => {
            let identity = store.load_or_create().await?;
            println!("Participant id: {}", identity.id);
            println!(
                "Display name:   {}",
                identity.display_name.as_deref().unwrap_or("(not set)")
            );
            println!("Created:        {}", identity.created_at.to_rfc3339());
            println!("Stored in:      {}", store.path().display());
        }
        IdentityCommands::SetName { name } => {
            let identity = store.set_display_name(&name).await?;
            println!(
                "Display name set to {}",
                identity.display_name.unwrap_or_default()
            );
        }
        IdentityCommands::Reset => {
            store.reset().await?;
            println!("Identity removed");
        }
    }
    Ok(())
}
