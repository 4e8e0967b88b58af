//! Join, claim and leave as this device's participant

use anyhow::{Result, bail};
use clap::Args;
use tabshare_core::IdentityStore;

use crate::client::TabshareHttp;
use crate::render;

#[derive(Args, Debug)]
pub struct JoinArgs {
    /// Session ID to join
    pub session_id: String,
    /// Display name; remembered for later sessions
    #[arg(short, long)]
    pub name: Option<String>,
}

#[derive(Args, Debug)]
pub struct ClaimArgs {
    /// Session ID holding the item
    pub session_id: String,
    /// Item ID to claim, or release if already claimed
    pub item_id: String,
}

#[derive(Args, Debug)]
pub struct LeaveArgs {
    /// Session ID to leave
    pub session_id: String,
}

pub async fn join(args: JoinArgs, http: &TabshareHttp) -> Result<()> {
    let store = IdentityStore::default_location();
    let identity = match args.name {
        Some(name) => store.set_display_name(&name).await?,
        None => store.load_or_create().await?,
    };
    let Some(display_name) = identity.display_name else {
        bail!("Choose a display name first: tabshare join {} --name <NAME>", args.session_id);
    };

    let participants = http
        .join(&args.session_id, &identity.id, &display_name)
        .await?;

    println!("Joined {} as {}", args.session_id, display_name);
    let others: Vec<_> = participants
        .iter()
        .filter(|p| p.id != identity.id)
        .map(|p| p.display_name.as_str())
        .collect();
    if !others.is_empty() {
        println!("Also here: {}", others.join(", "));
    }
    Ok(())
}

pub async fn claim(args: ClaimArgs, http: &TabshareHttp) -> Result<()> {
    let identity = super::local_identity().await?;

    let item = http
        .toggle(&args.session_id, &args.item_id, &identity.id)
        .await?;

    if item.has_buyer(&identity.id) {
        println!(
            "Claimed {} ({} split {} ways, your share {})",
            item.name,
            render::money(item.line_total()),
            item.buyers.len(),
            render::money(item.share_per_buyer())
        );
    } else {
        println!("Released {}", item.name);
    }

    let owed = http.owed(&args.session_id, &identity.id).await?;
    println!("You owe {}", render::money(owed));
    Ok(())
}

pub async fn leave(args: LeaveArgs, http: &TabshareHttp) -> Result<()> {
    let identity = super::local_identity().await?;
    http.leave(&args.session_id, &identity.id).await?;
    println!("Left {}; your claims were released", args.session_id);
    Ok(())
}
