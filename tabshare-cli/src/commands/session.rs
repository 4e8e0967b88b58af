//! Session management commands

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Args, Subcommand};
use tabshare_server::http::IngestBillRequest;

use crate::client::TabshareHttp;
use crate::render;

/// Session management arguments
#[derive(Args, Debug)]
pub struct SessionArgs {
    #[command(subcommand)]
    pub command: SessionCommands,
}

/// Session subcommands
#[derive(Subcommand, Debug)]
pub enum SessionCommands {
    /// Create a session (replaces any session with the same id)
    Create {
        /// Session ID to create
        session_id: String,
    },
    /// Show items, claims and who is present
    Show {
        /// Session ID to show
        session_id: String,
    },
    /// Load a bill from a JSON file
    Bill {
        /// Session ID to load the bill into
        session_id: String,
        /// JSON file with `items`, `totals` and an optional `alias`
        file: PathBuf,
    },
    /// Show what everyone owes
    Settle {
        /// Session ID to settle
        session_id: String,
    },
}

/// Run session command
pub async fn run(args: SessionArgs, http: &TabshareHttp) -> Result<()> {
    match args.command {
        SessionCommands::Create { session_id } => create_session(http, &session_id).await,
        SessionCommands::Show { session_id } => show_session(http, &session_id).await,
        SessionCommands::Bill { session_id, file } => load_bill(http, &session_id, &file).await,
        SessionCommands::Settle { session_id } => settle_session(http, &session_id).await,
    }
}

async fn create_session(http: &TabshareHttp, session_id: &str) -> Result<()> {
    let message = http.create_session(session_id).await?;
    println!("{}: {}", session_id, message);
    Ok(())
}

async fn show_session(http: &TabshareHttp, session_id: &str) -> Result<()> {
    let session = http.get_session(session_id).await?;
    let me = super::local_identity().await.ok().map(|identity| identity.id);

    let title = if session.alias.is_empty() {
        session.id.clone()
    } else {
        format!("{} ({})", session.alias, session.id)
    };
    println!("{}", title);
    println!("{}", render::items_table(&session, me.as_deref()));
    println!("{}", render::totals_line(&session));

    let participants = session.participants();
    if participants.is_empty() {
        println!("Nobody has joined yet");
    } else {
        let names: Vec<_> = participants.iter().map(|p| p.display_name.as_str()).collect();
        println!("Here now: {}", names.join(", "));
    }
    Ok(())
}

/// Parse a bill file
fn parse_bill(contents: &str) -> Result<IngestBillRequest> {
    serde_json::from_str(contents).context("Bill file must contain `items` and `totals`")
}

async fn load_bill(http: &TabshareHttp, session_id: &str, file: &Path) -> Result<()> {
    let contents = tokio::fs::read_to_string(file)
        .await
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let bill = parse_bill(&contents)?;

    let session = http.ingest_bill(session_id, &bill).await?;
    println!(
        "Loaded {} items into {}. {}",
        session.items.len(),
        session_id,
        render::totals_line(&session)
    );
    Ok(())
}

async fn settle_session(http: &TabshareHttp, session_id: &str) -> Result<()> {
    let settlement = http.settlement(session_id).await?;

    if settlement.shares.is_empty() {
        println!("Nothing has been claimed yet");
    } else {
        println!("{}", render::settlement_table(&settlement));
    }
    println!(
        "Collected {} of {}",
        render::money(settlement.collected()),
        render::money(settlement.total_info.total)
    );
    Ok(())
}
