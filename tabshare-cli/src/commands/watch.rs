//! Follow a session live
//!
//! Every snapshot the server pushes is fed through the view reducer and the
//! screen is redrawn. Typing an item id toggles the claim on it.

use anyhow::Result;
use clap::Args;
use tabshare_core::{ViewEvent, ViewState, ViewStatus};
use tabshare_server::ws::ServerMessage;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::client::SessionSocket;
use crate::render;

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Session ID to watch
    pub session_id: String,

    /// Watch without joining, even if a display name is set
    #[arg(long)]
    pub no_join: bool,
}

pub async fn run(args: WatchArgs, base_url: &str) -> Result<()> {
    let identity = super::local_identity().await?;
    let mut socket = SessionSocket::connect(base_url, &args.session_id, Some(&identity.id)).await?;
    let mut view = ViewState::new(args.session_id.clone());

    match identity.participant() {
        Some(participant) if !args.no_join => {
            socket.join(&participant.display_name).await?;
            view.apply(ViewEvent::Joined(participant));
        }
        _ => {}
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else {
                    println!("Connection to server closed");
                    break;
                };
                let event = view_event(&view, msg);
                view.apply(event);
                draw(&view);
                view.apply(ViewEvent::DismissError);
            }
            line = lines.next_line(), if stdin_open => {
                match line {
                    Ok(Some(line)) => {
                        let item_id = line.trim();
                        if item_id.is_empty() {
                            continue;
                        }
                        if view.can_claim() {
                            socket.toggle(item_id).await?;
                        } else {
                            view.apply(ViewEvent::MutationFailed(
                                "join the session with a name first".to_string(),
                            ));
                            draw(&view);
                            view.apply(ViewEvent::DismissError);
                        }
                    }
                    Ok(None) | Err(_) => stdin_open = false,
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    Ok(())
}

/// Translate a server push into a reducer event
fn view_event(view: &ViewState, msg: ServerMessage) -> ViewEvent {
    match msg {
        ServerMessage::Snapshot { session } => ViewEvent::Snapshot(session),
        ServerMessage::Error { code, .. } if code == "NOT_FOUND" => ViewEvent::Missing,
        ServerMessage::Error { message, .. } if view.session.is_none() => {
            ViewEvent::StreamFailed(message)
        }
        ServerMessage::Error { message, .. } => ViewEvent::MutationFailed(message),
    }
}

fn draw(view: &ViewState) {
    // Clear screen and home cursor
    print!("\x1b[2J\x1b[H");

    match &view.status {
        ViewStatus::Loading => println!("Loading {}...", view.session_id),
        ViewStatus::NotFound => {
            println!("Session {} does not exist yet; waiting for it", view.session_id)
        }
        ViewStatus::Failed(message) => println!("\x1b[31mCannot follow session: {}\x1b[0m", message),
        ViewStatus::Ready => {
            if let Some(session) = &view.session {
                let me = view.participant.as_ref().map(|p| p.id.as_str());
                println!("{}", render::items_table(session, me));
                println!("{}", render::totals_line(session));
            }
            if let Some(settlement) = view.settlement() {
                if settlement.unclaimed_subtotal > 0.0 {
                    println!("Unclaimed: {}", render::money(settlement.unclaimed_subtotal));
                }
            }
            match &view.participant {
                Some(me) => println!(
                    "{}, you owe {}. Type an item id to claim or release it.",
                    me.display_name,
                    render::money(view.owed())
                ),
                None => println!("Watching read-only; run `tabshare join` to claim items"),
            }
        }
    }

    if let Some(banner) = &view.banner {
        println!("\x1b[31m{}\x1b[0m", banner);
    }
}
