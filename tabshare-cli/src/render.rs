//! Terminal tables for sessions and settlements

use comfy_table::{Cell, Color, ContentArrangement, Table, presets::UTF8_FULL_CONDENSED};
use tabshare_core::settlement::{Settlement, round_cents};
use tabshare_core::{Item, Session};

/// Two-decimal money string
pub fn money(amount: f64) -> String {
    format!("{:.2}", round_cents(amount))
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(
        headers
            .iter()
            .map(|h| Cell::new(h).fg(Color::Cyan))
            .collect::<Vec<_>>(),
    );
    table
}

/// Buyer names, falling back to the id for participants no longer present
fn buyer_names(session: &Session, item: &Item) -> String {
    item.buyers
        .iter()
        .map(|id| {
            session
                .active_users
                .get(id)
                .cloned()
                .unwrap_or_else(|| id.clone())
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Items with their buyers; `me` marks the local participant's claims
pub fn items_table(session: &Session, me: Option<&str>) -> Table {
    let mut table = new_table(&["", "Id", "Item", "Qty", "Price", "Buyers", "Share"]);

    for item in &session.items {
        let mine = me.is_some_and(|id| item.has_buyer(id));
        let marker = if mine { Cell::new("✓").fg(Color::Green) } else { Cell::new("") };
        let share = if item.buyers.is_empty() {
            "-".to_string()
        } else {
            money(item.share_per_buyer())
        };
        table.add_row(vec![
            marker,
            Cell::new(&item.id),
            Cell::new(&item.name),
            Cell::new(item.quantity),
            Cell::new(money(item.price)),
            Cell::new(buyer_names(session, item)),
            Cell::new(share),
        ]);
    }

    table
}

/// Per-claimant breakdown with an unclaimed footer
pub fn settlement_table(settlement: &Settlement) -> Table {
    let mut table = new_table(&["Participant", "Items", "Tax", "Tip", "Total"]);

    for share in &settlement.shares {
        let name = share
            .display_name
            .clone()
            .unwrap_or_else(|| share.participant_id.clone());
        table.add_row(vec![
            name,
            money(share.items_subtotal),
            money(share.tax),
            money(share.tip),
            money(share.total),
        ]);
    }

    if settlement.unclaimed_subtotal > 0.0 {
        table.add_row(vec![
            Cell::new("(unclaimed)").fg(Color::Yellow),
            Cell::new(money(settlement.unclaimed_subtotal)).fg(Color::Yellow),
            Cell::new(""),
            Cell::new(""),
            Cell::new(""),
        ]);
    }

    table
}

/// One-line totals summary
pub fn totals_line(session: &Session) -> String {
    let info = session.total_info;
    format!(
        "Subtotal {}  Tax {}  Tip {}  Total {}",
        money(session.subtotal()),
        money(info.tax),
        money(info.tip),
        money(info.total)
    )
}
