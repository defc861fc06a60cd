use anyhow::Result;
use clap::Subcommand;
use comfy_table::Cell;

use super::ui;
use crate::core::currency::{Currency, RateTable};
use crate::core::pairs::PairWatchlist;

#[derive(Debug, Subcommand)]
pub enum CurrenciesCmd {
    /// Show watchlist pairs with their cross rates
    List,
    /// Add a currency pair to the watchlist
    Add { from: Currency, to: Currency },
    /// Remove a pair by id
    Remove { id: String },
}

pub fn run(
    command: CurrenciesCmd,
    watchlist: &mut PairWatchlist,
    rates: &RateTable,
) -> Result<()> {
    match command {
        CurrenciesCmd::List => list(watchlist, rates),
        CurrenciesCmd::Add { from, to } => {
            let id = watchlist.add(from, to)?;
            println!("Added currency pair {id}");
            Ok(())
        }
        CurrenciesCmd::Remove { id } => {
            watchlist.remove(&id)?;
            println!("Removed currency pair {id}");
            Ok(())
        }
    }
}

fn list(watchlist: &PairWatchlist, rates: &RateTable) -> Result<()> {
    if watchlist.pairs().is_empty() {
        println!("No currency pairs on the watchlist.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Pair"),
        ui::header_cell("Rate"),
        ui::header_cell("Id"),
    ]);

    for pair in watchlist.pairs() {
        let rate = rates.cross(pair.from, pair.to)?;
        table.add_row(vec![
            Cell::new(format!("{} → {}", pair.from, pair.to)),
            Cell::new(format!(
                "1 {} = {}{:.4}",
                pair.from,
                pair.to.symbol(),
                rate
            )),
            Cell::new(ui::style_text(&pair.id, ui::StyleType::Subtle)),
        ]);
    }

    println!("{table}");
    Ok(())
}
