use anyhow::Result;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::debug;

use super::{dashboard, ui};
use crate::core::analytics;
use crate::core::board::QuoteBoard;
use crate::core::config::AppConfig;
use crate::core::currency::RateTable;
use crate::core::model::Ledger;
use crate::core::quote::{QuoteProvider, fetch_quotes};

/// Polls quotes on the configured interval and redraws the dashboard.
///
/// Each tick spawns an independent batch fetch stamped with a generation
/// from the quote board; a batch that resolves after a newer one has been
/// applied is discarded rather than painted over it.
pub async fn run(
    ledger: &Ledger,
    provider: Arc<dyn QuoteProvider>,
    rates: &RateTable,
    config: &AppConfig,
) -> Result<()> {
    let symbols: Vec<String> = ledger
        .positions
        .iter()
        .filter(|p| !p.is_cash)
        .map(|p| p.symbol.clone())
        .collect();

    let interval = config.refresh_interval_secs.max(1);
    println!(
        "{}",
        ui::style_text(
            &format!("Polling quotes every {interval}s, press Ctrl-C to stop"),
            ui::StyleType::Subtle
        )
    );

    let mut board = QuoteBoard::new();
    let (tx, mut rx) = mpsc::unbounded_channel();
    let mut ticker = tokio::time::interval(Duration::from_secs(interval));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let generation = board.begin_poll();
                let provider = Arc::clone(&provider);
                let symbols = symbols.clone();
                let tx = tx.clone();
                tokio::spawn(async move {
                    let quotes = fetch_quotes(provider.as_ref(), symbols).await;
                    let _ = tx.send((generation, quotes));
                });
            }
            Some((generation, quotes)) = rx.recv() => {
                if !board.apply(generation, quotes) {
                    continue;
                }
                let summary = analytics::wealth_summary(
                    ledger,
                    board.quotes(),
                    rates,
                    config.quote_currency,
                )?;

                let term = console::Term::stdout();
                term.clear_screen().ok();
                println!("{}", dashboard::render(&summary));
                println!(
                    "{}",
                    ui::style_text(
                        &format!("Updated {}", chrono::Local::now().format("%H:%M:%S")),
                        ui::StyleType::Subtle
                    )
                );
            }
            _ = tokio::signal::ctrl_c() => {
                debug!("Stopping watch loop");
                break;
            }
        }
    }

    Ok(())
}
