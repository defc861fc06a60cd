use anyhow::{Result, anyhow, bail};
use clap::Subcommand;
use comfy_table::Cell;

use super::ui;
use crate::core::analytics;
use crate::core::currency::{Currency, RateTable};
use crate::core::model::{NewPosition, Position, PositionPatch};
use crate::core::quote::{QuoteProvider, quote_for};
use crate::core::store::FinanceStore;

#[derive(Debug, Subcommand)]
pub enum PositionsCmd {
    /// List positions grouped by brokerage account, with live quotes
    List,
    /// Add an equity or cash position to a brokerage account
    Add {
        /// Brokerage account holding the position
        brokerage: String,
        /// Number of shares, or the balance for a cash position
        shares: f64,
        /// Ticker symbol; validated against the quote gateway
        #[arg(required_unless_present = "cash")]
        symbol: Option<String>,
        /// Record a cash balance instead of an equity
        #[arg(long)]
        cash: bool,
        /// Currency of the cash balance
        #[arg(long)]
        cash_currency: Option<Currency>,
    },
    /// Remove a single position row by id
    Remove { id: String },
    /// Close out every position row sharing a symbol, across brokerages
    Close { symbol: String },
    /// Update fields of a position
    Update {
        id: String,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        shares: Option<f64>,
        #[arg(long)]
        brokerage: Option<String>,
    },
}

pub async fn run(
    command: PositionsCmd,
    store: &mut FinanceStore,
    provider: &dyn QuoteProvider,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<()> {
    match command {
        PositionsCmd::List => list(store, provider, rates, quote_currency).await,
        PositionsCmd::Add {
            brokerage,
            shares,
            symbol,
            cash,
            cash_currency,
        } => add(store, provider, brokerage, shares, symbol, cash, cash_currency).await,
        PositionsCmd::Remove { id } => {
            store.remove_position(&id)?;
            println!("Removed position {id}");
            Ok(())
        }
        PositionsCmd::Close { symbol } => {
            let symbol = symbol.to_uppercase();
            let removed = store.close_position(&symbol)?;
            println!("Closed {removed} position(s) in {symbol}");
            Ok(())
        }
        PositionsCmd::Update {
            id,
            symbol,
            shares,
            brokerage,
        } => {
            if let Some(shares) = shares {
                if !shares.is_finite() || shares < 0.0 {
                    bail!("Amount must be a non-negative number");
                }
            }
            store.update_position(
                &id,
                PositionPatch {
                    symbol: symbol.map(|s| s.to_uppercase()),
                    shares,
                    brokerage_account: brokerage,
                },
            )?;
            println!("Updated position {id}");
            Ok(())
        }
    }
}

async fn add(
    store: &mut FinanceStore,
    provider: &dyn QuoteProvider,
    brokerage: String,
    shares: f64,
    symbol: Option<String>,
    cash: bool,
    cash_currency: Option<Currency>,
) -> Result<()> {
    if brokerage.trim().is_empty() {
        bail!("Brokerage account is required");
    }
    if !shares.is_finite() || shares < 0.0 {
        bail!("Amount must be a non-negative number");
    }

    if cash {
        let currency = cash_currency.ok_or_else(|| anyhow!("Currency is required for cash positions"))?;
        if !currency.is_account_currency() {
            bail!("Currency {currency} is not available for cash positions");
        }

        let id = store.add_position(NewPosition {
            symbol: format!("CASH_{currency}"),
            shares,
            brokerage_account: brokerage,
            is_cash: true,
            cash_currency: Some(currency),
        })?;
        println!("Added cash position {id}");
        return Ok(());
    }

    let symbol = symbol
        .ok_or_else(|| anyhow!("Stock symbol is required for non-cash positions"))?
        .to_uppercase();

    // Validate the ticker against the quote gateway before recording it.
    provider
        .fetch_quote(&symbol)
        .await
        .map_err(|e| anyhow!("Invalid stock symbol {symbol}: {e}"))?;

    let id = store.add_position(NewPosition {
        symbol,
        shares,
        brokerage_account: brokerage,
        is_cash: false,
        cash_currency: None,
    })?;
    println!("Added position {id}");
    Ok(())
}

async fn list(
    store: &FinanceStore,
    provider: &dyn QuoteProvider,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<()> {
    let positions = &store.ledger().positions;
    if positions.is_empty() {
        println!("No stocks in your portfolio. Add some positions to get started.");
        return Ok(());
    }

    let quotes = super::dashboard::fetch_position_quotes(store.ledger(), provider).await;
    let totals = analytics::brokerage_totals(positions, &quotes, rates, quote_currency)?;
    let groups = analytics::group_by_brokerage(positions);
    let group_count = groups.len();

    for ((name, members), group_total) in groups.into_iter().zip(totals) {
        println!(
            "{}  {}  {}",
            ui::style_text(&name, ui::StyleType::Title),
            ui::style_text(
                &format!("Total: {}", ui::money(group_total.total)),
                ui::StyleType::TotalLabel
            ),
            day_change_text(group_total.day_change, group_total.percent_change),
        );

        let mut table = ui::new_styled_table();
        table.set_header(vec![
            ui::header_cell("Symbol"),
            ui::header_cell("Shares"),
            ui::header_cell("Price"),
            ui::header_cell("Change"),
            ui::header_cell("Value (GBP)"),
            ui::header_cell("Id"),
        ]);

        for position in members {
            table.add_row(position_row(position, &quotes, rates, quote_currency)?);
        }

        println!("{table}");
        if group_count > 1 {
            ui::print_separator();
        }
    }

    Ok(())
}

fn day_change_text(day_change: f64, percent_change: f64) -> String {
    let text = format!(
        "{}{} ({:.2}%)",
        if day_change < 0.0 { "-" } else { "+" },
        ui::money(day_change.abs()),
        percent_change.abs()
    );
    if day_change < 0.0 {
        ui::style_text(&text, ui::StyleType::Error)
    } else {
        ui::style_text(&text, ui::StyleType::TotalValue)
    }
}

fn position_row(
    position: &Position,
    quotes: &std::collections::HashMap<String, Result<crate::core::quote::Quote>>,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<Vec<Cell>> {
    if position.is_cash {
        let currency = position.cash_currency.unwrap_or(Currency::Gbp);
        let value = rates.to_reference(position.shares, currency)?;
        return Ok(vec![
            Cell::new(format!("Cash Balance ({currency})")),
            Cell::new(format!("{:.2}", position.shares)),
            Cell::new("N/A"),
            Cell::new("N/A"),
            Cell::new(ui::money(value)),
            Cell::new(ui::style_text(&position.id, ui::StyleType::Subtle)),
        ]);
    }

    let quote = quote_for(quotes, &position.symbol);
    let value = quote
        .map(|q| rates.to_reference(q.price * position.shares, quote_currency))
        .transpose()?;

    Ok(vec![
        Cell::new(&position.symbol),
        Cell::new(format!("{:.2}", position.shares)),
        ui::format_optional_cell(quote.map(|q| q.price), |p| format!("{p:.2}")),
        quote.map_or_else(|| Cell::new("N/A"), |q| ui::change_cell(q.percent_change)),
        ui::format_optional_cell(value, ui::money),
        Cell::new(ui::style_text(&position.id, ui::StyleType::Subtle)),
    ])
}
