use anyhow::{Result, bail};
use chrono::NaiveDate;
use clap::Subcommand;
use comfy_table::Cell;

use super::ui;
use crate::core::analytics;
use crate::core::currency::{Currency, RateTable};
use crate::core::model::{
    FutureExpensePatch, FutureGainPatch, FutureStockPatch, GainKind, NewFutureExpense,
    NewFutureGain, NewFutureStock,
};
use crate::core::quote::{QuoteProvider, fetch_quotes, quote_for};
use crate::core::store::FinanceStore;

#[derive(Debug, Subcommand)]
pub enum FutureCmd {
    /// Anticipated stock vests
    #[command(subcommand)]
    Stocks(StocksCmd),
    /// Anticipated gains such as pensions or already-vested stock
    #[command(subcommand)]
    Gains(GainsCmd),
    /// Anticipated one-off expenses
    #[command(subcommand)]
    Expenses(ExpensesCmd),
}

#[derive(Debug, Subcommand)]
pub enum StocksCmd {
    /// List future vests with their estimated value at current prices
    List,
    /// Add a future stock grant
    Add {
        symbol: String,
        shares: f64,
        vesting_date: NaiveDate,
    },
    /// Remove a future stock grant by id
    Remove { id: String },
    /// Update fields of a future stock grant
    Update {
        id: String,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        shares: Option<f64>,
        #[arg(long)]
        vesting_date: Option<NaiveDate>,
    },
}

#[derive(Debug, Subcommand)]
pub enum GainsCmd {
    /// List expected future gains
    List,
    /// Add a future gain
    Add {
        name: String,
        amount: f64,
        currency: Currency,
        /// One of: pension, vested_stock, other
        #[arg(long, default_value = "other")]
        kind: GainKind,
        #[arg(long)]
        vesting_date: Option<NaiveDate>,
    },
    /// Remove a future gain by id
    Remove { id: String },
    /// Update fields of a future gain
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long)]
        kind: Option<GainKind>,
        #[arg(long)]
        vesting_date: Option<NaiveDate>,
    },
}

#[derive(Debug, Subcommand)]
pub enum ExpensesCmd {
    /// List expected future expenses
    List,
    /// Add a future expense
    Add {
        name: String,
        amount: f64,
        currency: Currency,
        date: NaiveDate,
        #[arg(long)]
        notes: Option<String>,
    },
    /// Remove a future expense by id
    Remove { id: String },
    /// Update fields of a future expense
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long)]
        date: Option<NaiveDate>,
        #[arg(long)]
        notes: Option<String>,
    },
}

pub async fn run(
    command: FutureCmd,
    store: &mut FinanceStore,
    provider: &dyn QuoteProvider,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<()> {
    match command {
        FutureCmd::Stocks(cmd) => run_stocks(cmd, store, provider, rates, quote_currency).await,
        FutureCmd::Gains(cmd) => run_gains(cmd, store, rates),
        FutureCmd::Expenses(cmd) => run_expenses(cmd, store, rates),
    }
}

async fn run_stocks(
    command: StocksCmd,
    store: &mut FinanceStore,
    provider: &dyn QuoteProvider,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<()> {
    match command {
        StocksCmd::List => list_stocks(store, provider, rates, quote_currency).await,
        StocksCmd::Add {
            symbol,
            shares,
            vesting_date,
        } => {
            if !shares.is_finite() || shares <= 0.0 {
                bail!("Shares must be a positive number");
            }
            let id = store.add_future_stock(NewFutureStock {
                symbol: symbol.to_uppercase(),
                shares,
                vesting_date,
            })?;
            println!("Added future stock {id}");
            Ok(())
        }
        StocksCmd::Remove { id } => {
            store.remove_future_stock(&id)?;
            println!("Removed future stock {id}");
            Ok(())
        }
        StocksCmd::Update {
            id,
            symbol,
            shares,
            vesting_date,
        } => {
            if let Some(shares) = shares {
                if !shares.is_finite() || shares <= 0.0 {
                    bail!("Shares must be a positive number");
                }
            }
            store.update_future_stock(
                &id,
                FutureStockPatch {
                    symbol: symbol.map(|s| s.to_uppercase()),
                    shares,
                    vesting_date,
                },
            )?;
            println!("Updated future stock {id}");
            Ok(())
        }
    }
}

async fn list_stocks(
    store: &FinanceStore,
    provider: &dyn QuoteProvider,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<()> {
    let grants = &store.ledger().future_stocks;
    if grants.is_empty() {
        println!("No future stock grants added yet.");
        return Ok(());
    }

    let spinner = ui::new_spinner("Fetching quotes...");
    let quotes = fetch_quotes(provider, grants.iter().map(|g| g.symbol.clone())).await;
    spinner.finish_and_clear();

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Symbol"),
        ui::header_cell("Shares"),
        ui::header_cell("Vesting"),
        ui::header_cell("Est. Value (GBP)"),
        ui::header_cell("Id"),
    ]);

    for grant in grants {
        let value = quote_for(&quotes, &grant.symbol)
            .map(|q| rates.to_reference(q.price * grant.shares, quote_currency))
            .transpose()?;
        table.add_row(vec![
            Cell::new(&grant.symbol),
            Cell::new(format!("{:.2}", grant.shares)),
            Cell::new(grant.vesting_date.format("%d %b %Y").to_string()),
            ui::format_optional_cell(value, ui::money),
            Cell::new(ui::style_text(&grant.id, ui::StyleType::Subtle)),
        ]);
    }

    println!("{table}");

    let total = analytics::future_stock_value(grants, &quotes, rates, quote_currency)?;
    println!(
        "\n{} {}",
        ui::style_text("Estimated future value:", ui::StyleType::TotalLabel),
        ui::style_text(&ui::money(total), ui::StyleType::TotalValue)
    );
    Ok(())
}

fn run_gains(command: GainsCmd, store: &mut FinanceStore, rates: &RateTable) -> Result<()> {
    match command {
        GainsCmd::List => {
            let gains = &store.ledger().future_gains;
            if gains.is_empty() {
                println!("No future gains added yet.");
                return Ok(());
            }

            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Name"),
                ui::header_cell("Kind"),
                ui::header_cell("Amount"),
                ui::header_cell("Value (GBP)"),
                ui::header_cell("Vesting"),
                ui::header_cell("Id"),
            ]);

            for gain in gains {
                let value = rates.to_reference(gain.amount, gain.currency)?;
                table.add_row(vec![
                    Cell::new(&gain.name),
                    Cell::new(gain.kind.label()),
                    Cell::new(format!("{} {:.2}", gain.currency, gain.amount)),
                    Cell::new(ui::money(value)),
                    ui::format_optional_cell(gain.vesting_date, |d| {
                        d.format("%d %b %Y").to_string()
                    }),
                    Cell::new(ui::style_text(&gain.id, ui::StyleType::Subtle)),
                ]);
            }

            println!("{table}");

            let total = analytics::total_future_gains(gains, rates)?;
            println!(
                "\n{} {}",
                ui::style_text("Expected future value:", ui::StyleType::TotalLabel),
                ui::style_text(&ui::money(total), ui::StyleType::TotalValue)
            );
            Ok(())
        }
        GainsCmd::Add {
            name,
            amount,
            currency,
            kind,
            vesting_date,
        } => {
            if !amount.is_finite() || amount <= 0.0 {
                bail!("Amount must be a positive number");
            }
            let id = store.add_future_gain(NewFutureGain {
                name,
                amount,
                currency,
                kind,
                vesting_date,
            })?;
            println!("Added future gain {id}");
            Ok(())
        }
        GainsCmd::Remove { id } => {
            store.remove_future_gain(&id)?;
            println!("Removed future gain {id}");
            Ok(())
        }
        GainsCmd::Update {
            id,
            name,
            amount,
            currency,
            kind,
            vesting_date,
        } => {
            if let Some(amount) = amount {
                if !amount.is_finite() || amount <= 0.0 {
                    bail!("Amount must be a positive number");
                }
            }
            store.update_future_gain(
                &id,
                FutureGainPatch {
                    name,
                    amount,
                    currency,
                    kind,
                    vesting_date,
                },
            )?;
            println!("Updated future gain {id}");
            Ok(())
        }
    }
}

fn run_expenses(command: ExpensesCmd, store: &mut FinanceStore, rates: &RateTable) -> Result<()> {
    match command {
        ExpensesCmd::List => {
            let expenses = &store.ledger().future_expenses;
            if expenses.is_empty() {
                println!("No future expenses added yet.");
                return Ok(());
            }

            let mut table = ui::new_styled_table();
            table.set_header(vec![
                ui::header_cell("Name"),
                ui::header_cell("Amount"),
                ui::header_cell("Value (GBP)"),
                ui::header_cell("Date"),
                ui::header_cell("Notes"),
                ui::header_cell("Id"),
            ]);

            for expense in expenses {
                let value = rates.to_reference(expense.amount, expense.currency)?;
                table.add_row(vec![
                    Cell::new(&expense.name),
                    Cell::new(format!("{} {:.2}", expense.currency, expense.amount)),
                    Cell::new(ui::money(value)),
                    Cell::new(expense.date.format("%d %b %Y").to_string()),
                    Cell::new(expense.notes.as_deref().unwrap_or("")),
                    Cell::new(ui::style_text(&expense.id, ui::StyleType::Subtle)),
                ]);
            }

            println!("{table}");

            let total = analytics::total_future_expenses(expenses, rates)?;
            println!(
                "\n{} {}",
                ui::style_text("Expected future expenses:", ui::StyleType::TotalLabel),
                ui::style_text(&ui::money(total), ui::StyleType::Error)
            );
            Ok(())
        }
        ExpensesCmd::Add {
            name,
            amount,
            currency,
            date,
            notes,
        } => {
            let id = store.add_future_expense(NewFutureExpense {
                name,
                amount,
                currency,
                date,
                notes,
            })?;
            println!("Added future expense {id}");
            Ok(())
        }
        ExpensesCmd::Remove { id } => {
            store.remove_future_expense(&id)?;
            println!("Removed future expense {id}");
            Ok(())
        }
        ExpensesCmd::Update {
            id,
            name,
            amount,
            currency,
            date,
            notes,
        } => {
            store.update_future_expense(
                &id,
                FutureExpensePatch {
                    name,
                    amount,
                    currency,
                    date,
                    notes,
                },
            )?;
            println!("Updated future expense {id}");
            Ok(())
        }
    }
}
