use anyhow::{Result, bail};
use clap::Subcommand;
use comfy_table::Cell;

use super::ui;
use crate::core::analytics;
use crate::core::currency::{Currency, RateTable};
use crate::core::model::{AccountPatch, NewAccount};
use crate::core::store::FinanceStore;

#[derive(Debug, Subcommand)]
pub enum AccountsCmd {
    /// List accounts with their value in GBP
    List,
    /// Add a bank account
    Add {
        name: String,
        balance: f64,
        currency: Currency,
    },
    /// Remove an account by id
    Remove { id: String },
    /// Update fields of an account
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        balance: Option<f64>,
        #[arg(long)]
        currency: Option<Currency>,
    },
}

fn validate(balance: Option<f64>, currency: Option<Currency>) -> Result<()> {
    if let Some(balance) = balance {
        if !balance.is_finite() || balance < 0.0 {
            bail!("Balance must be a non-negative number");
        }
    }
    if let Some(currency) = currency {
        if !currency.is_account_currency() {
            bail!("Currency {currency} is not available for accounts");
        }
    }
    Ok(())
}

pub fn run(command: AccountsCmd, store: &mut FinanceStore, rates: &RateTable) -> Result<()> {
    match command {
        AccountsCmd::List => list(store, rates),
        AccountsCmd::Add {
            name,
            balance,
            currency,
        } => {
            validate(Some(balance), Some(currency))?;
            let id = store.add_account(NewAccount {
                name,
                balance,
                currency,
            })?;
            println!("Added account {id}");
            Ok(())
        }
        AccountsCmd::Remove { id } => {
            store.remove_account(&id)?;
            println!("Removed account {id}");
            Ok(())
        }
        AccountsCmd::Update {
            id,
            name,
            balance,
            currency,
        } => {
            validate(balance, currency)?;
            store.update_account(
                &id,
                AccountPatch {
                    name,
                    balance,
                    currency,
                },
            )?;
            println!("Updated account {id}");
            Ok(())
        }
    }
}

fn list(store: &FinanceStore, rates: &RateTable) -> Result<()> {
    let accounts = &store.ledger().accounts;
    if accounts.is_empty() {
        println!("No accounts added yet. Add an account to get started.");
        return Ok(());
    }

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Name"),
        ui::header_cell("Balance"),
        ui::header_cell("Value (GBP)"),
        ui::header_cell("Id"),
    ]);

    for account in accounts {
        let value = rates.to_reference(account.balance, account.currency)?;
        table.add_row(vec![
            Cell::new(&account.name),
            Cell::new(format!(
                "{}{:.2}",
                account.currency.symbol(),
                account.balance
            )),
            Cell::new(ui::money(value)),
            Cell::new(ui::style_text(&account.id, ui::StyleType::Subtle)),
        ]);
    }

    println!("{table}");

    let total = analytics::total_accounts_value(accounts, rates)?;
    println!(
        "\n{} {}",
        ui::style_text("Total (GBP):", ui::StyleType::TotalLabel),
        ui::style_text(&ui::money(total), ui::StyleType::TotalValue)
    );
    Ok(())
}
