use anyhow::{Result, bail};
use clap::Subcommand;

use super::ui;
use crate::core::analytics;
use crate::core::currency::{Currency, RateTable};
use crate::core::model::{NewRecurringExpense, RecurringExpense, RecurringExpensePatch};
use crate::core::store::FinanceStore;

#[derive(Debug, Subcommand)]
pub enum ExpensesCmd {
    /// List subscriptions and fixed expenses grouped by billing day
    List,
    /// Add a recurring expense
    Add {
        name: String,
        amount: f64,
        currency: Currency,
        /// Day of the month the expense is due
        #[arg(value_parser = clap::value_parser!(u8).range(1..=31))]
        billing_day: u8,
        /// Record a fixed expense instead of a subscription
        #[arg(long)]
        fixed: bool,
    },
    /// Remove a recurring expense by id
    Remove {
        id: String,
        #[arg(long)]
        fixed: bool,
    },
    /// Flip the paid flag on a recurring expense
    Toggle {
        id: String,
        #[arg(long)]
        fixed: bool,
    },
    /// Update fields of a recurring expense
    Update {
        id: String,
        #[arg(long)]
        fixed: bool,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        amount: Option<f64>,
        #[arg(long)]
        currency: Option<Currency>,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=31))]
        billing_day: Option<u8>,
    },
}

fn validate(amount: Option<f64>, currency: Option<Currency>) -> Result<()> {
    if let Some(amount) = amount {
        if !amount.is_finite() || amount <= 0.0 {
            bail!("Amount must be a positive number");
        }
    }
    if let Some(currency) = currency {
        if !currency.is_account_currency() {
            bail!("Currency {currency} is not available for expenses");
        }
    }
    Ok(())
}

pub fn run(command: ExpensesCmd, store: &mut FinanceStore, rates: &RateTable) -> Result<()> {
    match command {
        ExpensesCmd::List => list(store, rates),
        ExpensesCmd::Add {
            name,
            amount,
            currency,
            billing_day,
            fixed,
        } => {
            validate(Some(amount), Some(currency))?;
            let new = NewRecurringExpense {
                name,
                amount,
                currency,
                billing_day,
            };
            let id = if fixed {
                store.add_fixed_expense(new)?
            } else {
                store.add_subscription(new)?
            };
            println!("Added {} {id}", kind_name(fixed));
            Ok(())
        }
        ExpensesCmd::Remove { id, fixed } => {
            if fixed {
                store.remove_fixed_expense(&id)?;
            } else {
                store.remove_subscription(&id)?;
            }
            println!("Removed {} {id}", kind_name(fixed));
            Ok(())
        }
        ExpensesCmd::Toggle { id, fixed } => {
            if fixed {
                store.toggle_fixed_expense_paid(&id)?;
            } else {
                store.toggle_subscription_paid(&id)?;
            }
            println!("Toggled {} {id}", kind_name(fixed));
            Ok(())
        }
        ExpensesCmd::Update {
            id,
            fixed,
            name,
            amount,
            currency,
            billing_day,
        } => {
            validate(amount, currency)?;
            let patch = RecurringExpensePatch {
                name,
                amount,
                currency,
                billing_day,
            };
            if fixed {
                store.update_fixed_expense(&id, patch)?;
            } else {
                store.update_subscription(&id, patch)?;
            }
            println!("Updated {} {id}", kind_name(fixed));
            Ok(())
        }
    }
}

fn kind_name(fixed: bool) -> &'static str {
    if fixed { "fixed expense" } else { "subscription" }
}

fn list(store: &FinanceStore, rates: &RateTable) -> Result<()> {
    let ledger = store.ledger();

    let subscriptions_total = analytics::total_unpaid_recurring(&ledger.subscriptions, rates)?;
    let fixed_total = analytics::total_unpaid_recurring(&ledger.fixed_expenses, rates)?;

    println!(
        "{} {}",
        ui::style_text("Monthly Expenses - Total Remaining:", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::money(subscriptions_total + fixed_total),
            ui::StyleType::TotalValue
        )
    );

    print_section(
        &format!("Subscriptions ({})", ui::money(subscriptions_total)),
        &ledger.subscriptions,
        rates,
    )?;
    print_section(
        &format!("Fixed Expenses ({})", ui::money(fixed_total)),
        &ledger.fixed_expenses,
        rates,
    )?;

    Ok(())
}

fn print_section(title: &str, records: &[RecurringExpense], rates: &RateTable) -> Result<()> {
    println!("\n{}", ui::style_text(title, ui::StyleType::Title));

    if records.is_empty() {
        println!("  No recurring expenses added yet.");
        return Ok(());
    }

    for (day, group) in analytics::group_by_billing_day(records) {
        println!(
            "  {}",
            ui::style_text(&format!("Due on day {day} of every month"), ui::StyleType::Subtle)
        );
        for record in group {
            let converted = rates.to_reference(record.amount, record.currency)?;
            let mark = if record.is_paid { "[x]" } else { "[ ]" };
            let line = format!(
                "  {mark} {:<20} {} {:>10.2}  {}  {}",
                record.name,
                record.currency,
                record.amount,
                ui::money(converted),
                ui::style_text(&record.id, ui::StyleType::Subtle),
            );
            if record.is_paid {
                println!("{}", ui::style_text(&line, ui::StyleType::Subtle));
            } else {
                println!("{line}");
            }
        }
    }
    Ok(())
}
