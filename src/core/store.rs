//! The record store: an explicit state container over the [`Ledger`].
//!
//! Mutations are synchronous and commit the full serialized ledger to the
//! injected storage backend before returning, so the durable blob always
//! reflects the last completed operation. Removal and update by an unknown
//! id are silent no-ops, matching the editing flows that call them.

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::model::{
    Account, AccountPatch, FutureExpense, FutureExpensePatch, FutureGain, FutureGainPatch,
    FutureStock, FutureStockPatch, Ledger, NewAccount, NewFutureExpense, NewFutureGain,
    NewFutureStock, NewPosition, NewRecurringExpense, Position, PositionPatch, RecurringExpense,
    RecurringExpensePatch,
};
use crate::store::{LEDGER_KEY, Storage};

fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub struct FinanceStore {
    ledger: Ledger,
    storage: Arc<dyn Storage>,
}

impl FinanceStore {
    /// Rehydrates the ledger from storage. A missing or malformed blob
    /// silently yields the empty ledger.
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let ledger = match storage.read(LEDGER_KEY) {
            Some(bytes) => match serde_json::from_slice(&bytes) {
                Ok(ledger) => ledger,
                Err(e) => {
                    debug!("Discarding malformed ledger blob: {e}");
                    Ledger::default()
                }
            },
            None => Ledger::default(),
        };

        Self { ledger, storage }
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn commit(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.ledger).context("Failed to serialize ledger")?;
        self.storage.write(LEDGER_KEY, &bytes)
    }

    // Accounts

    pub fn add_account(&mut self, new: NewAccount) -> Result<String> {
        let id = new_id();
        self.ledger.accounts.push(Account {
            id: id.clone(),
            name: new.name,
            balance: new.balance,
            currency: new.currency,
        });
        self.commit()?;
        Ok(id)
    }

    pub fn remove_account(&mut self, id: &str) -> Result<()> {
        self.ledger.accounts.retain(|a| a.id != id);
        self.commit()
    }

    pub fn update_account(&mut self, id: &str, patch: AccountPatch) -> Result<()> {
        if let Some(account) = self.ledger.accounts.iter_mut().find(|a| a.id == id) {
            if let Some(name) = patch.name {
                account.name = name;
            }
            if let Some(balance) = patch.balance {
                account.balance = balance;
            }
            if let Some(currency) = patch.currency {
                account.currency = currency;
            }
        }
        self.commit()
    }

    // Positions

    pub fn add_position(&mut self, new: NewPosition) -> Result<String> {
        let id = new_id();
        self.ledger.positions.push(Position {
            id: id.clone(),
            symbol: new.symbol,
            shares: new.shares,
            brokerage_account: new.brokerage_account,
            is_cash: new.is_cash,
            cash_currency: new.cash_currency,
        });
        self.commit()?;
        Ok(id)
    }

    pub fn remove_position(&mut self, id: &str) -> Result<()> {
        self.ledger.positions.retain(|p| p.id != id);
        self.commit()
    }

    /// Closes out every position row sharing `symbol`, across brokerages and
    /// including cash rows that were entered under it. Returns the number of
    /// rows removed. Per-id [`remove_position`](Self::remove_position) is the
    /// precise removal operation.
    pub fn close_position(&mut self, symbol: &str) -> Result<usize> {
        let before = self.ledger.positions.len();
        self.ledger.positions.retain(|p| p.symbol != symbol);
        let removed = before - self.ledger.positions.len();
        self.commit()?;
        Ok(removed)
    }

    pub fn update_position(&mut self, id: &str, patch: PositionPatch) -> Result<()> {
        if let Some(position) = self.ledger.positions.iter_mut().find(|p| p.id == id) {
            if let Some(symbol) = patch.symbol {
                position.symbol = symbol;
            }
            if let Some(shares) = patch.shares {
                position.shares = shares;
            }
            if let Some(brokerage_account) = patch.brokerage_account {
                position.brokerage_account = brokerage_account;
            }
        }
        self.commit()
    }

    // Future stocks

    pub fn add_future_stock(&mut self, new: NewFutureStock) -> Result<String> {
        let id = new_id();
        self.ledger.future_stocks.push(FutureStock {
            id: id.clone(),
            symbol: new.symbol,
            shares: new.shares,
            vesting_date: new.vesting_date,
        });
        self.commit()?;
        Ok(id)
    }

    pub fn remove_future_stock(&mut self, id: &str) -> Result<()> {
        self.ledger.future_stocks.retain(|s| s.id != id);
        self.commit()
    }

    pub fn update_future_stock(&mut self, id: &str, patch: FutureStockPatch) -> Result<()> {
        if let Some(stock) = self.ledger.future_stocks.iter_mut().find(|s| s.id == id) {
            if let Some(symbol) = patch.symbol {
                stock.symbol = symbol;
            }
            if let Some(shares) = patch.shares {
                stock.shares = shares;
            }
            if let Some(vesting_date) = patch.vesting_date {
                stock.vesting_date = vesting_date;
            }
        }
        self.commit()
    }

    // Future gains

    pub fn add_future_gain(&mut self, new: NewFutureGain) -> Result<String> {
        let id = new_id();
        self.ledger.future_gains.push(FutureGain {
            id: id.clone(),
            name: new.name,
            amount: new.amount,
            currency: new.currency,
            kind: new.kind,
            vesting_date: new.vesting_date,
        });
        self.commit()?;
        Ok(id)
    }

    pub fn remove_future_gain(&mut self, id: &str) -> Result<()> {
        self.ledger.future_gains.retain(|g| g.id != id);
        self.commit()
    }

    pub fn update_future_gain(&mut self, id: &str, patch: FutureGainPatch) -> Result<()> {
        if let Some(gain) = self.ledger.future_gains.iter_mut().find(|g| g.id == id) {
            if let Some(name) = patch.name {
                gain.name = name;
            }
            if let Some(amount) = patch.amount {
                gain.amount = amount;
            }
            if let Some(currency) = patch.currency {
                gain.currency = currency;
            }
            if let Some(kind) = patch.kind {
                gain.kind = kind;
            }
            if let Some(vesting_date) = patch.vesting_date {
                gain.vesting_date = Some(vesting_date);
            }
        }
        self.commit()
    }

    // Future expenses

    pub fn add_future_expense(&mut self, new: NewFutureExpense) -> Result<String> {
        let id = new_id();
        self.ledger.future_expenses.push(FutureExpense {
            id: id.clone(),
            name: new.name,
            amount: new.amount,
            currency: new.currency,
            date: new.date,
            notes: new.notes,
        });
        self.commit()?;
        Ok(id)
    }

    pub fn remove_future_expense(&mut self, id: &str) -> Result<()> {
        self.ledger.future_expenses.retain(|e| e.id != id);
        self.commit()
    }

    pub fn update_future_expense(&mut self, id: &str, patch: FutureExpensePatch) -> Result<()> {
        if let Some(expense) = self.ledger.future_expenses.iter_mut().find(|e| e.id == id) {
            if let Some(name) = patch.name {
                expense.name = name;
            }
            if let Some(amount) = patch.amount {
                expense.amount = amount;
            }
            if let Some(currency) = patch.currency {
                expense.currency = currency;
            }
            if let Some(date) = patch.date {
                expense.date = date;
            }
            if let Some(notes) = patch.notes {
                expense.notes = Some(notes);
            }
        }
        self.commit()
    }

    // Subscriptions

    pub fn add_subscription(&mut self, new: NewRecurringExpense) -> Result<String> {
        let id = new_id();
        self.ledger.subscriptions.push(recurring(id.clone(), new));
        self.commit()?;
        Ok(id)
    }

    pub fn remove_subscription(&mut self, id: &str) -> Result<()> {
        self.ledger.subscriptions.retain(|s| s.id != id);
        self.commit()
    }

    pub fn update_subscription(&mut self, id: &str, patch: RecurringExpensePatch) -> Result<()> {
        apply_recurring_patch(&mut self.ledger.subscriptions, id, patch);
        self.commit()
    }

    pub fn toggle_subscription_paid(&mut self, id: &str) -> Result<()> {
        toggle_paid(&mut self.ledger.subscriptions, id);
        self.commit()
    }

    // Fixed expenses

    pub fn add_fixed_expense(&mut self, new: NewRecurringExpense) -> Result<String> {
        let id = new_id();
        self.ledger.fixed_expenses.push(recurring(id.clone(), new));
        self.commit()?;
        Ok(id)
    }

    pub fn remove_fixed_expense(&mut self, id: &str) -> Result<()> {
        self.ledger.fixed_expenses.retain(|e| e.id != id);
        self.commit()
    }

    pub fn update_fixed_expense(&mut self, id: &str, patch: RecurringExpensePatch) -> Result<()> {
        apply_recurring_patch(&mut self.ledger.fixed_expenses, id, patch);
        self.commit()
    }

    pub fn toggle_fixed_expense_paid(&mut self, id: &str) -> Result<()> {
        toggle_paid(&mut self.ledger.fixed_expenses, id);
        self.commit()
    }
}

fn recurring(id: String, new: NewRecurringExpense) -> RecurringExpense {
    RecurringExpense {
        id,
        name: new.name,
        amount: new.amount,
        currency: new.currency,
        billing_day: new.billing_day,
        is_paid: false,
    }
}

fn apply_recurring_patch(records: &mut [RecurringExpense], id: &str, patch: RecurringExpensePatch) {
    if let Some(record) = records.iter_mut().find(|r| r.id == id) {
        if let Some(name) = patch.name {
            record.name = name;
        }
        if let Some(amount) = patch.amount {
            record.amount = amount;
        }
        if let Some(currency) = patch.currency {
            record.currency = currency;
        }
        if let Some(billing_day) = patch.billing_day {
            record.billing_day = billing_day;
        }
    }
}

fn toggle_paid(records: &mut [RecurringExpense], id: &str) {
    if let Some(record) = records.iter_mut().find(|r| r.id == id) {
        record.is_paid = !record.is_paid;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::currency::Currency;
    use crate::store::memory::MemoryStorage;

    fn empty_store() -> FinanceStore {
        FinanceStore::open(Arc::new(MemoryStorage::new()))
    }

    fn checking_account() -> NewAccount {
        NewAccount {
            name: "Checking".into(),
            balance: 1000.0,
            currency: Currency::Usd,
        }
    }

    fn gym_subscription() -> NewRecurringExpense {
        NewRecurringExpense {
            name: "Gym".into(),
            amount: 30.0,
            currency: Currency::Gbp,
            billing_day: 15,
        }
    }

    #[test]
    fn test_add_assigns_unique_ids_and_preserves_order() {
        let mut store = empty_store();
        let first = store.add_account(checking_account()).unwrap();
        let second = store
            .add_account(NewAccount {
                name: "Savings".into(),
                balance: 500.0,
                currency: Currency::Gbp,
            })
            .unwrap();

        assert_ne!(first, second);
        let names: Vec<_> = store.ledger().accounts.iter().map(|a| &a.name).collect();
        assert_eq!(names, ["Checking", "Savings"]);
    }

    #[test]
    fn test_add_then_remove_restores_collection() {
        let mut store = empty_store();
        store.add_account(checking_account()).unwrap();
        let original = store.ledger().accounts.clone();

        let id = store
            .add_account(NewAccount {
                name: "Temporary".into(),
                balance: 1.0,
                currency: Currency::Gbp,
            })
            .unwrap();
        store.remove_account(&id).unwrap();

        assert_eq!(store.ledger().accounts, original);
    }

    #[test]
    fn test_remove_unknown_id_is_a_noop() {
        let mut store = empty_store();
        store.add_account(checking_account()).unwrap();
        store.remove_account("no-such-id").unwrap();
        assert_eq!(store.ledger().accounts.len(), 1);
    }

    #[test]
    fn test_update_merges_partial_fields() {
        let mut store = empty_store();
        let id = store.add_account(checking_account()).unwrap();

        store
            .update_account(
                &id,
                AccountPatch {
                    balance: Some(1250.0),
                    ..AccountPatch::default()
                },
            )
            .unwrap();

        let account = &store.ledger().accounts[0];
        assert_eq!(account.balance, 1250.0);
        assert_eq!(account.name, "Checking");
        assert_eq!(account.currency, Currency::Usd);
    }

    #[test]
    fn test_update_unknown_id_is_a_noop() {
        let mut store = empty_store();
        store.add_account(checking_account()).unwrap();
        store
            .update_account(
                "no-such-id",
                AccountPatch {
                    balance: Some(0.0),
                    ..AccountPatch::default()
                },
            )
            .unwrap();
        assert_eq!(store.ledger().accounts[0].balance, 1000.0);
    }

    #[test]
    fn test_subscription_defaults_to_unpaid() {
        let mut store = empty_store();
        store.add_subscription(gym_subscription()).unwrap();
        assert!(!store.ledger().subscriptions[0].is_paid);
    }

    #[test]
    fn test_toggle_paid_twice_round_trips() {
        let mut store = empty_store();
        let id = store.add_subscription(gym_subscription()).unwrap();

        store.toggle_subscription_paid(&id).unwrap();
        assert!(store.ledger().subscriptions[0].is_paid);

        store.toggle_subscription_paid(&id).unwrap();
        assert!(!store.ledger().subscriptions[0].is_paid);
    }

    #[test]
    fn test_subscription_patch_cannot_touch_paid_flag() {
        let mut store = empty_store();
        let id = store.add_subscription(gym_subscription()).unwrap();
        store.toggle_subscription_paid(&id).unwrap();

        store
            .update_subscription(
                &id,
                RecurringExpensePatch {
                    amount: Some(45.0),
                    ..RecurringExpensePatch::default()
                },
            )
            .unwrap();

        let sub = &store.ledger().subscriptions[0];
        assert_eq!(sub.amount, 45.0);
        assert!(sub.is_paid);
    }

    #[test]
    fn test_close_position_removes_every_row_with_symbol() {
        let mut store = empty_store();
        for brokerage in ["Vanguard", "Schwab"] {
            store
                .add_position(NewPosition {
                    symbol: "AAPL".into(),
                    shares: 5.0,
                    brokerage_account: brokerage.into(),
                    is_cash: false,
                    cash_currency: None,
                })
                .unwrap();
        }
        store
            .add_position(NewPosition {
                symbol: "MSFT".into(),
                shares: 3.0,
                brokerage_account: "Vanguard".into(),
                is_cash: false,
                cash_currency: None,
            })
            .unwrap();

        let removed = store.close_position("AAPL").unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.ledger().positions.len(), 1);
        assert_eq!(store.ledger().positions[0].symbol, "MSFT");
    }

    #[test]
    fn test_state_round_trips_through_storage() {
        let storage = Arc::new(MemoryStorage::new());

        let mut store = FinanceStore::open(Arc::clone(&storage) as Arc<dyn Storage>);
        store.add_account(checking_account()).unwrap();
        store.add_subscription(gym_subscription()).unwrap();
        store
            .add_future_stock(NewFutureStock {
                symbol: "AAPL".into(),
                shares: 12.0,
                vesting_date: "2027-03-01".parse().unwrap(),
            })
            .unwrap();
        let expected = store.ledger().clone();

        let reopened = FinanceStore::open(storage);
        assert_eq!(reopened.ledger(), &expected);
    }

    #[test]
    fn test_malformed_blob_falls_back_to_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.write(LEDGER_KEY, b"{not json").unwrap();

        let store = FinanceStore::open(storage);
        assert_eq!(store.ledger(), &Ledger::default());
    }
}
