//! Record types held by the finance store.
//!
//! Every record carries a generated id and lives in one of the seven ledger
//! collections. Updates go through closed per-kind patch structs so editing
//! paths are checked at compile time; the paid flag of recurring expenses is
//! deliberately absent from its patch and only reachable via the dedicated
//! toggle operation.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::core::currency::Currency;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub balance: f64,
    pub currency: Currency,
}

/// A brokerage holding: either an equity (ticker + share count) or a cash
/// balance. `cash_currency` is required iff `is_cash` is set; the store does
/// not enforce symbol uniqueness, duplicate rows double-count in aggregates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub id: String,
    pub symbol: String,
    pub shares: f64,
    pub brokerage_account: String,
    #[serde(default)]
    pub is_cash: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_currency: Option<Currency>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureStock {
    pub id: String,
    pub symbol: String,
    pub shares: f64,
    pub vesting_date: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GainKind {
    Pension,
    VestedStock,
    Other,
}

impl GainKind {
    pub fn label(&self) -> &'static str {
        match self {
            GainKind::Pension => "Pension",
            GainKind::VestedStock => "Vested Stock",
            GainKind::Other => "Other",
        }
    }
}

impl Display for GainKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl FromStr for GainKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pension" => Ok(GainKind::Pension),
            "vested_stock" => Ok(GainKind::VestedStock),
            "other" => Ok(GainKind::Other),
            _ => Err(format!("Unknown gain kind: {s}")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureGain {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub currency: Currency,
    pub kind: GainKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vesting_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FutureExpense {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub currency: Currency,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// A subscription or fixed monthly expense, due on `billing_day` (1-31).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringExpense {
    pub id: String,
    pub name: String,
    pub amount: f64,
    pub currency: Currency,
    pub billing_day: u8,
    #[serde(default)]
    pub is_paid: bool,
}

// Input shapes for add operations. Ids (and the paid flag) are assigned by
// the store.

#[derive(Debug, Clone)]
pub struct NewAccount {
    pub name: String,
    pub balance: f64,
    pub currency: Currency,
}

#[derive(Debug, Clone)]
pub struct NewPosition {
    pub symbol: String,
    pub shares: f64,
    pub brokerage_account: String,
    pub is_cash: bool,
    pub cash_currency: Option<Currency>,
}

#[derive(Debug, Clone)]
pub struct NewFutureStock {
    pub symbol: String,
    pub shares: f64,
    pub vesting_date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewFutureGain {
    pub name: String,
    pub amount: f64,
    pub currency: Currency,
    pub kind: GainKind,
    pub vesting_date: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct NewFutureExpense {
    pub name: String,
    pub amount: f64,
    pub currency: Currency,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewRecurringExpense {
    pub name: String,
    pub amount: f64,
    pub currency: Currency,
    pub billing_day: u8,
}

// Partial updates. A `None` field leaves the record untouched.

#[derive(Debug, Clone, Default)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub balance: Option<f64>,
    pub currency: Option<Currency>,
}

#[derive(Debug, Clone, Default)]
pub struct PositionPatch {
    pub symbol: Option<String>,
    pub shares: Option<f64>,
    pub brokerage_account: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct FutureStockPatch {
    pub symbol: Option<String>,
    pub shares: Option<f64>,
    pub vesting_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct FutureGainPatch {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    pub kind: Option<GainKind>,
    pub vesting_date: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default)]
pub struct FutureExpensePatch {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    pub date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Note: no paid flag here; use the store's toggle operation.
#[derive(Debug, Clone, Default)]
pub struct RecurringExpensePatch {
    pub name: Option<String>,
    pub amount: Option<f64>,
    pub currency: Option<Currency>,
    pub billing_day: Option<u8>,
}

/// The seven record collections, serialized as one blob. Insertion order is
/// preserved within each collection.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ledger {
    pub accounts: Vec<Account>,
    pub positions: Vec<Position>,
    pub future_stocks: Vec<FutureStock>,
    pub future_gains: Vec<FutureGain>,
    pub future_expenses: Vec<FutureExpense>,
    pub subscriptions: Vec<RecurringExpense>,
    pub fixed_expenses: Vec<RecurringExpense>,
}
