//! Currency codes and conversion into the reference currency.
//!
//! All aggregate figures are expressed in GBP. The rate table maps each
//! known code to the value of one unit in GBP, so conversion is a single
//! multiplication and cross rates divide two table entries.

use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt::Display;
use std::str::FromStr;

/// The currency every aggregate is reported in.
pub const REFERENCE: Currency = Currency::Gbp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Currency {
    #[serde(rename = "GBP")]
    Gbp,
    #[serde(rename = "USD")]
    Usd,
    #[serde(rename = "EUR")]
    Eur,
    #[serde(rename = "JPY")]
    Jpy,
    #[serde(rename = "INR")]
    Inr,
    #[serde(rename = "TSHS")]
    Tshs,
    #[serde(rename = "KES")]
    Kes,
    #[serde(rename = "AUD")]
    Aud,
    #[serde(rename = "CAD")]
    Cad,
    #[serde(rename = "CHF")]
    Chf,
    #[serde(rename = "CNY")]
    Cny,
}

impl Currency {
    pub const ALL: [Currency; 11] = [
        Currency::Gbp,
        Currency::Usd,
        Currency::Eur,
        Currency::Jpy,
        Currency::Inr,
        Currency::Tshs,
        Currency::Kes,
        Currency::Aud,
        Currency::Cad,
        Currency::Chf,
        Currency::Cny,
    ];

    /// The subset accepted for accounts, expenses and cash positions.
    /// The full set is only available to the currency-pair watchlist.
    pub const ACCOUNT_SET: [Currency; 4] = [
        Currency::Gbp,
        Currency::Usd,
        Currency::Eur,
        Currency::Jpy,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Gbp => "GBP",
            Currency::Usd => "USD",
            Currency::Eur => "EUR",
            Currency::Jpy => "JPY",
            Currency::Inr => "INR",
            Currency::Tshs => "TSHS",
            Currency::Kes => "KES",
            Currency::Aud => "AUD",
            Currency::Cad => "CAD",
            Currency::Chf => "CHF",
            Currency::Cny => "CNY",
        }
    }

    /// Display glyph used in front of amounts, e.g. `£` or `TSh`.
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Gbp => "£",
            Currency::Usd | Currency::Aud | Currency::Cad => "$",
            Currency::Eur => "€",
            Currency::Jpy | Currency::Cny => "¥",
            Currency::Inr => "₹",
            Currency::Tshs => "TSh",
            Currency::Kes => "KSh",
            Currency::Chf => "Fr",
        }
    }

    pub fn is_account_currency(&self) -> bool {
        Currency::ACCOUNT_SET.contains(self)
    }
}

impl Display for Currency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GBP" => Ok(Currency::Gbp),
            "USD" => Ok(Currency::Usd),
            "EUR" => Ok(Currency::Eur),
            "JPY" => Ok(Currency::Jpy),
            "INR" => Ok(Currency::Inr),
            "TSHS" => Ok(Currency::Tshs),
            "KES" => Ok(Currency::Kes),
            "AUD" => Ok(Currency::Aud),
            "CAD" => Ok(Currency::Cad),
            "CHF" => Ok(Currency::Chf),
            "CNY" => Ok(Currency::Cny),
            _ => Err(format!("Unknown currency code: {s}")),
        }
    }
}

/// Value of one unit of each currency in GBP.
#[derive(Debug, Clone)]
pub struct RateTable {
    rates: HashMap<Currency, f64>,
}

impl Default for RateTable {
    fn default() -> Self {
        RateTable {
            rates: HashMap::from([
                (Currency::Gbp, 1.0),
                (Currency::Usd, 0.79),
                (Currency::Eur, 0.85),
                (Currency::Jpy, 0.0053),
                (Currency::Inr, 0.0095),
                (Currency::Tshs, 0.00032),
                (Currency::Kes, 0.0062),
                (Currency::Aud, 0.52),
                (Currency::Cad, 0.58),
                (Currency::Chf, 0.89),
                (Currency::Cny, 0.11),
            ]),
        }
    }
}

impl RateTable {
    pub fn new(rates: HashMap<Currency, f64>) -> Self {
        RateTable { rates }
    }

    /// Default table with individual entries replaced by `overrides`.
    pub fn with_overrides(overrides: &HashMap<Currency, f64>) -> Self {
        let mut table = RateTable::default();
        for (currency, rate) in overrides {
            table.rates.insert(*currency, *rate);
        }
        table
    }

    pub fn rate(&self, currency: Currency) -> Result<f64> {
        self.rates
            .get(&currency)
            .copied()
            .ok_or_else(|| anyhow!("No conversion rate for currency: {currency}"))
    }

    /// Converts `amount` of `currency` into the reference currency.
    pub fn to_reference(&self, amount: f64, currency: Currency) -> Result<f64> {
        Ok(amount * self.rate(currency)?)
    }

    /// Rate of one unit of `from` expressed in `to`.
    pub fn cross(&self, from: Currency, to: Currency) -> Result<f64> {
        Ok(self.rate(from)? / self.rate(to)?)
    }
}
