//! Pure aggregation over a ledger snapshot.
//!
//! Every function takes its inputs explicitly (records, the rate table and,
//! where equities are involved, fetched quotes plus the currency those
//! quotes are denominated in) and returns a number or a small record. A
//! position whose quote is missing or failed contributes zero to value
//! aggregates; a currency missing from the rate table is an error.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

use crate::core::currency::{Currency, RateTable};
use crate::core::model::{
    Account, FutureExpense, FutureGain, FutureStock, Ledger, Position, RecurringExpense,
};
use crate::core::quote::{Quote, quote_for};

/// Sum of account balances converted into the reference currency.
pub fn total_accounts_value(accounts: &[Account], rates: &RateTable) -> Result<f64> {
    let mut total = 0.0;
    for account in accounts {
        total += rates.to_reference(account.balance, account.currency)?;
    }
    Ok(total)
}

/// Converted value of a single position row. Equity rows are valued at
/// quote price x shares in `quote_currency`; rows with no usable quote are
/// worth zero. Cash rows convert their balance directly.
fn position_value(
    position: &Position,
    quotes: &HashMap<String, Result<Quote>>,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<f64> {
    if position.is_cash {
        let currency = position
            .cash_currency
            .with_context(|| format!("Cash position {} has no currency", position.id))?;
        return rates.to_reference(position.shares, currency);
    }

    match quote_for(quotes, &position.symbol) {
        Some(quote) => rates.to_reference(quote.price * position.shares, quote_currency),
        None => {
            debug!("No quote for {}, contributing zero", position.symbol);
            Ok(0.0)
        }
    }
}

/// Total converted value of all positions.
pub fn total_position_value(
    positions: &[Position],
    quotes: &HashMap<String, Result<Quote>>,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<f64> {
    let mut total = 0.0;
    for position in positions {
        total += position_value(position, quotes, rates, quote_currency)?;
    }
    Ok(total)
}

/// Projected value of future stock grants at current prices.
pub fn future_stock_value(
    grants: &[FutureStock],
    quotes: &HashMap<String, Result<Quote>>,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<f64> {
    let mut total = 0.0;
    for grant in grants {
        match quote_for(quotes, &grant.symbol) {
            Some(quote) => {
                total += rates.to_reference(quote.price * grant.shares, quote_currency)?;
            }
            None => debug!("No quote for {}, contributing zero", grant.symbol),
        }
    }
    Ok(total)
}

/// Sum of the not-yet-paid recurring expenses, converted.
pub fn total_unpaid_recurring(records: &[RecurringExpense], rates: &RateTable) -> Result<f64> {
    let mut total = 0.0;
    for record in records.iter().filter(|r| !r.is_paid) {
        total += rates.to_reference(record.amount, record.currency)?;
    }
    Ok(total)
}

/// Unconditional sum over future gains; vesting status is not considered.
pub fn total_future_gains(gains: &[FutureGain], rates: &RateTable) -> Result<f64> {
    let mut total = 0.0;
    for gain in gains {
        total += rates.to_reference(gain.amount, gain.currency)?;
    }
    Ok(total)
}

/// Unconditional sum over future expenses.
pub fn total_future_expenses(expenses: &[FutureExpense], rates: &RateTable) -> Result<f64> {
    let mut total = 0.0;
    for expense in expenses {
        total += rates.to_reference(expense.amount, expense.currency)?;
    }
    Ok(total)
}

/// The headline figures shown on the dashboard.
///
/// `total_wealth` subtracts unpaid subscriptions only; fixed expenses have
/// their own totals in the expenses view and do not reduce the headline
/// figure.
#[derive(Debug, Clone, PartialEq)]
pub struct WealthSummary {
    pub accounts_total: f64,
    pub positions_total: f64,
    pub unpaid_subscriptions: f64,
    pub total_wealth: f64,
    pub future_gains_total: f64,
    pub potential_wealth: f64,
}

pub fn wealth_summary(
    ledger: &Ledger,
    quotes: &HashMap<String, Result<Quote>>,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<WealthSummary> {
    let accounts_total = total_accounts_value(&ledger.accounts, rates)?;
    let positions_total = total_position_value(&ledger.positions, quotes, rates, quote_currency)?;
    let unpaid_subscriptions = total_unpaid_recurring(&ledger.subscriptions, rates)?;
    let future_gains_total = total_future_gains(&ledger.future_gains, rates)?;

    let total_wealth = accounts_total + positions_total - unpaid_subscriptions;

    Ok(WealthSummary {
        accounts_total,
        positions_total,
        unpaid_subscriptions,
        total_wealth,
        future_gains_total,
        potential_wealth: total_wealth + future_gains_total,
    })
}

/// Converted total, day change and percent change for one brokerage group.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokerageTotal {
    pub name: String,
    pub total: f64,
    pub day_change: f64,
    pub percent_change: f64,
}

/// Groups positions by brokerage account, preserving first-seen order.
pub fn group_by_brokerage(positions: &[Position]) -> Vec<(String, Vec<&Position>)> {
    let mut groups: Vec<(String, Vec<&Position>)> = Vec::new();
    for position in positions {
        match groups
            .iter_mut()
            .find(|(name, _)| name == &position.brokerage_account)
        {
            Some((_, members)) => members.push(position),
            None => groups.push((position.brokerage_account.clone(), vec![position])),
        }
    }
    groups
}

/// Per-brokerage totals in first-seen order. Cash rows count towards the
/// total but not the day change.
pub fn brokerage_totals(
    positions: &[Position],
    quotes: &HashMap<String, Result<Quote>>,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<Vec<BrokerageTotal>> {
    let quote_rate = rates.rate(quote_currency)?;
    let mut totals = Vec::new();

    for (name, members) in group_by_brokerage(positions) {
        let mut total = 0.0;
        let mut day_change = 0.0;

        for position in &members {
            total += position_value(position, quotes, rates, quote_currency)?;
            if !position.is_cash {
                if let Some(quote) = quote_for(quotes, &position.symbol) {
                    day_change += quote.change * position.shares * quote_rate;
                }
            }
        }

        let percent_change = if total > 0.0 {
            (day_change / total) * 100.0
        } else {
            0.0
        };

        totals.push(BrokerageTotal {
            name,
            total,
            day_change,
            percent_change,
        });
    }

    Ok(totals)
}

/// Groups recurring expenses by billing day, ascending.
pub fn group_by_billing_day(records: &[RecurringExpense]) -> Vec<(u8, Vec<&RecurringExpense>)> {
    let mut groups: BTreeMap<u8, Vec<&RecurringExpense>> = BTreeMap::new();
    for record in records {
        groups.entry(record.billing_day).or_default().push(record);
    }
    groups.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;

    fn account(name: &str, balance: f64, currency: Currency) -> Account {
        Account {
            id: name.to_lowercase(),
            name: name.into(),
            balance,
            currency,
        }
    }

    fn equity(symbol: &str, shares: f64, brokerage: &str) -> Position {
        Position {
            id: format!("{brokerage}-{symbol}"),
            symbol: symbol.into(),
            shares,
            brokerage_account: brokerage.into(),
            is_cash: false,
            cash_currency: None,
        }
    }

    fn cash(brokerage: &str, amount: f64, currency: Currency) -> Position {
        Position {
            id: format!("{brokerage}-cash"),
            symbol: format!("CASH_{currency}"),
            shares: amount,
            brokerage_account: brokerage.into(),
            is_cash: true,
            cash_currency: Some(currency),
        }
    }

    fn subscription(name: &str, amount: f64, is_paid: bool) -> RecurringExpense {
        RecurringExpense {
            id: name.to_lowercase(),
            name: name.into(),
            amount,
            currency: Currency::Gbp,
            billing_day: 15,
            is_paid,
        }
    }

    fn quote(price: f64, change: f64) -> Result<Quote> {
        Ok(Quote {
            price,
            change,
            percent_change: 0.0,
        })
    }

    #[test]
    fn test_single_account_value() {
        let rates = RateTable::default();
        let accounts = [account("Checking", 1000.0, Currency::Usd)];

        let total = total_accounts_value(&accounts, &rates).unwrap();
        assert!((total - 790.0).abs() < 1e-9);
    }

    #[test]
    fn test_accounts_value_is_additive_over_disjoint_lists() {
        let rates = RateTable::default();
        let first = [account("Checking", 1000.0, Currency::Usd)];
        let second = [
            account("Savings", 200.0, Currency::Gbp),
            account("Travel", 5000.0, Currency::Jpy),
        ];
        let combined: Vec<Account> = first.iter().chain(second.iter()).cloned().collect();

        let split = total_accounts_value(&first, &rates).unwrap()
            + total_accounts_value(&second, &rates).unwrap();
        let joint = total_accounts_value(&combined, &rates).unwrap();
        assert!((joint - split).abs() < 1e-9);
    }

    #[test]
    fn test_position_value_with_failed_quote_is_isolated() {
        let rates = RateTable::default();
        let positions = [equity("AAPL", 10.0, "Vanguard"), equity("BADSYM", 5.0, "Vanguard")];
        let quotes = HashMap::from([
            ("AAPL".to_string(), quote(100.0, 0.0)),
            ("BADSYM".to_string(), Err(anyhow!("No quote data for symbol: BADSYM"))),
        ]);

        let total = total_position_value(&positions, &quotes, &rates, Currency::Usd).unwrap();
        assert!((total - 100.0 * 10.0 * 0.79).abs() < 1e-9);
    }

    #[test]
    fn test_cash_positions_convert_without_quotes() {
        let rates = RateTable::default();
        let positions = [cash("Vanguard", 500.0, Currency::Eur)];

        let total = total_position_value(&positions, &HashMap::new(), &rates, Currency::Usd).unwrap();
        assert!((total - 500.0 * 0.85).abs() < 1e-9);
    }

    #[test]
    fn test_duplicate_symbols_double_count() {
        let rates = RateTable::default();
        let positions = [equity("AAPL", 10.0, "Vanguard"), equity("AAPL", 10.0, "Schwab")];
        let quotes = HashMap::from([("AAPL".to_string(), quote(100.0, 0.0))]);

        let total = total_position_value(&positions, &quotes, &rates, Currency::Usd).unwrap();
        assert!((total - 2.0 * 100.0 * 10.0 * 0.79).abs() < 1e-9);
    }

    #[test]
    fn test_unpaid_total_excludes_paid_records() {
        let rates = RateTable::default();
        let records = [
            subscription("Gym", 30.0, false),
            subscription("Streaming", 15.0, true),
        ];

        let total = total_unpaid_recurring(&records, &rates).unwrap();
        assert!((total - 30.0).abs() < 1e-9);

        // Changing a paid record's amount must not change the unpaid total.
        let mut records = records;
        records[1].amount = 999.0;
        let unchanged = total_unpaid_recurring(&records, &rates).unwrap();
        assert!((unchanged - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_wealth_summary_subtracts_unpaid_subscriptions_only() {
        let rates = RateTable::default();
        let ledger = Ledger {
            accounts: vec![account("Checking", 1000.0, Currency::Usd)],
            positions: vec![equity("AAPL", 10.0, "Vanguard")],
            subscriptions: vec![subscription("Gym", 30.0, false)],
            fixed_expenses: vec![subscription("Rent", 800.0, false)],
            ..Ledger::default()
        };
        let quotes = HashMap::from([("AAPL".to_string(), quote(100.0, 0.0))]);

        let summary = wealth_summary(&ledger, &quotes, &rates, Currency::Usd).unwrap();
        let expected = 790.0 + 790.0 - 30.0;
        assert!((summary.total_wealth - expected).abs() < 1e-9);
        assert!((summary.potential_wealth - expected).abs() < 1e-9);
    }

    #[test]
    fn test_potential_wealth_adds_future_gains() {
        let rates = RateTable::default();
        let ledger = Ledger {
            accounts: vec![account("Checking", 100.0, Currency::Gbp)],
            future_gains: vec![FutureGain {
                id: "g1".into(),
                name: "Pension pot".into(),
                amount: 1000.0,
                currency: Currency::Usd,
                kind: crate::core::model::GainKind::Pension,
                vesting_date: None,
            }],
            ..Ledger::default()
        };

        let summary = wealth_summary(&ledger, &HashMap::new(), &rates, Currency::Usd).unwrap();
        assert!((summary.total_wealth - 100.0).abs() < 1e-9);
        assert!((summary.potential_wealth - 890.0).abs() < 1e-9);
    }

    #[test]
    fn test_brokerage_totals_group_in_first_seen_order() {
        let rates = RateTable::default();
        let positions = [
            equity("AAPL", 10.0, "Vanguard"),
            equity("MSFT", 2.0, "Schwab"),
            cash("Vanguard", 100.0, Currency::Gbp),
        ];
        let quotes = HashMap::from([
            ("AAPL".to_string(), quote(100.0, 2.0)),
            ("MSFT".to_string(), quote(300.0, -1.0)),
        ]);

        let totals = brokerage_totals(&positions, &quotes, &rates, Currency::Usd).unwrap();
        assert_eq!(totals.len(), 2);
        assert_eq!(totals[0].name, "Vanguard");
        assert_eq!(totals[1].name, "Schwab");

        // Vanguard: 10 AAPL at 100 plus 100 GBP cash; cash is excluded from
        // the day change.
        assert!((totals[0].total - (790.0 + 100.0)).abs() < 1e-9);
        assert!((totals[0].day_change - 2.0 * 10.0 * 0.79).abs() < 1e-9);

        assert!((totals[1].day_change - (-1.0 * 2.0 * 0.79)).abs() < 1e-9);
    }

    #[test]
    fn test_empty_brokerage_total_has_zero_percent_change() {
        let rates = RateTable::default();
        let positions = [equity("BADSYM", 5.0, "Schwab")];

        let totals = brokerage_totals(&positions, &HashMap::new(), &rates, Currency::Usd).unwrap();
        assert_eq!(totals[0].total, 0.0);
        assert_eq!(totals[0].percent_change, 0.0);
    }

    #[test]
    fn test_billing_day_groups_sort_ascending() {
        let mut late = subscription("Rent", 800.0, false);
        late.billing_day = 28;
        let mut early = subscription("Gym", 30.0, false);
        early.billing_day = 3;
        let mut mid = subscription("Streaming", 15.0, false);
        mid.billing_day = 15;
        let records = [late, early, mid];

        let groups = group_by_billing_day(&records);
        let days: Vec<u8> = groups.iter().map(|(day, _)| *day).collect();
        assert_eq!(days, [3, 15, 28]);
    }

    #[test]
    fn test_future_stock_value_skips_missing_quotes() {
        let rates = RateTable::default();
        let grants = [
            FutureStock {
                id: "f1".into(),
                symbol: "AAPL".into(),
                shares: 4.0,
                vesting_date: "2027-01-15".parse().unwrap(),
            },
            FutureStock {
                id: "f2".into(),
                symbol: "UNQUOTED".into(),
                shares: 9.0,
                vesting_date: "2027-06-15".parse().unwrap(),
            },
        ];
        let quotes = HashMap::from([("AAPL".to_string(), quote(100.0, 0.0))]);

        let total = future_stock_value(&grants, &quotes, &rates, Currency::Usd).unwrap();
        assert!((total - 4.0 * 100.0 * 0.79).abs() < 1e-9);
    }

    #[test]
    fn test_missing_rate_propagates_as_error() {
        let rates = RateTable::new(HashMap::from([(Currency::Gbp, 1.0)]));
        let accounts = [account("Checking", 1000.0, Currency::Usd)];
        assert!(total_accounts_value(&accounts, &rates).is_err());
    }
}
