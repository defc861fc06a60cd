//! Quote gateway abstractions.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::join_all;
use std::collections::{HashMap, HashSet};

/// Current price and day-over-day change for a ticker symbol.
#[derive(Debug, Clone, PartialEq)]
pub struct Quote {
    pub price: f64,
    pub change: f64,
    pub percent_change: f64,
}

#[async_trait]
pub trait QuoteProvider: Send + Sync {
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote>;
}

/// Fetches quotes for the distinct symbols in `symbols` concurrently.
///
/// Each symbol resolves independently; a failed fetch lands in the map as an
/// error and never affects the other symbols. No ordering is guaranteed
/// between the outbound requests.
pub async fn fetch_quotes<I, S>(
    provider: &dyn QuoteProvider,
    symbols: I,
) -> HashMap<String, Result<Quote>>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let distinct: HashSet<String> = symbols.into_iter().map(Into::into).collect();

    let quote_futures = distinct.into_iter().map(|symbol| async move {
        let result = provider.fetch_quote(&symbol).await;
        (symbol, result)
    });

    join_all(quote_futures).await.into_iter().collect()
}

/// Borrows the successful quote for `symbol`, if any.
pub fn quote_for<'a>(
    quotes: &'a HashMap<String, Result<Quote>>,
    symbol: &str,
) -> Option<&'a Quote> {
    quotes.get(symbol).and_then(|result| result.as_ref().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::Mutex;

    struct ScriptedProvider {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl QuoteProvider for ScriptedProvider {
        async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
            self.calls.lock().unwrap().push(symbol.to_string());
            match symbol {
                "AAPL" => Ok(Quote {
                    price: 100.0,
                    change: 1.0,
                    percent_change: 1.0,
                }),
                _ => Err(anyhow!("No quote data for symbol: {symbol}")),
            }
        }
    }

    #[tokio::test]
    async fn test_fetch_quotes_deduplicates_symbols() {
        let provider = ScriptedProvider {
            calls: Mutex::new(Vec::new()),
        };

        let quotes = fetch_quotes(&provider, ["AAPL", "AAPL", "AAPL"]).await;
        assert_eq!(quotes.len(), 1);
        assert_eq!(provider.calls.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_others() {
        let provider = ScriptedProvider {
            calls: Mutex::new(Vec::new()),
        };

        let quotes = fetch_quotes(&provider, ["AAPL", "BADSYM"]).await;
        assert!(quote_for(&quotes, "AAPL").is_some());
        assert!(quote_for(&quotes, "BADSYM").is_none());
        assert!(quotes.get("BADSYM").unwrap().is_err());
    }
}
