use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

use crate::core::cache::Cache;
use crate::core::quote::{Quote, QuoteProvider};

/// Quotes stay cached for a fraction of the watch-mode poll interval so a
/// burst of views within one command reuses the same response while polls
/// still observe fresh prices.
const QUOTE_TTL: Duration = Duration::from_secs(30);

/// Finnhub quote endpoint: `/api/v1/quote?symbol=S&token=K` returning the
/// current price (`c`), absolute change (`d`) and percent change (`dp`).
/// An absent or zero `c` means the symbol is unknown to the exchange feed.
pub struct FinnhubProvider {
    base_url: String,
    token: String,
    client: reqwest::Client,
    cache: Arc<Cache<String, Quote>>,
}

impl FinnhubProvider {
    pub fn new(base_url: &str, token: &str, cache: Arc<Cache<String, Quote>>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("finboard/0.1")
            .build()?;
        Ok(FinnhubProvider {
            base_url: base_url.to_string(),
            token: token.to_string(),
            client,
            cache,
        })
    }
}

#[derive(Deserialize, Debug)]
struct FinnhubQuoteResponse {
    #[serde(default)]
    c: f64,
    #[serde(default)]
    d: Option<f64>,
    #[serde(default)]
    dp: Option<f64>,
}

#[async_trait]
impl QuoteProvider for FinnhubProvider {
    #[instrument(
        name = "FinnhubQuoteFetch",
        skip(self),
        fields(symbol = %symbol)
    )]
    async fn fetch_quote(&self, symbol: &str) -> Result<Quote> {
        if let Some(cached) = self.cache.get(&symbol.to_string()).await {
            return Ok(cached);
        }

        let url = format!(
            "{}/api/v1/quote?symbol={}&token={}",
            self.base_url, symbol, self.token
        );
        debug!("Requesting quote for {symbol} from {}", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, symbol))?;

        if !response.status().is_success() {
            bail!(
                "HTTP error: {} for symbol: {}",
                response.status(),
                symbol
            );
        }

        let text = response.text().await?;
        let data: FinnhubQuoteResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse quote response for {}: {}", symbol, e))?;

        if data.c == 0.0 {
            bail!("No quote data for symbol: {symbol}");
        }

        let quote = Quote {
            price: data.c,
            change: data.d.unwrap_or(0.0),
            percent_change: data.dp.unwrap_or(0.0),
        };

        self.cache
            .put(symbol.to_string(), quote.clone(), Some(QUOTE_TTL))
            .await;

        Ok(quote)
    }
}
