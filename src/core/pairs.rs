//! The currency-pair watchlist, kept separate from the main ledger blob.
//!
//! First run seeds the list the dashboard ships with; after that the user's
//! edits are persisted under their own storage key.

use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;
use uuid::Uuid;

use crate::core::currency::{Currency, REFERENCE};
use crate::store::{PAIRS_KEY, Storage};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub id: String,
    pub from: Currency,
    pub to: Currency,
}

fn default_pairs() -> Vec<CurrencyPair> {
    let defaults = [
        ("1", Currency::Usd),
        ("2", Currency::Eur),
        ("3", Currency::Inr),
        ("4", Currency::Tshs),
        ("5", Currency::Kes),
        ("6", Currency::Jpy),
    ];
    defaults
        .into_iter()
        .map(|(id, from)| CurrencyPair {
            id: id.to_string(),
            from,
            to: REFERENCE,
        })
        .collect()
}

pub struct PairWatchlist {
    pairs: Vec<CurrencyPair>,
    storage: Arc<dyn Storage>,
}

impl PairWatchlist {
    /// Rehydrates the watchlist, seeding the default pairs when the blob is
    /// absent or malformed.
    pub fn open(storage: Arc<dyn Storage>) -> Self {
        let pairs = match storage.read(PAIRS_KEY) {
            Some(bytes) => match serde_json::from_slice(&bytes) {
                Ok(pairs) => pairs,
                Err(e) => {
                    debug!("Discarding malformed watchlist blob: {e}");
                    default_pairs()
                }
            },
            None => default_pairs(),
        };

        Self { pairs, storage }
    }

    pub fn pairs(&self) -> &[CurrencyPair] {
        &self.pairs
    }

    fn commit(&mut self) -> Result<()> {
        let bytes = serde_json::to_vec(&self.pairs)?;
        self.storage.write(PAIRS_KEY, &bytes)
    }

    /// Adds a pair to the watchlist. Duplicate from/to combinations are
    /// rejected.
    pub fn add(&mut self, from: Currency, to: Currency) -> Result<String> {
        if self.pairs.iter().any(|p| p.from == from && p.to == to) {
            bail!("Currency pair {from}/{to} is already on the watchlist");
        }

        let id = Uuid::new_v4().to_string();
        self.pairs.push(CurrencyPair {
            id: id.clone(),
            from,
            to,
        });
        self.commit()?;
        Ok(id)
    }

    /// Removes a pair by id; unknown ids are a silent no-op.
    pub fn remove(&mut self, id: &str) -> Result<()> {
        self.pairs.retain(|p| p.id != id);
        self.commit()
    }
}
