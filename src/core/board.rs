//! Latest-poll-wins quote holder for the watch loop.
//!
//! Polls may overlap: a slow batch can resolve after a newer one has already
//! been applied. Every poll is stamped with a generation from
//! [`QuoteBoard::begin_poll`], and [`QuoteBoard::apply`] rejects results
//! older than the last applied generation, so application order is monotonic
//! regardless of network arrival order.

use anyhow::Result;
use std::collections::HashMap;
use tracing::debug;

use crate::core::quote::Quote;

#[derive(Default)]
pub struct QuoteBoard {
    next_generation: u64,
    applied_generation: u64,
    quotes: HashMap<String, Result<Quote>>,
}

impl QuoteBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stamps a new poll. Generations increase monotonically.
    pub fn begin_poll(&mut self) -> u64 {
        self.next_generation += 1;
        self.next_generation
    }

    /// Installs the results of a poll. Returns `false` and leaves the board
    /// untouched when a newer poll has already been applied.
    pub fn apply(&mut self, generation: u64, quotes: HashMap<String, Result<Quote>>) -> bool {
        if generation < self.applied_generation {
            debug!(
                generation,
                applied = self.applied_generation,
                "Discarding stale poll results"
            );
            return false;
        }
        self.applied_generation = generation;
        self.quotes = quotes;
        true
    }

    pub fn quotes(&self) -> &HashMap<String, Result<Quote>> {
        &self.quotes
    }
}
