pub mod cli;
pub mod core;
pub mod providers;
pub mod store;

use anyhow::Result;
use clap::Subcommand;
use std::sync::Arc;
use tracing::{debug, info};

use crate::cli::accounts::AccountsCmd;
use crate::cli::currencies::CurrenciesCmd;
use crate::cli::expenses::ExpensesCmd;
use crate::cli::future::FutureCmd;
use crate::cli::positions::PositionsCmd;
use crate::core::cache::Cache;
use crate::core::config::AppConfig;
use crate::core::pairs::PairWatchlist;
use crate::core::quote::QuoteProvider;
use crate::core::store::FinanceStore;
use crate::providers::finnhub::FinnhubProvider;
use crate::store::{Storage, disk::FjallStorage};

#[derive(Debug, Subcommand)]
pub enum AppCommand {
    /// Create default configuration
    Setup,
    /// Display the total wealth summary
    Dashboard,
    /// Manage bank accounts
    Accounts {
        #[command(subcommand)]
        command: AccountsCmd,
    },
    /// Manage brokerage stock and cash positions
    Positions {
        #[command(subcommand)]
        command: PositionsCmd,
    },
    /// Manage subscriptions and fixed monthly expenses
    Expenses {
        #[command(subcommand)]
        command: ExpensesCmd,
    },
    /// Manage anticipated stock vests, gains and expenses
    Future {
        #[command(subcommand)]
        command: FutureCmd,
    },
    /// Manage the currency-pair watchlist
    Currencies {
        #[command(subcommand)]
        command: CurrenciesCmd,
    },
    /// Poll quotes and redraw the dashboard on an interval
    Watch,
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    if let AppCommand::Setup = command {
        return cli::setup::run();
    }

    info!("finboard starting...");

    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");

    let rates = config.rate_table();
    let storage: Arc<dyn Storage> = Arc::new(FjallStorage::open(&config.data_path()?)?);
    let mut store = FinanceStore::open(Arc::clone(&storage));

    let quote_cache = Arc::new(Cache::new());
    let provider = Arc::new(FinnhubProvider::new(
        &config.provider.base_url,
        &config.provider.token,
        quote_cache,
    )?);

    match command {
        AppCommand::Setup => unreachable!("Setup is handled before config load"),
        AppCommand::Dashboard => {
            cli::dashboard::run(
                store.ledger(),
                provider.as_ref(),
                &rates,
                config.quote_currency,
            )
            .await
        }
        AppCommand::Accounts { command } => cli::accounts::run(command, &mut store, &rates),
        AppCommand::Positions { command } => {
            cli::positions::run(
                command,
                &mut store,
                provider.as_ref(),
                &rates,
                config.quote_currency,
            )
            .await
        }
        AppCommand::Expenses { command } => cli::expenses::run(command, &mut store, &rates),
        AppCommand::Future { command } => {
            cli::future::run(
                command,
                &mut store,
                provider.as_ref(),
                &rates,
                config.quote_currency,
            )
            .await
        }
        AppCommand::Currencies { command } => {
            let mut watchlist = PairWatchlist::open(storage);
            cli::currencies::run(command, &mut watchlist, &rates)
        }
        AppCommand::Watch => {
            let provider: Arc<dyn QuoteProvider> = provider;
            cli::watch::run(store.ledger(), provider, &rates, &config).await
        }
    }
}
