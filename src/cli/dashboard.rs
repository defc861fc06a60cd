use anyhow::Result;
use std::collections::HashMap;

use super::ui;
use crate::core::analytics::{self, WealthSummary};
use crate::core::currency::{Currency, RateTable};
use crate::core::model::Ledger;
use crate::core::quote::{Quote, QuoteProvider, fetch_quotes};

/// Fetches quotes for every distinct equity symbol in the ledger's
/// positions, behind a spinner.
pub async fn fetch_position_quotes(
    ledger: &Ledger,
    provider: &dyn QuoteProvider,
) -> HashMap<String, Result<Quote>> {
    let symbols: Vec<String> = ledger
        .positions
        .iter()
        .filter(|p| !p.is_cash)
        .map(|p| p.symbol.clone())
        .collect();

    if symbols.is_empty() {
        return HashMap::new();
    }

    let spinner = ui::new_spinner("Fetching quotes...");
    let quotes = fetch_quotes(provider, symbols).await;
    spinner.finish_and_clear();
    quotes
}

/// Renders the wealth card: headline figure, its three components and the
/// potential figure including future gains.
pub fn render(summary: &WealthSummary) -> String {
    let mut output = format!(
        "{} {}\n\n",
        ui::style_text("Current Total Wealth:", ui::StyleType::TotalLabel),
        ui::style_text(&ui::money(summary.total_wealth), ui::StyleType::TotalValue),
    );

    output.push_str(&format!(
        "  Bank Accounts         {}\n",
        ui::money(summary.accounts_total)
    ));
    output.push_str(&format!(
        "  Stock Portfolio       {}\n",
        ui::money(summary.positions_total)
    ));
    output.push_str(&format!(
        "  Unpaid Subscriptions  {}\n",
        ui::style_text(
            &format!("-{}", ui::money(summary.unpaid_subscriptions)),
            ui::StyleType::Error
        )
    ));

    output.push_str(&format!(
        "\n{} {}\n",
        ui::style_text("Potential Future Wealth:", ui::StyleType::TotalLabel),
        ui::style_text(
            &ui::money(summary.potential_wealth),
            ui::StyleType::TotalValue
        ),
    ));
    output.push_str(&ui::style_text(
        &format!(
            "  Including {} in future gains\n",
            ui::money(summary.future_gains_total)
        ),
        ui::StyleType::Subtle,
    ));

    output
}

pub async fn run(
    ledger: &Ledger,
    provider: &dyn QuoteProvider,
    rates: &RateTable,
    quote_currency: Currency,
) -> Result<()> {
    let quotes = fetch_position_quotes(ledger, provider).await;
    let summary = analytics::wealth_summary(ledger, &quotes, rates, quote_currency)?;

    println!("{}", render(&summary));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_contains_every_figure() {
        let summary = WealthSummary {
            accounts_total: 790.0,
            positions_total: 1234.5,
            unpaid_subscriptions: 30.0,
            total_wealth: 1994.5,
            future_gains_total: 500.0,
            potential_wealth: 2494.5,
        };

        let rendered = render(&summary);
        assert!(rendered.contains("£1,994.50"));
        assert!(rendered.contains("£790.00"));
        assert!(rendered.contains("£1,234.50"));
        assert!(rendered.contains("-£30.00"));
        assert!(rendered.contains("£2,494.50"));
        assert!(rendered.contains("£500.00"));
    }
}
