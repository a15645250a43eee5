//! Exchange rate table

use rust_decimal::{Decimal, RoundingStrategy};
use tabled::Tabled;

use crate::currency::ExchangeRates;

use super::render_table;

#[derive(Tabled)]
struct RateRow {
    #[tabled(rename = "Currency")]
    code: String,
    #[tabled(rename = "Symbol")]
    symbol: String,
    #[tabled(rename = "Rate")]
    rate: String,
    #[tabled(rename = "Inverse")]
    inverse: String,
}

fn inverse(rate: Decimal) -> String {
    if rate.is_zero() {
        return "-".into();
    }
    (Decimal::ONE / rate)
        .round_dp_with_strategy(6, RoundingStrategy::MidpointAwayFromZero)
        .normalize()
        .to_string()
}

pub fn format_rate_list(rates: &ExchangeRates) -> String {
    let main = rates.main();
    if rates.is_empty() {
        return format!(
            "Main currency: {}\nNo exchange rates set.\n\nAdd one with 'cashiro currency rate-set <CODE> <RATE>'.\n",
            main
        );
    }

    let rows: Vec<_> = rates
        .table()
        .iter()
        .map(|(code, rate)| RateRow {
            code: code.to_string(),
            symbol: code.symbol().trim().to_string(),
            rate: format!("1 {} = {} {}", code, rate.normalize(), main),
            inverse: format!("1 {} = {} {}", main, inverse(*rate), code),
        })
        .collect();

    let mut output = format!("Main currency: {}\n", main);
    output.push_str(&render_table(rows, &[]));
    output
}
