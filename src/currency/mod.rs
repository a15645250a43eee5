//! Currency formatting and conversion
//!
//! Formatting helpers turn `Money` into symbol-aware strings; `ExchangeRates`
//! expresses amounts in the profile's main currency.

pub mod format;
pub mod rates;

pub use format::{format_amount, format_compact, format_plain, format_trimmed};
pub use rates::ExchangeRates;
