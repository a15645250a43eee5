//! Terminal output
//!
//! List views are `tabled` tables; detail views are aligned key/value text.
//! Report rendering lives with the reports themselves.

pub mod account;
pub mod category;
pub mod currency;
pub mod history;
pub mod subscription;
pub mod transaction;

use std::collections::HashMap;

use tabled::settings::object::Columns;
use tabled::settings::{Alignment, Style};
use tabled::{Table, Tabled};

use crate::error::CashiroResult;
use crate::models::{AccountId, CategoryId, CurrencyCode};
use crate::storage::Storage;

pub use account::{format_account_details, format_account_list};
pub use category::{format_category_details, format_category_list};
pub use currency::format_rate_list;
pub use history::format_history;
pub use subscription::{format_subscription_details, format_subscription_list};
pub use transaction::{format_transaction_details, format_transaction_list};

/// Account and category names for rendering rows that only carry ids
#[derive(Debug, Clone, Default)]
pub struct NameLookup {
    accounts: HashMap<AccountId, (String, CurrencyCode)>,
    categories: HashMap<CategoryId, String>,
    main_currency: CurrencyCode,
}

impl NameLookup {
    pub fn load(storage: &Storage) -> CashiroResult<Self> {
        Ok(Self {
            accounts: storage
                .accounts
                .get_all()?
                .into_iter()
                .map(|a| (a.id, (a.name, a.currency)))
                .collect(),
            categories: storage
                .categories
                .get_all()?
                .into_iter()
                .map(|c| (c.id, c.name))
                .collect(),
            main_currency: storage.main_currency()?,
        })
    }

    pub fn account(&self, id: AccountId) -> &str {
        self.accounts
            .get(&id)
            .map(|(name, _)| name.as_str())
            .unwrap_or("(deleted)")
    }

    /// Falls back to the main currency for unknown accounts
    pub fn currency(&self, id: AccountId) -> CurrencyCode {
        self.accounts
            .get(&id)
            .map(|(_, currency)| *currency)
            .unwrap_or(self.main_currency)
    }

    pub fn category(&self, id: Option<CategoryId>) -> &str {
        match id {
            Some(id) => self.categories.get(&id).map(String::as_str).unwrap_or("(deleted)"),
            None => "-",
        }
    }

    pub fn main_currency(&self) -> CurrencyCode {
        self.main_currency
    }
}

/// Render rows with the shared table style, right-aligning the given columns
///
/// The result ends with a newline.
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>, right_aligned: &[usize]) -> String {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    for &column in right_aligned {
        table.modify(Columns::single(column), Alignment::right());
    }
    let mut output = table.to_string();
    output.push('\n');
    output
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Shorten to `max` characters, marking the cut with "..."
pub(crate) fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let head: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", head)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Short", 10), "Short");
        let cut = truncate("A very long string", 10);
        assert_eq!(cut, "A very ...");
        assert_eq!(cut.chars().count(), 10);
        assert_eq!(truncate("Café au lait", 7), "Café...");
    }

    #[test]
    fn test_lookup_fallbacks() {
        let lookup = NameLookup::default();
        assert_eq!(lookup.account(AccountId::new()), "(deleted)");
        assert_eq!(lookup.category(None), "-");
        assert_eq!(lookup.currency(AccountId::new()), CurrencyCode::USD);
    }
}
