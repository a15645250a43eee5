//! Category breakdown
//!
//! Totals per category for one side of the ledger, with each category's share
//! of the whole. Transactions without a category land in an "Uncategorized"
//! row.

use std::collections::HashMap;
use std::io::Write;

use crate::currency::format_amount;
use crate::error::CashiroResult;
use crate::models::{CategoryId, CategoryKind, CurrencyCode, Money, TransactionKind};
use crate::storage::Storage;

use super::{percentage, DateRange, MainCurrency};

pub const UNCATEGORIZED: &str = "Uncategorized";

#[derive(Debug, Clone)]
pub struct CategoryRow {
    /// `None` for the uncategorized bucket
    pub category_id: Option<CategoryId>,
    pub name: String,
    pub color: String,
    pub amount: Money,
    pub count: usize,
    pub percentage: f64,
}

#[derive(Debug, Clone)]
pub struct CategoryReport {
    pub range: DateRange,
    pub kind: CategoryKind,
    pub currency: CurrencyCode,
    /// Largest first; ties by name
    pub rows: Vec<CategoryRow>,
    pub total: Money,
    pub transaction_count: usize,
}

impl CategoryReport {
    pub fn generate(storage: &Storage, range: DateRange, kind: CategoryKind) -> CashiroResult<Self> {
        let main = MainCurrency::load(storage)?;
        let wanted = match kind {
            CategoryKind::Income => TransactionKind::Income,
            CategoryKind::Expense => TransactionKind::Expense,
        };

        let mut buckets: HashMap<Option<CategoryId>, (Money, usize)> = HashMap::new();
        let mut total = Money::zero();
        let mut transaction_count = 0;

        for txn in storage
            .transactions
            .get_by_date_range(range.start, range.end)?
            .iter()
            .filter(|t| t.kind == wanted)
        {
            let amount = main.amount(txn)?;
            let entry = buckets.entry(txn.category_id).or_insert((Money::zero(), 0));
            entry.0 += amount;
            entry.1 += 1;
            total += amount;
            transaction_count += 1;
        }

        let categories: HashMap<CategoryId, _> = storage
            .categories
            .get_all()?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let mut rows: Vec<CategoryRow> = buckets
            .into_iter()
            .map(|(category_id, (amount, count))| {
                let category = category_id.and_then(|id| categories.get(&id));
                CategoryRow {
                    category_id,
                    name: category
                        .map(|c| c.name.clone())
                        .unwrap_or_else(|| UNCATEGORIZED.to_string()),
                    color: category
                        .map(|c| c.color.clone())
                        .unwrap_or_else(|| "#9E9E9E".to_string()),
                    amount,
                    count,
                    percentage: percentage(amount, total),
                }
            })
            .collect();
        rows.sort_by(|a, b| {
            b.amount
                .cmp(&a.amount)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        Ok(Self {
            range,
            kind,
            currency: main.code(),
            rows,
            total,
            transaction_count,
        })
    }

    /// The `limit` largest rows
    pub fn top(&self, limit: usize) -> &[CategoryRow] {
        &self.rows[..limit.min(self.rows.len())]
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();

        let title = match self.kind {
            CategoryKind::Income => "Income by category",
            CategoryKind::Expense => "Spending by category",
        };
        output.push_str(&format!("{}: {}\n", title, self.range));
        output.push_str(&"=".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{:<32} {:>18} {:>8} {:>8}\n",
            "Category", "Amount", "Count", "%"
        ));
        output.push_str(&"-".repeat(70));
        output.push('\n');

        if self.rows.is_empty() {
            output.push_str("No transactions in this period.\n");
        }
        for row in &self.rows {
            output.push_str(&format!(
                "{:<32} {:>18} {:>8} {:>7.1}%\n",
                row.name,
                format_amount(row.amount, self.currency),
                row.count,
                row.percentage
            ));
        }

        output.push_str(&"-".repeat(70));
        output.push('\n');
        output.push_str(&format!(
            "{:<32} {:>18} {:>8}\n",
            "TOTAL",
            format_amount(self.total, self.currency),
            self.transaction_count
        ));

        output
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> CashiroResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        csv.write_record([
            "Start Date",
            "End Date",
            "Kind",
            "Category",
            "Amount",
            "Currency",
            "Transaction Count",
            "Percentage",
        ])?;

        let (start, end) = if self.range.is_unbounded() {
            (String::new(), String::new())
        } else {
            (self.range.start.to_string(), self.range.end.to_string())
        };
        let kind = self.kind.to_string().to_lowercase();
        for row in &self.rows {
            csv.write_record([
                start.clone(),
                end.clone(),
                kind.clone(),
                row.name.clone(),
                row.amount.to_string(),
                self.currency.to_string(),
                row.count.to_string(),
                format!("{:.2}", row.percentage),
            ])?;
        }
        csv.write_record([
            start,
            end,
            kind,
            "TOTAL".to_string(),
            self.total.to_string(),
            self.currency.to_string(),
            self.transaction_count.to_string(),
            if self.total.is_zero() { "0.00" } else { "100.00" }.to_string(),
        ])?;
        csv.flush()?;
        Ok(())
    }
}
