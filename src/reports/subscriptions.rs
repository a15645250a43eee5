//! Subscription costs and schedule

use chrono::NaiveDate;

use crate::currency::format_amount;
use crate::error::CashiroResult;
use crate::models::{CurrencyCode, Money, Subscription, SubscriptionStatus};
use crate::storage::Storage;

use super::MainCurrency;

#[derive(Debug, Clone)]
pub struct SubscriptionRow {
    pub subscription: Subscription,
    pub status: SubscriptionStatus,
    /// Currency of the paying account
    pub currency: CurrencyCode,
    pub next_due: NaiveDate,
    pub days_until_due: i64,
    /// Normalised monthly cost in the main currency
    pub monthly_cost: Money,
}

#[derive(Debug, Clone)]
pub struct SubscriptionReport {
    pub today: NaiveDate,
    pub currency: CurrencyCode,
    /// Active subscriptions only
    pub monthly_total: Money,
    pub yearly_total: Money,
    /// By next due date
    pub rows: Vec<SubscriptionRow>,
}

impl SubscriptionReport {
    pub fn generate(storage: &Storage, today: NaiveDate, reminder_days: u32) -> CashiroResult<Self> {
        let main = MainCurrency::load(storage)?;
        let mut monthly_total = Money::zero();
        let mut yearly_total = Money::zero();
        let mut rows = Vec::new();

        for subscription in storage.subscriptions.get_all()? {
            let currency = main.account_currency(subscription.account_id);
            let monthly_cost = main.convert(subscription.monthly_cost(), currency)?;
            if subscription.active {
                monthly_total += monthly_cost;
                yearly_total += main.convert(subscription.yearly_cost(), currency)?;
            }
            rows.push(SubscriptionRow {
                status: subscription.status(today, reminder_days),
                currency,
                next_due: subscription.next_due(),
                days_until_due: subscription.days_until_due(today),
                monthly_cost,
                subscription,
            });
        }

        Ok(Self {
            today,
            currency: main.code(),
            monthly_total,
            yearly_total,
            rows,
        })
    }

    pub fn with_status(&self, status: SubscriptionStatus) -> Vec<&SubscriptionRow> {
        self.rows.iter().filter(|r| r.status == status).collect()
    }

    pub fn format_terminal(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Subscriptions as of {}\n", self.today));
        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "Monthly cost: {}    Yearly cost: {}\n",
            format_amount(self.monthly_total, self.currency),
            format_amount(self.yearly_total, self.currency)
        ));

        if self.rows.is_empty() {
            output.push_str("\nNo subscriptions.\n");
            return output;
        }

        for status in [
            SubscriptionStatus::Overdue,
            SubscriptionStatus::DueSoon,
            SubscriptionStatus::Upcoming,
            SubscriptionStatus::Paused,
        ] {
            let rows = self.with_status(status);
            if rows.is_empty() {
                continue;
            }
            output.push_str(&format!(
                "\n{} ({})\n",
                status.to_string().to_uppercase(),
                rows.len()
            ));
            output.push_str(&"-".repeat(72));
            output.push('\n');
            for row in rows {
                let when = match row.days_until_due {
                    0 => "today".to_string(),
                    1 => "tomorrow".to_string(),
                    d if d < 0 => format!("{} day(s) late", -d),
                    d => format!("in {} days", d),
                };
                output.push_str(&format!(
                    "  {:<24} {:>14} {:<10} {:>11} {:<16}\n",
                    row.subscription.name,
                    format_amount(row.subscription.amount, row.currency),
                    row.subscription.frequency.to_string(),
                    row.next_due.to_string(),
                    if status == SubscriptionStatus::Paused {
                        String::new()
                    } else {
                        when
                    }
                ));
            }
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashiroPaths;
    use crate::models::{Account, AccountType, Frequency};
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashiroPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, m, d).unwrap()
    }

    #[test]
    fn test_costs_and_statuses() {
        let (_temp_dir, storage) = create_test_storage();
        let account = Account::new("Card", AccountType::Credit, CurrencyCode::USD);
        storage.accounts.upsert(account.clone()).unwrap();

        let sub = |name: &str, cents: i64, frequency: Frequency, start: NaiveDate| {
            Subscription::new(name, Money::from_cents(cents), account.id, frequency, start)
        };
        let music = sub("Music", 1_000, Frequency::Monthly, date(6, 1));
        let domain = sub("Domain", 1_200, Frequency::Yearly, date(6, 17));
        let mut gym = sub("Gym", 3_000, Frequency::Monthly, date(7, 1));
        gym.pause();
        for s in [&music, &domain, &gym] {
            storage.subscriptions.upsert(s.clone()).unwrap();
        }

        let report = SubscriptionReport::generate(&storage, date(6, 15), 3).unwrap();
        assert_eq!(report.monthly_total.cents(), 1_100);
        assert_eq!(report.yearly_total.cents(), 13_200);

        assert_eq!(report.with_status(SubscriptionStatus::Overdue).len(), 1);
        assert_eq!(
            report.with_status(SubscriptionStatus::DueSoon)[0].subscription.name,
            "Domain"
        );
        assert_eq!(report.with_status(SubscriptionStatus::Paused).len(), 1);

        let next_dues: Vec<_> = report.rows.iter().map(|r| r.next_due).collect();
        let mut sorted = next_dues.clone();
        sorted.sort();
        assert_eq!(next_dues, sorted);

        let text = report.format_terminal();
        assert!(text.contains("OVERDUE (1)"));
        assert!(text.contains("14 day(s) late"));
    }
}
