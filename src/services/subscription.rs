//! Subscription service
//!
//! Recurring payments: scheduling, status, and turning a due payment into an
//! expense transaction.

use chrono::{Duration, NaiveDate, Utc};
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{CashiroError, CashiroResult};
use crate::models::{
    AccountId, CategoryId, CategoryKind, Frequency, Money, Subscription, SubscriptionId,
    SubscriptionStatus, Transaction,
};
use crate::storage::Storage;

/// Reminder window used when settings don't say otherwise
pub const DEFAULT_REMINDER_DAYS: u32 = 3;

pub struct SubscriptionService<'a> {
    storage: &'a Storage,
    reminder_days: u32,
}

#[derive(Debug, Clone)]
pub struct CreateSubscriptionInput {
    pub name: String,
    pub amount: Money,
    pub account_id: AccountId,
    pub category_id: Option<CategoryId>,
    pub frequency: Frequency,
    pub start_date: NaiveDate,
    pub notes: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateSubscriptionInput {
    pub name: Option<String>,
    pub amount: Option<Money>,
    pub account_id: Option<AccountId>,
    /// `Some(None)` removes the category
    pub category_id: Option<Option<CategoryId>>,
    pub frequency: Option<Frequency>,
    pub start_date: Option<NaiveDate>,
    pub notes: Option<String>,
}

/// Result of paying a subscription
#[derive(Debug, Clone)]
pub struct SubscriptionPayment {
    pub subscription: Subscription,
    pub transaction: Transaction,
}

impl<'a> SubscriptionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self {
            storage,
            reminder_days: DEFAULT_REMINDER_DAYS,
        }
    }

    /// Days before the due date a subscription counts as due soon
    pub fn with_reminder_days(mut self, days: u32) -> Self {
        self.reminder_days = days;
        self
    }

    pub fn reminder_days(&self) -> u32 {
        self.reminder_days
    }

    pub fn status(&self, subscription: &Subscription, today: NaiveDate) -> SubscriptionStatus {
        subscription.status(today, self.reminder_days)
    }

    pub fn create(&self, input: CreateSubscriptionInput) -> CashiroResult<Subscription> {
        let name = input.name.trim();
        if self.storage.subscriptions.get_by_name(name)?.is_some() {
            return Err(CashiroError::Duplicate {
                entity_type: "Subscription",
                identifier: name.to_string(),
            });
        }
        self.check_account(input.account_id)?;
        self.check_category(input.category_id)?;

        let mut subscription = Subscription::new(
            name,
            input.amount,
            input.account_id,
            input.frequency,
            input.start_date,
        );
        subscription.category_id = input.category_id;
        subscription.notes = input.notes.trim().to_string();

        subscription
            .validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;

        self.storage.subscriptions.upsert(subscription.clone())?;
        self.storage.subscriptions.save()?;
        self.storage.log_create(
            EntityType::Subscription,
            subscription.id.to_string(),
            Some(subscription.name.clone()),
            &subscription,
        )?;
        info!(subscription = %subscription.id, name = %subscription.name, "created subscription");

        Ok(subscription)
    }

    pub fn get(&self, id: SubscriptionId) -> CashiroResult<Option<Subscription>> {
        self.storage.subscriptions.get(id)
    }

    /// Find by name (case-insensitive), full id or short id
    pub fn find(&self, identifier: &str) -> CashiroResult<Option<Subscription>> {
        if let Some(sub) = self.storage.subscriptions.get_by_name(identifier)? {
            return Ok(Some(sub));
        }
        if let Ok(id) = identifier.trim().parse::<SubscriptionId>() {
            if let Some(sub) = self.storage.subscriptions.get(id)? {
                return Ok(Some(sub));
            }
        }
        Ok(self
            .storage
            .subscriptions
            .get_all()?
            .into_iter()
            .find(|s| s.id.matches(identifier)))
    }

    pub fn resolve(&self, identifier: &str) -> CashiroResult<Subscription> {
        self.find(identifier)?
            .ok_or_else(|| CashiroError::subscription_not_found(identifier))
    }

    /// All subscriptions by next due date, optionally only those in `status`
    pub fn list(
        &self,
        status: Option<SubscriptionStatus>,
        today: NaiveDate,
    ) -> CashiroResult<Vec<Subscription>> {
        let mut subs = self.storage.subscriptions.get_all()?;
        if let Some(status) = status {
            subs.retain(|s| self.status(s, today) == status);
        }
        Ok(subs)
    }

    /// Active subscriptions due between `today` and `today + within_days`
    pub fn upcoming(&self, today: NaiveDate, within_days: u32) -> CashiroResult<Vec<Subscription>> {
        let horizon = today
            .checked_add_signed(Duration::days(i64::from(within_days)))
            .unwrap_or(NaiveDate::MAX);
        Ok(self
            .storage
            .subscriptions
            .get_all()?
            .into_iter()
            .filter(|s| s.active && s.next_due() >= today && s.next_due() <= horizon)
            .collect())
    }

    pub fn overdue(&self, today: NaiveDate) -> CashiroResult<Vec<Subscription>> {
        self.list(Some(SubscriptionStatus::Overdue), today)
    }

    pub fn update(
        &self,
        id: SubscriptionId,
        input: UpdateSubscriptionInput,
    ) -> CashiroResult<Subscription> {
        let mut subscription = self.require(id)?;
        let before = subscription.clone();

        if let Some(name) = input.name {
            let name = name.trim();
            if let Some(other) = self.storage.subscriptions.get_by_name(name)? {
                if other.id != id {
                    return Err(CashiroError::Duplicate {
                        entity_type: "Subscription",
                        identifier: name.to_string(),
                    });
                }
            }
            subscription.name = name.to_string();
        }
        if let Some(amount) = input.amount {
            subscription.amount = amount;
        }
        if let Some(account_id) = input.account_id {
            self.check_account(account_id)?;
            subscription.account_id = account_id;
        }
        if let Some(category_id) = input.category_id {
            self.check_category(category_id)?;
            subscription.category_id = category_id;
        }
        if let Some(frequency) = input.frequency {
            subscription.frequency = frequency;
        }
        if let Some(start_date) = input.start_date {
            subscription.start_date = start_date;
        }
        if let Some(notes) = input.notes {
            subscription.notes = notes.trim().to_string();
        }

        subscription
            .validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;
        subscription.updated_at = Utc::now();

        self.save_update(&before, &subscription)?;
        Ok(subscription)
    }

    pub fn pause(&self, id: SubscriptionId) -> CashiroResult<Subscription> {
        let mut subscription = self.require(id)?;
        if !subscription.active {
            return Err(CashiroError::Validation(format!(
                "Subscription '{}' is already paused",
                subscription.name
            )));
        }
        let before = subscription.clone();
        subscription.pause();
        self.save_update(&before, &subscription)?;
        Ok(subscription)
    }

    pub fn resume(&self, id: SubscriptionId) -> CashiroResult<Subscription> {
        let mut subscription = self.require(id)?;
        if subscription.active {
            return Err(CashiroError::Validation(format!(
                "Subscription '{}' is not paused",
                subscription.name
            )));
        }
        let before = subscription.clone();
        subscription.resume();
        self.save_update(&before, &subscription)?;
        Ok(subscription)
    }

    /// Pay the current occurrence
    ///
    /// Records an expense on the subscription's account and category, dated
    /// on the due date, then moves the schedule to the next occurrence.
    pub fn mark_paid(&self, id: SubscriptionId) -> CashiroResult<SubscriptionPayment> {
        let mut subscription = self.require(id)?;
        if !subscription.active {
            return Err(CashiroError::Validation(format!(
                "Subscription '{}' is paused; resume it before paying",
                subscription.name
            )));
        }
        self.check_account(subscription.account_id)?;
        let before = subscription.clone();

        let due = subscription.advance();
        subscription.last_paid_on = Some(due);

        let mut transaction =
            Transaction::expense(subscription.account_id, due, subscription.amount)
                .with_category(subscription.category_id)
                .with_note(subscription.name.clone());
        transaction.subscription_id = Some(subscription.id);
        transaction
            .validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(transaction.clone())?;
        self.storage.transactions.save()?;
        self.storage.log_create(
            EntityType::Transaction,
            transaction.id.to_string(),
            Some(format!("{} {}", transaction.date, subscription.name)),
            &transaction,
        )?;
        self.save_update(&before, &subscription)?;
        info!(subscription = %subscription.name, due = %due, "paid subscription");

        Ok(SubscriptionPayment {
            subscription,
            transaction,
        })
    }

    /// Move past the current occurrence without recording a payment
    ///
    /// Returns the subscription and the skipped due date.
    pub fn skip(&self, id: SubscriptionId) -> CashiroResult<(Subscription, NaiveDate)> {
        let mut subscription = self.require(id)?;
        let before = subscription.clone();
        let skipped = subscription.advance();
        self.save_update(&before, &subscription)?;
        debug!(subscription = %subscription.name, skipped = %skipped, "skipped occurrence");
        Ok((subscription, skipped))
    }

    /// Delete a subscription; transactions it produced stay but lose the link
    pub fn delete(&self, id: SubscriptionId) -> CashiroResult<Subscription> {
        let subscription = self.require(id)?;

        let linked = self.storage.transactions.get_by_subscription(id)?;
        if !linked.is_empty() {
            for mut txn in linked {
                txn.subscription_id = None;
                self.storage.transactions.upsert(txn)?;
            }
            self.storage.transactions.save()?;
        }

        self.storage.subscriptions.delete(id)?;
        self.storage.subscriptions.save()?;
        self.storage.log_delete(
            EntityType::Subscription,
            subscription.id.to_string(),
            Some(subscription.name.clone()),
            &subscription,
        )?;

        Ok(subscription)
    }

    /// Sum of the normalised monthly cost of active subscriptions, in the
    /// main currency
    pub fn monthly_total(&self) -> CashiroResult<Money> {
        let rates = self.storage.exchange_rates()?;
        let mut total = Money::zero();
        for sub in self.storage.subscriptions.get_all()? {
            if !sub.active {
                continue;
            }
            let currency = self
                .storage
                .accounts
                .get(sub.account_id)?
                .map(|a| a.currency)
                .unwrap_or(rates.main());
            total += rates.to_main(sub.monthly_cost(), currency)?;
        }
        Ok(total)
    }

    pub fn count(&self) -> CashiroResult<usize> {
        self.storage.subscriptions.count()
    }

    fn require(&self, id: SubscriptionId) -> CashiroResult<Subscription> {
        self.storage
            .subscriptions
            .get(id)?
            .ok_or_else(|| CashiroError::subscription_not_found(id.to_string()))
    }

    fn save_update(&self, before: &Subscription, after: &Subscription) -> CashiroResult<()> {
        self.storage.subscriptions.upsert(after.clone())?;
        self.storage.subscriptions.save()?;
        self.storage.log_update(
            EntityType::Subscription,
            after.id.to_string(),
            Some(after.name.clone()),
            before,
            after,
        )
    }

    fn check_account(&self, id: AccountId) -> CashiroResult<()> {
        let account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| CashiroError::account_not_found(id.to_string()))?;
        if account.archived {
            return Err(CashiroError::Validation(format!(
                "Account '{}' is archived",
                account.name
            )));
        }
        Ok(())
    }

    fn check_category(&self, id: Option<CategoryId>) -> CashiroResult<()> {
        let Some(id) = id else {
            return Ok(());
        };
        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| CashiroError::category_not_found(id.to_string()))?;
        if category.kind != CategoryKind::Expense {
            return Err(CashiroError::Validation(format!(
                "Subscriptions need an expense category, '{}' is income",
                category.name
            )));
        }
        Ok(())
    }
}
