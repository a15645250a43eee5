//! Account service
//!
//! CRUD for accounts, derived balances and the main-currency total.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{CashiroError, CashiroResult};
use crate::models::{Account, AccountId, AccountType, CurrencyCode, Money};
use crate::storage::Storage;

pub struct AccountService<'a> {
    storage: &'a Storage,
}

/// An account with its computed balance
#[derive(Debug, Clone)]
pub struct AccountSummary {
    pub account: Account,
    /// Balance in the account's own currency
    pub balance: Money,
    /// Balance in the main currency, if a rate is available
    pub main_balance: Option<Money>,
    pub transaction_count: usize,
}

#[derive(Debug, Clone)]
pub struct CreateAccountInput {
    pub name: String,
    pub account_type: AccountType,
    /// Defaults to the main currency
    pub currency: Option<CurrencyCode>,
    pub opening_balance: Money,
    pub include_in_total: bool,
    pub notes: String,
}

impl CreateAccountInput {
    pub fn new(name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            name: name.into(),
            account_type,
            currency: None,
            opening_balance: Money::zero(),
            include_in_total: true,
            notes: String::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UpdateAccountInput {
    pub name: Option<String>,
    pub account_type: Option<AccountType>,
    /// Only allowed while the account has no transactions
    pub currency: Option<CurrencyCode>,
    pub opening_balance: Option<Money>,
    pub include_in_total: Option<bool>,
    pub notes: Option<String>,
}

/// What a delete removed
#[derive(Debug, Clone)]
pub struct AccountDeletion {
    pub account: Account,
    pub transactions_removed: usize,
    pub subscriptions_removed: usize,
}

impl<'a> AccountService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateAccountInput) -> CashiroResult<Account> {
        let name = input.name.trim();
        if self.storage.accounts.name_exists(name, None)? {
            return Err(CashiroError::Duplicate {
                entity_type: "Account",
                identifier: name.to_string(),
            });
        }

        let currency = match input.currency {
            Some(c) => c,
            None => self.storage.main_currency()?,
        };
        let mut account =
            Account::with_opening_balance(name, input.account_type, currency, input.opening_balance);
        account.include_in_total = input.include_in_total;
        account.notes = input.notes;
        account.sort_order = self.storage.accounts.next_sort_order()?;

        account
            .validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;

        self.storage.log_create(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &account,
        )?;
        info!(account = %account.id, name = %account.name, "created account");

        Ok(account)
    }

    pub fn get(&self, id: AccountId) -> CashiroResult<Option<Account>> {
        self.storage.accounts.get(id)
    }

    /// Find by name (case-insensitive), full id or short id
    pub fn find(&self, identifier: &str) -> CashiroResult<Option<Account>> {
        if let Some(account) = self.storage.accounts.get_by_name(identifier)? {
            return Ok(Some(account));
        }
        if let Ok(id) = identifier.trim().parse::<AccountId>() {
            if let Some(account) = self.storage.accounts.get(id)? {
                return Ok(Some(account));
            }
        }
        Ok(self
            .storage
            .accounts
            .get_all()?
            .into_iter()
            .find(|a| a.id.matches(identifier)))
    }

    /// Like `find`, but a miss is an error
    pub fn resolve(&self, identifier: &str) -> CashiroResult<Account> {
        self.find(identifier)?
            .ok_or_else(|| CashiroError::account_not_found(identifier))
    }

    pub fn list(&self, include_archived: bool) -> CashiroResult<Vec<Account>> {
        if include_archived {
            self.storage.accounts.get_all()
        } else {
            self.storage.accounts.get_active()
        }
    }

    /// Opening balance plus the signed effect of every transaction
    pub fn balance(&self, id: AccountId) -> CashiroResult<Money> {
        let account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| CashiroError::account_not_found(id.to_string()))?;
        Ok(self.summary(&account)?.balance)
    }

    pub fn summary(&self, account: &Account) -> CashiroResult<AccountSummary> {
        let transactions = self.storage.transactions.get_by_account(account.id)?;
        let balance = account.opening_balance
            + transactions
                .iter()
                .map(|t| t.effect_on(account.id))
                .sum::<Money>();
        let main_balance = self
            .storage
            .exchange_rates()?
            .to_main(balance, account.currency)
            .ok();

        Ok(AccountSummary {
            account: account.clone(),
            balance,
            main_balance,
            transaction_count: transactions.len(),
        })
    }

    pub fn list_with_balances(&self, include_archived: bool) -> CashiroResult<Vec<AccountSummary>> {
        self.list(include_archived)?
            .iter()
            .map(|account| self.summary(account))
            .collect()
    }

    /// Sum of included, non-archived balances in the main currency
    ///
    /// Fails with `MissingRate` if any counted account cannot be converted.
    pub fn total_balance(&self) -> CashiroResult<Money> {
        let rates = self.storage.exchange_rates()?;
        let mut total = Money::zero();
        for account in self.storage.accounts.get_all()? {
            if !account.counts_toward_total() {
                continue;
            }
            let summary = self.summary(&account)?;
            total += rates.to_main(summary.balance, account.currency)?;
        }
        Ok(total)
    }

    pub fn update(&self, id: AccountId, input: UpdateAccountInput) -> CashiroResult<Account> {
        let mut account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| CashiroError::account_not_found(id.to_string()))?;
        let before = account.clone();

        if let Some(name) = input.name {
            let name = name.trim();
            if self.storage.accounts.name_exists(name, Some(id))? {
                return Err(CashiroError::Duplicate {
                    entity_type: "Account",
                    identifier: name.to_string(),
                });
            }
            account.name = name.to_string();
        }
        if let Some(account_type) = input.account_type {
            account.account_type = account_type;
        }
        if let Some(currency) = input.currency {
            if currency != account.currency
                && !self.storage.transactions.get_by_account(id)?.is_empty()
            {
                return Err(CashiroError::Validation(format!(
                    "Cannot change the currency of '{}' after transactions were recorded",
                    account.name
                )));
            }
            account.currency = currency;
        }
        if let Some(opening) = input.opening_balance {
            account.opening_balance = opening;
        }
        if let Some(include) = input.include_in_total {
            account.include_in_total = include;
        }
        if let Some(notes) = input.notes {
            account.notes = notes;
        }

        account
            .validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;
        account.updated_at = chrono::Utc::now();

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;
        self.storage.log_update(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &before,
            &account,
        )?;

        Ok(account)
    }

    pub fn archive(&self, id: AccountId) -> CashiroResult<Account> {
        self.set_archived(id, true)
    }

    pub fn unarchive(&self, id: AccountId) -> CashiroResult<Account> {
        self.set_archived(id, false)
    }

    fn set_archived(&self, id: AccountId, archived: bool) -> CashiroResult<Account> {
        let mut account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| CashiroError::account_not_found(id.to_string()))?;

        if account.archived == archived {
            let state = if archived { "archived" } else { "active" };
            return Err(CashiroError::Validation(format!(
                "Account '{}' is already {}",
                account.name, state
            )));
        }

        let before = account.clone();
        if archived {
            account.archive();
        } else {
            account.unarchive();
        }

        self.storage.accounts.upsert(account.clone())?;
        self.storage.accounts.save()?;
        self.storage.log_update(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &before,
            &account,
        )?;

        Ok(account)
    }

    /// Delete an account
    ///
    /// Refused with `InUse` while transactions or subscriptions reference it,
    /// unless `force` is set, in which case those records go too.
    pub fn delete(&self, id: AccountId, force: bool) -> CashiroResult<AccountDeletion> {
        let account = self
            .storage
            .accounts
            .get(id)?
            .ok_or_else(|| CashiroError::account_not_found(id.to_string()))?;

        let transactions = self.storage.transactions.get_by_account(id)?;
        let subscriptions = self.storage.subscriptions.get_by_account(id)?;
        let references = transactions.len() + subscriptions.len();

        if references > 0 && !force {
            return Err(CashiroError::InUse {
                entity_type: "Account",
                identifier: account.name.clone(),
                references,
            });
        }

        for txn in &transactions {
            self.storage.transactions.delete(txn.id)?;
            self.storage
                .log_delete(EntityType::Transaction, txn.id.to_string(), None, txn)?;
        }
        for sub in &subscriptions {
            // Earlier payments may sit on other accounts after a move
            for mut txn in self.storage.transactions.get_by_subscription(sub.id)? {
                txn.subscription_id = None;
                self.storage.transactions.upsert(txn)?;
            }
            self.storage.subscriptions.delete(sub.id)?;
            self.storage.log_delete(
                EntityType::Subscription,
                sub.id.to_string(),
                Some(sub.name.clone()),
                sub,
            )?;
        }
        self.storage.accounts.delete(id)?;

        self.storage.transactions.save()?;
        self.storage.subscriptions.save()?;
        self.storage.accounts.save()?;
        self.storage.log_delete(
            EntityType::Account,
            account.id.to_string(),
            Some(account.name.clone()),
            &account,
        )?;
        info!(account = %account.id, references, "deleted account");

        Ok(AccountDeletion {
            account,
            transactions_removed: transactions.len(),
            subscriptions_removed: subscriptions.len(),
        })
    }

    pub fn count(&self) -> CashiroResult<usize> {
        self.storage.accounts.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashiroPaths;
    use crate::models::Transaction;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashiroPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn input(name: &str, opening: i64) -> CreateAccountInput {
        CreateAccountInput {
            opening_balance: Money::from_cents(opening),
            ..CreateAccountInput::new(name, AccountType::Bank)
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 4, d).unwrap()
    }

    #[test]
    fn test_create_uses_main_currency_and_rejects_duplicates() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);

        let account = service.create(input("Checking", 10_000)).unwrap();
        assert_eq!(account.currency, CurrencyCode::USD);
        assert_eq!(account.opening_balance.cents(), 10_000);

        let err = service.create(input("checking", 0)).unwrap_err();
        assert!(matches!(err, CashiroError::Duplicate { .. }));

        let err = service.create(input("  ", 0)).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_find_by_name_and_short_id() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let account = service.create(input("Wallet", 0)).unwrap();

        assert_eq!(service.find("wallet").unwrap().unwrap().id, account.id);
        assert_eq!(
            service.find(&account.id.to_string()).unwrap().unwrap().id,
            account.id
        );
        assert!(service.resolve("nowhere").unwrap_err().is_not_found());
    }

    #[test]
    fn test_balance_applies_transaction_effects() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let a = service.create(input("A", 10_000)).unwrap();
        let b = service.create(input("B", 0)).unwrap();

        storage
            .transactions
            .upsert(Transaction::income(a.id, day(1), Money::from_cents(5_000)))
            .unwrap();
        storage
            .transactions
            .upsert(Transaction::expense(a.id, day(2), Money::from_cents(2_500)))
            .unwrap();
        storage
            .transactions
            .upsert(Transaction::transfer(
                a.id,
                b.id,
                day(3),
                Money::from_cents(1_000),
                Money::from_cents(1_000),
            ))
            .unwrap();

        assert_eq!(service.balance(a.id).unwrap().cents(), 11_500);
        assert_eq!(service.balance(b.id).unwrap().cents(), 1_000);
        assert_eq!(service.total_balance().unwrap().cents(), 12_500);
    }

    #[test]
    fn test_total_converts_and_skips_excluded() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        service.create(input("Home", 10_000)).unwrap();

        let euro = CreateAccountInput {
            currency: Some(CurrencyCode::EUR),
            ..input("Euro", 10_000)
        };
        service.create(euro).unwrap();

        // no EUR rate yet
        assert!(matches!(
            service.total_balance().unwrap_err(),
            CashiroError::MissingRate { .. }
        ));

        let mut table = std::collections::BTreeMap::new();
        table.insert(CurrencyCode::EUR, Decimal::from_str("1.5").unwrap());
        storage.rates.replace_all(table).unwrap();
        assert_eq!(service.total_balance().unwrap().cents(), 25_000);

        let hidden = CreateAccountInput {
            include_in_total: false,
            ..input("Hidden", 99_900)
        };
        service.create(hidden).unwrap();
        assert_eq!(service.total_balance().unwrap().cents(), 25_000);
    }

    #[test]
    fn test_archive_round_trip() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let account = service.create(input("Old", 0)).unwrap();

        service.archive(account.id).unwrap();
        assert!(service.list(false).unwrap().is_empty());
        assert_eq!(service.list(true).unwrap().len(), 1);
        assert!(service.archive(account.id).unwrap_err().is_validation());

        service.unarchive(account.id).unwrap();
        assert_eq!(service.list(false).unwrap().len(), 1);
    }

    #[test]
    fn test_delete_refused_while_referenced_unless_forced() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let account = service.create(input("Busy", 0)).unwrap();
        storage
            .transactions
            .upsert(Transaction::expense(account.id, day(1), Money::from_cents(100)))
            .unwrap();

        let err = service.delete(account.id, false).unwrap_err();
        assert!(matches!(err, CashiroError::InUse { references: 1, .. }));

        let deletion = service.delete(account.id, true).unwrap();
        assert_eq!(deletion.transactions_removed, 1);
        assert_eq!(storage.transactions.count().unwrap(), 0);
        assert_eq!(service.count().unwrap(), 0);
    }

    #[test]
    fn test_forced_delete_unlinks_payments_on_other_accounts() {
        use crate::backup::{validate_archive, BackupArchive, RestoreManager};
        use crate::models::Frequency;
        use crate::services::{
            CreateSubscriptionInput, SubscriptionService, UpdateSubscriptionInput,
        };

        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let subs = SubscriptionService::new(&storage);
        let first = service.create(input("First", 0)).unwrap();
        let second = service.create(input("Second", 0)).unwrap();

        let sub = subs
            .create(CreateSubscriptionInput {
                name: "Music".into(),
                amount: Money::from_cents(999),
                account_id: first.id,
                category_id: None,
                frequency: Frequency::Monthly,
                start_date: day(1),
                notes: String::new(),
            })
            .unwrap();
        let payment = subs.mark_paid(sub.id).unwrap();
        subs.update(
            sub.id,
            UpdateSubscriptionInput {
                account_id: Some(second.id),
                ..Default::default()
            },
        )
        .unwrap();

        let deletion = service.delete(second.id, true).unwrap();
        assert_eq!(deletion.subscriptions_removed, 1);

        let kept = storage
            .transactions
            .get(payment.transaction.id)
            .unwrap()
            .unwrap();
        assert_eq!(kept.subscription_id, None);

        let archive = BackupArchive::from_storage(&storage).unwrap();
        assert!(validate_archive(&archive).problems.is_empty());
        RestoreManager::new(&storage)
            .restore_from_archive(archive)
            .unwrap();
        assert_eq!(storage.transactions.count().unwrap(), 1);
    }

    #[test]
    fn test_update_currency_locked_after_transactions() {
        let (_temp_dir, storage) = create_test_storage();
        let service = AccountService::new(&storage);
        let account = service.create(input("Travel", 0)).unwrap();

        let renamed = service
            .update(
                account.id,
                UpdateAccountInput {
                    name: Some("Trips".into()),
                    currency: Some(CurrencyCode::EUR),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "Trips");
        assert_eq!(renamed.currency, CurrencyCode::EUR);

        storage
            .transactions
            .upsert(Transaction::expense(account.id, day(1), Money::from_cents(100)))
            .unwrap();
        let err = service
            .update(
                account.id,
                UpdateAccountInput {
                    currency: Some(CurrencyCode::USD),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());
    }
}
