//! Transaction service
//!
//! Records income, expenses and transfers, and answers filtered listings.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::{debug, info};

use crate::audit::EntityType;
use crate::error::{CashiroError, CashiroResult};
use crate::models::{
    Account, AccountId, CategoryId, Money, Transaction, TransactionId, TransactionKind,
};
use crate::storage::Storage;

pub struct TransactionService<'a> {
    storage: &'a Storage,
}

/// Order of a transaction listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransactionSort {
    #[default]
    DateDesc,
    DateAsc,
    AmountDesc,
    AmountAsc,
}

impl TransactionSort {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "date-desc" | "newest" | "date" => Some(Self::DateDesc),
            "date-asc" | "oldest" => Some(Self::DateAsc),
            "amount-desc" | "largest" | "amount" => Some(Self::AmountDesc),
            "amount-asc" | "smallest" => Some(Self::AmountAsc),
            _ => None,
        }
    }

    fn compare(&self, a: &Transaction, b: &Transaction) -> Ordering {
        let newest = b.date.cmp(&a.date).then(b.created_at.cmp(&a.created_at));
        match self {
            Self::DateDesc => newest,
            Self::DateAsc => a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)),
            Self::AmountDesc => b.amount.cmp(&a.amount).then(newest),
            Self::AmountAsc => a.amount.cmp(&b.amount).then(newest),
        }
    }
}

/// Criteria for listing transactions; every set field must match
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub account_id: Option<AccountId>,
    pub category_id: Option<CategoryId>,
    pub kind: Option<TransactionKind>,
    /// Inclusive
    pub start_date: Option<NaiveDate>,
    /// Inclusive
    pub end_date: Option<NaiveDate>,
    /// Case-insensitive match on the note or category name
    pub search: Option<String>,
    pub sort: TransactionSort,
    pub limit: Option<usize>,
}

impl TransactionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn account(mut self, account_id: AccountId) -> Self {
        self.account_id = Some(account_id);
        self
    }

    pub fn category(mut self, category_id: CategoryId) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn date_range(mut self, start: NaiveDate, end: NaiveDate) -> Self {
        self.start_date = Some(start);
        self.end_date = Some(end);
        self
    }

    pub fn search(mut self, text: impl Into<String>) -> Self {
        self.search = Some(text.into());
        self
    }

    pub fn sort(mut self, sort: TransactionSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Input for an income or expense
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub kind: TransactionKind,
    pub account_id: AccountId,
    pub amount: Money,
    pub category_id: Option<CategoryId>,
    pub date: NaiveDate,
    pub note: String,
}

#[derive(Debug, Clone)]
pub struct TransferInput {
    pub from: AccountId,
    pub to: AccountId,
    pub amount: Money,
    /// Amount credited to `to`; converted from `amount` when omitted
    pub to_amount: Option<Money>,
    pub date: NaiveDate,
    pub note: String,
}

/// Fields to change; `None` leaves the field alone
#[derive(Debug, Clone, Default)]
pub struct UpdateTransactionInput {
    pub amount: Option<Money>,
    pub to_amount: Option<Money>,
    /// `Some(None)` removes the category
    pub category_id: Option<Option<CategoryId>>,
    pub date: Option<NaiveDate>,
    pub note: Option<String>,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateTransactionInput) -> CashiroResult<Transaction> {
        let account = self.open_account(input.account_id)?;

        let txn = match input.kind {
            TransactionKind::Income => Transaction::income(account.id, input.date, input.amount),
            TransactionKind::Expense => Transaction::expense(account.id, input.date, input.amount),
            TransactionKind::Transfer => {
                return Err(CashiroError::Validation(
                    "Use a transfer to move money between accounts".into(),
                ))
            }
        }
        .with_category(input.category_id)
        .with_note(input.note.trim());

        self.check_category(&txn)?;
        txn.validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(format!("{} {} {}", txn.date, txn.kind, account.name)),
            &txn,
        )?;
        debug!(txn = %txn.id, kind = %txn.kind, "recorded transaction");

        Ok(txn)
    }

    /// Move money between two accounts
    ///
    /// When the currencies differ and no `to_amount` is given, the amount is
    /// converted with the stored exchange rates.
    pub fn transfer(&self, input: TransferInput) -> CashiroResult<Transaction> {
        if input.from == input.to {
            return Err(CashiroError::Validation(
                "Cannot transfer from an account to itself".into(),
            ));
        }
        let from = self.open_account(input.from)?;
        let to = self.open_account(input.to)?;

        let to_amount = match input.to_amount {
            Some(amount) => amount,
            None => self
                .storage
                .exchange_rates()?
                .convert(input.amount, from.currency, to.currency)?,
        };

        let txn = Transaction::transfer(from.id, to.id, input.date, input.amount, to_amount)
            .with_note(input.note.trim());
        txn.validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        self.storage.log_create(
            EntityType::Transaction,
            txn.id.to_string(),
            Some(format!("{} {} -> {}", txn.date, from.name, to.name)),
            &txn,
        )?;
        info!(txn = %txn.id, from = %from.name, to = %to.name, "recorded transfer");

        Ok(txn)
    }

    pub fn get(&self, id: TransactionId) -> CashiroResult<Option<Transaction>> {
        self.storage.transactions.get(id)
    }

    /// Find by full or short id
    pub fn find(&self, identifier: &str) -> CashiroResult<Option<Transaction>> {
        if let Ok(id) = identifier.trim().parse::<TransactionId>() {
            if let Some(txn) = self.storage.transactions.get(id)? {
                return Ok(Some(txn));
            }
        }
        Ok(self
            .storage
            .transactions
            .get_all()?
            .into_iter()
            .find(|t| t.id.matches(identifier)))
    }

    pub fn resolve(&self, identifier: &str) -> CashiroResult<Transaction> {
        self.find(identifier)?
            .ok_or_else(|| CashiroError::transaction_not_found(identifier))
    }

    pub fn list(&self, filter: &TransactionFilter) -> CashiroResult<Vec<Transaction>> {
        let mut transactions = if let Some(account_id) = filter.account_id {
            self.storage.transactions.get_by_account(account_id)?
        } else if let Some(category_id) = filter.category_id {
            self.storage.transactions.get_by_category(category_id)?
        } else {
            self.storage.transactions.get_all()?
        };

        if let Some(category_id) = filter.category_id {
            transactions.retain(|t| t.category_id == Some(category_id));
        }
        if let Some(kind) = filter.kind {
            transactions.retain(|t| t.kind == kind);
        }
        if let Some(start) = filter.start_date {
            transactions.retain(|t| t.date >= start);
        }
        if let Some(end) = filter.end_date {
            transactions.retain(|t| t.date <= end);
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let needle = search.to_lowercase();
            let category_names: HashMap<CategoryId, String> = self
                .storage
                .categories
                .get_all()?
                .into_iter()
                .map(|c| (c.id, c.name.to_lowercase()))
                .collect();
            transactions.retain(|t| {
                t.note.to_lowercase().contains(&needle)
                    || t.category_id
                        .and_then(|id| category_names.get(&id))
                        .map_or(false, |name| name.contains(&needle))
            });
        }

        transactions.sort_by(|a, b| filter.sort.compare(a, b));
        if let Some(limit) = filter.limit {
            transactions.truncate(limit);
        }

        Ok(transactions)
    }

    pub fn update(
        &self,
        id: TransactionId,
        input: UpdateTransactionInput,
    ) -> CashiroResult<Transaction> {
        let mut txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| CashiroError::transaction_not_found(id.to_string()))?;
        let before = txn.clone();

        let account = self.open_account(txn.account_id)?;
        let destination = txn
            .to_account_id
            .map(|to| self.open_account(to))
            .transpose()?;

        if let Some(amount) = input.amount {
            txn.amount = amount;
            // The destination leg follows unless it was given explicitly
            if let (Some(to), None) = (&destination, input.to_amount) {
                txn.to_amount = Some(if to.currency == account.currency {
                    amount
                } else {
                    self.storage
                        .exchange_rates()?
                        .convert(amount, account.currency, to.currency)?
                });
            }
        }
        if let Some(to_amount) = input.to_amount {
            if !txn.is_transfer() {
                return Err(CashiroError::Validation(
                    "Only transfers have a destination amount".into(),
                ));
            }
            txn.to_amount = Some(to_amount);
        }
        if let Some(category_id) = input.category_id {
            txn.category_id = category_id;
        }
        if let Some(date) = input.date {
            txn.date = date;
        }
        if let Some(note) = input.note {
            txn.note = note.trim().to_string();
        }

        self.check_category(&txn)?;
        txn.validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;
        txn.touch();

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;
        self.storage.log_update(
            EntityType::Transaction,
            txn.id.to_string(),
            None,
            &before,
            &txn,
        )?;

        Ok(txn)
    }

    pub fn delete(&self, id: TransactionId) -> CashiroResult<Transaction> {
        let txn = self
            .storage
            .transactions
            .get(id)?
            .ok_or_else(|| CashiroError::transaction_not_found(id.to_string()))?;

        self.storage.transactions.delete(id)?;
        self.storage.transactions.save()?;
        self.storage
            .log_delete(EntityType::Transaction, txn.id.to_string(), None, &txn)?;

        Ok(txn)
    }

    pub fn count(&self) -> CashiroResult<usize> {
        self.storage.transactions.count()
    }

    fn open_account(&self, id: AccountId) -> CashiroResult<Account> {
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
        Ok(account)
    }

    /// The category must exist and be of the transaction's kind
    fn check_category(&self, txn: &Transaction) -> CashiroResult<()> {
        let Some(category_id) = txn.category_id else {
            return Ok(());
        };
        let category = self
            .storage
            .categories
            .get(category_id)?
            .ok_or_else(|| CashiroError::category_not_found(category_id.to_string()))?;
        if !category.kind.accepts(txn.kind) {
            return Err(CashiroError::Validation(format!(
                "Category '{}' is for {} and cannot be used on a {} transaction",
                category.name,
                category.kind.to_string().to_lowercase(),
                txn.kind.to_string().to_lowercase()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashiroPaths;
    use crate::models::{AccountType, Category, CategoryKind, CurrencyCode};
    use crate::services::account::{AccountService, CreateAccountInput};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashiroPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn account(storage: &Storage, name: &str, currency: CurrencyCode) -> Account {
        AccountService::new(storage)
            .create(CreateAccountInput {
                currency: Some(currency),
                ..CreateAccountInput::new(name, AccountType::Bank)
            })
            .unwrap()
    }

    fn category(storage: &Storage, name: &str, kind: CategoryKind) -> Category {
        let category = Category::new(name, kind);
        storage.categories.upsert(category.clone()).unwrap();
        category
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
    }

    fn expense(account_id: AccountId, cents: i64, d: u32) -> CreateTransactionInput {
        CreateTransactionInput {
            kind: TransactionKind::Expense,
            account_id,
            amount: Money::from_cents(cents),
            category_id: None,
            date: day(d),
            note: String::new(),
        }
    }

    #[test]
    fn test_create_checks_category_kind() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let wallet = account(&storage, "Wallet", CurrencyCode::USD);
        let salary = category(&storage, "Salary", CategoryKind::Income);
        let food = category(&storage, "Food", CategoryKind::Expense);

        let wrong = CreateTransactionInput {
            category_id: Some(salary.id),
            ..expense(wallet.id, 500, 1)
        };
        assert!(service.create(wrong).unwrap_err().is_validation());

        let right = CreateTransactionInput {
            category_id: Some(food.id),
            ..expense(wallet.id, 500, 1)
        };
        let txn = service.create(right).unwrap();
        assert_eq!(txn.category_id, Some(food.id));
        assert_eq!(service.count().unwrap(), 1);
    }

    #[test]
    fn test_create_rejects_archived_account_and_zero_amount() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let wallet = account(&storage, "Wallet", CurrencyCode::USD);

        assert!(service.create(expense(wallet.id, 0, 1)).unwrap_err().is_validation());

        AccountService::new(&storage).archive(wallet.id).unwrap();
        assert!(service.create(expense(wallet.id, 100, 1)).unwrap_err().is_validation());
    }

    #[test]
    fn test_transfer_converts_between_currencies() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let usd = account(&storage, "Checking", CurrencyCode::USD);
        let eur = account(&storage, "Euro", CurrencyCode::EUR);

        let input = TransferInput {
            from: usd.id,
            to: eur.id,
            amount: Money::from_cents(11_000),
            to_amount: None,
            date: day(2),
            note: "trip".into(),
        };
        assert!(matches!(
            service.transfer(input.clone()).unwrap_err(),
            CashiroError::MissingRate { .. }
        ));

        let mut table = std::collections::BTreeMap::new();
        table.insert(CurrencyCode::EUR, Decimal::from_str("1.1").unwrap());
        storage.rates.replace_all(table).unwrap();

        let txn = service.transfer(input).unwrap();
        assert_eq!(txn.to_amount, Some(Money::from_cents(10_000)));

        let accounts = AccountService::new(&storage);
        assert_eq!(accounts.balance(usd.id).unwrap().cents(), -11_000);
        assert_eq!(accounts.balance(eur.id).unwrap().cents(), 10_000);
    }

    #[test]
    fn test_transfer_to_same_account_rejected() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let wallet = account(&storage, "Wallet", CurrencyCode::USD);
        let err = service
            .transfer(TransferInput {
                from: wallet.id,
                to: wallet.id,
                amount: Money::from_cents(100),
                to_amount: None,
                date: day(1),
                note: String::new(),
            })
            .unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_list_filters_and_sorts() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let wallet = account(&storage, "Wallet", CurrencyCode::USD);
        let bank = account(&storage, "Bank", CurrencyCode::USD);
        let groceries = category(&storage, "Groceries", CategoryKind::Expense);

        service
            .create(CreateTransactionInput {
                category_id: Some(groceries.id),
                ..expense(wallet.id, 3_000, 10)
            })
            .unwrap();
        service
            .create(CreateTransactionInput {
                note: "Coffee beans".into(),
                ..expense(wallet.id, 1_200, 15)
            })
            .unwrap();
        service
            .create(CreateTransactionInput {
                kind: TransactionKind::Income,
                ..expense(bank.id, 50_000, 20)
            })
            .unwrap();

        let all = service.list(&TransactionFilter::new()).unwrap();
        let days: Vec<_> = all.iter().map(|t| t.date).collect();
        assert_eq!(days, vec![day(20), day(15), day(10)]);

        let range = service
            .list(&TransactionFilter::new().date_range(day(10), day(15)))
            .unwrap();
        assert_eq!(range.len(), 2);

        let by_account = service
            .list(&TransactionFilter::new().account(wallet.id).sort(TransactionSort::AmountAsc))
            .unwrap();
        let amounts: Vec<_> = by_account.iter().map(|t| t.amount.cents()).collect();
        assert_eq!(amounts, vec![1_200, 3_000]);

        let income = service
            .list(&TransactionFilter::new().kind(TransactionKind::Income))
            .unwrap();
        assert_eq!(income.len(), 1);

        assert_eq!(service.list(&TransactionFilter::new().search("coffee")).unwrap().len(), 1);
        assert_eq!(service.list(&TransactionFilter::new().search("GROC")).unwrap().len(), 1);
        assert_eq!(service.list(&TransactionFilter::new().limit(1)).unwrap()[0].date, day(20));
    }

    #[test]
    fn test_same_day_ties_break_on_creation_order() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let wallet = account(&storage, "Wallet", CurrencyCode::USD);

        let first = service.create(expense(wallet.id, 100, 5)).unwrap();
        let mut second = Transaction::expense(wallet.id, day(5), Money::from_cents(200));
        second.created_at = first.created_at + chrono::Duration::seconds(1);
        storage.transactions.upsert(second.clone()).unwrap();

        let desc = service.list(&TransactionFilter::new()).unwrap();
        assert_eq!(desc[0].id, second.id);
        let asc = service
            .list(&TransactionFilter::new().sort(TransactionSort::DateAsc))
            .unwrap();
        assert_eq!(asc[0].id, first.id);
    }

    #[test]
    fn test_update_and_delete() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let wallet = account(&storage, "Wallet", CurrencyCode::USD);
        let txn = service.create(expense(wallet.id, 100, 1)).unwrap();

        let updated = service
            .update(
                txn.id,
                UpdateTransactionInput {
                    amount: Some(Money::from_cents(250)),
                    note: Some("lunch".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.amount.cents(), 250);
        assert_eq!(updated.note, "lunch");

        let err = service
            .update(
                txn.id,
                UpdateTransactionInput {
                    to_amount: Some(Money::from_cents(1)),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(err.is_validation());

        let found = service.resolve(&txn.id.to_string()).unwrap();
        service.delete(found.id).unwrap();
        assert!(service.get(txn.id).unwrap().is_none());
        assert!(service.delete(txn.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_amount_edit_reconverts_destination_leg() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let eur = account(&storage, "Euro", CurrencyCode::EUR);
        let usd = account(&storage, "Checking", CurrencyCode::USD);
        let usd_2 = account(&storage, "Savings", CurrencyCode::USD);

        let mut table = std::collections::BTreeMap::new();
        table.insert(CurrencyCode::EUR, Decimal::from(2));
        storage.rates.replace_all(table).unwrap();

        let cross = service
            .transfer(TransferInput {
                from: eur.id,
                to: usd.id,
                amount: Money::from_cents(10_000),
                to_amount: None,
                date: day(3),
                note: String::new(),
            })
            .unwrap();
        assert_eq!(cross.to_amount, Some(Money::from_cents(20_000)));

        let edited = service
            .update(
                cross.id,
                UpdateTransactionInput {
                    amount: Some(Money::from_cents(50_000)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(edited.to_amount, Some(Money::from_cents(100_000)));

        // An explicit destination amount wins over the rate
        let edited = service
            .update(
                cross.id,
                UpdateTransactionInput {
                    amount: Some(Money::from_cents(1_000)),
                    to_amount: Some(Money::from_cents(2_100)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(edited.to_amount, Some(Money::from_cents(2_100)));

        let same = service
            .transfer(TransferInput {
                from: usd.id,
                to: usd_2.id,
                amount: Money::from_cents(700),
                to_amount: None,
                date: day(3),
                note: String::new(),
            })
            .unwrap();
        let edited = service
            .update(
                same.id,
                UpdateTransactionInput {
                    amount: Some(Money::from_cents(900)),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(edited.to_amount, Some(Money::from_cents(900)));
    }

    #[test]
    fn test_update_rejects_archived_accounts() {
        let (_temp_dir, storage) = create_test_storage();
        let service = TransactionService::new(&storage);
        let accounts = AccountService::new(&storage);
        let wallet = account(&storage, "Wallet", CurrencyCode::USD);
        let savings = account(&storage, "Savings", CurrencyCode::USD);
        let txn = service.create(expense(wallet.id, 100, 1)).unwrap();
        let transfer = service
            .transfer(TransferInput {
                from: wallet.id,
                to: savings.id,
                amount: Money::from_cents(300),
                to_amount: None,
                date: day(2),
                note: String::new(),
            })
            .unwrap();

        let note = || UpdateTransactionInput {
            note: Some("edited".into()),
            ..Default::default()
        };

        accounts.archive(savings.id).unwrap();
        assert!(service.update(transfer.id, note()).unwrap_err().is_validation());
        assert!(service.update(txn.id, note()).is_ok());

        accounts.archive(wallet.id).unwrap();
        assert!(service.update(txn.id, note()).unwrap_err().is_validation());
        assert_eq!(service.get(txn.id).unwrap().unwrap().note, "edited");
    }
}
