//! Category service
//!
//! Income and expense categories: CRUD, plus reassignment of everything that
//! uses a category when it is removed.

use tracing::info;

use crate::audit::EntityType;
use crate::error::{CashiroError, CashiroResult};
use crate::models::{Category, CategoryId, CategoryKind};
use crate::storage::Storage;

pub struct CategoryService<'a> {
    storage: &'a Storage,
}

#[derive(Debug, Clone)]
pub struct CreateCategoryInput {
    pub name: String,
    pub kind: CategoryKind,
    pub icon: Option<String>,
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateCategoryInput {
    pub name: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
}

/// What a delete touched
#[derive(Debug, Clone)]
pub struct CategoryDeletion {
    pub category: Category,
    pub reassigned_to: Option<Category>,
    pub transactions_moved: usize,
    pub subscriptions_moved: usize,
}

impl<'a> CategoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    pub fn create(&self, input: CreateCategoryInput) -> CashiroResult<Category> {
        let name = input.name.trim();
        if self.storage.categories.name_exists(name, input.kind, None)? {
            return Err(CashiroError::Duplicate {
                entity_type: "Category",
                identifier: name.to_string(),
            });
        }

        let mut category = Category::new(name, input.kind);
        if let Some(icon) = input.icon {
            category.icon = icon.trim().to_string();
        }
        if let Some(color) = input.color {
            category.color = color.trim().to_uppercase();
        }
        category.sort_order = self.storage.categories.next_sort_order(input.kind)?;

        category
            .validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;
        self.storage.log_create(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    pub fn get(&self, id: CategoryId) -> CashiroResult<Option<Category>> {
        self.storage.categories.get(id)
    }

    /// Find by name (case-insensitive) or id
    ///
    /// A name shared by an income and an expense category is ambiguous
    /// unless `kind` is given.
    pub fn find(
        &self,
        identifier: &str,
        kind: Option<CategoryKind>,
    ) -> CashiroResult<Option<Category>> {
        let wanted = identifier.trim().to_lowercase();
        let named: Vec<_> = self
            .list(kind)?
            .into_iter()
            .filter(|c| c.name.to_lowercase() == wanted)
            .collect();
        match named.len() {
            0 => {}
            1 => return Ok(named.into_iter().next()),
            _ => {
                return Err(CashiroError::Validation(format!(
                    "'{}' names both an income and an expense category; specify the kind",
                    identifier.trim()
                )))
            }
        }

        if let Ok(id) = identifier.trim().parse::<CategoryId>() {
            if let Some(category) = self.storage.categories.get(id)? {
                return Ok(Some(category));
            }
        }
        Ok(self
            .list(kind)?
            .into_iter()
            .find(|c| c.id.matches(identifier)))
    }

    pub fn resolve(&self, identifier: &str, kind: Option<CategoryKind>) -> CashiroResult<Category> {
        self.find(identifier, kind)?
            .ok_or_else(|| CashiroError::category_not_found(identifier))
    }

    /// Income categories first, then expense, each in sort order
    pub fn list(&self, kind: Option<CategoryKind>) -> CashiroResult<Vec<Category>> {
        match kind {
            Some(kind) => self.storage.categories.get_by_kind(kind),
            None => self.storage.categories.get_all(),
        }
    }

    /// Number of transactions and subscriptions using a category
    pub fn usage(&self, id: CategoryId) -> CashiroResult<(usize, usize)> {
        Ok((
            self.storage.transactions.get_by_category(id)?.len(),
            self.storage.subscriptions.get_by_category(id)?.len(),
        ))
    }

    pub fn update(&self, id: CategoryId, input: UpdateCategoryInput) -> CashiroResult<Category> {
        let mut category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| CashiroError::category_not_found(id.to_string()))?;
        let before = category.clone();

        if let Some(name) = input.name {
            let name = name.trim();
            if self
                .storage
                .categories
                .name_exists(name, category.kind, Some(id))?
            {
                return Err(CashiroError::Duplicate {
                    entity_type: "Category",
                    identifier: name.to_string(),
                });
            }
            category.name = name.to_string();
        }
        if let Some(icon) = input.icon {
            category.icon = icon.trim().to_string();
        }
        if let Some(color) = input.color {
            category.color = color.trim().to_uppercase();
        }

        category
            .validate()
            .map_err(|e| CashiroError::Validation(e.to_string()))?;
        category.updated_at = chrono::Utc::now();

        self.storage.categories.upsert(category.clone())?;
        self.storage.categories.save()?;
        self.storage.log_update(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &before,
            &category,
        )?;

        Ok(category)
    }

    /// Delete a category
    ///
    /// Refused with `InUse` while transactions or subscriptions reference it,
    /// unless `reassign_to` names another category of the same kind; those
    /// records are then moved there first.
    pub fn delete(
        &self,
        id: CategoryId,
        reassign_to: Option<CategoryId>,
    ) -> CashiroResult<CategoryDeletion> {
        let category = self
            .storage
            .categories
            .get(id)?
            .ok_or_else(|| CashiroError::category_not_found(id.to_string()))?;

        let transactions = self.storage.transactions.get_by_category(id)?;
        let subscriptions = self.storage.subscriptions.get_by_category(id)?;

        let target = match reassign_to {
            Some(target_id) => {
                if target_id == id {
                    return Err(CashiroError::Validation(
                        "Cannot reassign a category to itself".into(),
                    ));
                }
                let target = self
                    .storage
                    .categories
                    .get(target_id)?
                    .ok_or_else(|| CashiroError::category_not_found(target_id.to_string()))?;
                if target.kind != category.kind {
                    return Err(CashiroError::Validation(format!(
                        "Category '{}' is not an {} category",
                        target.name,
                        category.kind.to_string().to_lowercase()
                    )));
                }
                Some(target)
            }
            None => {
                let references = transactions.len() + subscriptions.len();
                if references > 0 {
                    return Err(CashiroError::InUse {
                        entity_type: "Category",
                        identifier: category.name.clone(),
                        references,
                    });
                }
                None
            }
        };

        let new_category = target.as_ref().map(|t| t.id);
        for mut txn in transactions.iter().cloned() {
            txn.category_id = new_category;
            txn.touch();
            self.storage.transactions.upsert(txn)?;
        }
        for mut sub in subscriptions.iter().cloned() {
            sub.category_id = new_category;
            sub.updated_at = chrono::Utc::now();
            self.storage.subscriptions.upsert(sub)?;
        }
        if !transactions.is_empty() {
            self.storage.transactions.save()?;
        }
        if !subscriptions.is_empty() {
            self.storage.subscriptions.save()?;
        }

        self.storage.categories.delete(id)?;
        self.storage.categories.save()?;
        self.storage.log_delete(
            EntityType::Category,
            category.id.to_string(),
            Some(category.name.clone()),
            &category,
        )?;
        info!(
            category = %category.name,
            transactions = transactions.len(),
            subscriptions = subscriptions.len(),
            "deleted category"
        );

        Ok(CategoryDeletion {
            category,
            reassigned_to: target,
            transactions_moved: transactions.len(),
            subscriptions_moved: subscriptions.len(),
        })
    }

    pub fn count(&self) -> CashiroResult<usize> {
        self.storage.categories.count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::CashiroPaths;
    use crate::models::{
        Account, AccountType, CurrencyCode, Frequency, Money, Subscription, Transaction,
    };
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = CashiroPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::open(paths).unwrap();
        (temp_dir, storage)
    }

    fn input(name: &str, kind: CategoryKind) -> CreateCategoryInput {
        CreateCategoryInput {
            name: name.into(),
            kind,
            icon: None,
            color: None,
        }
    }

    #[test]
    fn test_create_and_duplicate_per_kind() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);

        service.create(input("Gifts", CategoryKind::Expense)).unwrap();
        let err = service
            .create(input("gifts", CategoryKind::Expense))
            .unwrap_err();
        assert!(matches!(err, CashiroError::Duplicate { .. }));

        // same name on the other side is allowed
        service.create(input("Gifts", CategoryKind::Income)).unwrap();
        assert_eq!(service.count().unwrap(), 2);

        assert!(service.find("gifts", None).unwrap_err().is_validation());
        let income = service.resolve("Gifts", Some(CategoryKind::Income)).unwrap();
        assert_eq!(income.kind, CategoryKind::Income);
    }

    #[test]
    fn test_create_rejects_bad_color() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let err = service
            .create(CreateCategoryInput {
                color: Some("red".into()),
                ..input("Food", CategoryKind::Expense)
            })
            .unwrap_err();
        assert!(err.is_validation());

        let ok = service
            .create(CreateCategoryInput {
                color: Some("#ff5722".into()),
                ..input("Food", CategoryKind::Expense)
            })
            .unwrap();
        assert_eq!(ok.color, "#FF5722");
    }

    #[test]
    fn test_update_renames() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let food = service.create(input("Food", CategoryKind::Expense)).unwrap();
        service.create(input("Rent", CategoryKind::Expense)).unwrap();

        let err = service
            .update(
                food.id,
                UpdateCategoryInput {
                    name: Some("rent".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, CashiroError::Duplicate { .. }));

        let renamed = service
            .update(
                food.id,
                UpdateCategoryInput {
                    name: Some("Dining".into()),
                    icon: Some("restaurant".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(renamed.name, "Dining");
        assert_eq!(renamed.icon, "restaurant");
    }

    #[test]
    fn test_delete_in_use_requires_reassignment() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let food = service.create(input("Food", CategoryKind::Expense)).unwrap();
        let dining = service.create(input("Dining", CategoryKind::Expense)).unwrap();
        let salary = service.create(input("Salary", CategoryKind::Income)).unwrap();

        let account = Account::new("Wallet", AccountType::Cash, CurrencyCode::USD);
        storage.accounts.upsert(account.clone()).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 3, 1).unwrap();
        let txn = Transaction::expense(account.id, date, Money::from_cents(900))
            .with_category(Some(food.id));
        storage.transactions.upsert(txn.clone()).unwrap();
        let mut sub = Subscription::new("Meal kit", Money::from_cents(5_000), account.id, Frequency::Weekly, date);
        sub.category_id = Some(food.id);
        storage.subscriptions.upsert(sub.clone()).unwrap();

        let err = service.delete(food.id, None).unwrap_err();
        assert!(matches!(err, CashiroError::InUse { references: 2, .. }));

        assert!(service.delete(food.id, Some(salary.id)).unwrap_err().is_validation());

        let deletion = service.delete(food.id, Some(dining.id)).unwrap();
        assert_eq!(deletion.transactions_moved, 1);
        assert_eq!(deletion.subscriptions_moved, 1);
        assert!(service.get(food.id).unwrap().is_none());
        assert_eq!(
            storage.transactions.get(txn.id).unwrap().unwrap().category_id,
            Some(dining.id)
        );
        assert_eq!(
            storage.subscriptions.get(sub.id).unwrap().unwrap().category_id,
            Some(dining.id)
        );
        assert_eq!(service.usage(dining.id).unwrap(), (1, 1));
    }

    #[test]
    fn test_delete_unused() {
        let (_temp_dir, storage) = create_test_storage();
        let service = CategoryService::new(&storage);
        let gifts = service.create(input("Gifts", CategoryKind::Income)).unwrap();
        let deletion = service.delete(gifts.id, None).unwrap();
        assert!(deletion.reassigned_to.is_none());
        assert_eq!(service.count().unwrap(), 0);
    }
}
