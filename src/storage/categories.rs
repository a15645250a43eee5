//! Category repository backed by `categories.json`

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

use crate::error::CashiroError;
use crate::models::{Category, CategoryId, CategoryKind};

use super::file_io::{read_json, write_json_atomic};
use super::{read_lock, write_lock};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(crate) struct CategoryData {
    pub categories: Vec<Category>,
}

pub struct CategoryRepository {
    path: PathBuf,
    data: RwLock<HashMap<CategoryId, Category>>,
}

impl CategoryRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    pub fn load(&self) -> Result<(), CashiroError> {
        let file_data: CategoryData = read_json(&self.path)?;
        self.replace_all(file_data.categories)
    }

    pub fn save(&self) -> Result<(), CashiroError> {
        let file_data = CategoryData {
            categories: self.get_all()?,
        };
        write_json_atomic(&self.path, &file_data)
    }

    pub fn replace_all(&self, categories: Vec<Category>) -> Result<(), CashiroError> {
        let mut data = write_lock(&self.data)?;
        data.clear();
        data.extend(categories.into_iter().map(|c| (c.id, c)));
        Ok(())
    }

    pub fn get(&self, id: CategoryId) -> Result<Option<Category>, CashiroError> {
        Ok(read_lock(&self.data)?.get(&id).cloned())
    }

    /// Income categories first, then expenses; each by sort order and name
    pub fn get_all(&self) -> Result<Vec<Category>, CashiroError> {
        let data = read_lock(&self.data)?;
        let mut categories: Vec<_> = data.values().cloned().collect();
        categories.sort_by(|a, b| {
            kind_rank(a.kind)
                .cmp(&kind_rank(b.kind))
                .then(a.sort_order.cmp(&b.sort_order))
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });
        Ok(categories)
    }

    pub fn get_by_kind(&self, kind: CategoryKind) -> Result<Vec<Category>, CashiroError> {
        Ok(self
            .get_all()?
            .into_iter()
            .filter(|c| c.kind == kind)
            .collect())
    }

    /// Case-insensitive lookup, optionally restricted to one kind
    pub fn get_by_name(
        &self,
        name: &str,
        kind: Option<CategoryKind>,
    ) -> Result<Option<Category>, CashiroError> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .get_all()?
            .into_iter()
            .find(|c| c.name.to_lowercase() == wanted && kind.map_or(true, |k| c.kind == k)))
    }

    pub fn name_exists(
        &self,
        name: &str,
        kind: CategoryKind,
        exclude: Option<CategoryId>,
    ) -> Result<bool, CashiroError> {
        let wanted = name.trim().to_lowercase();
        Ok(read_lock(&self.data)?.values().any(|c| {
            c.kind == kind && c.name.to_lowercase() == wanted && Some(c.id) != exclude
        }))
    }

    pub fn upsert(&self, category: Category) -> Result<(), CashiroError> {
        write_lock(&self.data)?.insert(category.id, category);
        Ok(())
    }

    pub fn delete(&self, id: CategoryId) -> Result<bool, CashiroError> {
        Ok(write_lock(&self.data)?.remove(&id).is_some())
    }

    pub fn count(&self) -> Result<usize, CashiroError> {
        Ok(read_lock(&self.data)?.len())
    }

    pub fn next_sort_order(&self, kind: CategoryKind) -> Result<i32, CashiroError> {
        Ok(read_lock(&self.data)?
            .values()
            .filter(|c| c.kind == kind)
            .map(|c| c.sort_order + 1)
            .max()
            .unwrap_or(0))
    }
}

fn kind_rank(kind: CategoryKind) -> u8 {
    match kind {
        CategoryKind::Income => 0,
        CategoryKind::Expense => 1,
    }
}
