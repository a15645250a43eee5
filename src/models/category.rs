//! Category model
//!
//! Categories label income and expense transactions. Every category belongs
//! to exactly one side, and a transaction may only use a category of its own
//! kind.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::CategoryId;
use super::transaction::TransactionKind;

pub const MAX_CATEGORY_NAME_LEN: usize = 50;

/// Which side of the ledger a category belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryKind {
    Income,
    Expense,
}

impl CategoryKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Some(Self::Income),
            "expense" | "expenses" => Some(Self::Expense),
            _ => None,
        }
    }

    /// Whether a transaction of `kind` may use a category of this kind
    pub fn accepts(&self, kind: TransactionKind) -> bool {
        matches!(
            (self, kind),
            (Self::Income, TransactionKind::Income) | (Self::Expense, TransactionKind::Expense)
        )
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Income => write!(f, "Income"),
            Self::Expense => write!(f, "Expense"),
        }
    }
}

/// A transaction category
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,

    pub name: String,

    pub kind: CategoryKind,

    /// Icon key, e.g. `"restaurant"`
    #[serde(default)]
    pub icon: String,

    /// Display color as `#RRGGBB`
    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub sort_order: i32,

    pub created_at: DateTime<Utc>,

    pub updated_at: DateTime<Utc>,
}

fn default_color() -> String {
    "#9E9E9E".to_string()
}

impl Category {
    pub fn new(name: impl Into<String>, kind: CategoryKind) -> Self {
        let now = Utc::now();
        Self {
            id: CategoryId::new(),
            name: name.into(),
            kind,
            icon: String::new(),
            color: default_color(),
            sort_order: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Create a category with icon, color and position
    pub fn with_style(
        name: impl Into<String>,
        kind: CategoryKind,
        icon: impl Into<String>,
        color: impl Into<String>,
        sort_order: i32,
    ) -> Self {
        let mut category = Self::new(name, kind);
        category.icon = icon.into();
        category.color = color.into();
        category.sort_order = sort_order;
        category
    }

    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        let len = name.chars().count();
        if len > MAX_CATEGORY_NAME_LEN {
            return Err(CategoryValidationError::NameTooLong(len));
        }

        if !is_hex_color(&self.color) {
            return Err(CategoryValidationError::InvalidColor(self.color.clone()));
        }

        Ok(())
    }
}

/// `#RRGGBB`
pub fn is_hex_color(s: &str) -> bool {
    s.len() == 7
        && s.starts_with('#')
        && s[1..].chars().all(|c| c.is_ascii_hexdigit())
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Categories created on first run
pub struct DefaultCategory {
    pub name: &'static str,
    pub kind: CategoryKind,
    pub icon: &'static str,
    pub color: &'static str,
}

pub const DEFAULT_CATEGORIES: &[DefaultCategory] = &[
    DefaultCategory { name: "Salary", kind: CategoryKind::Income, icon: "work", color: "#4CAF50" },
    DefaultCategory { name: "Freelance", kind: CategoryKind::Income, icon: "laptop", color: "#8BC34A" },
    DefaultCategory { name: "Investments", kind: CategoryKind::Income, icon: "trending_up", color: "#009688" },
    DefaultCategory { name: "Gifts", kind: CategoryKind::Income, icon: "redeem", color: "#CDDC39" },
    DefaultCategory { name: "Other Income", kind: CategoryKind::Income, icon: "add_circle", color: "#607D8B" },
    DefaultCategory { name: "Food & Dining", kind: CategoryKind::Expense, icon: "restaurant", color: "#FF5722" },
    DefaultCategory { name: "Groceries", kind: CategoryKind::Expense, icon: "shopping_cart", color: "#FF9800" },
    DefaultCategory { name: "Transport", kind: CategoryKind::Expense, icon: "directions_car", color: "#3F51B5" },
    DefaultCategory { name: "Housing", kind: CategoryKind::Expense, icon: "home", color: "#795548" },
    DefaultCategory { name: "Utilities", kind: CategoryKind::Expense, icon: "bolt", color: "#FFC107" },
    DefaultCategory { name: "Entertainment", kind: CategoryKind::Expense, icon: "movie", color: "#9C27B0" },
    DefaultCategory { name: "Shopping", kind: CategoryKind::Expense, icon: "shopping_bag", color: "#E91E63" },
    DefaultCategory { name: "Health", kind: CategoryKind::Expense, icon: "local_hospital", color: "#F44336" },
    DefaultCategory { name: "Subscriptions", kind: CategoryKind::Expense, icon: "autorenew", color: "#673AB7" },
    DefaultCategory { name: "Other Expenses", kind: CategoryKind::Expense, icon: "more_horiz", color: "#9E9E9E" },
];

impl DefaultCategory {
    pub fn to_category(&self, sort_order: i32) -> Category {
        Category::with_style(self.name, self.kind, self.icon, self.color, sort_order)
    }
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    InvalidColor(String),
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => write!(
                f,
                "Category name too long ({} chars, max {})",
                len, MAX_CATEGORY_NAME_LEN
            ),
            Self::InvalidColor(c) => {
                write!(f, "Invalid color '{}': expected #RRGGBB", c)
            }
        }
    }
}

impl std::error::Error for CategoryValidationError {}
