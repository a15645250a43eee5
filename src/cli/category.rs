//! Category CLI commands

use clap::Subcommand;

use crate::display::category::{format_category_details, format_category_list};
use crate::error::{CashiroError, CashiroResult};
use crate::models::CategoryKind;
use crate::services::{CategoryService, CreateCategoryInput, UpdateCategoryInput};
use crate::storage::Storage;

#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List categories
    List {
        /// Only income or expense categories
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Show a category and how often it is used
    Show {
        /// Category name or ID
        category: String,
        /// Needed when an income and an expense category share the name
        #[arg(short, long)]
        kind: Option<String>,
    },
    /// Create a category
    Add {
        name: String,
        /// income or expense
        #[arg(short, long, default_value = "expense")]
        kind: String,
        #[arg(short, long)]
        icon: Option<String>,
        /// Hex color such as #4CAF50
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Rename or restyle a category
    Edit {
        category: String,
        #[arg(short, long)]
        kind: Option<String>,
        #[arg(short, long)]
        name: Option<String>,
        #[arg(short, long)]
        icon: Option<String>,
        #[arg(short, long)]
        color: Option<String>,
    },
    /// Delete a category
    Delete {
        category: String,
        #[arg(short, long)]
        kind: Option<String>,
        /// Move its transactions and subscriptions to this category first
        #[arg(short, long)]
        reassign: Option<String>,
    },
}

fn parse_kind(input: &str) -> CashiroResult<CategoryKind> {
    CategoryKind::parse(input).ok_or_else(|| {
        CashiroError::Validation(format!(
            "Invalid category kind: '{}'. Use income or expense",
            input
        ))
    })
}

fn parse_optional_kind(input: Option<String>) -> CashiroResult<Option<CategoryKind>> {
    input.as_deref().map(parse_kind).transpose()
}

pub fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> CashiroResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List { kind } => {
            let categories = service.list(parse_optional_kind(kind)?)?;
            print!("{}", format_category_list(&categories));
        }

        CategoryCommands::Show { category, kind } => {
            let found = service.resolve(&category, parse_optional_kind(kind)?)?;
            let (transactions, subscriptions) = service.usage(found.id)?;
            print!(
                "{}",
                format_category_details(&found, transactions, subscriptions)
            );
        }

        CategoryCommands::Add {
            name,
            kind,
            icon,
            color,
        } => {
            let category = service.create(CreateCategoryInput {
                name,
                kind: parse_kind(&kind)?,
                icon,
                color,
            })?;
            println!(
                "Created {} category: {} ({})",
                category.kind.to_string().to_lowercase(),
                category.name,
                category.id
            );
        }

        CategoryCommands::Edit {
            category,
            kind,
            name,
            icon,
            color,
        } => {
            let found = service.resolve(&category, parse_optional_kind(kind)?)?;
            if name.is_none() && icon.is_none() && color.is_none() {
                println!("No changes specified. Use --name, --icon or --color.");
                return Ok(());
            }
            let updated = service.update(found.id, UpdateCategoryInput { name, icon, color })?;
            println!("Updated category: {}", updated.name);
        }

        CategoryCommands::Delete {
            category,
            kind,
            reassign,
        } => {
            let found = service.resolve(&category, parse_optional_kind(kind)?)?;
            let target = match reassign {
                Some(r) => Some(service.resolve(&r, Some(found.kind))?.id),
                None => None,
            };

            let deletion = service.delete(found.id, target)?;
            println!("Deleted category: {}", deletion.category.name);
            if let Some(target) = deletion.reassigned_to {
                println!(
                    "  Moved {} transaction(s) and {} subscription(s) to {}",
                    deletion.transactions_moved, deletion.subscriptions_moved, target.name
                );
            }
        }
    }

    Ok(())
}
