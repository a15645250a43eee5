//! First-run setup
//!
//! Creates the directory layout, the default profile and the starter
//! categories. Existing files are never overwritten, so running `init` twice
//! is harmless.

use tracing::info;

use crate::config::paths::CashiroPaths;
use crate::error::CashiroError;
use crate::models::{CurrencyCode, Profile, DEFAULT_CATEGORIES};

use super::categories::CategoryData;
use super::file_io::write_json_atomic;

/// Options for a fresh data directory
#[derive(Debug, Clone)]
pub struct InitOptions {
    pub profile_name: String,
    pub main_currency: CurrencyCode,
    pub seed_categories: bool,
}

impl Default for InitOptions {
    fn default() -> Self {
        Self {
            profile_name: "Me".into(),
            main_currency: CurrencyCode::USD,
            seed_categories: true,
        }
    }
}

/// What `initialize_storage` actually created
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InitOutcome {
    pub created_profile: bool,
    pub seeded_categories: usize,
}

pub fn initialize_storage(
    paths: &CashiroPaths,
    options: &InitOptions,
) -> Result<InitOutcome, CashiroError> {
    paths.ensure_directories()?;
    let mut outcome = InitOutcome::default();

    if !paths.profile_file().exists() {
        let profile = Profile::new(options.profile_name.clone(), options.main_currency);
        write_json_atomic(paths.profile_file(), &profile)?;
        outcome.created_profile = true;
    }

    if options.seed_categories && !paths.categories_file().exists() {
        let categories: Vec<_> = DEFAULT_CATEGORIES
            .iter()
            .enumerate()
            .map(|(i, default)| default.to_category(i as i32))
            .collect();
        outcome.seeded_categories = categories.len();
        write_json_atomic(paths.categories_file(), &CategoryData { categories })?;
    }

    info!(
        base = %paths.base_dir().display(),
        created_profile = outcome.created_profile,
        seeded_categories = outcome.seeded_categories,
        "initialized data directory"
    );
    Ok(outcome)
}

pub fn needs_initialization(paths: &CashiroPaths) -> bool {
    !paths.profile_file().exists()
}
