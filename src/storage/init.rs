//! Storage initialization
//!
//! Handles first-run setup: schema migration and the default category tree.

use crate::error::BookkeeperResult;
use crate::models::category::parse_tree;
use crate::models::Category;

use super::migration::MigrationResult;
use super::repository::RecordSource;
use super::Storage;

/// Default category outline seeded on a fresh database
pub const DEFAULT_CATEGORIES: &str = "
Groceries
    Meat
        Fresh meat
        Sausages
    Bakery
    Sweets
Housing
    Rent
    Utilities
Transport
Books
Clothes
";

/// Outcome of `initialize_storage`
#[derive(Debug, Clone)]
pub struct InitReport {
    pub migrations: MigrationResult,
    /// Categories created by seeding; empty when nothing was seeded
    pub seeded: Vec<Category>,
}

/// Bring the schema up to date and optionally seed default categories
///
/// Seeding only happens when the category table is empty, so running this
/// twice is harmless.
pub fn initialize_storage(storage: &Storage, seed_categories: bool) -> BookkeeperResult<InitReport> {
    let migrations = storage.migrator().up()?;

    let seeded = if seed_categories && storage.categories.get_all(None)?.is_empty() {
        let pairs = parse_tree(DEFAULT_CATEGORIES)?;
        let created = Category::create_from_tree(pairs.as_slice(), &storage.categories)?;
        tracing::info!(count = created.len(), "Seeded default categories");
        created
    } else {
        Vec::new()
    };

    Ok(InitReport { migrations, seeded })
}
