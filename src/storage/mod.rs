//! Storage layer for Bookkeeper
//!
//! A generic record repository over SQLite, its in-memory counterpart,
//! schema migrations, and the `Storage` coordinator that wires one
//! repository per record type to the configured database file.

pub mod init;
pub mod migration;
pub mod repository;
pub mod sqlite;

pub use init::initialize_storage;
pub use migration::{Migration, MigrationResult, Migrator};
pub use repository::{MemoryRepository, RecordSource, Repository};
pub use sqlite::SqliteRepository;

use serde::Serialize;

use crate::audit::{AuditEntry, AuditLogger, EntityType};
use crate::config::paths::BookkeeperPaths;
use crate::error::BookkeeperResult;
use crate::models::{Budget, Category, Expense};

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: BookkeeperPaths,
    pub categories: SqliteRepository<Category>,
    pub expenses: SqliteRepository<Expense>,
    pub budgets: SqliteRepository<Budget>,
    audit: AuditLogger,
}

impl Storage {
    /// Create a new Storage instance
    ///
    /// Creates the directories but not the schema; run `migrator().up()` or
    /// `initialize_storage` for that.
    pub fn new(paths: BookkeeperPaths) -> BookkeeperResult<Self> {
        paths.ensure_directories()?;
        let db_file = paths.database_file();

        Ok(Self {
            categories: SqliteRepository::new(&db_file),
            expenses: SqliteRepository::new(&db_file),
            budgets: SqliteRepository::new(&db_file),
            audit: AuditLogger::new(paths.audit_log()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &BookkeeperPaths {
        &self.paths
    }

    /// Migrator for this storage's database with the embedded scripts
    pub fn migrator(&self) -> Migrator {
        Migrator::embedded(self.paths.database_file())
    }

    /// Check if the schema is at the latest version
    pub fn is_initialized(&self) -> BookkeeperResult<bool> {
        if !self.paths.is_initialized() {
            return Ok(false);
        }
        let migrator = self.migrator();
        Ok(migrator.current_version()? >= migrator.latest_version())
    }

    pub fn audit(&self) -> &AuditLogger {
        &self.audit
    }

    /// Record a create in the audit log
    pub fn log_create<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        entity_name: Option<String>,
        entity: &T,
    ) -> BookkeeperResult<()> {
        self.audit
            .log(&AuditEntry::create(entity_type, entity_id, entity_name, entity))
    }

    /// Record an update in the audit log
    pub fn log_update<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> BookkeeperResult<()> {
        self.audit.log(&AuditEntry::update(
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
        ))
    }

    /// Record a delete in the audit log
    pub fn log_delete<T: Serialize>(
        &self,
        entity_type: EntityType,
        entity_id: i64,
        entity_name: Option<String>,
        entity: &T,
    ) -> BookkeeperResult<()> {
        self.audit
            .log(&AuditEntry::delete(entity_type, entity_id, entity_name, entity))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// Storage over a fresh, fully migrated database in a temp dir
    pub fn migrated_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = BookkeeperPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths).unwrap();
        storage.migrator().up().unwrap();
        (temp_dir, storage)
    }
}
