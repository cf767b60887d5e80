//! Repository contracts
//!
//! `RecordSource` is the read-only capability (fetch one, fetch all) that the
//! category hierarchy walks need. `Repository` adds the mutating half of CRUD.
//! Both are implemented by the SQLite repository and by `MemoryRepository`.

use std::collections::BTreeMap;
use std::sync::RwLock;

use crate::error::{BookkeeperError, BookkeeperResult};
use crate::models::record::{Filter, Record};

/// Read access to records of one type
pub trait RecordSource<T: Record> {
    /// Fetch one record by primary key; `Ok(None)` when no row matches
    fn get(&self, pk: i64) -> BookkeeperResult<Option<T>>;

    /// Fetch every record, or only those matching all filter terms, ordered by primary key
    fn get_all(&self, filter: Option<&Filter>) -> BookkeeperResult<Vec<T>>;
}

/// Full CRUD access to records of one type
pub trait Repository<T: Record>: RecordSource<T> {
    /// Persist an unsaved record, assign its new primary key and return it
    fn add(&self, record: &mut T) -> BookkeeperResult<i64>;

    /// Overwrite every declared field of an existing record
    fn update(&self, record: &T) -> BookkeeperResult<()>;

    /// Remove a record by primary key
    fn delete(&self, pk: i64) -> BookkeeperResult<()>;
}

/// Fail unless the record has never been saved
pub(crate) fn ensure_unsaved<T: Record>(record: &T) -> BookkeeperResult<()> {
    if record.pk() != 0 {
        return Err(BookkeeperError::InvalidState(format!(
            "cannot add {} that already has pk {}",
            T::TYPE_NAME,
            record.pk()
        )));
    }
    Ok(())
}

/// Fail if the primary key is the unsaved marker
pub(crate) fn ensure_identified<T: Record>(pk: i64, action: &str) -> BookkeeperResult<()> {
    if pk == 0 {
        return Err(BookkeeperError::InvalidState(format!(
            "cannot {} {} without a pk",
            action,
            T::TYPE_NAME
        )));
    }
    Ok(())
}

pub(crate) fn not_found<T: Record>(pk: i64) -> BookkeeperError {
    BookkeeperError::NotFound {
        entity_type: T::TYPE_NAME,
        identifier: pk.to_string(),
    }
}

#[derive(Debug)]
struct MemoryTable<T> {
    rows: BTreeMap<i64, T>,
    last_pk: i64,
}

/// In-process repository over an ordered map
///
/// Primary keys are handed out from a counter that never goes backwards, so
/// they stay strictly increasing across deletes. No referential checks.
#[derive(Debug)]
pub struct MemoryRepository<T: Record> {
    table: RwLock<MemoryTable<T>>,
}

impl<T: Record> MemoryRepository<T> {
    /// Create an empty repository
    pub fn new() -> Self {
        Self {
            table: RwLock::new(MemoryTable {
                rows: BTreeMap::new(),
                last_pk: 0,
            }),
        }
    }

    /// Number of stored records
    pub fn len(&self) -> BookkeeperResult<usize> {
        let table = self
            .table
            .read()
            .map_err(|e| BookkeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(table.rows.len())
    }

    pub fn is_empty(&self) -> BookkeeperResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl<T: Record> Default for MemoryRepository<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Record> RecordSource<T> for MemoryRepository<T> {
    fn get(&self, pk: i64) -> BookkeeperResult<Option<T>> {
        let table = self
            .table
            .read()
            .map_err(|e| BookkeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(table.rows.get(&pk).cloned())
    }

    fn get_all(&self, filter: Option<&Filter>) -> BookkeeperResult<Vec<T>> {
        if let Some(filter) = filter {
            filter.validate::<T>()?;
        }
        let table = self
            .table
            .read()
            .map_err(|e| BookkeeperError::Storage(format!("Failed to acquire read lock: {}", e)))?;
        Ok(table
            .rows
            .values()
            .filter(|r| filter.map_or(true, |f| f.matches(*r)))
            .cloned()
            .collect())
    }
}

impl<T: Record> Repository<T> for MemoryRepository<T> {
    fn add(&self, record: &mut T) -> BookkeeperResult<i64> {
        ensure_unsaved(record)?;
        let mut table = self
            .table
            .write()
            .map_err(|e| BookkeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        table.last_pk += 1;
        let pk = table.last_pk;
        record.set_pk(pk);
        table.rows.insert(pk, record.clone());
        Ok(pk)
    }

    fn update(&self, record: &T) -> BookkeeperResult<()> {
        ensure_identified::<T>(record.pk(), "update")?;
        let mut table = self
            .table
            .write()
            .map_err(|e| BookkeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        match table.rows.get_mut(&record.pk()) {
            Some(row) => {
                *row = record.clone();
                Ok(())
            }
            None => Err(not_found::<T>(record.pk())),
        }
    }

    fn delete(&self, pk: i64) -> BookkeeperResult<()> {
        ensure_identified::<T>(pk, "delete")?;
        let mut table = self
            .table
            .write()
            .map_err(|e| BookkeeperError::Storage(format!("Failed to acquire write lock: {}", e)))?;

        table
            .rows
            .remove(&pk)
            .map(|_| ())
            .ok_or_else(|| not_found::<T>(pk))
    }
}
