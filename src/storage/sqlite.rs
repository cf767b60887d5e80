//! SQLite-backed generic repository
//!
//! One repository maps one record type onto one table. Table and column
//! names come from the record's descriptor; all statements are generated once
//! at construction and reused for every call. Each call opens its own
//! connection and closes it before returning.

use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, OptionalExtension, Row};

use super::repository::{ensure_identified, ensure_unsaved, not_found, RecordSource, Repository};
use crate::error::BookkeeperResult;
use crate::models::record::{FieldValue, Filter, Record, RecordValues, PK_COLUMN};

/// SQL statements derived from a record descriptor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Queries {
    pub add: String,
    pub get: String,
    pub get_all: String,
    pub update: String,
    pub delete: String,
}

impl Queries {
    fn for_record<T: Record>(table: &str) -> Self {
        let names: Vec<&str> = T::FIELDS.iter().map(|f| f.name).collect();
        let columns = std::iter::once(PK_COLUMN)
            .chain(names.iter().copied())
            .collect::<Vec<_>>()
            .join(", ");
        let placeholders = vec!["?"; names.len()].join(", ");
        let assignments = names
            .iter()
            .map(|n| format!("{} = ?", n))
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            add: format!(
                "INSERT INTO {} ({}) VALUES ({})",
                table,
                names.join(", "),
                placeholders
            ),
            get: format!("SELECT {} FROM {} WHERE {} = ?", columns, table, PK_COLUMN),
            get_all: format!("SELECT {} FROM {}", columns, table),
            update: format!(
                "UPDATE {} SET {} WHERE {} = ?",
                table, assignments, PK_COLUMN
            ),
            delete: format!("DELETE FROM {} WHERE {} = ?", table, PK_COLUMN),
        }
    }
}

/// Generic CRUD repository over a SQLite file
///
/// The schema must already exist; see `storage::migration`.
#[derive(Debug, Clone)]
pub struct SqliteRepository<T: Record> {
    db_file: PathBuf,
    table: String,
    queries: Queries,
    _record: PhantomData<fn() -> T>,
}

impl<T: Record> SqliteRepository<T> {
    /// Create a repository for `T` backed by `db_file`
    ///
    /// Does not touch the file.
    pub fn new(db_file: impl Into<PathBuf>) -> Self {
        let table = T::table_name();
        let queries = Queries::for_record::<T>(&table);
        Self {
            db_file: db_file.into(),
            table,
            queries,
            _record: PhantomData,
        }
    }

    pub fn db_file(&self) -> &Path {
        &self.db_file
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    fn connect(&self, enforce_foreign_keys: bool) -> BookkeeperResult<Connection> {
        let conn = Connection::open(&self.db_file)?;
        if enforce_foreign_keys {
            conn.pragma_update(None, "foreign_keys", true)?;
        }
        Ok(conn)
    }

    /// Pull the primary key and the raw declared columns out of a row
    fn read_row(row: &Row<'_>) -> rusqlite::Result<(i64, Vec<Value>)> {
        let pk = row.get(0)?;
        let raw = (1..=T::FIELDS.len())
            .map(|i| row.get::<_, Value>(i))
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok((pk, raw))
    }

    /// Coerce raw columns by declared type and rebuild the record
    fn decode((pk, raw): (i64, Vec<Value>)) -> BookkeeperResult<T> {
        let values = T::FIELDS
            .iter()
            .zip(raw)
            .map(|(field, value)| FieldValue::decode(field, value))
            .collect::<BookkeeperResult<Vec<_>>>()?;
        T::from_values(pk, RecordValues::new(T::FIELDS, values))
    }
}

impl<T: Record> RecordSource<T> for SqliteRepository<T> {
    fn get(&self, pk: i64) -> BookkeeperResult<Option<T>> {
        let conn = self.connect(false)?;
        tracing::debug!(table = %self.table, pk, "get");

        let row = conn
            .query_row(&self.queries.get, [pk], Self::read_row)
            .optional()?;
        row.map(Self::decode).transpose()
    }

    fn get_all(&self, filter: Option<&Filter>) -> BookkeeperResult<Vec<T>> {
        let filter = filter.filter(|f| !f.is_empty());
        let mut sql = self.queries.get_all.clone();
        let mut params: Vec<&FieldValue> = Vec::new();

        if let Some(filter) = filter {
            filter.validate::<T>()?;
            let conditions = filter
                .terms()
                .iter()
                .map(|(name, _)| format!("{} IS ?", name))
                .collect::<Vec<_>>()
                .join(" AND ");
            sql.push_str(" WHERE ");
            sql.push_str(&conditions);
            params.extend(filter.terms().iter().map(|(_, value)| value));
        }
        sql.push_str(" ORDER BY ");
        sql.push_str(PK_COLUMN);

        let conn = self.connect(false)?;
        tracing::debug!(table = %self.table, sql = %sql, "get_all");

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(params), Self::read_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        rows.into_iter().map(Self::decode).collect()
    }
}

impl<T: Record> Repository<T> for SqliteRepository<T> {
    fn add(&self, record: &mut T) -> BookkeeperResult<i64> {
        ensure_unsaved(record)?;
        let values = record.values();

        let conn = self.connect(true)?;
        tracing::debug!(table = %self.table, sql = %self.queries.add, "add");
        conn.execute(&self.queries.add, params_from_iter(values.iter()))?;

        let pk = conn.last_insert_rowid();
        record.set_pk(pk);
        Ok(pk)
    }

    fn update(&self, record: &T) -> BookkeeperResult<()> {
        ensure_identified::<T>(record.pk(), "update")?;
        let mut values = record.values();
        values.push(FieldValue::Integer(record.pk()));

        let conn = self.connect(true)?;
        tracing::debug!(table = %self.table, pk = record.pk(), "update");
        let affected = conn.execute(&self.queries.update, params_from_iter(values.iter()))?;
        if affected == 0 {
            return Err(not_found::<T>(record.pk()));
        }
        Ok(())
    }

    fn delete(&self, pk: i64) -> BookkeeperResult<()> {
        ensure_identified::<T>(pk, "delete")?;

        let conn = self.connect(true)?;
        tracing::debug!(table = %self.table, pk, "delete");
        let affected = conn.execute(&self.queries.delete, [pk])?;
        if affected == 0 {
            return Err(not_found::<T>(pk));
        }
        Ok(())
    }
}
