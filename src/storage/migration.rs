//! Schema migrations for the SQLite store
//!
//! Migrations are numbered SQL scripts. Each script holds an "up" section,
//! a `-- down` marker line and a "down" section. The applied version is
//! tracked in `PRAGMA user_version`:
//! - `up` applies every script newer than the current version, ascending
//! - `down` reverts applied scripts, descending, until the target version
//!
//! Each script runs inside its own transaction together with the version bump.

use std::path::{Path, PathBuf};

use rusqlite::Connection;

use crate::error::{BookkeeperError, BookkeeperResult};

/// Separates the up and down sections of a script
pub const DOWN_MARKER: &str = "-- down";

/// Scripts compiled into the binary, in version order
const EMBEDDED: &[(u32, &str, &str)] = &[
    (
        1,
        "0001_create_category",
        include_str!("../../migrations/0001_create_category.sql"),
    ),
    (
        2,
        "0002_create_expense",
        include_str!("../../migrations/0002_create_expense.sql"),
    ),
    (
        3,
        "0003_create_budget",
        include_str!("../../migrations/0003_create_budget.sql"),
    ),
];

/// Result of running migrations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MigrationResult {
    /// Schema version before migrations ran.
    pub previous_version: u32,
    /// Schema version after migrations ran.
    pub current_version: u32,
    /// Names of the scripts that were applied or reverted.
    pub applied: Vec<String>,
}

/// One numbered migration script
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub version: u32,
    pub name: String,
    pub up: String,
    pub down: Option<String>,
}

impl Migration {
    /// Split a script into its up and down sections
    pub fn from_script(version: u32, name: impl Into<String>, script: &str) -> Self {
        let (up, down) = match script.split_once(DOWN_MARKER) {
            Some((up, down)) => (up, Some(down.trim().to_string())),
            None => (script, None),
        };
        Self {
            version,
            name: name.into(),
            up: up.trim().to_string(),
            down,
        }
    }

    /// Parse a script file named `<version>_<description>.sql`
    pub fn from_file(path: &Path) -> BookkeeperResult<Self> {
        let name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| {
                BookkeeperError::Migration(format!("Invalid file name: {}", path.display()))
            })?;

        let version = name
            .split('_')
            .next()
            .and_then(|prefix| prefix.parse::<u32>().ok())
            .filter(|v| *v > 0)
            .ok_or_else(|| BookkeeperError::Migration(format!("Incorrect migration name: {}", name)))?;

        let script = std::fs::read_to_string(path).map_err(|e| {
            BookkeeperError::Io(format!("Failed to read {}: {}", path.display(), e))
        })?;

        Ok(Self::from_script(version, name, &script))
    }
}

/// Applies and reverts migrations against one database file
#[derive(Debug, Clone)]
pub struct Migrator {
    db_file: PathBuf,
    migrations: Vec<Migration>,
}

impl Migrator {
    /// Create a migrator over an explicit set of scripts
    pub fn new(db_file: impl Into<PathBuf>, mut migrations: Vec<Migration>) -> BookkeeperResult<Self> {
        migrations.sort_by_key(|m| m.version);
        if let Some(pair) = migrations.windows(2).find(|w| w[0].version == w[1].version) {
            return Err(BookkeeperError::Migration(format!(
                "Duplicate migration version {}: {} and {}",
                pair[0].version, pair[0].name, pair[1].name
            )));
        }
        Ok(Self {
            db_file: db_file.into(),
            migrations,
        })
    }

    /// Create a migrator over the scripts compiled into the binary
    pub fn embedded(db_file: impl Into<PathBuf>) -> Self {
        Self {
            db_file: db_file.into(),
            migrations: EMBEDDED
                .iter()
                .map(|(version, name, script)| Migration::from_script(*version, *name, script))
                .collect(),
        }
    }

    /// Create a migrator over every `.sql` file in a directory
    pub fn from_dir(db_file: impl Into<PathBuf>, dir: &Path) -> BookkeeperResult<Self> {
        let entries = std::fs::read_dir(dir).map_err(|e| {
            BookkeeperError::Io(format!("Failed to read {}: {}", dir.display(), e))
        })?;

        let mut migrations = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().map_or(false, |ext| ext == "sql") {
                migrations.push(Migration::from_file(&path)?);
            }
        }
        Self::new(db_file, migrations)
    }

    pub fn migrations(&self) -> &[Migration] {
        &self.migrations
    }

    /// Highest version known to this migrator
    pub fn latest_version(&self) -> u32 {
        self.migrations.last().map_or(0, |m| m.version)
    }

    /// Version currently recorded in the database
    pub fn current_version(&self) -> BookkeeperResult<u32> {
        let conn = Connection::open(&self.db_file)?;
        read_version(&conn)
    }

    /// Apply every migration newer than the current version
    pub fn up(&self) -> BookkeeperResult<MigrationResult> {
        let mut conn = Connection::open(&self.db_file)?;
        let previous_version = read_version(&conn)?;
        let mut applied = Vec::new();

        for migration in self.migrations.iter().filter(|m| m.version > previous_version) {
            tracing::info!(migration = %migration.name, "Applying migration");
            let tx = conn.transaction()?;
            tx.execute_batch(&migration.up)?;
            tx.pragma_update(None, "user_version", migration.version)?;
            tx.commit()?;
            applied.push(migration.name.clone());
        }

        Ok(MigrationResult {
            previous_version,
            current_version: read_version(&conn)?,
            applied,
        })
    }

    /// Revert applied migrations until the database is at `target` version
    pub fn down(&self, target: u32) -> BookkeeperResult<MigrationResult> {
        let mut conn = Connection::open(&self.db_file)?;
        let previous_version = read_version(&conn)?;
        let mut applied = Vec::new();

        let to_revert: Vec<&Migration> = self
            .migrations
            .iter()
            .rev()
            .filter(|m| m.version <= previous_version && m.version > target)
            .collect();

        for migration in to_revert {
            let down = migration.down.as_deref().ok_or_else(|| {
                BookkeeperError::Migration(format!(
                    "Migration {} has no '{}' section",
                    migration.name, DOWN_MARKER
                ))
            })?;
            let below = self
                .migrations
                .iter()
                .rev()
                .find(|m| m.version < migration.version)
                .map_or(0, |m| m.version)
                .max(target);

            tracing::info!(migration = %migration.name, "Reverting migration");
            let tx = conn.transaction()?;
            tx.execute_batch(down)?;
            tx.pragma_update(None, "user_version", below)?;
            tx.commit()?;
            applied.push(migration.name.clone());
        }

        Ok(MigrationResult {
            previous_version,
            current_version: read_version(&conn)?,
            applied,
        })
    }
}

fn read_version(conn: &Connection) -> BookkeeperResult<u32> {
    let version: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table_names(db_file: &Path) -> Vec<String> {
        let conn = Connection::open(db_file).unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT name FROM sqlite_master WHERE type = 'table' \
                 AND name NOT LIKE 'sqlite_%' ORDER BY name",
            )
            .unwrap();
        let names = stmt
            .query_map([], |row| row.get(0))
            .unwrap()
            .collect::<Result<Vec<String>, _>>()
            .unwrap();
        names
    }

    #[test]
    fn test_script_split() {
        let migration = Migration::from_script(
            4,
            "0004_demo",
            "CREATE TABLE demo (pk INTEGER);\n-- down\nDROP TABLE demo;\n",
        );
        assert_eq!(migration.up, "CREATE TABLE demo (pk INTEGER);");
        assert_eq!(migration.down.as_deref(), Some("DROP TABLE demo;"));

        let forward_only = Migration::from_script(5, "0005_forward", "SELECT 1;");
        assert!(forward_only.down.is_none());
    }

    #[test]
    fn test_embedded_up_and_down() {
        let temp_dir = TempDir::new().unwrap();
        let db_file = temp_dir.path().join("bookkeeper.db");
        let migrator = Migrator::embedded(&db_file);

        let result = migrator.up().unwrap();
        assert_eq!(result.previous_version, 0);
        assert_eq!(result.current_version, 3);
        assert_eq!(result.applied.len(), 3);
        assert_eq!(table_names(&db_file), vec!["budget", "category", "expense"]);

        // Already current: nothing to do
        let again = migrator.up().unwrap();
        assert!(again.applied.is_empty());

        let partial = migrator.down(1).unwrap();
        assert_eq!(
            partial.applied,
            vec!["0003_create_budget", "0002_create_expense"]
        );
        assert_eq!(partial.current_version, 1);
        assert_eq!(table_names(&db_file), vec!["category"]);

        let all = migrator.down(0).unwrap();
        assert_eq!(all.current_version, 0);
        assert!(table_names(&db_file).is_empty());
    }

    #[test]
    fn test_from_dir_orders_by_version() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("migrations");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join("0002_b.sql"),
            "CREATE TABLE b (pk INTEGER REFERENCES a (pk));\n-- down\nDROP TABLE b;",
        )
        .unwrap();
        std::fs::write(
            dir.join("0001_a.sql"),
            "CREATE TABLE a (pk INTEGER PRIMARY KEY);\n-- down\nDROP TABLE a;",
        )
        .unwrap();
        std::fs::write(dir.join("README.txt"), "not a migration").unwrap();

        let migrator = Migrator::from_dir(temp_dir.path().join("db.sqlite"), &dir).unwrap();
        let names: Vec<_> = migrator.migrations().iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["0001_a", "0002_b"]);
        assert_eq!(migrator.latest_version(), 2);

        migrator.up().unwrap();
        assert_eq!(migrator.current_version().unwrap(), 2);
    }

    #[test]
    fn test_bad_file_name() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("create_things.sql");
        std::fs::write(&path, "SELECT 1;").unwrap();
        let err = Migration::from_file(&path).unwrap_err();
        assert!(matches!(err, BookkeeperError::Migration(_)));
    }

    #[test]
    fn test_duplicate_versions_rejected() {
        let migrations = vec![
            Migration::from_script(1, "0001_a", "SELECT 1;"),
            Migration::from_script(1, "0001_b", "SELECT 1;"),
        ];
        assert!(Migrator::new("db.sqlite", migrations).is_err());
    }

    #[test]
    fn test_down_without_section_fails() {
        let temp_dir = TempDir::new().unwrap();
        let migrator = Migrator::new(
            temp_dir.path().join("db.sqlite"),
            vec![Migration::from_script(1, "0001_a", "CREATE TABLE a (pk INTEGER);")],
        )
        .unwrap();
        migrator.up().unwrap();
        let err = migrator.down(0).unwrap_err();
        assert!(matches!(err, BookkeeperError::Migration(_)));
        assert_eq!(migrator.current_version().unwrap(), 1);
    }

    #[test]
    fn test_failed_script_leaves_version_unchanged() {
        let temp_dir = TempDir::new().unwrap();
        let migrator = Migrator::new(
            temp_dir.path().join("db.sqlite"),
            vec![
                Migration::from_script(1, "0001_a", "CREATE TABLE a (pk INTEGER);"),
                Migration::from_script(2, "0002_broken", "CREATE TABLE a (pk INTEGER);"),
            ],
        )
        .unwrap();
        assert!(migrator.up().unwrap_err().is_store());
        assert_eq!(migrator.current_version().unwrap(), 1);
    }
}
