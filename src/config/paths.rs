//! Path management for Bookkeeper
//!
//! ## Path Resolution Order
//!
//! 1. `BOOKKEEPER_DATA_DIR` environment variable (if set)
//! 2. The platform config directory reported by `directories`
//!    (`~/.config/bookkeeper` on Linux)

use std::path::PathBuf;

use directories::ProjectDirs;

use crate::error::BookkeeperError;

/// Environment variable overriding the base directory
pub const DATA_DIR_ENV: &str = "BOOKKEEPER_DATA_DIR";

/// Manages all paths used by Bookkeeper
#[derive(Debug, Clone)]
pub struct BookkeeperPaths {
    /// Base directory for all Bookkeeper data
    base_dir: PathBuf,
}

impl BookkeeperPaths {
    /// Create a new BookkeeperPaths instance
    ///
    /// # Errors
    ///
    /// Returns an error if no platform config directory can be determined.
    pub fn new() -> Result<Self, BookkeeperError> {
        let base_dir = match std::env::var(DATA_DIR_ENV) {
            Ok(custom) => PathBuf::from(custom),
            Err(_) => resolve_default_path()?,
        };

        Ok(Self { base_dir })
    }

    /// Create BookkeeperPaths with a custom base directory (useful for testing)
    pub fn with_base_dir(base_dir: PathBuf) -> Self {
        Self { base_dir }
    }

    /// Get the base directory
    pub fn base_dir(&self) -> &PathBuf {
        &self.base_dir
    }

    /// Get the data directory (`<base>/data/`)
    pub fn data_dir(&self) -> PathBuf {
        self.base_dir.join("data")
    }

    /// Get the path to the settings file
    pub fn settings_file(&self) -> PathBuf {
        self.base_dir.join("config.json")
    }

    /// Get the path to the audit log
    pub fn audit_log(&self) -> PathBuf {
        self.base_dir.join("audit.log")
    }

    /// Get the path to the SQLite database
    pub fn database_file(&self) -> PathBuf {
        self.data_dir().join("bookkeeper.db")
    }

    /// Ensure the base and data directories exist
    pub fn ensure_directories(&self) -> Result<(), BookkeeperError> {
        std::fs::create_dir_all(&self.base_dir)
            .map_err(|e| BookkeeperError::Io(format!("Failed to create base directory: {}", e)))?;

        std::fs::create_dir_all(self.data_dir())
            .map_err(|e| BookkeeperError::Io(format!("Failed to create data directory: {}", e)))?;

        Ok(())
    }

    /// Check if the database has been created
    pub fn is_initialized(&self) -> bool {
        self.database_file().exists()
    }
}

fn resolve_default_path() -> Result<PathBuf, BookkeeperError> {
    ProjectDirs::from("", "", "bookkeeper")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| BookkeeperError::Config("Could not determine a config directory".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_custom_base_dir() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BookkeeperPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.base_dir(), temp_dir.path());
        assert_eq!(paths.data_dir(), temp_dir.path().join("data"));
        assert_eq!(
            paths.database_file(),
            temp_dir.path().join("data").join("bookkeeper.db")
        );
    }

    #[test]
    fn test_ensure_directories() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BookkeeperPaths::with_base_dir(temp_dir.path().join("nested"));

        paths.ensure_directories().unwrap();

        assert!(paths.data_dir().exists());
        assert!(!paths.is_initialized());
    }

    #[test]
    fn test_file_paths() {
        let temp_dir = TempDir::new().unwrap();
        let paths = BookkeeperPaths::with_base_dir(temp_dir.path().to_path_buf());

        assert_eq!(paths.settings_file(), temp_dir.path().join("config.json"));
        assert_eq!(paths.audit_log(), temp_dir.path().join("audit.log"));
    }
}
