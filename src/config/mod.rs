//! Configuration module for Bookkeeper
//!
//! This module provides configuration management including:
//! - Path resolution for the database, settings and audit log
//! - User settings persistence

pub mod paths;
pub mod settings;

pub use paths::BookkeeperPaths;
pub use settings::Settings;
