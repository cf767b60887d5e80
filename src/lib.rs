//! Bookkeeper - personal expense tracking on SQLite
//!
//! The core is a generic record repository: each record type declares its
//! fields once, and `SqliteRepository<T>` derives its SQL from that
//! declaration. On top of it sit the category hierarchy walks (parent,
//! ancestors, descendants, bulk creation from a tree), budgets, and a small
//! command-line front end.
//!
//! # Architecture
//!
//! - `config`: Path resolution and user settings
//! - `error`: Custom error types
//! - `models`: Record descriptors and the category, expense and budget records
//! - `storage`: Repositories, migrations and the `Storage` coordinator
//! - `services`: Business rules and audit logging
//! - `audit`: Append-only change log
//! - `display`, `cli`: Terminal output and command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use bookkeeper::models::Category;
//! use bookkeeper::storage::{Repository, SqliteRepository};
//!
//! let repo = SqliteRepository::<Category>::new("bookkeeper.db");
//! let mut food = Category::new("food", None);
//! repo.add(&mut food)?;
//! let meat = Category::new("meat", Some(food.pk));
//! ```

pub mod audit;
pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod models;
pub mod services;
pub mod storage;

pub use error::{BookkeeperError, BookkeeperResult};
