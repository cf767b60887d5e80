//! Core data models for Bookkeeper
//!
//! Record descriptors shared by every repository, plus the three record
//! types: categories, expenses and budgets.

pub mod budget;
pub mod category;
pub mod expense;
pub mod period;
pub mod record;

pub use budget::{Budget, BudgetValidationError};
pub use category::{parse_tree, Ancestors, Category, CategoryValidationError, Descendants, TreeWalk};
pub use expense::{Expense, ExpenseValidationError};
pub use period::{Period, PeriodParseError};
pub use record::{Field, FieldType, FieldValue, Filter, Record, RecordValues};
