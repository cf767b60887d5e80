//! Service layer for Bookkeeper
//!
//! The service layer provides business logic on top of the storage layer,
//! handling validation, name lookups and audit logging.

pub mod budget;
pub mod category;
pub mod expense;

pub use budget::{BudgetService, BudgetSummary};
pub use category::CategoryService;
pub use expense::ExpenseService;
