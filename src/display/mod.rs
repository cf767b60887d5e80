//! Display formatting for terminal output
//!
//! Tree rendering for categories and `tabled` tables for expenses and
//! budgets.

pub mod budget;
pub mod category;
pub mod expense;

pub use budget::format_budget_overview;
pub use category::{format_category_path, format_category_tree};
pub use expense::format_expense_table;
