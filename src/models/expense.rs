//! Expense model
//!
//! A single outgoing payment, optionally filed under a category.

use chrono::{Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::record::{Field, FieldType, FieldValue, Record, RecordValues};
use crate::error::BookkeeperResult;

/// An expense transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    /// Amount spent
    pub amount: f64,

    /// Category this expense is filed under
    pub category_id: Option<i64>,

    /// Free-form note
    pub comment: String,

    /// Day the money was spent
    pub expense_date: NaiveDate,

    /// When the expense was recorded
    pub added_date: NaiveDateTime,

    /// Record id, 0 while unsaved
    pub pk: i64,
}

impl Expense {
    /// Create a new unsaved expense dated today
    pub fn new(amount: f64, category_id: Option<i64>) -> Self {
        let now = now_to_the_second();
        Self {
            amount,
            category_id,
            comment: String::new(),
            expense_date: now.date(),
            added_date: now,
            pk: 0,
        }
    }

    /// Set the comment
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = comment.into();
        self
    }

    /// Set the expense date
    pub fn on(mut self, date: NaiveDate) -> Self {
        self.expense_date = date;
        self
    }

    /// Validate the expense
    pub fn validate(&self) -> Result<(), ExpenseValidationError> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(ExpenseValidationError::NonPositiveAmount(self.amount));
        }
        Ok(())
    }
}

impl Default for Expense {
    fn default() -> Self {
        Self::new(0.0, None)
    }
}

/// Local time with sub-second precision dropped
fn now_to_the_second() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}

impl Record for Expense {
    const TYPE_NAME: &'static str = "Expense";
    const FIELDS: &'static [Field] = &[
        Field::new("amount", FieldType::Real),
        Field::new("category_id", FieldType::Reference),
        Field::new("comment", FieldType::Text),
        Field::new("expense_date", FieldType::Date),
        Field::new("added_date", FieldType::DateTime),
    ];

    fn pk(&self) -> i64 {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = pk;
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            self.amount.into(),
            self.category_id.into(),
            self.comment.as_str().into(),
            self.expense_date.into(),
            self.added_date.into(),
        ]
    }

    fn from_values(pk: i64, mut values: RecordValues) -> BookkeeperResult<Self> {
        Ok(Self {
            amount: values.real()?,
            category_id: values.reference()?,
            comment: values.text()?,
            expense_date: values.date()?,
            added_date: values.datetime()?,
            pk,
        })
    }
}

impl fmt::Display for Expense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {:.2}", self.expense_date, self.amount)?;
        if !self.comment.is_empty() {
            write!(f, " ({})", self.comment)?;
        }
        Ok(())
    }
}

/// Validation errors for expenses
#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseValidationError {
    NonPositiveAmount(f64),
}

impl fmt::Display for ExpenseValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveAmount(amount) => {
                write!(f, "Expense amount must be positive, got {}", amount)
            }
        }
    }
}

impl std::error::Error for ExpenseValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_expense_is_unsaved() {
        let expense = Expense::new(12.5, Some(3));
        assert_eq!(expense.pk, 0);
        assert_eq!(expense.added_date.nanosecond(), 0);
        assert_eq!(expense.expense_date, expense.added_date.date());
    }

    #[test]
    fn test_values_and_back() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
        let expense = Expense::new(8.0, None).with_comment("bus").on(date);
        let values = RecordValues::new(Expense::FIELDS, expense.values());
        let mut rebuilt = Expense::from_values(0, values).unwrap();
        assert_eq!(rebuilt, expense);

        rebuilt.set_pk(5);
        assert_eq!(rebuilt.pk(), 5);
    }

    #[test]
    fn test_validation() {
        assert!(Expense::new(1.0, None).validate().is_ok());
        assert_eq!(
            Expense::new(0.0, None).validate(),
            Err(ExpenseValidationError::NonPositiveAmount(0.0))
        );
    }

    #[test]
    fn test_display() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 4).unwrap();
        let expense = Expense::new(8.0, None).with_comment("bus").on(date);
        assert_eq!(expense.to_string(), "2024-05-04 8.00 (bus)");
    }
}
