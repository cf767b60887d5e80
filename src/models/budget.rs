//! Budget model
//!
//! A budget caps spending over one calendar period.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::period::Period;
use super::record::{Field, FieldType, FieldValue, Record, RecordValues};
use crate::error::{BookkeeperError, BookkeeperResult};

/// Amount allowed to be spent per period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Budget {
    pub amount: f64,
    pub period: Period,
    /// Record id, 0 while unsaved
    pub pk: i64,
}

impl Budget {
    /// Create a new unsaved budget
    pub fn new(amount: f64, period: Period) -> Self {
        Self {
            amount,
            period,
            pk: 0,
        }
    }

    /// Validate the budget
    pub fn validate(&self) -> Result<(), BudgetValidationError> {
        if !self.amount.is_finite() || self.amount < 0.0 {
            return Err(BudgetValidationError::InvalidAmount(self.amount));
        }
        Ok(())
    }
}

impl Default for Budget {
    fn default() -> Self {
        Self::new(0.0, Period::Day)
    }
}

impl Record for Budget {
    const TYPE_NAME: &'static str = "Budget";
    const FIELDS: &'static [Field] = &[
        Field::new("amount", FieldType::Real),
        Field::new("period", FieldType::Text),
    ];

    fn pk(&self) -> i64 {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = pk;
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![self.amount.into(), self.period.label().into()]
    }

    fn from_values(pk: i64, mut values: RecordValues) -> BookkeeperResult<Self> {
        let amount = values.real()?;
        let period = values
            .text()?
            .parse::<Period>()
            .map_err(|e| BookkeeperError::decode("period", e.to_string()))?;
        Ok(Self { amount, period, pk })
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} per {}", self.amount, self.period)
    }
}

/// Validation errors for budgets
#[derive(Debug, Clone, PartialEq)]
pub enum BudgetValidationError {
    InvalidAmount(f64),
}

impl fmt::Display for BudgetValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidAmount(amount) => {
                write!(f, "Budget amount must be a non-negative number, got {}", amount)
            }
        }
    }
}

impl std::error::Error for BudgetValidationError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_follow_field_order() {
        let budget = Budget::new(1500.0, Period::Month);
        assert_eq!(
            budget.values(),
            vec![FieldValue::Real(1500.0), FieldValue::Text("MONTH".into())]
        );
        assert_eq!(Budget::table_name(), "budget");
    }

    #[test]
    fn test_from_values() {
        let values = RecordValues::new(
            Budget::FIELDS,
            vec![FieldValue::Real(70.0), FieldValue::Text("WEEK".into())],
        );
        let budget = Budget::from_values(9, values).unwrap();
        assert_eq!(budget, Budget { amount: 70.0, period: Period::Week, pk: 9 });
    }

    #[test]
    fn test_from_values_rejects_unknown_period() {
        let values = RecordValues::new(
            Budget::FIELDS,
            vec![FieldValue::Real(70.0), FieldValue::Text("DECADE".into())],
        );
        let err = Budget::from_values(1, values).unwrap_err();
        assert!(matches!(err, BookkeeperError::Decode { .. }));
    }

    #[test]
    fn test_validation() {
        assert!(Budget::new(10.0, Period::Day).validate().is_ok());
        assert!(Budget::new(-1.0, Period::Day).validate().is_err());
        assert!(Budget::new(f64::NAN, Period::Day).validate().is_err());
    }
}
