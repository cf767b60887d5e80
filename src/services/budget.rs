//! Budget service
//!
//! One spending limit per period, and an overview comparing each limit with
//! what was actually spent in the period around a given day.

use chrono::NaiveDate;

use crate::audit::EntityType;
use crate::error::{BookkeeperError, BookkeeperResult};
use crate::models::{Budget, Filter, Period};
use crate::storage::{RecordSource, Repository, Storage};

use super::expense::ExpenseService;

/// Service for budget management
pub struct BudgetService<'a> {
    storage: &'a Storage,
}

/// A budget next to the spending it covers
#[derive(Debug, Clone, PartialEq)]
pub struct BudgetSummary {
    pub budget: Budget,
    /// First and last day of the period the figures cover
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub spent: f64,
    pub remaining: f64,
}

impl BudgetSummary {
    /// Check if spending exceeded the budget
    pub fn is_over(&self) -> bool {
        self.spent > self.budget.amount
    }
}

impl<'a> BudgetService<'a> {
    /// Create a new budget service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Set the limit for a period, replacing any existing one
    pub fn set(&self, period: Period, amount: f64) -> BookkeeperResult<Budget> {
        let mut budget = Budget::new(amount, period);
        budget
            .validate()
            .map_err(|e| BookkeeperError::Validation(e.to_string()))?;

        match self.get(period)? {
            Some(before) => {
                budget.pk = before.pk;
                if budget != before {
                    self.storage.budgets.update(&budget)?;
                    self.storage.log_update(
                        EntityType::Budget,
                        budget.pk,
                        Some(period.label().to_string()),
                        &before,
                        &budget,
                    )?;
                }
            }
            None => {
                self.storage.budgets.add(&mut budget)?;
                self.storage.log_create(
                    EntityType::Budget,
                    budget.pk,
                    Some(period.label().to_string()),
                    &budget,
                )?;
            }
        }

        Ok(budget)
    }

    /// Get the budget for a period
    pub fn get(&self, period: Period) -> BookkeeperResult<Option<Budget>> {
        let filter = Filter::new().eq("period", period.label());
        Ok(self.storage.budgets.get_all(Some(&filter))?.into_iter().next())
    }

    /// List budgets from the shortest period to the longest
    pub fn list(&self) -> BookkeeperResult<Vec<Budget>> {
        let mut budgets = self.storage.budgets.get_all(None)?;
        budgets.sort_by_key(|b| Period::all().iter().position(|p| *p == b.period));
        Ok(budgets)
    }

    /// Delete the budget for a period
    pub fn delete(&self, period: Period) -> BookkeeperResult<Budget> {
        let budget = self
            .get(period)?
            .ok_or_else(|| BookkeeperError::budget_not_found(period.label()))?;

        self.storage.budgets.delete(budget.pk)?;
        self.storage.log_delete(
            EntityType::Budget,
            budget.pk,
            Some(period.label().to_string()),
            &budget,
        )?;

        Ok(budget)
    }

    /// Compare every budget with spending in its period around `today`
    pub fn overview(&self, today: NaiveDate) -> BookkeeperResult<Vec<BudgetSummary>> {
        let budgets = self.list()?;
        if budgets.is_empty() {
            return Ok(Vec::new());
        }

        let start = budgets
            .iter()
            .map(|b| b.period.start_date(today))
            .min()
            .unwrap_or(today);
        let end = budgets
            .iter()
            .map(|b| b.period.end_date(today))
            .max()
            .unwrap_or(today);
        let expenses = ExpenseService::new(self.storage).list_between(start, end)?;

        Ok(budgets
            .into_iter()
            .map(|budget| {
                let spent: f64 = expenses
                    .iter()
                    .filter(|e| budget.period.contains(today, e.expense_date))
                    .map(|e| e.amount)
                    .sum();
                BudgetSummary {
                    start: budget.period.start_date(today),
                    end: budget.period.end_date(today),
                    remaining: budget.amount - spent,
                    spent,
                    budget,
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_support::migrated_storage;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_set_is_upsert() {
        let (_temp_dir, storage) = migrated_storage();
        let service = BudgetService::new(&storage);

        let first = service.set(Period::Month, 500.0).unwrap();
        let second = service.set(Period::Month, 650.0).unwrap();

        assert_eq!(first.pk, second.pk);
        let budgets = service.list().unwrap();
        assert_eq!(budgets.len(), 1);
        assert_eq!(budgets[0].amount, 650.0);
    }

    #[test]
    fn test_set_rejects_negative_amount() {
        let (_temp_dir, storage) = migrated_storage();
        let service = BudgetService::new(&storage);
        assert!(service.set(Period::Day, -1.0).unwrap_err().is_validation());
    }

    #[test]
    fn test_list_orders_by_period_length() {
        let (_temp_dir, storage) = migrated_storage();
        let service = BudgetService::new(&storage);
        service.set(Period::Year, 9000.0).unwrap();
        service.set(Period::Day, 20.0).unwrap();
        service.set(Period::Month, 700.0).unwrap();

        let periods: Vec<Period> = service.list().unwrap().iter().map(|b| b.period).collect();
        assert_eq!(periods, vec![Period::Day, Period::Month, Period::Year]);
    }

    #[test]
    fn test_delete() {
        let (_temp_dir, storage) = migrated_storage();
        let service = BudgetService::new(&storage);
        service.set(Period::Week, 100.0).unwrap();

        service.delete(Period::Week).unwrap();
        assert!(service.get(Period::Week).unwrap().is_none());
        assert!(service.delete(Period::Week).unwrap_err().is_not_found());
    }

    #[test]
    fn test_overview() {
        let (_temp_dir, storage) = migrated_storage();
        let budgets = BudgetService::new(&storage);
        let expenses = ExpenseService::new(&storage);

        budgets.set(Period::Day, 10.0).unwrap();
        budgets.set(Period::Month, 100.0).unwrap();

        // Wednesday 2024-05-15
        expenses.add(8.0, None, Some(date(2024, 5, 15)), "").unwrap();
        expenses.add(4.0, None, Some(date(2024, 5, 15)), "").unwrap();
        expenses.add(30.0, None, Some(date(2024, 5, 1)), "").unwrap();
        expenses.add(99.0, None, Some(date(2024, 4, 30)), "").unwrap();

        let overview = budgets.overview(date(2024, 5, 15)).unwrap();
        assert_eq!(overview.len(), 2);

        let day = &overview[0];
        assert_eq!(day.spent, 12.0);
        assert_eq!(day.remaining, -2.0);
        assert!(day.is_over());

        let month = &overview[1];
        assert_eq!(month.start, date(2024, 5, 1));
        assert_eq!(month.end, date(2024, 5, 31));
        assert_eq!(month.spent, 42.0);
        assert_eq!(month.remaining, 58.0);
        assert!(!month.is_over());
    }
}
