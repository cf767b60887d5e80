//! Expense service
//!
//! Records, lists, edits and deletes expenses. Categories are looked up by
//! name or id through `CategoryService`.

use chrono::NaiveDate;

use crate::audit::EntityType;
use crate::error::{BookkeeperError, BookkeeperResult};
use crate::models::{Expense, Filter};
use crate::storage::{RecordSource, Repository, Storage};

use super::category::CategoryService;

/// Service for expense management
pub struct ExpenseService<'a> {
    storage: &'a Storage,
}

impl<'a> ExpenseService<'a> {
    /// Create a new expense service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Record a new expense
    ///
    /// `date` defaults to today.
    pub fn add(
        &self,
        amount: f64,
        category: Option<&str>,
        date: Option<NaiveDate>,
        comment: &str,
    ) -> BookkeeperResult<Expense> {
        let category_id = match category {
            Some(category) => Some(CategoryService::new(self.storage).require(category)?.pk),
            None => None,
        };

        let mut expense = Expense::new(amount, category_id).with_comment(comment.trim());
        if let Some(date) = date {
            expense = expense.on(date);
        }
        expense
            .validate()
            .map_err(|e| BookkeeperError::Validation(e.to_string()))?;

        self.storage.expenses.add(&mut expense)?;

        self.storage.log_create(
            EntityType::Expense,
            expense.pk,
            audit_name(&expense),
            &expense,
        )?;

        Ok(expense)
    }

    /// Get an expense by primary key
    pub fn get(&self, pk: i64) -> BookkeeperResult<Option<Expense>> {
        self.storage.expenses.get(pk)
    }

    /// List expenses by date, optionally only those filed under `category`
    pub fn list(&self, category: Option<&str>) -> BookkeeperResult<Vec<Expense>> {
        let filter = match category {
            Some(category) => {
                let category = CategoryService::new(self.storage).require(category)?;
                Some(Filter::new().eq("category_id", category.pk))
            }
            None => None,
        };

        let mut expenses = self.storage.expenses.get_all(filter.as_ref())?;
        expenses.sort_by(|a, b| a.expense_date.cmp(&b.expense_date).then(a.pk.cmp(&b.pk)));
        Ok(expenses)
    }

    /// Expenses dated within `start..=end`
    pub fn list_between(&self, start: NaiveDate, end: NaiveDate) -> BookkeeperResult<Vec<Expense>> {
        Ok(self
            .list(None)?
            .into_iter()
            .filter(|e| e.expense_date >= start && e.expense_date <= end)
            .collect())
    }

    /// Change the amount and/or comment of an expense
    pub fn update(
        &self,
        pk: i64,
        amount: Option<f64>,
        comment: Option<&str>,
    ) -> BookkeeperResult<Expense> {
        let before = self.load(pk)?;

        let mut expense = before.clone();
        if let Some(amount) = amount {
            expense.amount = amount;
        }
        if let Some(comment) = comment {
            expense.comment = comment.trim().to_string();
        }
        expense
            .validate()
            .map_err(|e| BookkeeperError::Validation(e.to_string()))?;

        if expense == before {
            return Ok(expense);
        }

        self.storage.expenses.update(&expense)?;
        self.storage.log_update(
            EntityType::Expense,
            expense.pk,
            audit_name(&expense),
            &before,
            &expense,
        )?;

        Ok(expense)
    }

    /// Delete an expense
    pub fn delete(&self, pk: i64) -> BookkeeperResult<Expense> {
        let expense = self.load(pk)?;
        self.storage.expenses.delete(pk)?;

        self.storage.log_delete(
            EntityType::Expense,
            expense.pk,
            audit_name(&expense),
            &expense,
        )?;

        Ok(expense)
    }

    fn load(&self, pk: i64) -> BookkeeperResult<Expense> {
        self.get(pk)?
            .ok_or_else(|| BookkeeperError::expense_not_found(pk.to_string()))
    }
}

fn audit_name(expense: &Expense) -> Option<String> {
    (!expense.comment.is_empty()).then(|| expense.comment.clone())
}
