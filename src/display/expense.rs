//! Expense display formatting

use std::collections::HashMap;

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::models::{Category, Expense};

/// Expense display row for table output
#[derive(Tabled)]
struct ExpenseRow {
    #[tabled(rename = "ID")]
    pk: i64,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Amount")]
    amount: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Comment")]
    comment: String,
}

/// Format expenses as a table followed by their total
pub fn format_expense_table(
    expenses: &[Expense],
    categories: &[Category],
    settings: &Settings,
) -> String {
    if expenses.is_empty() {
        return "No expenses found.\n".to_string();
    }

    let names: HashMap<i64, &str> = categories.iter().map(|c| (c.pk, c.name.as_str())).collect();

    let rows: Vec<ExpenseRow> = expenses
        .iter()
        .map(|e| ExpenseRow {
            pk: e.pk,
            date: e.expense_date.format(&settings.date_format).to_string(),
            amount: settings.format_amount(e.amount),
            category: e
                .category_id
                .and_then(|pk| names.get(&pk).copied())
                .unwrap_or("-")
                .to_string(),
            comment: e.comment.clone(),
        })
        .collect();

    let total: f64 = expenses.iter().map(|e| e.amount).sum();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\nTotal: {}\n", table, settings.format_amount(total))
}
