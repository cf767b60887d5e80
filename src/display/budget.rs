//! Budget display formatting

use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::config::Settings;
use crate::services::BudgetSummary;

/// Budget display row for table output
#[derive(Tabled)]
struct BudgetRow {
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "From")]
    start: String,
    #[tabled(rename = "To")]
    end: String,
    #[tabled(rename = "Budget")]
    amount: String,
    #[tabled(rename = "Spent")]
    spent: String,
    #[tabled(rename = "Remaining")]
    remaining: String,
    #[tabled(rename = "Status")]
    status: &'static str,
}

/// Format a budget overview as a table
pub fn format_budget_overview(summaries: &[BudgetSummary], settings: &Settings) -> String {
    if summaries.is_empty() {
        return "No budgets set.\n\nRun 'bookkeeper budget set <PERIOD> <AMOUNT>' to add one.\n"
            .to_string();
    }

    let rows: Vec<BudgetRow> = summaries
        .iter()
        .map(|s| BudgetRow {
            period: s.budget.period.to_string(),
            start: s.start.format(&settings.date_format).to_string(),
            end: s.end.format(&settings.date_format).to_string(),
            amount: settings.format_amount(s.budget.amount),
            spent: settings.format_amount(s.spent),
            remaining: settings.format_amount(s.remaining),
            status: if s.is_over() { "OVER" } else { "ok" },
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    format!("{}\n", table)
}
