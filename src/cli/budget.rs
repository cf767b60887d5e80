//! Budget CLI commands

use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_budget_overview;
use crate::error::BookkeeperResult;
use crate::models::Period;
use crate::services::BudgetService;
use crate::storage::Storage;

/// Budget subcommands
#[derive(Subcommand)]
pub enum BudgetCommands {
    /// Set the spending limit for a period
    Set {
        /// Period: day, week, month or year
        period: Period,
        /// Spending limit
        amount: f64,
    },

    /// Show budgets against actual spending
    List {
        /// Day whose periods to report on (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
    },

    /// Remove the limit for a period
    Delete {
        /// Period: day, week, month or year
        period: Period,
    },
}

/// Handle a budget command
pub fn handle_budget_command(
    storage: &Storage,
    settings: &Settings,
    cmd: BudgetCommands,
) -> BookkeeperResult<()> {
    let service = BudgetService::new(storage);

    match cmd {
        BudgetCommands::Set { period, amount } => {
            let budget = service.set(period, amount)?;
            println!(
                "Budget for {} set to {}",
                budget.period,
                settings.format_amount(budget.amount)
            );
        }

        BudgetCommands::List { date } => {
            let today = date.unwrap_or_else(|| Local::now().date_naive());
            let overview = service.overview(today)?;
            print!("{}", format_budget_overview(&overview, settings));
        }

        BudgetCommands::Delete { period } => {
            service.delete(period)?;
            println!("Deleted budget for {}", period);
        }
    }

    Ok(())
}
