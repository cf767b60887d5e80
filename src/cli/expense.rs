//! Expense CLI commands

use chrono::NaiveDate;
use clap::Subcommand;

use crate::config::Settings;
use crate::display::format_expense_table;
use crate::error::BookkeeperResult;
use crate::services::{CategoryService, ExpenseService};
use crate::storage::Storage;

/// Expense subcommands
#[derive(Subcommand)]
pub enum ExpenseCommands {
    /// Record an expense
    Add {
        /// Amount spent
        amount: f64,
        /// Category name or ID
        #[arg(short, long)]
        category: Option<String>,
        /// Date of the expense (YYYY-MM-DD, default today)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Comment
        #[arg(short = 'm', long, default_value = "")]
        comment: String,
    },

    /// List expenses
    List {
        /// Only expenses in this category
        #[arg(short, long)]
        category: Option<String>,
    },

    /// Change an expense
    Edit {
        /// Expense ID
        id: i64,
        /// New amount
        #[arg(short, long)]
        amount: Option<f64>,
        /// New comment
        #[arg(short = 'm', long)]
        comment: Option<String>,
    },

    /// Delete an expense
    Delete {
        /// Expense ID
        id: i64,
    },
}

/// Handle an expense command
pub fn handle_expense_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ExpenseCommands,
) -> BookkeeperResult<()> {
    let service = ExpenseService::new(storage);

    match cmd {
        ExpenseCommands::Add {
            amount,
            category,
            date,
            comment,
        } => {
            let expense = service.add(amount, category.as_deref(), date, &comment)?;
            println!(
                "Recorded {} on {}",
                settings.format_amount(expense.amount),
                expense.expense_date.format(&settings.date_format)
            );
            println!("  ID: {}", expense.pk);
        }

        ExpenseCommands::List { category } => {
            let expenses = service.list(category.as_deref())?;
            let categories = CategoryService::new(storage).list()?;
            print!("{}", format_expense_table(&expenses, &categories, settings));
        }

        ExpenseCommands::Edit {
            id,
            amount,
            comment,
        } => {
            if amount.is_none() && comment.is_none() {
                println!("No changes specified. Use --amount or --comment.");
                return Ok(());
            }

            let updated = service.update(id, amount, comment.as_deref())?;
            println!("Updated expense #{}: {}", updated.pk, updated);
        }

        ExpenseCommands::Delete { id } => {
            let deleted = service.delete(id)?;
            println!("Deleted expense #{}: {}", deleted.pk, deleted);
        }
    }

    Ok(())
}
