use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use bookkeeper::cli::{
    handle_budget_command, handle_category_command, handle_expense_command,
    handle_migrate_command, BudgetCommands, CategoryCommands, ExpenseCommands, MigrateCommands,
};
use bookkeeper::config::paths::DATA_DIR_ENV;
use bookkeeper::config::{BookkeeperPaths, Settings};
use bookkeeper::storage::{initialize_storage, Storage};

#[derive(Parser)]
#[command(
    name = "bookkeeper",
    version,
    about = "Personal expense tracker with a category hierarchy",
    long_about = "Bookkeeper records expenses in a local SQLite database, files them \
                  under nested categories, and compares spending with daily, weekly, \
                  monthly and yearly budgets."
)]
struct Cli {
    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Directory holding the database, settings and audit log
    #[arg(long, global = true, env = DATA_DIR_ENV)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the database and default categories
    Init,

    /// Show configuration
    Config,

    /// Schema migration commands
    #[command(subcommand)]
    Migrate(MigrateCommands),

    /// Category management commands
    #[command(subcommand)]
    Category(CategoryCommands),

    /// Expense management commands
    #[command(subcommand)]
    Expense(ExpenseCommands),

    /// Budget management commands
    #[command(subcommand)]
    Budget(BudgetCommands),

    /// Show recent changes from the audit log
    History {
        /// Number of entries to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let paths = match cli.data_dir {
        Some(dir) => BookkeeperPaths::with_base_dir(dir),
        None => BookkeeperPaths::new()?,
    };
    let settings = Settings::load_or_create(&paths)?;
    let storage = Storage::new(paths.clone())?;
    tracing::debug!(base_dir = %paths.base_dir().display(), "Resolved paths");

    match cli.command {
        Some(Commands::Init) => {
            println!("Initializing Bookkeeper at: {}", paths.base_dir().display());
            let report = initialize_storage(&storage, settings.default_categories)?;
            settings.save(&paths)?;
            println!(
                "Schema version {} ({} migrations applied)",
                report.migrations.current_version,
                report.migrations.applied.len()
            );
            if !report.seeded.is_empty() {
                println!("Created {} default categories.", report.seeded.len());
                println!();
                println!("Run 'bookkeeper category list' to see them.");
            }
        }
        Some(Commands::Config) => {
            println!("Bookkeeper Configuration");
            println!("========================");
            println!("Base directory: {}", paths.base_dir().display());
            println!("Database:       {}", paths.database_file().display());
            println!("Settings file:  {}", paths.settings_file().display());
            println!("Audit log:      {}", paths.audit_log().display());
            println!();
            println!("Settings:");
            println!("  Currency symbol:    {}", settings.currency_symbol);
            println!("  Date format:        {}", settings.date_format);
            println!("  Default categories: {}", settings.default_categories);
        }
        Some(Commands::Migrate(cmd)) => handle_migrate_command(&storage, cmd)?,
        Some(Commands::Category(cmd)) => {
            require_initialized(&storage)?;
            handle_category_command(&storage, cmd)?;
        }
        Some(Commands::Expense(cmd)) => {
            require_initialized(&storage)?;
            handle_expense_command(&storage, &settings, cmd)?;
        }
        Some(Commands::Budget(cmd)) => {
            require_initialized(&storage)?;
            handle_budget_command(&storage, &settings, cmd)?;
        }
        Some(Commands::History { limit }) => {
            let entries = storage.audit().read_recent(limit)?;
            if entries.is_empty() {
                println!("No changes recorded yet.");
            }
            for entry in entries {
                println!("{}", entry.format_human_readable());
            }
        }
        None => {
            println!("Bookkeeper - personal expense tracking");
            println!();
            println!("Run 'bookkeeper --help' for usage information.");
            println!("Run 'bookkeeper init' to get started.");
        }
    }

    Ok(())
}

fn require_initialized(storage: &Storage) -> Result<()> {
    if !storage.is_initialized()? {
        bail!("Database not initialized. Run 'bookkeeper init' first.");
    }
    Ok(())
}
