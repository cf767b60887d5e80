//! Schema migration CLI commands

use clap::Subcommand;

use crate::error::BookkeeperResult;
use crate::storage::{MigrationResult, Storage};

/// Migration subcommands
#[derive(Subcommand)]
pub enum MigrateCommands {
    /// Apply all pending migrations
    Up,

    /// Revert migrations down to a version
    Down {
        /// Target schema version
        #[arg(long, default_value = "0")]
        to: u32,
    },

    /// Show the current and latest schema version
    Status,
}

/// Handle a migrate command
pub fn handle_migrate_command(storage: &Storage, cmd: MigrateCommands) -> BookkeeperResult<()> {
    let migrator = storage.migrator();

    match cmd {
        MigrateCommands::Up => print_result(&migrator.up()?),
        MigrateCommands::Down { to } => print_result(&migrator.down(to)?),
        MigrateCommands::Status => {
            println!("Current schema version: {}", migrator.current_version()?);
            println!("Latest schema version:  {}", migrator.latest_version());
        }
    }

    Ok(())
}

fn print_result(result: &MigrationResult) {
    if result.applied.is_empty() {
        println!("Schema already at version {}", result.current_version);
        return;
    }

    for name in &result.applied {
        println!("  {}", name);
    }
    println!(
        "Schema version {} -> {}",
        result.previous_version, result.current_version
    );
}
