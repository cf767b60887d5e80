//! Category CLI commands
//!
//! Implements CLI commands for category management.

use std::path::PathBuf;

use clap::Subcommand;

use crate::display::category::{format_category_path, format_category_tree};
use crate::error::{BookkeeperError, BookkeeperResult};
use crate::services::CategoryService;
use crate::storage::Storage;

/// Category subcommands
#[derive(Subcommand)]
pub enum CategoryCommands {
    /// List all categories as a tree
    List,

    /// Create a new category
    Add {
        /// Category name
        name: String,
        /// Parent category name or ID
        #[arg(short, long)]
        parent: Option<String>,
    },

    /// Show a category with its full path
    Show {
        /// Category name or ID
        category: String,
    },

    /// Rename a category
    Rename {
        /// Category name or ID
        category: String,
        /// New name
        name: String,
    },

    /// Move a category under another one
    Move {
        /// Category name or ID
        category: String,
        /// New parent name or ID; omit to make it top-level
        #[arg(short, long)]
        to: Option<String>,
    },

    /// Delete a category
    Delete {
        /// Category name or ID
        category: String,
    },

    /// Create categories from an indented outline file
    Import {
        /// Path to the outline file
        file: PathBuf,
    },
}

/// Handle a category command
pub fn handle_category_command(storage: &Storage, cmd: CategoryCommands) -> BookkeeperResult<()> {
    let service = CategoryService::new(storage);

    match cmd {
        CategoryCommands::List => {
            let tree = service.tree()?;
            print!("{}", format_category_tree(&tree));
        }

        CategoryCommands::Add { name, parent } => {
            let category = service.create(&name, parent.as_deref())?;
            println!("Created category: {}", category.name);
            println!("  ID: {}", category.pk);
        }

        CategoryCommands::Show { category } => {
            let cat = service.require(&category)?;
            let ancestors = cat
                .ancestors(&storage.categories)
                .collect::<BookkeeperResult<Vec<_>>>()?;
            println!("{}", format_category_path(&cat, &ancestors));
            println!("  ID: {}", cat.pk);

            let children = cat.descendants(&storage.categories)?.count();
            println!("  Subcategories: {}", children);
        }

        CategoryCommands::Rename { category, name } => {
            let cat = service.require(&category)?;
            let renamed = service.rename(cat.pk, &name)?;
            println!("Renamed '{}' to '{}'", cat.name, renamed.name);
        }

        CategoryCommands::Move { category, to } => {
            let cat = service.require(&category)?;
            let parent = match to.as_deref() {
                Some(to) => Some(service.require(to)?),
                None => None,
            };

            let moved = service.move_to(cat.pk, parent.as_ref().map(|p| p.pk))?;
            match parent {
                Some(parent) => println!("Moved '{}' under '{}'", moved.name, parent.name),
                None => println!("Moved '{}' to the top level", moved.name),
            }
        }

        CategoryCommands::Delete { category } => {
            let cat = service.require(&category)?;
            service.delete(cat.pk)?;
            println!("Deleted category: {}", cat.name);
        }

        CategoryCommands::Import { file } => {
            let text = std::fs::read_to_string(&file).map_err(|e| {
                BookkeeperError::Io(format!("Failed to read {}: {}", file.display(), e))
            })?;
            let created = service.import(&text)?;
            println!("Imported {} categories", created.len());
        }
    }

    Ok(())
}
