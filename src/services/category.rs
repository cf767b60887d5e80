//! Category service
//!
//! Business rules on top of the category repository: unique names, parent
//! lookup by name, cycle-free reparenting, and outline import.

use crate::audit::EntityType;
use crate::error::{BookkeeperError, BookkeeperResult};
use crate::models::{parse_tree, Category, TreeWalk};
use crate::storage::{RecordSource, Repository, Storage};

/// Service for category management
pub struct CategoryService<'a> {
    storage: &'a Storage,
}

impl<'a> CategoryService<'a> {
    /// Create a new category service
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// List all categories in primary key order
    pub fn list(&self) -> BookkeeperResult<Vec<Category>> {
        self.storage.categories.get_all(None)
    }

    /// Get a category by primary key
    pub fn get(&self, pk: i64) -> BookkeeperResult<Option<Category>> {
        self.storage.categories.get(pk)
    }

    /// Get a category by name (case-insensitive)
    pub fn get_by_name(&self, name: &str) -> BookkeeperResult<Option<Category>> {
        let name = name.trim();
        Ok(self
            .list()?
            .into_iter()
            .find(|c| same_name(&c.name, name)))
    }

    /// Find a category by name or id string
    pub fn find(&self, identifier: &str) -> BookkeeperResult<Option<Category>> {
        if let Some(category) = self.get_by_name(identifier)? {
            return Ok(Some(category));
        }

        match identifier.trim().parse::<i64>() {
            Ok(pk) => self.get(pk),
            Err(_) => Ok(None),
        }
    }

    /// Like `find`, but a miss is an error
    pub fn require(&self, identifier: &str) -> BookkeeperResult<Category> {
        self.find(identifier)?
            .ok_or_else(|| BookkeeperError::category_not_found(identifier))
    }

    /// Every category with its depth, parents before children
    pub fn tree(&self) -> BookkeeperResult<Vec<(usize, Category)>> {
        Ok(TreeWalk::new(self.list()?, None).collect())
    }

    /// Create a new category, optionally below `parent`
    pub fn create(&self, name: &str, parent: Option<&str>) -> BookkeeperResult<Category> {
        let name = name.trim();
        self.ensure_name_free(name, None)?;

        let parent_id = match parent {
            Some(parent) => Some(self.require(parent)?.pk),
            None => None,
        };

        let mut category = Category::new(name, parent_id);
        category
            .validate()
            .map_err(|e| BookkeeperError::Validation(e.to_string()))?;

        self.storage.categories.add(&mut category)?;

        self.storage.log_create(
            EntityType::Category,
            category.pk,
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    /// Rename a category
    pub fn rename(&self, pk: i64, name: &str) -> BookkeeperResult<Category> {
        let before = self.load(pk)?;
        let name = name.trim();
        self.ensure_name_free(name, Some(pk))?;

        let mut category = before.clone();
        category.name = name.to_string();
        category
            .validate()
            .map_err(|e| BookkeeperError::Validation(e.to_string()))?;

        if category == before {
            return Ok(category);
        }

        self.storage.categories.update(&category)?;
        self.storage.log_update(
            EntityType::Category,
            category.pk,
            Some(category.name.clone()),
            &before,
            &category,
        )?;

        Ok(category)
    }

    /// Move a category below `new_parent`, or to the top level with `None`
    ///
    /// Refuses to place a category under itself or under one of its own
    /// descendants.
    pub fn move_to(&self, pk: i64, new_parent: Option<i64>) -> BookkeeperResult<Category> {
        let before = self.load(pk)?;

        if let Some(parent_pk) = new_parent {
            let parent = self.load(parent_pk)?;
            if parent.pk == pk {
                return Err(BookkeeperError::Validation(format!(
                    "'{}' cannot be its own parent",
                    before.name
                )));
            }
            for ancestor in parent.ancestors(&self.storage.categories) {
                if ancestor?.pk == pk {
                    return Err(BookkeeperError::Validation(format!(
                        "'{}' is below '{}' and cannot become its parent",
                        parent.name, before.name
                    )));
                }
            }
        }

        let mut category = before.clone();
        category.parent_id = new_parent;
        if category == before {
            return Ok(category);
        }

        self.storage.categories.update(&category)?;
        self.storage.log_update(
            EntityType::Category,
            category.pk,
            Some(category.name.clone()),
            &before,
            &category,
        )?;

        Ok(category)
    }

    /// Delete a category
    ///
    /// The store refuses while expenses or child categories still reference
    /// it; that error is passed through.
    pub fn delete(&self, pk: i64) -> BookkeeperResult<Category> {
        let category = self.load(pk)?;
        self.storage.categories.delete(pk)?;

        self.storage.log_delete(
            EntityType::Category,
            category.pk,
            Some(category.name.clone()),
            &category,
        )?;

        Ok(category)
    }

    /// Create categories from an indented outline
    ///
    /// Names already in use are rejected before anything is written.
    pub fn import(&self, text: &str) -> BookkeeperResult<Vec<Category>> {
        let pairs = parse_tree(text)?;

        let existing = self.list()?;
        for (index, (name, _)) in pairs.iter().enumerate() {
            let clash_existing = existing.iter().any(|c| same_name(&c.name, name));
            let clash_earlier = pairs[..index]
                .iter()
                .any(|(earlier, _)| same_name(earlier, name));
            if clash_existing || clash_earlier {
                return Err(BookkeeperError::Validation(format!(
                    "Category '{}' already exists",
                    name
                )));
            }
        }

        let created = Category::create_from_tree(pairs.as_slice(), &self.storage.categories)?;
        for category in &created {
            self.storage.log_create(
                EntityType::Category,
                category.pk,
                Some(category.name.clone()),
                category,
            )?;
        }

        tracing::info!(count = created.len(), "Imported categories");
        Ok(created)
    }

    fn load(&self, pk: i64) -> BookkeeperResult<Category> {
        self.get(pk)?
            .ok_or_else(|| BookkeeperError::category_not_found(pk.to_string()))
    }

    fn ensure_name_free(&self, name: &str, except: Option<i64>) -> BookkeeperResult<()> {
        if let Some(existing) = self.get_by_name(name)? {
            if Some(existing.pk) != except {
                return Err(BookkeeperError::Validation(format!(
                    "Category '{}' already exists",
                    existing.name
                )));
            }
        }
        Ok(())
    }
}

/// Case-insensitive name comparison, Unicode-aware
fn same_name(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}
