//! Category model and hierarchy operations
//!
//! Categories form a forest through `parent_id`. The walks below read through
//! a `RecordSource` and never keep their own copy between calls.
//!
//! The parent graph is assumed acyclic. Nothing here detects cycles: a cycle
//! makes `ancestors` and `descendants` iterate forever.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::record::{Field, FieldType, FieldValue, Record, RecordValues};
use crate::error::{BookkeeperError, BookkeeperResult};
use crate::storage::{RecordSource, Repository};

/// An expense category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    /// Category name
    pub name: String,

    /// Parent category, `None` for a top-level category
    pub parent_id: Option<i64>,

    /// Record id, 0 while unsaved
    pub pk: i64,
}

impl Category {
    /// Create a new unsaved category
    pub fn new(name: impl Into<String>, parent_id: Option<i64>) -> Self {
        Self {
            name: name.into(),
            parent_id,
            pk: 0,
        }
    }

    /// Validate the category
    pub fn validate(&self) -> Result<(), CategoryValidationError> {
        if self.name.trim().is_empty() {
            return Err(CategoryValidationError::EmptyName);
        }

        if self.name.len() > 50 {
            return Err(CategoryValidationError::NameTooLong(self.name.len()));
        }

        if self.pk != 0 && self.parent_id == Some(self.pk) {
            return Err(CategoryValidationError::OwnParent);
        }

        Ok(())
    }

    /// Direct parent, or `None` for a top-level category
    pub fn parent<R>(&self, repo: &R) -> BookkeeperResult<Option<Category>>
    where
        R: RecordSource<Category> + ?Sized,
    {
        match self.parent_id {
            Some(parent_id) => repo.get(parent_id),
            None => Ok(None),
        }
    }

    /// Parent, grandparent and so on up to the root
    ///
    /// Lazy: one `get` per step. Stops at a category without a parent or at a
    /// dangling `parent_id`; a store error is yielded once and ends the walk.
    pub fn ancestors<'r, R>(&self, repo: &'r R) -> Ancestors<'r, R>
    where
        R: RecordSource<Category> + ?Sized,
    {
        Ancestors {
            repo,
            next_parent: self.parent_id,
        }
    }

    /// Every category below this one, depth-first pre-order
    ///
    /// All categories are fetched with a single `get_all` up front; siblings
    /// come out in the order the source returned them.
    pub fn descendants<R>(&self, repo: &R) -> BookkeeperResult<Descendants>
    where
        R: RecordSource<Category> + ?Sized,
    {
        let all = repo.get_all(None)?;
        Ok(Descendants(TreeWalk::new(all, Some(self.pk))))
    }

    /// Create categories from topologically sorted `(child, parent)` name pairs
    ///
    /// Every parent name must be the child name of an earlier pair. Each
    /// category is added to the repository before the next pair is read, and
    /// the created records are returned in input order. Ordering is not
    /// checked beyond looking the parent name up among those already created.
    pub fn create_from_tree<R, S>(
        tree: &[(S, Option<S>)],
        repo: &R,
    ) -> BookkeeperResult<Vec<Category>>
    where
        R: Repository<Category> + ?Sized,
        S: AsRef<str>,
    {
        let mut created: HashMap<&str, i64> = HashMap::new();
        let mut categories = Vec::with_capacity(tree.len());

        for (child, parent) in tree {
            let parent_id = match parent {
                Some(parent) => {
                    let pk = created.get(parent.as_ref()).ok_or_else(|| {
                        BookkeeperError::InvalidState(format!(
                            "parent '{}' of '{}' has not been created",
                            parent.as_ref(),
                            child.as_ref()
                        ))
                    })?;
                    Some(*pk)
                }
                None => None,
            };

            let mut category = Category::new(child.as_ref(), parent_id);
            repo.add(&mut category)?;
            created.insert(child.as_ref(), category.pk);
            categories.push(category);
        }

        Ok(categories)
    }
}

impl Default for Category {
    fn default() -> Self {
        Self::new("", None)
    }
}

impl Record for Category {
    const TYPE_NAME: &'static str = "Category";
    const FIELDS: &'static [Field] = &[
        Field::new("name", FieldType::Text),
        Field::new("parent_id", FieldType::Reference),
    ];

    fn pk(&self) -> i64 {
        self.pk
    }

    fn set_pk(&mut self, pk: i64) {
        self.pk = pk;
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![self.name.as_str().into(), self.parent_id.into()]
    }

    fn from_values(pk: i64, mut values: RecordValues) -> BookkeeperResult<Self> {
        Ok(Self {
            name: values.text()?,
            parent_id: values.reference()?,
            pk,
        })
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Lazy walk from a category's parent up to its root
pub struct Ancestors<'r, R: ?Sized> {
    repo: &'r R,
    next_parent: Option<i64>,
}

impl<'r, R> Iterator for Ancestors<'r, R>
where
    R: RecordSource<Category> + ?Sized,
{
    type Item = BookkeeperResult<Category>;

    fn next(&mut self) -> Option<Self::Item> {
        let parent_id = self.next_parent.take()?;
        match self.repo.get(parent_id) {
            Ok(Some(parent)) => {
                self.next_parent = parent.parent_id;
                Some(Ok(parent))
            }
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Depth-first pre-order walk over a snapshot of categories
///
/// Yields `(depth, category)` where depth 0 is a direct child of the root
/// the walk started from.
#[derive(Debug)]
pub struct TreeWalk {
    children: HashMap<Option<i64>, Vec<Category>>,
    stack: Vec<std::vec::IntoIter<Category>>,
}

impl TreeWalk {
    /// Walk the subtree below `root`; `None` walks the whole forest
    pub fn new(categories: Vec<Category>, root: Option<i64>) -> Self {
        let mut children: HashMap<Option<i64>, Vec<Category>> = HashMap::new();
        for category in categories {
            children.entry(category.parent_id).or_default().push(category);
        }
        let first = children.get(&root).cloned().unwrap_or_default();
        Self {
            children,
            stack: vec![first.into_iter()],
        }
    }
}

impl Iterator for TreeWalk {
    type Item = (usize, Category);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let depth = self.stack.len().checked_sub(1)?;
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(category) => {
                    let below = self
                        .children
                        .get(&Some(category.pk))
                        .cloned()
                        .unwrap_or_default();
                    self.stack.push(below.into_iter());
                    return Some((depth, category));
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

/// Descendants of one category, see `Category::descendants`
#[derive(Debug)]
pub struct Descendants(TreeWalk);

impl Iterator for Descendants {
    type Item = Category;

    fn next(&mut self) -> Option<Self::Item> {
        self.0.next().map(|(_, category)| category)
    }
}

/// Parse an indented outline into `(child, parent)` pairs
///
/// Each non-blank line is a category; its parent is the nearest preceding
/// line with less indentation. Tabs count as four spaces. A line that
/// dedents to a column no open category starts at is rejected. The output
/// is topologically sorted and can be fed to `Category::create_from_tree`.
pub fn parse_tree(text: &str) -> BookkeeperResult<Vec<(String, Option<String>)>> {
    let mut open: Vec<(usize, String)> = Vec::new();
    let mut pairs = Vec::new();

    for (line_num, line) in text.lines().enumerate() {
        let name = line.trim();
        if name.is_empty() {
            continue;
        }

        let indent = line
            .chars()
            .take_while(|c| c.is_whitespace())
            .map(|c| if c == '\t' { 4 } else { 1 })
            .sum::<usize>();

        let mut closed = None;
        while open.last().map_or(false, |(level, _)| *level >= indent) {
            closed = open.pop().map(|(level, _)| level);
        }

        if let (Some(closed), false) = (closed, open.is_empty()) {
            if closed != indent {
                return Err(BookkeeperError::Validation(format!(
                    "line {}: indentation of '{}' does not match any enclosing category",
                    line_num + 1,
                    name
                )));
            }
        }

        let parent = open.last().map(|(_, parent)| parent.clone());
        pairs.push((name.to_string(), parent));
        open.push((indent, name.to_string()));
    }

    Ok(pairs)
}

/// Validation errors for categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryValidationError {
    EmptyName,
    NameTooLong(usize),
    OwnParent,
}

impl fmt::Display for CategoryValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "Category name cannot be empty"),
            Self::NameTooLong(len) => {
                write!(f, "Category name too long ({} chars, max 50)", len)
            }
            Self::OwnParent => write!(f, "Category cannot be its own parent"),
        }
    }
}

impl std::error::Error for CategoryValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryRepository;
    use std::cell::Cell;

    /// Counts `get_all` calls made through it
    struct CountingSource<'a> {
        inner: &'a MemoryRepository<Category>,
        get_all_calls: Cell<usize>,
    }

    impl RecordSource<Category> for CountingSource<'_> {
        fn get(&self, pk: i64) -> BookkeeperResult<Option<Category>> {
            self.inner.get(pk)
        }

        fn get_all(&self, filter: Option<&crate::models::Filter>) -> BookkeeperResult<Vec<Category>> {
            self.get_all_calls.set(self.get_all_calls.get() + 1);
            self.inner.get_all(filter)
        }
    }

    fn names(categories: impl IntoIterator<Item = Category>) -> Vec<String> {
        categories.into_iter().map(|c| c.name).collect()
    }

    fn sample_tree(repo: &MemoryRepository<Category>) -> Vec<Category> {
        let tree = [
            ("food", None),
            ("meat", Some("food")),
            ("raw meat", Some("meat")),
            ("sausages", Some("meat")),
            ("sweets", Some("food")),
            ("books", None),
            ("clothes", None),
        ];
        Category::create_from_tree(&tree, repo).unwrap()
    }

    #[test]
    fn test_create_from_tree_scenario() {
        let repo = MemoryRepository::<Category>::new();
        let tree = [("food", None), ("meat", Some("food")), ("bread", None)];
        let created = Category::create_from_tree(&tree, &repo).unwrap();

        assert_eq!(created.len(), 3);
        assert_eq!(repo.len().unwrap(), 3);
        let (food, meat, bread) = (&created[0], &created[1], &created[2]);

        assert_eq!(meat.parent(&repo).unwrap().unwrap().name, "food");
        assert_eq!(names(food.descendants(&repo).unwrap()), vec!["meat"]);
        assert!(bread.descendants(&repo).unwrap().next().is_none());
    }

    #[test]
    fn test_create_from_tree_unknown_parent() {
        let repo = MemoryRepository::<Category>::new();
        let tree = [("meat", Some("food")), ("food", None)];
        let err = Category::create_from_tree(&tree, &repo).unwrap_err();
        assert!(err.is_invalid_state());
        assert!(repo.is_empty().unwrap());
    }

    #[test]
    fn test_parent_of_root_is_none() {
        let repo = MemoryRepository::<Category>::new();
        let created = sample_tree(&repo);
        assert!(created[0].parent(&repo).unwrap().is_none());
    }

    #[test]
    fn test_ancestors() {
        let repo = MemoryRepository::<Category>::new();
        let created = sample_tree(&repo);
        let raw_meat = &created[2];

        let ancestors: Vec<Category> = raw_meat
            .ancestors(&repo)
            .collect::<BookkeeperResult<_>>()
            .unwrap();
        assert_eq!(names(ancestors), vec!["meat", "food"]);

        // Re-invoking gives the same walk
        assert_eq!(raw_meat.ancestors(&repo).count(), 2);
        assert_eq!(created[0].ancestors(&repo).count(), 0);
    }

    #[test]
    fn test_descendants_pre_order() {
        let repo = MemoryRepository::<Category>::new();
        let created = sample_tree(&repo);

        assert_eq!(
            names(created[0].descendants(&repo).unwrap()),
            vec!["meat", "raw meat", "sausages", "sweets"]
        );
        assert_eq!(
            names(created[1].descendants(&repo).unwrap()),
            vec!["raw meat", "sausages"]
        );
        assert!(created[6].descendants(&repo).unwrap().next().is_none());
    }

    #[test]
    fn test_descendants_fetch_once() {
        let repo = MemoryRepository::<Category>::new();
        let created = sample_tree(&repo);
        let source = CountingSource {
            inner: &repo,
            get_all_calls: Cell::new(0),
        };

        let all: Vec<_> = created[0].descendants(&source).unwrap().collect();
        assert_eq!(all.len(), 4);
        assert_eq!(source.get_all_calls.get(), 1);
    }

    #[test]
    fn test_cycle_is_not_guarded() {
        let a = Category { name: "a".into(), parent_id: Some(2), pk: 1 };
        let b = Category { name: "b".into(), parent_id: Some(1), pk: 2 };
        let walk = TreeWalk::new(vec![a, b], Some(1));
        // Bounded so the test terminates; the walk itself would not
        assert_eq!(walk.take(10).count(), 10);
    }

    #[test]
    fn test_tree_walk_depths() {
        let repo = MemoryRepository::<Category>::new();
        sample_tree(&repo);
        let walk = TreeWalk::new(repo.get_all(None).unwrap(), None);
        let depths: Vec<(usize, String)> = walk.map(|(d, c)| (d, c.name)).collect();
        assert_eq!(
            depths,
            vec![
                (0, "food".to_string()),
                (1, "meat".to_string()),
                (2, "raw meat".to_string()),
                (2, "sausages".to_string()),
                (1, "sweets".to_string()),
                (0, "books".to_string()),
                (0, "clothes".to_string()),
            ]
        );
    }

    #[test]
    fn test_parse_tree() {
        let text = "
food
    meat
        raw meat
        sausages
    sweets
books
clothes
";
        let pairs = parse_tree(text).unwrap();
        assert_eq!(pairs.len(), 7);
        assert_eq!(pairs[0], ("food".to_string(), None));
        assert_eq!(pairs[2], ("raw meat".to_string(), Some("meat".to_string())));
        assert_eq!(pairs[4], ("sweets".to_string(), Some("food".to_string())));
        assert_eq!(pairs[6], ("clothes".to_string(), None));
    }

    #[test]
    fn test_parse_tree_rejects_unmatched_dedent() {
        let text = "food\n    meat\n  sweets\n";
        let err = parse_tree(text).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn test_parse_tree_feeds_create_from_tree() {
        let repo = MemoryRepository::<Category>::new();
        let pairs = parse_tree("food\n\tmeat\nbooks\n").unwrap();
        let created = Category::create_from_tree(pairs.as_slice(), &repo).unwrap();
        assert_eq!(created[1].parent_id, Some(created[0].pk));
        assert_eq!(created[2].parent_id, None);
    }

    #[test]
    fn test_validation() {
        let mut category = Category::new("Groceries", None);
        assert!(category.validate().is_ok());

        category.name = "  ".into();
        assert_eq!(category.validate(), Err(CategoryValidationError::EmptyName));

        category.name = "a".repeat(51);
        assert!(matches!(
            category.validate(),
            Err(CategoryValidationError::NameTooLong(51))
        ));

        let own_parent = Category { name: "loop".into(), parent_id: Some(3), pk: 3 };
        assert_eq!(own_parent.validate(), Err(CategoryValidationError::OwnParent));
    }
}
