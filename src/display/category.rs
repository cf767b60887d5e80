//! Category display formatting
//!
//! Renders the category forest as an indented tree with box-drawing
//! connectors.

use crate::models::Category;

/// Format `(depth, category)` pairs in pre-order as a tree
pub fn format_category_tree(tree: &[(usize, Category)]) -> String {
    if tree.is_empty() {
        return "No categories found.\n\nRun 'bookkeeper init' to create default categories.\n"
            .to_string();
    }

    let mut output = String::new();
    // open[k]: the ancestor at depth k still has siblings below it
    let mut open: Vec<bool> = Vec::new();

    for (i, (depth, category)) in tree.iter().enumerate() {
        let depth = *depth;
        let is_last = tree[i + 1..]
            .iter()
            .find(|(d, _)| *d <= depth)
            .map_or(true, |(d, _)| *d < depth);

        if depth > 0 {
            for k in 1..depth {
                let bar = open.get(k).copied().unwrap_or(false);
                output.push_str(if bar { "│   " } else { "    " });
            }
            output.push_str(if is_last { "└── " } else { "├── " });
        }
        output.push_str(&format!("{} [{}]\n", category.name, category.pk));

        open.truncate(depth);
        open.push(!is_last);
    }

    output
}

/// Format a category with its full path from the root
pub fn format_category_path(category: &Category, ancestors: &[Category]) -> String {
    let mut names: Vec<&str> = ancestors.iter().rev().map(|c| c.name.as_str()).collect();
    names.push(&category.name);
    names.join(" > ")
}
