//! Audit entry data structures

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Types of operations that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Record kinds that can be audited
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityType {
    Category,
    Expense,
    Budget,
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityType::Category => write!(f, "Category"),
            EntityType::Expense => write!(f, "Expense"),
            EntityType::Budget => write!(f, "Budget"),
        }
    }
}

/// A single audit log entry
///
/// `before` is set for updates and deletes, `after` for creates and updates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub operation: Operation,
    pub entity_type: EntityType,

    /// Primary key of the affected record
    pub entity_id: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    /// Changed fields, for updates
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff_summary: Option<String>,
}

impl AuditEntry {
    /// Entry for a newly created record
    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: i64,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Create,
            entity_type,
            entity_id,
            entity_name,
            before: None,
            after: serde_json::to_value(entity).ok(),
            diff_summary: None,
        }
    }

    /// Entry for an update, with a summary of the fields that changed
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: i64,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let before = serde_json::to_value(before).ok();
        let after = serde_json::to_value(after).ok();
        let diff_summary = match (&before, &after) {
            (Some(before), Some(after)) => changed_fields(before, after),
            _ => None,
        };
        Self {
            timestamp: Utc::now(),
            operation: Operation::Update,
            entity_type,
            entity_id,
            entity_name,
            before,
            after,
            diff_summary,
        }
    }

    /// Entry for a deleted record
    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: i64,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            operation: Operation::Delete,
            entity_type,
            entity_id,
            entity_name,
            before: serde_json::to_value(entity).ok(),
            after: None,
            diff_summary: None,
        }
    }

    /// Format the entry for human-readable output
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} #{}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );

        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }

        if let Some(diff) = &self.diff_summary {
            output.push_str(&format!("\n  Changes: {}", diff));
        }

        output
    }
}

/// Summarize top-level fields whose values differ, e.g. `amount: 5.0 -> 7.5`
fn changed_fields(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before), Value::Object(after)) = (before, after) else {
        return (before != after).then(|| format!("{} -> {}", before, after));
    };

    let changes: Vec<String> = before
        .iter()
        .filter_map(|(key, old)| {
            let new = after.get(key).unwrap_or(&Value::Null);
            (old != new).then(|| format!("{}: {} -> {}", key, old, new))
        })
        .collect();

    if changes.is_empty() {
        None
    } else {
        Some(changes.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operation_display() {
        assert_eq!(Operation::Create.to_string(), "CREATE");
        assert_eq!(Operation::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_create_entry() {
        let entry = AuditEntry::create(
            EntityType::Category,
            4,
            Some("food".into()),
            &json!({"name": "food", "parent_id": null}),
        );
        assert_eq!(entry.operation, Operation::Create);
        assert!(entry.before.is_none());
        assert!(entry.after.is_some());
    }

    #[test]
    fn test_update_entry_summarizes_changes() {
        let entry = AuditEntry::update(
            EntityType::Expense,
            2,
            None,
            &json!({"amount": 5.0, "comment": "bus"}),
            &json!({"amount": 7.5, "comment": "bus"}),
        );
        assert_eq!(entry.diff_summary.as_deref(), Some("amount: 5.0 -> 7.5"));
    }

    #[test]
    fn test_update_without_changes() {
        let value = json!({"amount": 1.0});
        let entry = AuditEntry::update(EntityType::Budget, 1, None, &value, &value);
        assert!(entry.diff_summary.is_none());
    }

    #[test]
    fn test_human_readable() {
        let entry = AuditEntry::delete(EntityType::Budget, 9, Some("MONTH".into()), &json!({}));
        let text = entry.format_human_readable();
        assert!(text.contains("DELETE Budget #9 (MONTH)"));
    }

    #[test]
    fn test_serialization_skips_empty_fields() {
        let entry = AuditEntry::create(EntityType::Budget, 1, None, &json!({"amount": 3.0}));
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("before"));
        assert!(json.contains("\"entity_type\":\"budget\""));
    }
}
