//! Audit log entries
//!
//! One entry per create, update or delete, carrying JSON snapshots of the
//! record so `cashiro history` can show what changed.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Fields that change on every write and are left out of change summaries
const NOISY_FIELDS: &[&str] = &["updated_at"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Create,
    Update,
    Delete,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Create => write!(f, "CREATE"),
            Operation::Update => write!(f, "UPDATE"),
            Operation::Delete => write!(f, "DELETE"),
        }
    }
}

/// Kind of record an entry refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityType {
    Account,
    Transaction,
    Category,
    Subscription,
    Profile,
    ExchangeRate,
}

impl fmt::Display for EntityType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityType::Account => write!(f, "Account"),
            EntityType::Transaction => write!(f, "Transaction"),
            EntityType::Category => write!(f, "Category"),
            EntityType::Subscription => write!(f, "Subscription"),
            EntityType::Profile => write!(f, "Profile"),
            EntityType::ExchangeRate => write!(f, "Exchange rate"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,

    pub operation: Operation,

    pub entity_type: EntityType,

    /// Short id (`acc-1a2b3c4d`) or natural key (currency code)
    pub entity_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entity_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<Value>,

    /// `field: old -> new` pairs for updates
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<String>,
}

impl AuditEntry {
    fn base(operation: Operation, entity_type: EntityType, entity_id: String) -> Self {
        Self {
            timestamp: Utc::now(),
            operation,
            entity_type,
            entity_id,
            entity_name: None,
            before: None,
            after: None,
            changes: None,
        }
    }

    pub fn create<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::base(Operation::Create, entity_type, entity_id.into());
        entry.entity_name = entity_name;
        entry.after = serde_json::to_value(entity).ok();
        entry
    }

    /// Update entry; the change summary is derived from the two snapshots
    pub fn update<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        before: &T,
        after: &T,
    ) -> Self {
        let mut entry = Self::base(Operation::Update, entity_type, entity_id.into());
        entry.entity_name = entity_name;
        entry.before = serde_json::to_value(before).ok();
        entry.after = serde_json::to_value(after).ok();
        entry.changes = match (&entry.before, &entry.after) {
            (Some(b), Some(a)) => summarize_changes(b, a),
            _ => None,
        };
        entry
    }

    pub fn delete<T: Serialize>(
        entity_type: EntityType,
        entity_id: impl Into<String>,
        entity_name: Option<String>,
        entity: &T,
    ) -> Self {
        let mut entry = Self::base(Operation::Delete, entity_type, entity_id.into());
        entry.entity_name = entity_name;
        entry.before = serde_json::to_value(entity).ok();
        entry
    }

    /// One line per entry, plus a second line listing changes if any
    pub fn format_human_readable(&self) -> String {
        let mut output = format!(
            "[{}] {} {} {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S UTC"),
            self.operation,
            self.entity_type,
            self.entity_id
        );
        if let Some(name) = &self.entity_name {
            output.push_str(&format!(" ({})", name));
        }
        if let Some(changes) = &self.changes {
            output.push_str(&format!("\n  Changes: {}", changes));
        }
        output
    }
}

/// Top-level field differences between two JSON objects
pub fn summarize_changes(before: &Value, after: &Value) -> Option<String> {
    let (Value::Object(before), Value::Object(after)) = (before, after) else {
        return (before != after).then(|| format!("{} -> {}", short(before), short(after)));
    };

    let mut changes = Vec::new();
    for (key, old) in before {
        if NOISY_FIELDS.contains(&key.as_str()) {
            continue;
        }
        match after.get(key) {
            Some(new) if new != old => {
                changes.push(format!("{}: {} -> {}", key, short(old), short(new)))
            }
            None => changes.push(format!("{}: {} -> (removed)", key, short(old))),
            _ => {}
        }
    }
    for (key, new) in after {
        if !before.contains_key(key) {
            changes.push(format!("{}: (added) -> {}", key, short(new)));
        }
    }

    (!changes.is_empty()).then(|| changes.join(", "))
}

fn short(value: &Value) -> String {
    match value {
        Value::String(s) if s.chars().count() > 40 => {
            let head: String = s.chars().take(37).collect();
            format!("\"{}...\"", head)
        }
        Value::String(s) => format!("\"{}\"", s),
        Value::Array(items) => format!("[{} items]", items.len()),
        Value::Object(fields) => format!("{{{} fields}}", fields.len()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_and_delete_snapshots() {
        let data = json!({"name": "Wallet"});
        let created = AuditEntry::create(EntityType::Account, "acc-1", None, &data);
        assert_eq!(created.operation, Operation::Create);
        assert!(created.before.is_none());
        assert!(created.after.is_some());

        let deleted = AuditEntry::delete(EntityType::Account, "acc-1", None, &data);
        assert!(deleted.before.is_some());
        assert!(deleted.after.is_none());
    }

    #[test]
    fn test_update_summarizes_changes_without_timestamps() {
        let before = json!({"name": "Wallet", "notes": "", "updated_at": "2025-01-01"});
        let after = json!({"name": "Pocket", "notes": "", "updated_at": "2025-02-01"});
        let entry = AuditEntry::update(
            EntityType::Account,
            "acc-1",
            Some("Pocket".into()),
            &before,
            &after,
        );
        assert_eq!(entry.changes.as_deref(), Some("name: \"Wallet\" -> \"Pocket\""));
    }

    #[test]
    fn test_summarize_added_and_removed() {
        let before = json!({"a": 1, "b": 2});
        let after = json!({"a": 1, "c": [1, 2]});
        let summary = summarize_changes(&before, &after).unwrap();
        assert!(summary.contains("b: 2 -> (removed)"));
        assert!(summary.contains("c: (added) -> [2 items]"));
        assert!(summarize_changes(&before, &before).is_none());
    }

    #[test]
    fn test_human_readable() {
        let entry = AuditEntry::create(
            EntityType::Subscription,
            "sub-12345678",
            Some("Netflix".into()),
            &json!({}),
        );
        let text = entry.format_human_readable();
        assert!(text.contains("CREATE Subscription sub-12345678 (Netflix)"));
    }

    #[test]
    fn test_round_trip() {
        let entry = AuditEntry::create(EntityType::ExchangeRate, "EUR", None, &json!("1.1"));
        let line = serde_json::to_string(&entry).unwrap();
        assert!(line.contains("\"exchange_rate\""));
        let back: AuditEntry = serde_json::from_str(&line).unwrap();
        assert_eq!(back.entity_type, EntityType::ExchangeRate);
    }
}
