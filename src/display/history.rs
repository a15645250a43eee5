//! Audit history view

use tabled::Tabled;

use crate::audit::AuditEntry;

use super::{render_table, truncate};

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "When")]
    when: String,
    #[tabled(rename = "Action")]
    operation: String,
    #[tabled(rename = "Record")]
    entity: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Changes")]
    changes: String,
}

/// Entries newest first
pub fn format_history(entries: &[AuditEntry]) -> String {
    if entries.is_empty() {
        return "No history recorded yet.\n".to_string();
    }

    let rows: Vec<_> = entries
        .iter()
        .rev()
        .map(|e| HistoryRow {
            when: e.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            operation: e.operation.to_string(),
            entity: format!("{} {}", e.entity_type, e.entity_id),
            name: e.entity_name.clone().unwrap_or_default(),
            changes: e
                .changes
                .as_deref()
                .map(|c| truncate(c, 60))
                .unwrap_or_default(),
        })
        .collect();
    render_table(rows, &[])
}
