// ==========================================
// MedEquip OMS - activity-log domain model
// ==========================================
// Generic audit row: who did what to which entity, with before/after
// snapshots. Written best-effort by the AuditTrail; append-only.
// ==========================================

use crate::domain::types::OperationKind;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

// ==========================================
// ActivityLogEntry
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub log_id: i64,      // 0 until the store assigns it
    pub event_id: String, // UUID minted per mutation, shared with the history row
    pub operation: OperationKind,
    pub entity_name: String,
    pub entity_id: String,
    pub title: String,
    pub description: Option<String>,

    // ===== snapshots =====
    pub before_json: Option<JsonValue>,
    pub after_json: Option<JsonValue>,

    // ===== provenance =====
    pub actor: String,
    pub source_addr: Option<String>,
    pub created_at: NaiveDateTime,
}

impl ActivityLogEntry {
    /// New entry; snapshots and provenance attach through the with_* helpers
    pub fn new(operation: OperationKind, entity_name: &str, entity_id: &str, title: &str, actor: &str) -> Self {
        Self {
            log_id: 0,
            event_id: uuid::Uuid::new_v4().to_string(),
            operation,
            entity_name: entity_name.to_string(),
            entity_id: entity_id.to_string(),
            title: title.to_string(),
            description: None,
            before_json: None,
            after_json: None,
            actor: actor.to_string(),
            source_addr: None,
            created_at: chrono::Local::now().naive_local(),
        }
    }

    /// Reuse an already-minted event id (correlates with a history row)
    pub fn with_event_id(mut self, event_id: &str) -> Self {
        self.event_id = event_id.to_string();
        self
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Snapshot of the entity before the mutation (serialized to JSON)
    pub fn with_before<T: Serialize>(mut self, before: &T) -> Self {
        self.before_json = serde_json::to_value(before).ok();
        self
    }

    /// Snapshot of the entity after the mutation (serialized to JSON)
    pub fn with_after<T: Serialize>(mut self, after: &T) -> Self {
        self.after_json = serde_json::to_value(after).ok();
        self
    }

    pub fn with_source_addr(mut self, addr: &str) -> Self {
        self.source_addr = Some(addr.to_string());
        self
    }
}
