// ==========================================
// MedEquip OMS - status-history domain model
// ==========================================
// One immutable row per accepted guarded mutation. STATUS_CHANGE rows carry
// the prior/new status strings; POSTPONEMENT rows reuse the same columns for
// the prior/new due-date strings, tagged by entry_kind.
// Append-only: never updated or deleted by this crate.
// ==========================================

use crate::domain::types::{HistoryEntryKind, OrderStatus};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// StatusHistoryEntry
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusHistoryEntry {
    pub history_id: i64, // 0 until the store assigns it
    pub order_id: i64,
    pub entry_kind: HistoryEntryKind,
    pub prior_value: Option<String>,
    pub new_value: String,
    pub justification: String,
    pub actor: String,
    pub event_id: Option<String>, // correlates with the activity_log row of the same mutation
    pub created_at: NaiveDateTime,
}

impl StatusHistoryEntry {
    /// Entry for an accepted status transition
    pub fn status_change(
        order_id: i64,
        prior: OrderStatus,
        new: OrderStatus,
        justification: &str,
        actor: &str,
        event_id: &str,
    ) -> Self {
        Self {
            history_id: 0,
            order_id,
            entry_kind: HistoryEntryKind::StatusChange,
            prior_value: Some(prior.to_db_str().to_string()),
            new_value: new.to_db_str().to_string(),
            justification: justification.to_string(),
            actor: actor.to_string(),
            event_id: Some(event_id.to_string()),
            created_at: chrono::Local::now().naive_local(),
        }
    }

    /// Entry for an accepted due-date postponement
    ///
    /// prior is None when the order had no due date before the call.
    pub fn postponement(
        order_id: i64,
        prior: Option<NaiveDate>,
        new: NaiveDate,
        justification: &str,
        actor: &str,
        event_id: &str,
    ) -> Self {
        Self {
            history_id: 0,
            order_id,
            entry_kind: HistoryEntryKind::Postponement,
            prior_value: prior.map(|d| d.format("%Y-%m-%d").to_string()),
            new_value: new.format("%Y-%m-%d").to_string(),
            justification: justification.to_string(),
            actor: actor.to_string(),
            event_id: Some(event_id.to_string()),
            created_at: chrono::Local::now().naive_local(),
        }
    }
}
