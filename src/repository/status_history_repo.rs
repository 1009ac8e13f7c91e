// ==========================================
// MedEquip OMS - status-history repository
// ==========================================
// Append-only. The transactional insert that accompanies a guarded
// mutation lives in WorkOrderRepository; this repository serves reads and
// standalone appends.
// ==========================================

use crate::domain::status_history::StatusHistoryEntry;
use crate::domain::types::HistoryEntryKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::work_order_repo::{fmt_datetime, parse_datetime_col};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// StatusHistoryRepository
// ==========================================
pub struct StatusHistoryRepository {
    conn: Arc<Mutex<Connection>>,
}

impl StatusHistoryRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Append one history entry, returning the assigned id
    pub fn insert(&self, entry: &StatusHistoryEntry) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO status_history (
                order_id, entry_kind, prior_value, new_value,
                justification, actor, event_id, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                entry.order_id,
                entry.entry_kind.to_db_str(),
                entry.prior_value,
                entry.new_value,
                entry.justification,
                entry.actor,
                entry.event_id,
                fmt_datetime(entry.created_at),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// History of one order, most recent first
    pub fn find_by_order(&self, order_id: i64) -> RepositoryResult<Vec<StatusHistoryEntry>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT history_id, order_id, entry_kind, prior_value, new_value,
                      justification, actor, event_id, created_at
               FROM status_history
               WHERE order_id = ?
               ORDER BY created_at DESC, history_id DESC"#,
        )?;

        let entries = stmt
            .query_map(params![order_id], map_history_row)?
            .collect::<Result<Vec<StatusHistoryEntry>, _>>()?;

        Ok(entries)
    }

    /// Number of history rows for one order (test/diagnostic support)
    pub fn count_by_order(&self, order_id: i64) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM status_history WHERE order_id = ?",
            params![order_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

fn map_history_row(row: &rusqlite::Row) -> rusqlite::Result<StatusHistoryEntry> {
    let kind_raw: String = row.get(2)?;
    let entry_kind = HistoryEntryKind::parse(&kind_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown history entry kind: {}", kind_raw).into(),
        )
    })?;

    Ok(StatusHistoryEntry {
        history_id: row.get(0)?,
        order_id: row.get(1)?,
        entry_kind,
        prior_value: row.get(3)?,
        new_value: row.get(4)?,
        justification: row.get(5)?,
        actor: row.get(6)?,
        event_id: row.get(7)?,
        created_at: parse_datetime_col(row, 8)?,
    })
}
