// ==========================================
// MedEquip OMS - activity-log repository
// ==========================================
// Append-only generic audit rows. Repository does data mapping only; the
// best-effort failure policy lives in the AuditTrail, not here.
// ==========================================

use crate::domain::activity_log::ActivityLogEntry;
use crate::domain::types::OperationKind;
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::work_order_repo::{fmt_datetime, parse_datetime_col};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// ActivityLogRepository
// ==========================================
pub struct ActivityLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ActivityLogRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// Append one activity entry, returning the assigned id
    pub fn insert(&self, entry: &ActivityLogEntry) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO activity_log (
                event_id, operation, entity_name, entity_id, title,
                description, before_json, after_json, actor, source_addr,
                created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                entry.event_id,
                entry.operation.to_db_str(),
                entry.entity_name,
                entry.entity_id,
                entry.title,
                entry.description,
                entry.before_json.as_ref().map(|v| v.to_string()),
                entry.after_json.as_ref().map(|v| v.to_string()),
                entry.actor,
                entry.source_addr,
                fmt_datetime(entry.created_at),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Entries for one entity, most recent first
    pub fn find_by_entity(
        &self,
        entity_name: &str,
        entity_id: &str,
    ) -> RepositoryResult<Vec<ActivityLogEntry>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT log_id, event_id, operation, entity_name, entity_id, title,
                      description, before_json, after_json, actor, source_addr, created_at
               FROM activity_log
               WHERE entity_name = ? AND entity_id = ?
               ORDER BY created_at DESC, log_id DESC"#,
        )?;

        let entries = stmt
            .query_map(params![entity_name, entity_id], map_activity_row)?
            .collect::<Result<Vec<ActivityLogEntry>, _>>()?;

        Ok(entries)
    }

    /// Total number of activity rows (test/diagnostic support)
    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count: i64 =
            conn.query_row("SELECT COUNT(*) FROM activity_log", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn map_activity_row(row: &rusqlite::Row) -> rusqlite::Result<ActivityLogEntry> {
    let op_raw: String = row.get(2)?;
    let operation = OperationKind::parse(&op_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            format!("unknown operation kind: {}", op_raw).into(),
        )
    })?;

    let before_raw: Option<String> = row.get(7)?;
    let after_raw: Option<String> = row.get(8)?;

    Ok(ActivityLogEntry {
        log_id: row.get(0)?,
        event_id: row.get(1)?,
        operation,
        entity_name: row.get(3)?,
        entity_id: row.get(4)?,
        title: row.get(5)?,
        description: row.get(6)?,
        before_json: before_raw.and_then(|s| serde_json::from_str(&s).ok()),
        after_json: after_raw.and_then(|s| serde_json::from_str(&s).ok()),
        actor: row.get(9)?,
        source_addr: row.get(10)?,
        created_at: parse_datetime_col(row, 11)?,
    })
}
