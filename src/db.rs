// ==========================================
// MedEquip OMS - SQLite connection setup
// ==========================================
// Goals:
// - Unify PRAGMA behavior for every Connection::open (no module opening
//   foreign keys while another leaves them off)
// - Unify busy_timeout to reduce sporadic busy errors under concurrent writes
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// Default busy_timeout (milliseconds)
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Schema version the current code expects
///
/// Used as a warning aid only (no automatic migration); prevents silently
/// running against an older database file.
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// Apply the unified PRAGMAs to a SQLite connection
///
/// - foreign_keys must be enabled per connection
/// - busy_timeout must be configured per connection
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// Open a SQLite connection with the unified configuration applied
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// Read schema_version (None when the table does not exist)
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

/// Create the core tables and indexes when they are missing (idempotent)
///
/// status_history and activity_log are append-only: nothing in this crate
/// updates or deletes their rows.
pub fn ensure_core_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER NOT NULL,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS client (
            client_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            contact TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS modality (
            modality_id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL UNIQUE,
            high_priority_flag INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS equipment (
            equipment_id INTEGER PRIMARY KEY AUTOINCREMENT,
            client_id INTEGER NOT NULL REFERENCES client(client_id),
            modality_id INTEGER NOT NULL REFERENCES modality(modality_id),
            name TEXT NOT NULL,
            serial_no TEXT,
            location TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS work_order (
            order_id INTEGER PRIMARY KEY AUTOINCREMENT,
            equipment_id INTEGER NOT NULL REFERENCES equipment(equipment_id),
            client_id INTEGER NOT NULL REFERENCES client(client_id),
            contract_id INTEGER,
            status TEXT NOT NULL DEFAULT 'OPEN',
            manual_priority TEXT NOT NULL DEFAULT 'MEDIUM',
            reported_fault TEXT,
            origin TEXT,
            opened_at TEXT NOT NULL,
            closed_at TEXT,
            due_date TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS status_history (
            history_id INTEGER PRIMARY KEY AUTOINCREMENT,
            order_id INTEGER NOT NULL REFERENCES work_order(order_id),
            entry_kind TEXT NOT NULL DEFAULT 'STATUS_CHANGE',
            prior_value TEXT,
            new_value TEXT NOT NULL,
            justification TEXT NOT NULL,
            actor TEXT NOT NULL,
            event_id TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS activity_log (
            log_id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id TEXT NOT NULL,
            operation TEXT NOT NULL,
            entity_name TEXT NOT NULL,
            entity_id TEXT NOT NULL,
            title TEXT NOT NULL,
            description TEXT,
            before_json TEXT,
            after_json TEXT,
            actor TEXT NOT NULL,
            source_addr TEXT,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS config_kv (
            scope_id TEXT NOT NULL,
            key TEXT NOT NULL,
            value TEXT NOT NULL,
            PRIMARY KEY (scope_id, key)
        );

        CREATE INDEX IF NOT EXISTS idx_work_order_status
          ON work_order(status);

        CREATE INDEX IF NOT EXISTS idx_work_order_due_date
          ON work_order(due_date);

        CREATE INDEX IF NOT EXISTS idx_status_history_order
          ON status_history(order_id, created_at);

        CREATE INDEX IF NOT EXISTS idx_activity_log_entity
          ON activity_log(entity_name, entity_id);

        INSERT INTO schema_version (version)
        SELECT 1 WHERE NOT EXISTS (SELECT 1 FROM schema_version WHERE version = 1);
        "#,
    )?;
    Ok(())
}
