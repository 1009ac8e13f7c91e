// ==========================================
// MedEquip OMS - work-order repository
// ==========================================
// Data mapping only, no business rules. The guarded mutations write the
// order row and its status_history row inside one transaction so an
// accepted mutation can never leave the order updated without its history
// row (or the reverse).
// ==========================================

use crate::domain::status_history::StatusHistoryEntry;
use crate::domain::types::{ManualPriority, OrderStatus};
use crate::domain::work_order::WorkOrder;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{params, params_from_iter, Connection, Transaction};
use rusqlite::types::Value;
use std::sync::{Arc, Mutex};

/// Optional filters for the active listing; all are collaborator-supplied
/// and combined with AND
#[derive(Debug, Clone, Default)]
pub struct ActiveOrderFilter {
    pub status: Option<OrderStatus>,
    pub priority: Option<ManualPriority>,
    pub search: Option<String>,
}

/// One row of the active listing: the order plus the display context the
/// scorer and the views need (joined in a single query)
#[derive(Debug, Clone)]
pub struct ActiveOrderRow {
    pub order: WorkOrder,
    pub equipment_name: String,
    pub client_name: String,
    pub modality_name: String,
    pub modality_high_priority: bool,
}

// ==========================================
// WorkOrderRepository
// ==========================================
pub struct WorkOrderRepository {
    conn: Arc<Mutex<Connection>>,
}

impl WorkOrderRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Writes
    // ==========================================

    /// Insert a new work order, returning the assigned id
    pub fn create(&self, order: &WorkOrder) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        conn.execute(
            r#"
            INSERT INTO work_order (
                equipment_id, client_id, contract_id, status, manual_priority,
                reported_fault, origin, opened_at, closed_at, due_date,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
            params![
                order.equipment_id,
                order.client_id,
                order.contract_id,
                order.status.to_db_str(),
                order.manual_priority.to_db_str(),
                order.reported_fault,
                order.origin,
                fmt_datetime(order.opened_at),
                order.closed_at.map(fmt_datetime),
                order.due_date.map(fmt_date),
                fmt_datetime(order.created_at),
                fmt_datetime(order.updated_at),
            ],
        )?;

        Ok(conn.last_insert_rowid())
    }

    /// Persist an accepted status transition together with its history row
    ///
    /// The order row carries the already-validated new status / closed_at /
    /// updated_at; both writes commit atomically.
    pub fn apply_status_change(
        &self,
        order: &WorkOrder,
        history: &StatusHistoryEntry,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE work_order SET status = ?1, closed_at = ?2, updated_at = ?3 WHERE order_id = ?4",
            params![
                order.status.to_db_str(),
                order.closed_at.map(fmt_datetime),
                fmt_datetime(order.updated_at),
                order.order_id,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "WorkOrder".to_string(),
                id: order.order_id.to_string(),
            });
        }

        insert_history(&tx, history)?;
        tx.commit()?;
        Ok(())
    }

    /// Persist an accepted due-date change together with its history row
    pub fn apply_due_date_change(
        &self,
        order: &WorkOrder,
        history: &StatusHistoryEntry,
    ) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let rows = tx.execute(
            "UPDATE work_order SET due_date = ?1, updated_at = ?2 WHERE order_id = ?3",
            params![
                order.due_date.map(fmt_date),
                fmt_datetime(order.updated_at),
                order.order_id,
            ],
        )?;

        if rows == 0 {
            return Err(RepositoryError::NotFound {
                entity: "WorkOrder".to_string(),
                id: order.order_id.to_string(),
            });
        }

        insert_history(&tx, history)?;
        tx.commit()?;
        Ok(())
    }

    // ==========================================
    // Reads
    // ==========================================

    /// Load one order by id
    pub fn find_by_id(&self, order_id: i64) -> RepositoryResult<Option<WorkOrder>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT order_id, equipment_id, client_id, contract_id, status,
                      manual_priority, reported_fault, origin, opened_at,
                      closed_at, due_date, created_at, updated_at
               FROM work_order
               WHERE order_id = ?"#,
        )?;

        let mut rows = stmt.query_map(params![order_id], map_order_row)?;
        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    /// Active listing page: non-terminal orders, optional filters, joined
    /// with equipment/client/modality display context
    ///
    /// Filtering and LIMIT/OFFSET happen here, before scoring; the caller
    /// scores and sorts the returned page.
    pub fn find_active_paged(
        &self,
        filter: &ActiveOrderFilter,
        limit: i64,
        offset: i64,
    ) -> RepositoryResult<Vec<ActiveOrderRow>> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            r#"SELECT w.order_id, w.equipment_id, w.client_id, w.contract_id, w.status,
                      w.manual_priority, w.reported_fault, w.origin, w.opened_at,
                      w.closed_at, w.due_date, w.created_at, w.updated_at,
                      e.name, c.name, m.name, m.high_priority_flag
               FROM work_order w
               JOIN equipment e ON e.equipment_id = w.equipment_id
               JOIN client c ON c.client_id = w.client_id
               JOIN modality m ON m.modality_id = e.modality_id
               WHERE UPPER(w.status) NOT IN ('CLOSED', 'COMPLETED', 'CANCELLED')"#,
        );

        let mut sql_params: Vec<Value> = Vec::new();
        append_filter_clauses(&mut sql, &mut sql_params, filter);

        sql.push_str(" ORDER BY w.order_id ASC LIMIT ? OFFSET ?");
        sql_params.push(Value::Integer(limit));
        sql_params.push(Value::Integer(offset));

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(sql_params), |row| {
                Ok(ActiveOrderRow {
                    order: map_order_row(row)?,
                    equipment_name: row.get(13)?,
                    client_name: row.get(14)?,
                    modality_name: row.get(15)?,
                    modality_high_priority: row.get::<_, i64>(16)? != 0,
                })
            })?
            .collect::<Result<Vec<ActiveOrderRow>, _>>()?;

        Ok(rows)
    }

    /// Total count of active orders under the same filters (pagination)
    pub fn count_active(&self, filter: &ActiveOrderFilter) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;

        let mut sql = String::from(
            r#"SELECT COUNT(*)
               FROM work_order w
               WHERE UPPER(w.status) NOT IN ('CLOSED', 'COMPLETED', 'CANCELLED')"#,
        );

        let mut sql_params: Vec<Value> = Vec::new();
        append_filter_clauses(&mut sql, &mut sql_params, filter);

        let count: i64 =
            conn.query_row(&sql, params_from_iter(sql_params), |row| row.get(0))?;
        Ok(count)
    }
}

// ==========================================
// Shared SQL fragments and row mapping
// ==========================================

fn append_filter_clauses(sql: &mut String, sql_params: &mut Vec<Value>, filter: &ActiveOrderFilter) {
    if let Some(status) = filter.status {
        sql.push_str(" AND w.status = ?");
        sql_params.push(Value::Text(status.to_db_str().to_string()));
    }
    if let Some(priority) = filter.priority {
        sql.push_str(" AND w.manual_priority = ?");
        sql_params.push(Value::Text(priority.to_db_str().to_string()));
    }
    if let Some(search) = filter.search.as_deref() {
        let term = search.trim();
        if !term.is_empty() {
            sql.push_str(" AND CAST(w.order_id AS TEXT) LIKE ?");
            sql_params.push(Value::Text(format!("%{}%", term)));
        }
    }
}

fn map_order_row(row: &rusqlite::Row) -> rusqlite::Result<WorkOrder> {
    let status_raw: String = row.get(4)?;
    let status = OrderStatus::parse(&status_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            4,
            rusqlite::types::Type::Text,
            format!("unknown order status: {}", status_raw).into(),
        )
    })?;

    let priority_raw: String = row.get(5)?;
    let manual_priority = ManualPriority::parse(&priority_raw).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            5,
            rusqlite::types::Type::Text,
            format!("unknown manual priority: {}", priority_raw).into(),
        )
    })?;

    Ok(WorkOrder {
        order_id: row.get(0)?,
        equipment_id: row.get(1)?,
        client_id: row.get(2)?,
        contract_id: row.get(3)?,
        status,
        manual_priority,
        reported_fault: row.get(6)?,
        origin: row.get(7)?,
        opened_at: parse_datetime_col(row, 8)?,
        closed_at: parse_opt_datetime_col(row, 9)?,
        due_date: parse_opt_date_col(row, 10)?,
        created_at: parse_datetime_col(row, 11)?,
        updated_at: parse_datetime_col(row, 12)?,
    })
}

fn insert_history(tx: &Transaction, entry: &StatusHistoryEntry) -> RepositoryResult<()> {
    tx.execute(
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
    Ok(())
}

pub(crate) fn fmt_datetime(ts: NaiveDateTime) -> String {
    ts.format("%Y-%m-%d %H:%M:%S").to_string()
}

pub(crate) fn fmt_date(d: NaiveDate) -> String {
    d.format("%Y-%m-%d").to_string()
}

pub(crate) fn parse_datetime_col(row: &rusqlite::Row, idx: usize) -> rusqlite::Result<NaiveDateTime> {
    let raw: String = row.get(idx)?;
    NaiveDateTime::parse_from_str(&raw, "%Y-%m-%d %H:%M:%S").map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
    })
}

pub(crate) fn parse_opt_datetime_col(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<NaiveDateTime>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(s) => NaiveDateTime::parse_from_str(&s, "%Y-%m-%d %H:%M:%S")
            .map(Some)
            .map_err(|e| {
                rusqlite::Error::FromSqlConversionFailure(
                    idx,
                    rusqlite::types::Type::Text,
                    Box::new(e),
                )
            }),
        None => Ok(None),
    }
}

pub(crate) fn parse_opt_date_col(
    row: &rusqlite::Row,
    idx: usize,
) -> rusqlite::Result<Option<NaiveDate>> {
    let raw: Option<String> = row.get(idx)?;
    match raw {
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d").map(Some).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        }),
        None => Ok(None),
    }
}
