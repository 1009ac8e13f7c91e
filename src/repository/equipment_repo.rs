// ==========================================
// MedEquip OMS - equipment/inventory repository
// ==========================================
// Reference data the engines read: equipment, its modality (with the
// high-priority flag the scorer consumes) and the owning client.
// Intake of this data is collaborator-owned CRUD; the inserts here exist
// for seeding and tests.
// ==========================================

use crate::domain::work_order::{Client, Equipment, Modality};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::work_order_repo::{fmt_datetime, parse_datetime_col};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

// ==========================================
// EquipmentRepository
// ==========================================
pub struct EquipmentRepository {
    conn: Arc<Mutex<Connection>>,
}

impl EquipmentRepository {
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // Writes (seed/test support)
    // ==========================================

    pub fn insert_client(&self, name: &str, contact: Option<&str>) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO client (name, contact, created_at) VALUES (?, ?, ?)",
            params![name, contact, fmt_datetime(chrono::Local::now().naive_local())],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_modality(&self, name: &str, high_priority_flag: bool) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            "INSERT INTO modality (name, high_priority_flag, created_at) VALUES (?, ?, ?)",
            params![
                name,
                if high_priority_flag { 1 } else { 0 },
                fmt_datetime(chrono::Local::now().naive_local()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    pub fn insert_equipment(
        &self,
        client_id: i64,
        modality_id: i64,
        name: &str,
        serial_no: Option<&str>,
        location: Option<&str>,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"INSERT INTO equipment (client_id, modality_id, name, serial_no, location, created_at)
               VALUES (?, ?, ?, ?, ?, ?)"#,
            params![
                client_id,
                modality_id,
                name,
                serial_no,
                location,
                fmt_datetime(chrono::Local::now().naive_local()),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    // ==========================================
    // Reads
    // ==========================================

    /// Equipment together with its modality (scorer inputs)
    pub fn find_with_modality(
        &self,
        equipment_id: i64,
    ) -> RepositoryResult<Option<(Equipment, Modality)>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            r#"SELECT e.equipment_id, e.client_id, e.modality_id, e.name, e.serial_no,
                      e.location, e.created_at,
                      m.modality_id, m.name, m.high_priority_flag, m.created_at
               FROM equipment e
               JOIN modality m ON m.modality_id = e.modality_id
               WHERE e.equipment_id = ?"#,
        )?;

        let mut rows = stmt.query_map(params![equipment_id], |row| {
            let equipment = Equipment {
                equipment_id: row.get(0)?,
                client_id: row.get(1)?,
                modality_id: row.get(2)?,
                name: row.get(3)?,
                serial_no: row.get(4)?,
                location: row.get(5)?,
                created_at: parse_datetime_col(row, 6)?,
            };
            let modality = Modality {
                modality_id: row.get(7)?,
                name: row.get(8)?,
                high_priority_flag: row.get::<_, i64>(9)? != 0,
                created_at: parse_datetime_col(row, 10)?,
            };
            Ok((equipment, modality))
        })?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }

    pub fn find_client(&self, client_id: i64) -> RepositoryResult<Option<Client>> {
        let conn = self.get_conn()?;

        let mut stmt = conn.prepare(
            "SELECT client_id, name, contact, created_at FROM client WHERE client_id = ?",
        )?;

        let mut rows = stmt.query_map(params![client_id], |row| {
            Ok(Client {
                client_id: row.get(0)?,
                name: row.get(1)?,
                contact: row.get(2)?,
                created_at: parse_datetime_col(row, 3)?,
            })
        })?;

        match rows.next() {
            Some(row) => Ok(Some(row?)),
            None => Ok(None),
        }
    }
}
