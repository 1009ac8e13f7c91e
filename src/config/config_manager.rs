// ==========================================
// MedEquip OMS - configuration manager
// ==========================================
// Storage: config_kv table (key-value + scope). Holds the tunables the
// listing endpoint honors (pagination bounds) with in-code defaults when a
// key is absent.
// ==========================================

use crate::db::open_sqlite_connection;
use rusqlite::{params, Connection};
use std::error::Error;
use std::sync::{Arc, Mutex};

/// Default page size of the active listing
pub const DEFAULT_PAGE_LIMIT: i64 = 20;

/// Hard ceiling a caller-supplied limit is validated against
pub const MAX_PAGE_LIMIT: i64 = 100;

// ==========================================
// ConfigManager
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// Open from a database path
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Share an existing connection
    ///
    /// Re-applies the unified PRAGMAs (idempotent) so behavior matches a
    /// freshly opened connection.
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn
                .lock()
                .map_err(|e| format!("lock acquisition failure: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
        }
        Ok(Self { conn })
    }

    /// Read a config value from the global scope
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("lock acquisition failure: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// Read a global config value (public, for other modules)
    pub fn get_global_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        self.get_config_value(key)
    }

    /// Read a config value with a default
    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self
            .get_config_value(key)?
            .unwrap_or_else(|| default.to_string()))
    }

    /// Upsert a global config value
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| format!("lock acquisition failure: {}", e))?;

        conn.execute(
            r#"INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
               ON CONFLICT (scope_id, key) DO UPDATE SET value = excluded.value"#,
            params![key, value],
        )?;
        Ok(())
    }

    // ==========================================
    // Typed getters
    // ==========================================

    /// Page size used when the caller sends none
    pub fn default_page_limit(&self) -> Result<i64, Box<dyn Error>> {
        let raw = self.get_config_or_default("listing/default_page_limit", "20")?;
        Ok(raw.parse().unwrap_or(DEFAULT_PAGE_LIMIT))
    }

    /// Largest page size a caller may request
    pub fn max_page_limit(&self) -> Result<i64, Box<dyn Error>> {
        let raw = self.get_config_or_default("listing/max_page_limit", "100")?;
        Ok(raw.parse().unwrap_or(MAX_PAGE_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ensure_core_schema;

    fn setup() -> ConfigManager {
        let conn = Connection::open_in_memory().unwrap();
        ensure_core_schema(&conn).unwrap();
        ConfigManager::from_connection(Arc::new(Mutex::new(conn))).unwrap()
    }

    #[test]
    fn test_defaults_without_rows() {
        let config = setup();
        assert_eq!(config.default_page_limit().unwrap(), DEFAULT_PAGE_LIMIT);
        assert_eq!(config.max_page_limit().unwrap(), MAX_PAGE_LIMIT);
    }

    #[test]
    fn test_set_and_read_back() {
        let config = setup();
        config
            .set_global_config_value("listing/default_page_limit", "50")
            .unwrap();
        assert_eq!(config.default_page_limit().unwrap(), 50);

        // upsert overwrites
        config
            .set_global_config_value("listing/default_page_limit", "25")
            .unwrap();
        assert_eq!(config.default_page_limit().unwrap(), 25);
    }

    #[test]
    fn test_unparsable_value_falls_back() {
        let config = setup();
        config
            .set_global_config_value("listing/max_page_limit", "not-a-number")
            .unwrap();
        assert_eq!(config.max_page_limit().unwrap(), MAX_PAGE_LIMIT);
    }
}
