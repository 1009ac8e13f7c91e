// ==========================================
// MedEquip OMS - configuration layer
// ==========================================

pub mod config_manager;

pub use config_manager::{ConfigManager, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT};

use std::path::PathBuf;

/// Default database path under the platform data directory
///
/// Falls back to the working directory when no data dir is available.
pub fn default_db_path() -> PathBuf {
    let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("medequip-oms").join("medequip_oms.db")
}
