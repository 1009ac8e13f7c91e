// ==========================================
// MedEquip OMS - domain layer
// ==========================================

pub mod activity_log;
pub mod status_history;
pub mod types;
pub mod work_order;

pub use activity_log::ActivityLogEntry;
pub use status_history::StatusHistoryEntry;
pub use work_order::{Client, Equipment, Modality, WorkOrder};
