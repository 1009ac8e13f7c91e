// ==========================================
// MedEquip OMS - core library
// ==========================================
// Work-order prioritization & audited lifecycle engine
// Stack: Rust + SQLite
// Role: business core behind the HTTP/UI collaborators
// ==========================================

// Initialize internationalization (Spanish and English; the binaries switch
// to "es" at startup, English is the fallback)
rust_i18n::i18n!("locales", fallback = "en");

// ==========================================
// Module declarations
// ==========================================

// Domain layer - entities and types
pub mod domain;

// Repository layer - data access
pub mod repository;

// Engine layer - business rules
pub mod engine;

// Configuration layer
pub mod config;

// Database infrastructure (connection init / unified PRAGMAs / schema)
pub mod db;

// Logging
pub mod logging;

// Internationalization
pub mod i18n;

// API layer - business interfaces
pub mod api;

// ==========================================
// Core type re-exports
// ==========================================

// Domain types
pub use domain::types::{HistoryEntryKind, ManualPriority, OperationKind, OrderStatus};

// Domain entities
pub use domain::{ActivityLogEntry, Client, Equipment, Modality, StatusHistoryEntry, WorkOrder};

// Engines
pub use engine::{AuditTrail, PostponementGuard, PriorityScorer, StateTransitionGuard};

// API
pub use api::OrderApi;

// ==========================================
// Constants
// ==========================================

// System version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// System name
pub const APP_NAME: &str = "MedEquip OMS";

// Database schema version
pub const DB_VERSION: &str = "v0.1";
