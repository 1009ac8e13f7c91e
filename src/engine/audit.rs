// ==========================================
// MedEquip OMS - audit trail
// ==========================================
// Observability is not in the critical path: a recorder failure is logged
// and swallowed, never surfaced to the caller and never rolled into the
// primary mutation's transaction.
// ==========================================

use crate::domain::activity_log::ActivityLogEntry;
use crate::repository::activity_log_repo::ActivityLogRepository;
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;

// ==========================================
// Recorder trait
// ==========================================

/// Sink for activity-log entries
///
/// Engine layer defines the trait; the persistence adapter implements it.
/// Guards depend on AuditTrail, never on a concrete recorder.
#[async_trait]
pub trait ActivityRecorder: Send + Sync {
    /// Persist one entry, returning its assigned id
    async fn record(&self, entry: ActivityLogEntry) -> Result<i64, Box<dyn Error + Send + Sync>>;
}

/// SQLite-backed recorder
pub struct SqliteActivityRecorder {
    repo: Arc<ActivityLogRepository>,
}

impl SqliteActivityRecorder {
    pub fn new(repo: Arc<ActivityLogRepository>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl ActivityRecorder for SqliteActivityRecorder {
    async fn record(&self, entry: ActivityLogEntry) -> Result<i64, Box<dyn Error + Send + Sync>> {
        let id = self.repo.insert(&entry)?;
        Ok(id)
    }
}

/// Recorder that drops every entry (unit tests, tooling)
#[derive(Debug, Clone, Default)]
pub struct NoOpActivityRecorder;

#[async_trait]
impl ActivityRecorder for NoOpActivityRecorder {
    async fn record(&self, entry: ActivityLogEntry) -> Result<i64, Box<dyn Error + Send + Sync>> {
        tracing::debug!(
            "NoOpActivityRecorder: dropping entry - entity={} id={} op={}",
            entry.entity_name,
            entry.entity_id,
            entry.operation
        );
        Ok(0)
    }
}

// ==========================================
// AuditTrail
// ==========================================

/// Best-effort wrapper around an optional recorder
///
/// `record` never fails: errors are WARN-logged and swallowed so the
/// primary mutation (status change, postponement, CRUD elsewhere) is never
/// blocked or rolled back by an audit problem.
#[derive(Clone)]
pub struct AuditTrail {
    inner: Option<Arc<dyn ActivityRecorder>>,
}

impl AuditTrail {
    pub fn with_recorder(recorder: Arc<dyn ActivityRecorder>) -> Self {
        Self {
            inner: Some(recorder),
        }
    }

    /// Audit disabled (unit tests, tooling)
    pub fn none() -> Self {
        Self { inner: None }
    }

    pub fn is_configured(&self) -> bool {
        self.inner.is_some()
    }

    /// Record one entry, best-effort
    pub async fn record(&self, entry: ActivityLogEntry) {
        match &self.inner {
            Some(recorder) => {
                let entity = format!("{}#{}", entry.entity_name, entry.entity_id);
                if let Err(e) = recorder.record(entry).await {
                    tracing::warn!("activity log write failed (ignored): {} - {}", entity, e);
                }
            }
            None => {
                tracing::debug!(
                    "AuditTrail: no recorder configured, dropping entry - entity={} id={}",
                    entry.entity_name,
                    entry.entity_id
                );
            }
        }
    }
}

impl Default for AuditTrail {
    fn default() -> Self {
        Self::none()
    }
}
