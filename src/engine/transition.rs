// ==========================================
// MedEquip OMS - status-transition guard
// ==========================================
// Transition table is permissive: any status may move to any other status,
// gated only by a non-empty justification. Terminal statuses stamp
// closed_at; leaving the terminal set clears it (closed_at is set iff the
// current status is terminal).
// ==========================================

use crate::domain::activity_log::ActivityLogEntry;
use crate::domain::status_history::StatusHistoryEntry;
use crate::domain::types::{OperationKind, OrderStatus};
use crate::domain::work_order::WorkOrder;
use crate::engine::audit::AuditTrail;
use crate::engine::error::{GuardError, GuardResult};
use crate::repository::work_order_repo::WorkOrderRepository;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// StateTransitionGuard
// ==========================================
pub struct StateTransitionGuard {
    order_repo: Arc<WorkOrderRepository>,
    audit: AuditTrail,
}

impl StateTransitionGuard {
    pub fn new(order_repo: Arc<WorkOrderRepository>, audit: AuditTrail) -> Self {
        Self { order_repo, audit }
    }

    /// Apply a status transition
    ///
    /// Sequence: validate -> load -> write order + history row in one
    /// transaction -> best-effort audit entry. A rejected call leaves no
    /// trace: no order change, no history row, no audit row.
    #[instrument(skip(self, justification, source_addr))]
    pub async fn change_status(
        &self,
        order_id: i64,
        new_status: OrderStatus,
        justification: &str,
        actor: &str,
        source_addr: Option<&str>,
    ) -> GuardResult<WorkOrder> {
        let justification = justification.trim();
        if justification.is_empty() {
            return Err(GuardError::EmptyJustification);
        }

        let order = self
            .order_repo
            .find_by_id(order_id)?
            .ok_or(GuardError::OrderNotFound(order_id))?;

        let prior_status = order.status;
        let now = chrono::Local::now().naive_local();
        let actor = effective_actor(actor);

        let mut updated = order.clone();
        updated.status = new_status;
        updated.updated_at = now;
        if new_status.is_terminal() {
            // set exactly once while the order stays closed
            if updated.closed_at.is_none() {
                updated.closed_at = Some(now);
            }
        } else {
            updated.closed_at = None;
        }

        let event_id = uuid::Uuid::new_v4().to_string();
        let history = StatusHistoryEntry::status_change(
            order_id,
            prior_status,
            new_status,
            justification,
            &actor,
            &event_id,
        );

        self.order_repo.apply_status_change(&updated, &history)?;

        tracing::info!(
            "work order {} moved {} -> {} by {}",
            order_id,
            prior_status,
            new_status,
            actor
        );

        let mut entry = ActivityLogEntry::new(
            OperationKind::Update,
            "work_order",
            &order_id.to_string(),
            "Cambio de estado de orden de trabajo",
            &actor,
        )
        .with_event_id(&event_id)
        .with_description(&format!("{} → {} | {}", prior_status, new_status, justification))
        .with_before(&order)
        .with_after(&updated);
        if let Some(addr) = source_addr {
            entry = entry.with_source_addr(addr);
        }
        self.audit.record(entry).await;

        Ok(updated)
    }
}

/// Blank actors fall back to "system"
pub(crate) fn effective_actor(actor: &str) -> String {
    let trimmed = actor.trim();
    if trimmed.is_empty() {
        "system".to_string()
    } else {
        trimmed.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_actor_fallback() {
        assert_eq!(effective_actor("  "), "system");
        assert_eq!(effective_actor(""), "system");
        assert_eq!(effective_actor(" mgarcia "), "mgarcia");
    }
}
