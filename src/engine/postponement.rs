// ==========================================
// MedEquip OMS - due-date postponement guard
// ==========================================
// Rules: closed orders cannot be postponed, and the new date can never lie
// in the past. The new date MAY be earlier than the prior due date; only
// "earlier than today" is rejected.
// ==========================================

use crate::domain::activity_log::ActivityLogEntry;
use crate::domain::status_history::StatusHistoryEntry;
use crate::domain::types::OperationKind;
use crate::domain::work_order::WorkOrder;
use crate::engine::audit::AuditTrail;
use crate::engine::error::{GuardError, GuardResult};
use crate::engine::transition::effective_actor;
use crate::repository::work_order_repo::WorkOrderRepository;
use chrono::NaiveDate;
use std::sync::Arc;
use tracing::instrument;

// ==========================================
// PostponementGuard
// ==========================================
pub struct PostponementGuard {
    order_repo: Arc<WorkOrderRepository>,
    audit: AuditTrail,
}

impl PostponementGuard {
    pub fn new(order_repo: Arc<WorkOrderRepository>, audit: AuditTrail) -> Self {
        Self { order_repo, audit }
    }

    /// Move the due date of an open order
    ///
    /// Sequence mirrors the transition guard: validate -> load -> write
    /// order + POSTPONEMENT history row in one transaction -> best-effort
    /// audit entry.
    #[instrument(skip(self, justification, source_addr))]
    pub async fn postpone_due_date(
        &self,
        order_id: i64,
        new_due_date: NaiveDate,
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

        if order.status.is_terminal() {
            return Err(GuardError::TerminalOrder {
                order_id,
                status: order.status,
            });
        }

        let today = chrono::Local::now().date_naive();
        if new_due_date < today {
            return Err(GuardError::DueDateInPast(new_due_date));
        }

        let prior_due_date = order.due_date;
        let actor = effective_actor(actor);

        let mut updated = order.clone();
        updated.due_date = Some(new_due_date);
        updated.updated_at = chrono::Local::now().naive_local();

        let event_id = uuid::Uuid::new_v4().to_string();
        let history = StatusHistoryEntry::postponement(
            order_id,
            prior_due_date,
            new_due_date,
            justification,
            &actor,
            &event_id,
        );

        self.order_repo.apply_due_date_change(&updated, &history)?;

        let prior_label = prior_due_date
            .map(|d| d.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "sin fecha".to_string());

        tracing::info!(
            "work order {} due date moved {} -> {} by {}",
            order_id,
            prior_label,
            new_due_date,
            actor
        );

        let mut entry = ActivityLogEntry::new(
            OperationKind::Update,
            "work_order",
            &order_id.to_string(),
            "Posposición de fecha de vencimiento",
            &actor,
        )
        .with_event_id(&event_id)
        .with_description(&format!("{} → {} | {}", prior_label, new_due_date, justification))
        .with_before(&order)
        .with_after(&updated);
        if let Some(addr) = source_addr {
            entry = entry.with_source_addr(addr);
        }
        self.audit.record(entry).await;

        Ok(updated)
    }
}
