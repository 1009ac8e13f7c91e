// ==========================================
// Status-transition guard tests
// ==========================================
// Coverage:
// 1. justification enforcement (rejection leaves no trace)
// 2. terminal transitions stamp closed_at and append exactly one history row
// 3. permissive any-to-any policy, including reopening
// 4. audit failures never block the mutation
// ==========================================

mod test_helpers;

use std::sync::Arc;

use async_trait::async_trait;
use medequip_oms::domain::activity_log::ActivityLogEntry;
use medequip_oms::domain::types::{HistoryEntryKind, OrderStatus};
use medequip_oms::engine::{ActivityRecorder, AuditTrail, GuardError};
use test_helpers::TestEnv;

#[tokio::test]
async fn test_empty_justification_is_rejected_without_side_effects() {
    let env = TestEnv::new();
    let order_id = env.create_order(env.plain_equipment_id, |o| o);

    let result = env
        .transition_guard()
        .change_status(order_id, OrderStatus::Completed, "", "jlopez", None)
        .await;

    assert!(matches!(result, Err(GuardError::EmptyJustification)));

    // no mutation, no history, no audit row
    let order = env.load_order(order_id);
    assert_eq!(order.status, OrderStatus::Open);
    assert!(order.closed_at.is_none());
    assert_eq!(env.history_repo.count_by_order(order_id).unwrap(), 0);
    assert_eq!(env.activity_repo.count().unwrap(), 0);
}

#[tokio::test]
async fn test_whitespace_justification_is_rejected() {
    let env = TestEnv::new();
    let order_id = env.create_order(env.plain_equipment_id, |o| o);

    let result = env
        .transition_guard()
        .change_status(order_id, OrderStatus::Cancelled, "   \t ", "jlopez", None)
        .await;

    assert!(matches!(result, Err(GuardError::EmptyJustification)));
    assert_eq!(env.history_repo.count_by_order(order_id).unwrap(), 0);
}

#[tokio::test]
async fn test_unknown_order_is_rejected() {
    let env = TestEnv::new();

    let result = env
        .transition_guard()
        .change_status(9999, OrderStatus::Assigned, "asignación inicial", "jlopez", None)
        .await;

    assert!(matches!(result, Err(GuardError::OrderNotFound(9999))));
}

#[tokio::test]
async fn test_terminal_transition_stamps_closed_at_and_one_history_row() {
    let env = TestEnv::new();
    let order_id = env.create_order(env.plain_equipment_id, |o| o);

    let updated = env
        .transition_guard()
        .change_status(
            order_id,
            OrderStatus::Cancelled,
            "solicitud del cliente",
            "mgarcia",
            Some("10.0.0.8"),
        )
        .await
        .expect("transition accepted");

    assert_eq!(updated.status, OrderStatus::Cancelled);
    assert!(updated.closed_at.is_some());

    // persisted, not just returned
    let stored = env.load_order(order_id);
    assert_eq!(stored.status, OrderStatus::Cancelled);
    assert!(stored.closed_at.is_some());

    // exactly one history row with the right shape
    let history = env.history_repo.find_by_order(order_id).unwrap();
    assert_eq!(history.len(), 1);
    let entry = &history[0];
    assert_eq!(entry.entry_kind, HistoryEntryKind::StatusChange);
    assert_eq!(entry.prior_value.as_deref(), Some("OPEN"));
    assert_eq!(entry.new_value, "CANCELLED");
    assert_eq!(entry.justification, "solicitud del cliente");
    assert_eq!(entry.actor, "mgarcia");
}

#[tokio::test]
async fn test_non_terminal_transition_leaves_closed_at_unset() {
    let env = TestEnv::new();
    let order_id = env.create_order(env.plain_equipment_id, |o| o);

    let updated = env
        .transition_guard()
        .change_status(order_id, OrderStatus::InProgress, "técnico en sitio", "jlopez", None)
        .await
        .unwrap();

    assert_eq!(updated.status, OrderStatus::InProgress);
    assert!(updated.closed_at.is_none());
}

#[tokio::test]
async fn test_reopening_a_cancelled_order_is_allowed_and_clears_closed_at() {
    // any-to-any policy: leaving the terminal set is legal with a
    // justification, and the closed_at stamp goes away with it
    let env = TestEnv::new();
    let order_id = env.create_order(env.plain_equipment_id, |o| o);
    let guard = env.transition_guard();

    guard
        .change_status(order_id, OrderStatus::Cancelled, "cancelada por error", "mgarcia", None)
        .await
        .unwrap();
    assert!(env.load_order(order_id).closed_at.is_some());

    let reopened = guard
        .change_status(order_id, OrderStatus::Open, "reapertura: cancelación errónea", "mgarcia", None)
        .await
        .unwrap();

    assert_eq!(reopened.status, OrderStatus::Open);
    assert!(reopened.closed_at.is_none());
    assert!(env.load_order(order_id).closed_at.is_none());
    assert_eq!(env.history_repo.count_by_order(order_id).unwrap(), 2);
}

#[tokio::test]
async fn test_terminal_to_terminal_keeps_the_original_stamp() {
    let env = TestEnv::new();
    let order_id = env.create_order(env.plain_equipment_id, |o| o);
    let guard = env.transition_guard();

    let closed = guard
        .change_status(order_id, OrderStatus::Closed, "trabajo terminado", "jlopez", None)
        .await
        .unwrap();
    let first_stamp = closed.closed_at.expect("stamped on close");

    let completed = guard
        .change_status(order_id, OrderStatus::Completed, "reclasificación administrativa", "mgarcia", None)
        .await
        .unwrap();

    assert_eq!(completed.status, OrderStatus::Completed);
    assert_eq!(completed.closed_at, Some(first_stamp));
}

#[tokio::test]
async fn test_audit_row_correlates_with_history_row() {
    let env = TestEnv::new();
    let order_id = env.create_order(env.plain_equipment_id, |o| o);

    env.transition_guard()
        .change_status(order_id, OrderStatus::Assigned, "asignada a jlopez", "coordinacion", None)
        .await
        .unwrap();

    let history = env.history_repo.find_by_order(order_id).unwrap();
    let activity = env
        .activity_repo
        .find_by_entity("work_order", &order_id.to_string())
        .unwrap();

    assert_eq!(history.len(), 1);
    assert_eq!(activity.len(), 1);
    assert_eq!(history[0].event_id.as_deref(), Some(activity[0].event_id.as_str()));
    assert!(activity[0].before_json.is_some());
    assert!(activity[0].after_json.is_some());
    assert!(activity[0].description.as_deref().unwrap().contains("OPEN → ASSIGNED"));
}

// ==========================================
// Audit failure injection
// ==========================================

struct FailingRecorder;

#[async_trait]
impl ActivityRecorder for FailingRecorder {
    async fn record(
        &self,
        _entry: ActivityLogEntry,
    ) -> Result<i64, Box<dyn std::error::Error + Send + Sync>> {
        Err("activity store unreachable".into())
    }
}

#[tokio::test]
async fn test_audit_failure_does_not_block_the_transition() {
    let env = TestEnv::new();
    let order_id = env.create_order(env.plain_equipment_id, |o| o);

    let guard = env.transition_guard_with_audit(AuditTrail::with_recorder(Arc::new(FailingRecorder)));

    let updated = guard
        .change_status(order_id, OrderStatus::Completed, "trabajo terminado", "jlopez", None)
        .await
        .expect("mutation succeeds despite the audit failure");

    assert_eq!(updated.status, OrderStatus::Completed);
    assert!(updated.closed_at.is_some());

    // the primary writes landed
    assert_eq!(env.load_order(order_id).status, OrderStatus::Completed);
    assert_eq!(env.history_repo.count_by_order(order_id).unwrap(), 1);
    // and nothing reached the activity log
    assert_eq!(env.activity_repo.count().unwrap(), 0);
}
