// ==========================================
// MedEquip OMS - urgency scoring engine
// ==========================================
// Pure function: (order snapshot, modality flag, today) -> integer score.
// The score orders the active listing and is recomputed on every read; it
// is never persisted. The same order scores differently on different days.
// ==========================================

use crate::domain::types::{ManualPriority, OrderStatus};
use crate::domain::work_order::WorkOrder;
use chrono::NaiveDate;
use serde::Serialize;
use serde_json::json;

/// Every order starts from this base before the additive terms
pub const BASE_SCORE: i64 = 50;

/// Bonus for equipment whose modality carries the high-priority flag
pub const MODALITY_BONUS: i64 = 50;

// ==========================================
// PriorityScorer
// ==========================================
// Stateless and re-entrant; safe for unlimited concurrent use.
pub struct PriorityScorer;

impl PriorityScorer {
    pub fn new() -> Self {
        Self
    }

    // ==========================================
    // Core scoring
    // ==========================================

    /// Compute the urgency score
    ///
    /// Total and deterministic: same inputs and same `today` always produce
    /// the same integer, and no input can make it fail.
    pub fn score(&self, order: &WorkOrder, modality_high_priority: bool, today: NaiveDate) -> i64 {
        self.score_breakdown(order, modality_high_priority, today).total
    }

    /// Compute the score together with its components (explainability)
    pub fn score_breakdown(
        &self,
        order: &WorkOrder,
        modality_high_priority: bool,
        today: NaiveDate,
    ) -> ScoreBreakdown {
        let manual_priority_weight = Self::manual_priority_weight(order.manual_priority);

        let days_remaining = order.due_date.map(|due| (due - today).num_days());
        let due_date_urgency = days_remaining.map_or(0, Self::due_date_urgency);

        let modality_bonus = if modality_high_priority { MODALITY_BONUS } else { 0 };
        let status_bonus = Self::status_bonus(order.status);

        let total =
            BASE_SCORE + manual_priority_weight + due_date_urgency + modality_bonus + status_bonus;

        ScoreBreakdown {
            base: BASE_SCORE,
            manual_priority_weight,
            days_remaining,
            due_date_urgency,
            modality_bonus,
            status_bonus,
            total,
        }
    }

    // ==========================================
    // Component terms
    // ==========================================

    /// Weight of the coordinator-assigned priority
    fn manual_priority_weight(priority: ManualPriority) -> i64 {
        match priority {
            ManualPriority::Critical => 100,
            ManualPriority::High => 75,
            ManualPriority::Medium => 50,
            ManualPriority::Low => 25,
        }
    }

    /// Due-date urgency tier from days remaining (both dates at day
    /// granularity)
    ///
    /// Overdue orders grow without bound: +10 per day late on top of the
    /// overdue floor, so nothing overdue can be buried by fresher work.
    fn due_date_urgency(days_remaining: i64) -> i64 {
        match days_remaining {
            d if d < 0 => 150 + 10 * d.abs(),
            0 => 120,
            1 => 100,
            2..=3 => 80 - 10 * (days_remaining - 1),
            4..=7 => 50 - 5 * (days_remaining - 4),
            8..=14 => 20 - 2 * (days_remaining - 7),
            _ => 0,
        }
    }

    /// Small nudge for orders that still need attention to start or finish
    fn status_bonus(status: OrderStatus) -> i64 {
        match status {
            OrderStatus::Open => 20,
            OrderStatus::InProgress => 10,
            _ => 0,
        }
    }
}

impl Default for PriorityScorer {
    fn default() -> Self {
        Self::new()
    }
}

// ==========================================
// ScoreBreakdown
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ScoreBreakdown {
    pub base: i64,
    pub manual_priority_weight: i64,
    pub days_remaining: Option<i64>,
    pub due_date_urgency: i64,
    pub modality_bonus: i64,
    pub status_bonus: i64,
    pub total: i64,
}

impl ScoreBreakdown {
    /// JSON reason string for logs and diagnostics
    pub fn reason_json(&self) -> String {
        json!({
            "total": self.total,
            "components": {
                "base": self.base,
                "manual_priority": self.manual_priority_weight,
                "due_date_urgency": self.due_date_urgency,
                "modality_bonus": self.modality_bonus,
                "status_bonus": self.status_bonus,
            },
            "days_remaining": self.days_remaining,
        })
        .to_string()
    }
}

// ==========================================
// Unit tests
// ==========================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    /// Reference date: 2026-08-06
    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 6).unwrap()
    }

    /// High priority, Open, no modality flag: 50 + 75 + 20 = 145 before the
    /// due-date term (the reference configuration of the boundary table)
    fn base_order() -> WorkOrder {
        let mut order = WorkOrder::new(1, 1);
        order.order_id = 100;
        order.manual_priority = ManualPriority::High;
        order.status = OrderStatus::Open;
        order
    }

    #[test]
    fn test_due_date_boundary_table() {
        // (days_remaining, expected total) for the 145-point reference order
        let cases: [(i64, i64); 9] = [
            (-1, 305),
            (0, 265),
            (1, 245),
            (2, 215),
            (3, 205),
            (7, 180),
            (8, 163),
            (14, 151),
            (15, 145),
        ];

        let scorer = PriorityScorer::new();
        for (days, expected) in cases {
            let mut order = base_order();
            order.due_date = Some(today() + Duration::days(days));
            let score = scorer.score(&order, false, today());
            assert_eq!(score, expected, "days_remaining={} should score {}", days, expected);
        }
    }

    #[test]
    fn test_overdue_growth_is_unbounded() {
        let scorer = PriorityScorer::new();

        let mut order = base_order();
        order.due_date = Some(today() - Duration::days(30));
        let month_late = scorer.score(&order, false, today());

        order.due_date = Some(today() - Duration::days(31));
        let month_and_day_late = scorer.score(&order, false, today());

        assert_eq!(month_late, 145 + 150 + 300);
        assert_eq!(month_and_day_late - month_late, 10);
    }

    #[test]
    fn test_manual_priority_weights() {
        let scorer = PriorityScorer::new();
        let mut order = base_order();
        order.status = OrderStatus::Assigned; // no status bonus

        let expectations = [
            (ManualPriority::Critical, 50 + 100),
            (ManualPriority::High, 50 + 75),
            (ManualPriority::Medium, 50 + 50),
            (ManualPriority::Low, 50 + 25),
        ];
        for (priority, expected) in expectations {
            order.manual_priority = priority;
            assert_eq!(scorer.score(&order, false, today()), expected);
        }
    }

    #[test]
    fn test_modality_flag_adds_fifty() {
        let scorer = PriorityScorer::new();
        let order = base_order();

        let without = scorer.score(&order, false, today());
        let with = scorer.score(&order, true, today());
        assert_eq!(with - without, MODALITY_BONUS);
    }

    #[test]
    fn test_status_bonus() {
        let scorer = PriorityScorer::new();
        let mut order = base_order();

        order.status = OrderStatus::Open;
        assert_eq!(scorer.score(&order, false, today()), 145);

        order.status = OrderStatus::InProgress;
        assert_eq!(scorer.score(&order, false, today()), 135);

        order.status = OrderStatus::OnHold;
        assert_eq!(scorer.score(&order, false, today()), 125);

        order.status = OrderStatus::Assigned;
        assert_eq!(scorer.score(&order, false, today()), 125);
    }

    #[test]
    fn test_missing_due_date_contributes_nothing() {
        let scorer = PriorityScorer::new();
        let order = base_order();
        assert!(order.due_date.is_none());
        assert_eq!(scorer.score(&order, false, today()), 145);
    }

    #[test]
    fn test_score_is_deterministic() {
        let scorer = PriorityScorer::new();
        let mut order = base_order();
        order.due_date = Some(today() + Duration::days(2));

        let first = scorer.score(&order, true, today());
        for _ in 0..10 {
            assert_eq!(scorer.score(&order, true, today()), first);
        }
    }

    #[test]
    fn test_score_depends_on_evaluation_date() {
        // The same order scores differently on different days: the score is
        // a derived value, not a stored fact.
        let scorer = PriorityScorer::new();
        let mut order = base_order();
        order.due_date = Some(today() + Duration::days(3));

        let scored_today = scorer.score(&order, false, today());
        let scored_tomorrow = scorer.score(&order, false, today() + Duration::days(1));
        assert!(scored_tomorrow > scored_today);
    }

    #[test]
    fn test_breakdown_components_sum_to_total() {
        let scorer = PriorityScorer::new();
        let mut order = base_order();
        order.due_date = Some(today() + Duration::days(5));

        let breakdown = scorer.score_breakdown(&order, true, today());
        assert_eq!(
            breakdown.total,
            breakdown.base
                + breakdown.manual_priority_weight
                + breakdown.due_date_urgency
                + breakdown.modality_bonus
                + breakdown.status_bonus
        );
        assert_eq!(breakdown.days_remaining, Some(5));

        let reason = breakdown.reason_json();
        assert!(reason.contains("\"total\""));
        assert!(reason.contains("\"due_date_urgency\""));
    }
}
