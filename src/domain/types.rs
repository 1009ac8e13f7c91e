// ==========================================
// MedEquip OMS - domain type definitions
// ==========================================
// Work-order status and priority are closed, tagged enums. The storage
// format is SCREAMING_SNAKE_CASE; parsing also accepts the Spanish labels
// the legacy web client sends.
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// Order status
// ==========================================
// Transition policy is permissive (any status to any status, justification
// required); terminal statuses close the order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    Open,
    Assigned,
    InProgress,
    OnHold,
    Closed,
    Completed,
    Cancelled,
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl OrderStatus {
    /// All terminal statuses (the order is finished; closed_at is stamped)
    pub const TERMINAL: [OrderStatus; 3] =
        [OrderStatus::Closed, OrderStatus::Completed, OrderStatus::Cancelled];

    /// Whether this status ends the order lifecycle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            OrderStatus::Closed | OrderStatus::Completed | OrderStatus::Cancelled
        )
    }

    /// Parse a status string
    ///
    /// Case-insensitive; accepts the storage form ("IN_PROGRESS"), loose
    /// spellings ("in progress") and the Spanish labels the web client
    /// historically sent ("en proceso", "cerrada"). Unknown values are None
    /// and must be rejected at the boundary.
    pub fn parse(s: &str) -> Option<Self> {
        let normalized = s.trim().to_uppercase().replace([' ', '-'], "_");
        match normalized.as_str() {
            "OPEN" | "ABIERTA" | "ABIERTO" => Some(OrderStatus::Open),
            "ASSIGNED" | "ASIGNADA" | "ASIGNADO" => Some(OrderStatus::Assigned),
            "IN_PROGRESS" | "INPROGRESS" | "EN_PROCESO" | "EN_PROGRESO" => {
                Some(OrderStatus::InProgress)
            }
            "ON_HOLD" | "ONHOLD" | "EN_ESPERA" => Some(OrderStatus::OnHold),
            "CLOSED" | "CERRADA" | "CERRADO" => Some(OrderStatus::Closed),
            "COMPLETED" | "COMPLETADA" | "COMPLETADO" | "FINALIZADA" => {
                Some(OrderStatus::Completed)
            }
            "CANCELLED" | "CANCELED" | "CANCELADA" | "CANCELADO" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Storage string (matches the serde representation)
    pub fn to_db_str(&self) -> &'static str {
        match self {
            OrderStatus::Open => "OPEN",
            OrderStatus::Assigned => "ASSIGNED",
            OrderStatus::InProgress => "IN_PROGRESS",
            OrderStatus::OnHold => "ON_HOLD",
            OrderStatus::Closed => "CLOSED",
            OrderStatus::Completed => "COMPLETED",
            OrderStatus::Cancelled => "CANCELLED",
        }
    }
}

// ==========================================
// Manual priority
// ==========================================
// Assigned by the coordinator at intake; one additive input of the urgency
// score, never the whole of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ManualPriority {
    Critical,
    High,
    Medium,
    Low,
}

impl fmt::Display for ManualPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl ManualPriority {
    /// Parse a priority string (case-insensitive, Spanish labels accepted;
    /// "normal" is an alias of Medium)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CRITICAL" | "CRITICA" | "CRÍTICA" => Some(ManualPriority::Critical),
            "HIGH" | "ALTA" => Some(ManualPriority::High),
            "MEDIUM" | "MEDIA" | "NORMAL" => Some(ManualPriority::Medium),
            "LOW" | "BAJA" => Some(ManualPriority::Low),
            _ => None,
        }
    }

    /// Storage string
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ManualPriority::Critical => "CRITICAL",
            ManualPriority::High => "HIGH",
            ManualPriority::Medium => "MEDIUM",
            ManualPriority::Low => "LOW",
        }
    }
}

impl Default for ManualPriority {
    fn default() -> Self {
        ManualPriority::Medium
    }
}

// ==========================================
// Status-history entry kind
// ==========================================
// STATUS_CHANGE rows carry status strings in prior/new; POSTPONEMENT rows
// carry due-date strings in the same columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HistoryEntryKind {
    StatusChange,
    Postponement,
}

impl fmt::Display for HistoryEntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl HistoryEntryKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "STATUS_CHANGE" => Some(HistoryEntryKind::StatusChange),
            "POSTPONEMENT" => Some(HistoryEntryKind::Postponement),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            HistoryEntryKind::StatusChange => "STATUS_CHANGE",
            HistoryEntryKind::Postponement => "POSTPONEMENT",
        }
    }
}

// ==========================================
// Activity-log operation kind
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}

impl OperationKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_uppercase().as_str() {
            "CREATE" => Some(OperationKind::Create),
            "UPDATE" => Some(OperationKind::Update),
            "DELETE" => Some(OperationKind::Delete),
            _ => None,
        }
    }

    pub fn to_db_str(&self) -> &'static str {
        match self {
            OperationKind::Create => "CREATE",
            OperationKind::Update => "UPDATE",
            OperationKind::Delete => "DELETE",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_parse_storage_form() {
        assert_eq!(OrderStatus::parse("IN_PROGRESS"), Some(OrderStatus::InProgress));
        assert_eq!(OrderStatus::parse("open"), Some(OrderStatus::Open));
        assert_eq!(OrderStatus::parse("Canceled"), Some(OrderStatus::Cancelled));
    }

    #[test]
    fn test_status_parse_spanish_labels() {
        assert_eq!(OrderStatus::parse("abierta"), Some(OrderStatus::Open));
        assert_eq!(OrderStatus::parse("en proceso"), Some(OrderStatus::InProgress));
        assert_eq!(OrderStatus::parse("EN ESPERA"), Some(OrderStatus::OnHold));
        assert_eq!(OrderStatus::parse("cerrada"), Some(OrderStatus::Closed));
        assert_eq!(OrderStatus::parse("completada"), Some(OrderStatus::Completed));
        assert_eq!(OrderStatus::parse("cancelada"), Some(OrderStatus::Cancelled));
    }

    #[test]
    fn test_status_parse_unknown_is_none() {
        assert_eq!(OrderStatus::parse(""), None);
        assert_eq!(OrderStatus::parse("archived"), None);
    }

    #[test]
    fn test_terminal_set() {
        assert!(OrderStatus::Closed.is_terminal());
        assert!(OrderStatus::Completed.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Open.is_terminal());
        assert!(!OrderStatus::OnHold.is_terminal());
    }

    #[test]
    fn test_priority_parse_aliases() {
        assert_eq!(ManualPriority::parse("normal"), Some(ManualPriority::Medium));
        assert_eq!(ManualPriority::parse("ALTA"), Some(ManualPriority::High));
        assert_eq!(ManualPriority::parse("crítica"), Some(ManualPriority::Critical));
        assert_eq!(ManualPriority::parse("baja"), Some(ManualPriority::Low));
        assert_eq!(ManualPriority::parse("urgent"), None);
    }

    #[test]
    fn test_db_round_trip() {
        for status in [
            OrderStatus::Open,
            OrderStatus::Assigned,
            OrderStatus::InProgress,
            OrderStatus::OnHold,
            OrderStatus::Closed,
            OrderStatus::Completed,
            OrderStatus::Cancelled,
        ] {
            assert_eq!(OrderStatus::parse(status.to_db_str()), Some(status));
        }
    }
}
