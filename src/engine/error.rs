// ==========================================
// MedEquip OMS - engine layer errors
// ==========================================
// Guard validation failures carry the operator-facing message (Spanish,
// surfaced verbatim by the HTTP collaborator); repository failures pass
// through untouched.
// ==========================================

use crate::domain::types::OrderStatus;
use crate::repository::error::RepositoryError;
use chrono::NaiveDate;
use thiserror::Error;

/// Guard error type
#[derive(Error, Debug)]
pub enum GuardError {
    // ===== validation (rejected before any mutation) =====
    #[error("La justificación es obligatoria")]
    EmptyJustification,

    #[error("La nueva fecha de vencimiento es obligatoria")]
    MissingDueDate,

    #[error("La nueva fecha ({0}) no puede ser anterior a hoy")]
    DueDateInPast(NaiveDate),

    #[error("La orden {order_id} está en estado terminal ({status}) y no admite cambios de fecha")]
    TerminalOrder { order_id: i64, status: OrderStatus },

    #[error("Estado no reconocido: {0}")]
    UnknownStatus(String),

    #[error("Prioridad no reconocida: {0}")]
    UnknownPriority(String),

    // ===== lookup =====
    #[error("La orden de trabajo {0} no existe")]
    OrderNotFound(i64),

    // ===== persistence =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl GuardError {
    /// Whether the error is caller-recoverable input validation (400-class)
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            GuardError::EmptyJustification
                | GuardError::MissingDueDate
                | GuardError::DueDateInPast(_)
                | GuardError::TerminalOrder { .. }
                | GuardError::UnknownStatus(_)
                | GuardError::UnknownPriority(_)
        )
    }
}

/// Result alias
pub type GuardResult<T> = Result<T, GuardError>;
