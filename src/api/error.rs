// ==========================================
// MedEquip OMS - API layer errors
// ==========================================
// Converts repository/guard errors into the responses the HTTP collaborator
// returns. Validation failures map to the 400 class, lookups to 404,
// persistence problems to 500 (store message passed through verbatim).
// ==========================================

use crate::engine::error::GuardError;
use crate::repository::error::RepositoryError;
use serde::Serialize;
use thiserror::Error;

/// API layer error type
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== caller input =====
    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    BusinessRuleViolation(String),

    // ===== data access =====
    #[error("Error de base de datos: {0}")]
    DatabaseError(String),

    #[error("Fallo de conexión a la base de datos: {0}")]
    DatabaseConnectionError(String),

    #[error("Fallo de transacción de base de datos: {0}")]
    DatabaseTransactionError(String),

    // ===== generic =====
    #[error("Error interno: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ApiError {
    /// HTTP status class the transport collaborator should answer with
    pub fn http_status(&self) -> u16 {
        match self {
            ApiError::InvalidInput(_)
            | ApiError::ValidationError(_)
            | ApiError::BusinessRuleViolation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::DatabaseError(_)
            | ApiError::DatabaseConnectionError(_)
            | ApiError::DatabaseTransactionError(_)
            | ApiError::InternalError(_)
            | ApiError::Other(_) => 500,
        }
    }

    /// Wire shape of an error reply
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            success: false,
            error: self.to_string(),
        }
    }
}

// ==========================================
// Conversion from RepositoryError
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{} (id={}) no existe", entity, id))
            }
            RepositoryError::DatabaseConnectionError(msg) => ApiError::DatabaseConnectionError(msg),
            RepositoryError::DatabaseTransactionError(msg) => {
                ApiError::DatabaseTransactionError(msg)
            }
            RepositoryError::LockError(msg) => {
                ApiError::DatabaseConnectionError(format!("fallo al adquirir el candado: {}", msg))
            }
            RepositoryError::DatabaseQueryError(msg) => ApiError::DatabaseError(msg),
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("Violación de unicidad: {}", msg))
            }
            RepositoryError::ForeignKeyViolation(msg) => {
                ApiError::BusinessRuleViolation(format!("Violación de clave foránea: {}", msg))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("Campo {} inválido: {}", field, message))
            }
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
        }
    }
}

// ==========================================
// Conversion from GuardError
// ==========================================
impl From<GuardError> for ApiError {
    fn from(err: GuardError) -> Self {
        match err {
            GuardError::OrderNotFound(_) => ApiError::NotFound(err.to_string()),
            GuardError::Repository(repo_err) => ApiError::from(repo_err),
            // every remaining variant is caller-recoverable validation
            _ => ApiError::ValidationError(err.to_string()),
        }
    }
}

/// Result alias
pub type ApiResult<T> = Result<T, ApiError>;

// ==========================================
// Error reply wire shape
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_validation_maps_to_400() {
        let api_err: ApiError = GuardError::EmptyJustification.into();
        assert_eq!(api_err.http_status(), 400);
        assert!(api_err.to_string().contains("justificación"));
    }

    #[test]
    fn test_guard_not_found_maps_to_404() {
        let api_err: ApiError = GuardError::OrderNotFound(42).into();
        assert_eq!(api_err.http_status(), 404);
        assert!(api_err.to_string().contains("42"));
    }

    #[test]
    fn test_repository_error_maps_to_500() {
        let api_err: ApiError =
            RepositoryError::DatabaseQueryError("disk I/O error".to_string()).into();
        assert_eq!(api_err.http_status(), 500);
        // store message passes through verbatim
        assert!(api_err.to_string().contains("disk I/O error"));
    }

    #[test]
    fn test_error_response_shape() {
        let api_err = ApiError::ValidationError("La justificación es obligatoria".to_string());
        let response = api_err.to_response();
        assert!(!response.success);
        assert_eq!(response.error, "La justificación es obligatoria");
    }
}
