//! # API Error Type
//!
//! Unified error type for command functions.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Caravan                                │
//! │                                                                         │
//! │  Frontend                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  invoke('delete_province')                                              │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Guard tripped? ── DbError::ReferentialIntegrity ──┐            │  │
//! │  │         │                                          │            │  │
//! │  │         ▼                                          ▼            │  │
//! │  │  Bad input? ────── CoreError::InvalidStatus ───── ApiError ────►│  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Success ──────────────────────────────────────────────────────►│  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  try {                                                                  │
//! │    await invoke('delete_province', { id })                              │
//! │  } catch (e) {                                                          │
//! │    // e.message = "Cannot delete province with existing deliveries..."  │
//! │    // e.code = "REFERENTIAL_INTEGRITY"                                  │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Store-level failures (connection loss, unexpected SQL errors) pass
//! through with their original message. No retries happen here; a calling
//! layer may add them.

use serde::Serialize;

use caravan_core::{CoreError, ValidationError};
use caravan_db::DbError;

/// API error returned from command functions.
///
/// ## Serialization
/// This is what the frontend receives when a command fails:
/// ```json
/// {
///   "code": "DUPLICATE_NAME",
///   "message": "Province 'Kabul' already exists"
/// }
/// ```
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
///
/// ## Usage in Frontend
/// ```typescript
/// try {
///   await invoke('add_province', { provinceName });
/// } catch (e) {
///   switch (e.code) {
///     case 'DUPLICATE_NAME':
///       markFieldInvalid('provinceName', e.message);
///       break;
///     case 'REFERENTIAL_INTEGRITY':
///       showBlockedDeleteDialog(e.message);
///       break;
///     default:
///       showError(e.message);
///   }
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Natural-key collision (province/agent name)
    DuplicateName,

    /// Delete blocked by dependent rows
    ReferentialIntegrity,

    /// Status outside the four-member enum
    InvalidStatus,

    /// Business rule violation (e.g. duplicate assignment)
    BusinessLogic,

    /// Database operation failed
    DatabaseError,

    /// Internal error
    Internal,
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(
            ErrorCode::NotFound,
            format!("{} not found: {}", resource, id),
        )
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

/// Converts database errors to API errors.
///
/// The two domain guards keep their own codes so the UI can react
/// specifically; everything store-shaped becomes `DATABASE_ERROR` with the
/// original message intact.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        let message = err.to_string();
        match err {
            DbError::NotFound { .. } => ApiError::new(ErrorCode::NotFound, message),
            DbError::DuplicateName { .. } => ApiError::new(ErrorCode::DuplicateName, message),
            DbError::ReferentialIntegrity { .. } => {
                ApiError::new(ErrorCode::ReferentialIntegrity, message)
            }
            DbError::AlreadyAssigned => ApiError::new(ErrorCode::BusinessLogic, message),
            DbError::UniqueViolation { .. } => ApiError::new(ErrorCode::DuplicateName, message),
            DbError::ForeignKeyViolation { .. } => {
                ApiError::new(ErrorCode::ValidationError, message)
            }
            DbError::ConnectionFailed(_)
            | DbError::MigrationFailed(_)
            | DbError::QueryFailed(_)
            | DbError::TransactionFailed(_)
            | DbError::PoolExhausted
            | DbError::Internal(_) => ApiError::new(ErrorCode::DatabaseError, message),
        }
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidStatus { .. } => {
                ApiError::new(ErrorCode::InvalidStatus, err.to_string())
            }
            CoreError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts bare validation errors (from the validators) to API errors.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_name_maps_to_its_own_code() {
        let err: ApiError = DbError::duplicate_name("Province", "Kabul").into();
        assert_eq!(err.code, ErrorCode::DuplicateName);
        assert!(err.message.contains("Kabul"));
    }

    #[test]
    fn test_referential_integrity_keeps_dependent_type() {
        let err: ApiError = DbError::referential("agent", "deliveries").into();
        assert_eq!(err.code, ErrorCode::ReferentialIntegrity);
        assert!(err.message.contains("deliveries"));
    }

    #[test]
    fn test_invalid_status_code() {
        let err: ApiError = CoreError::InvalidStatus {
            value: "shipped".to_string(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::InvalidStatus);
    }

    #[test]
    fn test_store_errors_keep_original_message() {
        let err: ApiError = DbError::QueryFailed("disk I/O error".to_string()).into();
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert!(err.message.contains("disk I/O error"));
    }
}
