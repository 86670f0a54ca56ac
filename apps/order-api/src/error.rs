//! # API Error Type
//!
//! Unified error type for HTTP handlers.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Bistro POS                             │
//! │                                                                         │
//! │  Cart UI                     Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  POST /api/orders                                                       │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Handler: Result<T, ApiError>                                    │  │
//! │  │                                                                  │  │
//! │  │  BillingError::BillMismatch ───────► 422 BILL_MISMATCH          │  │
//! │  │  BillingError::PromotionNotApplicable ► 422 PROMOTION_NOT_...   │  │
//! │  │  BillingError::TooManyPromotions ──► 400 TOO_MANY_PROMOTIONS    │  │
//! │  │  BillingError::Validation ─────────► 400 VALIDATION_ERROR       │  │
//! │  │  DbError::NotFound ────────────────► 404 NOT_FOUND              │  │
//! │  │  DbError::Conflict ────────────────► 409 CONFLICT               │  │
//! │  │  DbError::* ───────────────────────► 500 DATABASE_ERROR         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  ◄─── { "code": "BILL_MISMATCH", "message": "...",                     │
//! │         "recomputedBill": { ... } }                                     │
//! │                                                                         │
//! │  The cart replaces its local bill with recomputedBill and resubmits.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use bistro_core::{Bill, BillingError};
use bistro_db::DbError;

/// API error returned from HTTP handlers.
///
/// ## Serialization
/// ```json
/// {
///   "code": "PROMOTION_NOT_APPLICABLE",
///   "message": "Promotion not applicable: happy-hour-10"
/// }
/// ```
/// `recomputedBill` is present only on `BILL_MISMATCH`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,

    /// The authoritative recomputed bill, on BILL_MISMATCH only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recomputed_bill: Option<Bill>,
}

/// Error codes for API responses.
///
/// ## Usage in the Cart UI
/// ```typescript
/// const res = await submitOrder(draft);
/// if (res.code === 'BILL_MISMATCH') {
///   cart.replaceBill(res.recomputedBill);  // then resubmit
/// } else if (res.code === 'PROMOTION_NOT_APPLICABLE') {
///   cart.dropStalePromotion(res.message);
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found (404)
    NotFound,

    /// Input validation failed (400)
    ValidationError,

    /// More than one order-level promotion submitted (400)
    TooManyPromotions,

    /// A referenced promotion is unknown or ineligible (422)
    PromotionNotApplicable,

    /// The stored state changed under the request (409)
    Conflict,

    /// The submitted bill disagrees with the recomputation (422)
    BillMismatch,

    /// Database operation failed (500)
    DatabaseError,

    /// Internal server error (500)
    Internal,
}

impl ErrorCode {
    fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::ValidationError | ErrorCode::TooManyPromotions => StatusCode::BAD_REQUEST,
            ErrorCode::PromotionNotApplicable | ErrorCode::BillMismatch => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::DatabaseError | ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl ApiError {
    /// Creates a new API error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
            recomputed_bill: None,
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

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

/// Converts billing errors to API errors.
impl From<BillingError> for ApiError {
    fn from(err: BillingError) -> Self {
        match err {
            BillingError::PromotionNotApplicable { .. } => {
                ApiError::new(ErrorCode::PromotionNotApplicable, err.to_string())
            }
            BillingError::TooManyPromotions { .. } => {
                ApiError::new(ErrorCode::TooManyPromotions, err.to_string())
            }
            BillingError::BillMismatch { expected, fields } => ApiError {
                code: ErrorCode::BillMismatch,
                message: format!(
                    "Submitted bill does not match recomputed bill (fields: {})",
                    fields.join(", ")
                ),
                recomputed_bill: Some(expected),
            },
            BillingError::Validation(e) => ApiError::validation(e.to_string()),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::Conflict {
                ref entity, ref id, ..
            } => {
                tracing::warn!(%entity, %id, "Guarded update raced a concurrent change");
                ApiError::new(ErrorCode::Conflict, err.to_string())
            }
            DbError::UniqueViolation { field, value } => ApiError::new(
                ErrorCode::ValidationError,
                format!("{} '{}' already exists", field, value),
            ),
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::new(ErrorCode::ValidationError, "Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::QueryFailed(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database query failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::CorruptRow { entity, id, reason } => {
                tracing::error!(%entity, %id, %reason, "Corrupt row");
                ApiError::new(ErrorCode::Internal, "Stored data is inconsistent")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::Internal(e) => {
                tracing::error!("Internal database error: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}
