//! # Error Types
//!
//! Domain-specific error types for bistro-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  bistro-core errors (this file)                                        │
//! │  ├── BillingError     - Reconciliation gate failures                   │
//! │  └── ValidationError  - Input validation failures                      │
//! │                                                                         │
//! │  bistro-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                    │
//! │                                                                         │
//! │  order-api errors (in app)                                             │
//! │  └── ApiError         - What the caller sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → BillingError → ApiError → Caller              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (promotion id, field names)
//! 3. Errors are enum variants, never String
//! 4. Every billing error is terminal: the request is rejected whole,
//!    nothing is partially persisted

use thiserror::Error;

use crate::types::Bill;

// =============================================================================
// Billing Error
// =============================================================================

/// Reconciliation gate failures.
///
/// Any of these rejects the entire order-creation request. There is no
/// partial application: a promotion that cannot be applied is never
/// silently dropped.
#[derive(Debug, Error)]
pub enum BillingError {
    /// A referenced promotion does not resolve to an eligible definition.
    ///
    /// ## When This Occurs
    /// - Promotion id does not exist in the promotion store
    /// - Promotion exists but is inactive or outside its validity window
    /// - Promotion exists but targets the wrong layer (an item-level id
    ///   submitted as an order-level candidate, or vice versa)
    /// - Item-level promotion is scoped to a category the item is not in
    #[error("Promotion not applicable: {promotion_id}")]
    PromotionNotApplicable { promotion_id: String },

    /// More than one order-level promotion candidate in one request.
    ///
    /// At most ONE order-level promotion per order. A second candidate is
    /// an error, never a silent "pick the best one".
    #[error("At most one order-level promotion allowed, got {count}")]
    TooManyPromotions { count: usize },

    /// The caller's bill disagrees with the recomputed bill.
    ///
    /// ## When This Occurs
    /// - Stale cart UI computed against outdated promotion definitions
    /// - Client-side rounding drift
    /// - A tampered request
    ///
    /// Carries the full recomputed bill and the names of every
    /// mismatching field so the caller can resynchronize.
    #[error("Submitted bill does not match recomputed bill (fields: {})", fields.join(", "))]
    BillMismatch {
        expected: Bill,
        fields: Vec<&'static str>,
    },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when the submitted order document doesn't meet
/// structural requirements. Used for early validation before the pricing
/// passes run.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative (zero allowed).
    #[error("{field} must not be negative")]
    MustBeNonNegative { field: String },

    /// Invalid format (e.g., invalid UUID, bad enum tag).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Duplicate value (e.g., duplicate line item id).
    #[error("{field} '{value}' already exists")]
    Duplicate { field: String, value: String },

    /// The order has no line items.
    #[error("order must contain at least one item")]
    EmptyOrder,
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with BillingError.
pub type BillingResult<T> = Result<T, BillingError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = BillingError::PromotionNotApplicable {
            promotion_id: "promo-happy-hour".to_string(),
        };
        assert_eq!(err.to_string(), "Promotion not applicable: promo-happy-hour");

        let err = BillingError::TooManyPromotions { count: 2 };
        assert_eq!(
            err.to_string(),
            "At most one order-level promotion allowed, got 2"
        );
    }

    #[test]
    fn test_bill_mismatch_lists_fields() {
        let err = BillingError::BillMismatch {
            expected: Bill::default(),
            fields: vec!["totalCents", "orderDiscountCents"],
        };
        assert_eq!(
            err.to_string(),
            "Submitted bill does not match recomputed bill (fields: totalCents, orderDiscountCents)"
        );
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "customer.name".to_string(),
        };
        assert_eq!(err.to_string(), "customer.name is required");

        let err = ValidationError::EmptyOrder;
        assert_eq!(err.to_string(), "order must contain at least one item");
    }

    #[test]
    fn test_validation_converts_to_billing_error() {
        let validation_err = ValidationError::EmptyOrder;
        let billing_err: BillingError = validation_err.into();
        assert!(matches!(billing_err, BillingError::Validation(_)));
    }
}
