//! # Validation Module
//!
//! Structural validation of the submitted order document.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Cart UI (TypeScript)                                         │
//! │  ├── Basic format checks (empty, length)                               │
//! │  └── Immediate user feedback                                           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: order-api handler (Rust)                                     │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: structural rules, run before any pricing pass        │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── CHECK constraints (layer/kind/status tags)                        │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use bistro_core::validation::validate_draft_order;
//! # let draft: bistro_core::types::DraftOrder = todo!();
//!
//! // Run before pricing; a failure rejects the whole request
//! validate_draft_order(&draft).unwrap();
//! ```

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::types::{Bill, DraftOrder, LineItem};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS, MAX_UNIT_PRICE_CENTS};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 200 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "customer.name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "customer.name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a caller-assigned identifier (line item id, dish id,
/// promotion id).
///
/// ## Rules
/// - Must not be empty
/// - Must be at most 64 characters
/// - Only alphanumeric characters, hyphens, underscores
pub fn validate_identifier(field: &str, id: &str) -> ValidationResult<()> {
    let id = id.trim();

    if id.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if id.len() > 64 {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max: 64,
        });
    }

    if !id
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(ValidationError::InvalidFormat {
            field: field.to_string(),
            reason: "must contain only letters, numbers, hyphens, and underscores".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a unit price in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0); zero is allowed (complimentary items)
/// - Bounded above so line totals stay far from i64 overflow
pub fn validate_unit_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 || cents > MAX_UNIT_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "unitPriceCents".to_string(),
            min: 0,
            max: MAX_UNIT_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates the submitted bill's fields.
///
/// ## Rules
/// - Every field non-negative, tax included
///
/// The bill is recomputed and compared later anyway, but a negative
/// submitted field is a malformed document, not a disagreement, and is
/// reported as a validation error before any pricing pass runs.
pub fn validate_bill_fields(bill: &Bill) -> ValidationResult<()> {
    let fields = [
        ("bill.subtotalCents", bill.subtotal_cents),
        ("bill.itemDiscountCents", bill.item_discount_cents),
        ("bill.orderDiscountCents", bill.order_discount_cents),
        ("bill.promotionDiscountCents", bill.promotion_discount_cents),
        ("bill.totalCents", bill.total_cents),
        ("bill.taxCents", bill.tax_cents),
        ("bill.totalWithTaxCents", bill.total_with_tax_cents),
    ];

    for (field, value) in fields {
        if value < 0 {
            return Err(ValidationError::MustBeNonNegative {
                field: field.to_string(),
            });
        }
    }

    Ok(())
}

// =============================================================================
// Order Document Validators
// =============================================================================

/// Validates a single line item.
pub fn validate_line_item(item: &LineItem) -> ValidationResult<()> {
    validate_identifier("item.id", &item.id)?;
    validate_identifier("item.dishId", &item.dish_id)?;

    if item.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "item.name".to_string(),
        });
    }

    validate_quantity(item.quantity)?;
    validate_unit_price_cents(item.unit_price_cents)?;

    if let Some(promo_id) = &item.promotion_id {
        validate_identifier("item.promotionId", promo_id)?;
    }

    Ok(())
}

/// Validates the structural shape of a submitted draft order.
///
/// ## Rules
/// - At least one line item, at most MAX_ORDER_ITEMS (100)
/// - Line item ids unique within the order
/// - Every line item individually valid
/// - Order-level promotion ids well-formed (the count limit of one is
///   enforced by the pricing pass, which reports it as a billing error)
/// - Every submitted bill field non-negative, tax included
pub fn validate_draft_order(draft: &DraftOrder) -> ValidationResult<()> {
    validate_customer_name(&draft.customer.name)?;
    validate_bill_fields(&draft.bill)?;

    if draft.items.is_empty() {
        return Err(ValidationError::EmptyOrder);
    }

    if draft.items.len() > MAX_ORDER_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "items".to_string(),
            min: 1,
            max: MAX_ORDER_ITEMS as i64,
        });
    }

    let mut seen_ids = HashSet::new();
    for item in &draft.items {
        validate_line_item(item)?;

        if !seen_ids.insert(item.id.as_str()) {
            return Err(ValidationError::Duplicate {
                field: "item.id".to_string(),
                value: item.id.clone(),
            });
        }
    }

    for promo_id in &draft.order_promotion_ids {
        validate_identifier("orderPromotionIds", promo_id)?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
