//! # Billing Engine
//!
//! The two-pass discount pipeline that derives a [`Bill`] from a draft
//! order and a promotion snapshot.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        price_order()                                    │
//! │                                                                         │
//! │  Pass 1: ITEM LAYER ("happy hour")                                     │
//! │  ┌───────────────────────────────────────────────────────────┐        │
//! │  │ for each line item with a promotion id:                   │        │
//! │  │   discount = per UNIT (percentage rounds on unit price)   │        │
//! │  │   effective_unit = unit − discount   (≥ 0)                │        │
//! │  │   effective_total = effective_unit × quantity             │        │
//! │  └───────────────────────────────┬───────────────────────────┘        │
//! │                                  │                                     │
//! │       subtotal        = Σ line_total        (original prices)         │
//! │       item_discount   = Σ (line_total − effective_total)              │
//! │       effective_subtotal = subtotal − item_discount                   │
//! │                                  │                                     │
//! │  Pass 2: ORDER LAYER             ▼                                     │
//! │  ┌───────────────────────────────────────────────────────────┐        │
//! │  │ at most ONE order-level promotion:                        │        │
//! │  │   base = EFFECTIVE subtotal (post-item-discount)          │        │
//! │  │   percentage rounds half up, fixed clamps at the base     │        │
//! │  └───────────────────────────────┬───────────────────────────┘        │
//! │                                  │                                     │
//! │                                  ▼                                     │
//! │       total = subtotal − (item_discount + order_discount)             │
//! │       total_with_tax = total + tax (tax is a pass-through amount)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The pass order is fixed: item layer first, order layer on the result.
//! The two bases are observably different (10% of the original 119000 is
//! 11900, of the effective 111000 is 11100); the test suite pins the
//! effective-subtotal base.
//!
//! ## Determinism
//! Everything here is a pure function of `(draft, snapshot)`. No clock, no
//! I/O, no shared state. Repeated invocations with the same inputs produce
//! identical bills, which is what lets the API recompute a caller's bill
//! and compare it exactly.

use crate::error::{BillingError, BillingResult};
use crate::money::Money;
use crate::promotion::{PromotionLayer, PromotionSnapshot};
use crate::types::{
    AppliedOrderPromotion, Bill, DraftOrder, ItemPromotion, LineItem, PricedLineItem,
};
use crate::validation::validate_draft_order;

// =============================================================================
// Priced Order
// =============================================================================

/// The output of the pricing pipeline: annotated line items, the applied
/// order-level promotion (if any), and the derived bill.
#[derive(Debug, Clone, PartialEq)]
pub struct PricedOrder {
    pub items: Vec<PricedLineItem>,
    pub order_promotion: Option<AppliedOrderPromotion>,
    pub bill: Bill,
}

// =============================================================================
// Pass 1: Item Layer
// =============================================================================

/// Prices one line item, applying its item-level promotion if it has one.
///
/// The discount is computed per UNIT: a percentage rounds once on the unit
/// price and the rounded per-unit discount is then multiplied by quantity.
/// Rounding on the line total instead would drift from the cart preview by
/// up to `quantity − 1` cents.
///
/// A promotion id that does not resolve to an eligible item-layer
/// definition is an error, never a silent no-op.
pub fn price_item(item: &LineItem, snapshot: &PromotionSnapshot) -> BillingResult<PricedLineItem> {
    let Some(promo_id) = &item.promotion_id else {
        return Ok(PricedLineItem::undiscounted(item));
    };

    let definition = snapshot
        .get_eligible(promo_id, PromotionLayer::Item)
        .ok_or_else(|| BillingError::PromotionNotApplicable {
            promotion_id: promo_id.clone(),
        })?;

    let unit = Money::from_cents(item.unit_price_cents);
    let unit_discount = Money::from_cents(definition.unit_discount_cents(item.unit_price_cents));
    let effective_unit = unit.saturating_sub(unit_discount);

    let line_total = unit.multiply_quantity(item.quantity);
    let effective_total = effective_unit.multiply_quantity(item.quantity);

    Ok(PricedLineItem {
        id: item.id.clone(),
        dish_id: item.dish_id.clone(),
        name: item.name.clone(),
        category: item.category.clone(),
        quantity: item.quantity,
        unit_price_cents: unit.cents(),
        line_total_cents: line_total.cents(),
        effective_unit_price_cents: effective_unit.cents(),
        effective_total_cents: effective_total.cents(),
        promotion: Some(ItemPromotion {
            promotion_id: definition.id.clone(),
            name: definition.name.clone(),
            discount_cents: (line_total - effective_total).cents(),
        }),
    })
}

/// Runs the item-level pass over every line item.
pub fn price_items(
    items: &[LineItem],
    snapshot: &PromotionSnapshot,
) -> BillingResult<Vec<PricedLineItem>> {
    items.iter().map(|item| price_item(item, snapshot)).collect()
}

// =============================================================================
// Pass 2: Order Layer
// =============================================================================

/// Resolves and applies the order-level promotion, if one was submitted.
///
/// ## Rules
/// - Zero candidates: no order discount
/// - One candidate: must resolve to an eligible order-layer definition
/// - Two or more candidates: `TooManyPromotions`, checked FIRST so the
///   error names the real problem even when one of the ids is also stale
///
/// The discount base is `effective_subtotal_cents`, the post-item-discount
/// subtotal.
pub fn apply_order_promotion(
    order_promotion_ids: &[String],
    effective_subtotal_cents: i64,
    snapshot: &PromotionSnapshot,
) -> BillingResult<Option<AppliedOrderPromotion>> {
    if order_promotion_ids.len() > 1 {
        return Err(BillingError::TooManyPromotions {
            count: order_promotion_ids.len(),
        });
    }

    let Some(promo_id) = order_promotion_ids.first() else {
        return Ok(None);
    };

    let definition = snapshot
        .get_eligible(promo_id, PromotionLayer::Order)
        .ok_or_else(|| BillingError::PromotionNotApplicable {
            promotion_id: promo_id.clone(),
        })?;

    Ok(Some(AppliedOrderPromotion {
        promotion_id: definition.id.clone(),
        name: definition.name.clone(),
        code: definition.code.clone(),
        kind: definition.kind,
        parameter: definition.parameter,
        discount_cents: definition.order_discount_cents(effective_subtotal_cents),
    }))
}

// =============================================================================
// Full Pipeline
// =============================================================================

/// Prices a draft order: structural validation, item pass, order pass,
/// bill assembly.
///
/// `tax_cents` on the draft's bill is treated as a pass-through flat
/// amount. It is carried into the recomputed bill unchanged and only
/// participates through `total_with_tax = total + tax`. Validation has
/// already rejected negative bill fields, so the carried tax is ≥ 0.
pub fn price_order(draft: &DraftOrder, snapshot: &PromotionSnapshot) -> BillingResult<PricedOrder> {
    validate_draft_order(draft)?;

    let items = price_items(&draft.items, snapshot)?;

    let mut subtotal = Money::zero();
    let mut effective_subtotal = Money::zero();
    for item in &items {
        subtotal += Money::from_cents(item.line_total_cents);
        effective_subtotal += Money::from_cents(item.effective_total_cents);
    }
    let item_discount = subtotal - effective_subtotal;

    let order_promotion =
        apply_order_promotion(&draft.order_promotion_ids, effective_subtotal.cents(), snapshot)?;
    let order_discount = Money::from_cents(
        order_promotion
            .as_ref()
            .map(|p| p.discount_cents)
            .unwrap_or(0),
    );

    let promotion_discount = item_discount + order_discount;
    let total = subtotal.saturating_sub(promotion_discount);
    let tax = Money::from_cents(draft.bill.tax_cents);

    let bill = Bill {
        subtotal_cents: subtotal.cents(),
        item_discount_cents: item_discount.cents(),
        order_discount_cents: order_discount.cents(),
        promotion_discount_cents: promotion_discount.cents(),
        total_cents: total.cents(),
        tax_cents: tax.cents(),
        total_with_tax_cents: (total + tax).cents(),
    };

    Ok(PricedOrder {
        items,
        order_promotion,
        bill,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
