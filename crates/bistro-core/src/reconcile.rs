//! # Reconciliation Gate
//!
//! The exact-match gate between the caller's locally-computed bill and the
//! engine's independent recomputation.
//!
//! ## Why a Gate?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cart UI (untrusted)                 order-api (authoritative)          │
//! │                                                                         │
//! │  items + promos ──► local bill ──►  POST /api/orders                   │
//! │                                         │                               │
//! │                                         ▼                               │
//! │                                   reconcile(draft, snapshot)            │
//! │                                   ├── price_order() (same algorithm)   │
//! │                                   ├── bills equal? ──► accept           │
//! │                                   └── any field differs ──►            │
//! │                                       BillMismatch { expected, fields } │
//! │                                                                         │
//! │  The caller is told the authoritative numbers and resubmits.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Comparison is EXACT integer equality on every bill field. There is no
//! tolerance: money fields are integers in the smallest currency unit, so
//! any difference is a genuine disagreement (stale promotion definitions,
//! client rounding drift, or tampering).

use crate::billing::{price_order, PricedOrder};
use crate::error::{BillingError, BillingResult};
use crate::promotion::PromotionSnapshot;
use crate::types::DraftOrder;

/// Recomputes the draft's bill and accepts it only on an exact match.
///
/// On success, the returned [`PricedOrder`] is the validated document to
/// persist: annotated items, the applied order promotion, and the bill
/// (which equals the caller's, field for field).
///
/// On [`BillingError::BillMismatch`], `expected` is the recomputed bill
/// and `fields` names every disagreeing field. Nothing is persisted for
/// any error.
pub fn reconcile(draft: &DraftOrder, snapshot: &PromotionSnapshot) -> BillingResult<PricedOrder> {
    let priced = price_order(draft, snapshot)?;

    let fields = priced.bill.mismatched_fields(&draft.bill);
    if !fields.is_empty() {
        return Err(BillingError::BillMismatch {
            expected: priced.bill,
            fields,
        });
    }

    Ok(priced)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::promotion::{DiscountKind, PromotionDefinition, PromotionLayer};
    use crate::types::{Bill, CustomerDetails, LineItem};

    fn promo(
        id: &str,
        layer: PromotionLayer,
        kind: DiscountKind,
        parameter: i64,
    ) -> PromotionDefinition {
        PromotionDefinition {
            id: id.to_string(),
            name: "Promo".to_string(),
            code: id.to_uppercase(),
            layer,
            kind,
            parameter,
            eligible: true,
        }
    }

    fn line(id: &str, qty: i64, unit_price: i64, promo: Option<&str>) -> LineItem {
        LineItem {
            id: id.to_string(),
            dish_id: format!("dish-{id}"),
            name: "Dish".to_string(),
            category: "mains".to_string(),
            quantity: qty,
            unit_price_cents: unit_price,
            promotion_id: promo.map(|p| p.to_string()),
        }
    }

    fn draft(items: Vec<LineItem>, order_promos: Vec<&str>, bill: Bill) -> DraftOrder {
        DraftOrder {
            customer: CustomerDetails {
                name: "walk-in".to_string(),
                ..Default::default()
            },
            items,
            order_promotion_ids: order_promos.into_iter().map(String::from).collect(),
            bill,
        }
    }

    fn bill(
        subtotal: i64,
        item_discount: i64,
        order_discount: i64,
        tax: i64,
    ) -> Bill {
        let promotion_discount = item_discount + order_discount;
        let total = subtotal - promotion_discount;
        Bill {
            subtotal_cents: subtotal,
            item_discount_cents: item_discount,
            order_discount_cents: order_discount,
            promotion_discount_cents: promotion_discount,
            total_cents: total,
            tax_cents: tax,
            total_with_tax_cents: total + tax,
        }
    }

    #[test]
    fn test_accepts_plain_order_without_promotions() {
        // 43000 × 1, no discounts
        let priced = reconcile(
            &draft(
                vec![line("li-1", 1, 43000, None)],
                vec![],
                bill(43000, 0, 0, 0),
            ),
            &PromotionSnapshot::empty(),
        )
        .unwrap();

        assert_eq!(priced.bill.total_cents, 43000);
        assert_eq!(priced.bill.promotion_discount_cents, 0);
    }

    #[test]
    fn test_accepts_order_percentage_discount() {
        // 10% off 38000 = 3800, total 34200
        let snapshot = PromotionSnapshot::new([promo(
            "open",
            PromotionLayer::Order,
            DiscountKind::Percentage,
            10,
        )]);
        let priced = reconcile(
            &draft(
                vec![line("li-1", 1, 38000, None)],
                vec!["open"],
                bill(38000, 0, 3800, 0),
            ),
            &snapshot,
        )
        .unwrap();

        assert_eq!(priced.bill.total_cents, 34200);
        assert_eq!(priced.order_promotion.as_ref().unwrap().discount_cents, 3800);
    }

    #[test]
    fn test_accepts_order_fixed_discount() {
        // 10000 off 86000 (2 × 43000), total 76000
        let snapshot = PromotionSnapshot::new([promo(
            "tenoff",
            PromotionLayer::Order,
            DiscountKind::Fixed,
            10000,
        )]);
        let priced = reconcile(
            &draft(
                vec![line("li-1", 2, 43000, None)],
                vec!["tenoff"],
                bill(86000, 0, 10000, 0),
            ),
            &snapshot,
        )
        .unwrap();

        assert_eq!(priced.bill.total_cents, 76000);
    }

    #[test]
    fn test_accepts_happy_hour_item_discount() {
        // 8000 off a 43000 item: effective 35000
        let snapshot = PromotionSnapshot::new([promo(
            "hh",
            PromotionLayer::Item,
            DiscountKind::Fixed,
            8000,
        )]);
        let priced = reconcile(
            &draft(
                vec![line("li-1", 1, 43000, Some("hh"))],
                vec![],
                bill(43000, 8000, 0, 0),
            ),
            &snapshot,
        )
        .unwrap();

        assert_eq!(priced.items[0].effective_unit_price_cents, 35000);
        assert_eq!(priced.bill.item_discount_cents, 8000);
        assert_eq!(priced.bill.total_cents, 35000);
    }

    #[test]
    fn test_accepts_combined_layering_on_effective_subtotal() {
        // Item pass: 43000 → 35000; plus 2 × 38000 = 76000 undiscounted.
        // Effective subtotal 111000, 10% order discount = 11100.
        let snapshot = PromotionSnapshot::new([
            promo("hh", PromotionLayer::Item, DiscountKind::Fixed, 8000),
            promo("open", PromotionLayer::Order, DiscountKind::Percentage, 10),
        ]);
        let priced = reconcile(
            &draft(
                vec![
                    line("li-1", 1, 43000, Some("hh")),
                    line("li-2", 2, 38000, None),
                ],
                vec!["open"],
                bill(119000, 8000, 11100, 0),
            ),
            &snapshot,
        )
        .unwrap();

        assert_eq!(priced.bill.order_discount_cents, 11100);
        assert_eq!(priced.bill.total_cents, 119000 - 19100);
    }

    #[test]
    fn test_rejects_order_discount_computed_on_original_subtotal() {
        // A caller that based the 10% on the ORIGINAL subtotal (119000 →
        // 11900) is refused with the authoritative numbers.
        let snapshot = PromotionSnapshot::new([
            promo("hh", PromotionLayer::Item, DiscountKind::Fixed, 8000),
            promo("open", PromotionLayer::Order, DiscountKind::Percentage, 10),
        ]);
        let err = reconcile(
            &draft(
                vec![
                    line("li-1", 1, 43000, Some("hh")),
                    line("li-2", 2, 38000, None),
                ],
                vec!["open"],
                bill(119000, 8000, 11900, 0),
            ),
            &snapshot,
        )
        .unwrap_err();

        match err {
            BillingError::BillMismatch { expected, fields } => {
                assert_eq!(expected.order_discount_cents, 11100);
                assert!(fields.contains(&"orderDiscountCents"));
                assert!(fields.contains(&"totalCents"));
            }
            other => panic!("expected BillMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_rejects_inconsistent_promotion_discount() {
        // The caller's own bill is internally inconsistent: it claims a
        // promotion discount its applied promotions do not produce.
        let snapshot = PromotionSnapshot::new([promo(
            "open",
            PromotionLayer::Order,
            DiscountKind::Percentage,
            10,
        )]);
        let mut submitted = bill(38000, 0, 3800, 0);
        submitted.promotion_discount_cents = 5000;

        let err = reconcile(
            &draft(vec![line("li-1", 1, 38000, None)], vec!["open"], submitted),
            &snapshot,
        )
        .unwrap_err();

        assert!(matches!(err, BillingError::BillMismatch { .. }));
    }

    #[test]
    fn test_rejects_stale_promotion_id() {
        let err = reconcile(
            &draft(
                vec![line("li-1", 1, 38000, None)],
                vec!["expired"],
                bill(38000, 0, 3800, 0),
            ),
            &PromotionSnapshot::empty(),
        )
        .unwrap_err();

        assert!(
            matches!(err, BillingError::PromotionNotApplicable { promotion_id } if promotion_id == "expired")
        );
    }

    #[test]
    fn test_negative_tax_is_a_validation_error_not_a_mismatch() {
        // An otherwise-consistent bill with a negative tax is malformed
        // input, rejected before the comparison ever runs.
        let mut submitted = bill(43000, 0, 0, 0);
        submitted.tax_cents = -5;
        submitted.total_with_tax_cents = 43000 - 5;

        let err = reconcile(
            &draft(vec![line("li-1", 1, 43000, None)], vec![], submitted),
            &PromotionSnapshot::empty(),
        )
        .unwrap_err();

        assert!(matches!(err, BillingError::Validation(_)));
    }

    #[test]
    fn test_off_by_one_total_is_rejected() {
        let mut submitted = bill(43000, 0, 0, 0);
        submitted.total_cents -= 1;
        submitted.total_with_tax_cents -= 1;

        let err = reconcile(
            &draft(vec![line("li-1", 1, 43000, None)], vec![], submitted),
            &PromotionSnapshot::empty(),
        )
        .unwrap_err();

        assert!(matches!(err, BillingError::BillMismatch { .. }));
    }

    #[test]
    fn test_mismatch_carries_full_recomputed_bill() {
        let err = reconcile(
            &draft(vec![line("li-1", 2, 43000, None)], vec![], Bill::default()),
            &PromotionSnapshot::empty(),
        )
        .unwrap_err();

        match err {
            BillingError::BillMismatch { expected, .. } => {
                assert_eq!(expected.subtotal_cents, 86000);
                assert_eq!(expected.total_cents, 86000);
            }
            other => panic!("expected BillMismatch, got {other:?}"),
        }
    }
}
