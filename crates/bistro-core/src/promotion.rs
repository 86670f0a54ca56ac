//! # Promotion Definitions
//!
//! Resolved promotion records consumed by the billing engine.
//!
//! ## Closed Tagged Variants
//! The source of truth for a promotion is a plain record in the promotion
//! store. Inside the engine it becomes a closed pair of enums:
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  PromotionDefinition                                                    │
//! │                                                                         │
//! │  layer: Item  ──► discounts one line item's UNIT price ("happy hour")  │
//! │  layer: Order ──► discounts the order's EFFECTIVE subtotal             │
//! │                                                                         │
//! │  kind: Percentage ──► parameter is a whole percent 0–100               │
//! │  kind: Fixed      ──► parameter is an amount in cents                  │
//! │                                                                         │
//! │  Exhaustive matches at the single computation point: an unknown        │
//! │  kind cannot silently fall through to "no discount".                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Eligibility
//! Whether a promotion is currently eligible (validity window, dish
//! category scope, active flag) is decided by the resolver that builds the
//! [`PromotionSnapshot`], NOT here. The engine only reads the `eligible`
//! flag; it never touches a clock.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// Layer & Kind
// =============================================================================

/// Which part of the order a promotion applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PromotionLayer {
    /// Discounts one line item's unit price ("happy hour").
    Item,
    /// Discounts the whole order's post-item-discount subtotal.
    Order,
}

impl PromotionLayer {
    pub fn as_str(&self) -> &'static str {
        match self {
            PromotionLayer::Item => "item",
            PromotionLayer::Order => "order",
        }
    }
}

/// How a promotion's discount amount is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum DiscountKind {
    /// `parameter` is a whole percent, 0–100.
    Percentage,
    /// `parameter` is an amount in cents.
    Fixed,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiscountKind::Percentage => "percentage",
            DiscountKind::Fixed => "fixed",
        }
    }
}

// =============================================================================
// Promotion Definition
// =============================================================================

/// A resolved promotion definition.
///
/// `parameter` always comes from the promotion store, never from caller
/// input. `eligible` is the resolver's verdict for THIS request (window,
/// category scope, active flag already evaluated).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PromotionDefinition {
    pub id: String,
    pub name: String,
    pub code: String,
    pub layer: PromotionLayer,
    pub kind: DiscountKind,
    /// Percent (0–100) for `Percentage`, cents for `Fixed`.
    pub parameter: i64,
    /// Resolver verdict: currently eligible for the request being priced.
    pub eligible: bool,
}

impl PromotionDefinition {
    /// Discount taken off ONE unit of a line item.
    ///
    /// Percentage rounds per unit price (round half up), never on the line
    /// total; the cart UI previews per-unit, and the recomputation must
    /// reproduce it digit for digit. Fixed clamps at the unit price so the
    /// effective price never goes negative.
    pub fn unit_discount_cents(&self, unit_price_cents: i64) -> i64 {
        let unit = Money::from_cents(unit_price_cents);
        match self.kind {
            DiscountKind::Percentage => unit.percentage(self.parameter).min(unit).cents(),
            DiscountKind::Fixed => Money::from_cents(self.parameter).min(unit).cents(),
        }
    }

    /// Discount taken off the order's effective subtotal.
    ///
    /// Percentage: `round(effective_subtotal × pct / 100)`.
    /// Fixed: `min(amount, effective_subtotal)`, never discounting below zero.
    pub fn order_discount_cents(&self, effective_subtotal_cents: i64) -> i64 {
        let subtotal = Money::from_cents(effective_subtotal_cents);
        match self.kind {
            DiscountKind::Percentage => subtotal.percentage(self.parameter).min(subtotal).cents(),
            DiscountKind::Fixed => Money::from_cents(self.parameter).min(subtotal).cents(),
        }
    }
}

// =============================================================================
// Promotion Snapshot
// =============================================================================

/// Read-only snapshot of the promotion definitions resolved for one
/// order-creation request.
///
/// ## Design
/// The engine never caches or mutates promotion state. The resolver fetches
/// and evaluates definitions up front, freezes them in this snapshot, and
/// the engine does synchronous lookups against it. Two concurrent requests
/// hold two independent snapshots.
#[derive(Debug, Clone, Default)]
pub struct PromotionSnapshot {
    definitions: HashMap<String, PromotionDefinition>,
}

impl PromotionSnapshot {
    /// Builds a snapshot from resolved definitions.
    ///
    /// Later duplicates of the same id replace earlier ones; the resolver
    /// produces at most one definition per id.
    pub fn new(definitions: impl IntoIterator<Item = PromotionDefinition>) -> Self {
        PromotionSnapshot {
            definitions: definitions.into_iter().map(|d| (d.id.clone(), d)).collect(),
        }
    }

    /// Empty snapshot (orders without promotions).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Looks up a definition by id.
    pub fn get(&self, id: &str) -> Option<&PromotionDefinition> {
        self.definitions.get(id)
    }

    /// Looks up a definition that is eligible AND belongs to the given
    /// layer. Returns `None` for unknown ids, ineligible definitions, and
    /// layer mismatches alike; the caller maps all three to
    /// `PromotionNotApplicable`.
    pub fn get_eligible(&self, id: &str, layer: PromotionLayer) -> Option<&PromotionDefinition> {
        self.definitions
            .get(id)
            .filter(|d| d.eligible && d.layer == layer)
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn def(kind: DiscountKind, parameter: i64) -> PromotionDefinition {
        PromotionDefinition {
            id: "promo-1".to_string(),
            name: "Test".to_string(),
            code: "TEST".to_string(),
            layer: PromotionLayer::Item,
            kind,
            parameter,
            eligible: true,
        }
    }

    #[test]
    fn test_percentage_unit_discount() {
        let promo = def(DiscountKind::Percentage, 10);
        assert_eq!(promo.unit_discount_cents(43000), 4300);
    }

    #[test]
    fn test_fixed_unit_discount() {
        let promo = def(DiscountKind::Fixed, 8000);
        assert_eq!(promo.unit_discount_cents(43000), 8000);
    }

    #[test]
    fn test_fixed_unit_discount_clamps_at_unit_price() {
        let promo = def(DiscountKind::Fixed, 50000);
        assert_eq!(promo.unit_discount_cents(43000), 43000);
    }

    #[test]
    fn test_percentage_order_discount() {
        let promo = def(DiscountKind::Percentage, 10);
        assert_eq!(promo.order_discount_cents(111000), 11100);
    }

    #[test]
    fn test_fixed_order_discount_clamps_at_subtotal() {
        let promo = def(DiscountKind::Fixed, 100000);
        assert_eq!(promo.order_discount_cents(86000), 86000);
    }

    #[test]
    fn test_oversized_percentage_clamps() {
        // Definitions are validated to 0–100, but the computation still
        // clamps so a bad record cannot produce a negative total.
        let promo = def(DiscountKind::Percentage, 150);
        assert_eq!(promo.order_discount_cents(100000), 100000);
    }

    #[test]
    fn test_snapshot_lookup() {
        let snapshot = PromotionSnapshot::new([def(DiscountKind::Percentage, 10)]);

        assert!(snapshot.get("promo-1").is_some());
        assert!(snapshot
            .get_eligible("promo-1", PromotionLayer::Item)
            .is_some());
        // Wrong layer
        assert!(snapshot
            .get_eligible("promo-1", PromotionLayer::Order)
            .is_none());
        // Unknown id
        assert!(snapshot.get_eligible("nope", PromotionLayer::Item).is_none());
    }

    #[test]
    fn test_snapshot_ineligible_definition() {
        let mut promo = def(DiscountKind::Percentage, 10);
        promo.eligible = false;
        let snapshot = PromotionSnapshot::new([promo]);

        assert!(snapshot.get("promo-1").is_some());
        assert!(snapshot
            .get_eligible("promo-1", PromotionLayer::Item)
            .is_none());
    }

    #[test]
    fn test_serde_tags() {
        let json = serde_json::to_string(&PromotionLayer::Item).unwrap();
        assert_eq!(json, r#""item""#);
        let json = serde_json::to_string(&DiscountKind::Percentage).unwrap();
        assert_eq!(json, r#""percentage""#);
    }
}
