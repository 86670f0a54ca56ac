//! # Domain Types
//!
//! Core domain types for the order billing pipeline.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Document                                    │
//! │                                                                         │
//! │  DraftOrder (caller input)          Order (persisted, validated)       │
//! │  ┌──────────────────────┐           ┌──────────────────────────┐       │
//! │  │ customer             │           │ id (UUID)                │       │
//! │  │ items: [LineItem]    │  ──gate─► │ status                   │       │
//! │  │ order_promotion_ids  │           │ items: [PricedLineItem]  │       │
//! │  │ bill (caller's)      │           │ order_promotion?         │       │
//! │  └──────────────────────┘           │ bill (validated)         │       │
//! │                                     └──────────────────────────┘       │
//! │                                                                         │
//! │  The gate is the reconciliation engine: the draft's bill must match    │
//! │  the independently recomputed bill field for field, exactly.           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! Line items freeze the dish name/category/unit price at submission time.
//! The bill is immutable once the order is accepted: later status changes
//! (pending → progress → completed) touch only order metadata, never money.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::promotion::DiscountKind;

// =============================================================================
// Line Items
// =============================================================================

/// One ordered dish configuration as submitted by the caller.
///
/// `unit_price_cents` is the undiscounted unit price including any selected
/// variant/topping cost. `id` is caller-assigned and must be unique within
/// the order (the cart generates it).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// Caller-assigned id, unique within the order.
    pub id: String,

    /// Dish this item was built from (descriptive, not used in arithmetic).
    pub dish_id: String,

    /// Dish name at submission time (frozen).
    pub name: String,

    /// Dish category at submission time (frozen). Item-level promotions may
    /// be scoped to a category; the resolver checks that, not the engine.
    pub category: String,

    /// Quantity ordered (integer ≥ 1).
    pub quantity: i64,

    /// Undiscounted unit price in cents, variant/topping cost included.
    pub unit_price_cents: i64,

    /// Candidate item-level promotion id ("happy hour"), if the cart
    /// applied one. Resolved and verified server-side; an id that does not
    /// resolve to an eligible item-layer promotion rejects the whole order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub promotion_id: Option<String>,
}

impl LineItem {
    /// Line total before any discount (`unit_price × quantity`).
    /// Always recomputed, never trusted from the caller.
    #[inline]
    pub fn line_total_cents(&self) -> i64 {
        self.unit_price_cents * self.quantity
    }
}

/// The single item-level promotion applied to a line item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ItemPromotion {
    pub promotion_id: String,
    pub name: String,
    /// `line_total − effective_total`, always ≥ 0.
    pub discount_cents: i64,
}

/// A line item annotated with the outcome of the item-level discount pass.
///
/// Invariants: at most one item promotion per line;
/// `effective_total_cents ≤ line_total_cents`; discount ≥ 0.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PricedLineItem {
    pub id: String,
    pub dish_id: String,
    pub name: String,
    pub category: String,
    pub quantity: i64,
    pub unit_price_cents: i64,

    /// `unit_price_cents × quantity`, recomputed.
    pub line_total_cents: i64,

    /// Unit price after the item-level discount (= unit price when no
    /// promotion applies).
    pub effective_unit_price_cents: i64,

    /// `effective_unit_price_cents × quantity`.
    pub effective_total_cents: i64,

    /// The applied item-level promotion, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<ItemPromotion>")]
    pub promotion: Option<ItemPromotion>,
}

impl PricedLineItem {
    /// A line item priced at its original price (no promotion).
    pub fn undiscounted(item: &LineItem) -> Self {
        let line_total = item.line_total_cents();
        PricedLineItem {
            id: item.id.clone(),
            dish_id: item.dish_id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            line_total_cents: line_total,
            effective_unit_price_cents: item.unit_price_cents,
            effective_total_cents: line_total,
            promotion: None,
        }
    }
}

// =============================================================================
// Order-Level Promotion
// =============================================================================

/// The single order-level promotion applied to the whole order.
///
/// `parameter` is copied from the resolved definition (percent 0–100 or
/// cents), never from caller input. Exactly zero or one per order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct AppliedOrderPromotion {
    pub promotion_id: String,
    pub name: String,
    pub code: String,
    pub kind: DiscountKind,
    pub parameter: i64,
    /// Computed on the EFFECTIVE subtotal (post-item-discount).
    pub discount_cents: i64,
}

// =============================================================================
// Bill
// =============================================================================

/// The derived monetary totals for an order. Immutable once computed.
///
/// ## Derivations
/// ```text
/// subtotal        = Σ line_total            (original prices)
/// item_discount   = Σ item promotion discounts
/// order_discount  = order promotion discount (on effective subtotal) or 0
/// promotion_discount = item_discount + order_discount
/// total           = subtotal − promotion_discount
/// tax             = pass-through flat amount (not derived here)
/// total_with_tax  = total + tax
/// ```
/// All fields are non-negative integers; `total ≥ 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Bill {
    pub subtotal_cents: i64,
    pub item_discount_cents: i64,
    pub order_discount_cents: i64,
    pub promotion_discount_cents: i64,
    pub total_cents: i64,
    pub tax_cents: i64,
    pub total_with_tax_cents: i64,
}

impl Bill {
    /// Compares against another bill with exact integer equality and
    /// returns the names of every mismatching field.
    ///
    /// No epsilon: the smallest currency unit has no fraction, so "off by
    /// one" is a real disagreement, not noise. An empty result means the
    /// bills are identical.
    pub fn mismatched_fields(&self, other: &Bill) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.subtotal_cents != other.subtotal_cents {
            fields.push("subtotalCents");
        }
        if self.item_discount_cents != other.item_discount_cents {
            fields.push("itemDiscountCents");
        }
        if self.order_discount_cents != other.order_discount_cents {
            fields.push("orderDiscountCents");
        }
        if self.promotion_discount_cents != other.promotion_discount_cents {
            fields.push("promotionDiscountCents");
        }
        if self.total_cents != other.total_cents {
            fields.push("totalCents");
        }
        if self.tax_cents != other.tax_cents {
            fields.push("taxCents");
        }
        if self.total_with_tax_cents != other.total_with_tax_cents {
            fields.push("totalWithTaxCents");
        }
        fields
    }
}

// =============================================================================
// Customer Details
// =============================================================================

/// Who and where the order is for. Descriptive only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, Default)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub phone: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<String>")]
    pub table_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<i64>")]
    pub guest_count: Option<i64>,
}

// =============================================================================
// Draft Order
// =============================================================================

/// The caller-submitted order document: line items, candidate promotions,
/// and the caller's own locally-computed bill.
///
/// The engine recomputes the bill independently from the same inputs and
/// rejects the request if the two disagree on any field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DraftOrder {
    pub customer: CustomerDetails,

    pub items: Vec<LineItem>,

    /// Candidate order-level promotion ids. At most ONE is permitted; a
    /// second id in the same request is a validation error, not silently
    /// ignored.
    #[serde(default)]
    pub order_promotion_ids: Vec<String>,

    /// The bill the caller computed locally. Compared, never trusted.
    pub bill: Bill,
}

// =============================================================================
// Order Status
// =============================================================================

/// Kitchen-side lifecycle of an accepted order.
///
/// Status transitions never touch the bill; the monetary document is
/// frozen at acceptance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted, not yet picked up by the kitchen.
    Pending,
    /// Being prepared.
    Progress,
    /// Prepared, waiting to be served.
    Ready,
    /// Served and closed.
    Completed,
    /// Cancelled before completion.
    Cancelled,
}

impl OrderStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Progress => "progress",
            OrderStatus::Ready => "ready",
            OrderStatus::Completed => "completed",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// Parses the database/API representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(OrderStatus::Pending),
            "progress" => Some(OrderStatus::Progress),
            "ready" => Some(OrderStatus::Ready),
            "completed" => Some(OrderStatus::Completed),
            "cancelled" => Some(OrderStatus::Cancelled),
            _ => None,
        }
    }

    /// Whether a transition to `next` is allowed.
    ///
    /// ```text
    /// pending ──► progress ──► ready ──► completed
    ///    │            │          │
    ///    │            ├──────────┼─────► completed
    ///    └────────────┴──────────┴─────► cancelled
    /// ```
    /// Completed and cancelled are terminal.
    pub fn can_transition_to(&self, next: OrderStatus) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Pending, Progress)
                | (Pending, Cancelled)
                | (Progress, Ready)
                | (Progress, Completed)
                | (Progress, Cancelled)
                | (Ready, Completed)
                | (Ready, Cancelled)
        )
    }

    /// Terminal states admit no further transition.
    pub fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Completed | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

// =============================================================================
// Order (persisted document)
// =============================================================================

/// An accepted order as persisted.
///
/// Built once from the validated draft; the monetary fields are never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique identifier (UUID v4).
    pub id: String,

    pub status: OrderStatus,

    pub customer: CustomerDetails,

    pub items: Vec<PricedLineItem>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[ts(as = "Option<AppliedOrderPromotion>")]
    pub order_promotion: Option<AppliedOrderPromotion>,

    pub bill: Bill,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,

    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
}

// =============================================================================
// Unit Tests
// =============================================================================
