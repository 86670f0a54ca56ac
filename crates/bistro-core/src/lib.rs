//! # bistro-core: Pure Business Logic for Bistro POS
//!
//! This crate is the **heart** of Bistro POS. It contains the order billing
//! and promotion reconciliation engine as pure functions with zero I/O
//! dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Bistro POS Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Cart UI (untrusted client)                   │   │
//! │  │    Menu ──► Cart ──► local bill preview ──► submit order       │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP JSON                              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/order-api (Axum)                        │   │
//! │  │    resolve promotions ──► reconcile ──► persist                │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bistro-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐ ┌───────────┐ ┌───────────┐ ┌───────────────┐ │   │
//! │  │   │   types   │ │   money   │ │ promotion │ │    billing    │ │   │
//! │  │   │ LineItem  │ │   Money   │ │ Snapshot  │ │  two passes   │ │   │
//! │  │   │   Bill    │ │  rounding │ │ layer/kind│ │  + reconcile  │ │   │
//! │  │   └───────────┘ └───────────┘ └───────────┘ └───────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    bistro-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (LineItem, DraftOrder, Bill, Order)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`promotion`] - Resolved promotion definitions and the per-request snapshot
//! - [`billing`] - The two-pass discount pipeline (item layer, then order layer)
//! - [`reconcile`] - The exact-match gate against caller-submitted bills
//! - [`error`] - Domain error types
//! - [`validation`] - Structural validation of submitted orders
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: pricing is deterministic - same draft and snapshot,
//!    same bill, every time
//! 2. **No I/O**: database, network, clock access is FORBIDDEN here; even
//!    promotion eligibility arrives pre-evaluated in the snapshot
//! 3. **Integer Money**: all monetary values are in the smallest currency
//!    unit (i64) to avoid float errors
//! 4. **Exact Reconciliation**: caller bills are compared with exact integer
//!    equality, never a tolerance
//!
//! ## Example Usage
//!
//! ```rust
//! use bistro_core::billing::price_order;
//! use bistro_core::promotion::PromotionSnapshot;
//! use bistro_core::types::{Bill, CustomerDetails, DraftOrder, LineItem};
//!
//! let draft = DraftOrder {
//!     customer: CustomerDetails { name: "walk-in".into(), ..Default::default() },
//!     items: vec![LineItem {
//!         id: "li-1".into(),
//!         dish_id: "dish-1".into(),
//!         name: "Pho Bo".into(),
//!         category: "noodles".into(),
//!         quantity: 2,
//!         unit_price_cents: 43000,
//!         promotion_id: None,
//!     }],
//!     order_promotion_ids: vec![],
//!     bill: Bill::default(),
//! };
//!
//! let priced = price_order(&draft, &PromotionSnapshot::empty()).unwrap();
//! assert_eq!(priced.bill.subtotal_cents, 86000);
//! assert_eq!(priced.bill.total_cents, 86000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod billing;
pub mod error;
pub mod money;
pub mod promotion;
pub mod reconcile;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use bistro_core::Money` instead of
// `use bistro_core::money::Money`

pub use billing::{price_order, PricedOrder};
pub use error::{BillingError, BillingResult, ValidationError};
pub use money::Money;
pub use promotion::{DiscountKind, PromotionDefinition, PromotionLayer, PromotionSnapshot};
pub use reconcile::reconcile;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum line items allowed in a single order
///
/// ## Business Reason
/// Prevents runaway orders and keeps request payloads bounded.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single line item
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum unit price in the smallest currency unit
///
/// ## Business Reason
/// An upper bound far below i64::MAX keeps every intermediate line total
/// (price × quantity × 100 items) comfortably inside integer range.
pub const MAX_UNIT_PRICE_CENTS: i64 = 1_000_000_000;
