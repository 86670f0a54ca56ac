//! # Order Repository
//!
//! Database operations for accepted orders.
//!
//! ## Order Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Order Lifecycle                                   │
//! │                                                                         │
//! │  1. INSERT (once, after the reconciliation gate)                       │
//! │     └── insert() → orders row + order_items rows, ONE transaction      │
//! │         The document is stored verbatim: the validated items, the      │
//! │         applied promotions, the bill. Nothing partial on failure.      │
//! │                                                                         │
//! │  2. STATUS CHANGES                                                     │
//! │     └── update_status() → status/updated_at/completed_at ONLY          │
//! │         Bill columns are never touched after insert.                   │
//! │                                                                         │
//! │  3. READ                                                               │
//! │     └── get_by_id() → reassembles the full document                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bistro_core::{
    AppliedOrderPromotion, Bill, CustomerDetails, DiscountKind, ItemPromotion, Order, OrderStatus,
    PricedLineItem,
};

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    status: String,
    customer_name: String,
    customer_phone: Option<String>,
    table_number: Option<String>,
    guest_count: Option<i64>,
    subtotal_cents: i64,
    item_discount_cents: i64,
    order_discount_cents: i64,
    promotion_discount_cents: i64,
    total_cents: i64,
    tax_cents: i64,
    total_with_tax_cents: i64,
    order_promotion_id: Option<String>,
    order_promotion_name: Option<String>,
    order_promotion_code: Option<String>,
    order_promotion_kind: Option<String>,
    order_promotion_parameter: Option<i64>,
    order_promotion_discount_cents: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    id: String,
    dish_id: String,
    name: String,
    category: String,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
    effective_unit_price_cents: i64,
    effective_total_cents: i64,
    promotion_id: Option<String>,
    promotion_name: Option<String>,
    promotion_discount_cents: Option<i64>,
}

impl OrderRow {
    fn into_order(self, items: Vec<PricedLineItem>) -> DbResult<Order> {
        let status = OrderStatus::parse(&self.status).ok_or_else(|| {
            DbError::corrupt_row("order", &self.id, format!("unknown status '{}'", self.status))
        })?;

        let order_promotion = match self.order_promotion_id {
            Some(promotion_id) => {
                let kind_tag = self.order_promotion_kind.as_deref().unwrap_or("");
                let kind = match kind_tag {
                    "percentage" => DiscountKind::Percentage,
                    "fixed" => DiscountKind::Fixed,
                    other => {
                        return Err(DbError::corrupt_row(
                            "order",
                            &self.id,
                            format!("unknown promotion kind '{other}'"),
                        ))
                    }
                };
                Some(AppliedOrderPromotion {
                    promotion_id,
                    name: self.order_promotion_name.unwrap_or_default(),
                    code: self.order_promotion_code.unwrap_or_default(),
                    kind,
                    parameter: self.order_promotion_parameter.unwrap_or(0),
                    discount_cents: self.order_promotion_discount_cents.unwrap_or(0),
                })
            }
            None => None,
        };

        Ok(Order {
            id: self.id,
            status,
            customer: CustomerDetails {
                name: self.customer_name,
                phone: self.customer_phone,
                table_number: self.table_number,
                guest_count: self.guest_count,
            },
            items,
            order_promotion,
            bill: Bill {
                subtotal_cents: self.subtotal_cents,
                item_discount_cents: self.item_discount_cents,
                order_discount_cents: self.order_discount_cents,
                promotion_discount_cents: self.promotion_discount_cents,
                total_cents: self.total_cents,
                tax_cents: self.tax_cents,
                total_with_tax_cents: self.total_with_tax_cents,
            },
            created_at: self.created_at,
            updated_at: self.updated_at,
            completed_at: self.completed_at,
        })
    }
}

impl From<OrderItemRow> for PricedLineItem {
    fn from(row: OrderItemRow) -> Self {
        let promotion = row.promotion_id.map(|promotion_id| ItemPromotion {
            promotion_id,
            name: row.promotion_name.unwrap_or_default(),
            discount_cents: row.promotion_discount_cents.unwrap_or(0),
        });

        PricedLineItem {
            id: row.id,
            dish_id: row.dish_id,
            name: row.name,
            category: row.category,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
            line_total_cents: row.line_total_cents,
            effective_unit_price_cents: row.effective_unit_price_cents,
            effective_total_cents: row.effective_total_cents,
            promotion,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts a validated order document.
    ///
    /// ## Atomicity
    /// The order row and all item rows go in one transaction. If any
    /// insert fails the transaction rolls back and nothing is persisted,
    /// which is what makes every billing failure "nothing happened".
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        debug!(id = %order.id, items = order.items.len(), "Inserting order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, status,
                customer_name, customer_phone, table_number, guest_count,
                subtotal_cents, item_discount_cents, order_discount_cents,
                promotion_discount_cents, total_cents, tax_cents, total_with_tax_cents,
                order_promotion_id, order_promotion_name, order_promotion_code,
                order_promotion_kind, order_promotion_parameter,
                order_promotion_discount_cents,
                created_at, updated_at, completed_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11,
                ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22
            )
            "#,
        )
        .bind(&order.id)
        .bind(order.status.as_str())
        .bind(&order.customer.name)
        .bind(&order.customer.phone)
        .bind(&order.customer.table_number)
        .bind(order.customer.guest_count)
        .bind(order.bill.subtotal_cents)
        .bind(order.bill.item_discount_cents)
        .bind(order.bill.order_discount_cents)
        .bind(order.bill.promotion_discount_cents)
        .bind(order.bill.total_cents)
        .bind(order.bill.tax_cents)
        .bind(order.bill.total_with_tax_cents)
        .bind(order.order_promotion.as_ref().map(|p| p.promotion_id.clone()))
        .bind(order.order_promotion.as_ref().map(|p| p.name.clone()))
        .bind(order.order_promotion.as_ref().map(|p| p.code.clone()))
        .bind(order.order_promotion.as_ref().map(|p| p.kind.as_str()))
        .bind(order.order_promotion.as_ref().map(|p| p.parameter))
        .bind(order.order_promotion.as_ref().map(|p| p.discount_cents))
        .bind(order.created_at)
        .bind(order.updated_at)
        .bind(order.completed_at)
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, id, position,
                    dish_id, name, category, quantity,
                    unit_price_cents, line_total_cents,
                    effective_unit_price_cents, effective_total_cents,
                    promotion_id, promotion_name, promotion_discount_cents
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
                "#,
            )
            .bind(&order.id)
            .bind(&item.id)
            .bind(position as i64)
            .bind(&item.dish_id)
            .bind(&item.name)
            .bind(&item.category)
            .bind(item.quantity)
            .bind(item.unit_price_cents)
            .bind(item.line_total_cents)
            .bind(item.effective_unit_price_cents)
            .bind(item.effective_total_cents)
            .bind(item.promotion.as_ref().map(|p| p.promotion_id.clone()))
            .bind(item.promotion.as_ref().map(|p| p.name.clone()))
            .bind(item.promotion.as_ref().map(|p| p.discount_cents))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Gets an order by id, reassembling the full document.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as("SELECT * FROM orders WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items: Vec<OrderItemRow> = sqlx::query_as(
            r#"
            SELECT id, dish_id, name, category, quantity,
                   unit_price_cents, line_total_cents,
                   effective_unit_price_cents, effective_total_cents,
                   promotion_id, promotion_name, promotion_discount_cents
            FROM order_items
            WHERE order_id = ?1
            ORDER BY position
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        let items = items.into_iter().map(PricedLineItem::from).collect();
        Some(row.into_order(items)).transpose()
    }

    /// Updates an order's status.
    ///
    /// ## Transition Guard
    /// The transition is validated against the current stored status inside
    /// the UPDATE's WHERE clause, so a concurrent status change cannot slip
    /// an illegal transition through. When the guard matches nothing, the
    /// row is re-read to tell "order gone" from "status moved under us";
    /// the latter is a [`DbError::Conflict`]. Returns the updated order.
    ///
    /// Bill columns are never part of this statement.
    pub async fn update_status(
        &self,
        id: &str,
        from: OrderStatus,
        to: OrderStatus,
        now: DateTime<Utc>,
    ) -> DbResult<Order> {
        let completed_at = match to {
            OrderStatus::Completed | OrderStatus::Cancelled => Some(now),
            _ => None,
        };

        let result = sqlx::query(
            r#"
            UPDATE orders
            SET status = ?3, updated_at = ?4, completed_at = ?5
            WHERE id = ?1 AND status = ?2
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .bind(now)
        .bind(completed_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return match self.get_by_id(id).await? {
                Some(current) => Err(DbError::Conflict {
                    entity: "order".to_string(),
                    id: id.to_string(),
                    reason: format!(
                        "status is '{}', expected '{}'",
                        current.status.as_str(),
                        from.as_str()
                    ),
                }),
                None => Err(DbError::not_found("order", id)),
            };
        }

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("order", id))
    }

    /// Lists the most recent orders (without their items).
    pub async fn list_recent(&self, limit: i64) -> DbResult<Vec<Order>> {
        let rows: Vec<OrderRow> =
            sqlx::query_as("SELECT * FROM orders ORDER BY created_at DESC LIMIT ?1")
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

        rows.into_iter()
            .map(|row| row.into_order(Vec::new()))
            .collect()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    fn sample_order(id: &str) -> Order {
        let now = Utc::now();
        Order {
            id: id.to_string(),
            status: OrderStatus::Pending,
            customer: CustomerDetails {
                name: "Table 4".to_string(),
                phone: None,
                table_number: Some("4".to_string()),
                guest_count: Some(2),
            },
            items: vec![PricedLineItem {
                id: "li-1".to_string(),
                dish_id: "dish-1".to_string(),
                name: "Pho Bo".to_string(),
                category: "noodles".to_string(),
                quantity: 1,
                unit_price_cents: 43000,
                line_total_cents: 43000,
                effective_unit_price_cents: 35000,
                effective_total_cents: 35000,
                promotion: Some(ItemPromotion {
                    promotion_id: "hh".to_string(),
                    name: "Happy Hour".to_string(),
                    discount_cents: 8000,
                }),
            }],
            order_promotion: Some(AppliedOrderPromotion {
                promotion_id: "open".to_string(),
                name: "Grand Opening".to_string(),
                code: "OPEN".to_string(),
                kind: DiscountKind::Percentage,
                parameter: 10,
                discount_cents: 3500,
            }),
            bill: Bill {
                subtotal_cents: 43000,
                item_discount_cents: 8000,
                order_discount_cents: 3500,
                promotion_discount_cents: 11500,
                total_cents: 31500,
                tax_cents: 0,
                total_with_tax_cents: 31500,
            },
            created_at: now,
            updated_at: now,
            completed_at: None,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_round_trips_document() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let order = sample_order("order-1");
        repo.insert(&order).await.unwrap();

        let fetched = repo.get_by_id("order-1").await.unwrap().unwrap();
        assert_eq!(fetched.bill, order.bill);
        assert_eq!(fetched.items.len(), 1);
        assert_eq!(fetched.items[0].effective_total_cents, 35000);
        assert_eq!(
            fetched.order_promotion.as_ref().unwrap().promotion_id,
            "open"
        );
        assert_eq!(fetched.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_get_unknown_order() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.orders().get_by_id("ghost").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_update_status_leaves_bill_untouched() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        let order = sample_order("order-1");
        repo.insert(&order).await.unwrap();

        let updated = repo
            .update_status("order-1", OrderStatus::Pending, OrderStatus::Progress, Utc::now())
            .await
            .unwrap();

        assert_eq!(updated.status, OrderStatus::Progress);
        assert_eq!(updated.bill, order.bill);
        assert!(updated.completed_at.is_none());
    }

    #[tokio::test]
    async fn test_update_status_sets_completed_at() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();
        repo.insert(&sample_order("order-1")).await.unwrap();

        repo.update_status("order-1", OrderStatus::Pending, OrderStatus::Progress, Utc::now())
            .await
            .unwrap();
        let done = repo
            .update_status("order-1", OrderStatus::Progress, OrderStatus::Completed, Utc::now())
            .await
            .unwrap();

        assert_eq!(done.status, OrderStatus::Completed);
        assert!(done.completed_at.is_some());
    }

    #[tokio::test]
    async fn test_update_status_stale_from_is_a_conflict() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();
        repo.insert(&sample_order("order-1")).await.unwrap();

        // The stored status is pending, so a progress → ready update
        // matches nothing, and the order still existing makes it a
        // conflict rather than a missing row
        let err = repo
            .update_status("order-1", OrderStatus::Progress, OrderStatus::Ready, Utc::now())
            .await
            .unwrap_err();
        assert!(
            matches!(err, DbError::Conflict { ref reason, .. } if reason.contains("pending"))
        );
    }

    #[tokio::test]
    async fn test_update_status_unknown_order_is_not_found() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let err = db
            .orders()
            .update_status("ghost", OrderStatus::Pending, OrderStatus::Progress, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_duplicate_order_id_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        repo.insert(&sample_order("order-1")).await.unwrap();
        let err = repo.insert(&sample_order("order-1")).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_recent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.orders();

        repo.insert(&sample_order("order-1")).await.unwrap();
        repo.insert(&sample_order("order-2")).await.unwrap();

        let recent = repo.list_recent(10).await.unwrap();
        assert_eq!(recent.len(), 2);
    }
}
