//! # Order Routes
//!
//! The order-creation gate and the kitchen-side status endpoints.
//!
//! ## Creation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  POST /api/orders                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  resolve_promotions(db, draft, now)  ← eligibility frozen here         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  reconcile(draft, snapshot)          ← pure, recomputes + compares     │
//! │       │                                                                 │
//! │       ├── any billing error ──► 4xx, NOTHING persisted                 │
//! │       ▼                                                                 │
//! │  OrderRepository::insert (one transaction) ──► 201 + full document    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Status changes go through the `OrderStatus` transition relation and
//! never touch the bill.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use bistro_core::{reconcile, DraftOrder, Order, OrderStatus};

use crate::error::ApiError;
use crate::resolver::resolve_promotions;
use crate::state::AppState;

/// Order routes.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/orders", post(create_order))
        .route("/api/orders/{id}", get(get_order))
        .route("/api/orders/{id}/status", post(update_status))
}

/// POST /api/orders
///
/// The reconciliation gate. The draft's bill is recomputed from the line
/// items and the resolved promotion definitions; the order is accepted
/// only on an exact match. Any failure leaves nothing persisted.
pub async fn create_order(
    State(state): State<AppState>,
    Json(draft): Json<DraftOrder>,
) -> Result<(StatusCode, Json<Order>), ApiError> {
    let now = Utc::now();

    let snapshot = resolve_promotions(&state.db, &draft, now).await?;
    let priced = reconcile(&draft, &snapshot)?;

    let order = Order {
        id: Uuid::new_v4().to_string(),
        status: OrderStatus::Pending,
        customer: draft.customer,
        items: priced.items,
        order_promotion: priced.order_promotion,
        bill: priced.bill,
        created_at: now,
        updated_at: now,
        completed_at: None,
    };

    state.db.orders().insert(&order).await?;

    info!(
        id = %order.id,
        total_cents = order.bill.total_cents,
        items = order.items.len(),
        "Order accepted"
    );

    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders/{id}
pub async fn get_order(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("order", &id))?;

    Ok(Json(order))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdateRequest {
    pub status: OrderStatus,
}

/// POST /api/orders/{id}/status
///
/// Advances the kitchen status. The transition must be legal from the
/// currently stored status; the bill is never touched.
pub async fn update_status(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<Json<Order>, ApiError> {
    let order = state
        .db
        .orders()
        .get_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::not_found("order", &id))?;

    if !order.status.can_transition_to(request.status) {
        return Err(ApiError::validation(format!(
            "cannot transition from {} to {}",
            order.status.as_str(),
            request.status.as_str()
        )));
    }

    let updated = state
        .db
        .orders()
        .update_status(&id, order.status, request.status, Utc::now())
        .await?;

    info!(id = %id, status = updated.status.as_str(), "Order status updated");

    Ok(Json(updated))
}

// =============================================================================
// Router Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routes;
    use axum::body::Body;
    use axum::http::{header, Request};
    use bistro_core::{DiscountKind, PromotionLayer};
    use bistro_db::{Database, DbConfig, PromotionRecord};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    async fn test_state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let now = Utc::now();

        let promos = [
            PromotionRecord {
                id: "hh".to_string(),
                name: "Happy Hour".to_string(),
                code: "HH".to_string(),
                layer: PromotionLayer::Item,
                kind: DiscountKind::Fixed,
                parameter: 8000,
                category_scope: None,
                valid_from: None,
                valid_until: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
            PromotionRecord {
                id: "open".to_string(),
                name: "Grand Opening".to_string(),
                code: "OPEN".to_string(),
                layer: PromotionLayer::Order,
                kind: DiscountKind::Percentage,
                parameter: 10,
                category_scope: None,
                valid_from: None,
                valid_until: None,
                is_active: true,
                created_at: now,
                updated_at: now,
            },
        ];
        for promo in &promos {
            db.promotions().insert(promo).await.unwrap();
        }

        AppState::new(db)
    }

    fn app(state: AppState) -> axum::Router {
        routes::router(state)
    }

    async fn send_json(
        app: &axum::Router,
        method: &str,
        uri: &str,
        body: Value,
    ) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn get_json(app: &axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn pho(promotion: Option<&str>) -> Value {
        let mut item = json!({
            "id": "li-1",
            "dishId": "dish-pho",
            "name": "Pho Bo",
            "category": "noodles",
            "quantity": 1,
            "unitPriceCents": 43000
        });
        if let Some(p) = promotion {
            item["promotionId"] = json!(p);
        }
        item
    }

    fn draft(items: Value, order_promos: Value, bill: Value) -> Value {
        json!({
            "customer": { "name": "Table 4", "tableNumber": "4" },
            "items": items,
            "orderPromotionIds": order_promos,
            "bill": bill
        })
    }

    fn bill(subtotal: i64, item_disc: i64, order_disc: i64) -> Value {
        let total = subtotal - item_disc - order_disc;
        json!({
            "subtotalCents": subtotal,
            "itemDiscountCents": item_disc,
            "orderDiscountCents": order_disc,
            "promotionDiscountCents": item_disc + order_disc,
            "totalCents": total,
            "taxCents": 0,
            "totalWithTaxCents": total
        })
    }

    #[tokio::test]
    async fn test_create_and_fetch_order() {
        let app = app(test_state().await);

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/orders",
            draft(json!([pho(None)]), json!([]), bill(43000, 0, 0)),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["bill"]["totalCents"], 43000);
        assert_eq!(body["status"], "pending");

        let id = body["id"].as_str().unwrap();
        let (status, fetched) = get_json(&app, &format!("/api/orders/{id}")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(fetched["bill"], body["bill"]);
        assert_eq!(fetched["items"][0]["name"], "Pho Bo");
    }

    #[tokio::test]
    async fn test_create_order_with_both_promotion_layers() {
        let app = app(test_state().await);

        // 43000 - 8000 = 35000 effective; 10% of 35000 = 3500
        let (status, body) = send_json(
            &app,
            "POST",
            "/api/orders",
            draft(
                json!([pho(Some("hh"))]),
                json!(["open"]),
                bill(43000, 8000, 3500),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["bill"]["orderDiscountCents"], 3500);
        assert_eq!(body["bill"]["totalCents"], 31500);
        assert_eq!(body["items"][0]["effectiveUnitPriceCents"], 35000);
        assert_eq!(body["orderPromotion"]["code"], "OPEN");
    }

    #[tokio::test]
    async fn test_bill_mismatch_rejected_with_recomputed_bill() {
        let state = test_state().await;
        let app = app(state.clone());

        // Caller based the 10% on the original subtotal: 4300 instead of 3500
        let (status, body) = send_json(
            &app,
            "POST",
            "/api/orders",
            draft(
                json!([pho(Some("hh"))]),
                json!(["open"]),
                bill(43000, 8000, 4300),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "BILL_MISMATCH");
        assert_eq!(body["recomputedBill"]["orderDiscountCents"], 3500);

        // Nothing persisted
        let recent = state.db.orders().list_recent(10).await.unwrap();
        assert!(recent.is_empty());
    }

    #[tokio::test]
    async fn test_stale_promotion_rejected() {
        let app = app(test_state().await);

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/orders",
            draft(json!([pho(Some("expired"))]), json!([]), bill(43000, 8000, 0)),
        )
        .await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["code"], "PROMOTION_NOT_APPLICABLE");
    }

    #[tokio::test]
    async fn test_two_order_promotions_rejected() {
        let app = app(test_state().await);

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/orders",
            draft(
                json!([pho(None)]),
                json!(["open", "open-2"]),
                bill(43000, 0, 4300),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "TOO_MANY_PROMOTIONS");
    }

    #[tokio::test]
    async fn test_empty_order_rejected() {
        let app = app(test_state().await);

        let (status, body) = send_json(
            &app,
            "POST",
            "/api/orders",
            draft(json!([]), json!([]), bill(0, 0, 0)),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_status_transitions() {
        let app = app(test_state().await);

        let (_, created) = send_json(
            &app,
            "POST",
            "/api/orders",
            draft(json!([pho(None)]), json!([]), bill(43000, 0, 0)),
        )
        .await;
        let id = created["id"].as_str().unwrap();
        let uri = format!("/api/orders/{id}/status");

        let (status, body) = send_json(&app, "POST", &uri, json!({ "status": "progress" })).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "progress");
        // The bill survives status changes untouched
        assert_eq!(body["bill"], created["bill"]);

        // Illegal: progress → pending
        let (status, body) = send_json(&app, "POST", &uri, json!({ "status": "pending" })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, body) = send_json(&app, "POST", &uri, json!({ "status": "ready" })).await;
        assert_eq!(status, StatusCode::OK);
        let (status, body2) = send_json(&app, "POST", &uri, json!({ "status": "completed" })).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body2["completedAt"].is_string());
        assert_eq!(body["bill"], body2["bill"]);
    }

    #[tokio::test]
    async fn test_unknown_order_returns_404() {
        let app = app(test_state().await);

        let (status, body) = get_json(&app, "/api/orders/ghost").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "NOT_FOUND");

        let (status, _) = send_json(
            &app,
            "POST",
            "/api/orders/ghost/status",
            json!({ "status": "progress" }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_health_and_promotion_listing() {
        let app = app(test_state().await);

        let (status, body) = get_json(&app, "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["database"], true);

        let (status, body) = get_json(&app, "/api/promotions").await;
        assert_eq!(status, StatusCode::OK);
        let codes: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["HH", "OPEN"]);
    }
}
