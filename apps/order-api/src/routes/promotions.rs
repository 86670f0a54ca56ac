//! # Promotion Routes
//!
//! Read-only listing of currently-live promotions for the cart UI's
//! promotion picker.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::Serialize;

use bistro_core::{DiscountKind, PromotionLayer};
use bistro_db::PromotionRecord;

use crate::error::ApiError;
use crate::state::AppState;

/// Promotion routes.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/promotions", get(list_promotions))
}

/// What the cart UI sees for each live promotion.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PromotionDto {
    pub id: String,
    pub name: String,
    pub code: String,
    pub layer: PromotionLayer,
    pub kind: DiscountKind,
    pub parameter: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub valid_until: Option<DateTime<Utc>>,
}

impl From<PromotionRecord> for PromotionDto {
    fn from(record: PromotionRecord) -> Self {
        PromotionDto {
            id: record.id,
            name: record.name,
            code: record.code,
            layer: record.layer,
            kind: record.kind,
            parameter: record.parameter,
            category_scope: record.category_scope,
            valid_until: record.valid_until,
        }
    }
}

/// GET /api/promotions
///
/// Lists promotions that are active and inside their validity window
/// right now. The cart previews discounts from these; the server still
/// re-resolves at submission time, so a stale list can only produce a
/// rejected order, never a wrong bill.
pub async fn list_promotions(
    State(state): State<AppState>,
) -> Result<Json<Vec<PromotionDto>>, ApiError> {
    let records = state.db.promotions().list_active(Utc::now()).await?;
    Ok(Json(records.into_iter().map(PromotionDto::from).collect()))
}
