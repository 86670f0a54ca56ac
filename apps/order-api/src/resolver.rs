//! # Promotion Resolver
//!
//! Builds the per-request [`PromotionSnapshot`] consumed by the pricing
//! engine.
//!
//! ## Responsibility Split
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  resolver (HERE, has clock + database)                                  │
//! │  ├── collect candidate ids from the draft                              │
//! │  ├── fetch PromotionRecords                                            │
//! │  ├── evaluate eligibility:                                             │
//! │  │     • is_active flag                                                │
//! │  │     • validity window vs. request time                              │
//! │  │     • item-layer category scope vs. the referencing items           │
//! │  └── freeze verdicts into a PromotionSnapshot                          │
//! │                                                                         │
//! │  engine (bistro-core, pure)                                            │
//! │  └── reads only the `eligible` verdict; unknown ids are simply         │
//! │      absent from the snapshot and reject the order                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two concurrent requests build two independent snapshots; nothing here
//! is cached or shared.

use chrono::{DateTime, Utc};

use bistro_core::{DraftOrder, PromotionDefinition, PromotionLayer, PromotionSnapshot};
use bistro_db::{Database, PromotionRecord};

use crate::error::ApiError;

/// Collects every promotion id the draft references, deduplicated,
/// in submission order.
fn candidate_ids(draft: &DraftOrder) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    let mut push = |id: &str| {
        if !ids.iter().any(|seen| seen == id) {
            ids.push(id.to_string());
        }
    };

    for item in &draft.items {
        if let Some(id) = &item.promotion_id {
            push(id);
        }
    }
    for id in &draft.order_promotion_ids {
        push(id);
    }
    ids
}

/// Item-layer category scope: the promotion is eligible only if every
/// draft item referencing it is in the scoped category. One out-of-scope
/// item rejects the whole order anyway, so a single verdict suffices.
fn scope_satisfied(record: &PromotionRecord, draft: &DraftOrder) -> bool {
    let Some(scope) = &record.category_scope else {
        return true;
    };
    if record.layer != PromotionLayer::Item {
        return true;
    }

    draft
        .items
        .iter()
        .filter(|item| item.promotion_id.as_deref() == Some(record.id.as_str()))
        .all(|item| item.category == *scope)
}

/// Resolves the draft's candidate promotions into a read-only snapshot.
///
/// Ids that do not exist in the store are absent from the snapshot; the
/// engine maps the absence to `PromotionNotApplicable`. Eligibility is
/// evaluated against `now`, the request time, so the verdict is frozen
/// for the whole request.
pub async fn resolve_promotions(
    db: &Database,
    draft: &DraftOrder,
    now: DateTime<Utc>,
) -> Result<PromotionSnapshot, ApiError> {
    let ids = candidate_ids(draft);
    if ids.is_empty() {
        return Ok(PromotionSnapshot::empty());
    }

    let records = db.promotions().get_by_ids(&ids).await?;

    let definitions = records.into_iter().map(|record| {
        let eligible = record.is_live_at(now) && scope_satisfied(&record, draft);
        PromotionDefinition {
            id: record.id,
            name: record.name,
            code: record.code,
            layer: record.layer,
            kind: record.kind,
            parameter: record.parameter,
            eligible,
        }
    });

    Ok(PromotionSnapshot::new(definitions))
}

// =============================================================================
// Unit Tests
// =============================================================================
