//! # Seed Binary
//!
//! Seeds demo promotion definitions for manual testing.
//!
//! ## Usage
//! ```bash
//! cargo run -p bistro-db --bin seed -- ./bistro.db
//! ```
//!
//! Seeding is idempotent per id: existing rows are left alone.

use chrono::Utc;
use tracing::{info, warn};

use bistro_core::{DiscountKind, PromotionLayer};
use bistro_db::{Database, DbConfig, DbError, PromotionRecord};

fn demo_promotions() -> Vec<PromotionRecord> {
    let now = Utc::now();
    let base = |id: &str, name: &str, code: &str, layer, kind, parameter| PromotionRecord {
        id: id.to_string(),
        name: name.to_string(),
        code: code.to_string(),
        layer,
        kind,
        parameter,
        category_scope: None,
        valid_from: None,
        valid_until: None,
        is_active: true,
        created_at: now,
        updated_at: now,
    };

    vec![
        PromotionRecord {
            category_scope: Some("noodles".to_string()),
            ..base(
                "happy-hour-noodles",
                "Happy Hour - Noodles",
                "HAPPY-NOODLES",
                PromotionLayer::Item,
                DiscountKind::Fixed,
                8000,
            )
        },
        base(
            "happy-hour-10",
            "Happy Hour 10%",
            "HAPPY-10",
            PromotionLayer::Item,
            DiscountKind::Percentage,
            10,
        ),
        base(
            "grand-opening-10",
            "Grand Opening 10%",
            "OPEN-10",
            PromotionLayer::Order,
            DiscountKind::Percentage,
            10,
        ),
        base(
            "ten-off",
            "10000 Off",
            "TEN-OFF",
            PromotionLayer::Order,
            DiscountKind::Fixed,
            10000,
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<(), DbError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "./bistro.db".to_string());

    info!(path = %path, "Seeding demo promotions");

    let db = Database::new(DbConfig::new(&path)).await?;
    let repo = db.promotions();

    let mut inserted = 0;
    for record in demo_promotions() {
        if repo.get_by_id(&record.id).await?.is_some() {
            warn!(id = %record.id, "Promotion already exists, skipping");
            continue;
        }
        repo.insert(&record).await?;
        info!(id = %record.id, code = %record.code, "Seeded promotion");
        inserted += 1;
    }

    info!(inserted, "Seed complete");
    db.close().await;
    Ok(())
}
