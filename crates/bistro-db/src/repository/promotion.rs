//! # Promotion Repository
//!
//! Database operations for the promotion definition store.
//!
//! ## Record vs. Definition
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  promotions table                                                       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  PromotionRecord (this crate)                                          │
//! │  ├── definition fields: id, name, code, layer, kind, parameter         │
//! │  └── eligibility INPUTS: category_scope, validity window, is_active    │
//! │       │                                                                 │
//! │       │  resolver (order-api) evaluates the inputs per request         │
//! │       ▼                                                                 │
//! │  PromotionDefinition (bistro-core) with a single `eligible` verdict    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The engine never sees the window or the scope, only the verdict. That
//! keeps the pricing passes clock-free.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use bistro_core::{DiscountKind, PromotionLayer};

// =============================================================================
// Promotion Record
// =============================================================================

/// A stored promotion definition plus its eligibility inputs.
#[derive(Debug, Clone, PartialEq)]
pub struct PromotionRecord {
    pub id: String,
    pub name: String,
    pub code: String,
    pub layer: PromotionLayer,
    pub kind: DiscountKind,
    /// Percent (0-100) for `Percentage`, cents for `Fixed`.
    pub parameter: i64,
    /// Item-layer only: restricts the promotion to one dish category.
    /// `None` means any category.
    pub category_scope: Option<String>,
    /// Start of the validity window (inclusive). `None` = no lower bound.
    pub valid_from: Option<DateTime<Utc>>,
    /// End of the validity window (exclusive). `None` = no upper bound.
    pub valid_until: Option<DateTime<Utc>>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PromotionRecord {
    /// Whether the record is active and `now` falls inside its validity
    /// window. Category scope is a per-item predicate and is evaluated by
    /// the resolver, not here.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        if !self.is_active {
            return false;
        }
        if let Some(from) = self.valid_from {
            if now < from {
                return false;
            }
        }
        if let Some(until) = self.valid_until {
            if now >= until {
                return false;
            }
        }
        true
    }
}

// =============================================================================
// Row Mapping
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct PromotionRow {
    id: String,
    name: String,
    code: String,
    layer: String,
    kind: String,
    parameter: i64,
    category_scope: Option<String>,
    valid_from: Option<DateTime<Utc>>,
    valid_until: Option<DateTime<Utc>>,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<PromotionRow> for PromotionRecord {
    type Error = DbError;

    fn try_from(row: PromotionRow) -> DbResult<PromotionRecord> {
        // CHECK constraints keep these tags closed; a mismatch means an
        // out-of-band write
        let layer = match row.layer.as_str() {
            "item" => PromotionLayer::Item,
            "order" => PromotionLayer::Order,
            other => {
                return Err(DbError::corrupt_row(
                    "promotion",
                    &row.id,
                    format!("unknown layer tag '{other}'"),
                ))
            }
        };
        let kind = match row.kind.as_str() {
            "percentage" => DiscountKind::Percentage,
            "fixed" => DiscountKind::Fixed,
            other => {
                return Err(DbError::corrupt_row(
                    "promotion",
                    &row.id,
                    format!("unknown kind tag '{other}'"),
                ))
            }
        };

        Ok(PromotionRecord {
            id: row.id,
            name: row.name,
            code: row.code,
            layer,
            kind,
            parameter: row.parameter,
            category_scope: row.category_scope,
            valid_from: row.valid_from,
            valid_until: row.valid_until,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const SELECT_COLUMNS: &str = "id, name, code, layer, kind, parameter, category_scope, \
     valid_from, valid_until, is_active, created_at, updated_at";

// =============================================================================
// Repository
// =============================================================================

/// Repository for promotion database operations.
#[derive(Debug, Clone)]
pub struct PromotionRepository {
    pool: SqlitePool,
}

impl PromotionRepository {
    /// Creates a new PromotionRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PromotionRepository { pool }
    }

    /// Inserts a promotion record.
    pub async fn insert(&self, record: &PromotionRecord) -> DbResult<()> {
        debug!(id = %record.id, code = %record.code, "Inserting promotion");

        sqlx::query(
            r#"
            INSERT INTO promotions (
                id, name, code, layer, kind, parameter,
                category_scope, valid_from, valid_until, is_active,
                created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(&record.code)
        .bind(record.layer.as_str())
        .bind(record.kind.as_str())
        .bind(record.parameter)
        .bind(&record.category_scope)
        .bind(record.valid_from)
        .bind(record.valid_until)
        .bind(record.is_active)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Gets a promotion by id.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PromotionRecord>> {
        let row: Option<PromotionRow> = sqlx::query_as(&format!(
            "SELECT {SELECT_COLUMNS} FROM promotions WHERE id = ?1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(PromotionRecord::try_from).transpose()
    }

    /// Fetches the records for a set of ids.
    ///
    /// Unknown ids are simply absent from the result; the resolver treats
    /// a missing record the same as an ineligible one.
    pub async fn get_by_ids(&self, ids: &[String]) -> DbResult<Vec<PromotionRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        // sqlx has no array binding for SQLite; build the placeholder list
        let placeholders = (1..=ids.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!("SELECT {SELECT_COLUMNS} FROM promotions WHERE id IN ({placeholders})");

        let mut query = sqlx::query_as::<_, PromotionRow>(&sql);
        for id in ids {
            query = query.bind(id);
        }

        let rows = query.fetch_all(&self.pool).await?;
        rows.into_iter().map(PromotionRecord::try_from).collect()
    }

    /// Lists promotions that are active and inside their validity window
    /// at `now`, for the cart UI's promotion picker.
    pub async fn list_active(&self, now: DateTime<Utc>) -> DbResult<Vec<PromotionRecord>> {
        let rows: Vec<PromotionRow> = sqlx::query_as(&format!(
            r#"
            SELECT {SELECT_COLUMNS} FROM promotions
            WHERE is_active = 1
              AND (valid_from IS NULL OR valid_from <= ?1)
              AND (valid_until IS NULL OR valid_until > ?1)
            ORDER BY code
            "#
        ))
        .bind(now)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(PromotionRecord::try_from).collect()
    }

    /// Activates or deactivates a promotion.
    pub async fn set_active(&self, id: &str, active: bool, now: DateTime<Utc>) -> DbResult<()> {
        let result = sqlx::query(
            "UPDATE promotions SET is_active = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(active)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("promotion", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    fn record(id: &str, layer: PromotionLayer) -> PromotionRecord {
        let now = Utc::now();
        PromotionRecord {
            id: id.to_string(),
            name: "Happy Hour".to_string(),
            code: id.to_uppercase(),
            layer,
            kind: DiscountKind::Fixed,
            parameter: 8000,
            category_scope: None,
            valid_from: None,
            valid_until: None,
            is_active: true,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();

        let rec = record("hh", PromotionLayer::Item);
        repo.insert(&rec).await.unwrap();

        let fetched = repo.get_by_id("hh").await.unwrap().unwrap();
        assert_eq!(fetched.id, "hh");
        assert_eq!(fetched.layer, PromotionLayer::Item);
        assert_eq!(fetched.kind, DiscountKind::Fixed);
        assert_eq!(fetched.parameter, 8000);
    }

    #[tokio::test]
    async fn test_get_by_ids_skips_unknown() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();

        repo.insert(&record("hh", PromotionLayer::Item)).await.unwrap();
        repo.insert(&record("open", PromotionLayer::Order)).await.unwrap();

        let found = repo
            .get_by_ids(&["hh".to_string(), "ghost".to_string()])
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "hh");
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();

        repo.insert(&record("hh", PromotionLayer::Item)).await.unwrap();

        let mut dup = record("hh2", PromotionLayer::Item);
        dup.code = "HH".to_string();
        let err = repo.insert(&dup).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_list_active_respects_window() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();
        let now = Utc::now();

        let mut expired = record("old", PromotionLayer::Order);
        expired.valid_until = Some(now - Duration::hours(1));
        repo.insert(&expired).await.unwrap();

        let mut inactive = record("off", PromotionLayer::Order);
        inactive.is_active = false;
        repo.insert(&inactive).await.unwrap();

        repo.insert(&record("live", PromotionLayer::Order)).await.unwrap();

        let active = repo.list_active(now).await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "live");
    }

    #[tokio::test]
    async fn test_set_active() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.promotions();
        let now = Utc::now();

        repo.insert(&record("hh", PromotionLayer::Item)).await.unwrap();
        repo.set_active("hh", false, now).await.unwrap();

        let fetched = repo.get_by_id("hh").await.unwrap().unwrap();
        assert!(!fetched.is_active);
        assert!(!fetched.is_live_at(now));

        let err = repo.set_active("ghost", true, now).await.unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[test]
    fn test_is_live_at_window() {
        let now = Utc::now();
        let mut rec = record("hh", PromotionLayer::Item);
        assert!(rec.is_live_at(now));

        rec.valid_from = Some(now + Duration::hours(1));
        assert!(!rec.is_live_at(now));

        rec.valid_from = Some(now - Duration::hours(2));
        rec.valid_until = Some(now - Duration::hours(1));
        assert!(!rec.is_live_at(now));
    }
}
