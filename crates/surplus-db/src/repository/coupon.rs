//! # Coupon Repository
//!
//! Coupon lookup, normalization, and redemption counters.
//!
//! ## Row Normalization
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │              coupons table              →        Coupon (core)          │
//! │                                                                         │
//! │  discount_type  = 'percentage'                                          │
//! │  discount_value = 1000 (bps)            →  CouponBenefit::Percentage    │
//! │  max_discount_paise = 50000                 { bps, max_discount }       │
//! │                                                                         │
//! │  discount_type  = 'flat'                                                │
//! │  discount_value = 30000 (paise)         →  CouponBenefit::Flat{amount}  │
//! │                                                                         │
//! │  applicable_products = '["p1","p2"]'    →  Vec<String> (JSON)           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The loosely typed column pair never leaves this module; validation and
//! discount math in surplus-core only ever see [`CouponBenefit`].
//!
//! ## Counters
//! `used_count` on the coupon row is the global redemption total;
//! per-user counts are derived from `coupon_usage` rows. Both move together
//! inside `record_usage`'s transaction.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use surplus_core::money::Money;
use surplus_core::{Coupon, CouponBenefit};

const COUPON_COLUMNS: &str = "id, code, description, discount_type, discount_value, \
     max_discount_paise, min_order_value_paise, valid_from, valid_until, usage_limit, \
     used_count, max_usage_per_user, applicable_products, applicable_categories, \
     excluded_products, allowed_role, is_active";

/// Raw coupon row as stored. Converted to [`Coupon`] before leaving the
/// repository.
#[derive(Debug, Clone, sqlx::FromRow)]
struct CouponRow {
    id: String,
    code: String,
    description: Option<String>,
    discount_type: String,
    discount_value: i64,
    max_discount_paise: Option<i64>,
    min_order_value_paise: i64,
    valid_from: DateTime<Utc>,
    valid_until: DateTime<Utc>,
    usage_limit: Option<i64>,
    used_count: i64,
    max_usage_per_user: Option<i64>,
    applicable_products: String,
    applicable_categories: String,
    excluded_products: String,
    allowed_role: Option<String>,
    is_active: bool,
}

impl CouponRow {
    fn into_coupon(self) -> DbResult<Coupon> {
        let benefit = match self.discount_type.as_str() {
            "percentage" => CouponBenefit::Percentage {
                bps: self.discount_value as u32,
                max_discount: self.max_discount_paise.map(Money::from_paise),
            },
            "flat" => CouponBenefit::Flat {
                amount: Money::from_paise(self.discount_value),
            },
            other => {
                return Err(DbError::Internal(format!(
                    "unknown coupon discount_type '{other}' on coupon {}",
                    self.id
                )))
            }
        };

        Ok(Coupon {
            id: self.id,
            code: self.code,
            description: self.description,
            benefit,
            min_order_value: Money::from_paise(self.min_order_value_paise),
            valid_from: self.valid_from,
            valid_until: self.valid_until,
            usage_limit: self.usage_limit,
            used_count: self.used_count,
            max_usage_per_user: self.max_usage_per_user,
            applicable_products: serde_json::from_str(&self.applicable_products)?,
            applicable_categories: serde_json::from_str(&self.applicable_categories)?,
            excluded_products: serde_json::from_str(&self.excluded_products)?,
            allowed_role: self.allowed_role,
            is_active: self.is_active,
        })
    }
}

/// Repository for coupon database operations.
#[derive(Debug, Clone)]
pub struct CouponRepository {
    pool: SqlitePool,
}

impl CouponRepository {
    /// Creates a new CouponRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CouponRepository { pool }
    }

    /// Inserts a coupon definition. The code is stored uppercased.
    pub async fn insert(&self, coupon: &Coupon) -> DbResult<()> {
        let (discount_type, discount_value, max_discount_paise) = match &coupon.benefit {
            CouponBenefit::Percentage { bps, max_discount } => (
                "percentage",
                *bps as i64,
                max_discount.map(|m| m.paise()),
            ),
            CouponBenefit::Flat { amount } => ("flat", amount.paise(), None),
        };

        sqlx::query(
            r#"
            INSERT INTO coupons (
                id, code, description, discount_type, discount_value,
                max_discount_paise, min_order_value_paise, valid_from, valid_until,
                usage_limit, used_count, max_usage_per_user, applicable_products,
                applicable_categories, excluded_products, allowed_role, is_active
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                    ?15, ?16, ?17)
            "#,
        )
        .bind(&coupon.id)
        .bind(coupon.code.to_uppercase())
        .bind(&coupon.description)
        .bind(discount_type)
        .bind(discount_value)
        .bind(max_discount_paise)
        .bind(coupon.min_order_value.paise())
        .bind(coupon.valid_from)
        .bind(coupon.valid_until)
        .bind(coupon.usage_limit)
        .bind(coupon.used_count)
        .bind(coupon.max_usage_per_user)
        .bind(serde_json::to_string(&coupon.applicable_products)?)
        .bind(serde_json::to_string(&coupon.applicable_categories)?)
        .bind(serde_json::to_string(&coupon.excluded_products)?)
        .bind(&coupon.allowed_role)
        .bind(coupon.is_active)
        .execute(&self.pool)
        .await?;

        debug!(code = %coupon.code, "Coupon inserted");
        Ok(())
    }

    /// Looks up a coupon by code, case-insensitively.
    ///
    /// Inactive coupons are still returned; the validator decides what an
    /// inactive match means (same wire code as an unknown code).
    pub async fn find_by_code(&self, code: &str) -> DbResult<Option<Coupon>> {
        let row = sqlx::query_as::<_, CouponRow>(&format!(
            "SELECT {COUPON_COLUMNS} FROM coupons WHERE code = ?1"
        ))
        .bind(code.trim().to_uppercase())
        .fetch_optional(&self.pool)
        .await?;

        row.map(CouponRow::into_coupon).transpose()
    }

    /// How many times this user has redeemed this coupon.
    pub async fn user_usage_count(&self, coupon_id: &str, user_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM coupon_usage WHERE coupon_id = ?1 AND user_id = ?2",
        )
        .bind(coupon_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Records a redemption at order placement.
    ///
    /// Inserts the per-user usage row and bumps the global counter in one
    /// transaction, so the two counters can never drift apart.
    pub async fn record_usage(
        &self,
        coupon_id: &str,
        user_id: &str,
        order_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT INTO coupon_usage (id, coupon_id, user_id, order_id, used_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(Uuid::new_v4().to_string())
        .bind(coupon_id)
        .bind(user_id)
        .bind(order_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE coupons SET used_count = used_count + 1 WHERE id = ?1")
            .bind(coupon_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(coupon_id = %coupon_id, user_id = %user_id, "Coupon usage recorded");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;

    pub(crate) fn sample_coupon(code: &str, benefit: CouponBenefit) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: Uuid::new_v4().to_string(),
            code: code.to_string(),
            description: None,
            benefit,
            min_order_value: Money::zero(),
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(30),
            usage_limit: None,
            used_count: 0,
            max_usage_per_user: None,
            applicable_products: vec![],
            applicable_categories: vec![],
            excluded_products: vec![],
            allowed_role: None,
            is_active: true,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_normalizes_benefit() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.coupons();

        let mut coupon = sample_coupon(
            "save10",
            CouponBenefit::Percentage {
                bps: 1000,
                max_discount: Some(Money::from_paise(50_000)),
            },
        );
        coupon.applicable_categories = vec!["cat-metals".to_string()];
        repo.insert(&coupon).await.unwrap();

        // Lookup is case-insensitive; codes are stored uppercased.
        let found = repo.find_by_code("Save10").await.unwrap().unwrap();
        assert_eq!(found.code, "SAVE10");
        assert_eq!(
            found.benefit,
            CouponBenefit::Percentage {
                bps: 1000,
                max_discount: Some(Money::from_paise(50_000)),
            }
        );
        assert_eq!(found.applicable_categories, vec!["cat-metals".to_string()]);

        assert!(repo.find_by_code("GHOST").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_flat_benefit_roundtrip() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.coupons();

        let coupon = sample_coupon(
            "FLAT300",
            CouponBenefit::Flat {
                amount: Money::from_paise(30_000),
            },
        );
        repo.insert(&coupon).await.unwrap();

        let found = repo.find_by_code("flat300").await.unwrap().unwrap();
        assert_eq!(
            found.benefit,
            CouponBenefit::Flat {
                amount: Money::from_paise(30_000)
            }
        );
    }

    #[tokio::test]
    async fn test_record_usage_moves_both_counters() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let repo = db.coupons();

        let coupon = sample_coupon(
            "ONCE",
            CouponBenefit::Flat {
                amount: Money::from_paise(10_000),
            },
        );
        repo.insert(&coupon).await.unwrap();

        repo.record_usage(&coupon.id, "user-1", "order-1", Utc::now())
            .await
            .unwrap();
        repo.record_usage(&coupon.id, "user-2", "order-2", Utc::now())
            .await
            .unwrap();

        let found = repo.find_by_code("ONCE").await.unwrap().unwrap();
        assert_eq!(found.used_count, 2);
        assert_eq!(repo.user_usage_count(&coupon.id, "user-1").await.unwrap(), 1);
        assert_eq!(repo.user_usage_count(&coupon.id, "user-3").await.unwrap(), 0);
    }
}
