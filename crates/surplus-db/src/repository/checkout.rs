//! # Checkout Repository
//!
//! The pricing and checkout orchestration layer.
//!
//! ## Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Checkout Pipeline                                 │
//! │                                                                         │
//! │  price_cart(identity, state)                                            │
//! │    cart lines ──► stored coupon ──► shipping zone                       │
//! │         │              │                 │                              │
//! │         └──────────────┴────────┬────────┘                              │
//! │                                 ▼                                       │
//! │            surplus_core::pricing::calculate_cart_summary                │
//! │                                                                         │
//! │  begin_session(identity, state)                                         │
//! │    1. cart must be non-empty                                            │
//! │    2. stock gate: every line re-checked against live products           │
//! │    3. summary computed as above                                         │
//! │    4. lines + summary frozen into a 30-minute JSON snapshot             │
//! │                                                                         │
//! │  The cart itself is NOT consumed - it empties after order placement,    │
//! │  not at checkout.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! An invalid stored coupon never fails a summary read: the summary comes
//! back without the discount plus a `coupon_message` saying why.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use crate::repository::cart::CartRepository;
use crate::repository::coupon::CouponRepository;
use crate::repository::product::ProductRepository;
use crate::repository::shipping::ShippingRepository;
use surplus_core::coupon::validate_and_calculate;
use surplus_core::money::Money;
use surplus_core::pricing::{calculate_cart_summary, validate_stock, CouponInput};
use surplus_core::validation::validate_coupon_code;
use surplus_core::{
    CartIdentity, CartItem, CheckoutSession, CoreError, Coupon, CouponGrant, PricingSummary,
    StockReport, CHECKOUT_SESSION_TTL_MINUTES,
};

/// What gets frozen into a checkout session's `snapshot` column.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSnapshot {
    pub items: Vec<CartItem>,
    pub pricing: PricingSummary,
}

/// Repository for pricing summaries and checkout sessions.
///
/// Composes the cart, coupon, product, and shipping repositories over one
/// shared pool; the math itself lives in surplus-core.
#[derive(Debug, Clone)]
pub struct CheckoutRepository {
    pool: SqlitePool,
}

impl CheckoutRepository {
    /// Creates a new CheckoutRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CheckoutRepository { pool }
    }

    fn carts(&self) -> CartRepository {
        CartRepository::new(self.pool.clone())
    }

    fn coupons(&self) -> CouponRepository {
        CouponRepository::new(self.pool.clone())
    }

    fn products(&self) -> ProductRepository {
        ProductRepository::new(self.pool.clone())
    }

    fn shipping(&self) -> ShippingRepository {
        ShippingRepository::new(self.pool.clone())
    }

    /// Resolves the stored coupon for pricing, if the cart carries one.
    ///
    /// Returns the coupon plus the caller's redemption count (None for
    /// guests, who are exempt from per-user caps).
    async fn stored_coupon(
        &self,
        identity: &CartIdentity,
        code: &str,
    ) -> DbResult<Option<(Coupon, Option<i64>)>> {
        let Some(coupon) = self.coupons().find_by_code(code).await? else {
            return Ok(None);
        };

        let usage = match identity.user_id() {
            Some(user_id) => Some(
                self.coupons()
                    .user_usage_count(&coupon.id, user_id)
                    .await?,
            ),
            None => None,
        };

        Ok(Some((coupon, usage)))
    }

    /// Computes the full pricing summary for a cart.
    ///
    /// `destination_state` picks the shipping zone; None (or an unknown
    /// state) falls back to the default charge.
    pub async fn price_cart(
        &self,
        identity: &CartIdentity,
        destination_state: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<PricingSummary> {
        let cart = self.carts().get_cart(identity, now).await?;

        let resolved = match &cart.coupon_code {
            Some(code) => self.stored_coupon(identity, code).await?,
            None => None,
        };

        let zone = match destination_state {
            Some(state) => self.shipping().zone_for_state(state).await?,
            None => None,
        };

        let coupon_input = resolved.as_ref().map(|(coupon, usage)| CouponInput {
            coupon,
            user_usage_count: *usage,
        });

        let mut summary = calculate_cart_summary(&cart.items, coupon_input, zone.as_ref(), now);

        // A stored code whose coupon row has vanished prices without the
        // discount, like any other failed validation.
        if let (Some(code), None) = (&cart.coupon_code, &resolved) {
            summary.coupon_message = Some(format!("Invalid coupon code: {code}"));
        }

        Ok(summary)
    }

    /// Validates and stores a coupon code against the cart.
    ///
    /// The full validation (window, caps, applicability, minimum) runs here
    /// against the current cart; it runs again on every later summary read,
    /// so a coupon that goes stale after being applied degrades into a
    /// `coupon_message` instead of a stuck discount.
    pub async fn apply_coupon(
        &self,
        identity: &CartIdentity,
        code: &str,
        now: DateTime<Utc>,
    ) -> DbResult<CouponGrant> {
        let normalized = validate_coupon_code(code).map_err(CoreError::from)?;

        let cart = self.carts().get_cart(identity, now).await?;
        if cart.items.is_empty() {
            return Err(CoreError::CartEmpty.into());
        }

        let coupon = self
            .coupons()
            .find_by_code(&normalized)
            .await?
            .ok_or_else(|| CoreError::InvalidCoupon(normalized.clone()))?;

        let usage = match identity.user_id() {
            Some(user_id) => Some(
                self.coupons()
                    .user_usage_count(&coupon.id, user_id)
                    .await?,
            ),
            None => None,
        };

        let order_value: Money = cart.items.iter().map(|i| i.net_total()).sum();
        let grant = validate_and_calculate(&coupon, usage, order_value, &cart.items, now)?;

        self.carts()
            .set_coupon(identity, Some(&coupon.code), now)
            .await?;

        debug!(code = %coupon.code, discount = %grant.discount, "Coupon applied to cart");
        Ok(grant)
    }

    /// Removes the cart's coupon.
    pub async fn remove_coupon(&self, identity: &CartIdentity, now: DateTime<Utc>) -> DbResult<()> {
        self.carts().set_coupon(identity, None, now).await
    }

    /// Re-checks every cart line against the live product rows.
    pub async fn validate_cart_stock(
        &self,
        identity: &CartIdentity,
        now: DateTime<Utc>,
    ) -> DbResult<StockReport> {
        let cart = self.carts().get_cart(identity, now).await?;

        let ids: Vec<String> = cart.items.iter().map(|i| i.product_id.clone()).collect();
        let live = self.products().get_map(&ids).await?;

        Ok(validate_stock(&cart.items, &live))
    }

    /// Starts a checkout: stock-gates the cart, freezes lines + pricing into
    /// a snapshot, and opens a 30-minute session.
    pub async fn begin_session(
        &self,
        identity: &CartIdentity,
        destination_state: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<CheckoutSession> {
        let cart = self.carts().get_cart(identity, now).await?;
        if cart.items.is_empty() {
            return Err(CoreError::CartEmpty.into());
        }

        let ids: Vec<String> = cart.items.iter().map(|i| i.product_id.clone()).collect();
        let live = self.products().get_map(&ids).await?;
        let report = validate_stock(&cart.items, &live);
        if !report.valid {
            return Err(CoreError::CheckoutStockInvalid {
                count: report.unavailable_count,
            }
            .into());
        }

        let pricing = self.price_cart(identity, destination_state, now).await?;
        let snapshot = serde_json::to_string(&CheckoutSnapshot {
            items: cart.items,
            pricing,
        })?;

        let session = CheckoutSession {
            id: Uuid::new_v4().to_string(),
            user_id: identity.user_id().map(str::to_string),
            session_token: identity.session_token().map(str::to_string),
            snapshot,
            expires_at: now + Duration::minutes(CHECKOUT_SESSION_TTL_MINUTES),
            created_at: now,
        };

        sqlx::query(
            "INSERT INTO checkout_sessions (id, user_id, session_token, snapshot, expires_at, created_at) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(&session.id)
        .bind(&session.user_id)
        .bind(&session.session_token)
        .bind(&session.snapshot)
        .bind(session.expires_at)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        debug!(session_id = %session.id, "Checkout session opened");
        Ok(session)
    }

    /// Fetches a checkout session; expired sessions read as absent.
    pub async fn get_session(
        &self,
        id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<CheckoutSession>> {
        let session = sqlx::query_as::<_, CheckoutSession>(
            "SELECT id, user_id, session_token, snapshot, expires_at, created_at \
             FROM checkout_sessions WHERE id = ?1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session.filter(|s| s.expires_at > now))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
