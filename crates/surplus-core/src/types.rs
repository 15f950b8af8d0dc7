//! # Domain Types
//!
//! Core domain types for the surplus marketplace.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │     Coupon      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (UUID)      │   │  code (unique)  │       │
//! │  │  price_paise    │   │  price snapshot │   │  benefit        │       │
//! │  │  stock          │   │  staleness flags│   │  validity window│       │
//! │  │  listing_type   │   │  cart XOR sess. │   │  usage caps     │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │      Rfq        │   │     Quote       │   │  ShippingZone   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  status machine │   │  QT-... number  │   │  state keyed    │       │
//! │  │  quote_count    │   │  one/supplier   │   │  base charge    │       │
//! │  │  view_count     │   │  status machine │   │  free threshold │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID where one exists (coupon code, quote number) - human-readable
//!
//! ## Snapshot Pattern
//! A `CartItem` freezes the product's price and discount at add time. The live
//! product row is consulted again on every cart read to derive the staleness
//! flags (`price_changed`, `stock_changed`, `is_available`) - the flags are a
//! cache, never the source of truth.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;

// =============================================================================
// GST Rate
// =============================================================================

/// GST rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000
/// 1800 bps = 18% (the default GST slab)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GstRate(u32);

impl GstRate {
    /// Creates a GST rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        GstRate(bps)
    }

    /// Creates a GST rate from a percentage (for convenience).
    pub fn from_percentage(pct: f64) -> Self {
        GstRate((pct * 100.0).round() as u32)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Returns the rate as a percentage (for display only).
    #[inline]
    pub fn percentage(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Zero GST rate.
    #[inline]
    pub const fn zero() -> Self {
        GstRate(0)
    }
}

impl Default for GstRate {
    fn default() -> Self {
        GstRate(crate::DEFAULT_GST_RATE_BPS)
    }
}

// =============================================================================
// Listing Type / Product Status
// =============================================================================

/// How a product is offered on the marketplace.
///
/// Auction listings cannot be added to a cart - they resolve through the
/// bidding flow instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ListingType {
    /// Fixed-price listing, directly purchasable.
    FixedPrice,
    /// Negotiable listing; still cartable at the asking price.
    Negotiable,
    /// Auction listing; cart additions are rejected.
    Auction,
}

/// Lifecycle status of a product listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ProductStatus {
    /// Visible and purchasable.
    Active,
    /// Hidden by the supplier or admin.
    Inactive,
    /// Stock exhausted / order fulfilled.
    Sold,
    /// Not yet published.
    Draft,
}

// =============================================================================
// Product
// =============================================================================

/// A surplus product listing.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Supplier that owns this listing.
    pub supplier_id: String,

    /// Category for coupon applicability matching.
    pub category_id: Option<String>,

    /// Display name.
    pub name: String,

    /// Optional long description.
    pub description: Option<String>,

    /// Asking price in paise.
    pub price_paise: i64,

    /// Listing discount in basis points (1000 = 10% off).
    pub discount_bps: u32,

    /// GST rate in basis points (1800 = 18%).
    pub gst_rate_bps: u32,

    /// Live stock in `unit` units.
    pub stock: i64,

    /// Unit of measure ("kg", "ton", "piece", ...).
    pub unit: String,

    /// Condition grade ("new", "like_new", "used", "scrap", ...).
    pub condition: String,

    /// How the product is offered.
    pub listing_type: ListingType,

    /// Lifecycle status.
    pub status: ProductStatus,

    /// When the listing was created.
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    /// When the listing was last updated.
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the asking price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }

    /// Returns the GST rate.
    #[inline]
    pub fn gst_rate(&self) -> GstRate {
        GstRate::from_bps(self.gst_rate_bps)
    }

    /// Whether the listing is live and purchasable.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.status == ProductStatus::Active
    }

    /// Whether the live stock covers the requested quantity.
    #[inline]
    pub fn can_fulfill(&self, quantity: i64) -> bool {
        self.stock >= quantity
    }
}

// =============================================================================
// Cart Identity
// =============================================================================

/// Who a cart belongs to.
///
/// ## Guest Carts
/// Anonymous visitors carry an opaque session token (minted on first
/// add-to-cart, travels as the `cart_session` cookie or `x-cart-session`
/// header). Logged-in users are keyed by user id. Exactly one of the two
/// identifies any cart operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CartIdentity {
    /// Authenticated user, keyed by user id.
    User(String),
    /// Anonymous guest, keyed by session token.
    Guest(String),
}

impl CartIdentity {
    /// Returns the user id if this is an authenticated identity.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            CartIdentity::User(id) => Some(id),
            CartIdentity::Guest(_) => None,
        }
    }

    /// Returns the session token if this is a guest identity.
    pub fn session_token(&self) -> Option<&str> {
        match self {
            CartIdentity::User(_) => None,
            CartIdentity::Guest(token) => Some(token),
        }
    }
}

// =============================================================================
// Cart / Cart Session / Cart Item
// =============================================================================

/// A logged-in user's cart. Exactly one active cart per user.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Cart {
    pub id: String,
    pub user_id: String,
    /// Applied coupon code, if any. Validated separately; this is a reference.
    pub coupon_code: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// An anonymous guest cart session.
///
/// States: guest-active → merged (terminal; items are gone after a merge).
/// Expiry (30 days) is filtered at read time, never swept in the background.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartSession {
    pub id: String,
    /// Opaque bearer token surfaced to the client as cookie/header.
    pub token: String,
    pub coupon_code: Option<String>,
    /// Terminal flag: once merged into a user cart the session is dead.
    pub merged: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
}

/// A line item in a cart (user cart or guest session, never both).
///
/// ## Snapshot Fields
/// `unit_price_paise` and `discount_bps` are frozen at add time. Pricing is
/// always computed from the snapshot; the staleness flags tell the buyer when
/// the live product has drifted from it.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CartItem {
    pub id: String,

    /// Owning user cart (mutually exclusive with `session_id`).
    pub cart_id: Option<String>,

    /// Owning guest session (mutually exclusive with `cart_id`).
    pub session_id: Option<String>,

    pub product_id: String,
    pub supplier_id: String,
    pub category_id: Option<String>,

    /// Product name at time of adding (frozen).
    pub name: String,

    /// Price in paise at time of adding (frozen).
    pub unit_price_paise: i64,

    /// Listing discount in basis points at time of adding (frozen).
    pub discount_bps: u32,

    /// GST rate in basis points at time of adding (frozen).
    pub gst_rate_bps: u32,

    pub quantity: i64,

    pub listing_type: ListingType,
    pub condition: String,
    pub unit: String,

    /// Live product still active? Recomputed on every cart read.
    pub is_available: bool,

    /// Live price differs from the snapshot price? Recomputed on read.
    pub price_changed: bool,

    /// Live stock below the requested quantity? Recomputed on read.
    pub stock_changed: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl CartItem {
    /// Returns the snapshot unit price as Money.
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_paise(self.unit_price_paise)
    }

    /// Line total before discount (unit price × quantity).
    #[inline]
    pub fn line_total(&self) -> Money {
        self.unit_price().multiply_quantity(self.quantity)
    }

    /// Item discount on the full line (line total × discount bps).
    #[inline]
    pub fn line_discount(&self) -> Money {
        self.line_total().apply_bps(self.discount_bps)
    }

    /// Line total after the item discount.
    #[inline]
    pub fn net_total(&self) -> Money {
        self.line_total() - self.line_discount()
    }
}

/// Result of merging a guest cart into a user cart, for observability.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MergeOutcome {
    /// Lines copied over because the user's cart lacked the product.
    pub items_merged: i64,
    /// Lines whose quantities were summed into an existing user line.
    pub quantities_updated: i64,
}

// =============================================================================
// Coupon
// =============================================================================

/// What a coupon grants once it validates.
///
/// Normalized on read from the `discount_type`/`discount_value` columns so
/// business logic never branches on a loosely typed pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum CouponBenefit {
    /// Percentage of the order value, optionally capped.
    Percentage {
        /// Discount rate in basis points (1000 = 10%).
        bps: u32,
        /// Cap on the computed discount, if any.
        max_discount: Option<Money>,
    },
    /// Flat amount off the order.
    Flat { amount: Money },
}

/// A coupon definition.
///
/// Codes are unique case-insensitively; lookups uppercase the input.
/// `used_count` is the total redemption counter maintained by
/// `record_usage`; per-user counts come from the `coupon_usage` table.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Coupon {
    pub id: String,
    /// Uppercased unique code.
    pub code: String,
    pub description: Option<String>,
    pub benefit: CouponBenefit,
    /// Minimum order value for the coupon to apply.
    pub min_order_value: Money,
    #[ts(as = "String")]
    pub valid_from: DateTime<Utc>,
    #[ts(as = "String")]
    pub valid_until: DateTime<Utc>,
    /// Total redemption cap across all users, if any.
    pub usage_limit: Option<i64>,
    /// Redemptions so far.
    pub used_count: i64,
    /// Per-user redemption cap, if any.
    pub max_usage_per_user: Option<i64>,
    /// Product allow-list. Empty = applies to all products.
    pub applicable_products: Vec<String>,
    /// Category allow-list. Empty = applies to all categories.
    pub applicable_categories: Vec<String>,
    /// Products the coupon never applies to.
    pub excluded_products: Vec<String>,
    /// Role restriction ("buyer", "supplier"), if any.
    pub allowed_role: Option<String>,
    pub is_active: bool,
}

/// A successfully validated coupon with its computed discount.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CouponGrant {
    pub code: String,
    pub discount: Money,
}

// =============================================================================
// Shipping
// =============================================================================

/// A shipping zone keyed by destination state.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct ShippingZone {
    pub id: String,
    /// Destination state, stored lowercase for case-insensitive lookup.
    pub state: String,
    /// Flat base charge in paise.
    pub base_charge_paise: i64,
    /// Orders at or above this value (post-coupon) ship free.
    pub free_shipping_threshold_paise: i64,
}

impl ShippingZone {
    /// Returns the base charge as Money.
    #[inline]
    pub fn base_charge(&self) -> Money {
        Money::from_paise(self.base_charge_paise)
    }

    /// Returns the free-shipping threshold as Money.
    #[inline]
    pub fn free_shipping_threshold(&self) -> Money {
        Money::from_paise(self.free_shipping_threshold_paise)
    }
}

/// A resolved shipping charge for a destination and order value.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ShippingQuote {
    /// Charge in decimal rupees.
    pub charge: f64,
    /// True when the zone's free-shipping threshold was met.
    pub free_shipping: bool,
    /// Matched zone state; None means the default charge applied.
    pub zone_state: Option<String>,
}

// =============================================================================
// RFQ / Quote
// =============================================================================

/// Status of a buyer's request for quote.
///
/// `active` is the only live state; the other three are terminal.
/// Expiry is derived at read time from `expires_at`, never by a sweeper.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum RfqStatus {
    Active,
    Closed,
    Expired,
    Fulfilled,
}

impl RfqStatus {
    /// Whether this status accepts further transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, RfqStatus::Active)
    }
}

/// Status of a supplier's quote against an RFQ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum QuoteStatus {
    Pending,
    Accepted,
    Rejected,
    Expired,
    Converted,
}

impl QuoteStatus {
    /// Whether this status accepts further transitions.
    #[inline]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, QuoteStatus::Pending)
    }
}

/// A buyer-owned request for quote.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Rfq {
    pub id: String,
    pub buyer_id: String,
    pub title: String,
    pub description: Option<String>,
    pub quantity: i64,
    pub unit: String,
    /// Budget range in paise, both ends optional.
    pub budget_min_paise: Option<i64>,
    pub budget_max_paise: Option<i64>,
    /// When the buyer needs delivery.
    #[ts(as = "Option<String>")]
    pub required_by: Option<DateTime<Utc>>,
    pub status: RfqStatus,
    /// Incremented once per accepted quote submission.
    pub quote_count: i64,
    /// Incremented best-effort on supplier views.
    pub view_count: i64,
    /// After this instant an active RFQ reads as expired.
    #[ts(as = "Option<String>")]
    pub expires_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Rfq {
    /// Status as of `now`: an active RFQ past its expiry reads as expired.
    ///
    /// Pure read-time projection; the stored row is only rewritten by an
    /// explicit status update.
    pub fn effective_status(&self, now: DateTime<Utc>) -> RfqStatus {
        match (self.status, self.expires_at) {
            (RfqStatus::Active, Some(expiry)) if expiry <= now => RfqStatus::Expired,
            (status, _) => status,
        }
    }
}

/// A supplier's quote against exactly one RFQ. Unique per (rfq, supplier).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Quote {
    pub id: String,
    pub rfq_id: String,
    pub supplier_id: String,
    /// Human-readable number: QT-<yyyymmdd>-<3-digit-random>.
    pub quote_number: String,
    pub price_paise: i64,
    pub delivery_days: i64,
    #[ts(as = "Option<String>")]
    pub valid_until: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub status: QuoteStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Quote {
    /// Returns the quoted price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_paise(self.price_paise)
    }
}

// =============================================================================
// Pricing Summary (derived, not persisted until checkout)
// =============================================================================

/// Per-line breakdown row retained for display.
///
/// All monetary fields are decimal rupees, exact at two decimals because
/// they are produced from integer paise.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemPricing {
    pub item_id: String,
    pub product_id: String,
    pub name: String,
    pub quantity: i64,
    pub unit_price: f64,
    pub item_total: f64,
    pub discount_percent: f64,
    pub item_discount: f64,
    pub net_total: f64,
    pub gst_rate_percent: f64,
    /// GST on this line's post-discount, post-coupon share.
    pub gst_amount: f64,
}

/// The computed cart pricing summary.
///
/// Invariant: `final_payable = subtotal_after_coupon + gst + shipping +
/// platform_fee`, each component independently exact at two decimals.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PricingSummary {
    /// Sum of per-line totals net of item discounts.
    pub item_subtotal: f64,
    /// Sum of per-line item discounts.
    pub total_item_discount: f64,
    /// Applied coupon code, when one validated.
    pub coupon_code: Option<String>,
    pub coupon_discount: f64,
    /// Why the requested coupon did not apply, when it failed.
    pub coupon_message: Option<String>,
    /// max(0, item_subtotal − coupon_discount).
    pub subtotal_after_coupon: f64,
    pub gst_amount: f64,
    pub shipping_charge: f64,
    pub free_shipping: bool,
    /// Reserved hook for future fee models; currently always 0.
    pub platform_fee: f64,
    pub final_payable: f64,
    /// item discounts + coupon discount.
    pub total_savings: f64,
    pub items: Vec<ItemPricing>,
}

// =============================================================================
// Stock Validation (checkout gate)
// =============================================================================

/// Why a cart line failed stock validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export)]
pub enum StockIssue {
    ProductNotFound,
    ProductInactive,
    InsufficientStock,
}

/// Price drift between the snapshot and the live product.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct PriceDrift {
    pub previous: f64,
    pub current: f64,
    pub change_percent: f64,
}

/// One cart line's stock-check classification.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockCheckLine {
    pub item_id: String,
    pub product_id: String,
    pub name: String,
    pub requested: i64,
    pub available: bool,
    pub issue: Option<StockIssue>,
    /// Live stock when the product row was found.
    pub stock_available: Option<i64>,
    pub price_drift: Option<PriceDrift>,
}

/// Overall stock validation report (AND of all lines).
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct StockReport {
    pub valid: bool,
    pub unavailable_count: usize,
    pub lines: Vec<StockCheckLine>,
}

// =============================================================================
// Checkout Session
// =============================================================================

/// A 30-minute-expiring snapshot of cart + computed pricing, created at the
/// start of the payment flow. The cart rows themselves persist; checkout only
/// snapshots them.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct CheckoutSession {
    pub id: String,
    pub user_id: Option<String>,
    /// Guest session token when the checkout came from a guest cart.
    pub session_token: Option<String>,
    /// JSON snapshot: cart lines + PricingSummary.
    pub snapshot: String,
    #[ts(as = "String")]
    pub expires_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_gst_rate_from_bps() {
        let rate = GstRate::from_bps(1800);
        assert_eq!(rate.bps(), 1800);
        assert!((rate.percentage() - 18.0).abs() < 0.001);
    }

    #[test]
    fn test_gst_rate_default_is_standard_slab() {
        assert_eq!(GstRate::default().bps(), 1800);
    }

    #[test]
    fn test_cart_identity_accessors() {
        let user = CartIdentity::User("u-1".into());
        assert_eq!(user.user_id(), Some("u-1"));
        assert_eq!(user.session_token(), None);

        let guest = CartIdentity::Guest("tok".into());
        assert_eq!(guest.user_id(), None);
        assert_eq!(guest.session_token(), Some("tok"));
    }

    #[test]
    fn test_cart_item_line_math() {
        let item = CartItem {
            id: "i-1".into(),
            cart_id: Some("c-1".into()),
            session_id: None,
            product_id: "p-1".into(),
            supplier_id: "s-1".into(),
            category_id: None,
            name: "Steel coil".into(),
            unit_price_paise: 100_000, // ₹1000.00
            discount_bps: 1000,        // 10%
            gst_rate_bps: 1800,
            quantity: 2,
            listing_type: ListingType::FixedPrice,
            condition: "used".into(),
            unit: "ton".into(),
            is_available: true,
            price_changed: false,
            stock_changed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        assert_eq!(item.line_total().paise(), 200_000);
        assert_eq!(item.line_discount().paise(), 20_000);
        assert_eq!(item.net_total().paise(), 180_000);
    }

    #[test]
    fn test_rfq_effective_status_expires_at_read_time() {
        let now = Utc::now();
        let mut rfq = Rfq {
            id: "r-1".into(),
            buyer_id: "b-1".into(),
            title: "Copper scrap".into(),
            description: None,
            quantity: 10,
            unit: "ton".into(),
            budget_min_paise: None,
            budget_max_paise: None,
            required_by: None,
            status: RfqStatus::Active,
            quote_count: 0,
            view_count: 0,
            expires_at: Some(now - Duration::hours(1)),
            created_at: now,
            updated_at: now,
        };

        assert_eq!(rfq.effective_status(now), RfqStatus::Expired);

        rfq.expires_at = Some(now + Duration::hours(1));
        assert_eq!(rfq.effective_status(now), RfqStatus::Active);

        // Terminal statuses are never rewritten by the projection.
        rfq.status = RfqStatus::Fulfilled;
        rfq.expires_at = Some(now - Duration::hours(1));
        assert_eq!(rfq.effective_status(now), RfqStatus::Fulfilled);
    }

    #[test]
    fn test_status_terminality() {
        assert!(!RfqStatus::Active.is_terminal());
        assert!(RfqStatus::Closed.is_terminal());
        assert!(RfqStatus::Expired.is_terminal());
        assert!(RfqStatus::Fulfilled.is_terminal());

        assert!(!QuoteStatus::Pending.is_terminal());
        assert!(QuoteStatus::Accepted.is_terminal());
        assert!(QuoteStatus::Converted.is_terminal());
    }
}
