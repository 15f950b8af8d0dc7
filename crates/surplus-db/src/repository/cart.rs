//! # Cart Repository
//!
//! Database operations for user carts and guest cart sessions.
//!
//! ## Dual-Identity Carts
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Cart Ownership                                    │
//! │                                                                         │
//! │  CartIdentity::User(user_id)        CartIdentity::Guest(token)          │
//! │       │                                  │                              │
//! │       ▼                                  ▼                              │
//! │  carts (one per user)               cart_sessions (30-day expiry)       │
//! │       │                                  │                              │
//! │       └──────────────┬───────────────────┘                              │
//! │                      ▼                                                  │
//! │               cart_items                                                │
//! │        (cart_id XOR session_id, one line per product)                   │
//! │                                                                         │
//! │  Login merges the guest session into the user cart:                     │
//! │    new product    → line moves over            (items_merged)           │
//! │    known product  → quantities are summed      (quantities_updated)     │
//! │    then the session is marked merged (terminal) and emptied.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Staleness Flags
//! Every `get_cart` re-reads the live product rows and recomputes
//! `is_available` / `price_changed` / `stock_changed`, writing changed flags
//! back. The flags are a cache for display; pricing always uses the
//! snapshot, and checkout re-validates stock from the live rows.

use chrono::{DateTime, Duration, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::DbResult;
use surplus_core::validation::validate_quantity;
use surplus_core::{
    Cart, CartIdentity, CartItem, CartSession, CoreError, ListingType, MergeOutcome, Product,
    GUEST_CART_TTL_DAYS, MAX_ITEM_QUANTITY,
};

const CART_ITEM_COLUMNS: &str = "id, cart_id, session_id, product_id, supplier_id, category_id, \
     name, unit_price_paise, discount_bps, gst_rate_bps, quantity, listing_type, condition, \
     unit, is_available, price_changed, stock_changed, created_at, updated_at";

const PRODUCT_COLUMNS: &str = "id, supplier_id, category_id, name, description, price_paise, \
     discount_bps, gst_rate_bps, stock, unit, condition, listing_type, status, \
     created_at, updated_at";

/// A cart read result: the applied coupon code plus the lines.
#[derive(Debug, Clone)]
pub struct CartContents {
    pub coupon_code: Option<String>,
    pub items: Vec<CartItem>,
}

impl CartContents {
    fn empty() -> Self {
        CartContents {
            coupon_code: None,
            items: Vec::new(),
        }
    }
}

/// Which row owns a set of cart lines.
#[derive(Debug, Clone)]
enum Owner {
    Cart(String),
    Session(String),
}

impl Owner {
    fn column(&self) -> &'static str {
        match self {
            Owner::Cart(_) => "cart_id",
            Owner::Session(_) => "session_id",
        }
    }

    fn table(&self) -> &'static str {
        match self {
            Owner::Cart(_) => "carts",
            Owner::Session(_) => "cart_sessions",
        }
    }

    fn id(&self) -> &str {
        match self {
            Owner::Cart(id) | Owner::Session(id) => id,
        }
    }
}

/// Repository for cart database operations.
///
/// All read-modify-write sequences (add, update, merge) run inside a
/// transaction; the UNIQUE(owner, product_id) constraints close the window
/// a concurrent writer could still slip through.
#[derive(Debug, Clone)]
pub struct CartRepository {
    pool: SqlitePool,
}

impl CartRepository {
    /// Creates a new CartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CartRepository { pool }
    }

    // =========================================================================
    // Guest Sessions
    // =========================================================================

    /// Mints a fresh guest cart session and returns it.
    ///
    /// The token is the opaque identifier the client carries as cookie or
    /// header from here on.
    pub async fn start_guest_session(&self, now: DateTime<Utc>) -> DbResult<CartSession> {
        let session = CartSession {
            id: Uuid::new_v4().to_string(),
            token: Uuid::new_v4().to_string(),
            coupon_code: None,
            merged: false,
            created_at: now,
            expires_at: now + Duration::days(GUEST_CART_TTL_DAYS),
        };

        sqlx::query(
            "INSERT INTO cart_sessions (id, token, coupon_code, merged, created_at, expires_at) \
             VALUES (?1, ?2, NULL, 0, ?3, ?4)",
        )
        .bind(&session.id)
        .bind(&session.token)
        .bind(session.created_at)
        .bind(session.expires_at)
        .execute(&self.pool)
        .await?;

        debug!(session_id = %session.id, "Guest cart session started");
        Ok(session)
    }

    /// Looks up a live (unmerged, unexpired) session by token.
    pub async fn find_session(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<CartSession>> {
        let mut conn = self.pool.acquire().await?;
        Self::live_session(&mut conn, token, now).await
    }

    async fn session_by_token(
        conn: &mut SqliteConnection,
        token: &str,
    ) -> DbResult<Option<CartSession>> {
        let session = sqlx::query_as::<_, CartSession>(
            "SELECT id, token, coupon_code, merged, created_at, expires_at \
             FROM cart_sessions WHERE token = ?1",
        )
        .bind(token)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(session)
    }

    /// Expiry and merge state are checked in Rust, not in SQL; there is no
    /// background sweeper for dead sessions.
    async fn live_session(
        conn: &mut SqliteConnection,
        token: &str,
        now: DateTime<Utc>,
    ) -> DbResult<Option<CartSession>> {
        let session = Self::session_by_token(conn, token).await?;
        Ok(session.filter(|s| !s.merged && s.expires_at > now))
    }

    // =========================================================================
    // Owner Resolution
    // =========================================================================

    async fn cart_by_user(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Option<Cart>> {
        let cart = sqlx::query_as::<_, Cart>(
            "SELECT id, user_id, coupon_code, created_at, updated_at \
             FROM carts WHERE user_id = ?1",
        )
        .bind(user_id)
        .fetch_optional(&mut *conn)
        .await?;

        Ok(cart)
    }

    /// Resolves the owning row for a write, creating it when absent.
    ///
    /// A dead session row under the caller's token (merged or expired) is
    /// replaced, cascading away its leftover lines, so the token stays
    /// usable.
    async fn owner_for_write(
        conn: &mut SqliteConnection,
        identity: &CartIdentity,
        now: DateTime<Utc>,
    ) -> DbResult<Owner> {
        match identity {
            CartIdentity::User(user_id) => {
                if let Some(cart) = Self::cart_by_user(conn, user_id).await? {
                    return Ok(Owner::Cart(cart.id));
                }

                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO carts (id, user_id, coupon_code, created_at, updated_at) \
                     VALUES (?1, ?2, NULL, ?3, ?3)",
                )
                .bind(&id)
                .bind(user_id)
                .bind(now)
                .execute(&mut *conn)
                .await?;

                debug!(cart_id = %id, user_id = %user_id, "User cart created");
                Ok(Owner::Cart(id))
            }

            CartIdentity::Guest(token) => {
                if let Some(session) = Self::session_by_token(conn, token).await? {
                    if !session.merged && session.expires_at > now {
                        return Ok(Owner::Session(session.id));
                    }
                    sqlx::query("DELETE FROM cart_sessions WHERE id = ?1")
                        .bind(&session.id)
                        .execute(&mut *conn)
                        .await?;
                }

                let id = Uuid::new_v4().to_string();
                sqlx::query(
                    "INSERT INTO cart_sessions (id, token, coupon_code, merged, created_at, expires_at) \
                     VALUES (?1, ?2, NULL, 0, ?3, ?4)",
                )
                .bind(&id)
                .bind(token)
                .bind(now)
                .bind(now + Duration::days(GUEST_CART_TTL_DAYS))
                .execute(&mut *conn)
                .await?;

                debug!(session_id = %id, "Guest cart session created for provided token");
                Ok(Owner::Session(id))
            }
        }
    }

    /// Resolves the owning row for a read, without creating anything.
    ///
    /// Returns the owner plus its applied coupon code.
    async fn owner_for_read(
        conn: &mut SqliteConnection,
        identity: &CartIdentity,
        now: DateTime<Utc>,
    ) -> DbResult<Option<(Owner, Option<String>)>> {
        match identity {
            CartIdentity::User(user_id) => Ok(Self::cart_by_user(conn, user_id)
                .await?
                .map(|cart| (Owner::Cart(cart.id), cart.coupon_code))),
            CartIdentity::Guest(token) => Ok(Self::live_session(conn, token, now)
                .await?
                .map(|s| (Owner::Session(s.id), s.coupon_code))),
        }
    }

    // =========================================================================
    // Lines
    // =========================================================================

    async fn lines_for_owner(conn: &mut SqliteConnection, owner: &Owner) -> DbResult<Vec<CartItem>> {
        let sql = format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE {} = ?1 ORDER BY created_at",
            owner.column()
        );

        let items = sqlx::query_as::<_, CartItem>(&sql)
            .bind(owner.id())
            .fetch_all(&mut *conn)
            .await?;

        Ok(items)
    }

    async fn line_for_product(
        conn: &mut SqliteConnection,
        owner: &Owner,
        product_id: &str,
    ) -> DbResult<Option<CartItem>> {
        let sql = format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE {} = ?1 AND product_id = ?2",
            owner.column()
        );

        let item = sqlx::query_as::<_, CartItem>(&sql)
            .bind(owner.id())
            .bind(product_id)
            .fetch_optional(&mut *conn)
            .await?;

        Ok(item)
    }

    fn owns(owner: &Owner, item: &CartItem) -> bool {
        match owner {
            Owner::Cart(id) => item.cart_id.as_deref() == Some(id.as_str()),
            Owner::Session(id) => item.session_id.as_deref() == Some(id.as_str()),
        }
    }

    // =========================================================================
    // Operations
    // =========================================================================

    /// Adds a product to the cart, creating the cart/session on first use.
    ///
    /// ## Gates (in order)
    /// 1. Quantity must be positive and within the per-line ceiling
    /// 2. Product must exist, be active, and not be an auction listing
    /// 3. Live stock must cover the quantity - against the *summed* quantity
    ///    when the product is already in the cart
    ///
    /// Adding a product already in the cart sums quantities on the existing
    /// line; the price snapshot is NOT refreshed.
    pub async fn add_item(
        &self,
        identity: &CartIdentity,
        product_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<CartItem> {
        validate_quantity(quantity).map_err(|_| CoreError::InvalidQuantity)?;

        let mut tx = self.pool.begin().await?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(product_id.to_string()))?;

        if !product.is_active() {
            return Err(CoreError::ProductNotAvailable(product.name).into());
        }
        if product.listing_type == ListingType::Auction {
            return Err(CoreError::AuctionItemNotAllowed(product.name).into());
        }

        let owner = Self::owner_for_write(&mut tx, identity, now).await?;

        let item = match Self::line_for_product(&mut tx, &owner, product_id).await? {
            Some(mut line) => {
                let requested = (line.quantity + quantity).min(MAX_ITEM_QUANTITY);
                if !product.can_fulfill(requested) {
                    return Err(CoreError::NotEnoughStock {
                        name: product.name,
                        available: product.stock,
                        requested,
                    }
                    .into());
                }

                sqlx::query("UPDATE cart_items SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
                    .bind(&line.id)
                    .bind(requested)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;

                line.quantity = requested;
                line.updated_at = now;
                line
            }

            None => {
                if !product.can_fulfill(quantity) {
                    return Err(CoreError::NotEnoughStock {
                        name: product.name,
                        available: product.stock,
                        requested: quantity,
                    }
                    .into());
                }

                let line = CartItem {
                    id: Uuid::new_v4().to_string(),
                    cart_id: match &owner {
                        Owner::Cart(id) => Some(id.clone()),
                        Owner::Session(_) => None,
                    },
                    session_id: match &owner {
                        Owner::Cart(_) => None,
                        Owner::Session(id) => Some(id.clone()),
                    },
                    product_id: product.id.clone(),
                    supplier_id: product.supplier_id.clone(),
                    category_id: product.category_id.clone(),
                    name: product.name.clone(),
                    unit_price_paise: product.price_paise,
                    discount_bps: product.discount_bps,
                    gst_rate_bps: product.gst_rate_bps,
                    quantity,
                    listing_type: product.listing_type,
                    condition: product.condition.clone(),
                    unit: product.unit.clone(),
                    is_available: true,
                    price_changed: false,
                    stock_changed: false,
                    created_at: now,
                    updated_at: now,
                };

                sqlx::query(
                    r#"
                    INSERT INTO cart_items (
                        id, cart_id, session_id, product_id, supplier_id, category_id,
                        name, unit_price_paise, discount_bps, gst_rate_bps, quantity,
                        listing_type, condition, unit, is_available, price_changed,
                        stock_changed, created_at, updated_at
                    )
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                            ?14, ?15, ?16, ?17, ?18, ?19)
                    "#,
                )
                .bind(&line.id)
                .bind(&line.cart_id)
                .bind(&line.session_id)
                .bind(&line.product_id)
                .bind(&line.supplier_id)
                .bind(&line.category_id)
                .bind(&line.name)
                .bind(line.unit_price_paise)
                .bind(line.discount_bps)
                .bind(line.gst_rate_bps)
                .bind(line.quantity)
                .bind(line.listing_type)
                .bind(&line.condition)
                .bind(&line.unit)
                .bind(line.is_available)
                .bind(line.price_changed)
                .bind(line.stock_changed)
                .bind(line.created_at)
                .bind(line.updated_at)
                .execute(&mut *tx)
                .await?;

                line
            }
        };

        // Only carts tracks a touch time; sessions live on their expiry.
        if let Owner::Cart(cart_id) = &owner {
            sqlx::query("UPDATE carts SET updated_at = ?2 WHERE id = ?1")
                .bind(cart_id)
                .bind(now)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(
            product_id = %product_id,
            quantity = item.quantity,
            "Cart line upserted"
        );
        Ok(item)
    }

    /// Reads the cart and recomputes the staleness flags from live products.
    ///
    /// A missing owner row (no cart yet, dead session) reads as an empty
    /// cart, never an error.
    pub async fn get_cart(
        &self,
        identity: &CartIdentity,
        now: DateTime<Utc>,
    ) -> DbResult<CartContents> {
        let mut conn = self.pool.acquire().await?;

        let Some((owner, coupon_code)) = Self::owner_for_read(&mut conn, identity, now).await?
        else {
            return Ok(CartContents::empty());
        };

        let mut items = Self::lines_for_owner(&mut conn, &owner).await?;
        if items.is_empty() {
            return Ok(CartContents { coupon_code, items });
        }

        let ids: Vec<String> = items.iter().map(|i| i.product_id.clone()).collect();
        drop(conn);
        let live = crate::repository::product::ProductRepository::new(self.pool.clone())
            .get_map(&ids)
            .await?;
        let mut conn = self.pool.acquire().await?;

        for item in &mut items {
            let (is_available, price_changed, stock_changed) = match live.get(&item.product_id) {
                Some(p) => (
                    p.is_active(),
                    p.price_paise != item.unit_price_paise,
                    p.stock < item.quantity,
                ),
                // Product row gone entirely: unavailable, drift flags moot.
                None => (false, false, false),
            };

            if item.is_available != is_available
                || item.price_changed != price_changed
                || item.stock_changed != stock_changed
            {
                sqlx::query(
                    "UPDATE cart_items SET is_available = ?2, price_changed = ?3, \
                     stock_changed = ?4, updated_at = ?5 WHERE id = ?1",
                )
                .bind(&item.id)
                .bind(is_available)
                .bind(price_changed)
                .bind(stock_changed)
                .bind(now)
                .execute(&mut *conn)
                .await?;

                item.is_available = is_available;
                item.price_changed = price_changed;
                item.stock_changed = stock_changed;
                item.updated_at = now;
            }
        }

        Ok(CartContents { coupon_code, items })
    }

    /// Number of lines in the cart (not summed quantities).
    pub async fn get_cart_count(
        &self,
        identity: &CartIdentity,
        now: DateTime<Utc>,
    ) -> DbResult<i64> {
        let mut conn = self.pool.acquire().await?;

        let Some((owner, _)) = Self::owner_for_read(&mut conn, identity, now).await? else {
            return Ok(0);
        };

        let count: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM cart_items WHERE {} = ?1",
            owner.column()
        ))
        .bind(owner.id())
        .fetch_one(&mut *conn)
        .await?;

        Ok(count)
    }

    /// Changes a line's quantity, re-checking live stock.
    pub async fn update_item_quantity(
        &self,
        identity: &CartIdentity,
        item_id: &str,
        quantity: i64,
        now: DateTime<Utc>,
    ) -> DbResult<CartItem> {
        validate_quantity(quantity).map_err(|_| CoreError::InvalidQuantity)?;

        let mut tx = self.pool.begin().await?;

        let mut line = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE id = ?1"
        ))
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::CartItemNotFound(item_id.to_string()))?;

        Self::owner_for_read(&mut tx, identity, now)
            .await?
            .map(|(owner, _)| owner)
            .filter(|owner| Self::owns(owner, &line))
            .ok_or(CoreError::Unauthorized)?;

        let product = sqlx::query_as::<_, Product>(&format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1"
        ))
        .bind(&line.product_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::ProductNotFound(line.product_id.clone()))?;

        if !product.can_fulfill(quantity) {
            return Err(CoreError::NotEnoughStock {
                name: product.name,
                available: product.stock,
                requested: quantity,
            }
            .into());
        }

        sqlx::query("UPDATE cart_items SET quantity = ?2, updated_at = ?3 WHERE id = ?1")
            .bind(&line.id)
            .bind(quantity)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        line.quantity = quantity;
        line.updated_at = now;
        Ok(line)
    }

    /// Removes a single line.
    pub async fn remove_item(
        &self,
        identity: &CartIdentity,
        item_id: &str,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let line = sqlx::query_as::<_, CartItem>(&format!(
            "SELECT {CART_ITEM_COLUMNS} FROM cart_items WHERE id = ?1"
        ))
        .bind(item_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| CoreError::CartItemNotFound(item_id.to_string()))?;

        Self::owner_for_read(&mut tx, identity, now)
            .await?
            .map(|(owner, _)| owner)
            .filter(|owner| Self::owns(owner, &line))
            .ok_or(CoreError::Unauthorized)?;

        sqlx::query("DELETE FROM cart_items WHERE id = ?1")
            .bind(&line.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Removes every line and clears the applied coupon.
    pub async fn clear_cart(&self, identity: &CartIdentity, now: DateTime<Utc>) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let Some((owner, _)) = Self::owner_for_read(&mut tx, identity, now).await? else {
            return Ok(());
        };

        sqlx::query(&format!(
            "DELETE FROM cart_items WHERE {} = ?1",
            owner.column()
        ))
        .bind(owner.id())
        .execute(&mut *tx)
        .await?;

        sqlx::query(&format!(
            "UPDATE {} SET coupon_code = NULL WHERE id = ?1",
            owner.table()
        ))
        .bind(owner.id())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Stores a coupon code against the cart.
    ///
    /// Pure storage: validation (window, caps, applicability) happens in the
    /// pricing flow before this is called, and again on every summary read.
    pub async fn set_coupon(
        &self,
        identity: &CartIdentity,
        code: Option<&str>,
        now: DateTime<Utc>,
    ) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let owner = Self::owner_for_write(&mut tx, identity, now).await?;

        sqlx::query(&format!(
            "UPDATE {} SET coupon_code = ?2 WHERE id = ?1",
            owner.table()
        ))
        .bind(owner.id())
        .bind(code)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    /// Merges a guest session's cart into the user's cart at login.
    ///
    /// ## Semantics
    /// - New products move over wholesale
    /// - Products the user already carries get quantities summed (capped at
    ///   the per-line ceiling; stock drift surfaces through the lazy flags)
    /// - The session's coupon carries over only when the user cart has none
    /// - The session ends merged (terminal) and empty
    ///
    /// A missing, expired, or already-merged session is a no-op, so retrying
    /// a login flow cannot double-merge.
    pub async fn merge_guest_cart(
        &self,
        user_id: &str,
        session_token: &str,
        now: DateTime<Utc>,
    ) -> DbResult<MergeOutcome> {
        let mut tx = self.pool.begin().await?;

        let Some(session) = Self::live_session(&mut tx, session_token, now).await? else {
            return Ok(MergeOutcome {
                items_merged: 0,
                quantities_updated: 0,
            });
        };

        let user_identity = CartIdentity::User(user_id.to_string());
        let owner = Self::owner_for_write(&mut tx, &user_identity, now).await?;
        let session_owner = Owner::Session(session.id.clone());

        let guest_items = Self::lines_for_owner(&mut tx, &session_owner).await?;

        let mut items_merged = 0;
        let mut quantities_updated = 0;

        for line in &guest_items {
            match Self::line_for_product(&mut tx, &owner, &line.product_id).await? {
                Some(existing) => {
                    let combined = (existing.quantity + line.quantity).min(MAX_ITEM_QUANTITY);

                    sqlx::query(
                        "UPDATE cart_items SET quantity = ?2, updated_at = ?3 WHERE id = ?1",
                    )
                    .bind(&existing.id)
                    .bind(combined)
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;

                    sqlx::query("DELETE FROM cart_items WHERE id = ?1")
                        .bind(&line.id)
                        .execute(&mut *tx)
                        .await?;

                    quantities_updated += 1;
                }

                None => {
                    sqlx::query(
                        "UPDATE cart_items SET cart_id = ?2, session_id = NULL, updated_at = ?3 \
                         WHERE id = ?1",
                    )
                    .bind(&line.id)
                    .bind(owner.id())
                    .bind(now)
                    .execute(&mut *tx)
                    .await?;

                    items_merged += 1;
                }
            }
        }

        if let Some(code) = &session.coupon_code {
            sqlx::query("UPDATE carts SET coupon_code = ?2 WHERE id = ?1 AND coupon_code IS NULL")
                .bind(owner.id())
                .bind(code)
                .execute(&mut *tx)
                .await?;
        }

        sqlx::query("UPDATE cart_sessions SET merged = 1 WHERE id = ?1")
            .bind(&session.id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        debug!(
            user_id = %user_id,
            items_merged,
            quantities_updated,
            "Guest cart merged"
        );
        Ok(MergeOutcome {
            items_merged,
            quantities_updated,
        })
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
