//! # surplus-db: Database Layer for the Surplus Marketplace
//!
//! This crate provides database access for the marketplace backend.
//! It uses SQLite for storage with sqlx for async operations.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Marketplace Data Flow                               │
//! │                                                                         │
//! │  HTTP handler (add_to_cart, submit_quote, ...)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    surplus-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ CartRepo      │    │              │  │   │
//! │  │   │ SqlitePool    │◄───│ CouponRepo    │    │ 001_init.sql │  │   │
//! │  │   │ Connection    │    │ CheckoutRepo  │    │ ...          │  │   │
//! │  │   │ Management    │    │ RfqRepo ...   │    │              │  │   │
//! │  │   └───────────────┘    └───────┬───────┘    └──────────────┘  │   │
//! │  │                                │ business rules via            │   │
//! │  │                                ▼ surplus-core (pure)           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database file (WAL mode)                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types (carrying core errors through)
//! - [`notify`] - Best-effort buyer notification seam for quotes
//! - [`repository`] - Repository implementations (cart, coupon, rfq, ...)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use surplus_db::{Database, DbConfig};
//! use surplus_core::CartIdentity;
//!
//! let db = Database::new(DbConfig::new("path/to/marketplace.db")).await?;
//!
//! let identity = CartIdentity::User("user-1".into());
//! db.carts().add_item(&identity, "product-id", 2, Utc::now()).await?;
//! let summary = db.checkout().price_cart(&identity, Some("maharashtra"), Utc::now()).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod notify;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use notify::{LogNotifier, NoopNotifier, NotifyError, QuoteNotifier};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::cart::{CartContents, CartRepository};
pub use repository::checkout::{CheckoutRepository, CheckoutSnapshot};
pub use repository::coupon::CouponRepository;
pub use repository::product::ProductRepository;
pub use repository::rfq::{NewQuote, NewRfq, RfqRepository};
pub use repository::shipping::ShippingRepository;
