//! # surplus-core: Pure Business Logic for the Surplus Marketplace
//!
//! This crate is the **heart** of the marketplace backend. It contains all
//! business logic as pure functions with zero I/O dependencies.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Surplus Marketplace Architecture                     │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  HTTP API layer (external)                      │   │
//! │  │    /api/cart/* ──► /api/cart/checkout ──► /api/supplier/rfqs    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ surplus-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  coupon   │  │  pricing  │  │   │
//! │  │   │  Product  │  │   Money   │  │ validator │  │  engine   │  │   │
//! │  │   │ Cart/RFQ  │  │ GstRate   │  │           │  │           │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                  surplus-db (Database Layer)                    │   │
//! │  │        SQLite queries, migrations, cart/coupon/RFQ repos        │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, CartItem, Coupon, Rfq, Quote, ...)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types with stable wire codes
//! - [`validation`] - Input validation
//! - [`coupon`] - Coupon validation and discount calculation
//! - [`pricing`] - Cart pricing pipeline, shipping estimation, stock gate
//!
//! ## Design Principles
//!
//! 1. **Pure Functions**: Every function is deterministic - time is an
//!    explicit argument, never read from a clock
//! 2. **No I/O**: Database, network, file system access is FORBIDDEN here
//! 3. **Integer Money**: All monetary values are in paise (i64); the API
//!    boundary converts to 2-decimal rupees exactly once
//! 4. **Explicit Errors**: All errors are typed, never strings or panics
//!
//! ## Example Usage
//!
//! ```rust
//! use surplus_core::money::Money;
//!
//! // Create money from paise (never from floats!)
//! let subtotal = Money::from_paise(180_000); // ₹1800.00
//!
//! // 18% GST on a ₹1500 post-coupon subtotal
//! let gst = subtotal.sub_or_zero(Money::from_paise(30_000)).apply_bps(1800);
//! assert_eq!(gst.paise(), 27_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod coupon;
pub mod error;
pub mod money;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use surplus_core::Money` instead of
// `use surplus_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single item in a cart.
///
/// ## Business Reason
/// Prevents accidental over-ordering (e.g., typing 1000 instead of 10).
/// Stock checks still bind below this ceiling.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Maximum delivery window a supplier can quote, in days.
pub const MAX_QUOTE_DELIVERY_DAYS: i64 = 365;

/// Default GST rate in basis points (18%), used when a product specifies
/// none.
pub const DEFAULT_GST_RATE_BPS: u32 = 1800;

/// Fallback shipping charge in paise (₹100.00) when no zone matches the
/// destination or no shipping info was provided.
pub const DEFAULT_SHIPPING_CHARGE_PAISE: i64 = 10_000;

/// Guest cart session lifetime in days. Expiry is filtered at read time;
/// there is no background sweep.
pub const GUEST_CART_TTL_DAYS: i64 = 30;

/// Checkout session lifetime in minutes.
pub const CHECKOUT_SESSION_TTL_MINUTES: i64 = 30;
