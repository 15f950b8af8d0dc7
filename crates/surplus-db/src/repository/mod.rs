//! # Repository Module
//!
//! Database repository implementations for the marketplace.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern Explained                         │
//! │                                                                         │
//! │  The Repository pattern abstracts database access behind a clean API.  │
//! │                                                                         │
//! │  Request Handler                                                       │
//! │       │                                                                 │
//! │       │  db.carts().add_item(&identity, "product-id", 2, now)          │
//! │       │  ↓                                                              │
//! │       ▼                                                                 │
//! │  CartRepository                                                        │
//! │  ├── add_item(&self, identity, product_id, qty, now)                   │
//! │  ├── get_cart(&self, identity, now)                                    │
//! │  ├── merge_guest_cart(&self, user_id, token, now)                      │
//! │  └── ...                                                                │
//! │       │                                                                 │
//! │       │  SQL (inside a transaction where it's read-modify-write)       │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! │                                                                         │
//! │  Business rules (stock gates, coupon windows, status machines) come    │
//! │  from surplus-core; the repositories supply rows and atomicity.        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - Product listings and stock
//! - [`cart::CartRepository`] - User carts and guest sessions
//! - [`coupon::CouponRepository`] - Coupon lookup and redemption counters
//! - [`shipping::ShippingRepository`] - Shipping zones
//! - [`checkout::CheckoutRepository`] - Pricing summaries and checkout sessions
//! - [`rfq::RfqRepository`] - RFQs and supplier quotes

pub mod cart;
pub mod checkout;
pub mod coupon;
pub mod product;
pub mod rfq;
pub mod shipping;
