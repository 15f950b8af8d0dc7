//! # Error Types
//!
//! Domain-specific error types for surplus-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  surplus-core errors (this file)                                        │
//! │  ├── CoreError        - Business rule violations, with wire codes       │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  surplus-db errors (separate crate)                                     │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  HTTP boundary (external)                                               │
//! │  └── {success:false, message, error} ← CoreError::code()                │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → HTTP envelope            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, limits, etc.)
//! 3. Errors are enum variants, never String
//! 4. Every business error carries a stable machine-readable code via
//!    [`CoreError::code`] - that string is what API clients switch on,
//!    so it never changes once shipped

use thiserror::Error;

use crate::money::Money;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These errors represent business rule violations. The HTTP boundary maps
/// [`CoreError::code`] into the `error` field of the JSON envelope and the
/// display message into `message`.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product id doesn't resolve to a listing.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Listing exists but its status isn't active.
    #[error("Product is not available: {0}")]
    ProductNotAvailable(String),

    /// Auction listings resolve through bidding, never through the cart.
    #[error("Auction items cannot be added to the cart: {0}")]
    AuctionItemNotAllowed(String),

    /// Requested quantity exceeds live stock.
    ///
    /// Raised both on add-to-cart (against the summed quantity when the
    /// product is already in the cart) and on quantity updates.
    #[error("Not enough stock for {name}: available {available}, requested {requested}")]
    NotEnoughStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// Quantity must be a positive integer.
    #[error("Quantity must be greater than zero")]
    InvalidQuantity,

    /// Cart line doesn't exist.
    #[error("Cart item not found: {0}")]
    CartItemNotFound(String),

    /// Cart line belongs to a different cart than the caller's.
    #[error("Cart item belongs to a different cart")]
    Unauthorized,

    /// No active coupon matches the code.
    #[error("Invalid coupon code: {0}")]
    InvalidCoupon(String),

    /// Coupon's validity window hasn't opened yet.
    #[error("Coupon {code} is not active yet")]
    CouponNotStarted { code: String },

    /// Coupon's validity window has closed.
    #[error("Coupon {code} has expired")]
    CouponExpired { code: String },

    /// Order value below the coupon's minimum.
    #[error("Order value below coupon minimum of {minimum}")]
    MinOrderNotMet { minimum: Money },

    /// Coupon's total redemption cap has been hit.
    #[error("Coupon {code} has reached its usage limit")]
    CouponUsageLimitReached { code: String },

    /// Caller has personally exhausted the per-user cap.
    #[error("You have already used coupon {code} the maximum number of times")]
    UserUsageLimitReached { code: String },

    /// No cart item matches the coupon's allow-lists (or all matches are
    /// excluded).
    #[error("Coupon {code} does not apply to any item in the cart")]
    CouponNotApplicable { code: String },

    /// Cart is empty where at least one line is required (checkout).
    #[error("Cart is empty")]
    CartEmpty,

    /// Stock validation failed at the checkout gate.
    #[error("{count} cart item(s) are no longer available")]
    CheckoutStockInvalid { count: usize },

    /// RFQ id doesn't resolve.
    #[error("RFQ not found: {0}")]
    RfqNotFound(String),

    /// RFQ exists but is not accepting quotes.
    #[error("RFQ {id} is {status}, not accepting quotes")]
    RfqNotActive { id: String, status: String },

    /// Supplier already has a quote against this RFQ.
    #[error("A quote for this RFQ already exists from this supplier")]
    DuplicateQuote,

    /// Quote id doesn't resolve.
    #[error("Quote not found: {0}")]
    QuoteNotFound(String),

    /// Quote is in a terminal status and cannot transition.
    #[error("Quote is already {status} and cannot change")]
    QuoteAlreadyFinal { status: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Stable machine-readable code for the HTTP error envelope.
    ///
    /// Clients switch on these strings; treat them as a wire contract.
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::ProductNotFound(_) => "PRODUCT_NOT_FOUND",
            CoreError::ProductNotAvailable(_) => "PRODUCT_NOT_AVAILABLE",
            CoreError::AuctionItemNotAllowed(_) => "AUCTION_ITEM_NOT_ALLOWED_IN_CART",
            CoreError::NotEnoughStock { .. } => "NOT_ENOUGH_STOCK",
            CoreError::InvalidQuantity => "INVALID_QUANTITY",
            CoreError::CartItemNotFound(_) => "CART_ITEM_NOT_FOUND",
            CoreError::Unauthorized => "UNAUTHORIZED",
            CoreError::InvalidCoupon(_) => "INVALID_COUPON",
            CoreError::CouponNotStarted { .. } => "COUPON_NOT_STARTED",
            CoreError::CouponExpired { .. } => "COUPON_EXPIRED",
            CoreError::MinOrderNotMet { .. } => "MIN_ORDER_NOT_MET",
            CoreError::CouponUsageLimitReached { .. } => "COUPON_USAGE_LIMIT_REACHED",
            CoreError::UserUsageLimitReached { .. } => "USER_USAGE_LIMIT_REACHED",
            CoreError::CouponNotApplicable { .. } => "COUPON_NOT_APPLICABLE",
            CoreError::CartEmpty => "CART_EMPTY",
            CoreError::CheckoutStockInvalid { .. } => "CHECKOUT_STOCK_INVALID",
            CoreError::RfqNotFound(_) => "RFQ_NOT_FOUND",
            CoreError::RfqNotActive { .. } => "RFQ_NOT_ACTIVE",
            CoreError::DuplicateQuote => "DUPLICATE_QUOTE",
            CoreError::QuoteNotFound(_) => "QUOTE_NOT_FOUND",
            CoreError::QuoteAlreadyFinal { .. } => "QUOTE_ALREADY_FINAL",
            CoreError::Validation(_) => "VALIDATION_ERROR",
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when caller input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Invalid format (e.g., invalid UUID, invalid pincode).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// A range's minimum exceeds its maximum.
    #[error("{field} minimum cannot exceed maximum")]
    InvertedRange { field: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
