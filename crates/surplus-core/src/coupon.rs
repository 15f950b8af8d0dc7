//! # Coupon Validator
//!
//! Pure validation and discount calculation for coupons.
//!
//! ## Check Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  validate_and_calculate(coupon, ...)                                    │
//! │                                                                         │
//! │  1. active?            ─ no ─► INVALID_COUPON                           │
//! │  2. window opened?     ─ no ─► COUPON_NOT_STARTED                       │
//! │     window closed?     ─ yes ► COUPON_EXPIRED                           │
//! │  3. min order met?     ─ no ─► MIN_ORDER_NOT_MET                        │
//! │  4. total cap free?    ─ no ─► COUPON_USAGE_LIMIT_REACHED               │
//! │  5. user cap free?     ─ no ─► USER_USAGE_LIMIT_REACHED                 │
//! │  6. any item matches?  ─ no ─► COUPON_NOT_APPLICABLE                    │
//! │  7. compute discount, clamp to [0, orderValue]                          │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Deliberately NOT Here
//! - Code lookup (repository concern; codes match case-insensitively there)
//! - Usage recording (`record_usage` runs after checkout, never during
//!   validation, so validating a coupon can never consume it)

use chrono::{DateTime, Utc};

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{CartItem, Coupon, CouponBenefit, CouponGrant};

/// Validates a coupon against an order and computes its discount.
///
/// ## Arguments
/// * `coupon` - the looked-up coupon row, normalized
/// * `user_usage_count` - how often this user has redeemed this coupon;
///   `None` for guests (per-user caps don't bind anonymous carts)
/// * `order_value` - item subtotal net of item discounts
/// * `items` - cart lines, for allow-list/exclude-list matching
/// * `now` - validation instant, injected for testability
///
/// ## Guarantees
/// The returned discount is always within `[0, order_value]`, and for
/// percentage coupons never exceeds the configured `max_discount`.
pub fn validate_and_calculate(
    coupon: &Coupon,
    user_usage_count: Option<i64>,
    order_value: Money,
    items: &[CartItem],
    now: DateTime<Utc>,
) -> CoreResult<CouponGrant> {
    if !coupon.is_active {
        return Err(CoreError::InvalidCoupon(coupon.code.clone()));
    }

    if now < coupon.valid_from {
        return Err(CoreError::CouponNotStarted {
            code: coupon.code.clone(),
        });
    }
    if now > coupon.valid_until {
        return Err(CoreError::CouponExpired {
            code: coupon.code.clone(),
        });
    }

    if order_value < coupon.min_order_value {
        return Err(CoreError::MinOrderNotMet {
            minimum: coupon.min_order_value,
        });
    }

    if let Some(limit) = coupon.usage_limit {
        if coupon.used_count >= limit {
            return Err(CoreError::CouponUsageLimitReached {
                code: coupon.code.clone(),
            });
        }
    }

    if let (Some(per_user), Some(used)) = (coupon.max_usage_per_user, user_usage_count) {
        if used >= per_user {
            return Err(CoreError::UserUsageLimitReached {
                code: coupon.code.clone(),
            });
        }
    }

    if !applies_to_any(coupon, items) {
        return Err(CoreError::CouponNotApplicable {
            code: coupon.code.clone(),
        });
    }

    let discount = compute_discount(&coupon.benefit, order_value);

    Ok(CouponGrant {
        code: coupon.code.clone(),
        discount,
    })
}

/// Whether at least one cart line satisfies the coupon's scope.
///
/// No allow-lists and no exclusions means the coupon applies to everything.
/// With allow-lists, a line matches when its product or category appears on
/// one of them; an excluded product never matches regardless of the lists.
fn applies_to_any(coupon: &Coupon, items: &[CartItem]) -> bool {
    let unscoped = coupon.applicable_products.is_empty()
        && coupon.applicable_categories.is_empty()
        && coupon.excluded_products.is_empty();
    if unscoped {
        return true;
    }

    items.iter().any(|item| applies_to_item(coupon, item))
}

/// Whether one cart line satisfies the coupon's scope.
fn applies_to_item(coupon: &Coupon, item: &CartItem) -> bool {
    if coupon
        .excluded_products
        .iter()
        .any(|p| p == &item.product_id)
    {
        return false;
    }

    let has_allow_list =
        !coupon.applicable_products.is_empty() || !coupon.applicable_categories.is_empty();
    if !has_allow_list {
        return true;
    }

    let product_listed = coupon
        .applicable_products
        .iter()
        .any(|p| p == &item.product_id);
    let category_listed = item
        .category_id
        .as_deref()
        .map(|c| coupon.applicable_categories.iter().any(|ac| ac == c))
        .unwrap_or(false);

    product_listed || category_listed
}

/// Computes the raw discount amount for an order value, clamped so a coupon
/// can never make the order negative.
fn compute_discount(benefit: &CouponBenefit, order_value: Money) -> Money {
    let raw = match benefit {
        CouponBenefit::Percentage { bps, max_discount } => {
            let pct = order_value.apply_bps(*bps);
            match max_discount {
                Some(cap) => pct.min(*cap),
                None => pct,
            }
        }
        CouponBenefit::Flat { amount } => *amount,
    };

    // Clamp to [0, order_value]
    raw.min(order_value).abs().min(order_value)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ListingType;
    use chrono::Duration;

    fn test_coupon(benefit: CouponBenefit) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: "cp-1".into(),
            code: "SAVE10".into(),
            description: None,
            benefit,
            min_order_value: Money::zero(),
            valid_from: now - Duration::days(1),
            valid_until: now + Duration::days(1),
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

    fn test_item(product_id: &str, category_id: Option<&str>) -> CartItem {
        CartItem {
            id: format!("item-{product_id}"),
            cart_id: Some("c-1".into()),
            session_id: None,
            product_id: product_id.into(),
            supplier_id: "s-1".into(),
            category_id: category_id.map(String::from),
            name: "Steel coil".into(),
            unit_price_paise: 100_000,
            discount_bps: 0,
            gst_rate_bps: 1800,
            quantity: 1,
            listing_type: ListingType::FixedPrice,
            condition: "used".into(),
            unit: "ton".into(),
            is_available: true,
            price_changed: false,
            stock_changed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_percentage_discount() {
        let coupon = test_coupon(CouponBenefit::Percentage {
            bps: 1000,
            max_discount: None,
        });
        let items = [test_item("p-1", None)];

        let grant =
            validate_and_calculate(&coupon, None, Money::from_paise(200_000), &items, Utc::now())
                .unwrap();
        assert_eq!(grant.discount.paise(), 20_000); // 10% of ₹2000
    }

    #[test]
    fn test_percentage_discount_respects_cap() {
        let coupon = test_coupon(CouponBenefit::Percentage {
            bps: 1000,
            max_discount: Some(Money::from_paise(10_000)),
        });
        let items = [test_item("p-1", None)];

        let grant =
            validate_and_calculate(&coupon, None, Money::from_paise(500_000), &items, Utc::now())
                .unwrap();
        // 10% of ₹5000 would be ₹500, cap is ₹100
        assert_eq!(grant.discount.paise(), 10_000);
    }

    #[test]
    fn test_flat_discount_clamped_to_order_value() {
        let coupon = test_coupon(CouponBenefit::Flat {
            amount: Money::from_paise(50_000),
        });
        let items = [test_item("p-1", None)];

        let grant =
            validate_and_calculate(&coupon, None, Money::from_paise(20_000), &items, Utc::now())
                .unwrap();
        // ₹500 flat on a ₹200 order: clamped, never negative payable
        assert_eq!(grant.discount.paise(), 20_000);
        assert!(!grant.discount.is_negative());
    }

    #[test]
    fn test_temporal_window() {
        let now = Utc::now();
        let items = [test_item("p-1", None)];

        let mut coupon = test_coupon(CouponBenefit::Flat {
            amount: Money::from_paise(1_000),
        });
        coupon.valid_from = now + Duration::hours(1);
        coupon.valid_until = now + Duration::days(1);
        let err = validate_and_calculate(&coupon, None, Money::from_paise(100_000), &items, now)
            .unwrap_err();
        assert_eq!(err.code(), "COUPON_NOT_STARTED");

        coupon.valid_from = now - Duration::days(2);
        coupon.valid_until = now - Duration::days(1);
        let err = validate_and_calculate(&coupon, None, Money::from_paise(100_000), &items, now)
            .unwrap_err();
        assert_eq!(err.code(), "COUPON_EXPIRED");
    }

    #[test]
    fn test_min_order_value() {
        let mut coupon = test_coupon(CouponBenefit::Flat {
            amount: Money::from_paise(1_000),
        });
        coupon.min_order_value = Money::from_paise(100_000);
        let items = [test_item("p-1", None)];

        let err =
            validate_and_calculate(&coupon, None, Money::from_paise(50_000), &items, Utc::now())
                .unwrap_err();
        assert_eq!(err.code(), "MIN_ORDER_NOT_MET");

        assert!(validate_and_calculate(
            &coupon,
            None,
            Money::from_paise(100_000),
            &items,
            Utc::now()
        )
        .is_ok());
    }

    #[test]
    fn test_usage_limits() {
        let mut coupon = test_coupon(CouponBenefit::Flat {
            amount: Money::from_paise(1_000),
        });
        let items = [test_item("p-1", None)];

        coupon.usage_limit = Some(100);
        coupon.used_count = 100;
        let err =
            validate_and_calculate(&coupon, None, Money::from_paise(100_000), &items, Utc::now())
                .unwrap_err();
        assert_eq!(err.code(), "COUPON_USAGE_LIMIT_REACHED");

        coupon.used_count = 10;
        coupon.max_usage_per_user = Some(2);
        let err =
            validate_and_calculate(&coupon, Some(2), Money::from_paise(100_000), &items, Utc::now())
                .unwrap_err();
        assert_eq!(err.code(), "USER_USAGE_LIMIT_REACHED");

        // Guests are not bound by per-user caps
        assert!(validate_and_calculate(
            &coupon,
            None,
            Money::from_paise(100_000),
            &items,
            Utc::now()
        )
        .is_ok());
    }

    #[test]
    fn test_applicability_allow_lists() {
        let mut coupon = test_coupon(CouponBenefit::Flat {
            amount: Money::from_paise(1_000),
        });
        coupon.applicable_products = vec!["p-2".into()];

        let miss = [test_item("p-1", None)];
        let err =
            validate_and_calculate(&coupon, None, Money::from_paise(100_000), &miss, Utc::now())
                .unwrap_err();
        assert_eq!(err.code(), "COUPON_NOT_APPLICABLE");

        let hit = [test_item("p-1", None), test_item("p-2", None)];
        assert!(validate_and_calculate(
            &coupon,
            None,
            Money::from_paise(100_000),
            &hit,
            Utc::now()
        )
        .is_ok());

        // Category allow-list matches too
        coupon.applicable_products = vec![];
        coupon.applicable_categories = vec!["metals".into()];
        let by_category = [test_item("p-3", Some("metals"))];
        assert!(validate_and_calculate(
            &coupon,
            None,
            Money::from_paise(100_000),
            &by_category,
            Utc::now()
        )
        .is_ok());
    }

    #[test]
    fn test_applicability_exclusions() {
        let mut coupon = test_coupon(CouponBenefit::Flat {
            amount: Money::from_paise(1_000),
        });
        coupon.applicable_products = vec!["p-1".into()];
        coupon.excluded_products = vec!["p-1".into()];

        // The only allow-listed product is also excluded
        let items = [test_item("p-1", None)];
        let err =
            validate_and_calculate(&coupon, None, Money::from_paise(100_000), &items, Utc::now())
                .unwrap_err();
        assert_eq!(err.code(), "COUPON_NOT_APPLICABLE");
    }

    #[test]
    fn test_inactive_coupon_is_invalid() {
        let mut coupon = test_coupon(CouponBenefit::Flat {
            amount: Money::from_paise(1_000),
        });
        coupon.is_active = false;
        let items = [test_item("p-1", None)];

        let err =
            validate_and_calculate(&coupon, None, Money::from_paise(100_000), &items, Utc::now())
                .unwrap_err();
        assert_eq!(err.code(), "INVALID_COUPON");
    }

    /// The granted discount is always within [0, order_value].
    #[test]
    fn test_discount_bounds_hold() {
        let order = Money::from_paise(30_000);
        let items = [test_item("p-1", None)];

        for benefit in [
            CouponBenefit::Flat {
                amount: Money::from_paise(100_000),
            },
            CouponBenefit::Percentage {
                bps: 10_000, // 100%
                max_discount: None,
            },
            CouponBenefit::Percentage {
                bps: 500,
                max_discount: Some(Money::from_paise(200)),
            },
        ] {
            let coupon = test_coupon(benefit);
            let grant =
                validate_and_calculate(&coupon, None, order, &items, Utc::now()).unwrap();
            assert!(grant.discount >= Money::zero());
            assert!(grant.discount <= order);
        }
    }
}
