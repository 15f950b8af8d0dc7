//! # Pricing Engine
//!
//! Composes the cart pricing pipeline into a final payable amount.
//!
//! ## The Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 calculate_cart_summary                                  │
//! │                                                                         │
//! │  per line:  item_total = unit_price × qty                               │
//! │             item_discount = item_total × discount_bps                    │
//! │             net = item_total − item_discount                             │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  item_subtotal = Σ net                                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  coupon discount (Coupon Validator) ── invalid? carry message, skip      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  subtotal_after_coupon = max(0, item_subtotal − coupon)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GST: per line, each line's own rate on its own post-discount,           │
//! │       post-coupon share (coupon allocated proportionally)                │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  shipping: zone base charge, waived at the free-shipping threshold       │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  final = subtotal_after_coupon + gst + shipping + platform_fee           │
//! │                                                                         │
//! │  All arithmetic in integer paise; every component exact at 2 decimals.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Per-Line GST
//! Tax is computed line by line: each line's own GST rate applies to its own
//! post-discount share, with the coupon discount allocated across lines in
//! proportion to their net values (remainder to the last line so allocations
//! sum exactly). A single blended rate would misprice carts that mix GST
//! slabs with uneven discounts.

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::coupon::validate_and_calculate;
use crate::money::Money;
use crate::types::{
    CartItem, Coupon, ItemPricing, PriceDrift, PricingSummary, Product, ShippingQuote,
    ShippingZone, StockCheckLine, StockIssue, StockReport,
};
use crate::DEFAULT_SHIPPING_CHARGE_PAISE;

// =============================================================================
// Coupon Input
// =============================================================================

/// A looked-up coupon plus the caller's usage count, ready for validation.
///
/// The repository resolves the code and counts; the engine stays pure.
#[derive(Debug, Clone, Copy)]
pub struct CouponInput<'a> {
    pub coupon: &'a Coupon,
    /// Redemption count for the current user; None for guests.
    pub user_usage_count: Option<i64>,
}

// =============================================================================
// Cart Summary
// =============================================================================

/// Computes the full pricing summary for a cart.
///
/// An invalid coupon does not fail the calculation: the summary proceeds
/// without it and carries the failure message for display, so a stale code
/// never blanks the cart page.
pub fn calculate_cart_summary(
    items: &[CartItem],
    coupon: Option<CouponInput<'_>>,
    shipping_zone: Option<&ShippingZone>,
    now: DateTime<Utc>,
) -> PricingSummary {
    // Step 1: per-line totals and the item subtotal.
    let mut item_subtotal = Money::zero();
    let mut total_item_discount = Money::zero();
    let mut net_lines: Vec<Money> = Vec::with_capacity(items.len());

    for item in items {
        let net = item.net_total();
        item_subtotal += net;
        total_item_discount += item.line_discount();
        net_lines.push(net);
    }

    // Step 2: coupon discount, only against a non-empty subtotal.
    let mut coupon_code = None;
    let mut coupon_discount = Money::zero();
    let mut coupon_message = None;

    if let Some(input) = coupon {
        if item_subtotal.is_positive() {
            match validate_and_calculate(
                input.coupon,
                input.user_usage_count,
                item_subtotal,
                items,
                now,
            ) {
                Ok(grant) => {
                    coupon_code = Some(grant.code);
                    coupon_discount = grant.discount;
                }
                Err(err) => {
                    coupon_message = Some(err.to_string());
                }
            }
        }
    }

    // Step 3: subtotal after coupon, floored at zero.
    let subtotal_after_coupon = item_subtotal.sub_or_zero(coupon_discount);

    // Step 4: per-line GST on post-discount, post-coupon shares.
    let allocations = allocate_proportionally(coupon_discount, &net_lines, item_subtotal);
    let mut gst_total = Money::zero();
    let mut breakdown: Vec<ItemPricing> = Vec::with_capacity(items.len());

    for (i, item) in items.iter().enumerate() {
        let taxable = net_lines[i].sub_or_zero(allocations[i]);
        let line_gst = taxable.apply_bps(item.gst_rate_bps);
        gst_total += line_gst;

        breakdown.push(ItemPricing {
            item_id: item.id.clone(),
            product_id: item.product_id.clone(),
            name: item.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price().rupees(),
            item_total: item.line_total().rupees(),
            discount_percent: item.discount_bps as f64 / 100.0,
            item_discount: item.line_discount().rupees(),
            net_total: net_lines[i].rupees(),
            gst_rate_percent: item.gst_rate_bps as f64 / 100.0,
            gst_amount: line_gst.rupees(),
        });
    }

    // Step 5: shipping against the post-coupon subtotal.
    let shipping = estimate_shipping(shipping_zone, subtotal_after_coupon);
    let shipping_charge = Money::from_rupees(shipping.charge);

    // Step 6: platform fee, reserved hook.
    let fee = platform_fee();

    // Step 7: final payable. Components are integer paise, so this sum is
    // exactly the sum of the independently 2-dp-exact components.
    let final_payable = subtotal_after_coupon + gst_total + shipping_charge + fee;

    PricingSummary {
        item_subtotal: item_subtotal.rupees(),
        total_item_discount: total_item_discount.rupees(),
        coupon_code,
        coupon_discount: coupon_discount.rupees(),
        coupon_message,
        subtotal_after_coupon: subtotal_after_coupon.rupees(),
        gst_amount: gst_total.rupees(),
        shipping_charge: shipping_charge.rupees(),
        free_shipping: shipping.free_shipping,
        platform_fee: fee.rupees(),
        final_payable: final_payable.rupees(),
        total_savings: (total_item_discount + coupon_discount).rupees(),
        items: breakdown,
    }
}

/// Platform fee hook. Always zero today; kept as a named step so future fee
/// models slot into the pipeline without reshaping the summary.
#[inline]
pub fn platform_fee() -> Money {
    Money::zero()
}

/// Splits `amount` across lines in proportion to their net values.
///
/// Integer division floors each share; the last line takes the remainder so
/// the allocations always sum to exactly `amount`.
fn allocate_proportionally(amount: Money, net_lines: &[Money], subtotal: Money) -> Vec<Money> {
    if net_lines.is_empty() || amount.is_zero() || !subtotal.is_positive() {
        return vec![Money::zero(); net_lines.len()];
    }

    let mut allocations = Vec::with_capacity(net_lines.len());
    let mut allocated = Money::zero();

    for (i, net) in net_lines.iter().enumerate() {
        let share = if i == net_lines.len() - 1 {
            amount - allocated
        } else {
            let share =
                (amount.paise() as i128 * net.paise() as i128 / subtotal.paise() as i128) as i64;
            Money::from_paise(share)
        };
        allocated += share;
        allocations.push(share);
    }

    allocations
}

// =============================================================================
// Shipping
// =============================================================================

/// Resolves the shipping charge for a destination zone and order value.
///
/// No matching zone (or no shipping info at all) falls back to the fixed
/// default charge rather than failing the calculation.
pub fn estimate_shipping(zone: Option<&ShippingZone>, order_value: Money) -> ShippingQuote {
    match zone {
        Some(zone) => {
            let free = order_value >= zone.free_shipping_threshold();
            ShippingQuote {
                charge: if free {
                    0.0
                } else {
                    zone.base_charge().rupees()
                },
                free_shipping: free,
                zone_state: Some(zone.state.clone()),
            }
        }
        None => ShippingQuote {
            charge: Money::from_paise(DEFAULT_SHIPPING_CHARGE_PAISE).rupees(),
            free_shipping: false,
            zone_state: None,
        },
    }
}

// =============================================================================
// Stock Validation (checkout gate)
// =============================================================================

/// Re-checks every cart line against live product rows.
///
/// Classifies each line as available/unavailable with a reason, flags price
/// drift between snapshot and live price, and ANDs the per-line results into
/// the overall `valid` used as the checkout gate.
pub fn validate_stock(items: &[CartItem], live: &HashMap<String, Product>) -> StockReport {
    let mut lines = Vec::with_capacity(items.len());
    let mut unavailable = 0usize;

    for item in items {
        let line = check_line(item, live.get(&item.product_id));
        if !line.available {
            unavailable += 1;
        }
        lines.push(line);
    }

    StockReport {
        valid: unavailable == 0,
        unavailable_count: unavailable,
        lines,
    }
}

fn check_line(item: &CartItem, product: Option<&Product>) -> StockCheckLine {
    let mut line = StockCheckLine {
        item_id: item.id.clone(),
        product_id: item.product_id.clone(),
        name: item.name.clone(),
        requested: item.quantity,
        available: false,
        issue: None,
        stock_available: None,
        price_drift: None,
    };

    let Some(product) = product else {
        line.issue = Some(StockIssue::ProductNotFound);
        return line;
    };

    line.stock_available = Some(product.stock);
    line.price_drift = price_drift(item.unit_price(), product.price());

    if !product.is_active() {
        line.issue = Some(StockIssue::ProductInactive);
    } else if !product.can_fulfill(item.quantity) {
        line.issue = Some(StockIssue::InsufficientStock);
    } else {
        line.available = true;
    }

    line
}

/// Price drift between the snapshot and the live price, when they differ.
fn price_drift(snapshot: Money, current: Money) -> Option<PriceDrift> {
    if snapshot == current {
        return None;
    }

    let change_percent = if snapshot.is_positive() {
        let delta = (current - snapshot).paise() as f64;
        (delta / snapshot.paise() as f64 * 10_000.0).round() / 100.0
    } else {
        0.0
    };

    Some(PriceDrift {
        previous: snapshot.rupees(),
        current: current.rupees(),
        change_percent,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CouponBenefit, ListingType, ProductStatus};
    use chrono::Duration;

    fn test_item(
        id: &str,
        price_paise: i64,
        qty: i64,
        discount_bps: u32,
        gst_bps: u32,
    ) -> CartItem {
        CartItem {
            id: id.into(),
            cart_id: Some("c-1".into()),
            session_id: None,
            product_id: format!("p-{id}"),
            supplier_id: "s-1".into(),
            category_id: None,
            name: format!("Item {id}"),
            unit_price_paise: price_paise,
            discount_bps,
            gst_rate_bps: gst_bps,
            quantity: qty,
            listing_type: ListingType::FixedPrice,
            condition: "used".into(),
            unit: "piece".into(),
            is_available: true,
            price_changed: false,
            stock_changed: false,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn flat_coupon(paise: i64) -> Coupon {
        let now = Utc::now();
        Coupon {
            id: "cp-1".into(),
            code: "FLAT300".into(),
            description: None,
            benefit: CouponBenefit::Flat {
                amount: Money::from_paise(paise),
            },
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

    fn zone(base_paise: i64, threshold_paise: i64) -> ShippingZone {
        ShippingZone {
            id: "z-1".into(),
            state: "maharashtra".into(),
            base_charge_paise: base_paise,
            free_shipping_threshold_paise: threshold_paise,
        }
    }

    fn live_product(id: &str, price_paise: i64, stock: i64, status: ProductStatus) -> Product {
        Product {
            id: id.into(),
            supplier_id: "s-1".into(),
            category_id: None,
            name: format!("Product {id}"),
            description: None,
            price_paise,
            discount_bps: 0,
            gst_rate_bps: 1800,
            stock,
            unit: "piece".into(),
            condition: "used".into(),
            listing_type: ListingType::FixedPrice,
            status,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    /// The worked example from the product brief: price 1000, qty 2, 10%
    /// discount, flat ₹300 coupon, 18% GST, zone base ₹500 below threshold.
    #[test]
    fn test_worked_example() {
        let items = [test_item("1", 100_000, 2, 1000, 1800)];
        let coupon = flat_coupon(30_000);
        let zone = zone(50_000, 500_000);

        let summary = calculate_cart_summary(
            &items,
            Some(CouponInput {
                coupon: &coupon,
                user_usage_count: None,
            }),
            Some(&zone),
            Utc::now(),
        );

        assert_eq!(summary.item_subtotal, 1800.0);
        assert_eq!(summary.total_item_discount, 200.0);
        assert_eq!(summary.coupon_discount, 300.0);
        assert_eq!(summary.subtotal_after_coupon, 1500.0);
        assert_eq!(summary.gst_amount, 270.0);
        assert_eq!(summary.shipping_charge, 500.0);
        assert_eq!(summary.platform_fee, 0.0);
        assert_eq!(summary.final_payable, 2270.0);
        assert_eq!(summary.total_savings, 500.0);
    }

    /// finalPayable equals the sum of the independently rounded components.
    #[test]
    fn test_component_sum_invariant() {
        let items = [
            test_item("1", 99_999, 3, 750, 1800),
            test_item("2", 12_345, 7, 0, 500),
            test_item("3", 100, 1, 2500, 2800),
        ];
        let coupon = flat_coupon(19_999);
        let zone = zone(45_000, 10_000_000);

        let summary = calculate_cart_summary(
            &items,
            Some(CouponInput {
                coupon: &coupon,
                user_usage_count: None,
            }),
            Some(&zone),
            Utc::now(),
        );

        let component_sum = summary.subtotal_after_coupon
            + summary.gst_amount
            + summary.shipping_charge
            + summary.platform_fee;
        assert_eq!(summary.final_payable, component_sum);
    }

    /// Per-line GST: each line's own rate on its own share. A cart mixing
    /// 5% and 28% slabs must not blend them.
    #[test]
    fn test_per_line_gst_rates() {
        let items = [
            test_item("1", 100_000, 1, 0, 500),  // ₹1000 @ 5%
            test_item("2", 100_000, 1, 0, 2800), // ₹1000 @ 28%
        ];

        let summary = calculate_cart_summary(&items, None, None, Utc::now());

        // 50 + 280, not 2 × (1000 × 16.5%)
        assert_eq!(summary.gst_amount, 330.0);
        assert_eq!(summary.items[0].gst_amount, 50.0);
        assert_eq!(summary.items[1].gst_amount, 280.0);
    }

    /// Coupon allocation shares sum exactly: GST is charged on precisely
    /// subtotal − coupon across lines, no paisa gained or lost.
    #[test]
    fn test_coupon_allocation_sums_exactly() {
        let items = [
            test_item("1", 33_333, 1, 0, 1800),
            test_item("2", 66_667, 1, 0, 1800),
            test_item("3", 10_001, 3, 0, 1800),
        ];
        let coupon = flat_coupon(10_000);

        let summary = calculate_cart_summary(
            &items,
            Some(CouponInput {
                coupon: &coupon,
                user_usage_count: None,
            }),
            None,
            Utc::now(),
        );

        // Uniform 18% rate: per-line-on-allocated-shares must equal the
        // blended equivalent to within per-line rounding (3 lines → ≤ 2 paise)
        let uniform = Money::from_rupees(summary.subtotal_after_coupon).apply_bps(1800);
        let diff = (Money::from_rupees(summary.gst_amount) - uniform)
            .abs()
            .paise();
        assert!(diff <= 2, "gst drifted {diff} paise from blended value");
    }

    #[test]
    fn test_invalid_coupon_carries_message_but_prices_cart() {
        let items = [test_item("1", 100_000, 1, 0, 1800)];
        let mut coupon = flat_coupon(10_000);
        coupon.valid_until = Utc::now() - Duration::days(1);

        let summary = calculate_cart_summary(
            &items,
            Some(CouponInput {
                coupon: &coupon,
                user_usage_count: None,
            }),
            None,
            Utc::now(),
        );

        assert_eq!(summary.coupon_discount, 0.0);
        assert!(summary.coupon_code.is_none());
        assert!(summary.coupon_message.is_some());
        assert_eq!(summary.subtotal_after_coupon, summary.item_subtotal);
    }

    #[test]
    fn test_empty_cart_summary_is_zeroes() {
        let summary = calculate_cart_summary(&[], None, Some(&zone(50_000, 500_000)), Utc::now());
        assert_eq!(summary.item_subtotal, 0.0);
        assert_eq!(summary.gst_amount, 0.0);
        // Zero-value order is below any positive threshold
        assert_eq!(summary.shipping_charge, 500.0);
        assert_eq!(summary.final_payable, 500.0);
    }

    #[test]
    fn test_estimate_shipping() {
        let z = zone(50_000, 500_000);

        let below = estimate_shipping(Some(&z), Money::from_paise(499_999));
        assert_eq!(below.charge, 500.0);
        assert!(!below.free_shipping);

        let at = estimate_shipping(Some(&z), Money::from_paise(500_000));
        assert_eq!(at.charge, 0.0);
        assert!(at.free_shipping);

        let fallback = estimate_shipping(None, Money::from_paise(100));
        assert_eq!(
            fallback.charge,
            Money::from_paise(DEFAULT_SHIPPING_CHARGE_PAISE).rupees()
        );
        assert!(fallback.zone_state.is_none());
    }

    #[test]
    fn test_validate_stock_classifications() {
        let items = [
            test_item("1", 100_000, 2, 0, 1800), // fine
            test_item("2", 100_000, 5, 0, 1800), // not enough stock
            test_item("3", 100_000, 1, 0, 1800), // inactive
            test_item("4", 100_000, 1, 0, 1800), // vanished
        ];

        let mut live = HashMap::new();
        live.insert(
            "p-1".to_string(),
            live_product("p-1", 100_000, 10, ProductStatus::Active),
        );
        live.insert(
            "p-2".to_string(),
            live_product("p-2", 100_000, 3, ProductStatus::Active),
        );
        live.insert(
            "p-3".to_string(),
            live_product("p-3", 100_000, 10, ProductStatus::Inactive),
        );

        let report = validate_stock(&items, &live);

        assert!(!report.valid);
        assert_eq!(report.unavailable_count, 3);
        assert!(report.lines[0].available);
        assert_eq!(report.lines[1].issue, Some(StockIssue::InsufficientStock));
        assert_eq!(report.lines[2].issue, Some(StockIssue::ProductInactive));
        assert_eq!(report.lines[3].issue, Some(StockIssue::ProductNotFound));
    }

    #[test]
    fn test_validate_stock_reports_price_drift() {
        let items = [test_item("1", 100_000, 1, 0, 1800)];
        let mut live = HashMap::new();
        live.insert(
            "p-1".to_string(),
            live_product("p-1", 110_000, 10, ProductStatus::Active),
        );

        let report = validate_stock(&items, &live);
        assert!(report.valid);

        let drift = report.lines[0].price_drift.as_ref().unwrap();
        assert_eq!(drift.previous, 1000.0);
        assert_eq!(drift.current, 1100.0);
        assert_eq!(drift.change_percent, 10.0);
    }
}
