//! Coupons
//!
//! A fixed table of coupon codes, each granting a percentage off the cart
//! subtotal. Codes are matched exactly and case-sensitively, after a format
//! check that only admits ASCII letters and digits.

use rust_decimal::Decimal;

/// A coupon rule from the static coupon table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CouponDefinition {
    /// Exact-match code
    pub code: &'static str,

    /// Fraction of the subtotal taken off, in `[0, 1)`
    pub discount_rate: Decimal,

    /// Human-readable summary
    pub description: &'static str,
}

impl CouponDefinition {
    /// Discount granted on the given subtotal, or `None` on overflow.
    pub fn discount_on(&self, subtotal: Decimal) -> Option<Decimal> {
        subtotal.checked_mul(self.discount_rate)
    }
}

static COUPONS: [CouponDefinition; 1] = [CouponDefinition {
    code: "WEB3BRIDGECOHORTx",
    discount_rate: Decimal::from_parts(1, 0, 0, false, 1),
    description: "10% off your entire order",
}];

/// Returns every coupon in the table.
pub fn coupons() -> &'static [CouponDefinition] {
    &COUPONS
}

/// Resolve a coupon code against the coupon table.
///
/// Returns `None` for empty codes, codes containing anything other than
/// `[A-Za-z0-9]`, and codes with no table entry.
pub fn validate(code: &str) -> Option<&'static CouponDefinition> {
    if !is_well_formed(code) {
        return None;
    }

    COUPONS.iter().find(|coupon| coupon.code == code)
}

fn is_well_formed(code: &str) -> bool {
    !code.is_empty() && code.chars().all(|c| c.is_ascii_alphanumeric())
}
