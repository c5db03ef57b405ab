//! Coupons
//!
//! Coupon codes and the discount rules they resolve to. Codes are
//! case-insensitive; an unknown code simply resolves to no coupon, which the
//! caller turns into a zero discount.

use std::fmt;

use decimal_percentage::Percentage;
use rustc_hash::FxHashMap;
use rusty_money::{Money, iso::Currency};

use crate::pricing::{PricingError, ensure_currency, percent_of_minor};

/// A normalised, case-insensitive coupon code.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CouponCode(String);

impl CouponCode {
    /// Normalise a raw user-entered code: surrounding whitespace is trimmed
    /// and the code is upper-cased.
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_uppercase())
    }

    /// The normalised code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CouponCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a coupon reduces the subtotal.
#[derive(Debug, Copy, Clone)]
pub enum DiscountRule<'a> {
    /// Take a percentage off the subtotal (e.g. "10% off").
    PercentageOff(Percentage),

    /// Take a fixed amount off the subtotal (e.g. "1 500 XOF off").
    AmountOff(Money<'a, Currency>),
}

/// A coupon: a code plus the discount rule it stands for.
#[derive(Debug, Clone)]
pub struct Coupon<'a> {
    code: CouponCode,
    rule: DiscountRule<'a>,
}

impl<'a> Coupon<'a> {
    /// Create a new coupon.
    #[must_use]
    pub fn new(code: CouponCode, rule: DiscountRule<'a>) -> Self {
        Self { code, rule }
    }

    /// Return the coupon code.
    #[must_use]
    pub fn code(&self) -> &CouponCode {
        &self.code
    }

    /// Return the discount rule.
    #[must_use]
    pub fn rule(&self) -> &DiscountRule<'a> {
        &self.rule
    }

    /// Resolve the discount this coupon grants against a subtotal.
    ///
    /// The result is clamped to `0 ..= subtotal`, so a discount can never
    /// exceed what is actually being charged.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] when a percentage calculation overflows or
    /// an amount-off rule is in a different currency than the subtotal.
    pub fn discount_for(
        &self,
        subtotal: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, PricingError> {
        let subtotal_minor = subtotal.to_minor_units();

        let raw = match &self.rule {
            DiscountRule::PercentageOff(percent) => percent_of_minor(percent, subtotal_minor)?,
            DiscountRule::AmountOff(amount) => {
                ensure_currency(subtotal.currency(), amount.currency())?;

                amount.to_minor_units()
            }
        };

        Ok(Money::from_minor(
            raw.clamp(0, subtotal_minor),
            subtotal.currency(),
        ))
    }
}

/// The set of coupons a store currently honours, keyed by normalised code.
#[derive(Debug, Clone, Default)]
pub struct CouponBook<'a> {
    coupons: FxHashMap<String, Coupon<'a>>,
}

impl<'a> CouponBook<'a> {
    /// Create an empty coupon book.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a coupon, returning the one it replaced when the code was already
    /// present.
    pub fn insert(&mut self, coupon: Coupon<'a>) -> Option<Coupon<'a>> {
        self.coupons
            .insert(coupon.code().as_str().to_string(), coupon)
    }

    /// Look up a coupon by raw user input. Unknown codes yield `None` rather
    /// than an error.
    #[must_use]
    pub fn resolve(&self, raw_code: &str) -> Option<&Coupon<'a>> {
        self.coupons.get(CouponCode::new(raw_code).as_str())
    }

    /// Number of coupons in the book.
    #[must_use]
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Whether the book has no coupons.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{USD, XOF};
    use testresult::TestResult;

    use super::*;

    fn promo10() -> Coupon<'static> {
        Coupon::new(
            CouponCode::new("PROMO10"),
            DiscountRule::PercentageOff(Percentage::from(0.10)),
        )
    }

    #[test]
    fn code_normalises_case_and_whitespace() {
        let code = CouponCode::new("  promo10 ");

        assert_eq!(code.as_str(), "PROMO10");
        assert_eq!(code.to_string(), "PROMO10");
    }

    #[test]
    fn percentage_discount_resolves_against_subtotal() -> TestResult {
        let discount = promo10().discount_for(&Money::from_minor(590_000, XOF))?;

        assert_eq!(discount, Money::from_minor(59_000, XOF));

        Ok(())
    }

    #[test]
    fn amount_off_discount_is_clamped_to_subtotal() -> TestResult {
        let coupon = Coupon::new(
            CouponCode::new("WELCOME5000"),
            DiscountRule::AmountOff(Money::from_minor(5_000, XOF)),
        );

        let small_cart = coupon.discount_for(&Money::from_minor(2_000, XOF))?;
        let large_cart = coupon.discount_for(&Money::from_minor(80_000, XOF))?;

        assert_eq!(small_cart, Money::from_minor(2_000, XOF));
        assert_eq!(large_cart, Money::from_minor(5_000, XOF));

        Ok(())
    }

    #[test]
    fn oversized_percentage_never_exceeds_subtotal() -> TestResult {
        let coupon = Coupon::new(
            CouponCode::new("EVERYTHING"),
            DiscountRule::PercentageOff(Percentage::from(2.0)),
        );

        let discount = coupon.discount_for(&Money::from_minor(10_000, XOF))?;

        assert_eq!(discount, Money::from_minor(10_000, XOF));

        Ok(())
    }

    #[test]
    fn amount_off_rejects_foreign_currency() {
        let coupon = Coupon::new(
            CouponCode::new("USD5"),
            DiscountRule::AmountOff(Money::from_minor(500, USD)),
        );

        let result = coupon.discount_for(&Money::from_minor(10_000, XOF));

        assert!(matches!(
            result,
            Err(PricingError::CurrencyMismatch { .. })
        ));
    }

    #[test]
    fn book_resolves_codes_case_insensitively() {
        let mut book = CouponBook::new();
        book.insert(promo10());

        assert!(book.resolve("promo10").is_some());
        assert!(book.resolve(" PROMO10 ").is_some());
        assert!(book.resolve("PROMO20").is_none());
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn insert_replaces_existing_code() {
        let mut book = CouponBook::new();

        book.insert(promo10());

        let replaced = book.insert(Coupon::new(
            CouponCode::new("promo10"),
            DiscountRule::PercentageOff(Percentage::from(0.20)),
        ));

        assert!(replaced.is_some());
        assert_eq!(book.len(), 1);
    }
}
