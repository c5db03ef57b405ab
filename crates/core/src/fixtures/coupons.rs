//! Coupon Fixtures

use rustc_hash::FxHashMap;
use rusty_money::Money;
use serde::Deserialize;

use crate::{
    coupons::{Coupon, CouponBook, CouponCode, DiscountRule},
    fixtures::{
        FixtureError,
        products::{parse_percentage, parse_price},
    },
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Map of coupon code -> coupon fixture
    pub coupons: FxHashMap<String, CouponFixture>,
}

impl CouponsFixture {
    /// Parse a coupons fixture from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML does not parse.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(yaml)?)
    }
}

/// Coupon Fixture
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Discount rule: a percentage ("10%") or a flat amount ("1500 XOF")
    pub discount: String,
}

/// Parse a discount string into a rule: `"10%"` (or a bare decimal) becomes a
/// percentage off, `"1500 XOF"` becomes a flat amount off.
///
/// # Errors
///
/// Returns an error when the string matches neither format.
pub fn parse_discount(s: &str) -> Result<DiscountRule<'static>, FixtureError> {
    let trimmed = s.trim();

    if trimmed.ends_with('%') {
        return Ok(DiscountRule::PercentageOff(parse_percentage(trimmed)?));
    }

    if trimmed.split_whitespace().count() == 2 {
        let (minor, currency) = parse_price(trimmed)?;

        return Ok(DiscountRule::AmountOff(Money::from_minor(minor, currency)));
    }

    parse_percentage(trimmed)
        .map(DiscountRule::PercentageOff)
        .map_err(|_err| FixtureError::InvalidDiscount(s.to_string()))
}

impl TryFrom<CouponsFixture> for CouponBook<'static> {
    type Error = FixtureError;

    fn try_from(fixture: CouponsFixture) -> Result<Self, Self::Error> {
        let mut book = CouponBook::new();

        for (code, coupon) in fixture.coupons {
            let rule = parse_discount(&coupon.discount)?;

            book.insert(Coupon::new(CouponCode::new(&code), rule));
        }

        Ok(book)
    }
}
