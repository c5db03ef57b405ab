//! Pricing
//!
//! Pure pricing arithmetic over carts: line totals, subtotals, shipping,
//! optional VAT and grand totals. All calculations work on minor units and
//! are total functions over valid inputs; overflow and currency mismatches
//! are the only error cases.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{
    Money,
    iso::{Currency, XOF},
};
use thiserror::Error;

use crate::{cart::Cart, lines::LineItem};

/// Errors specific to pricing calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PricingError {
    /// Amount arithmetic overflowed the minor-unit range.
    #[error("amount arithmetic overflowed")]
    AmountOverflow,

    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// An amount was expressed in a different currency than expected.
    #[error("expected amounts in {expected}, found {found}")]
    CurrencyMismatch {
        /// Currency the calculation runs in.
        expected: &'static str,

        /// Currency that was actually supplied.
        found: &'static str,
    },
}

/// Shipping and tax configuration applied when summarising a cart.
///
/// The free-shipping boundary is inclusive: a subtotal exactly at the
/// threshold ships free.
#[derive(Debug, Clone)]
pub struct PricingPolicy<'a> {
    free_shipping_threshold: Money<'a, Currency>,
    shipping_flat_fee: Money<'a, Currency>,
    vat: Option<Percentage>,
}

impl<'a> PricingPolicy<'a> {
    /// Create a new pricing policy.
    ///
    /// # Errors
    ///
    /// Returns [`PricingError::CurrencyMismatch`] when the threshold and flat
    /// fee are not in the same currency.
    pub fn new(
        free_shipping_threshold: Money<'a, Currency>,
        shipping_flat_fee: Money<'a, Currency>,
        vat: Option<Percentage>,
    ) -> Result<Self, PricingError> {
        ensure_currency(
            free_shipping_threshold.currency(),
            shipping_flat_fee.currency(),
        )?;

        Ok(Self {
            free_shipping_threshold,
            shipping_flat_fee,
            vat,
        })
    }

    /// Subtotal at or above which shipping is waived.
    #[must_use]
    pub fn free_shipping_threshold(&self) -> &Money<'a, Currency> {
        &self.free_shipping_threshold
    }

    /// Flat fee charged below the free-shipping threshold.
    #[must_use]
    pub fn shipping_flat_fee(&self) -> &Money<'a, Currency> {
        &self.shipping_flat_fee
    }

    /// VAT rate applied to the subtotal, when configured.
    #[must_use]
    pub fn vat(&self) -> Option<&Percentage> {
        self.vat.as_ref()
    }

    /// Currency the policy amounts are expressed in.
    #[must_use]
    pub fn currency(&self) -> &'a Currency {
        self.free_shipping_threshold.currency()
    }
}

impl Default for PricingPolicy<'static> {
    /// Free shipping from 50 000 XOF, a 2 000 XOF flat fee below it, no VAT.
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_minor(50_000, XOF),
            shipping_flat_fee: Money::from_minor(2_000, XOF),
            vat: None,
        }
    }
}

/// Calculate the discount amount in minor units based on a percentage and a
/// minor unit amount.
///
/// # Errors
///
/// Returns [`PricingError::PercentConversion`] when the calculation overflows
/// or cannot be safely represented.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, PricingError> {
    let minor = Decimal::from_i64(minor).ok_or(PricingError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(PricingError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(PricingError::PercentConversion)
}

/// Calculate the total for a single line: unit price times quantity.
///
/// # Errors
///
/// Returns [`PricingError::AmountOverflow`] when the multiplication overflows.
pub fn line_total<'a>(line: &LineItem<'a>) -> Result<Money<'a, Currency>, PricingError> {
    let total = line
        .unit_price()
        .to_minor_units()
        .checked_mul(i64::from(line.quantity()))
        .ok_or(PricingError::AmountOverflow)?;

    Ok(Money::from_minor(total, line.unit_price().currency()))
}

/// Calculate the subtotal of a cart: the sum of its line totals.
///
/// An empty cart has a zero subtotal.
///
/// # Errors
///
/// Returns [`PricingError::AmountOverflow`] when the sum overflows.
pub fn subtotal<'a>(cart: &Cart<'a>) -> Result<Money<'a, Currency>, PricingError> {
    let minor = cart.iter().try_fold(0_i64, |acc, (_, line)| {
        acc.checked_add(line_total(line)?.to_minor_units())
            .ok_or(PricingError::AmountOverflow)
    })?;

    Ok(Money::from_minor(minor, cart.currency()))
}

/// Calculate the shipping cost for a subtotal under the given policy: zero at
/// or above the free-shipping threshold, the flat fee below it.
///
/// # Errors
///
/// Returns [`PricingError::CurrencyMismatch`] when the subtotal is not in the
/// policy's currency.
pub fn shipping_cost<'a>(
    subtotal: &Money<'a, Currency>,
    policy: &PricingPolicy<'a>,
) -> Result<Money<'a, Currency>, PricingError> {
    ensure_currency(policy.currency(), subtotal.currency())?;

    if subtotal.to_minor_units() >= policy.free_shipping_threshold().to_minor_units() {
        Ok(Money::from_minor(0, subtotal.currency()))
    } else {
        Ok(*policy.shipping_flat_fee())
    }
}

/// Calculate the VAT charged on a subtotal, zero when the policy has no VAT
/// configured.
///
/// # Errors
///
/// Returns an error when the subtotal is not in the policy's currency or the
/// percentage calculation overflows.
pub fn vat_amount<'a>(
    subtotal: &Money<'a, Currency>,
    policy: &PricingPolicy<'a>,
) -> Result<Money<'a, Currency>, PricingError> {
    ensure_currency(policy.currency(), subtotal.currency())?;

    let minor = match policy.vat() {
        Some(rate) => percent_of_minor(rate, subtotal.to_minor_units())?,
        None => 0,
    };

    Ok(Money::from_minor(minor, subtotal.currency()))
}

/// Calculate the grand total: `subtotal + shipping + tax - discount`, floored
/// at zero so an oversized discount can never produce a negative total.
///
/// # Errors
///
/// Returns an error when the amounts are not all in one currency or the
/// arithmetic overflows.
pub fn grand_total<'a>(
    subtotal: &Money<'a, Currency>,
    shipping: &Money<'a, Currency>,
    tax: &Money<'a, Currency>,
    discount: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, PricingError> {
    let currency = subtotal.currency();

    ensure_currency(currency, shipping.currency())?;
    ensure_currency(currency, tax.currency())?;
    ensure_currency(currency, discount.currency())?;

    let charged = subtotal
        .to_minor_units()
        .checked_add(shipping.to_minor_units())
        .and_then(|value| value.checked_add(tax.to_minor_units()))
        .and_then(|value| value.checked_sub(discount.to_minor_units()))
        .ok_or(PricingError::AmountOverflow)?;

    Ok(Money::from_minor(0.max(charged), currency))
}

/// Calculate how much more must be spent to reach free shipping, or `None`
/// once the threshold is met.
///
/// # Errors
///
/// Returns [`PricingError::CurrencyMismatch`] when the subtotal is not in the
/// policy's currency.
pub fn remaining_for_free_shipping<'a>(
    subtotal: &Money<'a, Currency>,
    policy: &PricingPolicy<'a>,
) -> Result<Option<Money<'a, Currency>>, PricingError> {
    ensure_currency(policy.currency(), subtotal.currency())?;

    let remaining = policy.free_shipping_threshold().to_minor_units() - subtotal.to_minor_units();

    if remaining > 0 {
        Ok(Some(Money::from_minor(remaining, subtotal.currency())))
    } else {
        Ok(None)
    }
}

pub(crate) fn ensure_currency(
    expected: &Currency,
    found: &Currency,
) -> Result<(), PricingError> {
    if expected == found {
        Ok(())
    } else {
        Err(PricingError::CurrencyMismatch {
            expected: expected.iso_alpha_code,
            found: found.iso_alpha_code,
        })
    }
}
