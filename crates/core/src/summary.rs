//! Cart Summary
//!
//! Derived pricing totals for a cart. A summary is recomputed from its inputs
//! on every mutation and never persisted independently of them.

use rusty_money::{Money, iso::Currency};
use tabled::{
    builder::Builder,
    settings::{Alignment, Style, object::Columns},
};

use crate::{
    cart::Cart,
    coupons::{Coupon, CouponCode},
    pricing::{self, PricingError, PricingPolicy},
};

/// Priced totals for a cart under a pricing policy and an optional coupon.
#[derive(Debug, Clone)]
pub struct CartSummary<'a> {
    total_items: u32,
    subtotal: Money<'a, Currency>,
    shipping: Money<'a, Currency>,
    tax: Money<'a, Currency>,
    discount: Money<'a, Currency>,
    total: Money<'a, Currency>,
    coupon: Option<CouponCode>,
}

impl<'a> CartSummary<'a> {
    /// Price a cart: subtotal, shipping, VAT, coupon discount and grand
    /// total, in that order.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] when amounts disagree on currency or the
    /// arithmetic overflows.
    pub fn price(
        cart: &Cart<'a>,
        coupon: Option<&Coupon<'a>>,
        policy: &PricingPolicy<'a>,
    ) -> Result<Self, PricingError> {
        let subtotal = pricing::subtotal(cart)?;
        let shipping = pricing::shipping_cost(&subtotal, policy)?;
        let tax = pricing::vat_amount(&subtotal, policy)?;

        let discount = match coupon {
            Some(coupon) => coupon.discount_for(&subtotal)?,
            None => Money::from_minor(0, cart.currency()),
        };

        let total = pricing::grand_total(&subtotal, &shipping, &tax, &discount)?;

        Ok(Self {
            total_items: cart.total_quantity(),
            subtotal,
            shipping,
            tax,
            discount,
            total,
            coupon: coupon.map(|coupon| coupon.code().clone()),
        })
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_items(&self) -> u32 {
        self.total_items
    }

    /// Sum of line totals before shipping and discount.
    #[must_use]
    pub fn subtotal(&self) -> &Money<'a, Currency> {
        &self.subtotal
    }

    /// Shipping charged for this cart.
    #[must_use]
    pub fn shipping(&self) -> &Money<'a, Currency> {
        &self.shipping
    }

    /// VAT charged on the subtotal (zero unless the policy configures a rate).
    #[must_use]
    pub fn tax(&self) -> &Money<'a, Currency> {
        &self.tax
    }

    /// Discount granted by the applied coupon.
    #[must_use]
    pub fn discount(&self) -> &Money<'a, Currency> {
        &self.discount
    }

    /// Amount actually charged.
    #[must_use]
    pub fn total(&self) -> &Money<'a, Currency> {
        &self.total
    }

    /// Code of the coupon that produced the discount, if one applied.
    #[must_use]
    pub fn coupon(&self) -> Option<&CouponCode> {
        self.coupon.as_ref()
    }

    /// Whether shipping was waived.
    #[must_use]
    pub fn free_shipping_applied(&self) -> bool {
        self.shipping.to_minor_units() == 0
    }

    /// Render the cart and its totals as a text table.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] when a line total overflows.
    pub fn render_table(&self, cart: &Cart<'a>) -> Result<String, PricingError> {
        let mut builder = Builder::default();

        builder.push_record(["Item", "Variant", "Qty", "Unit", "Total"]);

        for (_, line) in cart.iter() {
            let unit = if line.is_marked_down() {
                format!("{} (was {})", line.unit_price(), line.list_price())
            } else {
                format!("{}", line.unit_price())
            };

            builder.push_record([
                line.name().to_string(),
                line.variant().map(ToString::to_string).unwrap_or_default(),
                line.quantity().to_string(),
                unit,
                format!("{}", pricing::line_total(line)?),
            ]);
        }

        let empty = String::new;

        builder.push_record([
            "Subtotal".to_string(),
            empty(),
            empty(),
            empty(),
            format!("{}", self.subtotal),
        ]);

        let shipping = if self.free_shipping_applied() {
            "Free".to_string()
        } else {
            format!("{}", self.shipping)
        };

        builder.push_record(["Shipping".to_string(), empty(), empty(), empty(), shipping]);

        if self.tax.to_minor_units() > 0 {
            builder.push_record([
                "VAT".to_string(),
                empty(),
                empty(),
                empty(),
                format!("{}", self.tax),
            ]);
        }

        if let Some(code) = &self.coupon {
            builder.push_record([
                format!("Discount ({code})"),
                empty(),
                empty(),
                empty(),
                format!("-{}", self.discount),
            ]);
        }

        builder.push_record([
            "Total".to_string(),
            empty(),
            empty(),
            empty(),
            format!("{}", self.total),
        ]);

        let mut table = builder.build();

        table.with(Style::modern_rounded());
        table.modify(Columns::new(2..5), Alignment::right());

        Ok(table.to_string())
    }
}
