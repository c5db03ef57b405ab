//! Cart
//!
//! Cart state and the mutation rules that keep its line invariants intact:
//! every line stays within `1 ..= stock_quantity`, all amounts share the
//! cart's currency, and adding an already-present product merges into the
//! existing line instead of duplicating it.

use rusty_money::{Money, iso::Currency};
use slotmap::{SlotMap, new_key_type};
use thiserror::Error;

use crate::{
    lines::{LineItem, NewLine, Variant},
    pricing::{self, PricingError},
    products::ProductKey,
};

new_key_type! {
    /// Cart Line Key
    pub struct LineKey;
}

/// Errors related to cart construction or mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CartError {
    /// A line's currency differs from the cart currency.
    #[error("line has currency {found}, but cart has currency {expected}")]
    CurrencyMismatch {
        /// Currency the cart was created with.
        expected: &'static str,

        /// Currency found on the line.
        found: &'static str,
    },

    /// A line was not found in the cart.
    #[error("line not found in cart")]
    LineNotFound(LineKey),

    /// The product has no available stock, so no valid quantity exists.
    #[error("{name} is out of stock")]
    OutOfStock {
        /// Display name of the product.
        name: String,
    },

    /// The line's unit price is zero or negative.
    #[error("{name} has a non-positive unit price")]
    NonPositivePrice {
        /// Display name of the product.
        name: String,
    },
}

/// How a requested quantity was applied to a line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QuantityAdjustment {
    /// The requested quantity was applied as-is.
    Applied,

    /// The request exceeded available stock and was clamped to it. This is a
    /// warning-level signal for the caller, not a failure.
    ClampedToStock,

    /// The request was below one and the line was left unchanged.
    Rejected,
}

/// Outcome of a cart mutation touching a single line.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct LineUpdate {
    /// Key of the line that was created or changed.
    pub key: LineKey,

    /// Quantity now on the line.
    pub quantity: u32,

    /// How the requested quantity was applied.
    pub adjustment: QuantityAdjustment,
}

impl LineUpdate {
    /// Whether the caller's requested quantity was reduced to fit stock.
    #[must_use]
    pub fn was_clamped(&self) -> bool {
        self.adjustment == QuantityAdjustment::ClampedToStock
    }
}

/// Cart
#[derive(Debug)]
pub struct Cart<'a> {
    lines: SlotMap<LineKey, LineItem<'a>>,
    order: Vec<LineKey>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create a new, empty cart in the given currency.
    #[must_use]
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            lines: SlotMap::with_key(),
            order: Vec::new(),
            currency,
        }
    }

    /// Add a product to the cart.
    ///
    /// When a line for the same `(product, variant)` already exists, the
    /// requested quantity is merged into it; otherwise a new line is
    /// appended. Either way the resulting quantity is clamped to the
    /// available stock and the clamping is reported on the returned
    /// [`LineUpdate`]. A requested quantity below one is treated as one.
    ///
    /// # Errors
    ///
    /// - [`CartError::CurrencyMismatch`] when the line prices are not in the
    ///   cart currency.
    /// - [`CartError::NonPositivePrice`] when the unit price is not positive.
    /// - [`CartError::OutOfStock`] when the product has no stock at all.
    pub fn add(&mut self, new: NewLine<'a>) -> Result<LineUpdate, CartError> {
        self.ensure_cart_currency(new.unit_price.currency())?;
        self.ensure_cart_currency(new.list_price.currency())?;

        if new.unit_price.to_minor_units() <= 0 {
            return Err(CartError::NonPositivePrice { name: new.name });
        }

        if new.stock_quantity == 0 {
            return Err(CartError::OutOfStock { name: new.name });
        }

        let requested = new.quantity.max(1);

        if let Some(key) = self.find(new.product, new.variant.as_ref()) {
            let line = self.lines.get_mut(key).ok_or(CartError::LineNotFound(key))?;

            // The incoming stock snapshot is fresher than the stored one.
            line.set_stock_quantity(new.stock_quantity);

            let merged = line.quantity().saturating_add(requested);
            let applied = merged.min(new.stock_quantity);

            line.set_quantity(applied);

            return Ok(LineUpdate {
                key,
                quantity: applied,
                adjustment: if applied < merged {
                    QuantityAdjustment::ClampedToStock
                } else {
                    QuantityAdjustment::Applied
                },
            });
        }

        let applied = requested.min(new.stock_quantity);

        let adjustment = if applied < requested {
            QuantityAdjustment::ClampedToStock
        } else {
            QuantityAdjustment::Applied
        };

        let key = self.lines.insert(LineItem::from_new(new, applied));

        self.order.push(key);

        Ok(LineUpdate {
            key,
            quantity: applied,
            adjustment,
        })
    }

    /// Change the quantity on an existing line.
    ///
    /// A requested quantity below one is rejected without mutating the line
    /// (removal is a distinct operation); a request above the line's stock
    /// ceiling is clamped to it, which makes the operation idempotent at the
    /// ceiling.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] when the line does not exist.
    pub fn update_quantity(
        &mut self,
        key: LineKey,
        quantity: u32,
    ) -> Result<LineUpdate, CartError> {
        let line = self.lines.get_mut(key).ok_or(CartError::LineNotFound(key))?;

        if quantity < 1 {
            return Ok(LineUpdate {
                key,
                quantity: line.quantity(),
                adjustment: QuantityAdjustment::Rejected,
            });
        }

        let applied = quantity.min(line.stock_quantity());

        line.set_quantity(applied);

        Ok(LineUpdate {
            key,
            quantity: applied,
            adjustment: if applied < quantity {
                QuantityAdjustment::ClampedToStock
            } else {
                QuantityAdjustment::Applied
            },
        })
    }

    /// Remove a line from the cart, returning whether it was present.
    /// Removing an absent line is a no-op, not an error.
    pub fn remove(&mut self, key: LineKey) -> bool {
        if self.lines.remove(key).is_some() {
            self.order.retain(|existing| *existing != key);
            true
        } else {
            false
        }
    }

    /// Remove every line from the cart.
    pub fn clear(&mut self) {
        self.lines.clear();
        self.order.clear();
    }

    /// Get a line from the cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::LineNotFound`] when the line does not exist.
    pub fn get(&self, key: LineKey) -> Result<&LineItem<'a>, CartError> {
        self.lines.get(key).ok_or(CartError::LineNotFound(key))
    }

    /// Find the line for a `(product, variant)` pair, if one exists.
    #[must_use]
    pub fn find(&self, product: ProductKey, variant: Option<&Variant>) -> Option<LineKey> {
        self.order
            .iter()
            .copied()
            .find(|key| {
                self.lines
                    .get(*key)
                    .is_some_and(|line| line.matches(product, variant))
            })
    }

    /// Iterate over the cart's lines in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (LineKey, &LineItem<'a>)> {
        self.order
            .iter()
            .filter_map(|key| self.lines.get(*key).map(|line| (*key, line)))
    }

    /// Number of lines in the cart.
    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_quantity(&self) -> u32 {
        self.iter()
            .fold(0_u32, |acc, (_, line)| acc.saturating_add(line.quantity()))
    }

    /// Currency of the cart.
    #[must_use]
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }

    /// Calculate the subtotal of the cart.
    ///
    /// # Errors
    ///
    /// Returns a [`PricingError`] when the sum overflows.
    pub fn subtotal(&self) -> Result<Money<'a, Currency>, PricingError> {
        pricing::subtotal(self)
    }

    fn ensure_cart_currency(&self, found: &Currency) -> Result<(), CartError> {
        if found == self.currency {
            Ok(())
        } else {
            Err(CartError::CurrencyMismatch {
                expected: self.currency.iso_alpha_code,
                found: found.iso_alpha_code,
            })
        }
    }
}
