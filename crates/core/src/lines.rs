//! Line Items

use std::fmt;

use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::products::{Product, ProductKey};

/// A size/colour selection attached to a cart line.
///
/// Variants never affect pricing, but two lines for the same product with
/// different variants are distinct lines.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Variant {
    /// Selected size (e.g. "128GB")
    pub size: Option<String>,

    /// Selected colour (e.g. "Noir")
    pub color: Option<String>,
}

impl Variant {
    /// Whether no selection was made at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size.is_none() && self.color.is_none()
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.size, &self.color) {
            (Some(size), Some(color)) => write!(f, "{size} / {color}"),
            (Some(size), None) => write!(f, "{size}"),
            (None, Some(color)) => write!(f, "{color}"),
            (None, None) => Ok(()),
        }
    }
}

/// A single cart row: one product (plus variant) and its quantity.
///
/// Prices are captured when the line is created and are not re-read from the
/// catalog afterwards; `list_price` is retained so strikethrough pricing can
/// be shown when the captured unit price was a sale price.
#[derive(Clone, Debug, PartialEq)]
pub struct LineItem<'a> {
    product: ProductKey,
    name: String,
    variant: Option<Variant>,
    unit_price: Money<'a, Currency>,
    list_price: Money<'a, Currency>,
    quantity: u32,
    stock_quantity: u32,
}

impl<'a> LineItem<'a> {
    pub(crate) fn from_new(new: NewLine<'a>, quantity: u32) -> Self {
        Self {
            product: new.product,
            name: new.name,
            variant: new.variant,
            unit_price: new.unit_price,
            list_price: new.list_price,
            quantity,
            stock_quantity: new.stock_quantity,
        }
    }

    /// Returns the product this line references.
    #[must_use]
    pub fn product(&self) -> ProductKey {
        self.product
    }

    /// Returns the display name captured when the line was created.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the variant selection, if any.
    #[must_use]
    pub fn variant(&self) -> Option<&Variant> {
        self.variant.as_ref()
    }

    /// Returns the effective price per unit.
    #[must_use]
    pub fn unit_price(&self) -> &Money<'a, Currency> {
        &self.unit_price
    }

    /// Returns the list price per unit.
    #[must_use]
    pub fn list_price(&self) -> &Money<'a, Currency> {
        &self.list_price
    }

    /// Returns the quantity on the line.
    #[must_use]
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the stock ceiling captured for this line.
    #[must_use]
    pub fn stock_quantity(&self) -> u32 {
        self.stock_quantity
    }

    /// Whether the unit price is below the list price (strikethrough pricing).
    #[must_use]
    pub fn is_marked_down(&self) -> bool {
        self.unit_price.to_minor_units() < self.list_price.to_minor_units()
    }

    /// Whether this line is for the given product and variant selection.
    #[must_use]
    pub fn matches(&self, product: ProductKey, variant: Option<&Variant>) -> bool {
        self.product == product && self.variant.as_ref() == variant
    }

    pub(crate) fn set_quantity(&mut self, quantity: u32) {
        self.quantity = quantity;
    }

    pub(crate) fn set_stock_quantity(&mut self, stock_quantity: u32) {
        self.stock_quantity = stock_quantity;
    }
}

/// Inputs for adding a product to a cart.
#[derive(Clone, Debug)]
pub struct NewLine<'a> {
    /// Product being added
    pub product: ProductKey,

    /// Display name captured at add time
    pub name: String,

    /// Variant selection, if any
    pub variant: Option<Variant>,

    /// Requested quantity
    pub quantity: u32,

    /// Effective price per unit at add time
    pub unit_price: Money<'a, Currency>,

    /// List price per unit at add time
    pub list_price: Money<'a, Currency>,

    /// Units available at add time
    pub stock_quantity: u32,
}

impl<'a> NewLine<'a> {
    /// Build a new line from a catalog product, capturing its effective and
    /// list prices and stock.
    #[must_use]
    pub fn for_product(product: ProductKey, meta: &Product<'a>, quantity: u32) -> Self {
        Self {
            product,
            name: meta.name.clone(),
            variant: None,
            quantity,
            unit_price: *meta.effective_price(),
            list_price: meta.price,
            stock_quantity: meta.stock_quantity,
        }
    }

    /// Attach a variant selection to the line.
    #[must_use]
    pub fn with_variant(mut self, variant: Variant) -> Self {
        self.variant = Some(variant);
        self
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::XOF;

    use super::*;

    fn phone() -> Product<'static> {
        Product {
            name: "Smartphone Samsung Galaxy S23".to_string(),
            price: Money::from_minor(450_000, XOF),
            sale_price: Some(Money::from_minor(420_000, XOF)),
            stock_quantity: 10,
            active: true,
        }
    }

    #[test]
    fn for_product_captures_effective_and_list_prices() {
        let product = phone();
        let new = NewLine::for_product(ProductKey::default(), &product, 1);

        assert_eq!(new.unit_price, Money::from_minor(420_000, XOF));
        assert_eq!(new.list_price, Money::from_minor(450_000, XOF));
        assert_eq!(new.stock_quantity, 10);
    }

    #[test]
    fn line_is_marked_down_when_unit_below_list() {
        let new = NewLine::for_product(ProductKey::default(), &phone(), 1);
        let line = LineItem::from_new(new, 1);

        assert!(line.is_marked_down());
    }

    #[test]
    fn matches_compares_product_and_variant() {
        let variant = Variant {
            size: Some("128GB".to_string()),
            color: Some("Noir".to_string()),
        };

        let new = NewLine::for_product(ProductKey::default(), &phone(), 1)
            .with_variant(variant.clone());
        let line = LineItem::from_new(new, 1);

        assert!(line.matches(ProductKey::default(), Some(&variant)));
        assert!(!line.matches(ProductKey::default(), None));
    }

    #[test]
    fn variant_display_joins_size_and_color() {
        let variant = Variant {
            size: Some("128GB".to_string()),
            color: Some("Noir".to_string()),
        };

        assert_eq!(variant.to_string(), "128GB / Noir");

        let size_only = Variant {
            size: Some("128GB".to_string()),
            color: None,
        };

        assert_eq!(size_only.to_string(), "128GB");
        assert!(Variant::default().is_empty());
    }
}
