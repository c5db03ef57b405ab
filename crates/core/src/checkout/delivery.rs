//! Delivery Options

use std::fmt;

use rusty_money::{Money, iso::Currency};

/// Identifier of a delivery option within the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct DeliveryOptionId(String);

impl DeliveryOptionId {
    /// Create an id from its textual form.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DeliveryOptionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One way of getting an order to the shopper.
#[derive(Clone, Debug)]
pub struct DeliveryOption<'a> {
    /// Catalog identifier.
    pub id: DeliveryOptionId,

    /// Display name.
    pub name: String,

    /// Price charged for this option.
    pub price: Money<'a, Currency>,

    /// Human-readable duration estimate (e.g. "3-5 working days").
    pub estimated_days: String,

    /// Longer description shown under the name.
    pub description: String,
}

/// The fixed set of delivery options a shopper chooses from.
#[derive(Clone, Debug, Default)]
pub struct DeliveryCatalog<'a> {
    options: Vec<DeliveryOption<'a>>,
}

impl<'a> DeliveryCatalog<'a> {
    /// Create a catalog from a list of options.
    #[must_use]
    pub fn new(options: Vec<DeliveryOption<'a>>) -> Self {
        Self { options }
    }

    /// Look up an option by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&DeliveryOption<'a>> {
        self.options.iter().find(|option| option.id.as_str() == id)
    }

    /// Iterate over the options in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &DeliveryOption<'a>> {
        self.options.iter()
    }

    /// Number of options in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.options.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}

impl DeliveryCatalog<'static> {
    /// The store's stock catalog: standard, express and free delivery, priced
    /// in XOF.
    #[must_use]
    pub fn defaults() -> Self {
        use rusty_money::iso::XOF;

        Self::new(vec![
            DeliveryOption {
                id: DeliveryOptionId::new("standard"),
                name: "Standard delivery".to_string(),
                price: Money::from_minor(2_000, XOF),
                estimated_days: "3-5 working days".to_string(),
                description: "Home or pickup-point delivery".to_string(),
            },
            DeliveryOption {
                id: DeliveryOptionId::new("express"),
                name: "Express delivery".to_string(),
                price: Money::from_minor(5_000, XOF),
                estimated_days: "1-2 working days".to_string(),
                description: "Priority delivery".to_string(),
            },
            DeliveryOption {
                id: DeliveryOptionId::new("free"),
                name: "Free delivery".to_string(),
                price: Money::from_minor(0, XOF),
                estimated_days: "5-7 working days".to_string(),
                description: "Free for qualifying orders".to_string(),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::XOF;

    use super::*;

    #[test]
    fn defaults_contain_the_three_store_options() {
        let catalog = DeliveryCatalog::defaults();

        assert_eq!(catalog.len(), 3);

        let ids: Vec<&str> = catalog.iter().map(|option| option.id.as_str()).collect();

        assert_eq!(ids, ["standard", "express", "free"]);
    }

    #[test]
    fn get_finds_option_by_id() {
        let catalog = DeliveryCatalog::defaults();

        let express = catalog.get("express");

        assert!(express.is_some_and(|option| option.price == Money::from_minor(5_000, XOF)));
        assert!(catalog.get("overnight").is_none());
    }

    #[test]
    fn free_option_costs_nothing() {
        let catalog = DeliveryCatalog::defaults();

        let free = catalog.get("free");

        assert!(free.is_some_and(|option| option.price == Money::from_minor(0, XOF)));
    }
}
