//! Payment Methods

use std::fmt;

/// Identifier of a payment method within the catalog.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PaymentMethodId(String);

impl PaymentMethodId {
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

impl fmt::Display for PaymentMethodId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One way of paying for an order.
#[derive(Clone, Debug)]
pub struct PaymentMethod {
    /// Catalog identifier.
    pub id: PaymentMethodId,

    /// Display name.
    pub name: String,

    /// Descriptor shown under the name (e.g. accepted card networks).
    pub description: String,
}

/// The fixed set of payment methods a shopper chooses from.
#[derive(Clone, Debug, Default)]
pub struct PaymentCatalog {
    methods: Vec<PaymentMethod>,
}

impl PaymentCatalog {
    /// Create a catalog from a list of methods.
    #[must_use]
    pub fn new(methods: Vec<PaymentMethod>) -> Self {
        Self { methods }
    }

    /// Look up a method by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&PaymentMethod> {
        self.methods.iter().find(|method| method.id.as_str() == id)
    }

    /// Iterate over the methods in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &PaymentMethod> {
        self.methods.iter()
    }

    /// Number of methods in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.methods.len()
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.methods.is_empty()
    }

    /// The store's stock catalog: card, mobile money and cash on delivery.
    #[must_use]
    pub fn defaults() -> Self {
        Self::new(vec![
            PaymentMethod {
                id: PaymentMethodId::new("card"),
                name: "Bank card".to_string(),
                description: "Visa, Mastercard, American Express".to_string(),
            },
            PaymentMethod {
                id: PaymentMethodId::new("mobile-money"),
                name: "Mobile Money".to_string(),
                description: "Moov Money, MTN Mobile Money".to_string(),
            },
            PaymentMethod {
                id: PaymentMethodId::new("cash-on-delivery"),
                name: "Cash on delivery".to_string(),
                description: "Pay in cash when the order arrives".to_string(),
            },
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_contain_the_three_store_methods() {
        let catalog = PaymentCatalog::defaults();

        assert_eq!(catalog.len(), 3);

        let ids: Vec<&str> = catalog.iter().map(|method| method.id.as_str()).collect();

        assert_eq!(ids, ["card", "mobile-money", "cash-on-delivery"]);
    }

    #[test]
    fn get_finds_method_by_id() {
        let catalog = PaymentCatalog::defaults();

        assert!(catalog.get("mobile-money").is_some());
        assert!(catalog.get("cheque").is_none());
    }
}
