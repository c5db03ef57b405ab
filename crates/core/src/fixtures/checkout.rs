//! Checkout Catalog Fixtures

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    checkout::{
        delivery::{DeliveryCatalog, DeliveryOption, DeliveryOptionId},
        payment::{PaymentCatalog, PaymentMethod, PaymentMethodId},
    },
    fixtures::{FixtureError, products::parse_price},
};

/// Delivery and payment catalogs in YAML
#[derive(Debug, Deserialize)]
pub struct CheckoutFixture {
    /// Delivery options offered at checkout
    pub delivery: Vec<DeliveryOptionFixture>,

    /// Payment methods offered at checkout
    pub payment: Vec<PaymentMethodFixture>,
}

impl CheckoutFixture {
    /// Parse a checkout fixture from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML does not parse.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(yaml)?)
    }

    /// Build the delivery and payment catalogs from the fixture.
    ///
    /// # Errors
    ///
    /// Returns an error when a delivery price does not parse.
    pub fn into_catalogs(self) -> Result<(DeliveryCatalog<'static>, PaymentCatalog), FixtureError> {
        let options = self
            .delivery
            .into_iter()
            .map(DeliveryOption::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        let methods = self.payment.into_iter().map(PaymentMethod::from).collect();

        Ok((DeliveryCatalog::new(options), PaymentCatalog::new(methods)))
    }
}

/// Delivery Option Fixture
#[derive(Debug, Deserialize)]
pub struct DeliveryOptionFixture {
    /// Catalog identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Price (e.g., "2000 XOF")
    pub price: String,

    /// Duration estimate
    pub estimated_days: String,

    /// Longer description
    pub description: String,
}

impl TryFrom<DeliveryOptionFixture> for DeliveryOption<'_> {
    type Error = FixtureError;

    fn try_from(fixture: DeliveryOptionFixture) -> Result<Self, Self::Error> {
        let (minor, currency) = parse_price(&fixture.price)?;

        Ok(DeliveryOption {
            id: DeliveryOptionId::new(fixture.id),
            name: fixture.name,
            price: Money::from_minor(minor, currency),
            estimated_days: fixture.estimated_days,
            description: fixture.description,
        })
    }
}

/// Payment Method Fixture
#[derive(Debug, Deserialize)]
pub struct PaymentMethodFixture {
    /// Catalog identifier
    pub id: String,

    /// Display name
    pub name: String,

    /// Descriptor shown under the name
    pub description: String,
}

impl From<PaymentMethodFixture> for PaymentMethod {
    fn from(fixture: PaymentMethodFixture) -> Self {
        PaymentMethod {
            id: PaymentMethodId::new(fixture.id),
            name: fixture.name,
            description: fixture.description,
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::XOF;
    use testresult::TestResult;

    use super::*;

    const DEMO_YAML: &str = r#"
delivery:
  - id: standard
    name: "Standard delivery"
    price: "2000 XOF"
    estimated_days: "3-5 working days"
    description: "Home or pickup-point delivery"
  - id: express
    name: "Express delivery"
    price: "5000 XOF"
    estimated_days: "1-2 working days"
    description: "Priority delivery"
payment:
  - id: card
    name: "Bank card"
    description: "Visa, Mastercard, American Express"
  - id: mobile-money
    name: "Mobile Money"
    description: "Moov Money, MTN Mobile Money"
"#;

    #[test]
    fn checkout_fixture_builds_both_catalogs() -> TestResult {
        let fixture = CheckoutFixture::from_yaml(DEMO_YAML)?;
        let (delivery, payment) = fixture.into_catalogs()?;

        assert_eq!(delivery.len(), 2);
        assert_eq!(payment.len(), 2);

        let express = delivery.get("express");

        assert!(express.is_some_and(|option| option.price == Money::from_minor(5_000, XOF)));
        assert!(payment.get("mobile-money").is_some());

        Ok(())
    }

    #[test]
    fn checkout_fixture_rejects_bad_delivery_price() -> TestResult {
        let yaml = r#"
delivery:
  - id: standard
    name: "Standard delivery"
    price: "free"
    estimated_days: "3-5 working days"
    description: "Home or pickup-point delivery"
payment: []
"#;

        let fixture = CheckoutFixture::from_yaml(yaml)?;
        let result = fixture.into_catalogs();

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));

        Ok(())
    }
}
