//! Pricing Policy Fixtures

use rusty_money::Money;
use serde::Deserialize;

use crate::{
    fixtures::{
        FixtureError,
        products::{parse_percentage, parse_price},
    },
    pricing::PricingPolicy,
};

/// Pricing policy in YAML
#[derive(Debug, Deserialize)]
pub struct PricingPolicyFixture {
    /// Subtotal at or above which shipping is free (e.g., "50000 XOF")
    pub free_shipping_threshold: String,

    /// Flat shipping fee below the threshold (e.g., "2000 XOF")
    pub shipping_flat_fee: String,

    /// VAT rate applied to the subtotal (e.g., "18%"), absent for no VAT
    pub vat: Option<String>,
}

impl PricingPolicyFixture {
    /// Parse a pricing policy fixture from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML does not parse.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(yaml)?)
    }
}

impl TryFrom<PricingPolicyFixture> for PricingPolicy<'static> {
    type Error = FixtureError;

    fn try_from(fixture: PricingPolicyFixture) -> Result<Self, Self::Error> {
        let (threshold_minor, threshold_currency) = parse_price(&fixture.free_shipping_threshold)?;
        let (fee_minor, fee_currency) = parse_price(&fixture.shipping_flat_fee)?;

        let vat = fixture
            .vat
            .as_deref()
            .map(parse_percentage)
            .transpose()?;

        let policy = PricingPolicy::new(
            Money::from_minor(threshold_minor, threshold_currency),
            Money::from_minor(fee_minor, fee_currency),
            vat,
        )?;

        Ok(policy)
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::XOF;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn policy_fixture_parses_threshold_and_fee() -> TestResult {
        let yaml = r#"
free_shipping_threshold: "50000 XOF"
shipping_flat_fee: "2000 XOF"
"#;

        let fixture = PricingPolicyFixture::from_yaml(yaml)?;
        let policy = PricingPolicy::try_from(fixture)?;

        assert_eq!(
            policy.free_shipping_threshold(),
            &Money::from_minor(50_000, XOF)
        );
        assert_eq!(policy.shipping_flat_fee(), &Money::from_minor(2_000, XOF));
        assert!(policy.vat().is_none());

        Ok(())
    }

    #[test]
    fn policy_fixture_accepts_vat() -> TestResult {
        let yaml = r#"
free_shipping_threshold: "50000 XOF"
shipping_flat_fee: "2000 XOF"
vat: "18%"
"#;

        let fixture = PricingPolicyFixture::from_yaml(yaml)?;
        let policy = PricingPolicy::try_from(fixture)?;

        assert!(policy.vat().is_some());

        Ok(())
    }

    #[test]
    fn policy_fixture_rejects_mixed_currencies() -> TestResult {
        let yaml = r#"
free_shipping_threshold: "50000 XOF"
shipping_flat_fee: "2.00 USD"
"#;

        let fixture = PricingPolicyFixture::from_yaml(yaml)?;
        let result = PricingPolicy::try_from(fixture);

        assert!(matches!(result, Err(FixtureError::Pricing(_))));

        Ok(())
    }
}
