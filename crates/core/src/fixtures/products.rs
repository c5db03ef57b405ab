//! Product Fixtures

use decimal_percentage::Percentage;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD, XOF},
};
use serde::Deserialize;

use crate::{fixtures::FixtureError, products::Product};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product key -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

impl ProductsFixture {
    /// Parse a products fixture from YAML.
    ///
    /// # Errors
    ///
    /// Returns an error when the YAML does not parse.
    pub fn from_yaml(yaml: &str) -> Result<Self, FixtureError> {
        Ok(serde_norway::from_str(yaml)?)
    }
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Product name
    pub name: String,

    /// List price (e.g., "450000 XOF")
    pub price: String,

    /// Sale price, when the product is on sale
    pub sale_price: Option<String>,

    /// Units available
    pub stock: u32,

    /// Whether the product can still be purchased
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl TryFrom<ProductFixture> for Product<'_> {
    type Error = FixtureError;

    fn try_from(fixture: ProductFixture) -> Result<Self, Self::Error> {
        let (minor_units, currency) = parse_price(&fixture.price)?;
        let price = Money::from_minor(minor_units, currency);

        let sale_price = fixture
            .sale_price
            .as_deref()
            .map(|raw| {
                let (sale_minor, sale_currency) = parse_price(raw)?;

                if sale_currency == currency {
                    Ok(Money::from_minor(sale_minor, sale_currency))
                } else {
                    Err(FixtureError::CurrencyMismatch(fixture.name.clone()))
                }
            })
            .transpose()?;

        Ok(Product {
            name: fixture.name,
            price,
            sale_price,
            stock_quantity: fixture.stock,
            active: fixture.active,
        })
    }
}

/// Parse a price string (e.g. "450000 XOF" or "2.99 USD") into minor units
/// and a currency, scaling by the currency's exponent.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code
/// is not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "XOF" => XOF,
        "USD" => USD,
        "EUR" => EUR,
        "GBP" => GBP,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    let factor = 10_i64
        .checked_pow(currency.exponent)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::from(factor))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    Ok((minor_units, currency))
}

/// Parse a percentage string (e.g. "15%" or "0.15") into a `Percentage`.
///
/// Accepts two formats:
/// - Percentage format: "15%" for 15%
/// - Decimal format: "0.15" for 15%
///
/// # Errors
///
/// Returns an error if the string cannot be parsed.
pub fn parse_percentage(s: &str) -> Result<Percentage, FixtureError> {
    let trimmed = s.trim();

    if let Some(percent_str) = trimmed.strip_suffix('%') {
        let value = percent_str
            .trim()
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        // Convert from percentage to decimal (15 -> 0.15)
        Ok(Percentage::from(value / 100.0))
    } else {
        let value = trimmed
            .parse::<f64>()
            .map_err(|_err| FixtureError::InvalidPercentage(s.to_string()))?;

        Ok(Percentage::from(value))
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn parse_price_scales_by_currency_exponent() -> TestResult {
        // XOF has no minor unit, so the amount is already in minor units.
        let (xof_minor, xof) = parse_price("450000 XOF")?;
        let (usd_minor, usd) = parse_price("2.99 USD")?;

        assert_eq!(xof_minor, 450_000);
        assert_eq!(xof, XOF);
        assert_eq!(usd_minor, 299);
        assert_eq!(usd, USD);

        Ok(())
    }

    #[test]
    fn parse_price_rejects_invalid_format() {
        let result = parse_price("2.99USD");

        assert!(matches!(result, Err(FixtureError::InvalidPrice(_))));
    }

    #[test]
    fn parse_price_rejects_unknown_currency() {
        let result = parse_price("2.99 ABC");

        assert!(matches!(result, Err(FixtureError::UnknownCurrency(code)) if code == "ABC"));
    }

    #[test]
    fn parse_percentage_accepts_both_formats() -> TestResult {
        assert_eq!(parse_percentage("10%")?, Percentage::from(0.10));
        assert_eq!(parse_percentage("0.10")?, Percentage::from(0.10));
        assert_eq!(parse_percentage("  18%  ")?, Percentage::from(0.18));

        Ok(())
    }

    #[test]
    fn parse_percentage_rejects_invalid_format() {
        let result = parse_percentage("invalid");

        assert!(matches!(result, Err(FixtureError::InvalidPercentage(_))));
    }

    #[test]
    fn product_fixture_converts_with_sale_price() -> TestResult {
        let fixture = ProductFixture {
            name: "Smartphone Samsung Galaxy S23".to_string(),
            price: "450000 XOF".to_string(),
            sale_price: Some("420000 XOF".to_string()),
            stock: 10,
            active: true,
        };

        let product = Product::try_from(fixture)?;

        assert_eq!(product.price, Money::from_minor(450_000, XOF));
        assert_eq!(product.effective_price(), &Money::from_minor(420_000, XOF));
        assert_eq!(product.stock_quantity, 10);
        assert!(product.active);

        Ok(())
    }

    #[test]
    fn product_fixture_rejects_mixed_currencies() {
        let fixture = ProductFixture {
            name: "Import".to_string(),
            price: "100 XOF".to_string(),
            sale_price: Some("1.00 USD".to_string()),
            stock: 1,
            active: true,
        };

        let result = Product::try_from(fixture);

        assert!(matches!(result, Err(FixtureError::CurrencyMismatch(_))));
    }

    #[test]
    fn products_fixture_parses_yaml_map() -> TestResult {
        let yaml = r#"
products:
  samsung-galaxy-s23:
    name: "Smartphone Samsung Galaxy S23"
    price: "450000 XOF"
    sale_price: "420000 XOF"
    stock: 10
  sony-wh-1000xm4:
    name: "Casque Bluetooth Sony WH-1000XM4"
    price: "85000 XOF"
    stock: 5
"#;

        let fixture = ProductsFixture::from_yaml(yaml)?;

        assert_eq!(fixture.products.len(), 2);

        let headset = fixture
            .products
            .get("sony-wh-1000xm4")
            .ok_or("missing headset fixture")?;

        assert!(headset.sale_price.is_none());
        assert!(headset.active);

        Ok(())
    }
}
