//! Fixtures
//!
//! YAML fixtures for products, coupons, the pricing policy and the checkout
//! catalogs. Prices are written as `"AMOUNT CURRENCY"` strings and scaled to
//! minor units with the currency's own exponent (XOF has none).

use thiserror::Error;

use crate::pricing::PricingError;

pub mod checkout;
pub mod coupons;
pub mod pricing;
pub mod products;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percentage format
    #[error("Invalid percentage format: {0}")]
    InvalidPercentage(String),

    /// Invalid discount format
    #[error("Invalid discount format: {0}")]
    InvalidDiscount(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Amounts within one fixture disagree on currency
    #[error("Currency mismatch in fixture: {0}")]
    CurrencyMismatch(String),

    /// Wrapped pricing error
    #[error(transparent)]
    Pricing(#[from] PricingError),
}
