//! Carts service errors.

use comptoir::{cart::CartError, pricing::PricingError};
use thiserror::Error;

use crate::domain::{carts::repository::CartRepositoryError, products::errors::CatalogError};

/// Errors surfaced by the carts service.
#[derive(Debug, Error)]
pub enum CartsServiceError {
    /// No cart line exists for the given id.
    #[error("cart line not found")]
    LineNotFound,

    /// The referenced product does not exist in the catalog.
    #[error("product not found")]
    UnknownProduct,

    /// A cart invariant was violated.
    #[error(transparent)]
    Cart(#[from] CartError),

    /// A pricing calculation failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// The cart store failed.
    #[error("cart store error")]
    Repository(#[from] CartRepositoryError),

    /// The product catalog failed.
    #[error("product catalog error")]
    Catalog(#[from] CatalogError),
}
