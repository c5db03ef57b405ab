//! Orders service errors.

use comptoir::checkout::CheckoutError;
use thiserror::Error;

use crate::domain::{carts::repository::CartRepositoryError, orders::gateway::OrderGatewayError};

/// Errors surfaced by the checkout service.
#[derive(Debug, Error)]
pub enum OrdersServiceError {
    /// Checkout navigation or validation failed.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The order submission collaborator reported a failure. The session is
    /// left at the payment step and may be re-submitted.
    #[error("order submission failed")]
    Submission(#[source] OrderGatewayError),

    /// The cart store failed.
    #[error("cart store error")]
    Repository(#[from] CartRepositoryError),
}
