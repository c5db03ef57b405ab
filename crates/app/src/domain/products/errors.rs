//! Product catalog errors.

use thiserror::Error;

/// Failure modes of the product catalog collaborator.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// No product exists for the given id.
    #[error("product not found")]
    NotFound,

    /// The catalog backend could not be reached.
    #[error("product catalog unavailable: {0}")]
    Unavailable(String),

    /// The catalog backend did not answer in time.
    #[error("product catalog timed out")]
    Timeout,
}
