//! Cart Repository
//!
//! The persistence boundary for carts. The engine never calls this interface
//! directly; [`crate::domain::carts::service::CartService`] reads via
//! `fetch`, applies mutations in memory, and writes back via `persist`, so a
//! failed call leaves the stored state exactly as it was.

use async_trait::async_trait;
use mockall::automock;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::domain::carts::records::{LineRecord, UserUuid};

/// Failure modes of the cart store collaborator.
#[derive(Debug, Error)]
pub enum CartRepositoryError {
    /// The store could not be reached.
    #[error("cart store unavailable: {0}")]
    Unavailable(String),

    /// The store did not answer in time.
    #[error("cart store timed out")]
    Timeout,
}

/// Persistent storage for cart lines, keyed by user.
#[automock]
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// Fetch the user's cart lines. A user with no cart has an empty list.
    async fn fetch(&self, user: UserUuid) -> Result<Vec<LineRecord>, CartRepositoryError>;

    /// Replace the user's cart lines.
    async fn persist(
        &self,
        user: UserUuid,
        lines: Vec<LineRecord>,
    ) -> Result<(), CartRepositoryError>;

    /// Delete every line of the user's cart.
    async fn clear(&self, user: UserUuid) -> Result<(), CartRepositoryError>;
}

/// In-memory cart store backing the demo and tests.
#[derive(Debug, Default)]
pub struct InMemoryCartRepository {
    carts: RwLock<FxHashMap<UserUuid, Vec<LineRecord>>>,
}

impl InMemoryCartRepository {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CartRepository for InMemoryCartRepository {
    async fn fetch(&self, user: UserUuid) -> Result<Vec<LineRecord>, CartRepositoryError> {
        let carts = self.carts.read().await;

        Ok(carts.get(&user).cloned().unwrap_or_default())
    }

    async fn persist(
        &self,
        user: UserUuid,
        lines: Vec<LineRecord>,
    ) -> Result<(), CartRepositoryError> {
        let mut carts = self.carts.write().await;

        carts.insert(user, lines);

        Ok(())
    }

    async fn clear(&self, user: UserUuid) -> Result<(), CartRepositoryError> {
        let mut carts = self.carts.write().await;

        carts.remove(&user);

        Ok(())
    }
}
