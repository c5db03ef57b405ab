//! Order Gateway
//!
//! The order submission collaborator, invoked exactly once per placement
//! attempt at the Payment → Confirmed transition. The in-memory gateway
//! stands in for the storefront backend and issues `CMD-<year>-<seq>`
//! references.

use std::sync::atomic::{AtomicU32, Ordering};

use async_trait::async_trait;
use jiff::{Timestamp, Zoned};
use mockall::automock;
use thiserror::Error;
use tokio::sync::RwLock;

use comptoir::checkout::{
    OrderReference, address::ShippingAddress, delivery::DeliveryOptionId,
    payment::PaymentMethodId,
};

use crate::domain::carts::records::{LineRecord, UserUuid};

/// Failure modes of the order submission collaborator.
#[derive(Debug, Error)]
pub enum OrderGatewayError {
    /// The backend rejected the order.
    #[error("order rejected: {0}")]
    Rejected(String),

    /// The backend could not be reached.
    #[error("order service unreachable: {0}")]
    Unreachable(String),

    /// The backend did not answer in time.
    #[error("order service timed out")]
    Timeout,
}

/// Everything the backend needs to record an order.
#[derive(Debug, Clone)]
pub struct OrderDraft {
    /// The shopper placing the order.
    pub user: UserUuid,

    /// Cart lines being purchased.
    pub lines: Vec<LineRecord>,

    /// Where the order ships to.
    pub address: ShippingAddress,

    /// Selected delivery option.
    pub delivery: DeliveryOptionId,

    /// Selected payment method.
    pub payment: PaymentMethodId,

    /// Amount due, minor units.
    pub total_minor: i64,

    /// ISO code of the currency the total is in.
    pub currency_code: &'static str,

    /// When the placement was attempted.
    pub placed_at: Timestamp,
}

/// Order submission endpoint.
#[automock]
#[async_trait]
pub trait OrderGateway: Send + Sync {
    /// Submit an order, returning its reference on success.
    async fn submit(&self, order: &OrderDraft) -> Result<OrderReference, OrderGatewayError>;
}

/// An order the in-memory gateway accepted.
#[derive(Debug, Clone)]
pub struct SubmittedOrder {
    /// Reference issued for the order.
    pub reference: OrderReference,

    /// The draft as submitted.
    pub draft: OrderDraft,
}

/// In-memory gateway backing the demo and tests.
#[derive(Debug, Default)]
pub struct InMemoryOrderGateway {
    sequence: AtomicU32,
    orders: RwLock<Vec<SubmittedOrder>>,
}

impl InMemoryOrderGateway {
    /// Create a gateway with an empty order log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The orders accepted so far, in submission order.
    pub async fn submitted(&self) -> Vec<SubmittedOrder> {
        self.orders.read().await.clone()
    }
}

#[async_trait]
impl OrderGateway for InMemoryOrderGateway {
    async fn submit(&self, order: &OrderDraft) -> Result<OrderReference, OrderGatewayError> {
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let year = Zoned::now().year();
        let reference = OrderReference::formatted(year, sequence);

        let mut orders = self.orders.write().await;

        orders.push(SubmittedOrder {
            reference: reference.clone(),
            draft: order.clone(),
        });

        Ok(reference)
    }
}
