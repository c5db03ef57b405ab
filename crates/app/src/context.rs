//! App Context

use std::sync::Arc;

use comptoir::{
    checkout::{delivery::DeliveryCatalog, payment::PaymentCatalog},
    coupons::CouponBook,
    pricing::PricingPolicy,
};

use crate::domain::{
    carts::{repository::InMemoryCartRepository, service::CartService},
    orders::{gateway::InMemoryOrderGateway, service::CheckoutService},
    products::InMemoryProductCatalog,
};

/// Wired-up services sharing one set of in-memory collaborators.
#[derive(Clone)]
pub struct AppContext {
    /// Cart coordination service.
    pub carts: CartService,

    /// Checkout coordination service.
    pub checkout: CheckoutService,

    /// The product catalog, kept accessible for listings.
    pub catalog: Arc<InMemoryProductCatalog>,

    /// The order gateway, kept accessible for inspecting placed orders.
    pub orders: Arc<InMemoryOrderGateway>,
}

impl AppContext {
    /// Build an application context over in-memory collaborators.
    #[must_use]
    pub fn in_memory(
        catalog: InMemoryProductCatalog,
        coupons: CouponBook<'static>,
        policy: PricingPolicy<'static>,
        delivery: DeliveryCatalog<'static>,
        payment: PaymentCatalog,
    ) -> Self {
        let catalog = Arc::new(catalog);
        let repository = Arc::new(InMemoryCartRepository::new());
        let orders = Arc::new(InMemoryOrderGateway::new());

        Self {
            carts: CartService::new(
                repository.clone(),
                catalog.clone(),
                coupons,
                policy,
            ),
            checkout: CheckoutService::new(orders.clone(), repository, delivery, payment),
            catalog,
            orders,
        }
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::domain::carts::records::UserUuid;

    use super::*;

    #[tokio::test]
    async fn context_services_share_one_cart_store() -> TestResult {
        let ctx = AppContext::in_memory(
            InMemoryProductCatalog::new(),
            CouponBook::new(),
            PricingPolicy::default(),
            DeliveryCatalog::defaults(),
            PaymentCatalog::defaults(),
        );

        let user = UserUuid::new(Uuid::now_v7());

        // An empty cart is visible through the carts service straight away.
        let lines = ctx.carts.lines(user).await?;

        assert!(lines.is_empty());

        Ok(())
    }
}
