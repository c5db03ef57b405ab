//! Checkout service.
//!
//! Drives a [`CheckoutSession`] against the order gateway: the session's
//! Address → Delivery → Payment navigation is pure engine logic, and
//! [`CheckoutService::place_order`] performs the one side-effecting
//! transition. A failed submission leaves the session at the payment step
//! with everything the shopper entered intact.

use std::sync::Arc;

use jiff::Timestamp;

use comptoir::{
    checkout::{
        CheckoutError, CheckoutSession, CheckoutStep, OrderReference, ValidationError,
        delivery::DeliveryCatalog, payment::PaymentCatalog,
    },
    summary::CartSummary,
};

use crate::domain::{
    carts::{records::UserUuid, repository::CartRepository},
    orders::{
        errors::OrdersServiceError,
        gateway::{OrderDraft, OrderGateway},
    },
};

/// Checkout coordination service.
#[derive(Clone)]
pub struct CheckoutService {
    gateway: Arc<dyn OrderGateway>,
    carts: Arc<dyn CartRepository>,
    delivery: DeliveryCatalog<'static>,
    payment: PaymentCatalog,
}

impl CheckoutService {
    /// Create a new checkout service over its collaborators and catalogs.
    #[must_use]
    pub fn new(
        gateway: Arc<dyn OrderGateway>,
        carts: Arc<dyn CartRepository>,
        delivery: DeliveryCatalog<'static>,
        payment: PaymentCatalog,
    ) -> Self {
        Self {
            gateway,
            carts,
            delivery,
            payment,
        }
    }

    /// The delivery options offered at checkout.
    #[must_use]
    pub fn delivery_catalog(&self) -> &DeliveryCatalog<'static> {
        &self.delivery
    }

    /// The payment methods offered at checkout.
    #[must_use]
    pub fn payment_catalog(&self) -> &PaymentCatalog {
        &self.payment
    }

    /// Open a checkout session from a priced cart summary.
    #[must_use]
    pub fn begin(&self, summary: CartSummary<'static>) -> CheckoutSession<'static> {
        CheckoutSession::new(summary)
    }

    /// Select a delivery option on the session, validated against this
    /// service's catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] (wrapped) when the id is unknown or the
    /// session is terminal.
    pub fn select_delivery(
        &self,
        session: &mut CheckoutSession<'static>,
        id: &str,
    ) -> Result<(), OrdersServiceError> {
        session.select_delivery(&self.delivery, id)?;

        Ok(())
    }

    /// Select a payment method on the session, validated against this
    /// service's catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CheckoutError`] (wrapped) when the id is unknown or the
    /// session is terminal.
    pub fn select_payment(
        &self,
        session: &mut CheckoutSession<'static>,
        id: &str,
    ) -> Result<(), OrdersServiceError> {
        session.select_payment(&self.payment, id)?;

        Ok(())
    }

    /// Place the order for a session at the payment step: submit through the
    /// gateway, confirm the session with the issued reference, then clear the
    /// user's cart.
    ///
    /// On a gateway failure the session is untouched: still at `Payment`,
    /// still fully populated, so the caller may retry with identical or
    /// edited data.
    ///
    /// # Errors
    ///
    /// - [`OrdersServiceError::Checkout`] when the session is not at the
    ///   payment step or its data does not validate.
    /// - [`OrdersServiceError::Submission`] when the gateway fails.
    /// - [`OrdersServiceError::Repository`] when fetching the cart lines for
    ///   the draft fails.
    pub async fn place_order(
        &self,
        user: UserUuid,
        session: &mut CheckoutSession<'static>,
    ) -> Result<OrderReference, OrdersServiceError> {
        if session.step() != CheckoutStep::Payment {
            return Err(CheckoutError::NotAtPayment.into());
        }

        session.validate_step().map_err(CheckoutError::from)?;

        let delivery = session
            .delivery()
            .cloned()
            .ok_or(CheckoutError::Validation(
                ValidationError::DeliveryNotSelected,
            ))?;

        let payment = session
            .payment()
            .cloned()
            .ok_or(CheckoutError::Validation(ValidationError::PaymentNotSelected))?;

        let total = session.total_due(&self.delivery)?;
        let lines = self.carts.fetch(user).await?;

        let draft = OrderDraft {
            user,
            lines,
            address: session.address().clone(),
            delivery,
            payment,
            total_minor: total.to_minor_units(),
            currency_code: total.currency().iso_alpha_code,
            placed_at: Timestamp::now(),
        };

        let reference = self
            .gateway
            .submit(&draft)
            .await
            .map_err(OrdersServiceError::Submission)?;

        session.confirm(reference.clone())?;

        // The order exists either way; a failed clear only means the shopper
        // sees a stale cart until the next fetch.
        if let Err(error) = self.carts.clear(user).await {
            tracing::warn!(user = %user.as_uuid(), %error, "order placed but cart clear failed");
        }

        tracing::info!(user = %user.as_uuid(), reference = %reference, "order placed");

        Ok(reference)
    }
}

#[cfg(test)]
mod tests {
    use comptoir::{
        cart::Cart,
        checkout::address::ShippingAddress,
        pricing::PricingPolicy,
    };
    use rusty_money::iso::XOF;
    use testresult::TestResult;
    use uuid::Uuid;

    use crate::domain::{
        carts::repository::InMemoryCartRepository,
        orders::gateway::{InMemoryOrderGateway, MockOrderGateway, OrderGatewayError},
    };

    use super::*;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Aïcha Soglo".to_string(),
            phone: "+229 0123456789".to_string(),
            address: "Rue 12.080, Quartier Gbegamey".to_string(),
            city: "Cotonou".to_string(),
            ..ShippingAddress::default()
        }
    }

    fn empty_summary() -> TestResult<CartSummary<'static>> {
        let cart = Cart::new(XOF);

        Ok(CartSummary::price(&cart, None, &PricingPolicy::default())?)
    }

    fn service_with_gateway(gateway: Arc<dyn OrderGateway>) -> CheckoutService {
        CheckoutService::new(
            gateway,
            Arc::new(InMemoryCartRepository::new()),
            DeliveryCatalog::defaults(),
            PaymentCatalog::defaults(),
        )
    }

    fn session_at_payment(service: &CheckoutService) -> TestResult<CheckoutSession<'static>> {
        let mut session = service.begin(empty_summary()?);

        session.set_address(address())?;
        session.advance()?;
        service.select_delivery(&mut session, "standard")?;
        session.advance()?;
        service.select_payment(&mut session, "card")?;

        Ok(session)
    }

    #[tokio::test]
    async fn place_order_confirms_session_and_clears_cart() -> TestResult {
        let gateway = Arc::new(InMemoryOrderGateway::new());
        let service = service_with_gateway(gateway.clone());
        let user = UserUuid::new(Uuid::now_v7());

        let mut session = session_at_payment(&service)?;

        let reference = service.place_order(user, &mut session).await?;

        assert_eq!(session.step(), CheckoutStep::Confirmed);
        assert_eq!(session.order_reference(), Some(&reference));

        let submitted = gateway.submitted().await;

        assert_eq!(submitted.len(), 1);

        let order = submitted.first().ok_or("order should exist")?;

        assert_eq!(order.draft.delivery.as_str(), "standard");
        assert_eq!(order.draft.payment.as_str(), "card");
        assert_eq!(order.draft.currency_code, "XOF");
        // Empty cart summary + standard delivery fee.
        assert_eq!(order.draft.total_minor, 2_000);

        Ok(())
    }

    #[tokio::test]
    async fn failed_submission_leaves_session_resubmittable() -> TestResult {
        let mut gateway = MockOrderGateway::new();

        gateway
            .expect_submit()
            .times(1)
            .returning(|_| Err(OrderGatewayError::Unreachable("backend down".to_string())));

        let service = service_with_gateway(Arc::new(gateway));
        let user = UserUuid::new(Uuid::now_v7());

        let mut session = session_at_payment(&service)?;

        let result = service.place_order(user, &mut session).await;

        assert!(matches!(result, Err(OrdersServiceError::Submission(_))));

        // Still at Payment with everything intact: re-submittable.
        assert_eq!(session.step(), CheckoutStep::Payment);
        assert!(session.order_reference().is_none());
        assert!(session.payment().is_some_and(|id| id.as_str() == "card"));
        assert!(session.can_advance());

        Ok(())
    }

    #[tokio::test]
    async fn place_order_away_from_payment_is_rejected() -> TestResult {
        let service = service_with_gateway(Arc::new(InMemoryOrderGateway::new()));
        let user = UserUuid::new(Uuid::now_v7());

        let mut session = service.begin(empty_summary()?);

        let result = service.place_order(user, &mut session).await;

        assert!(matches!(
            result,
            Err(OrdersServiceError::Checkout(CheckoutError::NotAtPayment))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn place_order_requires_payment_selection() -> TestResult {
        let service = service_with_gateway(Arc::new(InMemoryOrderGateway::new()));
        let user = UserUuid::new(Uuid::now_v7());

        let mut session = service.begin(empty_summary()?);

        session.set_address(address())?;
        session.advance()?;
        service.select_delivery(&mut session, "express")?;
        session.advance()?;

        let result = service.place_order(user, &mut session).await;

        assert!(matches!(
            result,
            Err(OrdersServiceError::Checkout(CheckoutError::Validation(
                ValidationError::PaymentNotSelected
            )))
        ));
        assert_eq!(session.step(), CheckoutStep::Payment);

        Ok(())
    }

    #[tokio::test]
    async fn unknown_catalog_ids_are_rejected() -> TestResult {
        let service = service_with_gateway(Arc::new(InMemoryOrderGateway::new()));

        let mut session = service.begin(empty_summary()?);

        let delivery = service.select_delivery(&mut session, "teleport");

        assert!(matches!(
            delivery,
            Err(OrdersServiceError::Checkout(
                CheckoutError::UnknownDeliveryOption(_)
            ))
        ));

        let payment = service.select_payment(&mut session, "barter");

        assert!(matches!(
            payment,
            Err(OrdersServiceError::Checkout(
                CheckoutError::UnknownPaymentMethod(_)
            ))
        ));

        Ok(())
    }
}
