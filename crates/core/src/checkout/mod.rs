//! Checkout
//!
//! The checkout session state machine: Address → Delivery → Payment →
//! Confirmed. Backward navigation is always free; forward navigation is gated
//! on the current step's data validating; `Confirmed` is terminal. Order
//! placement itself is delegated to the caller, which submits the order and
//! only then calls [`CheckoutSession::confirm`].

use std::fmt;

use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;
use thiserror::Error;

use crate::{
    pricing::{self, PricingError},
    summary::CartSummary,
};

pub mod address;
pub mod delivery;
pub mod payment;

use address::{AddressField, ShippingAddress};
use delivery::{DeliveryCatalog, DeliveryOptionId};
use payment::{PaymentCatalog, PaymentMethodId};

/// One stage of the linear checkout sequence.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum CheckoutStep {
    /// Shipping address entry.
    Address,

    /// Delivery option selection.
    Delivery,

    /// Payment method selection.
    Payment,

    /// Order placed; the session is terminal.
    Confirmed,
}

impl CheckoutStep {
    /// The step after this one, `None` from `Confirmed`.
    #[must_use]
    pub fn next(self) -> Option<Self> {
        match self {
            Self::Address => Some(Self::Delivery),
            Self::Delivery => Some(Self::Payment),
            Self::Payment => Some(Self::Confirmed),
            Self::Confirmed => None,
        }
    }

    /// The step before this one, `None` from `Address`.
    #[must_use]
    pub fn previous(self) -> Option<Self> {
        match self {
            Self::Address => None,
            Self::Delivery => Some(Self::Address),
            Self::Payment => Some(Self::Delivery),
            Self::Confirmed => Some(Self::Payment),
        }
    }
}

impl fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Address => "Address",
            Self::Delivery => "Delivery",
            Self::Payment => "Payment",
            Self::Confirmed => "Confirmed",
        };

        write!(f, "{label}")
    }
}

/// Why the current step's data does not validate.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// Required address fields are empty.
    #[error("shipping address is incomplete")]
    MissingAddressFields(SmallVec<[AddressField; 4]>),

    /// No delivery option has been selected.
    #[error("no delivery option selected")]
    DeliveryNotSelected,

    /// No payment method has been selected.
    #[error("no payment method selected")]
    PaymentNotSelected,
}

/// Errors related to checkout navigation and mutation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CheckoutError {
    /// The current step's data does not validate.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The session is confirmed and can no longer be changed.
    #[error("checkout session is already confirmed")]
    Terminal,

    /// There is no step before `Address`.
    #[error("already at the first checkout step")]
    AtFirstStep,

    /// Leaving `Payment` requires placing the order via
    /// [`CheckoutSession::confirm`], not [`CheckoutSession::advance`].
    #[error("order placement is required to leave the payment step")]
    PlacementRequired,

    /// [`CheckoutSession::confirm`] was called away from the payment step.
    #[error("session is not at the payment step")]
    NotAtPayment,

    /// The selected delivery option is not in the catalog.
    #[error("unknown delivery option: {0}")]
    UnknownDeliveryOption(String),

    /// The selected payment method is not in the catalog.
    #[error("unknown payment method: {0}")]
    UnknownPaymentMethod(String),

    /// A pricing calculation failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),
}

/// Order reference issued when a session reaches `Confirmed`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct OrderReference(String);

impl OrderReference {
    /// Wrap an already-formatted reference.
    #[must_use]
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// Format a reference from a year and an order sequence number, e.g.
    /// `CMD-2024-001`.
    #[must_use]
    pub fn formatted(year: i16, sequence: u32) -> Self {
        Self(format!("CMD-{year}-{sequence:03}"))
    }

    /// The reference as text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A checkout session: the cart summary it was opened with plus everything
/// the shopper has entered so far.
#[derive(Debug, Clone)]
pub struct CheckoutSession<'a> {
    step: CheckoutStep,
    address: ShippingAddress,
    delivery: Option<DeliveryOptionId>,
    payment: Option<PaymentMethodId>,
    order_reference: Option<OrderReference>,
    summary: CartSummary<'a>,
}

impl<'a> CheckoutSession<'a> {
    /// Open a new session at the `Address` step from a priced cart summary.
    #[must_use]
    pub fn new(summary: CartSummary<'a>) -> Self {
        Self {
            step: CheckoutStep::Address,
            address: ShippingAddress::default(),
            delivery: None,
            payment: None,
            order_reference: None,
            summary,
        }
    }

    /// The step the session is currently at.
    #[must_use]
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// The shipping address entered so far.
    #[must_use]
    pub fn address(&self) -> &ShippingAddress {
        &self.address
    }

    /// The selected delivery option, if any.
    #[must_use]
    pub fn delivery(&self) -> Option<&DeliveryOptionId> {
        self.delivery.as_ref()
    }

    /// The selected payment method, if any.
    #[must_use]
    pub fn payment(&self) -> Option<&PaymentMethodId> {
        self.payment.as_ref()
    }

    /// The cart summary the session was opened with.
    #[must_use]
    pub fn summary(&self) -> &CartSummary<'a> {
        &self.summary
    }

    /// The order reference, present only once the session is confirmed.
    #[must_use]
    pub fn order_reference(&self) -> Option<&OrderReference> {
        self.order_reference.as_ref()
    }

    /// Replace the shipping address.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Terminal`] once the session is confirmed.
    pub fn set_address(&mut self, address: ShippingAddress) -> Result<(), CheckoutError> {
        self.ensure_not_terminal()?;

        self.address = address;

        Ok(())
    }

    /// Select a delivery option from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Terminal`] once the session is confirmed, or
    /// [`CheckoutError::UnknownDeliveryOption`] when the id is not in the
    /// catalog.
    pub fn select_delivery(
        &mut self,
        catalog: &DeliveryCatalog<'_>,
        id: &str,
    ) -> Result<(), CheckoutError> {
        self.ensure_not_terminal()?;

        let option = catalog
            .get(id)
            .ok_or_else(|| CheckoutError::UnknownDeliveryOption(id.to_string()))?;

        self.delivery = Some(option.id.clone());

        Ok(())
    }

    /// Select a payment method from the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Terminal`] once the session is confirmed, or
    /// [`CheckoutError::UnknownPaymentMethod`] when the id is not in the
    /// catalog.
    pub fn select_payment(
        &mut self,
        catalog: &PaymentCatalog,
        id: &str,
    ) -> Result<(), CheckoutError> {
        self.ensure_not_terminal()?;

        let method = catalog
            .get(id)
            .ok_or_else(|| CheckoutError::UnknownPaymentMethod(id.to_string()))?;

        self.payment = Some(method.id.clone());

        Ok(())
    }

    /// Whether the current step's data validates, i.e. whether the session
    /// may move forward. Always false once confirmed.
    #[must_use]
    pub fn can_advance(&self) -> bool {
        self.step != CheckoutStep::Confirmed && self.validate_step().is_ok()
    }

    /// Check the current step's completeness predicate.
    ///
    /// # Errors
    ///
    /// Returns the [`ValidationError`] describing what is missing.
    pub fn validate_step(&self) -> Result<(), ValidationError> {
        match self.step {
            CheckoutStep::Address => {
                let missing = self.address.missing_fields();

                if missing.is_empty() {
                    Ok(())
                } else {
                    Err(ValidationError::MissingAddressFields(missing))
                }
            }
            CheckoutStep::Delivery => {
                if self.delivery.is_some() {
                    Ok(())
                } else {
                    Err(ValidationError::DeliveryNotSelected)
                }
            }
            CheckoutStep::Payment => {
                if self.payment.is_some() {
                    Ok(())
                } else {
                    Err(ValidationError::PaymentNotSelected)
                }
            }
            // Nothing left to fill in; advance() rejects this step anyway.
            CheckoutStep::Confirmed => Ok(()),
        }
    }

    /// Move to the next step, gated on the current step validating.
    ///
    /// Leaving `Payment` is not done here: the caller must place the order
    /// and call [`CheckoutSession::confirm`] with the resulting reference,
    /// so a failed placement leaves the session at `Payment` untouched.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Validation`] when the current step is incomplete;
    ///   the step is left unchanged.
    /// - [`CheckoutError::PlacementRequired`] at `Payment`.
    /// - [`CheckoutError::Terminal`] at `Confirmed`.
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutError> {
        match self.step {
            CheckoutStep::Confirmed => Err(CheckoutError::Terminal),
            CheckoutStep::Payment => Err(CheckoutError::PlacementRequired),
            CheckoutStep::Address | CheckoutStep::Delivery => {
                self.validate_step()?;

                if let Some(next) = self.step.next() {
                    self.step = next;
                }

                Ok(self.step)
            }
        }
    }

    /// Move back one step. Entered data is kept.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::AtFirstStep`] at `Address`.
    /// - [`CheckoutError::Terminal`] at `Confirmed`.
    pub fn retreat(&mut self) -> Result<CheckoutStep, CheckoutError> {
        match self.step {
            CheckoutStep::Confirmed => Err(CheckoutError::Terminal),
            CheckoutStep::Address => Err(CheckoutError::AtFirstStep),
            CheckoutStep::Delivery | CheckoutStep::Payment => {
                if let Some(previous) = self.step.previous() {
                    self.step = previous;
                }

                Ok(self.step)
            }
        }
    }

    /// Confirm the session after a successful order placement, recording the
    /// reference and moving to `Confirmed`.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotAtPayment`] when the session is not at the
    ///   payment step.
    /// - [`CheckoutError::Validation`] when the payment step is incomplete.
    pub fn confirm(&mut self, reference: OrderReference) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Payment {
            return Err(CheckoutError::NotAtPayment);
        }

        self.validate_step()?;

        self.order_reference = Some(reference);
        self.step = CheckoutStep::Confirmed;

        Ok(())
    }

    /// The price of the selected delivery option, when one is selected.
    #[must_use]
    pub fn delivery_cost(&self, catalog: &DeliveryCatalog<'a>) -> Option<Money<'a, Currency>> {
        self.delivery
            .as_ref()
            .and_then(|id| catalog.get(id.as_str()))
            .map(|option| option.price)
    }

    /// The amount due for this session: the summary's subtotal plus the
    /// selected delivery option's price, VAT and discount carried over.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::DeliveryNotSelected`] (wrapped) when no
    /// delivery option is selected, or a pricing error when amounts disagree.
    pub fn total_due(
        &self,
        catalog: &DeliveryCatalog<'a>,
    ) -> Result<Money<'a, Currency>, CheckoutError> {
        let delivery = self
            .delivery_cost(catalog)
            .ok_or(ValidationError::DeliveryNotSelected)?;

        let total = pricing::grand_total(
            self.summary.subtotal(),
            &delivery,
            self.summary.tax(),
            self.summary.discount(),
        )?;

        Ok(total)
    }

    fn ensure_not_terminal(&self) -> Result<(), CheckoutError> {
        if self.step == CheckoutStep::Confirmed {
            Err(CheckoutError::Terminal)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso::XOF};
    use testresult::TestResult;

    use crate::{cart::Cart, pricing::PricingPolicy};

    use super::*;

    fn complete_address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Aïcha Soglo".to_string(),
            phone: "+229 0123456789".to_string(),
            address: "Rue 12.080, Quartier Gbegamey".to_string(),
            city: "Cotonou".to_string(),
            ..ShippingAddress::default()
        }
    }

    fn session() -> Result<CheckoutSession<'static>, crate::pricing::PricingError> {
        let cart = Cart::new(XOF);
        let summary = CartSummary::price(&cart, None, &PricingPolicy::default())?;

        Ok(CheckoutSession::new(summary))
    }

    #[test]
    fn new_session_starts_at_address() -> TestResult {
        let session = session()?;

        assert_eq!(session.step(), CheckoutStep::Address);
        assert!(session.order_reference().is_none());

        Ok(())
    }

    #[test]
    fn advance_refuses_incomplete_address_and_keeps_step() -> TestResult {
        let mut session = session()?;

        let mut address = complete_address();
        address.full_name = String::new();
        session.set_address(address)?;

        assert!(!session.can_advance());

        let result = session.advance();

        assert!(matches!(
            result,
            Err(CheckoutError::Validation(
                ValidationError::MissingAddressFields(_)
            ))
        ));
        assert_eq!(session.step(), CheckoutStep::Address);

        Ok(())
    }

    #[test]
    fn advance_walks_address_to_payment() -> TestResult {
        let mut session = session()?;
        let delivery = DeliveryCatalog::defaults();
        let payment = PaymentCatalog::defaults();

        session.set_address(complete_address())?;

        assert_eq!(session.advance()?, CheckoutStep::Delivery);

        assert!(!session.can_advance());
        session.select_delivery(&delivery, "standard")?;

        assert_eq!(session.advance()?, CheckoutStep::Payment);

        assert!(!session.can_advance());
        session.select_payment(&payment, "mobile-money")?;
        assert!(session.can_advance());

        Ok(())
    }

    #[test]
    fn advance_from_payment_requires_placement() -> TestResult {
        let mut session = session()?;

        session.set_address(complete_address())?;
        session.advance()?;
        session.select_delivery(&DeliveryCatalog::defaults(), "express")?;
        session.advance()?;
        session.select_payment(&PaymentCatalog::defaults(), "card")?;

        let result = session.advance();

        assert!(matches!(result, Err(CheckoutError::PlacementRequired)));
        assert_eq!(session.step(), CheckoutStep::Payment);

        Ok(())
    }

    #[test]
    fn retreat_then_advance_round_trips() -> TestResult {
        let mut session = session()?;

        session.set_address(complete_address())?;
        session.advance()?;
        session.select_delivery(&DeliveryCatalog::defaults(), "standard")?;
        session.advance()?;

        assert_eq!(session.retreat()?, CheckoutStep::Delivery);
        assert_eq!(session.advance()?, CheckoutStep::Payment);

        Ok(())
    }

    #[test]
    fn retreat_at_address_is_rejected() -> TestResult {
        let mut session = session()?;

        let result = session.retreat();

        assert!(matches!(result, Err(CheckoutError::AtFirstStep)));
        assert_eq!(session.step(), CheckoutStep::Address);

        Ok(())
    }

    #[test]
    fn select_delivery_rejects_unknown_option() -> TestResult {
        let mut session = session()?;

        let result = session.select_delivery(&DeliveryCatalog::defaults(), "drone");

        assert!(matches!(
            result,
            Err(CheckoutError::UnknownDeliveryOption(id)) if id == "drone"
        ));

        Ok(())
    }

    #[test]
    fn select_payment_rejects_unknown_method() -> TestResult {
        let mut session = session()?;

        let result = session.select_payment(&PaymentCatalog::defaults(), "cheque");

        assert!(matches!(
            result,
            Err(CheckoutError::UnknownPaymentMethod(id)) if id == "cheque"
        ));

        Ok(())
    }

    #[test]
    fn confirm_requires_payment_step() -> TestResult {
        let mut session = session()?;

        let result = session.confirm(OrderReference::formatted(2024, 1));

        assert!(matches!(result, Err(CheckoutError::NotAtPayment)));

        Ok(())
    }

    #[test]
    fn confirmed_session_is_terminal() -> TestResult {
        let mut session = session()?;

        session.set_address(complete_address())?;
        session.advance()?;
        session.select_delivery(&DeliveryCatalog::defaults(), "standard")?;
        session.advance()?;
        session.select_payment(&PaymentCatalog::defaults(), "cash-on-delivery")?;

        session.confirm(OrderReference::formatted(2024, 1))?;

        assert_eq!(session.step(), CheckoutStep::Confirmed);
        assert_eq!(
            session.order_reference().map(OrderReference::as_str),
            Some("CMD-2024-001")
        );

        assert!(matches!(
            session.set_address(complete_address()),
            Err(CheckoutError::Terminal)
        ));
        assert!(matches!(
            session.select_delivery(&DeliveryCatalog::defaults(), "standard"),
            Err(CheckoutError::Terminal)
        ));
        assert!(matches!(session.advance(), Err(CheckoutError::Terminal)));
        assert!(matches!(session.retreat(), Err(CheckoutError::Terminal)));

        Ok(())
    }

    #[test]
    fn order_reference_formats_like_original_numbers() {
        let reference = OrderReference::formatted(2024, 1);

        assert_eq!(reference.as_str(), "CMD-2024-001");
        assert_eq!(OrderReference::formatted(2026, 42).as_str(), "CMD-2026-042");
        assert_eq!(
            OrderReference::formatted(2026, 1234).as_str(),
            "CMD-2026-1234"
        );
    }

    #[test]
    fn total_due_adds_selected_delivery_price() -> TestResult {
        let mut keys = slotmap::SlotMap::<crate::products::ProductKey, ()>::with_key();
        let mut cart = Cart::new(XOF);

        cart.add(crate::lines::NewLine {
            product: keys.insert(()),
            name: "Câble USB-C 1m".to_string(),
            variant: None,
            quantity: 1,
            unit_price: Money::from_minor(2_000, XOF),
            list_price: Money::from_minor(2_000, XOF),
            stock_quantity: 40,
        })?;

        let summary = CartSummary::price(&cart, None, &PricingPolicy::default())?;
        let mut session = CheckoutSession::new(summary);
        let catalog = DeliveryCatalog::defaults();

        let before_selection = session.total_due(&catalog);

        assert!(matches!(
            before_selection,
            Err(CheckoutError::Validation(
                ValidationError::DeliveryNotSelected
            ))
        ));

        session.select_delivery(&catalog, "express")?;

        assert_eq!(session.total_due(&catalog)?, Money::from_minor(7_000, XOF));

        Ok(())
    }
}
