//! Checkout
//!
//! A [`CheckoutSession`] walks one order through its checkout steps. Which
//! steps it visits depends on what is being bought: tree rentals and event
//! bookings start with scheduling, everything else goes straight to customer
//! details. Moving forward runs the gate for the current step; moving back
//! never does.
//!
//! The session never talks to a store or a payment gateway. Callers fetch
//! configuration once, pass it in as a [`PricingContext`], and report payment
//! outcomes back through [`CheckoutSession::record_payment`].

use jiff::{Timestamp, civil::Date};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    catalog::{
        EventService, Product,
        trees::{DecorLevel, EventSize, RentalPeriod, TreeOptions, TreeOptionsError},
    },
    customers::CustomerDetails,
    delivery::{self, DeliveryConfiguration, DeliveryError, DeliverySelection, ResolvedDelivery},
    discounts::{self, AppliedDiscount, DiscountCode, DiscountError},
    gift_cards::{self, GiftCard, GiftCardError},
    orders::{Order, OrderId, OrderLine, OrderNumber, OrderStatus, SelectedAddOn, ServiceDates},
    prices::Price,
    pricing::{
        OrderCharges, PriceBreakdown, PricingContext, PricingError, compute_order_total,
        selected_add_ons,
    },
};

/// Errors raised while moving through checkout. Messages are shown to the customer.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CheckoutError {
    /// A tree rental was started without tree options.
    #[error("Please customise your tree before checking out")]
    MissingTreeOptions,

    /// Tree orders need a decoration level.
    #[error("Please choose a decoration level")]
    MissingDecorLevel,

    /// Tree orders need a rental period.
    #[error("Please choose a rental period")]
    MissingRentalPeriod,

    /// Event orders need an installation date.
    #[error("Please choose an installation date")]
    MissingInstallationDate,

    /// Name, email or phone is blank.
    #[error("Please enter your name, email and phone number")]
    MissingContact,

    /// No delivery zone resolved or no street address.
    #[error("Please choose a delivery area and enter your street address")]
    MissingDelivery,

    /// Tree options were changed on an order that is not a tree rental.
    #[error("Tree options only apply to tree rentals")]
    NotATreeOrder,

    /// Scheduling was changed on an order without a scheduling step.
    #[error("This order does not need to be scheduled")]
    SchedulingNotRequired,

    /// Delivery was chosen for a gift card.
    #[error("Gift cards are sent by email and need no delivery")]
    DeliveryNotRequired,

    /// A discount code was entered for a gift card.
    #[error("Discount codes cannot be used on gift cards")]
    DiscountNotApplicable,

    /// A discount code is already being checked.
    #[error("A discount code is already being checked")]
    ValidationInFlight,

    /// The order is already being submitted.
    #[error("Your order is already being submitted")]
    SubmissionInFlight,

    /// A payment outcome arrived after the customer left the payment step.
    #[error("This checkout is no longer waiting for payment")]
    SessionNotAwaitingPayment(CheckoutStep),

    /// An order was prepared before payment was confirmed.
    #[error("Payment has not been confirmed yet")]
    PaymentNotConfirmed,

    /// The checkout has already been submitted.
    #[error("This order has already been placed")]
    AlreadySubmitted,

    /// Tree options were rejected.
    #[error(transparent)]
    Tree(#[from] TreeOptionsError),

    /// Pricing failed.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Delivery could not be resolved.
    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    /// The discount code was rejected.
    #[error(transparent)]
    Discount(#[from] DiscountError),

    /// The gift card cannot be sold.
    #[error(transparent)]
    GiftCard(#[from] GiftCardError),
}

/// A checkout step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckoutStep {
    /// Tree options, crew and service dates
    Scheduling,

    /// Contact details and delivery
    CustomerDetails,

    /// Card payment
    Payment,

    /// Order placed
    Submitted,
}

impl std::fmt::Display for CheckoutStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            CheckoutStep::Scheduling => "scheduling",
            CheckoutStep::CustomerDetails => "customer details",
            CheckoutStep::Payment => "payment",
            CheckoutStep::Submitted => "submitted",
        })
    }
}

const SCHEDULED_STEPS: [CheckoutStep; 4] = [
    CheckoutStep::Scheduling,
    CheckoutStep::CustomerDetails,
    CheckoutStep::Payment,
    CheckoutStep::Submitted,
];

const DIRECT_STEPS: [CheckoutStep; 3] = [
    CheckoutStep::CustomerDetails,
    CheckoutStep::Payment,
    CheckoutStep::Submitted,
];

/// What checkout was started for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "seed", rename_all = "snake_case")]
pub enum OrderSeed {
    /// A catalogue product, with tree options for rentals
    Product {
        /// Product being bought
        product: Product,

        /// Tree customisation from the tree wizard
        #[serde(default)]
        tree: Option<TreeOptions>,
    },

    /// A validated gift card
    GiftCard {
        /// Gift card being bought
        card: GiftCard,
    },

    /// An event service booking
    Event {
        /// Service being booked
        service: EventService,
    },
}

/// The branch of checkout an order follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlowKind {
    /// Tree rental: scheduling, details, payment
    TreeRental,

    /// Decorations, ribbons and centrepieces: details, payment
    Product,

    /// Gift card: details, payment
    GiftCard,

    /// Event service: scheduling, details, payment
    Event,
}

impl FlowKind {
    /// Steps this flow visits, in order.
    pub const fn steps(self) -> &'static [CheckoutStep] {
        match self {
            FlowKind::TreeRental | FlowKind::Event => &SCHEDULED_STEPS,
            FlowKind::Product | FlowKind::GiftCard => &DIRECT_STEPS,
        }
    }

    /// Whether the flow has a scheduling step.
    pub const fn is_scheduled(self) -> bool {
        matches!(self, FlowKind::TreeRental | FlowKind::Event)
    }
}

impl OrderSeed {
    /// Flow this seed follows.
    pub fn kind(&self) -> FlowKind {
        match self {
            OrderSeed::Product { product, tree } => {
                if tree.is_some() || product.category.is_rental() {
                    FlowKind::TreeRental
                } else {
                    FlowKind::Product
                }
            }
            OrderSeed::GiftCard { .. } => FlowKind::GiftCard,
            OrderSeed::Event { .. } => FlowKind::Event,
        }
    }

    /// Price before surcharges and delivery.
    pub fn base_price(&self) -> Price {
        match self {
            OrderSeed::Product { product, .. } => product.price,
            OrderSeed::GiftCard { card } => card.amount,
            OrderSeed::Event { service } => service.price,
        }
    }

    fn line(&self) -> OrderLine {
        match self {
            OrderSeed::Product { product, tree } => OrderLine::Product {
                product_id: product.id,
                title: product.title.clone(),
                tree: tree.clone(),
            },
            OrderSeed::GiftCard { card } => OrderLine::GiftCard {
                gift_card_id: card.id,
            },
            OrderSeed::Event { service } => OrderLine::Event {
                event_service_id: service.id,
                title: service.title.clone(),
            },
        }
    }
}

/// Crew and service dates chosen in the scheduling step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scheduling {
    /// Installers booked
    pub men_power: Option<u8>,

    /// Installation date; the installation service is booked when set
    pub installation_date: Option<Date>,

    /// Teardown date
    pub teardown_date: Option<Date>,

    /// Whether the teardown service is booked
    pub teardown: bool,
}

impl Scheduling {
    fn teardown_date(&self) -> Option<Date> {
        self.teardown_date.filter(|_| self.teardown)
    }
}

/// A payment intent the gateway has confirmed for this session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaidIntent {
    /// Gateway payment intent id
    pub id: String,

    /// Amount the intent was confirmed for
    pub amount: Price,
}

/// Records to persist when a paid checkout is submitted, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedOrder {
    /// Gift card row, written before the order
    pub gift_card: Option<GiftCard>,

    /// Order row
    pub order: Order,
}

/// One customer's way through checkout.
#[derive(Debug, Clone)]
pub struct CheckoutSession {
    order_id: OrderId,
    order_number: OrderNumber,
    seed: OrderSeed,
    kind: FlowKind,
    step: CheckoutStep,
    scheduling: Scheduling,
    customer: CustomerDetails,
    add_on_ids: Vec<String>,
    discount: Option<AppliedDiscount>,
    discount_code: Option<DiscountCode>,
    paid: Option<PaidIntent>,
    validating: bool,
    submitting: bool,
}

impl CheckoutSession {
    /// Start checkout for `seed`.
    ///
    /// The order number is fixed for the life of the session so a
    /// resubmission after a failed write reuses it.
    pub fn start(seed: OrderSeed, order_number: OrderNumber) -> Self {
        let kind = seed.kind();

        let step = kind
            .steps()
            .first()
            .copied()
            .unwrap_or(CheckoutStep::CustomerDetails);

        Self {
            order_id: OrderId::new(),
            order_number,
            seed,
            kind,
            step,
            scheduling: Scheduling::default(),
            customer: CustomerDetails::default(),
            add_on_ids: Vec::new(),
            discount: None,
            discount_code: None,
            paid: None,
            validating: false,
            submitting: false,
        }
    }

    /// Current step
    pub fn step(&self) -> CheckoutStep {
        self.step
    }

    /// Flow being followed
    pub fn kind(&self) -> FlowKind {
        self.kind
    }

    /// Order number reserved for this session
    pub fn order_number(&self) -> &OrderNumber {
        &self.order_number
    }

    /// What is being bought
    pub fn seed(&self) -> &OrderSeed {
        &self.seed
    }

    /// Scheduling choices
    pub fn scheduling(&self) -> &Scheduling {
        &self.scheduling
    }

    /// Customer details
    pub fn customer(&self) -> &CustomerDetails {
        &self.customer
    }

    /// Applied discount
    pub fn discount(&self) -> Option<&AppliedDiscount> {
        self.discount.as_ref()
    }

    /// Confirmed payment, if any
    pub fn paid_intent(&self) -> Option<&PaidIntent> {
        self.paid.as_ref()
    }

    /// Selected delivery add-on ids
    pub fn add_on_ids(&self) -> &[String] {
        &self.add_on_ids
    }

    fn ensure_open(&self) -> Result<(), CheckoutError> {
        if self.step == CheckoutStep::Submitted {
            return Err(CheckoutError::AlreadySubmitted);
        }

        Ok(())
    }

    fn tree_mut(&mut self) -> Result<&mut TreeOptions, CheckoutError> {
        self.ensure_open()?;

        match &mut self.seed {
            OrderSeed::Product {
                tree: Some(tree), ..
            } => Ok(tree),
            OrderSeed::Product { product, tree: None } if product.category.is_rental() => {
                Err(CheckoutError::MissingTreeOptions)
            }
            _ => Err(CheckoutError::NotATreeOrder),
        }
    }

    fn scheduling_mut(&mut self) -> Result<&mut Scheduling, CheckoutError> {
        self.ensure_open()?;

        if !self.kind.is_scheduled() {
            return Err(CheckoutError::SchedulingNotRequired);
        }

        Ok(&mut self.scheduling)
    }

    /// Choose the tree rental period.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotATreeOrder`] unless this is a tree rental.
    pub fn set_rental_period(&mut self, period: RentalPeriod) -> Result<(), CheckoutError> {
        self.tree_mut()?.set_rental_period(period);

        Ok(())
    }

    /// Choose the tree decoration level.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::NotATreeOrder`] unless this is a tree rental.
    pub fn set_decor_level(&mut self, level: DecorLevel) -> Result<(), CheckoutError> {
        self.tree_mut()?.set_decor_level(level);

        Ok(())
    }

    /// Choose the event size for a fully decorated tree.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::NotATreeOrder`]: this is not a tree rental.
    /// - [`CheckoutError::Tree`]: the tree is not fully decorated.
    pub fn set_event_size(&mut self, size: Option<EventSize>) -> Result<(), CheckoutError> {
        self.tree_mut()?.set_event_size(size)?;

        Ok(())
    }

    /// Book `workers` installers.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SchedulingNotRequired`] for unscheduled orders.
    pub fn set_men_power(&mut self, workers: Option<u8>) -> Result<(), CheckoutError> {
        self.scheduling_mut()?.men_power = workers;

        Ok(())
    }

    /// Set or clear the installation date.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SchedulingNotRequired`] for unscheduled orders.
    pub fn set_installation_date(&mut self, date: Option<Date>) -> Result<(), CheckoutError> {
        self.scheduling_mut()?.installation_date = date;

        Ok(())
    }

    /// Set or clear the teardown date. Setting a date books the teardown service.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SchedulingNotRequired`] for unscheduled orders.
    pub fn set_teardown_date(&mut self, date: Option<Date>) -> Result<(), CheckoutError> {
        let scheduling = self.scheduling_mut()?;

        scheduling.teardown_date = date;

        if date.is_some() {
            scheduling.teardown = true;
        }

        Ok(())
    }

    /// Book or cancel the teardown service.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SchedulingNotRequired`] for unscheduled orders.
    pub fn set_teardown(&mut self, booked: bool) -> Result<(), CheckoutError> {
        self.scheduling_mut()?.teardown = booked;

        Ok(())
    }

    /// Edit contact and address fields.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::AlreadySubmitted`] once the order is placed.
    pub fn customer_mut(&mut self) -> Result<&mut CustomerDetails, CheckoutError> {
        self.ensure_open()?;

        Ok(&mut self.customer)
    }

    /// Resolve the customer's delivery selection and record the fee.
    ///
    /// A failed resolution clears any earlier delivery, so the customer
    /// cannot move on with a stale fee.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::DeliveryNotRequired`]: gift cards have no delivery.
    /// - [`CheckoutError::Delivery`]: the selection could not be resolved.
    pub fn select_delivery(
        &mut self,
        config: &DeliveryConfiguration,
        selection: &DeliverySelection,
    ) -> Result<ResolvedDelivery, CheckoutError> {
        self.ensure_open()?;

        if self.kind == FlowKind::GiftCard {
            return Err(CheckoutError::DeliveryNotRequired);
        }

        match delivery::resolve(config, selection) {
            Ok(resolved) => {
                self.customer.apply_delivery(&resolved);

                if let DeliverySelection::PostalCode(code) = selection {
                    self.customer.postal_code = Some(code.trim().to_string());
                }

                Ok(resolved)
            }
            Err(error) => {
                self.customer.clear_delivery();

                Err(error.into())
            }
        }
    }

    /// Replace the selected delivery add-ons.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::AlreadySubmitted`]: the order is placed.
    /// - [`CheckoutError::DeliveryNotRequired`]: gift cards have no delivery.
    pub fn set_add_ons(&mut self, ids: Vec<String>) -> Result<(), CheckoutError> {
        self.ensure_open()?;

        if self.kind == FlowKind::GiftCard {
            return Err(CheckoutError::DeliveryNotRequired);
        }

        self.add_on_ids = ids;

        Ok(())
    }

    fn charges(&self) -> OrderCharges<'_> {
        let (rental_days, scheduling) = match &self.seed {
            OrderSeed::Product {
                tree: Some(tree), ..
            } => (
                tree.rental_period().map(RentalPeriod::days),
                Some(&self.scheduling),
            ),
            OrderSeed::Event { .. } => (None, Some(&self.scheduling)),
            OrderSeed::Product { .. } | OrderSeed::GiftCard { .. } => (None, None),
        };

        OrderCharges {
            rental_days,
            men_power: scheduling.and_then(|s| s.men_power),
            installation: scheduling.and_then(|s| s.installation_date),
            teardown: scheduling.and_then(Scheduling::teardown_date),
            delivery_fee: self.customer.delivery_fee(),
            add_on_ids: &self.add_on_ids,
            discount: self.discount.as_ref(),
        }
    }

    /// Price the order as it stands.
    ///
    /// Gift cards are charged their face value and nothing else.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Pricing`] if a selection cannot be priced.
    pub fn quote(&self, context: &PricingContext<'_>) -> Result<PriceBreakdown, CheckoutError> {
        if let OrderSeed::GiftCard { card } = &self.seed {
            let amount = gift_cards::check_amount(card.amount)?;

            return Ok(PriceBreakdown::gift_card(amount));
        }

        Ok(compute_order_total(
            self.seed.base_price(),
            &self.charges(),
            context,
        )?)
    }

    /// Subtotal a discount code is checked against.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::Pricing`] if a selection cannot be priced.
    pub fn discountable_subtotal(
        &self,
        context: &PricingContext<'_>,
    ) -> Result<Price, CheckoutError> {
        let charges = OrderCharges {
            discount: None,
            ..self.charges()
        };

        Ok(compute_order_total(self.seed.base_price(), &charges, context)?.subtotal)
    }

    /// Check `input` against `codes` and apply it, replacing any earlier code.
    ///
    /// A rejected code leaves the earlier discount in place.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::DiscountNotApplicable`]: gift cards take no discounts.
    /// - [`CheckoutError::Discount`]: the code was rejected.
    pub fn apply_discount_code(
        &mut self,
        codes: &[DiscountCode],
        input: &str,
        context: &PricingContext<'_>,
        now: Timestamp,
    ) -> Result<&AppliedDiscount, CheckoutError> {
        self.ensure_open()?;

        if self.kind == FlowKind::GiftCard {
            return Err(CheckoutError::DiscountNotApplicable);
        }

        let subtotal = self.discountable_subtotal(context)?;

        let code = discounts::find_code(codes, input)
            .ok_or_else(|| DiscountError::NotFound(input.trim().to_string()))?;

        let applied = discounts::apply(code, subtotal, now)?;

        self.discount_code = Some(code.clone());

        Ok(&*self.discount.insert(applied))
    }

    /// Drop the applied discount.
    pub fn remove_discount(&mut self) {
        self.discount = None;
        self.discount_code = None;
    }

    /// Run the applied code's gates again against fresh `codes` and the
    /// current subtotal. A code that no longer passes is removed, so the next
    /// quote shows the undiscounted total.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::Discount`]: the code is gone or fails a gate.
    /// - [`CheckoutError::Pricing`]: the order cannot be priced.
    pub fn revalidate_discount(
        &mut self,
        codes: &[DiscountCode],
        context: &PricingContext<'_>,
        now: Timestamp,
    ) -> Result<(), CheckoutError> {
        let Some(applied) = &self.discount else {
            return Ok(());
        };

        let (id, name) = (applied.discount_id, applied.code.clone());
        let subtotal = self.discountable_subtotal(context)?;

        let checked = codes
            .iter()
            .find(|code| code.id == id)
            .ok_or(DiscountError::NotFound(name))
            .and_then(|code| {
                discounts::apply(code, subtotal, now).map(|applied| (code.clone(), applied))
            });

        match checked {
            Ok((code, applied)) => {
                self.discount = Some(applied);
                self.discount_code = Some(code);

                Ok(())
            }
            Err(error) => {
                self.remove_discount();

                Err(error.into())
            }
        }
    }

    /// Run the gate for the current step and move to the next one.
    ///
    /// # Errors
    ///
    /// Returns the first unmet requirement of the current step.
    pub fn advance(&mut self) -> Result<CheckoutStep, CheckoutError> {
        match self.step {
            CheckoutStep::Scheduling => self.check_scheduling()?,
            CheckoutStep::CustomerDetails => self.check_customer()?,
            CheckoutStep::Payment => return Err(CheckoutError::PaymentNotConfirmed),
            CheckoutStep::Submitted => return Err(CheckoutError::AlreadySubmitted),
        }

        self.step = self.neighbour(1).unwrap_or(self.step);

        Ok(self.step)
    }

    /// Go back one step. Never validates; does nothing on the first step,
    /// once the order is placed, or while a paid order is being stored.
    pub fn back(&mut self) -> CheckoutStep {
        let storing = self.submitting && self.paid.is_some();

        if self.step != CheckoutStep::Submitted
            && !storing
            && let Some(previous) = self.neighbour(-1)
        {
            self.step = previous;
        }

        self.step
    }

    fn neighbour(&self, offset: isize) -> Option<CheckoutStep> {
        let steps = self.kind.steps();
        let index = steps.iter().position(|step| *step == self.step)?;

        steps.get(index.checked_add_signed(offset)?).copied()
    }

    fn check_scheduling(&self) -> Result<(), CheckoutError> {
        match &self.seed {
            OrderSeed::Product {
                tree: Some(tree), ..
            } => {
                if tree.decor_level().is_none() {
                    return Err(CheckoutError::MissingDecorLevel);
                }

                if tree.rental_period().is_none() {
                    return Err(CheckoutError::MissingRentalPeriod);
                }

                Ok(())
            }
            OrderSeed::Product { tree: None, .. } => Err(CheckoutError::MissingTreeOptions),
            OrderSeed::Event { .. } => {
                if self.scheduling.installation_date.is_none() {
                    return Err(CheckoutError::MissingInstallationDate);
                }

                Ok(())
            }
            OrderSeed::GiftCard { .. } => Ok(()),
        }
    }

    fn check_customer(&self) -> Result<(), CheckoutError> {
        if !self.customer.has_contact() {
            return Err(CheckoutError::MissingContact);
        }

        if self.kind != FlowKind::GiftCard && !self.customer.has_delivery() {
            return Err(CheckoutError::MissingDelivery);
        }

        Ok(())
    }

    /// Mark a discount validation as started.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::ValidationInFlight`] if one is already running.
    pub fn begin_validation(&mut self) -> Result<(), CheckoutError> {
        if self.validating {
            return Err(CheckoutError::ValidationInFlight);
        }

        self.validating = true;

        Ok(())
    }

    /// Mark the running discount validation as finished.
    pub fn end_validation(&mut self) {
        self.validating = false;
    }

    /// Mark a submission as started.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SubmissionInFlight`]: one is already running.
    /// - [`CheckoutError::SessionNotAwaitingPayment`]: not at the payment step.
    pub fn begin_submission(&mut self) -> Result<(), CheckoutError> {
        if self.submitting {
            return Err(CheckoutError::SubmissionInFlight);
        }

        self.ensure_awaiting_payment()?;
        self.submitting = true;

        Ok(())
    }

    /// Mark the running submission as finished.
    pub fn end_submission(&mut self) {
        self.submitting = false;
    }

    /// Whether a submission is running.
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Fail unless the session is at the payment step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SessionNotAwaitingPayment`] with the current step.
    pub fn ensure_awaiting_payment(&self) -> Result<(), CheckoutError> {
        if self.step != CheckoutStep::Payment {
            return Err(CheckoutError::SessionNotAwaitingPayment(self.step));
        }

        Ok(())
    }

    /// Payment already confirmed for `amount`, which a resubmission can reuse.
    pub fn reusable_payment(&self, amount: Price) -> Option<&PaidIntent> {
        self.paid.as_ref().filter(|paid| paid.amount == amount)
    }

    /// Record a confirmed payment.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SessionNotAwaitingPayment`] if the customer
    /// has left the payment step; the payment must not become an order.
    pub fn record_payment(&mut self, paid: PaidIntent) -> Result<(), CheckoutError> {
        self.ensure_awaiting_payment()?;
        self.paid = Some(paid);

        Ok(())
    }

    /// Build the records to persist for a paid order.
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::SessionNotAwaitingPayment`]: not at the payment step.
    /// - [`CheckoutError::PaymentNotConfirmed`]: no payment recorded.
    /// - [`CheckoutError::Discount`]: the applied code no longer passes its
    ///   gates for the current subtotal.
    /// - [`CheckoutError::Pricing`]: the order cannot be priced.
    pub fn prepare_order(
        &self,
        context: &PricingContext<'_>,
        now: Timestamp,
    ) -> Result<PreparedOrder, CheckoutError> {
        self.ensure_awaiting_payment()?;

        let paid = self.paid.as_ref().ok_or(CheckoutError::PaymentNotConfirmed)?;

        if let Some(code) = &self.discount_code {
            code.check(self.discountable_subtotal(context)?, now)?;
        }

        let pricing = self.quote(context)?;
        let charges = self.charges();

        let gift_card = match &self.seed {
            OrderSeed::GiftCard { card } => Some(card.clone()),
            OrderSeed::Product { .. } | OrderSeed::Event { .. } => None,
        };

        let add_ons = selected_add_ons(&self.add_on_ids, context.add_ons)
            .map(SelectedAddOn::from)
            .collect();

        let order = Order {
            id: self.order_id,
            order_number: self.order_number.clone(),
            customer: self.customer.clone(),
            line: self.seed.line(),
            men_power: charges.men_power,
            dates: ServiceDates {
                installation_date: charges.installation,
                teardown_date: charges.teardown,
            },
            add_ons,
            discount_code_id: self.discount.as_ref().map(|discount| discount.discount_id),
            pricing,
            total_amount: pricing.total,
            status: OrderStatus::Pending,
            payment_intent_id: Some(paid.id.clone()),
            created_at: now,
        };

        Ok(PreparedOrder { gift_card, order })
    }

    /// Move to [`CheckoutStep::Submitted`] once the order is stored.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError::SessionNotAwaitingPayment`] if not at the payment step.
    pub fn mark_submitted(&mut self) -> Result<(), CheckoutError> {
        self.ensure_awaiting_payment()?;
        self.step = CheckoutStep::Submitted;
        self.submitting = false;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use jiff::civil::date;
    use rust_decimal_macros::dec;

    use crate::{
        catalog::{Category, ProductId},
        discounts::{DiscountCodeId, DiscountKind},
        gift_cards::{GiftCardDelivery, GiftCardId},
        pricing::{HolidayCalendar, MenPowerTiers},
    };

    use super::*;

    fn product(category: Category, price: u64) -> Product {
        Product {
            id: ProductId::new(),
            title: "Nordic Wreath".to_string(),
            price: Price::from_major(price),
            category,
            colors: Vec::new(),
            decorated: false,
            images: Vec::new(),
        }
    }

    fn session(seed: OrderSeed) -> CheckoutSession {
        CheckoutSession::start(seed, OrderNumber::from_parts(1_766_000_123_456, 7))
    }

    fn fill_customer(session: &mut CheckoutSession) -> anyhow::Result<()> {
        let customer = session.customer_mut()?;

        customer.name = "Holly".to_string();
        customer.email = "holly@example.com".to_string();
        customer.phone = "8123 4567".to_string();
        customer.street_address = "12 Fir Road".to_string();

        Ok(())
    }

    #[test]
    fn decorations_skip_scheduling() {
        let session = session(OrderSeed::Product {
            product: product(Category::Decorations, 80),
            tree: None,
        });

        assert_eq!(session.kind(), FlowKind::Product);
        assert_eq!(session.step(), CheckoutStep::CustomerDetails);
    }

    #[test]
    fn tree_gate_needs_decor_and_rental() -> anyhow::Result<()> {
        let mut session = session(OrderSeed::Product {
            product: product(Category::Trees, 300),
            tree: Some(TreeOptions::new("8ft", "Noble Fir")?),
        });

        assert_eq!(session.step(), CheckoutStep::Scheduling);
        assert_eq!(session.advance(), Err(CheckoutError::MissingDecorLevel));

        session.set_decor_level(DecorLevel::Half)?;

        assert_eq!(session.advance(), Err(CheckoutError::MissingRentalPeriod));

        session.set_rental_period(RentalPeriod::Days45)?;

        assert_eq!(session.advance()?, CheckoutStep::CustomerDetails);

        Ok(())
    }

    #[test]
    fn event_gate_needs_installation_date() -> anyhow::Result<()> {
        let mut session = session(OrderSeed::Event {
            service: EventService {
                id: crate::catalog::EventServiceId::new(),
                title: "Lobby dressing".to_string(),
                price: Price::from_major(900),
                is_active: true,
            },
        });

        assert_eq!(session.advance(), Err(CheckoutError::MissingInstallationDate));

        session.set_installation_date(Some(date(2026, 12, 1)))?;

        assert_eq!(session.advance()?, CheckoutStep::CustomerDetails);

        Ok(())
    }

    #[test]
    fn teardown_date_books_teardown() -> anyhow::Result<()> {
        let mut session = session(OrderSeed::Event {
            service: EventService {
                id: crate::catalog::EventServiceId::new(),
                title: "Lobby dressing".to_string(),
                price: Price::from_major(900),
                is_active: true,
            },
        });

        session.set_teardown_date(Some(date(2027, 1, 5)))?;

        assert!(session.scheduling().teardown);

        Ok(())
    }

    #[test]
    fn scheduling_is_rejected_without_scheduling_step() {
        let mut session = session(OrderSeed::Product {
            product: product(Category::Ribbons, 15),
            tree: None,
        });

        assert_eq!(
            session.set_men_power(Some(3)),
            Err(CheckoutError::SchedulingNotRequired)
        );
        assert_eq!(
            session.set_decor_level(DecorLevel::Full),
            Err(CheckoutError::NotATreeOrder)
        );
    }

    #[test]
    fn customer_gate_needs_contact_then_delivery() -> anyhow::Result<()> {
        let mut session = session(OrderSeed::Product {
            product: product(Category::Decorations, 80),
            tree: None,
        });

        assert_eq!(session.advance(), Err(CheckoutError::MissingContact));

        fill_customer(&mut session)?;

        assert_eq!(session.advance(), Err(CheckoutError::MissingDelivery));

        session.select_delivery(
            &DeliveryConfiguration::default(),
            &DeliverySelection::Zone("central".to_string()),
        )?;

        assert_eq!(session.advance()?, CheckoutStep::Payment);

        Ok(())
    }

    #[test]
    fn failed_delivery_clears_previous_fee() -> anyhow::Result<()> {
        let mut session = session(OrderSeed::Product {
            product: product(Category::Decorations, 80),
            tree: None,
        });
        let config = DeliveryConfiguration::default();

        session.select_delivery(&config, &DeliverySelection::Zone("east".to_string()))?;

        let result =
            session.select_delivery(&config, &DeliverySelection::PostalCode("999999".to_string()));

        assert!(matches!(
            result,
            Err(CheckoutError::Delivery(DeliveryError::ZoneNotFound(_)))
        ));
        assert_eq!(session.customer().delivery_fee(), Price::ZERO);

        Ok(())
    }

    #[test]
    fn back_never_validates_and_stops_at_first_step() -> anyhow::Result<()> {
        let mut session = session(OrderSeed::Product {
            product: product(Category::Trees, 300),
            tree: Some(TreeOptions::new("6ft", "Fraser Fir")?),
        });

        session.set_decor_level(DecorLevel::Full)?;
        session.set_rental_period(RentalPeriod::Days60)?;
        session.advance()?;

        assert_eq!(session.back(), CheckoutStep::Scheduling);
        assert_eq!(session.back(), CheckoutStep::Scheduling);

        Ok(())
    }

    #[test]
    fn late_payment_is_refused_after_going_back() -> anyhow::Result<()> {
        let mut session = session(OrderSeed::Product {
            product: product(Category::Decorations, 80),
            tree: None,
        });

        fill_customer(&mut session)?;
        session.select_delivery(
            &DeliveryConfiguration::default(),
            &DeliverySelection::Zone("central".to_string()),
        )?;
        session.advance()?;
        session.back();

        let result = session.record_payment(PaidIntent {
            id: "pi_123".to_string(),
            amount: Price::from_major(120),
        });

        assert_eq!(
            result,
            Err(CheckoutError::SessionNotAwaitingPayment(
                CheckoutStep::CustomerDetails
            ))
        );
        assert!(session.paid_intent().is_none());

        Ok(())
    }

    #[test]
    fn single_flight_flags_reject_second_request() -> anyhow::Result<()> {
        let mut session = session(OrderSeed::Product {
            product: product(Category::Decorations, 80),
            tree: None,
        });

        session.begin_validation()?;

        assert_eq!(
            session.begin_validation(),
            Err(CheckoutError::ValidationInFlight)
        );

        session.end_validation();
        session.begin_validation()?;

        Ok(())
    }

    #[test]
    fn second_discount_replaces_first() -> anyhow::Result<()> {
        let mut session = session(OrderSeed::Product {
            product: product(Category::Decorations, 100),
            tree: None,
        });

        let tiers = MenPowerTiers::default();
        let holidays = HolidayCalendar::default();
        let context = PricingContext {
            men_power: &tiers,
            surcharges: &[],
            holidays: &holidays,
            add_ons: &[],
        };

        let code = |code: &str, value| DiscountCode {
            id: DiscountCodeId::new(),
            code: code.to_string(),
            kind: DiscountKind::Fixed,
            value,
            min_order_amount: Price::ZERO,
            max_uses: None,
            used_count: 0,
            valid_from: None,
            valid_until: None,
            is_active: true,
        };

        let codes = [code("FIVE", dec!(5)), code("TEN", dec!(10))];

        session.apply_discount_code(&codes, "five", &context, Timestamp::now())?;
        session.apply_discount_code(&codes, "ten", &context, Timestamp::now())?;

        assert_eq!(session.quote(&context)?.total, Price::from_major(90));

        Ok(())
    }

    fn at_payment(price: u64, zone: &str) -> anyhow::Result<CheckoutSession> {
        let mut session = session(OrderSeed::Product {
            product: product(Category::Decorations, price),
            tree: None,
        });

        fill_customer(&mut session)?;
        session.select_delivery(
            &DeliveryConfiguration::default(),
            &DeliverySelection::Zone(zone.to_string()),
        )?;
        session.advance()?;

        Ok(session)
    }

    #[test]
    fn discount_minimum_is_checked_again_before_ordering() -> anyhow::Result<()> {
        let tiers = MenPowerTiers::default();
        let holidays = HolidayCalendar::default();
        let context = PricingContext {
            men_power: &tiers,
            surcharges: &[],
            holidays: &holidays,
            add_ons: &[],
        };

        let codes = [DiscountCode {
            id: DiscountCodeId::new(),
            code: "BIGTREE".to_string(),
            kind: DiscountKind::Fixed,
            value: dec!(20),
            min_order_amount: Price::from_major(125),
            max_uses: None,
            used_count: 0,
            valid_from: None,
            valid_until: None,
            is_active: true,
        }];

        // $80.00 plus $50.00 east delivery clears the $125.00 minimum.
        let mut session = at_payment(80, "east")?;

        session.apply_discount_code(&codes, "BIGTREE", &context, Timestamp::now())?;

        // Central delivery drops the subtotal to $120.00.
        session.back();
        session.select_delivery(
            &DeliveryConfiguration::default(),
            &DeliverySelection::Zone("central".to_string()),
        )?;
        session.advance()?;
        session.record_payment(PaidIntent {
            id: "pi_456".to_string(),
            amount: Price::from_major(100),
        })?;

        let below = Err(CheckoutError::Discount(DiscountError::BelowMinimum {
            minimum: Price::from_major(125),
        }));

        assert_eq!(session.prepare_order(&context, Timestamp::now()), below);
        assert_eq!(
            session.revalidate_discount(&codes, &context, Timestamp::now()),
            below.map(|_| ())
        );
        assert!(session.discount().is_none());
        assert_eq!(session.quote(&context)?.total, Price::from_major(120));

        Ok(())
    }

    #[test]
    fn back_is_held_while_paid_order_is_stored() -> anyhow::Result<()> {
        let mut session = at_payment(80, "central")?;

        session.begin_submission()?;
        session.record_payment(PaidIntent {
            id: "pi_789".to_string(),
            amount: Price::from_major(120),
        })?;

        assert_eq!(session.back(), CheckoutStep::Payment);

        session.end_submission();

        assert_eq!(session.back(), CheckoutStep::CustomerDetails);

        Ok(())
    }

    #[test]
    fn gift_card_amount_is_checked_when_priced() {
        let tiers = MenPowerTiers::default();
        let holidays = HolidayCalendar::default();
        let context = PricingContext {
            men_power: &tiers,
            surcharges: &[],
            holidays: &holidays,
            add_ons: &[],
        };

        let session = session(OrderSeed::GiftCard {
            card: GiftCard {
                id: GiftCardId::new(),
                amount: Price::from_major(5),
                sender_name: "Holly".to_string(),
                sender_email: "holly@example.com".to_string(),
                recipient: None,
                message: None,
                delivery: GiftCardDelivery::Now,
                is_for_self: true,
            },
        });

        assert_eq!(
            session.quote(&context),
            Err(CheckoutError::GiftCard(GiftCardError::AmountOutOfRange(
                Price::from_major(5)
            )))
        );
    }
}
