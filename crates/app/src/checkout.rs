//! Checkout controller.
//!
//! Owns every open [`CheckoutSession`] and drives it against the store and
//! the payment gateway. Store configuration is fetched once when a session
//! starts; every later price for that session uses the same snapshot.

use std::sync::Arc;

use garland::{
    checkout::{CheckoutError, CheckoutSession, CheckoutStep, OrderSeed, PaidIntent},
    delivery::{DeliverySelection, ResolvedDelivery},
    discounts::AppliedDiscount,
    ids::TypedUuid,
    orders::{Order, OrderNumber},
    prices::Price,
    pricing::PriceBreakdown,
    receipt::Receipt,
    settings::PricingSettings,
};
use jiff::Timestamp;
use rustc_hash::FxHashMap;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{Span, info, warn};

use crate::{
    domain::{
        configuration::{ConfigurationService, ConfigurationServiceError},
        discounts::{DiscountsService, DiscountsServiceError},
        orders::{OrdersService, OrdersServiceError},
    },
    payments::{CardDetails, PaymentError, PaymentGateway},
};

/// Handle a client holds on to for its checkout session.
pub type SessionHandle = TypedUuid<CheckoutSession>;

/// Checkout failures as shown to the customer.
#[derive(Debug, Error)]
pub enum CheckoutControllerError {
    /// No open session for the handle.
    #[error("Your checkout session has expired, please start again")]
    SessionNotFound,

    /// A checkout rule refused the request.
    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    /// The payment gateway refused or failed.
    #[error(transparent)]
    Payment(#[from] PaymentError),

    /// Store settings could not be loaded.
    #[error("We could not load delivery settings, please try again")]
    Configuration(#[from] ConfigurationServiceError),

    /// Discount codes could not be loaded.
    #[error("We could not check discount codes, please try again")]
    Discounts(#[from] DiscountsServiceError),

    /// The order or gift card could not be written.
    #[error("We could not save your order, please try again")]
    Orders(#[from] OrdersServiceError),
}

struct OpenSession {
    session: CheckoutSession,
    settings: Arc<PricingSettings>,
}

/// Open checkout sessions and the services that price and place them.
pub struct CheckoutController {
    sessions: Mutex<FxHashMap<SessionHandle, OpenSession>>,
    settings: PricingSettings,
    configuration: Arc<dyn ConfigurationService>,
    discounts: Arc<dyn DiscountsService>,
    orders: Arc<dyn OrdersService>,
    payments: Arc<dyn PaymentGateway>,
}

impl CheckoutController {
    /// `settings` supplies the crew tiers and holiday calendar; delivery and
    /// timing surcharges saved in the store take precedence over its own.
    #[must_use]
    pub fn new(
        settings: PricingSettings,
        configuration: Arc<dyn ConfigurationService>,
        discounts: Arc<dyn DiscountsService>,
        orders: Arc<dyn OrdersService>,
        payments: Arc<dyn PaymentGateway>,
    ) -> Self {
        Self {
            sessions: Mutex::new(FxHashMap::default()),
            settings,
            configuration,
            discounts,
            orders,
            payments,
        }
    }

    /// Open a checkout session for `seed`.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutControllerError::Configuration`] if store settings
    /// cannot be loaded.
    #[tracing::instrument(
        name = "checkout.controller.start_checkout",
        skip(self, seed),
        fields(
            flow = ?seed.kind(),
            session = tracing::field::Empty,
            order_number = tracing::field::Empty
        ),
        err
    )]
    pub async fn start_checkout(
        &self,
        seed: OrderSeed,
    ) -> Result<SessionHandle, CheckoutControllerError> {
        let settings = Arc::new(self.load_settings().await?);
        let order_number = OrderNumber::generate(Timestamp::now(), rand::random());
        let handle = SessionHandle::new();

        let span = Span::current();

        span.record("session", tracing::field::display(handle));
        span.record("order_number", tracing::field::display(&order_number));

        self.sessions.lock().await.insert(
            handle,
            OpenSession {
                session: CheckoutSession::start(seed, order_number),
                settings,
            },
        );

        info!("started checkout");

        Ok(handle)
    }

    async fn load_settings(&self) -> Result<PricingSettings, ConfigurationServiceError> {
        let mut settings = self.settings.clone();

        match self.configuration.delivery_configuration().await? {
            Some(delivery) => settings.delivery = delivery,
            None => warn!(
                model = %settings.delivery.model,
                "no delivery configuration saved, using settings file"
            ),
        }

        let surcharges = self.configuration.timing_surcharges().await?;

        if !surcharges.is_empty() {
            settings.timing_surcharges = surcharges;
        }

        Ok(settings)
    }

    /// Run `apply` against a session and the settings it was started with.
    ///
    /// # Errors
    ///
    /// - [`CheckoutControllerError::SessionNotFound`]: unknown or closed session.
    /// - [`CheckoutControllerError::Checkout`]: whatever `apply` returns.
    pub async fn update<R>(
        &self,
        handle: SessionHandle,
        apply: impl FnOnce(&mut CheckoutSession, &PricingSettings) -> Result<R, CheckoutError>,
    ) -> Result<R, CheckoutControllerError> {
        let mut sessions = self.sessions.lock().await;

        let open = sessions
            .get_mut(&handle)
            .ok_or(CheckoutControllerError::SessionNotFound)?;

        Ok(apply(&mut open.session, &open.settings)?)
    }

    /// Copy of the session as it stands.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutControllerError::SessionNotFound`] for an unknown session.
    pub async fn session(
        &self,
        handle: SessionHandle,
    ) -> Result<CheckoutSession, CheckoutControllerError> {
        self.update(handle, |session, _| Ok(session.clone())).await
    }

    /// Price the session as it stands.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutControllerError::SessionNotFound`] or a pricing error.
    pub async fn quote(
        &self,
        handle: SessionHandle,
    ) -> Result<PriceBreakdown, CheckoutControllerError> {
        self.update(handle, |session, settings| {
            session.quote(&settings.context(&settings.delivery))
        })
        .await
    }

    /// Resolve a delivery selection against the session's delivery settings.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutControllerError::SessionNotFound`] or the delivery error.
    pub async fn select_delivery(
        &self,
        handle: SessionHandle,
        selection: DeliverySelection,
    ) -> Result<ResolvedDelivery, CheckoutControllerError> {
        self.update(handle, |session, settings| {
            session.select_delivery(&settings.delivery, &selection)
        })
        .await
    }

    /// Move to the next step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutControllerError::SessionNotFound`] or the unmet requirement.
    pub async fn advance(
        &self,
        handle: SessionHandle,
    ) -> Result<CheckoutStep, CheckoutControllerError> {
        self.update(handle, |session, _| session.advance()).await
    }

    /// Move to the previous step.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutControllerError::SessionNotFound`] for an unknown session.
    pub async fn back(&self, handle: SessionHandle) -> Result<CheckoutStep, CheckoutControllerError> {
        self.update(handle, |session, _| Ok(session.back())).await
    }

    /// Close a session without placing an order. Returns whether it was open.
    pub async fn abandon(&self, handle: SessionHandle) -> bool {
        let removed = self.sessions.lock().await.remove(&handle).is_some();

        if removed {
            info!(session = %handle, "abandoned checkout");
        }

        removed
    }

    /// Check a discount code and apply it to the session.
    ///
    /// Only one check runs per session at a time.
    ///
    /// # Errors
    ///
    /// - [`CheckoutControllerError::SessionNotFound`]: unknown session.
    /// - [`CheckoutControllerError::Checkout`]: a check is already running or
    ///   the code was rejected.
    /// - [`CheckoutControllerError::Discounts`]: codes could not be loaded.
    #[tracing::instrument(
        name = "checkout.controller.apply_discount",
        skip(self, input),
        fields(session = %handle),
        err
    )]
    pub async fn apply_discount(
        &self,
        handle: SessionHandle,
        input: &str,
    ) -> Result<AppliedDiscount, CheckoutControllerError> {
        self.update(handle, |session, _| session.begin_validation())
            .await?;

        let codes = self.discounts.active_codes().await;

        let mut sessions = self.sessions.lock().await;

        let open = sessions
            .get_mut(&handle)
            .ok_or(CheckoutControllerError::SessionNotFound)?;

        open.session.end_validation();

        let codes = codes?;
        let context = open.settings.context(&open.settings.delivery);

        let applied = open
            .session
            .apply_discount_code(&codes, input, &context, Timestamp::now())?
            .clone();

        info!(code = %applied.code, amount = %applied.amount, "applied discount code");

        Ok(applied)
    }

    /// Pay for the order and place it.
    ///
    /// A payment already confirmed for the same total is reused, so retrying
    /// after a failed write never charges twice. On success the session is
    /// closed.
    ///
    /// # Errors
    ///
    /// - [`CheckoutControllerError::SessionNotFound`]: unknown or abandoned session.
    /// - [`CheckoutControllerError::Checkout`]: not at the payment step, a
    ///   submission is already running, the applied discount code no longer
    ///   passes its gates (it is removed before anything is charged), or the
    ///   customer left the payment step before the payment was confirmed.
    /// - [`CheckoutControllerError::Discounts`]: codes could not be reloaded.
    /// - [`CheckoutControllerError::Payment`]: the payment failed; the message
    ///   is the gateway's own when it gave one.
    /// - [`CheckoutControllerError::Orders`]: the order could not be saved;
    ///   the session stays at the payment step.
    #[tracing::instrument(
        name = "checkout.controller.submit",
        skip(self, card),
        fields(
            session = %handle,
            order_number = tracing::field::Empty,
            total = tracing::field::Empty
        ),
        err
    )]
    pub async fn submit(
        &self,
        handle: SessionHandle,
        card: &CardDetails,
    ) -> Result<Receipt, CheckoutControllerError> {
        let discounted = self
            .update(handle, |session, _| Ok(session.discount().is_some()))
            .await?;

        let codes = if discounted {
            Some(self.discounts.active_codes().await?)
        } else {
            None
        };

        let (total, reusable) = self
            .update(handle, |session, settings| {
                session.begin_submission()?;

                let context = settings.context(&settings.delivery);

                let quote = codes
                    .as_deref()
                    .map_or(Ok(()), |codes| {
                        session.revalidate_discount(codes, &context, Timestamp::now())
                    })
                    .and_then(|()| session.quote(&context))
                    .inspect_err(|_err| session.end_submission())?;

                Ok((quote.total, session.reusable_payment(quote.total).cloned()))
            })
            .await?;

        Span::current().record("total", tracing::field::display(total));

        let placed = self.pay_and_place(handle, card, total, reusable).await;

        if placed.is_err()
            && let Some(open) = self.sessions.lock().await.get_mut(&handle)
        {
            open.session.end_submission();
        }

        placed
    }

    async fn pay_and_place(
        &self,
        handle: SessionHandle,
        card: &CardDetails,
        total: Price,
        reusable: Option<PaidIntent>,
    ) -> Result<Receipt, CheckoutControllerError> {
        if let Some(paid) = reusable {
            info!(payment_intent_id = %paid.id, "reusing confirmed payment");
        } else {
            let secret = self.payments.create_payment_intent(total).await?;
            let confirmation = self.payments.confirm_card_payment(&secret, card).await?;

            let paid = PaidIntent {
                id: confirmation.payment_intent_id,
                amount: total,
            };

            self.update(handle, |session, _| session.record_payment(paid.clone()))
                .await
                .inspect_err(|error| {
                    warn!(
                        payment_intent_id = %paid.id,
                        %error,
                        "payment confirmed after checkout left the payment step; not placing order"
                    );
                })?;
        }

        let prepared = self
            .update(handle, |session, settings| {
                session.prepare_order(&settings.context(&settings.delivery), Timestamp::now())
            })
            .await?;

        Span::current().record(
            "order_number",
            tracing::field::display(&prepared.order.order_number),
        );

        if let Some(card) = prepared.gift_card {
            match self.orders.create_gift_card(card).await {
                Ok(_) | Err(OrdersServiceError::AlreadyExists) => {}
                Err(error) => return Err(error.into()),
            }
        }

        self.store_order(&prepared.order).await?;

        if let Some(discount) = prepared.order.discount_code_id
            && let Err(error) = self.discounts.record_use(discount).await
        {
            warn!(discount_code_id = %discount, %error, "failed to record discount code use");
        }

        let mut sessions = self.sessions.lock().await;

        if let Some(mut open) = sessions.remove(&handle) {
            open.session.mark_submitted()?;
        }

        info!(order_id = %prepared.order.id, "placed order");

        Ok(Receipt::from_order(&prepared.order))
    }

    /// Write the order, treating a row already stored under the same id as
    /// written by an earlier attempt.
    async fn store_order(&self, order: &Order) -> Result<(), OrdersServiceError> {
        match self.orders.create_order(order.clone()).await {
            Ok(_) => Ok(()),
            Err(OrdersServiceError::AlreadyExists) => {
                self.orders.get_order(order.id).await?;

                Ok(())
            }
            Err(error) => Err(error),
        }
    }
}
