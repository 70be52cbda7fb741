//! Orders service.

use std::sync::Arc;

use async_trait::async_trait;
use garland::{
    gift_cards::GiftCard,
    orders::{Order, OrderId, OrderStatus},
};
use mockall::automock;
use tracing::info;

use crate::{
    domain::orders::OrdersServiceError,
    store::{
        Collection, DataStore, Direction, Filter, Query, Row, from_row, from_rows, to_row,
        to_value,
    },
};

#[derive(Clone)]
pub struct StoreOrdersService {
    store: Arc<dyn DataStore>,
}

impl StoreOrdersService {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl OrdersService for StoreOrdersService {
    #[tracing::instrument(
        name = "orders.service.create_order",
        skip(self, order),
        fields(order_number = %order.order_number, total = %order.total_amount),
        err
    )]
    async fn create_order(&self, order: Order) -> Result<Order, OrdersServiceError> {
        let row = self.store.insert(Collection::Orders, to_row(&order)?).await?;

        info!(order_id = %order.id, "created order");

        Ok(from_row(row)?)
    }

    #[tracing::instrument(
        name = "orders.service.create_gift_card",
        skip(self, card),
        fields(gift_card_id = %card.id, amount = %card.amount),
        err
    )]
    async fn create_gift_card(&self, card: GiftCard) -> Result<GiftCard, OrdersServiceError> {
        let row = self
            .store
            .insert(Collection::GiftCards, to_row(&card)?)
            .await?;

        info!("created gift card");

        Ok(from_row(row)?)
    }

    async fn get_order(&self, order: OrderId) -> Result<Order, OrdersServiceError> {
        let query = Query::all(Collection::Orders)
            .filter("id", order.to_string())
            .limit(1);

        let row = self
            .store
            .select(query)
            .await?
            .into_iter()
            .next()
            .ok_or(OrdersServiceError::NotFound)?;

        Ok(from_row(row)?)
    }

    async fn list_orders(&self) -> Result<Vec<Order>, OrdersServiceError> {
        let query = Query::all(Collection::Orders).order_by("created_at", Direction::Descending);

        Ok(from_rows(self.store.select(query).await?)?)
    }

    #[tracing::instrument(name = "orders.service.update_status", skip(self), err)]
    async fn update_status(
        &self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrdersServiceError> {
        let mut stored = self.get_order(order).await?;

        stored.advance_status(status)?;

        let mut patch = Row::new();
        patch.insert("status".to_string(), to_value(&stored.status)?);

        self.store
            .update(
                Collection::Orders,
                vec![Filter::eq("id", order.to_string())],
                patch,
            )
            .await?;

        info!(status = %stored.status, "updated order status");

        Ok(stored)
    }
}

#[automock]
#[async_trait]
pub trait OrdersService: Send + Sync {
    /// Store a paid order.
    async fn create_order(&self, order: Order) -> Result<Order, OrdersServiceError>;

    /// Store a purchased gift card.
    async fn create_gift_card(&self, card: GiftCard) -> Result<GiftCard, OrdersServiceError>;

    /// Retrieve a single order.
    async fn get_order(&self, order: OrderId) -> Result<Order, OrdersServiceError>;

    /// Retrieve every order, newest first.
    async fn list_orders(&self) -> Result<Vec<Order>, OrdersServiceError>;

    /// Move an order one status forward.
    async fn update_status(
        &self,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<Order, OrdersServiceError>;
}
