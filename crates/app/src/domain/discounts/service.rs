//! Discounts service.

use std::sync::Arc;

use async_trait::async_trait;
use garland::discounts::{DiscountCode, DiscountCodeId};
use mockall::automock;
use serde_json::json;
use tracing::{Span, info};

use crate::{
    domain::discounts::DiscountsServiceError,
    store::{Collection, DataStore, Direction, Filter, Query, Row, from_row, from_rows, to_row},
};

#[derive(Clone)]
pub struct StoreDiscountsService {
    store: Arc<dyn DataStore>,
}

impl StoreDiscountsService {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }

    async fn find(&self, id: DiscountCodeId) -> Result<Option<DiscountCode>, DiscountsServiceError> {
        let query = Query::all(Collection::DiscountCodes)
            .filter("id", id.to_string())
            .limit(1);

        self.store
            .select(query)
            .await?
            .into_iter()
            .next()
            .map(from_row::<DiscountCode>)
            .transpose()
            .map_err(DiscountsServiceError::from)
    }
}

#[async_trait]
impl DiscountsService for StoreDiscountsService {
    async fn active_codes(&self) -> Result<Vec<DiscountCode>, DiscountsServiceError> {
        let query = Query::all(Collection::DiscountCodes).filter("is_active", true);

        Ok(from_rows(self.store.select(query).await?)?)
    }

    async fn list_codes(&self) -> Result<Vec<DiscountCode>, DiscountsServiceError> {
        let query = Query::all(Collection::DiscountCodes).order_by("code", Direction::Ascending);

        Ok(from_rows(self.store.select(query).await?)?)
    }

    #[tracing::instrument(
        name = "discounts.service.record_use",
        skip(self),
        fields(used_count = tracing::field::Empty),
        err
    )]
    async fn record_use(&self, id: DiscountCodeId) -> Result<DiscountCode, DiscountsServiceError> {
        // Read then write: two orders placed at the same moment can both
        // count as the same redemption.
        let mut code = self.find(id).await?.ok_or(DiscountsServiceError::NotFound)?;

        code.used_count = code.used_count.saturating_add(1);

        let mut patch = Row::new();
        patch.insert("used_count".to_string(), json!(code.used_count));

        self.store
            .update(
                Collection::DiscountCodes,
                vec![Filter::eq("id", id.to_string())],
                patch,
            )
            .await?;

        Span::current().record("used_count", code.used_count);

        info!(code = %code.code, "recorded discount code use");

        Ok(code)
    }

    #[tracing::instrument(
        name = "discounts.service.upsert_code",
        skip(self, code),
        fields(discount_code_id = %code.id, code = %code.code),
        err
    )]
    async fn upsert_code(&self, code: DiscountCode) -> Result<DiscountCode, DiscountsServiceError> {
        let row = to_row(&code)?;

        let stored = if self.find(code.id).await?.is_some() {
            self.store
                .update(
                    Collection::DiscountCodes,
                    vec![Filter::eq("id", code.id.to_string())],
                    row,
                )
                .await?
                .into_iter()
                .next()
                .ok_or(DiscountsServiceError::NotFound)?
        } else {
            self.store.insert(Collection::DiscountCodes, row).await?
        };

        info!("saved discount code");

        Ok(from_row(stored)?)
    }
}

#[automock]
#[async_trait]
pub trait DiscountsService: Send + Sync {
    /// Codes customers can currently redeem.
    async fn active_codes(&self) -> Result<Vec<DiscountCode>, DiscountsServiceError>;

    /// Every code, active or not.
    async fn list_codes(&self) -> Result<Vec<DiscountCode>, DiscountsServiceError>;

    /// Count one redemption of a code.
    async fn record_use(&self, id: DiscountCodeId) -> Result<DiscountCode, DiscountsServiceError>;

    /// Create a code, or replace the one with the same id.
    async fn upsert_code(&self, code: DiscountCode) -> Result<DiscountCode, DiscountsServiceError>;
}
