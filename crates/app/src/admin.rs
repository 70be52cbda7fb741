//! Back-office operations.
//!
//! Every operation takes the [`AdminSession`] returned by sign-in and fails
//! once it has expired.

use std::sync::Arc;

use garland::{
    catalog::{Product, ProductId},
    delivery::DeliveryConfiguration,
    discounts::{DiscountCode, DiscountKind},
    orders::{Order, OrderId, OrderStatus},
};
use jiff::Timestamp;
use rust_decimal::Decimal;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{AdminSession, AuthError},
    blobs::{BlobError, BlobStore, MAX_UPLOAD_BYTES},
    domain::{
        catalog::{CatalogService, CatalogServiceError},
        configuration::{ConfigurationService, ConfigurationServiceError},
        discounts::{DiscountsService, DiscountsServiceError},
        orders::{OrdersService, OrdersServiceError},
    },
};

#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("Image is {size} bytes; images must be 5 MB or smaller")]
    ImageTooLarge { size: usize },

    #[error("Percentage discounts must be between 0 and 100")]
    InvalidPercentage(Decimal),

    #[error("Discount value must be greater than zero")]
    InvalidDiscountValue(Decimal),

    #[error(transparent)]
    Catalog(#[from] CatalogServiceError),

    #[error(transparent)]
    Orders(#[from] OrdersServiceError),

    #[error(transparent)]
    Discounts(#[from] DiscountsServiceError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationServiceError),

    #[error(transparent)]
    Blob(#[from] BlobError),
}

#[derive(Clone)]
pub struct AdminService {
    catalog: Arc<dyn CatalogService>,
    orders: Arc<dyn OrdersService>,
    discounts: Arc<dyn DiscountsService>,
    configuration: Arc<dyn ConfigurationService>,
    blobs: Arc<dyn BlobStore>,
}

impl AdminService {
    #[must_use]
    pub fn new(
        catalog: Arc<dyn CatalogService>,
        orders: Arc<dyn OrdersService>,
        discounts: Arc<dyn DiscountsService>,
        configuration: Arc<dyn ConfigurationService>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        Self {
            catalog,
            orders,
            discounts,
            configuration,
            blobs,
        }
    }

    pub async fn create_product(
        &self,
        session: &AdminSession,
        product: Product,
    ) -> Result<Product, AdminError> {
        session.ensure_active(Timestamp::now())?;

        Ok(self.catalog.create_product(product).await?)
    }

    pub async fn update_product(
        &self,
        session: &AdminSession,
        product: Product,
    ) -> Result<Product, AdminError> {
        session.ensure_active(Timestamp::now())?;

        Ok(self.catalog.update_product(product).await?)
    }

    pub async fn delete_product(
        &self,
        session: &AdminSession,
        product: ProductId,
    ) -> Result<(), AdminError> {
        session.ensure_active(Timestamp::now())?;

        Ok(self.catalog.delete_product(product).await?)
    }

    /// Upload an image and add it to the product's gallery.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::ImageTooLarge`] for files over 5 MB, before
    /// anything is uploaded.
    #[tracing::instrument(
        name = "admin.upload_product_image",
        skip(self, session, bytes),
        fields(size = bytes.len()),
        err
    )]
    pub async fn upload_product_image(
        &self,
        session: &AdminSession,
        product: ProductId,
        file_name: &str,
        bytes: Vec<u8>,
    ) -> Result<Product, AdminError> {
        session.ensure_active(Timestamp::now())?;

        if bytes.len() > MAX_UPLOAD_BYTES {
            return Err(AdminError::ImageTooLarge { size: bytes.len() });
        }

        let mut stored = self.catalog.get_product(product).await?;

        let name = format!("{product}/{}-{file_name}", Uuid::now_v7().simple());
        let url = self.blobs.upload(&name, bytes).await?;

        info!(%url, "uploaded product image");

        stored.images.push(url);

        Ok(self.catalog.update_product(stored).await?)
    }

    pub async fn list_orders(&self, session: &AdminSession) -> Result<Vec<Order>, AdminError> {
        session.ensure_active(Timestamp::now())?;

        Ok(self.orders.list_orders().await?)
    }

    /// Move an order one status forward.
    pub async fn update_order_status(
        &self,
        session: &AdminSession,
        order: OrderId,
        status: OrderStatus,
    ) -> Result<Order, AdminError> {
        session.ensure_active(Timestamp::now())?;

        Ok(self.orders.update_status(order, status).await?)
    }

    pub async fn upsert_discount_code(
        &self,
        session: &AdminSession,
        code: DiscountCode,
    ) -> Result<DiscountCode, AdminError> {
        session.ensure_active(Timestamp::now())?;

        if code.value <= Decimal::ZERO {
            return Err(AdminError::InvalidDiscountValue(code.value));
        }

        if code.kind == DiscountKind::Percentage && code.value > Decimal::ONE_HUNDRED {
            return Err(AdminError::InvalidPercentage(code.value));
        }

        Ok(self.discounts.upsert_code(code).await?)
    }

    pub async fn save_delivery_configuration(
        &self,
        session: &AdminSession,
        configuration: DeliveryConfiguration,
    ) -> Result<DeliveryConfiguration, AdminError> {
        session.ensure_active(Timestamp::now())?;

        Ok(self
            .configuration
            .save_delivery_configuration(configuration)
            .await?)
    }
}

#[cfg(test)]
mod tests {
    use garland::{catalog::Category, orders::OrderError};
    use jiff::SignedDuration;
    use rust_decimal_macros::dec;

    use crate::{
        blobs::{MemoryBlobStore, MockBlobStore},
        domain::{
            catalog::StoreCatalogService, configuration::StoreConfigurationService,
            discounts::StoreDiscountsService, orders::StoreOrdersService,
        },
        store::MemoryStore,
        test::helpers::{decoration_order, discount_code, product},
    };

    use super::*;

    fn admin(store: &MemoryStore, blobs: impl BlobStore + 'static) -> AdminService {
        let store: Arc<MemoryStore> = Arc::new(store.clone());

        AdminService::new(
            Arc::new(StoreCatalogService::new(store.clone())),
            Arc::new(StoreOrdersService::new(store.clone())),
            Arc::new(StoreDiscountsService::new(store.clone())),
            Arc::new(StoreConfigurationService::new(store)),
            Arc::new(blobs),
        )
    }

    fn signed_in() -> AdminSession {
        AdminSession::new("owner@example.com", Timestamp::now())
    }

    #[tokio::test]
    async fn upload_adds_image_to_product() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let blobs = MemoryBlobStore::new();
        let admin = admin(&store, blobs.clone());
        let session = signed_in();

        let wreath = admin
            .create_product(&session, product("Nordic Wreath", Category::Decorations, 45))
            .await?;

        let updated = admin
            .upload_product_image(&session, wreath.id, "wreath.jpg", vec![7; 1_024])
            .await?;

        assert_eq!(updated.images.len(), 1);
        assert!(
            updated
                .images
                .first()
                .is_some_and(|url| url.ends_with("-wreath.jpg"))
        );

        Ok(())
    }

    #[tokio::test]
    async fn oversized_image_is_rejected_before_upload() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let mut blobs = MockBlobStore::new();

        blobs.expect_upload().never();

        let admin = admin(&store, blobs);
        let session = signed_in();

        let wreath = admin
            .create_product(&session, product("Nordic Wreath", Category::Decorations, 45))
            .await?;

        let result = admin
            .upload_product_image(&session, wreath.id, "huge.png", vec![0; MAX_UPLOAD_BYTES + 1])
            .await;

        assert!(matches!(
            result,
            Err(AdminError::ImageTooLarge { size }) if size == MAX_UPLOAD_BYTES + 1
        ));

        Ok(())
    }

    #[tokio::test]
    async fn order_status_only_moves_forward() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let admin = admin(&store, MemoryBlobStore::new());
        let session = signed_in();

        let order = StoreOrdersService::new(Arc::new(store.clone()))
            .create_order(decoration_order())
            .await?;

        let confirmed = admin
            .update_order_status(&session, order.id, OrderStatus::Confirmed)
            .await?;

        assert_eq!(confirmed.status, OrderStatus::Confirmed);

        let result = admin
            .update_order_status(&session, order.id, OrderStatus::Pending)
            .await;

        assert!(matches!(
            result,
            Err(AdminError::Orders(OrdersServiceError::Status(
                OrderError::InvalidStatusTransition { .. }
            )))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn percentage_over_hundred_is_rejected() {
        let store = MemoryStore::new();
        let admin = admin(&store, MemoryBlobStore::new());

        let result = admin
            .upsert_discount_code(
                &signed_in(),
                discount_code("HALFOFF", DiscountKind::Percentage, dec!(150)),
            )
            .await;

        assert!(matches!(result, Err(AdminError::InvalidPercentage(_))));
    }

    #[tokio::test]
    async fn expired_session_is_refused() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let admin = admin(&store, MemoryBlobStore::new());

        let stale = AdminSession::new(
            "owner@example.com",
            Timestamp::now().checked_sub(SignedDuration::from_hours(9))?,
        );

        let result = admin.list_orders(&stale).await;

        assert!(matches!(
            result,
            Err(AdminError::Auth(AuthError::SessionExpired))
        ));

        Ok(())
    }

    #[tokio::test]
    async fn saved_delivery_configuration_is_listed_back() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let admin = admin(&store, MemoryBlobStore::new());

        let configuration = DeliveryConfiguration::default();

        admin
            .save_delivery_configuration(&signed_in(), configuration.clone())
            .await?;

        let active = StoreConfigurationService::new(Arc::new(store))
            .delivery_configuration()
            .await?;

        assert_eq!(active, Some(configuration));

        Ok(())
    }
}
