//! App Context

use std::sync::Arc;

use garland::settings::PricingSettings;

use crate::{
    admin::AdminService,
    auth::Auth,
    blobs::{BlobStore, StorageBlobStore, StorageConfig},
    checkout::CheckoutController,
    domain::{
        catalog::{CatalogService, StoreCatalogService},
        configuration::{ConfigurationService, StoreConfigurationService},
        discounts::{DiscountsService, StoreDiscountsService},
        inquiries::{InquiriesService, StoreInquiriesService},
        orders::{OrdersService, StoreOrdersService},
    },
    payments::{PaymentGateway, StripeConfig, StripeGateway},
    store::{DataStore, RestStore, RestStoreConfig},
};

#[derive(Clone)]
pub struct AppContext {
    pub catalog: Arc<dyn CatalogService>,
    pub discounts: Arc<dyn DiscountsService>,
    pub orders: Arc<dyn OrdersService>,
    pub configuration: Arc<dyn ConfigurationService>,
    pub inquiries: Arc<dyn InquiriesService>,
    pub auth: Arc<dyn Auth>,
    pub admin: AdminService,
    pub checkout: Arc<CheckoutController>,
}

impl AppContext {
    /// Wire every service over one data store.
    #[must_use]
    pub fn new(
        store: Arc<dyn DataStore>,
        settings: PricingSettings,
        auth: Arc<dyn Auth>,
        payments: Arc<dyn PaymentGateway>,
        blobs: Arc<dyn BlobStore>,
    ) -> Self {
        let catalog: Arc<dyn CatalogService> = Arc::new(StoreCatalogService::new(store.clone()));
        let discounts: Arc<dyn DiscountsService> =
            Arc::new(StoreDiscountsService::new(store.clone()));
        let orders: Arc<dyn OrdersService> = Arc::new(StoreOrdersService::new(store.clone()));
        let configuration: Arc<dyn ConfigurationService> =
            Arc::new(StoreConfigurationService::new(store.clone()));
        let inquiries: Arc<dyn InquiriesService> = Arc::new(StoreInquiriesService::new(store));

        let admin = AdminService::new(
            catalog.clone(),
            orders.clone(),
            discounts.clone(),
            configuration.clone(),
            blobs,
        );

        let checkout = Arc::new(CheckoutController::new(
            settings,
            configuration.clone(),
            discounts.clone(),
            orders.clone(),
            payments,
        ));

        Self {
            catalog,
            discounts,
            orders,
            configuration,
            inquiries,
            auth,
            admin,
            checkout,
        }
    }

    /// Build application context against the hosted store, storage bucket
    /// and Stripe.
    #[must_use]
    pub fn connect(
        store: RestStoreConfig,
        storage: StorageConfig,
        stripe: StripeConfig,
        settings: PricingSettings,
        auth: Arc<dyn Auth>,
    ) -> Self {
        Self::new(
            Arc::new(RestStore::new(store)),
            settings,
            auth,
            Arc::new(StripeGateway::new(stripe)),
            Arc::new(StorageBlobStore::new(storage)),
        )
    }
}
