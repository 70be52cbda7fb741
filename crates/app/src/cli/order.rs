use std::sync::Arc;

use clap::{Args, ValueEnum};
use garland::orders::{OrderId, OrderStatus};
use garland_app::{
    admin::AdminService,
    auth::{Auth, StaticAuth},
    blobs::StorageBlobStore,
    config::{AdminArgs, StoreArgs},
    domain::{
        catalog::StoreCatalogService, configuration::StoreConfigurationService,
        discounts::StoreDiscountsService, orders::StoreOrdersService,
    },
    store::{DataStore, RestStore},
};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Status {
    Confirmed,
    Delivered,
    Completed,
}

impl From<Status> for OrderStatus {
    fn from(status: Status) -> Self {
        match status {
            Status::Confirmed => OrderStatus::Confirmed,
            Status::Delivered => OrderStatus::Delivered,
            Status::Completed => OrderStatus::Completed,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct SetOrderStatusArgs {
    #[command(flatten)]
    store: StoreArgs,

    #[command(flatten)]
    admin: AdminArgs,

    /// Storage bucket for product images
    #[arg(long, env = "STORAGE_BUCKET", default_value = "product-images")]
    bucket: String,

    /// Order id
    order_id: Uuid,

    /// Status to move the order to
    #[arg(value_enum)]
    status: Status,
}

pub(crate) async fn run(args: SetOrderStatusArgs) -> Result<(), String> {
    let auth = StaticAuth::new(&args.admin.admin_email, &args.admin.admin_password);

    let session = auth
        .sign_in(&args.admin.admin_email, &args.admin.admin_password)
        .await
        .map_err(|error| format!("failed to sign in: {error}"))?;

    let store: Arc<dyn DataStore> = Arc::new(RestStore::new(args.store.rest_config()));

    let admin = AdminService::new(
        Arc::new(StoreCatalogService::new(store.clone())),
        Arc::new(StoreOrdersService::new(store.clone())),
        Arc::new(StoreDiscountsService::new(store.clone())),
        Arc::new(StoreConfigurationService::new(store)),
        Arc::new(StorageBlobStore::new(args.store.storage_config(&args.bucket))),
    );

    let order = admin
        .update_order_status(&session, OrderId::from(args.order_id), args.status.into())
        .await
        .map_err(|error| format!("failed to update order: {error}"))?;

    println!("order_number: {}", order.order_number);
    println!("status: {:?}", order.status);

    Ok(())
}
