//! Configuration service.

use std::sync::Arc;

use async_trait::async_trait;
use garland::{delivery::DeliveryConfiguration, pricing::TimingSurcharge};
use jiff::Timestamp;
use mockall::automock;
use serde_json::json;
use tracing::info;

use crate::{
    domain::configuration::{
        ConfigurationServiceError,
        records::{DeliveryConfigurationId, DeliveryConfigurationRecord},
    },
    store::{Collection, DataStore, Direction, Filter, Query, Row, from_row, from_rows, to_row},
};

#[derive(Clone)]
pub struct StoreConfigurationService {
    store: Arc<dyn DataStore>,
}

impl StoreConfigurationService {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl ConfigurationService for StoreConfigurationService {
    async fn delivery_configuration(
        &self,
    ) -> Result<Option<DeliveryConfiguration>, ConfigurationServiceError> {
        let query = Query::all(Collection::DeliveryConfigurations)
            .filter("is_active", true)
            .order_by("updated_at", Direction::Descending)
            .limit(1);

        let Some(row) = self.store.select(query).await?.into_iter().next() else {
            return Ok(None);
        };

        let record: DeliveryConfigurationRecord = from_row(row)?;

        Ok(Some(record.configuration))
    }

    #[tracing::instrument(
        name = "configuration.service.save_delivery_configuration",
        skip(self, configuration),
        fields(model = %configuration.model, zones = configuration.zones.len()),
        err
    )]
    async fn save_delivery_configuration(
        &self,
        configuration: DeliveryConfiguration,
    ) -> Result<DeliveryConfiguration, ConfigurationServiceError> {
        let mut retire = Row::new();
        retire.insert("is_active".to_string(), json!(false));

        self.store
            .update(
                Collection::DeliveryConfigurations,
                vec![Filter::eq("is_active", true)],
                retire,
            )
            .await?;

        let record = DeliveryConfigurationRecord {
            id: DeliveryConfigurationId::new(),
            configuration,
            is_active: true,
            updated_at: Timestamp::now(),
        };

        let row = self
            .store
            .insert(Collection::DeliveryConfigurations, to_row(&record)?)
            .await?;

        info!(delivery_configuration_id = %record.id, "saved delivery configuration");

        let saved: DeliveryConfigurationRecord = from_row(row)?;

        Ok(saved.configuration)
    }

    async fn timing_surcharges(&self) -> Result<Vec<TimingSurcharge>, ConfigurationServiceError> {
        let query = Query::all(Collection::TimingSurcharges).filter("is_active", true);

        Ok(from_rows(self.store.select(query).await?)?)
    }
}

#[automock]
#[async_trait]
pub trait ConfigurationService: Send + Sync {
    /// The active delivery configuration, if one has been saved.
    async fn delivery_configuration(
        &self,
    ) -> Result<Option<DeliveryConfiguration>, ConfigurationServiceError>;

    /// Save a new active delivery configuration, retiring the previous one.
    async fn save_delivery_configuration(
        &self,
        configuration: DeliveryConfiguration,
    ) -> Result<DeliveryConfiguration, ConfigurationServiceError>;

    /// Weekend and holiday surcharge rules in effect.
    async fn timing_surcharges(&self) -> Result<Vec<TimingSurcharge>, ConfigurationServiceError>;
}
