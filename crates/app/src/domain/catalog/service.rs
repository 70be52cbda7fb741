//! Catalog service.

use std::sync::Arc;

use async_trait::async_trait;
use garland::catalog::{Category, EventService, EventServiceId, Product, ProductId};
use mockall::automock;
use tracing::info;

use crate::{
    domain::catalog::CatalogServiceError,
    store::{Collection, DataStore, Direction, Filter, Query, from_row, from_rows, to_row, to_value},
};

#[derive(Clone)]
pub struct StoreCatalogService {
    store: Arc<dyn DataStore>,
}

impl StoreCatalogService {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl CatalogService for StoreCatalogService {
    async fn list_products(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<Product>, CatalogServiceError> {
        let mut query = Query::all(Collection::Products).order_by("title", Direction::Ascending);

        if let Some(category) = category {
            query = query.filter("category", to_value(&category)?);
        }

        Ok(from_rows(self.store.select(query).await?)?)
    }

    async fn get_product(&self, product: ProductId) -> Result<Product, CatalogServiceError> {
        let query = Query::all(Collection::Products)
            .filter("id", product.to_string())
            .limit(1);

        let row = self
            .store
            .select(query)
            .await?
            .into_iter()
            .next()
            .ok_or(CatalogServiceError::NotFound)?;

        Ok(from_row(row)?)
    }

    #[tracing::instrument(
        name = "catalog.service.create_product",
        skip(self, product),
        fields(product_id = %product.id, category = ?product.category),
        err
    )]
    async fn create_product(&self, product: Product) -> Result<Product, CatalogServiceError> {
        let row = self
            .store
            .insert(Collection::Products, to_row(&product)?)
            .await?;

        info!("created product");

        Ok(from_row(row)?)
    }

    #[tracing::instrument(
        name = "catalog.service.update_product",
        skip(self, product),
        fields(product_id = %product.id),
        err
    )]
    async fn update_product(&self, product: Product) -> Result<Product, CatalogServiceError> {
        let row = self
            .store
            .update(
                Collection::Products,
                vec![Filter::eq("id", product.id.to_string())],
                to_row(&product)?,
            )
            .await?
            .into_iter()
            .next()
            .ok_or(CatalogServiceError::NotFound)?;

        Ok(from_row(row)?)
    }

    #[tracing::instrument(name = "catalog.service.delete_product", skip(self), err)]
    async fn delete_product(&self, product: ProductId) -> Result<(), CatalogServiceError> {
        let removed = self
            .store
            .delete(
                Collection::Products,
                vec![Filter::eq("id", product.to_string())],
            )
            .await?;

        if removed == 0 {
            return Err(CatalogServiceError::NotFound);
        }

        Ok(())
    }

    async fn list_event_services(&self) -> Result<Vec<EventService>, CatalogServiceError> {
        let query = Query::all(Collection::EventsServices)
            .filter("is_active", true)
            .order_by("title", Direction::Ascending);

        Ok(from_rows(self.store.select(query).await?)?)
    }

    async fn get_event_service(
        &self,
        service: EventServiceId,
    ) -> Result<EventService, CatalogServiceError> {
        let query = Query::all(Collection::EventsServices)
            .filter("id", service.to_string())
            .limit(1);

        let row = self
            .store
            .select(query)
            .await?
            .into_iter()
            .next()
            .ok_or(CatalogServiceError::EventServiceNotFound)?;

        Ok(from_row(row)?)
    }
}

#[automock]
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// Retrieves products, optionally limited to one category.
    async fn list_products(
        &self,
        category: Option<Category>,
    ) -> Result<Vec<Product>, CatalogServiceError>;

    /// Retrieve a single product.
    async fn get_product(&self, product: ProductId) -> Result<Product, CatalogServiceError>;

    /// Create a new product.
    async fn create_product(&self, product: Product) -> Result<Product, CatalogServiceError>;

    /// Replace a product's details.
    async fn update_product(&self, product: Product) -> Result<Product, CatalogServiceError>;

    /// Delete a product.
    async fn delete_product(&self, product: ProductId) -> Result<(), CatalogServiceError>;

    /// Retrieves event services open for booking.
    async fn list_event_services(&self) -> Result<Vec<EventService>, CatalogServiceError>;

    /// Retrieve a single event service.
    async fn get_event_service(
        &self,
        service: EventServiceId,
    ) -> Result<EventService, CatalogServiceError>;
}

#[cfg(test)]
mod tests {
    use garland::prices::Price;

    use crate::{store::MemoryStore, test::helpers::product};

    use super::*;

    fn service(store: &MemoryStore) -> StoreCatalogService {
        StoreCatalogService::new(Arc::new(store.clone()))
    }

    #[tokio::test]
    async fn create_then_get_product() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let catalog = service(&store);

        let created = catalog
            .create_product(product("Nordic Wreath", Category::Decorations, 45))
            .await?;

        let fetched = catalog.get_product(created.id).await?;

        assert_eq!(fetched, created);

        Ok(())
    }

    #[tokio::test]
    async fn duplicate_product_is_rejected() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let catalog = service(&store);

        let wreath = product("Nordic Wreath", Category::Decorations, 45);
        catalog.create_product(wreath.clone()).await?;

        let result = catalog.create_product(wreath).await;

        assert!(matches!(result, Err(CatalogServiceError::AlreadyExists)));

        Ok(())
    }

    #[tokio::test]
    async fn list_products_filters_by_category() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let catalog = service(&store);

        catalog
            .create_product(product("Velvet Ribbon", Category::Ribbons, 12))
            .await?;
        catalog
            .create_product(product("Grand Tree", Category::Trees, 300))
            .await?;
        catalog
            .create_product(product("Alpine Tree", Category::Trees, 250))
            .await?;

        let trees = catalog.list_products(Some(Category::Trees)).await?;

        let titles: Vec<&str> = trees.iter().map(|tree| tree.title.as_str()).collect();

        assert_eq!(titles, ["Alpine Tree", "Grand Tree"]);

        Ok(())
    }

    #[tokio::test]
    async fn update_product_replaces_fields() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let catalog = service(&store);

        let mut wreath = catalog
            .create_product(product("Nordic Wreath", Category::Decorations, 45))
            .await?;

        wreath.price = Price::from_major(50);

        let updated = catalog.update_product(wreath).await?;

        assert_eq!(updated.price, Price::from_major(50));

        Ok(())
    }

    #[tokio::test]
    async fn delete_missing_product_is_not_found() {
        let store = MemoryStore::new();

        let result = service(&store).delete_product(ProductId::new()).await;

        assert!(matches!(result, Err(CatalogServiceError::NotFound)));
    }
}
