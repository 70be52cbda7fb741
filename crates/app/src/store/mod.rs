//! Data store.
//!
//! Every record lives in a named [`Collection`] as a JSON object. Services
//! read and write typed records through [`to_row`] and [`from_row`] and never
//! see how the store holds them.

use std::fmt::{Display, Formatter, Result as FmtResult};

use async_trait::async_trait;
use mockall::automock;
use serde::{Serialize, de::DeserializeOwned};
use serde_json::{Map, Value};
use thiserror::Error;

pub mod memory;
pub mod rest;

pub use memory::MemoryStore;
pub use rest::{RestStore, RestStoreConfig};

/// A stored record.
pub type Row = Map<String, Value>;

/// Error code for a write that breaks a unique key.
pub const UNIQUE_VIOLATION: &str = "23505";

/// Error code for a row that does not fit the record it is read into.
pub const INVALID_ROW: &str = "invalid_row";

/// Named collections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Products,
    Orders,
    GiftCards,
    DiscountCodes,
    DeliveryConfigurations,
    TimingSurcharges,
    Inquiries,
    EventsServices,
}

impl Collection {
    /// Collection name as the store knows it.
    pub const fn name(self) -> &'static str {
        match self {
            Collection::Products => "products",
            Collection::Orders => "orders",
            Collection::GiftCards => "gift_cards",
            Collection::DiscountCodes => "discount_codes",
            Collection::DeliveryConfigurations => "delivery_configurations",
            Collection::TimingSurcharges => "timing_surcharges",
            Collection::Inquiries => "inquiries",
            Collection::EventsServices => "events_services",
        }
    }

    /// Columns no two rows may share.
    pub const fn unique_columns(self) -> &'static [&'static str] {
        match self {
            Collection::Orders => &["id", "order_number"],
            Collection::DiscountCodes => &["id", "code"],
            Collection::Products
            | Collection::GiftCards
            | Collection::DeliveryConfigurations
            | Collection::TimingSurcharges
            | Collection::Inquiries
            | Collection::EventsServices => &["id"],
        }
    }
}

impl Display for Collection {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.name())
    }
}

/// Column equality filter.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub column: String,
    pub value: Value,
}

impl Filter {
    pub fn eq(column: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            value: value.into(),
        }
    }

    /// Whether `row` passes this filter.
    pub fn matches(&self, row: &Row) -> bool {
        row.get(&self.column) == Some(&self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// Result ordering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub column: String,
    pub direction: Direction,
}

/// A read against one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    pub collection: Collection,
    pub filters: Vec<Filter>,
    pub sort: Option<Sort>,
    pub limit: Option<usize>,
}

impl Query {
    /// Every row of `collection`.
    pub fn all(collection: Collection) -> Self {
        Self {
            collection,
            filters: Vec::new(),
            sort: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::eq(column, value));
        self
    }

    #[must_use]
    pub fn order_by(mut self, column: impl Into<String>, direction: Direction) -> Self {
        self.sort = Some(Sort {
            column: column.into(),
            direction,
        });
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Failure reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} ({code})")]
pub struct StoreError {
    pub code: String,
    pub message: String,
}

impl StoreError {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Whether the write clashed with an existing row.
    pub fn is_unique_violation(&self) -> bool {
        self.code == UNIQUE_VIOLATION
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        let code = error
            .status()
            .map_or_else(|| "transport".to_string(), |status| status.as_str().to_string());

        Self::new(code, error.to_string())
    }
}

#[automock]
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Rows matching `query`.
    async fn select(&self, query: Query) -> Result<Vec<Row>, StoreError>;

    /// Insert a row, returning it as stored.
    async fn insert(&self, collection: Collection, row: Row) -> Result<Row, StoreError>;

    /// Merge `patch` into every matching row, returning the updated rows.
    async fn update(
        &self,
        collection: Collection,
        filters: Vec<Filter>,
        patch: Row,
    ) -> Result<Vec<Row>, StoreError>;

    /// Delete every matching row, returning how many were removed.
    async fn delete(&self, collection: Collection, filters: Vec<Filter>)
    -> Result<u64, StoreError>;
}

/// Serialize a record into a row.
///
/// # Errors
///
/// Returns an [`INVALID_ROW`] error unless the record serializes to an object.
pub fn to_row<T: Serialize>(record: &T) -> Result<Row, StoreError> {
    match serde_json::to_value(record) {
        Ok(Value::Object(row)) => Ok(row),
        Ok(_) => Err(StoreError::new(INVALID_ROW, "record is not an object")),
        Err(error) => Err(StoreError::new(INVALID_ROW, error.to_string())),
    }
}

/// Serialize a single column value.
///
/// # Errors
///
/// Returns an [`INVALID_ROW`] error if the value cannot be serialized.
pub fn to_value<T: Serialize>(value: &T) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|error| StoreError::new(INVALID_ROW, error.to_string()))
}

/// Deserialize a row into a record.
///
/// # Errors
///
/// Returns an [`INVALID_ROW`] error if the row does not fit `T`.
pub fn from_row<T: DeserializeOwned>(row: Row) -> Result<T, StoreError> {
    serde_json::from_value(Value::Object(row))
        .map_err(|error| StoreError::new(INVALID_ROW, error.to_string()))
}

/// Deserialize every row.
///
/// # Errors
///
/// Returns the first row that does not fit `T`.
pub fn from_rows<T: DeserializeOwned>(rows: Vec<Row>) -> Result<Vec<T>, StoreError> {
    rows.into_iter().map(from_row).collect()
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;
    use serde_json::json;

    use super::*;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Wreath {
        id: String,
        price: u64,
    }

    #[test]
    fn rows_round_trip_records() -> anyhow::Result<()> {
        let wreath = Wreath {
            id: "w1".to_string(),
            price: 4_500,
        };

        let row = to_row(&wreath)?;

        assert_eq!(row.get("price"), Some(&json!(4_500)));
        assert_eq!(from_row::<Wreath>(row)?, wreath);

        Ok(())
    }

    #[test]
    fn to_row_rejects_non_objects() {
        let result = to_row(&42);

        assert!(matches!(result, Err(error) if error.code == INVALID_ROW));
    }

    #[test]
    fn from_row_reports_missing_columns() {
        let mut row = Row::new();
        row.insert("id".to_string(), json!("w1"));

        let result = from_row::<Wreath>(row);

        assert!(matches!(result, Err(error) if error.code == INVALID_ROW));
    }

    #[test]
    fn query_builder_collects_clauses() {
        let query = Query::all(Collection::Orders)
            .filter("status", "pending")
            .order_by("created_at", Direction::Descending)
            .limit(5);

        assert_eq!(query.filters, vec![Filter::eq("status", "pending")]);
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.collection.to_string(), "orders");
    }
}
