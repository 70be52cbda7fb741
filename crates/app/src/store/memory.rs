//! In-memory store.

use std::{cmp::Ordering, sync::Arc};

use async_trait::async_trait;
use rustc_hash::FxHashMap;
use serde_json::Value;
use tokio::sync::RwLock;

use super::{Collection, DataStore, Direction, Filter, Query, Row, StoreError, UNIQUE_VIOLATION};

/// Store that keeps every collection in memory. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<FxHashMap<Collection, Vec<Row>>>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rows without unique checks.
    pub async fn seed(&self, collection: Collection, rows: impl IntoIterator<Item = Row>) {
        self.collections
            .write()
            .await
            .entry(collection)
            .or_default()
            .extend(rows);
    }

    /// Every row in `collection`, in insertion order.
    pub async fn rows(&self, collection: Collection) -> Vec<Row> {
        self.collections
            .read()
            .await
            .get(&collection)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl DataStore for MemoryStore {
    async fn select(&self, query: Query) -> Result<Vec<Row>, StoreError> {
        let collections = self.collections.read().await;

        let mut rows: Vec<Row> = collections
            .get(&query.collection)
            .into_iter()
            .flatten()
            .filter(|row| query.filters.iter().all(|filter| filter.matches(row)))
            .cloned()
            .collect();

        if let Some(sort) = &query.sort {
            rows.sort_by(|a, b| {
                let ordering = compare(a.get(&sort.column), b.get(&sort.column));

                match sort.direction {
                    Direction::Ascending => ordering,
                    Direction::Descending => ordering.reverse(),
                }
            });
        }

        if let Some(limit) = query.limit {
            rows.truncate(limit);
        }

        Ok(rows)
    }

    async fn insert(&self, collection: Collection, row: Row) -> Result<Row, StoreError> {
        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection).or_default();

        for column in collection.unique_columns() {
            let Some(value) = row.get(*column) else {
                continue;
            };

            if rows.iter().any(|existing| existing.get(*column) == Some(value)) {
                return Err(StoreError::new(
                    UNIQUE_VIOLATION,
                    format!("duplicate key value violates unique constraint on {collection}.{column}"),
                ));
            }
        }

        rows.push(row.clone());

        Ok(row)
    }

    async fn update(
        &self,
        collection: Collection,
        filters: Vec<Filter>,
        patch: Row,
    ) -> Result<Vec<Row>, StoreError> {
        let mut collections = self.collections.write().await;

        let updated = collections
            .entry(collection)
            .or_default()
            .iter_mut()
            .filter(|row| filters.iter().all(|filter| filter.matches(row)))
            .map(|row| {
                row.extend(patch.clone());
                row.clone()
            })
            .collect();

        Ok(updated)
    }

    async fn delete(
        &self,
        collection: Collection,
        filters: Vec<Filter>,
    ) -> Result<u64, StoreError> {
        let mut collections = self.collections.write().await;
        let rows = collections.entry(collection).or_default();
        let before = rows.len();

        rows.retain(|row| !filters.iter().all(|filter| filter.matches(row)));

        Ok(u64::try_from(before - rows.len()).unwrap_or(u64::MAX))
    }
}

fn compare(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .partial_cmp(&b.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(Value::Bool(a)), Some(Value::Bool(b))) => a.cmp(b),
        (None | Some(Value::Null), Some(_)) => Ordering::Less,
        (Some(_), None | Some(Value::Null)) => Ordering::Greater,
        _ => Ordering::Equal,
    }
}
