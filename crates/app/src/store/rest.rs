//! PostgREST store client.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::Value;

use super::{Collection, DataStore, Direction, Filter, Query, Row, StoreError};

/// Configuration for connecting to a PostgREST endpoint.
#[derive(Debug, Clone)]
pub struct RestStoreConfig {
    /// Project URL, e.g. `"https://shop.example.com"`.
    pub url: String,

    /// API key sent with every request.
    pub api_key: String,
}

/// Store backed by a PostgREST HTTP API.
#[derive(Debug, Clone)]
pub struct RestStore {
    config: RestStoreConfig,
    http: Client,
}

impl RestStore {
    /// Create a new client from the given configuration.
    #[must_use]
    pub fn new(config: RestStoreConfig) -> Self {
        Self {
            config,
            http: Client::new(),
        }
    }

    fn url(&self, collection: Collection) -> String {
        format!(
            "{}/rest/v1/{}",
            self.config.url.trim_end_matches('/'),
            collection.name()
        )
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        request
            .header("apikey", &self.config.api_key)
            .bearer_auth(&self.config.api_key)
    }
}

#[async_trait]
impl DataStore for RestStore {
    async fn select(&self, query: Query) -> Result<Vec<Row>, StoreError> {
        let mut params = filter_params(&query.filters);

        if let Some(sort) = &query.sort {
            let direction = match sort.direction {
                Direction::Ascending => "asc",
                Direction::Descending => "desc",
            };

            params.push(("order".to_string(), format!("{}.{direction}", sort.column)));
        }

        if let Some(limit) = query.limit {
            params.push(("limit".to_string(), limit.to_string()));
        }

        let response = self
            .authorize(self.http.get(self.url(query.collection)))
            .query(&params)
            .send()
            .await?;

        read_rows(response).await
    }

    async fn insert(&self, collection: Collection, row: Row) -> Result<Row, StoreError> {
        let response = self
            .authorize(self.http.post(self.url(collection)))
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;

        read_rows(response)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::new("empty_response", format!("insert into {collection} returned no row")))
    }

    async fn update(
        &self,
        collection: Collection,
        filters: Vec<Filter>,
        patch: Row,
    ) -> Result<Vec<Row>, StoreError> {
        let response = self
            .authorize(self.http.patch(self.url(collection)))
            .header("Prefer", "return=representation")
            .query(&filter_params(&filters))
            .json(&patch)
            .send()
            .await?;

        read_rows(response).await
    }

    async fn delete(
        &self,
        collection: Collection,
        filters: Vec<Filter>,
    ) -> Result<u64, StoreError> {
        let response = self
            .authorize(self.http.delete(self.url(collection)))
            .header("Prefer", "return=representation")
            .query(&filter_params(&filters))
            .send()
            .await?;

        let removed = read_rows(response).await?.len();

        Ok(u64::try_from(removed).unwrap_or(u64::MAX))
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    code: Option<String>,
    message: String,
}

fn filter_params(filters: &[Filter]) -> Vec<(String, String)> {
    filters
        .iter()
        .map(|filter| (filter.column.clone(), format!("eq.{}", literal(&filter.value))))
        .collect()
}

fn literal(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

async fn read_rows(response: Response) -> Result<Vec<Row>, StoreError> {
    let status = response.status();

    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();

        return Err(match serde_json::from_str::<ErrorBody>(&text) {
            Ok(body) => StoreError::new(
                body.code.unwrap_or_else(|| status.as_str().to_string()),
                body.message,
            ),
            Err(_err) => StoreError::new(
                status.as_str(),
                format!("request failed with status {status}: {text}"),
            ),
        });
    }

    Ok(response.json().await?)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn filters_become_equality_params() {
        let params = filter_params(&[
            Filter::eq("status", "pending"),
            Filter::eq("is_active", true),
            Filter::eq("used_count", 3),
        ]);

        assert_eq!(
            params,
            vec![
                ("status".to_string(), "eq.pending".to_string()),
                ("is_active".to_string(), "eq.true".to_string()),
                ("used_count".to_string(), "eq.3".to_string()),
            ]
        );
    }

    #[test]
    fn null_filters_use_null_literal() {
        assert_eq!(literal(&json!(null)), "null");
    }

    #[test]
    fn collection_urls_ignore_trailing_slash() {
        let store = RestStore::new(RestStoreConfig {
            url: "https://shop.example.com/".to_string(),
            api_key: "anon".to_string(),
        });

        assert_eq!(
            store.url(Collection::GiftCards),
            "https://shop.example.com/rest/v1/gift_cards"
        );
    }
}
