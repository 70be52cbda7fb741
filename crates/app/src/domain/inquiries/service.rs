//! Inquiries service.

use std::sync::Arc;

use async_trait::async_trait;
use jiff::Timestamp;
use mockall::automock;
use tracing::info;

use crate::{
    domain::inquiries::{
        InquiriesServiceError,
        records::{Inquiry, InquiryId, NewInquiry},
    },
    store::{Collection, DataStore, Direction, Query, from_row, from_rows, to_row},
};

#[derive(Clone)]
pub struct StoreInquiriesService {
    store: Arc<dyn DataStore>,
}

impl StoreInquiriesService {
    #[must_use]
    pub fn new(store: Arc<dyn DataStore>) -> Self {
        Self { store }
    }
}

fn required(value: &str, field: &'static str) -> Result<String, InquiriesServiceError> {
    let value = value.trim();

    if value.is_empty() {
        return Err(InquiriesServiceError::MissingField(field));
    }

    Ok(value.to_string())
}

#[async_trait]
impl InquiriesService for StoreInquiriesService {
    #[tracing::instrument(
        name = "inquiries.service.submit",
        skip(self, inquiry),
        fields(event_service_id = ?inquiry.event_service_id),
        err
    )]
    async fn submit(&self, inquiry: NewInquiry) -> Result<Inquiry, InquiriesServiceError> {
        let name = required(&inquiry.name, "name")?;
        let email = required(&inquiry.email, "email")?;
        let message = required(&inquiry.message, "message")?;

        if !email.contains('@') {
            return Err(InquiriesServiceError::InvalidEmail);
        }

        let record = Inquiry {
            id: InquiryId::new(),
            name,
            email,
            phone: inquiry
                .phone
                .map(|phone| phone.trim().to_string())
                .filter(|phone| !phone.is_empty()),
            message,
            event_service_id: inquiry.event_service_id,
            created_at: Timestamp::now(),
        };

        let row = self
            .store
            .insert(Collection::Inquiries, to_row(&record)?)
            .await?;

        info!(inquiry_id = %record.id, "received inquiry");

        Ok(from_row(row)?)
    }

    async fn list_inquiries(&self) -> Result<Vec<Inquiry>, InquiriesServiceError> {
        let query = Query::all(Collection::Inquiries).order_by("created_at", Direction::Descending);

        Ok(from_rows(self.store.select(query).await?)?)
    }
}

#[automock]
#[async_trait]
pub trait InquiriesService: Send + Sync {
    /// Validate and store an inquiry.
    async fn submit(&self, inquiry: NewInquiry) -> Result<Inquiry, InquiriesServiceError>;

    /// Retrieve every inquiry, newest first.
    async fn list_inquiries(&self) -> Result<Vec<Inquiry>, InquiriesServiceError>;
}

#[cfg(test)]
mod tests {
    use garland::catalog::EventServiceId;

    use crate::store::MemoryStore;

    use super::*;

    fn inquiry() -> NewInquiry {
        NewInquiry {
            name: " Holly ".to_string(),
            email: "holly@example.com".to_string(),
            phone: Some("  ".to_string()),
            message: "Can you dress the lobby tree on the 1st?".to_string(),
            event_service_id: Some(EventServiceId::new()),
        }
    }

    #[tokio::test]
    async fn submit_stores_trimmed_inquiry() -> anyhow::Result<()> {
        let store = MemoryStore::new();
        let inquiries = StoreInquiriesService::new(Arc::new(store.clone()));

        let stored = inquiries.submit(inquiry()).await?;

        assert_eq!(stored.name, "Holly");
        assert_eq!(stored.phone, None);
        assert_eq!(inquiries.list_inquiries().await?, vec![stored]);

        Ok(())
    }

    #[tokio::test]
    async fn submit_requires_message() {
        let store = MemoryStore::new();
        let inquiries = StoreInquiriesService::new(Arc::new(store));

        let result = inquiries
            .submit(NewInquiry {
                message: String::new(),
                ..inquiry()
            })
            .await;

        assert!(matches!(result, Err(InquiriesServiceError::MissingField("message"))));
    }

    #[tokio::test]
    async fn submit_rejects_bad_email() {
        let store = MemoryStore::new();
        let inquiries = StoreInquiriesService::new(Arc::new(store));

        let result = inquiries
            .submit(NewInquiry {
                email: "holly.example.com".to_string(),
                ..inquiry()
            })
            .await;

        assert!(matches!(result, Err(InquiriesServiceError::InvalidEmail)));
    }
}
