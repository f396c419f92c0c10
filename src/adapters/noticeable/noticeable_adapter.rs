//! Noticeable source system adapter.
//!
//! Reads email subscriptions over the Noticeable GraphQL API, authenticated
//! with `Authorization: Apikey <key>`. Subscriptions are paged by cursor.

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};

use super::wire_types::{
    GraphQlRequest, GraphQlResponse, SubscriptionData, SubscriptionsData, SUBSCRIPTIONS_QUERY,
    SUBSCRIPTION_QUERY,
};
use crate::domain::subscriber::SubscriberIdentity;
use crate::ports::{SourceError, SourceSystemClient};

pub const DEFAULT_GRAPHQL_ENDPOINT: &str = "https://api.noticeable.io/graphql";

/// Noticeable API configuration.
#[derive(Debug, Clone)]
pub struct NoticeableConfig {
    api_key: SecretString,
    project_id: String,
    endpoint: String,
    page_size: usize,
    request_timeout: Duration,
}

impl NoticeableConfig {
    pub fn new(api_key: SecretString, project_id: impl Into<String>) -> Self {
        Self {
            api_key,
            project_id: project_id.into(),
            endpoint: DEFAULT_GRAPHQL_ENDPOINT.to_string(),
            page_size: 100,
            request_timeout: Duration::from_secs(30),
        }
    }

    /// Set a custom GraphQL endpoint (for testing).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Noticeable GraphQL client.
pub struct NoticeableClient {
    config: NoticeableConfig,
    http_client: reqwest::Client,
}

impl NoticeableClient {
    pub fn new(config: NoticeableConfig) -> Result<Self, SourceError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| SourceError::Network(e.to_string()))?;
        Ok(Self {
            config,
            http_client,
        })
    }

    async fn query<T: DeserializeOwned>(
        &self,
        query: &str,
        variables: serde_json::Value,
    ) -> Result<T, SourceError> {
        let response = self
            .http_client
            .post(&self.config.endpoint)
            .header(
                reqwest::header::AUTHORIZATION,
                format!("Apikey {}", self.config.api_key.expose_secret()),
            )
            .json(&GraphQlRequest { query, variables })
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), error = %body, "Noticeable request failed");
            return Err(SourceError::Http {
                status: status.as_u16(),
                body,
            });
        }

        let payload: GraphQlResponse<T> = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;

        if !payload.errors.is_empty() {
            let messages: Vec<String> = payload.errors.into_iter().map(|e| e.message).collect();
            return Err(SourceError::Query(messages.join("; ")));
        }
        payload
            .data
            .ok_or_else(|| SourceError::Decode("response carried no data".to_string()))
    }
}

#[async_trait]
impl SourceSystemClient for NoticeableClient {
    #[instrument(skip(self), fields(project_id = %self.config.project_id))]
    async fn list_subscribers(&self) -> Result<Vec<SubscriberIdentity>, SourceError> {
        let mut subscribers = Vec::new();
        let mut after: Option<String> = None;

        loop {
            let data: SubscriptionsData = self
                .query(
                    SUBSCRIPTIONS_QUERY,
                    json!({
                        "projectId": self.config.project_id,
                        "first": self.config.page_size,
                        "after": after,
                    }),
                )
                .await?;

            let connection = data.email_subscriptions;
            debug!(
                count = connection.edges.len(),
                has_next_page = connection.page_info.has_next_page,
                "Fetched subscription page"
            );
            subscribers.extend(connection.edges.into_iter().map(|e| SubscriberIdentity::from(e.node)));

            if !connection.page_info.has_next_page {
                break;
            }
            match connection.page_info.end_cursor {
                Some(cursor) if after.as_deref() != Some(cursor.as_str()) => after = Some(cursor),
                _ => {
                    return Err(SourceError::Decode(
                        "hasNextPage set without a new endCursor".to_string(),
                    ))
                }
            }
        }

        Ok(subscribers)
    }

    #[instrument(skip(self))]
    async fn get_subscriber(&self, email: &str) -> Result<Option<SubscriberIdentity>, SourceError> {
        let data: SubscriptionData = self
            .query(
                SUBSCRIPTION_QUERY,
                json!({ "projectId": self.config.project_id, "email": email }),
            )
            .await?;
        Ok(data.email_subscription.map(SubscriberIdentity::from))
    }
}
