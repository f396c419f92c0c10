//! Mock source system for testing.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::subscriber::SubscriberIdentity;
use crate::ports::{SourceError, SourceSystemClient};

/// In-memory subscriber base.
#[derive(Clone, Default)]
pub struct MockSourceSystem {
    inner: Arc<Mutex<MockState>>,
}

#[derive(Default)]
struct MockState {
    subscribers: Vec<SubscriberIdentity>,
    error: Option<SourceError>,
    list_calls: usize,
    lookups: Vec<String>,
    latency: Option<Duration>,
}

impl MockSourceSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_subscribers(subscribers: Vec<SubscriberIdentity>) -> Self {
        let mock = Self::new();
        mock.inner.lock().unwrap().subscribers = subscribers;
        mock
    }

    pub fn add_subscriber(&self, subscriber: SubscriberIdentity) {
        self.inner.lock().unwrap().subscribers.push(subscriber);
    }

    /// Fail every call until cleared.
    pub fn set_error(&self, error: SourceError) {
        self.inner.lock().unwrap().error = Some(error);
    }

    pub fn clear_error(&self) {
        self.inner.lock().unwrap().error = None;
    }

    /// Delay every call by `latency` before answering.
    pub fn set_latency(&self, latency: Duration) {
        self.inner.lock().unwrap().latency = Some(latency);
    }

    pub fn list_calls(&self) -> usize {
        self.inner.lock().unwrap().list_calls
    }

    /// Emails passed to `get_subscriber`, in call order.
    pub fn lookups(&self) -> Vec<String> {
        self.inner.lock().unwrap().lookups.clone()
    }

    async fn wait(&self) {
        let latency = self.inner.lock().unwrap().latency;
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }
}

#[async_trait]
impl SourceSystemClient for MockSourceSystem {
    async fn list_subscribers(&self) -> Result<Vec<SubscriberIdentity>, SourceError> {
        self.wait().await;
        let mut state = self.inner.lock().unwrap();
        state.list_calls += 1;
        if let Some(error) = &state.error {
            return Err(error.clone());
        }
        Ok(state.subscribers.clone())
    }

    async fn get_subscriber(&self, email: &str) -> Result<Option<SubscriberIdentity>, SourceError> {
        self.wait().await;
        let mut state = self.inner.lock().unwrap();
        state.lookups.push(email.to_string());
        if let Some(error) = &state.error {
            return Err(error.clone());
        }
        Ok(state
            .subscribers
            .iter()
            .find(|s| s.email.eq_ignore_ascii_case(email))
            .cloned())
    }
}
