//! HTTP notifier posting JSON events to the backend

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::{LifecycleEvent, LifecycleNotifier, NotifyError};

/// Posts each event to `<base_url>/<endpoint>`
#[derive(Debug, Clone)]
pub struct HttpNotifier {
    client: reqwest::Client,
    base_url: String,
}

impl HttpNotifier {
    /// Create a notifier with a per-request timeout
    ///
    /// # Errors
    /// Returns an error if the base URL is empty or the client cannot be built.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, NotifyError> {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(NotifyError::Config("backend URL is empty".to_string()));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, base_url })
    }

    /// Full URL of the endpoint for `event`
    #[must_use]
    pub fn url_for(&self, event: &LifecycleEvent) -> String {
        format!("{}/{}", self.base_url, event.kind.endpoint())
    }
}

#[async_trait]
impl LifecycleNotifier for HttpNotifier {
    async fn notify(&self, event: &LifecycleEvent) -> Result<(), NotifyError> {
        let url = self.url_for(event);
        debug!("POST {}", url);
        self.client
            .post(&url)
            .json(event)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}
