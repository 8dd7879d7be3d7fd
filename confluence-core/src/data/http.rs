//! Shared blocking HTTP client.

use super::provider::DataError;
use serde::de::DeserializeOwned;
use std::time::Duration;

const USER_AGENT: &str = concat!("confluence/", env!("CARGO_PKG_VERSION"));

/// Thin wrapper over a pooled `reqwest` blocking client. Cloning shares the
/// connection pool.
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: reqwest::blocking::Client,
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpClient {
    pub fn new() -> Self {
        let client = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .expect("failed to build HTTP client");
        Self { client }
    }

    /// GET `url` and decode the JSON body. Non-2xx statuses are errors.
    pub fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        timeout: Duration,
    ) -> Result<T, DataError> {
        tracing::debug!(url, ?timeout, "GET");
        let resp = self.client.get(url).timeout(timeout).send()?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(DataError::Http(format!("rate limited ({status})")));
        }
        if !status.is_success() {
            return Err(DataError::Http(format!("HTTP {status}")));
        }

        resp.json::<T>()
            .map_err(|e| DataError::Decode(format!("{url}: {e}")))
    }
}
