//! HTTP implementation of [`RosterFetcher`].
//!
//! Issues `GET <roster_url>` and expects a body of the form
//! `{"connectedUsers": ["alice", "bobby"]}`.  The body is decoded with the
//! same codec as the `connected-users` push frame.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use chat_core::protocol::codec::decode_roster_response;

use crate::application::roster::{FetchError, RosterFetcher};

/// Roster fetcher backed by a shared `reqwest` client.
#[derive(Debug, Clone)]
pub struct HttpRosterFetcher {
    client: Client,
    url: String,
    timeout: Duration,
}

impl HttpRosterFetcher {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            url: url.into(),
            timeout,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl RosterFetcher for HttpRosterFetcher {
    async fn fetch_roster(&self) -> Result<Vec<String>, FetchError> {
        let response = self
            .client
            .get(&self.url)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadResponse(format!("HTTP {status}")));
        }

        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Unreachable(e.to_string()))?;

        let users =
            decode_roster_response(&body).map_err(|e| FetchError::BadResponse(e.to_string()))?;
        debug!("fetched roster of {} users from {}", users.len(), self.url);
        Ok(users)
    }
}
