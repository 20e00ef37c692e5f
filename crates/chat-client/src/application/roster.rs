//! Roster query seam.
//!
//! Besides the `connected-users` push frames, the client can ask the server
//! for the current list of connected usernames with a one-shot request.  The
//! HTTP implementation lives in `infrastructure::http_roster`; tests use the
//! `mockall`-generated `MockRosterFetcher`.

use async_trait::async_trait;
use thiserror::Error;

/// Why a roster query failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The endpoint could not be reached (DNS, connect, timeout).
    #[error("roster endpoint unreachable: {0}")]
    Unreachable(String),

    /// The endpoint answered, but not with a usable roster.
    #[error("roster endpoint returned an unusable response: {0}")]
    BadResponse(String),
}

/// Fetches the current list of connected usernames.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RosterFetcher: Send + Sync {
    /// Returns the usernames in server order.
    async fn fetch_roster(&self) -> Result<Vec<String>, FetchError>;
}
