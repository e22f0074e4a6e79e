//! Authenticated session against the Ring cloud API
//!
//! [`RingSession`] wraps a [`reqwest::Client`] and exposes the three
//! operations the tool needs: the OAuth token exchange, the paged history
//! listing, and the recording download. The downloader consumes sessions
//! through the [`RecordingSource`] trait so tests can substitute scripted
//! fakes for the network.

use async_trait::async_trait;
use chrono::{Local, NaiveDateTime};
use futures::StreamExt;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{Error, Result};
use crate::history::HistoryItem;

/// Default OAuth token endpoint
pub const DEFAULT_OAUTH_URL: &str = "https://oauth.ring.com/oauth/token";

/// Default API base URL
pub const DEFAULT_API_BASE: &str = "https://api.ring.com/";

/// OAuth client id the service hands tokens to
const OAUTH_CLIENT_ID: &str = "ring_official_android";

/// User agent sent on every request
const USER_AGENT: &str = concat!("ring-dl/", env!("CARGO_PKG_VERSION"));

/// History items fetched per page
const DEFAULT_HISTORY_PAGE_LIMIT: usize = 50;

/// Where the downloader gets recording bytes from.
///
/// The one seam the orchestrator needs: materialize the recording for an
/// item at a local path. [`RingSession`] is the production implementation;
/// tests plug in scripted sources.
#[async_trait]
pub trait RecordingSource {
    /// Download the recording for `item`, writing it to `dest`.
    ///
    /// Returns the number of bytes written. Any previous content at `dest`
    /// (for instance a partial write from a failed attempt) is overwritten.
    async fn fetch_recording(&self, item: &HistoryItem, dest: &Path) -> Result<u64>;
}

/// An authenticated channel to the Ring service
pub struct RingSession {
    client: reqwest::Client,
    username: String,
    password: String,
    oauth_url: Url,
    api_base: Url,
    history_page_limit: usize,
    access_token: Option<String>,
}

#[derive(Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    grant_type: &'a str,
    username: &'a str,
    password: &'a str,
    scope: &'a str,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl RingSession {
    /// Create a session for the given account against the production
    /// endpoints. No network activity happens until [`authenticate`] is
    /// called.
    ///
    /// [`authenticate`]: RingSession::authenticate
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            client,
            username: username.into(),
            password: password.into(),
            oauth_url: Url::parse(DEFAULT_OAUTH_URL)?,
            api_base: Url::parse(DEFAULT_API_BASE)?,
            history_page_limit: DEFAULT_HISTORY_PAGE_LIMIT,
            access_token: None,
        })
    }

    /// Point the session at different endpoints (used by tests against a
    /// local mock server)
    pub fn with_endpoints(mut self, oauth_url: Url, api_base: Url) -> Self {
        self.oauth_url = oauth_url;
        self.api_base = api_base;
        self
    }

    /// Override the history page size
    pub fn with_history_page_limit(mut self, limit: usize) -> Self {
        self.history_page_limit = limit.max(1);
        self
    }

    /// Exchange the account credentials for an access token.
    ///
    /// Any failure here is fatal to the run: an error response from the
    /// token endpoint becomes [`Error::Authentication`], and transport
    /// errors keep their own class.
    pub async fn authenticate(&mut self) -> Result<()> {
        let request = TokenRequest {
            client_id: OAUTH_CLIENT_ID,
            grant_type: "password",
            username: &self.username,
            password: &self.password,
            scope: "client",
        };
        let response = self
            .client
            .post(self.oauth_url.clone())
            .json(&request)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Authentication(format!(
                "token endpoint returned {status}: {body}"
            )));
        }
        let token: TokenResponse = response.json().await?;
        tracing::debug!("access token acquired");
        self.access_token = Some(token.access_token);
        Ok(())
    }

    /// Retrieve the event history between `start` and `end`.
    ///
    /// `end` of `None` means "now" at the moment of this call. The service
    /// returns newest-first pages; this walks backwards with `older_than`
    /// until it passes `start`, then keeps the items inside the window.
    /// Items without a capture timestamp are kept (they cannot be
    /// window-filtered and are reported as skipped downstream). This call is
    /// not retried.
    pub async fn history(
        &self,
        start: NaiveDateTime,
        end: Option<NaiveDateTime>,
    ) -> Result<Vec<HistoryItem>> {
        let end = end.unwrap_or_else(|| Local::now().naive_local());
        let url = self.api_base.join("clients_api/doorbots/history")?;
        let token = self.token()?;

        let mut collected: Vec<HistoryItem> = Vec::new();
        let mut older_than: Option<i64> = None;

        loop {
            let mut request = self
                .client
                .get(url.clone())
                .bearer_auth(token)
                .query(&[("limit", self.history_page_limit.to_string())]);
            if let Some(last_id) = older_than {
                request = request.query(&[("older_than", last_id.to_string())]);
            }
            let response = request.send().await?;
            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.ok().filter(|b| !b.is_empty());
                return Err(Error::Remote {
                    status: status.as_u16(),
                    body,
                });
            }
            let page: Vec<HistoryItem> = response.json().await?;
            if page.is_empty() {
                break;
            }

            let page_len = page.len();
            let oldest_id = page.last().map(|item| item.id.get());
            let passed_start = page
                .iter()
                .filter_map(|item| item.created_at)
                .any(|ts| ts < start);
            collected.extend(page);

            if passed_start || page_len < self.history_page_limit {
                break;
            }
            if oldest_id == older_than {
                // Service repeated the page; stop rather than loop forever
                tracing::warn!(?older_than, "history pagination did not advance");
                break;
            }
            older_than = oldest_id;
        }

        collected.retain(|item| {
            item.created_at
                .is_none_or(|ts| ts >= start && ts <= end)
        });
        tracing::debug!(items = collected.len(), %start, %end, "history window resolved");
        Ok(collected)
    }

    fn token(&self) -> Result<&str> {
        self.access_token.as_deref().ok_or_else(|| {
            Error::Authentication("no access token; call authenticate() first".to_string())
        })
    }
}

#[async_trait]
impl RecordingSource for RingSession {
    async fn fetch_recording(&self, item: &HistoryItem, dest: &Path) -> Result<u64> {
        let url = self
            .api_base
            .join(&format!("clients_api/dings/{}/recording", item.id))?;
        let token = self.token()?;

        let response = self.client.get(url).bearer_auth(token).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.ok().filter(|b| !b.is_empty());
            return Err(Error::Remote {
                status: status.as_u16(),
                body,
            });
        }

        // create() truncates, so a partial write from a failed attempt is
        // replaced rather than appended to
        let mut file = tokio::fs::File::create(dest).await?;
        let mut stream = response.bytes_stream();
        let mut written: u64 = 0;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            file.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }
        file.flush().await?;
        tracing::debug!(id = %item.id, bytes = written, "recording written");
        Ok(written)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_has_no_token() {
        let session = RingSession::new("user", "pass").unwrap();
        assert!(session.token().is_err());
    }

    #[tokio::test]
    async fn history_without_token_fails_before_any_request() {
        let session = RingSession::new("user", "pass").unwrap();
        let start = chrono::NaiveDate::from_ymd_opt(2019, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let err = session.history(start, None).await.unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[test]
    fn page_limit_is_clamped_to_at_least_one() {
        let session = RingSession::new("user", "pass")
            .unwrap()
            .with_history_page_limit(0);
        assert_eq!(session.history_page_limit, 1);
    }
}
