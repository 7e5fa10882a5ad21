// src/sync/upstream.rs
//! HTTP access to the paginated Launch Library feed.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use serde_json::Value;

use crate::model::{Page, ResourceKind};

const USER_AGENT: &str = "spaceflight-news-api/0.1 (launch library sync)";

/// Why a page could not be fetched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageError {
    /// HTTP 401: the credential is stale; retrying cannot help.
    Unauthorized,
    /// Network failure, timeout, non-success status or undecodable body.
    Transient(String),
}

/// One page fetch. Records stay raw JSON so a single malformed record can be
/// skipped without losing the rest of the page.
#[async_trait]
pub trait FeedSource: Send + Sync {
    fn first_page_url(&self, kind: ResourceKind, page_size: u32) -> String;
    async fn fetch_page(&self, url: &str) -> Result<Page<Value>, PageError>;
}

pub struct UpstreamClient {
    http: Client,
    base_url: String,
    token: Option<String>,
}

impl UpstreamClient {
    pub fn new(base_url: &str, token: Option<String>, timeout: Duration) -> reqwest::Result<Self> {
        let http = Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(Duration::from_secs(5))
            .timeout(timeout)
            .build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.filter(|t| !t.trim().is_empty()),
        })
    }
}

#[async_trait]
impl FeedSource for UpstreamClient {
    fn first_page_url(&self, kind: ResourceKind, page_size: u32) -> String {
        format!("{}/{}?limit={}", self.base_url, kind.path(), page_size)
    }

    async fn fetch_page(&self, url: &str) -> Result<Page<Value>, PageError> {
        let mut req = self.http.get(url);
        if let Some(token) = &self.token {
            req = req.header(header::AUTHORIZATION, format!("Token {token}"));
        }

        let resp = req
            .send()
            .await
            .map_err(|e| PageError::Transient(e.to_string()))?;

        match resp.status() {
            StatusCode::UNAUTHORIZED => return Err(PageError::Unauthorized),
            s if !s.is_success() => return Err(PageError::Transient(format!("HTTP {s}"))),
            _ => {}
        }

        resp.json::<Page<Value>>()
            .await
            .map_err(|e| PageError::Transient(format!("decoding page: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_url_joins_base_and_kind() {
        let c = UpstreamClient::new(
            "https://ll.thespacedevs.com/2.2.0/",
            Some("abc".into()),
            Duration::from_secs(10),
        )
        .unwrap();
        assert_eq!(
            c.first_page_url(ResourceKind::Launch, 100),
            "https://ll.thespacedevs.com/2.2.0/launch?limit=100"
        );
        assert_eq!(
            c.first_page_url(ResourceKind::Event, 100),
            "https://ll.thespacedevs.com/2.2.0/event?limit=100"
        );
    }

    #[test]
    fn blank_token_is_dropped() {
        let c = UpstreamClient::new("http://x", Some("  ".into()), Duration::from_secs(1)).unwrap();
        assert!(c.token.is_none());
    }
}
