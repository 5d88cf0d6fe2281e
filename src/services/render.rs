// src/services/render.rs

//! Render collaborator boundary.
//!
//! The scheduler only knows the `PageRenderer` trait. The crate ships a
//! plain-HTTP implementation that fetches a single document and records
//! its own exchange; a browser-backed renderer plugs in behind the same
//! trait.

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use crate::models::{CrawlerConfig, RenderedPage};
use crate::services::NetworkCapture;
use crate::utils::http::create_async_client;

/// Page-level render failure. Non-fatal: the scheduler logs it, keeps
/// the URL visited and moves on.
#[derive(Error, Debug)]
pub enum RenderError {
    /// The per-page timeout elapsed
    #[error("render timed out")]
    Timeout,

    /// Transport or navigation failure
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// The server answered with an error status
    #[error("HTTP status {0}")]
    Status(u16),
}

/// A collaborator that renders one URL and reports what it saw.
#[async_trait]
pub trait PageRenderer: Send + Sync {
    async fn render(&self, url: &Url, depth: usize) -> Result<RenderedPage, RenderError>;
}

/// Single-fetch renderer over reqwest.
///
/// No script execution: the captured exchanges are the document request
/// itself. Good enough for server-rendered sites and for exercising the
/// whole engine without a browser.
pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    pub fn new(config: &CrawlerConfig) -> crate::error::Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
        })
    }
}

#[async_trait]
impl PageRenderer for HttpRenderer {
    async fn render(&self, url: &Url, depth: usize) -> Result<RenderedPage, RenderError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(RenderError::Status(status.as_u16()));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let html = response
            .text()
            .await
            .map_err(|e| RenderError::Navigation(e.to_string()))?;

        // Only structured responses are evidence; HTML documents are the
        // page itself, not an exchange worth keeping.
        let mut capture = NetworkCapture::new();
        if content_type.as_deref().is_some_and(|ct| ct.contains("json")) {
            capture.record(
                "GET",
                final_url.path(),
                None,
                status.as_u16(),
                content_type.as_deref(),
                &html,
            );
        }

        Ok(RenderedPage {
            url: final_url,
            exchanges: capture.into_exchanges(),
            html,
            depth,
        })
    }
}
