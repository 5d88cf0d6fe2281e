//! Page-level data structures produced during traversal.

use serde::{Deserialize, Serialize};
use url::Url;

/// A discovered URL awaiting rendering.
///
/// Created by the frontier scheduler when a link is found, consumed
/// exactly once on dequeue. A task is never created for a URL already in
/// the visited set or beyond the configured depth.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    pub depth: usize,
}

impl CrawlTask {
    pub fn new(url: Url, depth: usize) -> Self {
        Self { url, depth }
    }
}

/// The outcome of rendering one page.
///
/// Owned transiently by the traversal step that processes it; dropped
/// after the cluster observation is recorded.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    /// Final URL after redirects
    pub url: Url,

    /// Raw markup as returned by the render collaborator
    pub html: String,

    /// Network exchanges observed during the render, in arrival order
    pub exchanges: Vec<NetworkExchange>,

    /// Depth of the task that produced this page
    pub depth: usize,
}

/// One request/response pair captured during a page render.
///
/// Immutable once recorded.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkExchange {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    pub body: ResponseBody,
    pub status: u16,
}

impl NetworkExchange {
    /// Dedup key used when merging evidence into a cluster.
    pub fn endpoint_key(&self) -> (String, String) {
        (self.method.clone(), self.path.clone())
    }
}

/// A captured response body.
///
/// Never an untyped blob: consumers pattern-match exhaustively on the
/// three shapes a body can take.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ResponseBody {
    /// Parsed structured value (JSON-like content types)
    Structured { value: serde_json::Value },

    /// Raw text retained verbatim
    Raw { text: String },

    /// Declared structured but failed to parse
    Malformed { error: String },
}
