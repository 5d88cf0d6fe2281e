// src/services/capture.rs

//! Per-render network capture buffer.
//!
//! Render collaborators push every observed request/response pair here
//! in arrival order. Structured (JSON-like) bodies are parsed and kept
//! as values; parse failures are recorded, not dropped; everything else
//! stays raw text. The buffer is flushed into the `RenderedPage` and
//! discarded with it.

use serde_json::Value;

use crate::models::{NetworkExchange, ResponseBody};

/// Ordered buffer of exchanges observed during one page render.
#[derive(Debug, Default)]
pub struct NetworkCapture {
    exchanges: Vec<NetworkExchange>,
}

impl NetworkCapture {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one exchange. `content_type` decides how the body text is
    /// classified.
    pub fn record(
        &mut self,
        method: impl Into<String>,
        path: impl Into<String>,
        payload: Option<Value>,
        status: u16,
        content_type: Option<&str>,
        body_text: &str,
    ) {
        let body = classify_body(content_type, body_text);
        self.exchanges.push(NetworkExchange {
            method: method.into(),
            path: path.into(),
            payload,
            body,
            status,
        });
    }

    /// Flush the buffer into the page being assembled.
    pub fn into_exchanges(self) -> Vec<NetworkExchange> {
        self.exchanges
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }
}

fn classify_body(content_type: Option<&str>, body_text: &str) -> ResponseBody {
    let is_structured = content_type
        .map(|ct| ct.contains("json"))
        .unwrap_or(false);

    if is_structured {
        match serde_json::from_str::<Value>(body_text) {
            Ok(value) => ResponseBody::Structured { value },
            Err(e) => ResponseBody::Malformed {
                error: e.to_string(),
            },
        }
    } else {
        ResponseBody::Raw {
            text: body_text.to_string(),
        }
    }
}
