//! Cluster identity and record structures.

use std::fmt;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::NetworkExchange;

/// Fixed-width structural identity of a page.
///
/// Equality defines cluster membership. The skeleton byte length acts as
/// a cheap secondary discriminator: two templates would have to collide
/// on both the SHA-256 digest and the skeleton length to merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructuralFingerprint {
    digest: [u8; 32],
    skeleton_len: u32,
}

impl StructuralFingerprint {
    pub fn new(digest: [u8; 32], skeleton_len: u32) -> Self {
        Self {
            digest,
            skeleton_len,
        }
    }

    /// Stable string form used as `cluster_id` in the blueprint.
    pub fn to_hex(&self) -> String {
        hex::encode(self.digest)
    }

    /// Short prefix for log lines.
    pub fn short(&self) -> String {
        hex::encode(&self.digest[..4])
    }
}

impl fmt::Display for StructuralFingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// One data entity inferred by the analyzer for a cluster.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferredDataModel {
    /// Entity name (e.g. "User", "Product")
    pub entity: String,

    /// Attribute names observed for the entity
    #[serde(default)]
    pub attributes: Vec<String>,

    /// Where the entity was inferred from: "ui", "api" or "form"
    #[serde(default = "default_source")]
    pub source: String,
}

fn default_source() -> String {
    "ui".to_string()
}

/// Result of analyzing one cluster's representative page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterAnalysis {
    pub page_type: String,
    pub data_models: Vec<InferredDataModel>,
}

/// Accumulated state for one structural template.
///
/// Created on first sight of a fingerprint; counts and evidence grow on
/// every duplicate; never re-fingerprinted.
#[derive(Debug, Clone)]
pub struct ClusterRecord {
    pub fingerprint: StructuralFingerprint,

    /// First URL that produced this fingerprint
    pub representative_url: Url,

    /// Pages observed with this structure, the representative included
    pub pages: usize,

    /// Capped set of member URLs, representative first
    pub sample_urls: Vec<Url>,

    /// Capped network exchanges, deduped by method+path
    pub evidence: Vec<NetworkExchange>,

    /// Analyzer output, attached at most once
    pub analysis: Option<ClusterAnalysis>,

    /// Form count on the representative page
    pub forms_found: usize,

    /// Token estimate of the representative's compressed markup
    pub compressed_tokens: usize,

    /// Byte size of the representative's raw markup
    pub raw_size: usize,
}

impl ClusterRecord {
    /// Page type for reporting: analyzer verdict or a placeholder.
    pub fn page_type(&self) -> &str {
        self.analysis
            .as_ref()
            .map(|a| a.page_type.as_str())
            .unwrap_or("Unknown")
    }
}
