//! Final report structures.
//!
//! Field names and order of `Blueprint` and `ClusterReport` are part of
//! the external contract: the document is persisted and compared across
//! runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::models::{ClusterRecord, InferredDataModel, NetworkExchange};

/// One cluster row in the blueprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClusterReport {
    /// Structural fingerprint rendered as lowercase hex
    pub cluster_id: String,
    pub page_type: String,
    pub representative_url: String,
    pub total_pages_in_cluster: usize,
    pub inferred_data_models: Vec<InferredDataModel>,
    pub network_intercepts: Vec<NetworkExchange>,

    // Supplementary fields, appended after the contract block
    #[serde(default)]
    pub sample_urls: Vec<String>,
    #[serde(default)]
    pub forms_found: usize,
    #[serde(default)]
    pub compressed_tokens: usize,
    #[serde(default)]
    pub raw_size: usize,
}

impl From<&ClusterRecord> for ClusterReport {
    fn from(record: &ClusterRecord) -> Self {
        Self {
            cluster_id: record.fingerprint.to_hex(),
            page_type: record.page_type().to_string(),
            representative_url: record.representative_url.to_string(),
            total_pages_in_cluster: record.pages,
            inferred_data_models: record
                .analysis
                .as_ref()
                .map(|a| a.data_models.clone())
                .unwrap_or_default(),
            network_intercepts: record.evidence.clone(),
            sample_urls: record.sample_urls.iter().map(Url::to_string).collect(),
            forms_found: record.forms_found,
            compressed_tokens: record.compressed_tokens,
            raw_size: record.raw_size,
        }
    }
}

/// Aggregate crawl statistics attached to the blueprint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct BlueprintStats {
    /// Share of rendered pages folded into an existing cluster, percent
    pub clustering_efficiency: f64,

    /// Clusters that carry an analyzer verdict
    pub clusters_analyzed: usize,

    /// Renders that failed and contributed no observation
    pub pages_failed: usize,
}

/// Terminal, read-only output artifact of one crawl run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Blueprint {
    pub project_name: String,
    pub base_url: String,
    pub total_pages_crawled: usize,
    pub unique_clusters_found: usize,
    pub total_tokens_saved: usize,
    pub clusters: Vec<ClusterReport>,

    // Supplementary fields, appended after the contract block
    #[serde(default)]
    pub statistics: BlueprintStats,
    pub generated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_fields_keep_declaration_order() {
        let blueprint = Blueprint {
            project_name: "example_com_clone".to_string(),
            base_url: "https://example.com".to_string(),
            total_pages_crawled: 3,
            unique_clusters_found: 2,
            total_tokens_saved: 120,
            clusters: vec![],
            statistics: BlueprintStats::default(),
            generated_at: Utc::now(),
        };

        let json = serde_json::to_string(&blueprint).unwrap();
        let order = [
            "project_name",
            "base_url",
            "total_pages_crawled",
            "unique_clusters_found",
            "total_tokens_saved",
            "clusters",
        ];
        let positions: Vec<usize> = order
            .iter()
            .map(|field| json.find(&format!("\"{field}\"")).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn blueprint_roundtrips_through_json() {
        let blueprint = Blueprint {
            project_name: "p".to_string(),
            base_url: "https://example.com".to_string(),
            total_pages_crawled: 0,
            unique_clusters_found: 0,
            total_tokens_saved: 0,
            clusters: vec![],
            statistics: BlueprintStats::default(),
            generated_at: Utc::now(),
        };
        let json = serde_json::to_string_pretty(&blueprint).unwrap();
        let back: Blueprint = serde_json::from_str(&json).unwrap();
        assert_eq!(blueprint, back);
    }
}
