// src/pipeline/assemble.rs

//! Blueprint assembly: folds the final registry state into the output
//! report. Pure; callable at any stop point, including cancellation.

use chrono::Utc;

use crate::models::{Blueprint, BlueprintStats, ClusterReport};
use crate::services::CrawlOutcome;
use crate::utils::url::project_name;

/// Fold a crawl outcome into the terminal blueprint document.
///
/// Clusters are ordered by descending page count; ties keep first-seen
/// order.
pub fn assemble(outcome: &CrawlOutcome) -> Blueprint {
    let totals = outcome.registry.totals();

    let mut clusters: Vec<ClusterReport> =
        outcome.registry.records().map(ClusterReport::from).collect();
    clusters.sort_by(|a, b| b.total_pages_in_cluster.cmp(&a.total_pages_in_cluster));

    let clustering_efficiency = if totals.pages_seen > 0 {
        (totals.pages_seen - totals.unique_clusters) as f64 / totals.pages_seen as f64 * 100.0
    } else {
        0.0
    };

    Blueprint {
        project_name: project_name(&outcome.seed),
        base_url: outcome.seed.to_string(),
        total_pages_crawled: totals.pages_seen,
        unique_clusters_found: totals.unique_clusters,
        total_tokens_saved: totals.tokens_saved,
        clusters,
        statistics: BlueprintStats {
            clustering_efficiency,
            clusters_analyzed: outcome.registry.analyzed_count(),
            pages_failed: outcome.pages_failed,
        },
        generated_at: Utc::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    use crate::models::StructuralFingerprint;
    use crate::services::{ClusterRegistry, PageFacts};

    fn outcome_with(observations: &[(u8, &str)]) -> CrawlOutcome {
        let mut registry = ClusterRegistry::new(10, 5);
        for (tag, path) in observations {
            registry.observe(
                StructuralFingerprint::new([*tag; 32], *tag as u32),
                Url::parse(&format!("https://example.com{path}")).unwrap(),
                vec![],
                PageFacts {
                    forms_found: 0,
                    compressed_tokens: 50,
                    raw_size: 200,
                },
            );
        }
        CrawlOutcome {
            seed: Url::parse("https://example.com/").unwrap(),
            registry,
            pages_failed: 0,
        }
    }

    #[test]
    fn clusters_sorted_by_page_count() {
        let outcome = outcome_with(&[(1, "/a"), (2, "/b"), (2, "/c"), (2, "/d"), (3, "/e")]);
        let blueprint = assemble(&outcome);

        assert_eq!(blueprint.total_pages_crawled, 5);
        assert_eq!(blueprint.unique_clusters_found, 3);
        assert_eq!(blueprint.clusters[0].total_pages_in_cluster, 3);
        assert_eq!(blueprint.clusters[0].representative_url, "https://example.com/b");
    }

    #[test]
    fn project_name_derives_from_seed_host() {
        let blueprint = assemble(&outcome_with(&[(1, "/")]));
        assert_eq!(blueprint.project_name, "example_com_clone");
        assert_eq!(blueprint.base_url, "https://example.com/");
    }

    #[test]
    fn efficiency_counts_folded_pages() {
        // 4 pages, 2 clusters: half the pages were duplicates
        let outcome = outcome_with(&[(1, "/a"), (1, "/b"), (2, "/c"), (2, "/d")]);
        let blueprint = assemble(&outcome);
        assert!((blueprint.statistics.clustering_efficiency - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn empty_outcome_still_assembles() {
        let blueprint = assemble(&outcome_with(&[]));
        assert_eq!(blueprint.total_pages_crawled, 0);
        assert_eq!(blueprint.unique_clusters_found, 0);
        assert!(blueprint.clusters.is_empty());
        assert_eq!(blueprint.statistics.clustering_efficiency, 0.0);
    }

    #[test]
    fn savings_reflect_duplicate_pages_only() {
        let outcome = outcome_with(&[(1, "/a"), (1, "/b"), (1, "/c")]);
        let blueprint = assemble(&outcome);
        // Two duplicates at 50 tokens each
        assert_eq!(blueprint.total_tokens_saved, 100);
    }
}
