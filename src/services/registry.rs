// src/services/registry.rs

//! Cluster registry: the single writer over all cluster records.
//!
//! Owned by the frontier scheduler for the lifetime of one crawl and
//! discarded after blueprint assembly. Records are created on first
//! sight of a fingerprint, mutated on duplicates, never removed.

use std::collections::HashMap;

use url::Url;

use crate::models::{ClusterAnalysis, ClusterRecord, NetworkExchange, StructuralFingerprint};

/// Per-page facts the registry folds into a record.
#[derive(Debug, Clone, Copy)]
pub struct PageFacts {
    /// Named forms on the page
    pub forms_found: usize,

    /// Token estimate of the page's compressed markup
    pub compressed_tokens: usize,

    /// Byte size of the raw markup
    pub raw_size: usize,
}

/// Running totals over one crawl.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegistryTotals {
    /// Pages successfully rendered and observed
    pub pages_seen: usize,

    /// Distinct structural templates
    pub unique_clusters: usize,

    /// Analysis tokens not spent on duplicate-structure pages
    pub tokens_saved: usize,
}

pub struct ClusterRegistry {
    records: HashMap<StructuralFingerprint, ClusterRecord>,

    /// First-seen order, for deterministic iteration
    order: Vec<StructuralFingerprint>,

    exchange_cap: usize,
    sample_url_cap: usize,

    pages_seen: usize,
    tokens_saved: usize,
}

impl ClusterRegistry {
    pub fn new(exchange_cap: usize, sample_url_cap: usize) -> Self {
        Self {
            records: HashMap::new(),
            order: Vec::new(),
            exchange_cap,
            sample_url_cap,
            pages_seen: 0,
            tokens_saved: 0,
        }
    }

    /// Fold one rendered page into the registry.
    ///
    /// Returns `true` when the fingerprint opens a new cluster. On a
    /// duplicate, the page's would-have-been analysis tokens accrue to
    /// the savings total and up to the evidence cap of additional
    /// distinct exchanges are merged in.
    pub fn observe(
        &mut self,
        fingerprint: StructuralFingerprint,
        url: Url,
        exchanges: Vec<NetworkExchange>,
        facts: PageFacts,
    ) -> bool {
        self.pages_seen += 1;

        if let Some(record) = self.records.get_mut(&fingerprint) {
            record.pages += 1;
            if record.sample_urls.len() < self.sample_url_cap {
                record.sample_urls.push(url);
            }
            Self::merge_evidence(record, exchanges, self.exchange_cap);
            self.tokens_saved += facts.compressed_tokens;

            log::debug!(
                "duplicate structure {} ({} pages)",
                fingerprint.short(),
                record.pages
            );
            return false;
        }

        let mut record = ClusterRecord {
            fingerprint,
            representative_url: url.clone(),
            pages: 1,
            sample_urls: vec![url],
            evidence: Vec::new(),
            analysis: None,
            forms_found: facts.forms_found,
            compressed_tokens: facts.compressed_tokens,
            raw_size: facts.raw_size,
        };
        Self::merge_evidence(&mut record, exchanges, self.exchange_cap);

        log::debug!("new cluster {}", fingerprint.short());
        self.records.insert(fingerprint, record);
        self.order.push(fingerprint);
        true
    }

    /// Attach an analyzer verdict. A record is analyzed at most once;
    /// later calls are ignored.
    pub fn attach_analysis(&mut self, fingerprint: &StructuralFingerprint, analysis: ClusterAnalysis) {
        if let Some(record) = self.records.get_mut(fingerprint) {
            if record.analysis.is_none() {
                record.analysis = Some(analysis);
            }
        }
    }

    /// Evidence accumulated so far for a cluster.
    pub fn evidence(&self, fingerprint: &StructuralFingerprint) -> &[NetworkExchange] {
        self.records
            .get(fingerprint)
            .map(|r| r.evidence.as_slice())
            .unwrap_or(&[])
    }

    pub fn totals(&self) -> RegistryTotals {
        RegistryTotals {
            pages_seen: self.pages_seen,
            unique_clusters: self.records.len(),
            tokens_saved: self.tokens_saved,
        }
    }

    /// Records in first-seen order.
    pub fn records(&self) -> impl Iterator<Item = &ClusterRecord> {
        self.order.iter().map(|fp| &self.records[fp])
    }

    /// Clusters carrying an analyzer verdict.
    pub fn analyzed_count(&self) -> usize {
        self.records.values().filter(|r| r.analysis.is_some()).count()
    }

    fn merge_evidence(record: &mut ClusterRecord, exchanges: Vec<NetworkExchange>, cap: usize) {
        for exchange in exchanges {
            if record.evidence.len() >= cap {
                break;
            }
            let key = exchange.endpoint_key();
            if record.evidence.iter().any(|e| e.endpoint_key() == key) {
                continue;
            }
            record.evidence.push(exchange);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResponseBody;

    fn facts(tokens: usize) -> PageFacts {
        PageFacts {
            forms_found: 0,
            compressed_tokens: tokens,
            raw_size: tokens * 4,
        }
    }

    fn fp(tag: u8) -> StructuralFingerprint {
        StructuralFingerprint::new([tag; 32], tag as u32)
    }

    fn url(path: &str) -> Url {
        Url::parse(&format!("https://example.com{path}")).unwrap()
    }

    fn exchange(method: &str, path: &str) -> NetworkExchange {
        NetworkExchange {
            method: method.to_string(),
            path: path.to_string(),
            payload: None,
            body: ResponseBody::Raw {
                text: String::new(),
            },
            status: 200,
        }
    }

    #[test]
    fn first_sight_opens_a_cluster() {
        let mut registry = ClusterRegistry::new(10, 5);
        assert!(registry.observe(fp(1), url("/a"), vec![], facts(100)));
        assert!(!registry.observe(fp(1), url("/b"), vec![], facts(100)));

        let totals = registry.totals();
        assert_eq!(totals.pages_seen, 2);
        assert_eq!(totals.unique_clusters, 1);
    }

    #[test]
    fn representative_never_changes() {
        let mut registry = ClusterRegistry::new(10, 5);
        registry.observe(fp(1), url("/first"), vec![], facts(10));
        registry.observe(fp(1), url("/second"), vec![], facts(10));

        let record = registry.records().next().unwrap();
        assert_eq!(record.representative_url, url("/first"));
        assert_eq!(record.sample_urls, vec![url("/first"), url("/second")]);
    }

    #[test]
    fn page_counts_sum_to_pages_seen() {
        let mut registry = ClusterRegistry::new(10, 5);
        for (tag, path) in [(1, "/a"), (1, "/b"), (2, "/c"), (1, "/d"), (3, "/e")] {
            registry.observe(fp(tag), url(path), vec![], facts(10));
        }

        let sum: usize = registry.records().map(|r| r.pages).sum();
        assert_eq!(sum, registry.totals().pages_seen);
        assert_eq!(registry.totals().unique_clusters, 3);
    }

    #[test]
    fn savings_accrue_only_on_duplicates_and_grow_monotonically() {
        let mut registry = ClusterRegistry::new(10, 5);
        registry.observe(fp(1), url("/a"), vec![], facts(100));
        assert_eq!(registry.totals().tokens_saved, 0);

        let mut last = 0;
        for path in ["/b", "/c", "/d"] {
            registry.observe(fp(1), url(path), vec![], facts(100));
            let saved = registry.totals().tokens_saved;
            assert!(saved > last);
            last = saved;
        }

        // Never exceeds (pages - 1) * average tokens per page
        let totals = registry.totals();
        assert!(totals.tokens_saved <= (totals.pages_seen - 1) * 100);
    }

    #[test]
    fn evidence_merges_dedup_by_endpoint() {
        let mut registry = ClusterRegistry::new(10, 5);
        registry.observe(
            fp(1),
            url("/a"),
            vec![exchange("GET", "/api/x"), exchange("GET", "/api/x")],
            facts(10),
        );
        registry.observe(
            fp(1),
            url("/b"),
            vec![exchange("GET", "/api/x"), exchange("POST", "/api/y")],
            facts(10),
        );

        let record = registry.records().next().unwrap();
        assert_eq!(record.evidence.len(), 2);
    }

    #[test]
    fn evidence_respects_the_cap() {
        let mut registry = ClusterRegistry::new(2, 5);
        let exchanges: Vec<_> = (0..5)
            .map(|i| exchange("GET", &format!("/api/{i}")))
            .collect();
        registry.observe(fp(1), url("/a"), exchanges, facts(10));

        assert_eq!(registry.evidence(&fp(1)).len(), 2);
    }

    #[test]
    fn analysis_attaches_at_most_once() {
        let mut registry = ClusterRegistry::new(10, 5);
        registry.observe(fp(1), url("/a"), vec![], facts(10));

        registry.attach_analysis(
            &fp(1),
            ClusterAnalysis {
                page_type: "Content Page".to_string(),
                data_models: vec![],
            },
        );
        registry.attach_analysis(
            &fp(1),
            ClusterAnalysis {
                page_type: "Other".to_string(),
                data_models: vec![],
            },
        );

        let record = registry.records().next().unwrap();
        assert_eq!(record.page_type(), "Content Page");
        assert_eq!(registry.analyzed_count(), 1);
    }

    #[test]
    fn sample_urls_respect_the_cap() {
        let mut registry = ClusterRegistry::new(10, 2);
        for path in ["/a", "/b", "/c", "/d"] {
            registry.observe(fp(1), url(path), vec![], facts(10));
        }
        let record = registry.records().next().unwrap();
        assert_eq!(record.sample_urls.len(), 2);
        assert_eq!(record.pages, 4);
    }
}
