// src/pipeline/crawl.rs

//! Crawl pipeline entry point.

use std::sync::Arc;

use tokio::sync::watch;
use url::Url;

use crate::error::Result;
use crate::models::{Blueprint, Config};
use crate::pipeline::assemble::assemble;
use crate::services::{ClusterAnalyzer, FrontierScheduler, PageRenderer};

/// Run one crawl: validate configuration, traverse the site, assemble
/// the blueprint. Only configuration errors fail the run; page-level
/// failures are absorbed by the scheduler and a cancelled run still
/// yields the partial blueprint.
pub async fn run_crawl(
    config: Arc<Config>,
    seed: Url,
    renderer: Arc<dyn PageRenderer>,
    analyzer: Arc<dyn ClusterAnalyzer>,
    cancel: watch::Receiver<bool>,
) -> Result<Blueprint> {
    let scheduler = FrontierScheduler::new(config, seed, renderer, analyzer)?;
    let outcome = scheduler.run(cancel).await;
    Ok(assemble(&outcome))
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;

    use crate::models::RenderedPage;
    use crate::services::{HeuristicAnalyzer, RenderError};

    /// Two-template site: a login seed linking to three article pages.
    struct TinySite;

    #[async_trait]
    impl PageRenderer for TinySite {
        async fn render(
            &self,
            url: &Url,
            depth: usize,
        ) -> std::result::Result<RenderedPage, RenderError> {
            let html = match url.path() {
                "/" => r#"<html><body>
                        <form class="login-form"><input type="password" name="pw">
                        <button>Sign in</button></form>
                        <a href="/post/1">1</a><a href="/post/2">2</a><a href="/post/3">3</a>
                    </body></html>"#
                    .to_string(),
                path => format!(
                    r#"<html><body><article class="post-body"><h1>{path}</h1>
                       <p>words</p></article></body></html>"#
                ),
            };
            Ok(RenderedPage {
                url: url.clone(),
                html,
                exchanges: vec![],
                depth,
            })
        }
    }

    fn no_cancel() -> watch::Receiver<bool> {
        let (tx, rx) = watch::channel(false);
        std::mem::forget(tx);
        rx
    }

    #[tokio::test]
    async fn end_to_end_blueprint_with_analysis() {
        let mut config = Config::default();
        config.analyzer.enabled = true;
        config.crawler.max_depth = 1;

        let blueprint = run_crawl(
            Arc::new(config),
            Url::parse("https://blog.example.com/").unwrap(),
            Arc::new(TinySite),
            Arc::new(HeuristicAnalyzer),
            no_cancel(),
        )
        .await
        .unwrap();

        assert_eq!(blueprint.project_name, "blog_example_com_clone");
        assert_eq!(blueprint.total_pages_crawled, 4);
        assert_eq!(blueprint.unique_clusters_found, 2);

        // Largest cluster first: the three articles
        assert_eq!(blueprint.clusters[0].total_pages_in_cluster, 3);
        assert_eq!(blueprint.clusters[1].page_type, "Authentication - Login");
        assert_eq!(blueprint.statistics.clusters_analyzed, 2);

        // cluster_id is the fingerprint in stable hex
        assert_eq!(blueprint.clusters[0].cluster_id.len(), 64);
    }

    #[tokio::test]
    async fn zero_max_pages_is_a_configuration_error() {
        let mut config = Config::default();
        config.crawler.max_pages = 0;

        let result = run_crawl(
            Arc::new(config),
            Url::parse("https://example.com/").unwrap(),
            Arc::new(TinySite),
            Arc::new(HeuristicAnalyzer),
            no_cancel(),
        )
        .await;
        assert!(result.is_err());
    }
}
