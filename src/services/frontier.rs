// src/services/frontier.rs

//! Bounded BFS traversal of the link graph.
//!
//! The scheduler exclusively owns the task queue, the visited set and
//! the cluster registry; render futures share no mutable state and all
//! mutations happen on the coordinating task when a render resolves.
//! Termination is guaranteed: the visited set strictly grows on every
//! enqueue and the queue only drains, so cyclic link graphs are finite.

use std::collections::{HashSet, VecDeque};
use std::sync::{Arc, OnceLock};
use std::time::Duration;

use futures::stream::{FuturesUnordered, StreamExt};
use scraper::{Html, Selector};
use tokio::sync::{watch, Semaphore};
use url::Url;

use crate::dom;
use crate::error::{AppError, Result};
use crate::models::{Config, CrawlTask, RenderedPage};
use crate::services::registry::{ClusterRegistry, PageFacts};
use crate::services::{ClusterAnalyzer, PageRenderer, RenderError};
use crate::utils::url::{normalize, same_origin};

/// Final traversal state handed to the blueprint assembler.
pub struct CrawlOutcome {
    pub seed: Url,
    pub registry: ClusterRegistry,
    pub pages_failed: usize,
}

/// Drives one crawl run against an injected renderer and analyzer.
pub struct FrontierScheduler {
    config: Arc<Config>,
    seed: Url,
    renderer: Arc<dyn PageRenderer>,
    analyzer: Arc<dyn ClusterAnalyzer>,
}

impl FrontierScheduler {
    /// Validate the configuration and seed before any rendering begins.
    pub fn new(
        config: Arc<Config>,
        seed: Url,
        renderer: Arc<dyn PageRenderer>,
        analyzer: Arc<dyn ClusterAnalyzer>,
    ) -> Result<Self> {
        config.validate()?;
        if seed.host_str().is_none() {
            return Err(AppError::config("seed URL must have a host"));
        }

        Ok(Self {
            config,
            seed,
            renderer,
            analyzer,
        })
    }

    /// Run the traversal to completion, budget exhaustion or
    /// cancellation. Always returns an outcome; whatever the registry
    /// holds at stop time becomes the blueprint.
    pub async fn run(self, cancel: watch::Receiver<bool>) -> CrawlOutcome {
        let crawler = &self.config.crawler;
        let concurrency = crawler.max_concurrent;
        let timeout = Duration::from_millis(crawler.page_timeout_ms);
        let delay = Duration::from_millis(crawler.request_delay_ms);

        let mut registry = ClusterRegistry::new(
            self.config.evidence.exchange_cap,
            self.config.evidence.sample_url_cap,
        );
        let mut queue: VecDeque<CrawlTask> = VecDeque::new();
        let mut visited: HashSet<Url> = HashSet::new();

        let seed = normalize(&self.seed);
        visited.insert(seed.clone());
        queue.push_back(CrawlTask::new(seed, 0));

        // Renderer sessions are a limited pool; permits are released on
        // every exit path, including timeout.
        let sessions = Arc::new(Semaphore::new(concurrency));
        let mut in_flight = FuturesUnordered::new();
        let mut dispatched = 0usize;
        let mut pages_failed = 0usize;

        log::info!(
            "starting crawl of {} (max {} pages, depth {})",
            self.seed,
            crawler.max_pages,
            crawler.max_depth
        );

        loop {
            // Keep the in-flight window full while the page budget lasts
            while in_flight.len() < concurrency && dispatched < crawler.max_pages {
                let Some(task) = queue.pop_front() else { break };
                if task.depth > crawler.max_depth {
                    continue;
                }
                dispatched += 1;
                in_flight.push(render_one(
                    task,
                    Arc::clone(&self.renderer),
                    Arc::clone(&sessions),
                    timeout,
                    delay,
                ));
            }

            if in_flight.is_empty() {
                break;
            }

            tokio::select! {
                _ = wait_cancelled(cancel.clone()) => {
                    log::warn!(
                        "crawl cancelled, abandoning {} in-flight renders",
                        in_flight.len()
                    );
                    break;
                }
                Some((task, result)) = in_flight.next() => match result {
                    Ok(page) => {
                        self.process_page(&mut registry, &mut queue, &mut visited, page)
                            .await;
                    }
                    Err(error) => {
                        // Page-level failure: the URL stays visited so it
                        // is never retried, and the run continues.
                        pages_failed += 1;
                        log::warn!("render failed for {}: {}", task.url, error);
                    }
                },
            }
        }

        let totals = registry.totals();
        log::info!(
            "crawl finished: {} pages rendered, {} unique clusters, {} failed",
            totals.pages_seen,
            totals.unique_clusters,
            pages_failed
        );

        CrawlOutcome {
            seed: self.seed,
            registry,
            pages_failed,
        }
    }

    /// Fold one successful render into the shared state. Runs on the
    /// coordinating task only.
    async fn process_page(
        &self,
        registry: &mut ClusterRegistry,
        queue: &mut VecDeque<CrawlTask>,
        visited: &mut HashSet<Url>,
        page: RenderedPage,
    ) {
        let RenderedPage {
            url,
            html,
            exchanges,
            depth,
        } = page;

        let skeleton = dom::canonicalize(&html);
        let fingerprint = dom::fingerprint(&skeleton);
        let compressed = dom::compress(&html, self.config.diet.text_budget);
        let facts = PageFacts {
            forms_found: dom::count_forms(&html),
            compressed_tokens: compressed.tokens(),
            raw_size: compressed.raw_size,
        };

        let is_new = registry.observe(fingerprint, url, exchanges, facts);

        if is_new && self.config.analyzer.enabled {
            let evidence = registry.evidence(&fingerprint).to_vec();
            match self.analyzer.analyze(&compressed.markup, &evidence).await {
                Ok(analysis) => registry.attach_analysis(&fingerprint, analysis),
                Err(error) => {
                    log::warn!(
                        "analysis failed for cluster {}: {}",
                        fingerprint.short(),
                        error
                    );
                }
            }
        }

        // Marking visited at enqueue time prevents duplicate enqueues of
        // a URL discovered from multiple parent pages.
        if depth < self.config.crawler.max_depth {
            for link in extract_links(&html, &self.seed) {
                if visited.insert(link.clone()) {
                    queue.push_back(CrawlTask::new(link, depth + 1));
                }
            }
        }
    }
}

/// Render one task under the session pool, politeness delay and
/// per-page timeout. No shared state is touched here.
async fn render_one(
    task: CrawlTask,
    renderer: Arc<dyn PageRenderer>,
    sessions: Arc<Semaphore>,
    timeout: Duration,
    delay: Duration,
) -> (CrawlTask, std::result::Result<RenderedPage, RenderError>) {
    let _session = sessions
        .acquire_owned()
        .await
        .expect("session pool is never closed");

    if !delay.is_zero() {
        tokio::time::sleep(delay).await;
    }

    let result = match tokio::time::timeout(timeout, renderer.render(&task.url, task.depth)).await {
        Ok(result) => result,
        Err(_) => Err(RenderError::Timeout),
    };
    (task, result)
}

/// Resolves once cancellation is requested; never resolves when the
/// cancel sender is gone.
async fn wait_cancelled(mut cancel: watch::Receiver<bool>) {
    if cancel.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}

fn link_selector() -> &'static Selector {
    static SELECTOR: OnceLock<Selector> = OnceLock::new();
    SELECTOR.get_or_init(|| Selector::parse("a[href]").expect("valid anchor selector"))
}

/// Same-origin outbound links in document order, normalized and deduped
/// within the page.
fn extract_links(html: &str, origin: &Url) -> Vec<Url> {
    let document = Html::parse_document(html);
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    for anchor in document.select(link_selector()) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = origin.join(href) else {
            continue;
        };
        if !matches!(resolved.scheme(), "http" | "https") {
            continue;
        }
        if !same_origin(&resolved, origin) {
            continue;
        }

        let link = normalize(&resolved);
        if seen.insert(link.clone()) {
            links.push(link);
        }
    }

    links
}
