//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the worker pool that drives a crawl from a single
//! seed URL to completion:
//! - Marking and queueing the seed
//! - Spawning workers that fetch pages and store records
//! - Expanding same-host links below the depth limit
//! - Detecting completion through the pending-work counter
//! - Handing the accumulated results back to the caller

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page};
use crate::crawler::parser::LinkExtractor;
use crate::crawler::pending::PendingWork;
use crate::output::{build_site_tree, SiteMapNode};
use crate::state::{CrawlResultStore, DroppedLink, PageRecord, PageTask, VisitedSet};
use crate::url::{extract_domain, normalize_url};
use crate::{FetchError, MapperError, TreeError, UrlError};
use chrono::{DateTime, Utc};
use reqwest::Client;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::sync::Mutex as AsyncMutex;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Callback invoked for every link dropped because its fetch failed
pub type DroppedLinkCallback = Arc<dyn Fn(&DroppedLink) + Send + Sync>;

type WorkQueue = Arc<AsyncMutex<UnboundedReceiver<PageTask>>>;

/// Everything a finished crawl produced
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    /// Normalized seed URL
    pub seed_url: String,
    /// Fetched pages by depth
    pub store: CrawlResultStore,
    /// Every URL that was marked for fetching
    pub visited: HashSet<String>,
    /// Scheduled links whose fetch failed
    pub dropped: Vec<DroppedLink>,
    /// True if the crawl stopped on its cancellation token
    pub cancelled: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl CrawlOutcome {
    /// Rebuilds the page hierarchy from the stored records
    pub fn site_tree(&self) -> Result<SiteMapNode, TreeError> {
        build_site_tree(&self.store)
    }

    /// Wall-clock duration of the crawl
    pub fn duration(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}

/// Main crawler coordinator structure
///
/// One coordinator describes one seed and one configuration. Each call to
/// [`Coordinator::run`] starts a fresh crawl with its own visited set and
/// result store.
pub struct Coordinator {
    config: Arc<Config>,
    client: Client,
    seed: Url,
    extractor: LinkExtractor,
    dropped_callback: Option<DroppedLinkCallback>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// # Arguments
    ///
    /// * `seed` - The URL to start from
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(MapperError)` - Invalid seed URL, invalid config, or HTTP client failure
    pub fn new(seed: &str, config: Config) -> Result<Self, MapperError> {
        crate::config::validate(&config)?;

        let seed_url = normalize_url(seed).map_err(|source| MapperError::InvalidSeed {
            url: seed.to_string(),
            source,
        })?;
        let host = extract_domain(&seed_url).ok_or_else(|| MapperError::InvalidSeed {
            url: seed.to_string(),
            source: UrlError::MissingDomain,
        })?;

        let client = build_http_client(&config)?;
        let extractor = LinkExtractor::new(host, config.crawler.max_links_per_page);

        Ok(Self {
            config: Arc::new(config),
            client,
            seed: seed_url,
            extractor,
            dropped_callback: None,
        })
    }

    /// Registers a callback that observes dropped links as they happen
    pub fn with_dropped_link_callback(mut self, callback: DroppedLinkCallback) -> Self {
        self.dropped_callback = Some(callback);
        self
    }

    pub fn seed_url(&self) -> &Url {
        &self.seed
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs a crawl to completion
    pub async fn run(&self) -> Result<CrawlOutcome, MapperError> {
        self.run_with_cancellation(CancellationToken::new()).await
    }

    /// Runs a crawl that stops early when `cancel` fires
    ///
    /// On cancellation the workers finish or abandon their current fetch, the
    /// queue is shut down and the partial results are returned with
    /// `cancelled` set.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlOutcome)` - Crawl finished or was cancelled
    /// * `Err(MapperError::SeedFetch)` - The seed could not be fetched
    /// * `Err(MapperError::TaskJoin)` - A worker panicked
    pub async fn run_with_cancellation(
        &self,
        cancel: CancellationToken,
    ) -> Result<CrawlOutcome, MapperError> {
        let started_at = Utc::now();
        let seed_url = self.seed.to_string();
        let crawler = &self.config.crawler;

        tracing::info!(
            "Starting crawl of {} (host {}, max depth {}, {} workers, {} links per page)",
            seed_url,
            self.extractor.host(),
            crawler.max_depth,
            crawler.workers,
            self.extractor.max_links()
        );
        match max_in_flight_tasks(crawler.max_depth, crawler.max_links_per_page) {
            Some(bound) => tracing::debug!("At most {} pages can be scheduled", bound),
            None => tracing::debug!("Schedulable page count exceeds usize"),
        }

        let shared = Arc::new(CrawlShared {
            client: self.client.clone(),
            extractor: self.extractor.clone(),
            max_depth: crawler.max_depth,
            visited: VisitedSet::new(),
            store: Mutex::new(CrawlResultStore::new()),
            dropped: Mutex::new(Vec::new()),
            pending: PendingWork::new(),
            dropped_callback: self.dropped_callback.clone(),
        });

        let (sender, receiver) = mpsc::unbounded_channel();
        let queue: WorkQueue = Arc::new(AsyncMutex::new(receiver));
        let shutdown = CancellationToken::new();

        shared.visited.try_mark(&seed_url);
        shared.enqueue(&sender, PageTask::seed(seed_url.clone()));

        let mut workers = JoinSet::new();
        for worker_id in 0..crawler.workers {
            workers.spawn(worker_loop(
                worker_id,
                Arc::clone(&shared),
                Arc::clone(&queue),
                sender.clone(),
                shutdown.clone(),
                cancel.clone(),
            ));
        }
        drop(sender);

        // Abandoned fetches never complete their task, so the counter only
        // drains when every queued page was really processed.
        let cancelled = loop {
            tokio::select! {
                biased;
                _ = shared.pending.wait_drained() => break false,
                _ = cancel.cancelled() => break true,
                joined = workers.join_next() => match joined {
                    Some(Ok(())) => continue,
                    Some(Err(e)) => {
                        tracing::error!("Crawl worker failed: {}", e);
                        shutdown.cancel();
                        workers.abort_all();
                        return Err(MapperError::TaskJoin(e));
                    }
                    None => break !shared.pending.is_drained(),
                },
            }
        };

        // Close the queue; idle workers exit, busy ones exit after their task
        shutdown.cancel();
        while let Some(joined) = workers.join_next().await {
            joined?;
        }

        let outcome = CrawlOutcome {
            seed_url: seed_url.clone(),
            store: shared.take_store(),
            visited: shared.visited.take_all(),
            dropped: shared.take_dropped(),
            cancelled,
            started_at,
            finished_at: Utc::now(),
        };

        if cancelled {
            tracing::warn!(
                "Crawl cancelled after {} pages ({} pending)",
                outcome.store.len(),
                shared.pending.count()
            );
            return Ok(outcome);
        }

        if outcome.store.at_depth(0).is_empty() {
            let reason = outcome
                .dropped
                .iter()
                .find(|d| d.depth == 0)
                .map(|d| d.reason.clone())
                .unwrap_or_else(|| "no response".to_string());
            tracing::error!("Seed {} could not be fetched: {}", seed_url, reason);
            return Err(MapperError::SeedFetch {
                url: seed_url,
                reason,
            });
        }

        tracing::info!(
            "Crawl completed: {} pages, {} dropped links in {}ms",
            outcome.store.len(),
            outcome.dropped.len(),
            outcome.duration().num_milliseconds()
        );

        Ok(outcome)
    }
}

/// State shared by the workers of a single crawl
struct CrawlShared {
    client: Client,
    extractor: LinkExtractor,
    max_depth: u32,
    visited: VisitedSet,
    store: Mutex<CrawlResultStore>,
    dropped: Mutex<Vec<DroppedLink>>,
    pending: PendingWork,
    dropped_callback: Option<DroppedLinkCallback>,
}

impl CrawlShared {
    /// Counts a task as pending and pushes it onto the queue
    fn enqueue(&self, sender: &UnboundedSender<PageTask>, task: PageTask) {
        self.pending.task_queued();
        if let Err(mpsc::error::SendError(task)) = sender.send(task) {
            tracing::debug!("Work queue closed, discarding {}", task.url);
            self.pending.task_completed();
        }
    }

    /// Fetches one page, stores its record and queues its unvisited links
    async fn process(
        &self,
        task: PageTask,
        sender: &UnboundedSender<PageTask>,
        cancel: &CancellationToken,
    ) {
        match fetch_page(&self.client, &task.url, &self.extractor, cancel).await {
            Ok(page) => {
                tracing::debug!(
                    "[depth {}] {} -> {} ({} links, {:?})",
                    task.depth,
                    task.url,
                    page.status_code,
                    page.links.len(),
                    page.response_time
                );

                let expand = task.depth < self.max_depth;
                let frontier = if expand { page.links.clone() } else { Vec::new() };

                lock(&self.store).insert(PageRecord {
                    url: task.url.clone(),
                    status_code: page.status_code,
                    depth: task.depth,
                    parent_url: task.parent_url.clone(),
                    links: page.links,
                    response_time: page.response_time,
                });

                for link in frontier {
                    if self.visited.try_mark(&link) {
                        self.enqueue(sender, task.child(link));
                    } else {
                        tracing::trace!("Already visited: {}", link);
                    }
                }
            }
            Err(FetchError::Cancelled { url }) => {
                // Left pending: the page was neither recorded nor dropped
                tracing::debug!("Abandoned {} on cancellation", url);
                return;
            }
            Err(e) => {
                tracing::warn!("Dropping {}: {}", task.url, e);
                let dropped = DroppedLink {
                    url: task.url,
                    parent_url: task.parent_url,
                    depth: task.depth,
                    reason: e.to_string(),
                };
                if let Some(callback) = &self.dropped_callback {
                    callback(&dropped);
                }
                lock(&self.dropped).push(dropped);
            }
        }

        self.pending.task_completed();
    }

    fn take_store(&self) -> CrawlResultStore {
        std::mem::take(&mut *lock(&self.store))
    }

    fn take_dropped(&self) -> Vec<DroppedLink> {
        std::mem::take(&mut *lock(&self.dropped))
    }
}

/// Worker body: pop, process, repeat until shutdown or cancellation
async fn worker_loop(
    worker_id: usize,
    shared: Arc<CrawlShared>,
    queue: WorkQueue,
    sender: UnboundedSender<PageTask>,
    shutdown: CancellationToken,
    cancel: CancellationToken,
) {
    tracing::trace!("Worker {} started", worker_id);

    loop {
        if cancel.is_cancelled() {
            break;
        }

        let task = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            task = next_task(&queue) => match task {
                Some(task) => task,
                None => break,
            },
        };

        shared.process(task, &sender, &cancel).await;
    }

    tracing::trace!("Worker {} finished", worker_id);
}

async fn next_task(queue: &WorkQueue) -> Option<PageTask> {
    queue.lock().await.recv().await
}

// Critical sections are single pushes or takes, so poisoning is ignored.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Upper bound on pages a crawl can schedule: `Σ max_links^d` for d in 0..=max_depth
///
/// Returns None if the bound overflows `usize`.
pub fn max_in_flight_tasks(max_depth: u32, max_links: usize) -> Option<usize> {
    let mut total: usize = 0;
    let mut level: usize = 1;
    for depth in 0..=max_depth {
        if depth > 0 {
            level = level.checked_mul(max_links)?;
        }
        total = total.checked_add(level)?;
    }
    Some(total)
}
