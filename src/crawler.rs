use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::task::JoinSet;
use tokio::time::sleep;

use crate::admission::{self, PageVerdict};
use crate::analytics::Analytics;
use crate::config::{CrawlConfig, Limits};
use crate::frontier::{Frontier, FrontierStats};
use crate::network::{Fetcher, HttpClient};
use crate::store::{FrontierStore, StoreError};
use crate::url_utils::UrlPolicy;

/// Outcome of a finished crawl.
#[derive(Debug, Clone)]
pub struct CrawlReport {
    pub pages_processed: usize,
    pub pages_admitted: usize,
    pub urls_discovered: usize,
    pub duration: Duration,
    pub frontier: FrontierStats,
}

#[derive(Debug, Default)]
struct WorkerStats {
    pages_processed: usize,
    pages_admitted: usize,
    urls_discovered: usize,
}

/// Crawl session: one shared frontier drained by a pool of worker tasks.
pub struct Crawler<F: Fetcher> {
    config: CrawlConfig,
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    analytics: Arc<Analytics>,
    policy: Arc<UrlPolicy>,
    stop: Arc<AtomicBool>,
}

/// Wire a session against the real HTTP client. Opening a corrupt or
/// inaccessible store fails here, before any worker starts.
pub fn build(config: CrawlConfig, restart: bool) -> Result<Crawler<HttpClient>, StoreError> {
    let policy = Arc::new(UrlPolicy::new(config.allowed_domains.clone()));
    let store = FrontierStore::open(&config.data_dir, restart)?;
    let frontier = Arc::new(Frontier::open(
        store,
        &policy,
        &config.seed_urls,
        config.politeness_delay,
    )?);

    let analytics_path = config.data_dir.join("analytics.json");
    if restart {
        match std::fs::remove_file(&analytics_path) {
            Ok(()) => tracing::info!("restart requested, discarding analytics snapshot"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }
    let analytics = Arc::new(Analytics::open(analytics_path));

    let fetcher = Arc::new(HttpClient::new(
        config.user_agent.clone(),
        config.timeout_secs,
    ));

    Ok(Crawler::new(config, frontier, fetcher, analytics, policy))
}

impl<F: Fetcher> Crawler<F> {
    pub fn new(
        config: CrawlConfig,
        frontier: Arc<Frontier>,
        fetcher: Arc<F>,
        analytics: Arc<Analytics>,
        policy: Arc<UrlPolicy>,
    ) -> Self {
        Self {
            config,
            frontier,
            fetcher,
            analytics,
            policy,
            stop: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shared flag workers poll between iterations; setting it asks the pool
    /// to wind down after in-flight pages finish.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.stop)
    }

    pub fn frontier(&self) -> &Arc<Frontier> {
        &self.frontier
    }

    /// Run the pool to natural termination: every worker independently
    /// observes a drained frontier and stops; all workers are joined before
    /// this returns, so the final store and analytics state are flushed.
    pub async fn run(&self) -> CrawlReport {
        let start = Instant::now();
        let workers = self.config.workers.max(1);
        tracing::info!(workers, "starting crawl");

        let autosave = self.spawn_autosave_task();

        let mut pool = JoinSet::new();
        for id in 0..workers {
            pool.spawn(worker_loop(
                id,
                Arc::clone(&self.frontier),
                Arc::clone(&self.fetcher),
                Arc::clone(&self.analytics),
                Arc::clone(&self.policy),
                self.config.politeness_delay,
                Arc::clone(&self.stop),
            ));
        }

        let mut totals = WorkerStats::default();
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(stats) => {
                    totals.pages_processed += stats.pages_processed;
                    totals.pages_admitted += stats.pages_admitted;
                    totals.urls_discovered += stats.urls_discovered;
                }
                Err(e) => tracing::error!(error = %e, "worker task failed"),
            }
        }

        if let Some(task) = autosave {
            task.abort();
            if let Err(e) = task.await {
                if !e.is_cancelled() {
                    tracing::error!(error = %e, "autosave task failed");
                }
            }
        }
        self.analytics.save();

        let frontier = self.frontier.stats();
        tracing::info!(
            processed = totals.pages_processed,
            admitted = totals.pages_admitted,
            discovered = totals.urls_discovered,
            %frontier,
            "crawl finished"
        );

        CrawlReport {
            pages_processed: totals.pages_processed,
            pages_admitted: totals.pages_admitted,
            urls_discovered: totals.urls_discovered,
            duration: start.elapsed(),
            frontier,
        }
    }

    fn spawn_autosave_task(&self) -> Option<tokio::task::JoinHandle<()>> {
        if self.config.save_interval_secs == 0 {
            return None;
        }

        let interval = Duration::from_secs(self.config.save_interval_secs);
        let analytics = Arc::clone(&self.analytics);
        Some(tokio::spawn(async move {
            loop {
                sleep(interval).await;
                analytics.save();
            }
        }))
    }
}

/// One worker's fetch loop. The worker stops only through the idle-streak
/// rule; no per-URL failure may terminate it.
async fn worker_loop<F: Fetcher>(
    id: usize,
    frontier: Arc<Frontier>,
    fetcher: Arc<F>,
    analytics: Arc<Analytics>,
    policy: Arc<UrlPolicy>,
    politeness_delay: Duration,
    stop: Arc<AtomicBool>,
) -> WorkerStats {
    let mut stats = WorkerStats::default();
    let mut idle_polls = 0u32;

    loop {
        if stop.load(Ordering::Relaxed) {
            tracing::info!(worker = id, "stop requested, worker exiting");
            break;
        }

        let Some(url) = frontier.next_ready() else {
            idle_polls += 1;
            if idle_polls >= Limits::MAX_IDLE_POLLS {
                tracing::info!(worker = id, "frontier drained, worker stopping");
                break;
            }
            // Bounded backoff while domains sit on politeness cooldown.
            sleep(politeness_delay / 2).await;
            continue;
        };
        idle_polls = 0;

        match fetcher.fetch(&url).await {
            Ok(fetched) => {
                tracing::debug!(worker = id, %url, status = fetched.status, "fetched");
                match admission::assess(&url, &fetched, &policy) {
                    PageVerdict::Admitted { words, links } => {
                        stats.pages_admitted += 1;
                        analytics.record(&url, &words);
                        for link in links {
                            if frontier.add(&link) {
                                stats.urls_discovered += 1;
                            }
                        }
                    }
                    PageVerdict::Skip(reason) => {
                        tracing::debug!(worker = id, %url, ?reason, "page not admitted");
                    }
                }
            }
            Err(e) => {
                // Attempted is terminal: failed fetches are not retried.
                tracing::warn!(worker = id, %url, error = %e, "fetch failed");
            }
        }

        frontier.complete(&url);
        stats.pages_processed += 1;
    }

    stats
}
