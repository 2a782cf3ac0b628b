use std::collections::{HashMap, VecDeque};
use std::time::{Duration, Instant};

use parking_lot::Mutex;

use crate::store::{FrontierRecord, FrontierStore, StoreError};
use crate::url_utils::{self, UrlPolicy};

/// Frontier progress snapshot.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrontierStats {
    pub total: usize,
    pub completed: usize,
    pub queued: usize,
}

impl std::fmt::Display for FrontierStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Frontier: {} discovered, {} completed, {} queued",
            self.total, self.completed, self.queued
        )
    }
}

// Ready queue, politeness clocks, and the store write path all live under one
// lock; scheduler calls are brief critical sections and never span a fetch.
struct FrontierInner {
    ready: VecDeque<String>,
    last_dispatch: HashMap<String, Instant>,
    store: FrontierStore,
}

/// Single authority for what may be fetched next. Enforces at-most-one
/// in-flight dispatch per URL (entries leave the ready queue at dispatch),
/// a minimum inter-request interval per domain, and durable discovery and
/// completion events.
pub struct Frontier {
    politeness_delay: Duration,
    inner: Mutex<FrontierInner>,
}

impl Frontier {
    /// Replay the store into a fresh scheduler. Incomplete records that still
    /// pass current validation repopulate the ready queue; completed or
    /// now-invalid records are skipped. An empty store is seeded.
    pub fn open(
        store: FrontierStore,
        policy: &UrlPolicy,
        seeds: &[String],
        politeness_delay: Duration,
    ) -> Result<Self, StoreError> {
        let mut ready = VecDeque::new();
        let mut total = 0usize;
        store.for_each(|record| {
            total += 1;
            if !record.completed && policy.is_valid(&record.canonical_url) {
                ready.push_back(record.canonical_url);
            }
        })?;

        let frontier = Self {
            politeness_delay,
            inner: Mutex::new(FrontierInner {
                ready,
                last_dispatch: HashMap::new(),
                store,
            }),
        };

        if total == 0 {
            let seeded = seeds.iter().filter(|seed| frontier.add(seed.as_str())).count();
            tracing::info!(seeded, "seeded empty frontier");
        } else {
            let stats = frontier.stats();
            tracing::info!(
                queued = stats.queued,
                total = stats.total,
                "replayed persisted frontier"
            );
        }

        Ok(frontier)
    }

    /// Record a discovered URL. Idempotent: a key already in the store is a
    /// no-op. Returns true when the URL was newly enqueued.
    pub fn add(&self, raw_url: &str) -> bool {
        let Some(canonical) = url_utils::normalize(raw_url) else {
            tracing::debug!(url = raw_url, "dropping unparseable url");
            return false;
        };
        let key = url_utils::url_key(&canonical);

        let mut inner = self.inner.lock();
        match inner.store.contains(key) {
            Ok(true) => false,
            Ok(false) => {
                let record = FrontierRecord {
                    canonical_url: canonical.clone(),
                    completed: false,
                };
                if let Err(e) = inner.store.upsert(key, &record) {
                    tracing::error!(url = %canonical, error = %e, "failed to persist discovery");
                    return false;
                }
                inner.ready.push_back(canonical);
                true
            }
            Err(e) => {
                tracing::error!(url = %canonical, error = %e, "frontier store lookup failed");
                false
            }
        }
    }

    /// Dequeue the first arrival-ordered URL whose domain is past its
    /// politeness window, stamping that domain's last-dispatch time before
    /// returning. `None` means nothing is eligible right now; callers
    /// distinguish "all on cooldown" from "drained" via [`is_drained`].
    ///
    /// [`is_drained`]: Frontier::is_drained
    pub fn next_ready(&self) -> Option<String> {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let now = Instant::now();

        let ready = &inner.ready;
        let last_dispatch = &inner.last_dispatch;
        let idx = ready.iter().position(|url| {
            match url_utils::extract_host(url) {
                Some(host) => match last_dispatch.get(&host) {
                    Some(last) => now.duration_since(*last) >= self.politeness_delay,
                    None => true,
                },
                // A record with no parseable host cannot be paced; let it
                // through so the fetch path retires it.
                None => true,
            }
        })?;

        let url = inner.ready.remove(idx)?;
        if let Some(host) = url_utils::extract_host(&url) {
            // Stamped at dispatch, not completion: this is what spaces two
            // consecutive requests to the same domain.
            inner.last_dispatch.insert(host, now);
        }
        Some(url)
    }

    /// Durably mark a URL's record completed. Completing a URL the store has
    /// never seen is an anomaly: logged, then written complete anyway.
    pub fn complete(&self, canonical_url: &str) {
        let key = url_utils::url_key(canonical_url);
        let mut inner = self.inner.lock();

        match inner.store.contains(key) {
            Ok(false) => {
                tracing::warn!(url = canonical_url, "completed a url that was never discovered");
            }
            Err(e) => {
                tracing::error!(url = canonical_url, error = %e, "frontier store lookup failed");
            }
            Ok(true) => {}
        }

        let record = FrontierRecord {
            canonical_url: canonical_url.to_string(),
            completed: true,
        };
        if let Err(e) = inner.store.upsert(key, &record) {
            tracing::error!(url = canonical_url, error = %e, "failed to persist completion");
        }
    }

    /// True when no discovered-but-unfetched work remains in memory.
    pub fn is_drained(&self) -> bool {
        self.inner.lock().ready.is_empty()
    }

    pub fn stats(&self) -> FrontierStats {
        let inner = self.inner.lock();
        let queued = inner.ready.len();
        match inner.store.counts() {
            Ok((total, completed)) => FrontierStats {
                total,
                completed,
                queued,
            },
            Err(e) => {
                tracing::error!(error = %e, "frontier store scan failed");
                FrontierStats {
                    queued,
                    ..Default::default()
                }
            }
        }
    }
}
