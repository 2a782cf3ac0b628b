//! Crawl analytics: word frequencies, the longest page seen, and per-subdomain
//! page sets. Reporting is best-effort and asynchronous to the crawl path;
//! snapshot errors are logged, never propagated into workers.

use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use crate::url_utils;

/// English stopwords excluded from the frequency counts.
const STOPWORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and", "any", "are",
    "aren't", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can't", "cannot", "could", "couldn't", "did", "didn't", "do", "does", "doesn't",
    "doing", "don't", "down", "during", "each", "few", "for", "from", "further", "had", "hadn't",
    "has", "hasn't", "have", "haven't", "having", "he", "he'd", "he'll", "he's", "her", "here",
    "here's", "hers", "herself", "him", "himself", "his", "how", "how's", "i", "i'd", "i'll",
    "i'm", "i've", "if", "in", "into", "is", "isn't", "it", "it's", "its", "itself", "let's",
    "me", "more", "most", "mustn't", "my", "myself", "no", "nor", "not", "of", "off", "on",
    "once", "only", "or", "other", "ought", "our", "ours", "ourselves", "out", "over", "own",
    "same", "shan't", "she", "she'd", "she'll", "she's", "should", "shouldn't", "so", "some",
    "such", "than", "that", "that's", "the", "their", "theirs", "them", "themselves", "then",
    "there", "there's", "these", "they", "they'd", "they'll", "they're", "they've", "this",
    "those", "through", "to", "too", "under", "until", "up", "very", "was", "wasn't", "we",
    "we'd", "we'll", "we're", "we've", "were", "weren't", "what", "what's", "when", "when's",
    "where", "where's", "which", "while", "who", "who's", "whom", "why", "why's", "with",
    "won't", "would", "wouldn't", "you", "you'd", "you'll", "you're", "you've", "your", "yours",
    "yourself", "yourselves",
];

fn is_stopword(word: &str) -> bool {
    STOPWORDS.contains(&word)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LongestPage {
    pub url: Option<String>,
    pub words: usize,
}

/// Serializable snapshot of everything the sink has accumulated.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyticsReport {
    pub word_freq: BTreeMap<String, u64>,
    pub longest_page: LongestPage,
    pub subdomain_pages: BTreeMap<String, BTreeSet<String>>,
}

/// Analytics sink owned by the crawl session and shared across workers.
pub struct Analytics {
    path: PathBuf,
    inner: Mutex<AnalyticsReport>,
}

impl Analytics {
    /// Open the sink backed by a JSON snapshot file. A previous snapshot is
    /// loaded so a resumed crawl keeps accumulating; a missing or unreadable
    /// snapshot degrades to empty state with a warning.
    pub fn open(path: PathBuf) -> Self {
        let report = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(report) => report,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "discarding unreadable analytics snapshot");
                    AnalyticsReport::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => AnalyticsReport::default(),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "failed to read analytics snapshot");
                AnalyticsReport::default()
            }
        };

        Self {
            path,
            inner: Mutex::new(report),
        }
    }

    /// Record one admitted page: its stopword-filtered tokens feed the
    /// frequency map, its total word count competes for longest page, and its
    /// URL lands in the owning host's page set.
    pub fn record(&self, url: &str, words: &[String]) {
        let mut inner = self.inner.lock();

        for word in words {
            if !is_stopword(word) {
                *inner.word_freq.entry(word.clone()).or_insert(0) += 1;
            }
        }

        if words.len() > inner.longest_page.words {
            inner.longest_page = LongestPage {
                url: Some(url.to_string()),
                words: words.len(),
            };
        }

        if let Some(host) = url_utils::extract_host(url) {
            inner
                .subdomain_pages
                .entry(host)
                .or_default()
                .insert(url.to_string());
        }
    }

    pub fn snapshot(&self) -> AnalyticsReport {
        self.inner.lock().clone()
    }

    /// The `n` most frequent non-stopword tokens, ties broken alphabetically.
    pub fn top_words(&self, n: usize) -> Vec<(String, u64)> {
        let mut entries: Vec<(String, u64)> = {
            let inner = self.inner.lock();
            inner
                .word_freq
                .iter()
                .map(|(w, c)| (w.clone(), *c))
                .collect()
        };
        entries.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        entries.truncate(n);
        entries
    }

    /// Write the snapshot to disk. Best-effort: serialization happens under
    /// the lock, the write does not, and any failure is only logged.
    pub fn save(&self) {
        let report = self.snapshot();
        match serde_json::to_string_pretty(&report) {
            Ok(json) => {
                if let Err(e) = std::fs::write(&self.path, json) {
                    tracing::warn!(path = %self.path.display(), error = %e, "failed to save analytics snapshot");
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "failed to serialize analytics snapshot");
            }
        }
    }
}
