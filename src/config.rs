use std::path::PathBuf;
use std::time::Duration;

/// Runtime configuration for one crawl session.
#[derive(Debug, Clone)]
pub struct CrawlConfig {
    /// Initial addresses injected into the frontier on a fresh start.
    pub seed_urls: Vec<String>,
    /// Hosts (and their subdomains) the crawl is allowed to visit.
    pub allowed_domains: Vec<String>,
    /// Directory holding the frontier store, analytics snapshot, and logs.
    pub data_dir: PathBuf,
    /// Number of concurrent worker tasks.
    pub workers: usize,
    /// Minimum interval between two dispatches to the same domain.
    pub politeness_delay: Duration,
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// How often the analytics snapshot is written to disk; 0 disables
    /// periodic saves (a final save still happens at shutdown).
    pub save_interval_secs: u64,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            seed_urls: Vec::new(),
            allowed_domains: Vec::new(),
            data_dir: PathBuf::from("./data"),
            workers: 8,
            politeness_delay: Duration::from_millis(500),
            user_agent: "Scopecrawl/0.1".to_string(),
            timeout_secs: 20,
            save_interval_secs: 300,
        }
    }
}

// Trap-protection and admission thresholds - single source of truth
pub struct Limits;

impl Limits {
    // URL admission
    pub const MAX_URL_LEN: usize = 2000;
    pub const MAX_PATH_DEPTH: usize = 20;
    pub const MAX_QUERY_LEN: usize = 100;

    // Page admission
    pub const DEAD_PAGE_WORDS: usize = 10;
    pub const LOW_INFO_WORDS: usize = 30;

    // Worker termination
    pub const MAX_IDLE_POLLS: u32 = 10;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = CrawlConfig::default();
        assert_eq!(config.workers, 8);
        assert_eq!(config.politeness_delay, Duration::from_millis(500));
        assert_eq!(config.timeout_secs, 20);
        assert!(config.seed_urls.is_empty());
    }

    #[test]
    fn test_threshold_ordering() {
        // The low-information floor must sit above the dead-page floor.
        assert!(Limits::LOW_INFO_WORDS > Limits::DEAD_PAGE_WORDS);
    }
}
