pub mod admission;
pub mod analytics;
pub mod cli;
pub mod config;
pub mod crawler;
pub mod frontier;
pub mod logging;
pub mod network;
pub mod parser;
pub mod store;
pub mod url_utils;

// Re-export main types for library usage
pub use admission::{PageVerdict, SkipReason};
pub use analytics::{Analytics, AnalyticsReport};
pub use config::{CrawlConfig, Limits};
pub use crawler::{CrawlReport, Crawler};
pub use frontier::{Frontier, FrontierStats};
pub use network::{FetchError, FetchResult, Fetcher, HttpClient};
pub use store::{FrontierRecord, FrontierStore, StoreError};
pub use url_utils::UrlPolicy;
