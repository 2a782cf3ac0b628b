//! URL canonicalization and admission control shared across modules.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use url::Url;

use crate::config::Limits;

/// File extensions that never hold crawlable text content.
const DENYLISTED_EXTENSIONS: &[&str] = &[
    ".css", ".js", ".bmp", ".gif", ".jpg", ".jpeg", ".ico", ".png", ".tif", ".tiff", ".mid",
    ".mp2", ".mp3", ".mp4", ".wav", ".avi", ".mov", ".mpeg", ".ram", ".m4v", ".mkv", ".ogg",
    ".ogv", ".pdf", ".ps", ".eps", ".tex", ".ppt", ".pptx", ".doc", ".docx", ".xls", ".xlsx",
    ".names", ".data", ".dat", ".exe", ".bz2", ".tar", ".msi", ".bin", ".7z", ".psd", ".dmg",
    ".iso", ".epub", ".dll", ".cnf", ".tgz", ".sha1", ".thmx", ".mso", ".arff", ".rtf", ".jar",
    ".csv", ".rm", ".smil", ".wmv", ".swf", ".wma", ".zip", ".rar", ".gz",
];

/// Normalize a raw address into its canonical, fragment-free form.
///
/// Canonicalization relies on the `url` crate's serialization: the host is
/// lower-cased, the path is percent-encoding-normalized, and an empty path
/// becomes `/`. Idempotent: normalizing a canonical URL is a no-op.
pub fn normalize(raw: &str) -> Option<String> {
    let mut parsed = Url::parse(raw.trim()).ok()?;
    parsed.set_fragment(None);
    Some(parsed.to_string())
}

/// Stable 64-bit key for a canonical URL, used by the persistent store.
/// Collisions are treated as identity at this scale.
pub fn url_key(canonical: &str) -> u64 {
    let mut hasher = DefaultHasher::new();
    canonical.hash(&mut hasher);
    hasher.finish()
}

pub fn extract_host(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(|s| s.to_lowercase()))
}

/// Resolve an href against the address of the page it appeared on.
pub fn to_absolute(link: &str, base_url: &str) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    let absolute = base.join(link).ok()?;
    Some(absolute.to_string())
}

/// Scope and trap gate for the frontier. Holds the allow-list; everything
/// else it checks is structural.
#[derive(Debug, Clone)]
pub struct UrlPolicy {
    allowed_domains: Vec<String>,
}

impl UrlPolicy {
    pub fn new(allowed_domains: Vec<String>) -> Self {
        let allowed_domains = allowed_domains
            .into_iter()
            .map(|d| d.to_lowercase())
            .collect();
        Self { allowed_domains }
    }

    /// Whether a host is one of the allowed domains or a subdomain of one.
    pub fn in_scope(&self, host: &str) -> bool {
        self.allowed_domains
            .iter()
            .any(|d| host == d || host.ends_with(&format!(".{}", d)))
    }

    /// Decide whether a URL may enter the frontier. Pure and stateless;
    /// re-run on every persisted record at restart because the allow-list
    /// is configuration, not stored data.
    pub fn is_valid(&self, url: &str) -> bool {
        let parsed = match Url::parse(url) {
            Ok(u) => u,
            Err(_) => return false,
        };

        if !matches!(parsed.scheme(), "http" | "https") {
            return false;
        }

        let host = match parsed.host_str() {
            Some(h) => h.to_lowercase(),
            None => return false,
        };
        if !self.in_scope(&host) {
            return false;
        }

        // Crawler trap protections: runaway URL growth, endlessly deep
        // generated paths (calendar pagers), and oversized query strings.
        if url.len() > Limits::MAX_URL_LEN {
            return false;
        }
        if url.matches('/').count() > Limits::MAX_PATH_DEPTH {
            return false;
        }
        if parsed.query().map_or(0, str::len) > Limits::MAX_QUERY_LEN {
            return false;
        }

        let path = parsed.path().to_lowercase();
        !DENYLISTED_EXTENSIONS.iter().any(|ext| path.ends_with(ext))
    }
}
