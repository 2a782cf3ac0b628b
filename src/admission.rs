//! Page admission: decides whether a fetched page contributes links and
//! analytics at all, and filters the outbound links of pages that do.

use std::collections::HashSet;

use crate::config::Limits;
use crate::network::FetchResult;
use crate::parser;
use crate::url_utils::{self, UrlPolicy};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Non-success status, empty body, or a non-HTML content type.
    NoContent,
    /// Success status but essentially no extracted text.
    Dead,
    /// Real text, but too little to trust the page's outbound links;
    /// navigation-only pages are a common duplicate-content trap.
    LowInfo,
}

#[derive(Debug)]
pub enum PageVerdict {
    Skip(SkipReason),
    Admitted {
        words: Vec<String>,
        /// Absolute, canonical, in-scope links, deduplicated within the page.
        links: Vec<String>,
    },
}

fn is_html_content_type(content_type: &str) -> bool {
    let lower = content_type.to_ascii_lowercase();
    lower.starts_with("text/html") || lower.starts_with("application/xhtml+xml")
}

/// Assess one fetch result. Never fails: unparseable HTML degrades to zero
/// words and zero links.
pub fn assess(page_url: &str, fetched: &FetchResult, policy: &UrlPolicy) -> PageVerdict {
    if !fetched.is_success() || fetched.body.is_empty() {
        return PageVerdict::Skip(SkipReason::NoContent);
    }
    if let Some(ct) = fetched.content_type.as_deref() {
        if !is_html_content_type(ct) {
            return PageVerdict::Skip(SkipReason::NoContent);
        }
    }

    let words = parser::extract_words(&fetched.body);
    if words.len() < Limits::DEAD_PAGE_WORDS {
        return PageVerdict::Skip(SkipReason::Dead);
    }
    if words.len() < Limits::LOW_INFO_WORDS {
        return PageVerdict::Skip(SkipReason::LowInfo);
    }

    let mut seen_keys = HashSet::new();
    let links = parser::extract_links(&fetched.body)
        .into_iter()
        .filter_map(|href| url_utils::to_absolute(&href, page_url))
        .filter_map(|absolute| url_utils::normalize(&absolute))
        .filter(|canonical| policy.is_valid(canonical))
        .filter(|canonical| seen_keys.insert(url_utils::url_key(canonical)))
        .collect();

    PageVerdict::Admitted { words, links }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy() -> UrlPolicy {
        UrlPolicy::new(vec!["ics.uci.edu".to_string()])
    }

    fn html_page(status: u16, body: &str) -> FetchResult {
        FetchResult {
            status,
            content_type: Some("text/html; charset=utf-8".to_string()),
            body: body.to_string(),
        }
    }

    fn body_with_words(count: usize, extra: &str) -> String {
        let words: Vec<String> = (0..count).map(|i| format!("word{i}")).collect();
        format!("<html><body><p>{}</p>{}</body></html>", words.join(" "), extra)
    }

    #[test]
    fn test_failed_fetch_contributes_nothing() {
        let verdict = assess("https://ics.uci.edu/", &html_page(404, "ignored"), &policy());
        assert!(matches!(verdict, PageVerdict::Skip(SkipReason::NoContent)));

        let verdict = assess("https://ics.uci.edu/", &html_page(200, ""), &policy());
        assert!(matches!(verdict, PageVerdict::Skip(SkipReason::NoContent)));
    }

    #[test]
    fn test_non_html_content_skipped() {
        let fetched = FetchResult {
            status: 200,
            content_type: Some("application/json".to_string()),
            body: "{\"not\": \"html\"}".to_string(),
        };
        let verdict = assess("https://ics.uci.edu/", &fetched, &policy());
        assert!(matches!(verdict, PageVerdict::Skip(SkipReason::NoContent)));
    }

    #[test]
    fn test_dead_page_threshold() {
        let body = body_with_words(5, "<a href=\"/a\">go</a>");
        let verdict = assess("https://ics.uci.edu/", &html_page(200, &body), &policy());
        // 5 body words + 1 anchor word stays under the dead-page floor.
        assert!(matches!(verdict, PageVerdict::Skip(SkipReason::Dead)));
    }

    #[test]
    fn test_low_info_page_propagates_no_links() {
        let body = body_with_words(25, "<a href=\"/a\">go</a>");
        let verdict = assess("https://ics.uci.edu/", &html_page(200, &body), &policy());
        assert!(matches!(verdict, PageVerdict::Skip(SkipReason::LowInfo)));
    }

    #[test]
    fn test_admitted_page_yields_filtered_links() {
        let body = body_with_words(
            40,
            concat!(
                "<a href=\"/a\">one</a>",
                "<a href=\"/a#section\">two</a>",
                "<a href=\"https://evil.com/b\">three</a>",
                "<a href=\"/paper.pdf\">four</a>",
            ),
        );
        let verdict = assess("https://ics.uci.edu/", &html_page(200, &body), &policy());

        match verdict {
            PageVerdict::Admitted { words, links } => {
                assert!(words.len() >= 40);
                // The fragment duplicate, the out-of-scope host, and the
                // denylisted extension are all gone.
                assert_eq!(links, vec!["https://ics.uci.edu/a".to_string()]);
            }
            other => panic!("expected admission, got {other:?}"),
        }
    }

    #[test]
    fn test_unparseable_html_is_not_fatal() {
        let verdict = assess(
            "https://ics.uci.edu/",
            &html_page(200, "<<<%%% not really html"),
            &policy(),
        );
        // Whatever tokens survive, the page simply lands in a skip bucket.
        assert!(matches!(verdict, PageVerdict::Skip(_)));
    }
}
