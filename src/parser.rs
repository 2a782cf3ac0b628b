use scraper::{Html, Selector};

/// Extract all hyperlink targets from HTML content
///
/// # Arguments
/// * `html_body` - The HTML content as a string
///
/// # Returns
/// A vector of strings containing the href attributes of `<a>` tags,
/// relative or absolute, in document order
///
/// # Examples
/// ```
/// use scopecrawl::parser::extract_links;
///
/// let html = r#"<html><body><a href="https://example.com">Link</a></body></html>"#;
/// let links = extract_links(html);
/// assert_eq!(links, vec!["https://example.com"]);
/// ```
pub fn extract_links(html_body: &str) -> Vec<String> {
    let document = Html::parse_document(html_body);
    let selector = Selector::parse("a[href]").expect("Invalid CSS selector");

    let mut links = Vec::new();

    for element in document.select(&selector) {
        if let Some(href) = element.value().attr("href") {
            let cleaned_href = href.trim();

            // Skip empty links, javascript links, mailto, tel, etc.
            if !cleaned_href.is_empty()
                && !cleaned_href.starts_with("javascript:")
                && !cleaned_href.starts_with("mailto:")
                && !cleaned_href.starts_with("tel:")
                && !cleaned_href.starts_with("data:")
                && !cleaned_href.starts_with("file:") {
                links.push(cleaned_href.to_string());
            }
        }
    }

    links
}

/// Tokenize the text content of a page into lowercase ASCII words. The word
/// count drives page admission, so the tokenizer is deliberately simple:
/// split on anything that is not ASCII alphanumeric.
pub fn extract_words(html_body: &str) -> Vec<String> {
    let document = Html::parse_document(html_body);

    let mut words = Vec::new();
    for text in document.root_element().text() {
        for token in text.split(|c: char| !c.is_ascii_alphanumeric()) {
            if !token.is_empty() {
                words.push(token.to_ascii_lowercase());
            }
        }
    }

    words
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_absolute_links() {
        let html = "<html><body><a href=\"https://example.com/page1\">Link 1</a><a href=\"https://example.com/page2\">Link 2</a><a href=\"https://other-site.com/about\">External Link</a></body></html>";

        let links = extract_links(html);
        let expected = vec![
            "https://example.com/page1".to_string(),
            "https://example.com/page2".to_string(),
            "https://other-site.com/about".to_string(),
        ];

        assert_eq!(links, expected);
    }

    #[test]
    fn test_extract_relative_links() {
        let html = "<html><body><a href=\"/about\">About</a><a href=\"../parent\">Parent</a><a href=\"relative/path\">Relative Path</a><a href=\"#section\">Anchor</a></body></html>";

        let links = extract_links(html);
        let expected = vec![
            "/about".to_string(),
            "../parent".to_string(),
            "relative/path".to_string(),
            "#section".to_string(),
        ];

        assert_eq!(links, expected);
    }

    #[test]
    fn test_skips_non_navigable_schemes() {
        let html = "<html><body><a href=\"mailto:a@b.c\">Mail</a><a href=\"javascript:void(0)\">JS</a><a href=\"tel:+1555\">Call</a><a href=\"/ok\">Ok</a></body></html>";

        let links = extract_links(html);
        assert_eq!(links, vec!["/ok".to_string()]);
    }

    #[test]
    fn test_no_links_present() {
        let html = "<html><body><h1>No Links Here</h1><p>Just some text content.</p></body></html>";

        let links = extract_links(html);
        assert!(links.is_empty());
    }

    #[test]
    fn test_malformed_html() {
        let html = "<html><body><a href=\"https://example.com\">Valid Link</a><div>Unclosed div<p>Some text without closing tag</body></html>";

        // The scraper library should handle malformed HTML gracefully
        let links = extract_links(html);
        assert_eq!(links, vec!["https://example.com".to_string()]);
    }

    #[test]
    fn test_extract_words_lowercases_and_splits() {
        let html = "<html><body><p>Hello, World! Rust-lang 2024</p></body></html>";

        let words = extract_words(html);
        assert_eq!(words, vec!["hello", "world", "rust", "lang", "2024"]);
    }

    #[test]
    fn test_extract_words_drops_non_ascii_tokens() {
        let html = "<html><body><p>caf\u{e9} und gr\u{fc}n ok</p></body></html>";

        let words = extract_words(html);
        // Non-ASCII characters act as separators, leaving the ASCII runs.
        assert!(words.contains(&"und".to_string()));
        assert!(words.contains(&"ok".to_string()));
        assert!(!words.contains(&"caf\u{e9}".to_string()));
    }

    #[test]
    fn test_extract_words_includes_anchor_text() {
        let html = "<html><body><p>intro text</p><a href=\"/x\">link label</a></body></html>";

        let words = extract_words(html);
        assert_eq!(words, vec!["intro", "text", "link", "label"]);
    }

    #[test]
    fn test_empty_html() {
        assert!(extract_links("").is_empty());
        assert!(extract_words("").is_empty());
    }
}
