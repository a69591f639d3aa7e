//! HTTP page fetching and count extraction.

use async_trait::async_trait;
use reqwest::StatusCode;
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;

use crate::config::MetricSource;

/// Errors that can occur while fetching a count. All of them are
/// recoverable: the poll loop logs them and skips the cycle.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to '{url}' failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("'{url}' answered with HTTP {status}")]
    BadStatus { url: String, status: StatusCode },

    #[error("invalid CSS selector '{0}'")]
    BadSelector(String),

    #[error("selector '{0}' matched nothing in the page")]
    NoMatch(String),

    #[error("could not parse the member count. Expected a number but got '{0}'")]
    NotNumeric(String),
}

/// Fetches the current count for a metric source.
///
/// Implemented by [`HttpFetcher`]; tests substitute fakes.
#[async_trait]
pub trait CountFetcher: Send + Sync {
    async fn fetch(&self, source: &MetricSource) -> Result<u64, FetchError>;
}

/// Fetcher backed by a shared HTTP client.
///
/// No request timeout is configured beyond the client's defaults; a hang
/// delays the current poll cycle rather than failing it.
#[derive(Debug, Default)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    /// Creates a new fetcher with a default HTTP client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CountFetcher for HttpFetcher {
    async fn fetch(&self, source: &MetricSource) -> Result<u64, FetchError> {
        let response = self
            .client
            .get(&source.url)
            .send()
            .await
            .map_err(|e| FetchError::Http {
                url: source.url.clone(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus {
                url: source.url.clone(),
                status,
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Http {
            url: source.url.clone(),
            source: e,
        })?;

        extract_count(&body, source)
    }
}

/// Extracts the count from an HTML document according to the source's
/// selectors.
///
/// Elements matching `css_selector` form the selected set; matches of
/// `negative_css_selector` are removed from it; when `sub_css_selector`
/// is present, text is read from matching descendants instead. The
/// concatenated text is trimmed and its leading digits parsed.
///
/// # Errors
///
/// Returns an error for an invalid selector, an empty selected set, or
/// text that does not start with a number.
pub fn extract_count(html: &str, source: &MetricSource) -> Result<u64, FetchError> {
    let document = Html::parse_document(html);

    let selector = parse_selector(&source.css_selector)?;
    let negative = source
        .negative_css_selector
        .as_deref()
        .map(parse_selector)
        .transpose()?;
    let sub = source
        .sub_css_selector
        .as_deref()
        .map(parse_selector)
        .transpose()?;

    let mut selected: Vec<ElementRef<'_>> = document.select(&selector).collect();
    if let Some(negative) = &negative {
        selected.retain(|element| !negative.matches(element));
    }

    if selected.is_empty() {
        return Err(FetchError::NoMatch(source.css_selector.clone()));
    }

    let text: String = match &sub {
        Some(sub) => selected
            .iter()
            .flat_map(|element| element.select(sub))
            .flat_map(|element| element.text())
            .collect(),
        None => selected
            .iter()
            .flat_map(|element| element.text())
            .collect(),
    };

    let trimmed = text.trim();
    parse_leading_u64(trimmed).ok_or_else(|| FetchError::NotNumeric(trimmed.to_owned()))
}

fn parse_selector(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|_| FetchError::BadSelector(selector.to_owned()))
}

/// Parses the leading ASCII digits of a trimmed string, so text like
/// "1234 members" yields 1234.
fn parse_leading_u64(text: &str) -> Option<u64> {
    let digits: String = text.chars().take_while(char::is_ascii_digit).collect();
    if digits.is_empty() {
        None
    } else {
        digits.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(css_selector: &str) -> MetricSource {
        MetricSource {
            label: "Members".to_owned(),
            url: "https://forum.test/stats".to_owned(),
            css_selector: css_selector.to_owned(),
            negative_css_selector: None,
            sub_css_selector: None,
        }
    }

    #[test]
    fn test_extracts_simple_count() {
        let html = r#"<html><body><span id="member-count"> 1234 </span></body></html>"#;
        assert_eq!(extract_count(html, &source("#member-count")).unwrap(), 1234);
    }

    #[test]
    fn test_negative_selector_excludes_elements() {
        let html = concat!(
            r#"<div><span class="count">42</span>"#,
            r#"<span class="count bots">7</span></div>"#,
        );
        let mut src = source(".count");
        src.negative_css_selector = Some(".bots".to_owned());
        assert_eq!(extract_count(html, &src).unwrap(), 42);
    }

    #[test]
    fn test_sub_selector_reads_descendants() {
        let html = concat!(
            r#"<div id="card"><h3>Members</h3>"#,
            r#"<b class="value">99</b></div>"#,
        );
        let mut src = source("#card");
        src.sub_css_selector = Some(".value".to_owned());
        assert_eq!(extract_count(html, &src).unwrap(), 99);
    }

    #[test]
    fn test_zero_is_a_valid_count() {
        let html = r#"<p id="online">0</p>"#;
        assert_eq!(extract_count(html, &source("#online")).unwrap(), 0);
    }

    #[test]
    fn test_leading_digits_are_parsed() {
        let html = r#"<p id="online">816 players online</p>"#;
        assert_eq!(extract_count(html, &source("#online")).unwrap(), 816);
    }

    #[test]
    fn test_no_match_is_reported() {
        let html = r"<p>nothing here</p>";
        assert!(matches!(
            extract_count(html, &source("#missing")),
            Err(FetchError::NoMatch(_))
        ));
    }

    #[test]
    fn test_non_numeric_text_is_reported() {
        let html = r#"<p id="online">n/a</p>"#;
        match extract_count(html, &source("#online")) {
            Err(FetchError::NotNumeric(text)) => assert_eq!(text, "n/a"),
            other => panic!("expected NotNumeric, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_selector_is_reported() {
        let html = r"<p>1</p>";
        assert!(matches!(
            extract_count(html, &source("p[")),
            Err(FetchError::BadSelector(_))
        ));
    }

    #[test]
    fn test_parse_leading_u64() {
        assert_eq!(parse_leading_u64("1234"), Some(1234));
        assert_eq!(parse_leading_u64("42nd"), Some(42));
        assert_eq!(parse_leading_u64("0"), Some(0));
        assert_eq!(parse_leading_u64(""), None);
        assert_eq!(parse_leading_u64("abc"), None);
    }
}
