//! Page scraping module.
//!
//! Fetches configured pages over HTTP and extracts the member count
//! via CSS selectors.

mod fetcher;

pub use fetcher::{extract_count, CountFetcher, FetchError, HttpFetcher};
