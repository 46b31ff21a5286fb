//! Seam to the scrape collaborator.

use crate::error::ScrapeError;

/// Produces a page title for a URL.
///
/// The catalog treats every failure as non-fatal and falls back to the
/// sentinel title; implementations should not retry internally.
pub trait TitleSource {
    /// Fetch the title for `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError`] when the URL is not scrapeable or the
    /// page yields no title.
    fn fetch_title(&self, url: &str) -> Result<String, ScrapeError>;
}
