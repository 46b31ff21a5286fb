//! # curio-scrape
//!
//! HTTP title scraper: the concrete [`TitleSource`] backing the
//! catalog's save path.
//!
//! Only `http`/`https` URLs are fetched. The request carries the
//! configured user agent and timeout; a 200/301/302 response is
//! accepted and the first `<title>` element's text becomes the title.
//! Every failure maps to a [`ScrapeError`] the catalog downgrades to
//! the sentinel title.

use std::time::Duration;

use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use curio_core::config::Config;
use curio_core::error::ScrapeError;
use curio_core::scrape::TitleSource;

/// Blocking HTTP title source.
pub struct HttpTitleSource {
    client: reqwest::blocking::Client,
}

impl HttpTitleSource {
    /// Build a client with the configured user agent and timeout.
    ///
    /// # Errors
    ///
    /// Returns [`ScrapeError::Http`] if the client cannot be built.
    pub fn new(config: &Config) -> Result<Self, ScrapeError> {
        let client = reqwest::blocking::Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.scrape_timeout_secs))
            .build()
            .map_err(|e| ScrapeError::Http(e.to_string()))?;
        Ok(Self { client })
    }
}

impl TitleSource for HttpTitleSource {
    fn fetch_title(&self, url: &str) -> Result<String, ScrapeError> {
        let parsed = Url::parse(url).map_err(|e| ScrapeError::InvalidUrl(e.to_string()))?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => return Err(ScrapeError::UnsupportedScheme(other.to_string())),
        }

        let response = self
            .client
            .get(parsed.as_str())
            .send()
            .map_err(|e| ScrapeError::Http(e.to_string()))?;

        let status = response.status().as_u16();
        if !matches!(status, 200 | 301 | 302) {
            return Err(ScrapeError::Status(status));
        }

        let body = response
            .text()
            .map_err(|e| ScrapeError::Http(e.to_string()))?;
        debug!(url, bytes = body.len(), "fetched page for title scrape");

        extract_title(&body).ok_or(ScrapeError::NoTitle)
    }
}

/// First `<title>` element's text, trimmed. `None` when the document
/// has no non-empty title.
#[must_use]
pub fn extract_title(html: &str) -> Option<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("title").ok()?;
    let element = document.select(&selector).next()?;
    let text: String = element.text().collect();
    let text = text.trim().to_string();
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_non_http_schemes_before_any_fetch() {
        let source = HttpTitleSource::new(&Config::default()).unwrap();

        assert!(matches!(
            source.fetch_title("ftp://x"),
            Err(ScrapeError::UnsupportedScheme(scheme)) if scheme == "ftp"
        ));
        assert!(matches!(
            source.fetch_title("mailto:ana@example.com"),
            Err(ScrapeError::UnsupportedScheme(_))
        ));
    }

    #[test]
    fn rejects_unparseable_urls() {
        let source = HttpTitleSource::new(&Config::default()).unwrap();
        assert!(matches!(
            source.fetch_title("not a url"),
            Err(ScrapeError::InvalidUrl(_))
        ));
    }

    #[test]
    fn extracts_first_title_text() {
        let html = "<html><head><title>The Last Ring-bearer</title></head>\
                    <body><title>Not this one</title></body></html>";
        assert_eq!(
            extract_title(html),
            Some("The Last Ring-bearer".to_string())
        );
    }

    #[test]
    fn trims_whitespace_around_title() {
        let html = "<title>\n  Spaced Out  \n</title>";
        assert_eq!(extract_title(html), Some("Spaced Out".to_string()));
    }

    #[test]
    fn missing_or_empty_title_yields_none() {
        assert_eq!(extract_title("<html><body><p>no title</p></body></html>"), None);
        assert_eq!(extract_title("<title>   </title>"), None);
    }
}
