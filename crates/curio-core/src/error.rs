//! Error types for curio.

use thiserror::Error;

/// Top-level result type for curio operations.
pub type Result<T> = std::result::Result<T, CurioError>;

/// Top-level error type for curio.
#[derive(Debug, Error)]
pub enum CurioError {
    #[error("store error: {0}")]
    Store(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("scrape error: {0}")]
    Scrape(#[from] ScrapeError),

    #[error("link {0} not found")]
    NotFound(i64),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the title-scrape collaborator. Always recoverable: the
/// save path maps every variant to the sentinel title.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("unsupported scheme '{0}': only http and https are scraped")]
    UnsupportedScheme(String),

    #[error("invalid url: {0}")]
    InvalidUrl(String),

    #[error("http error: {0}")]
    Http(String),

    #[error("unexpected status {0}")]
    Status(u16),

    #[error("no title element in page")]
    NoTitle,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_display_human_readable_messages() {
        let err = CurioError::NotFound(42);
        assert!(err.to_string().contains("42"));

        let err = ScrapeError::UnsupportedScheme("ftp".to_string());
        let msg = err.to_string();
        assert!(msg.contains("ftp"));
        assert!(msg.contains("http"));
    }

    #[test]
    fn scrape_errors_convert_to_top_level() {
        let err: CurioError = ScrapeError::NoTitle.into();
        assert!(matches!(err, CurioError::Scrape(ScrapeError::NoTitle)));
    }
}
