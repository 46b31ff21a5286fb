//! Explicit runtime configuration.
//!
//! Passed into the composer, catalog, and scraper as a value; nothing
//! reads ambient global state.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database location.
    pub db_path: PathBuf,

    /// Listing page size.
    pub page_size: usize,

    /// Cap for the export listing.
    pub export_limit: usize,

    /// Upper bound on a title-scrape fetch, in seconds. The fetch must
    /// never stall a save indefinitely.
    pub scrape_timeout_secs: u64,

    /// User agent sent with scrape requests.
    pub user_agent: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("curio.db"),
            page_size: 25,
            export_limit: 10,
            scrape_timeout_secs: 10,
            user_agent: format!("curio/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}
