//! Link type — the single entity curio owns.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Fallback title used when scraping cannot produce one.
pub const SCRAPE_FAILED_TITLE: &str = "[scrape failed]";

/// A cataloged link. Rows only come out of the catalog's save path,
/// which guarantees `title` is non-empty and `date` is set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Store-assigned id. Monotonically increasing and never reused;
    /// deletions leave gaps.
    pub id: i64,

    /// Username of the externally-managed owner.
    pub owner: String,

    /// Not unique at the storage layer; the catalog treats it as the
    /// natural dedup key.
    pub url: String,

    pub title: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Published-at timestamp, defaulted to save time when absent.
    pub date: DateTime<Utc>,

    /// Unordered at rest; order only matters when displayed.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,

    // Visibility flags are independent booleans. Derived viewing rights
    // live in `policy`, not on the entity.
    pub family: bool,
    pub friends: bool,
    pub public: bool,

    /// Reserved flag, defaults to true. Not consumed by the policy.
    pub shared: bool,
}

impl Link {
    /// Link URL at the Internet Archive.
    #[must_use]
    pub fn archive_url(&self) -> String {
        format!("https://web.archive.org/web/*/{}", self.url)
    }
}

/// Pre-save shape of a link: `title` may still be empty and `date`
/// unset. The catalog's fill pass resolves both before insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkDraft {
    pub owner: String,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub tags: Vec<String>,
    pub family: bool,
    pub friends: bool,
    pub public: bool,
    pub shared: bool,
}

impl LinkDraft {
    /// Bare intake draft: a URL and an owner. Title and date are
    /// resolved at save time.
    #[must_use]
    pub fn from_url(url: &str, owner: &str) -> Self {
        Self {
            owner: owner.to_string(),
            url: url.to_string(),
            title: String::new(),
            description: None,
            date: None,
            tags: Vec::new(),
            family: false,
            friends: false,
            public: false,
            shared: true,
        }
    }
}

impl Default for LinkDraft {
    fn default() -> Self {
        Self::from_url("", "")
    }
}

/// Full-replacement update payload. Every field here overwrites the
/// stored value; there is no partial-field diffing. `owner` is not part
/// of the payload and never changes on update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkUpdate {
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub date: DateTime<Utc>,
    pub family: bool,
    pub friends: bool,
    pub public: bool,
    pub shared: bool,
}
