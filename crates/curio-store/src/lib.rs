//! # curio-store
//!
//! SQLite-backed Link Store and Tag Index for curio.
//!
//! Holds the persisted link collection:
//! - `links` table for the entity rows
//! - `link_tags` table for exact-match tag lookups
//!
//! Ids come from `INTEGER PRIMARY KEY AUTOINCREMENT`: monotonically
//! increasing, never reused, so deletions leave gaps in the id space.
//! Dates are stored as RFC 3339 UTC strings, which sort
//! lexicographically.

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::debug;

use curio_core::error::CurioError;
use curio_core::link::{Link, LinkDraft};

/// Column list every link-returning query must select, in this order.
pub const LINK_COLUMNS: &str =
    "id, owner, url, title, description, date, tags, family, friends, public, shared";

/// The LinkStore manages the SQLite link database.
pub struct LinkStore {
    conn: Connection,
}

impl LinkStore {
    /// Open or create a link database at the given path.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self, CurioError> {
        let conn = Connection::open(path).map_err(|e| CurioError::Store(e.to_string()))?;
        let store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    /// Create an in-memory store (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if schema creation fails.
    pub fn in_memory() -> Result<Self, CurioError> {
        let conn = Connection::open_in_memory().map_err(|e| CurioError::Store(e.to_string()))?;
        let store = Self { conn };
        store.create_schema()?;
        Ok(store)
    }

    fn create_schema(&self) -> Result<(), CurioError> {
        self.conn
            .execute_batch(
                "
            CREATE TABLE IF NOT EXISTS links (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                owner TEXT NOT NULL,
                url TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                tags TEXT NOT NULL DEFAULT '',
                family INTEGER NOT NULL DEFAULT 0,
                friends INTEGER NOT NULL DEFAULT 0,
                public INTEGER NOT NULL DEFAULT 0,
                shared INTEGER NOT NULL DEFAULT 1
            );

            CREATE TABLE IF NOT EXISTS link_tags (
                link_id INTEGER NOT NULL,
                tag TEXT NOT NULL,
                PRIMARY KEY (link_id, tag)
            );

            CREATE INDEX IF NOT EXISTS idx_links_date ON links(date);
            CREATE INDEX IF NOT EXISTS idx_links_url ON links(url);
            CREATE INDEX IF NOT EXISTS idx_link_tags_tag ON link_tags(tag);
            ",
            )
            .map_err(|e| CurioError::Store(e.to_string()))?;

        Ok(())
    }

    /// Insert a filled draft and return the stored link with its
    /// assigned id.
    ///
    /// The draft must already have a non-empty title and a date; the
    /// catalog's fill pass guarantees both.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the draft is unfilled or the
    /// insert fails.
    pub fn insert(&self, draft: &LinkDraft) -> Result<Link, CurioError> {
        let date = filled_date(draft)?;
        filled_title(draft)?;

        self.conn
            .execute(
                "INSERT INTO links
                (owner, url, title, description, date, tags, family, friends, public, shared)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
                params![
                    draft.owner,
                    draft.url,
                    draft.title,
                    draft.description,
                    date.to_rfc3339(),
                    join_tags(&draft.tags),
                    draft.family,
                    draft.friends,
                    draft.public,
                    draft.shared,
                ],
            )
            .map_err(|e| CurioError::Store(e.to_string()))?;

        let id = self.conn.last_insert_rowid();
        self.write_tags(id, &draft.tags)?;
        debug!(id, url = %draft.url, "inserted link");

        Ok(stored_link(id, draft, date))
    }

    /// Replace every field of the link row `id` with the draft's
    /// values. Same fill requirements as [`LinkStore::insert`].
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::NotFound`] if no row has that id,
    /// [`CurioError::Store`] on write failure.
    pub fn update(&self, id: i64, draft: &LinkDraft) -> Result<Link, CurioError> {
        let date = filled_date(draft)?;
        filled_title(draft)?;

        let changed = self
            .conn
            .execute(
                "UPDATE links SET
                owner = ?1, url = ?2, title = ?3, description = ?4, date = ?5,
                tags = ?6, family = ?7, friends = ?8, public = ?9, shared = ?10
                WHERE id = ?11",
                params![
                    draft.owner,
                    draft.url,
                    draft.title,
                    draft.description,
                    date.to_rfc3339(),
                    join_tags(&draft.tags),
                    draft.family,
                    draft.friends,
                    draft.public,
                    draft.shared,
                    id,
                ],
            )
            .map_err(|e| CurioError::Store(e.to_string()))?;

        if changed == 0 {
            return Err(CurioError::NotFound(id));
        }
        self.write_tags(id, &draft.tags)?;
        debug!(id, "updated link");

        Ok(stored_link(id, draft, date))
    }

    /// Fetch a link by id.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the lookup fails.
    pub fn get(&self, id: i64) -> Result<Option<Link>, CurioError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {LINK_COLUMNS} FROM links WHERE id = ?1"))
            .map_err(|e| CurioError::Store(e.to_string()))?;

        stmt.query_row(params![id], row_to_link)
            .optional()
            .map_err(|e| CurioError::Store(e.to_string()))
    }

    /// Find the oldest link with this exact URL, if any. The dedup
    /// lookup the catalog's intake path relies on.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the lookup fails.
    pub fn find_by_url(&self, url: &str) -> Result<Option<Link>, CurioError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {LINK_COLUMNS} FROM links WHERE url = ?1 ORDER BY id LIMIT 1"
            ))
            .map_err(|e| CurioError::Store(e.to_string()))?;

        stmt.query_row(params![url], row_to_link)
            .optional()
            .map_err(|e| CurioError::Store(e.to_string()))
    }

    /// Highest id currently in the store, `0` when empty. Upper bound
    /// for the random picker's draw.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the query fails.
    pub fn max_id(&self) -> Result<i64, CurioError> {
        self.conn
            .query_row("SELECT IFNULL(MAX(id), 0) FROM links", [], |row| row.get(0))
            .map_err(|e| CurioError::Store(e.to_string()))
    }

    /// Remove a link row and its tag rows. An administrative
    /// operation; the lifecycle itself never deletes.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the delete fails.
    pub fn delete(&self, id: i64) -> Result<(), CurioError> {
        self.conn
            .execute("DELETE FROM link_tags WHERE link_id = ?1", params![id])
            .map_err(|e| CurioError::Store(e.to_string()))?;
        self.conn
            .execute("DELETE FROM links WHERE id = ?1", params![id])
            .map_err(|e| CurioError::Store(e.to_string()))?;
        Ok(())
    }

    /// Count of stored links.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the query fails.
    pub fn count(&self) -> Result<u64, CurioError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM links", [], |row| row.get(0))
            .map_err(|e| CurioError::Store(e.to_string()))?;
        Ok(count as u64)
    }

    /// Tags recorded for one link, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the query fails.
    pub fn tags_for_link(&self, id: i64) -> Result<Vec<String>, CurioError> {
        let mut stmt = self
            .conn
            .prepare("SELECT tag FROM link_tags WHERE link_id = ?1 ORDER BY tag")
            .map_err(|e| CurioError::Store(e.to_string()))?;

        let tags = stmt
            .query_map(params![id], |row| row.get(0))
            .map_err(|e| CurioError::Store(e.to_string()))?
            .collect::<std::result::Result<Vec<String>, _>>()
            .map_err(|e| CurioError::Store(e.to_string()))?;
        Ok(tags)
    }

    /// Links carrying at least one of the given tags (exact tag
    /// identity), newest first. Empty input yields an empty result.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the query fails.
    pub fn links_for_tags(&self, tags: &[String]) -> Result<Vec<Link>, CurioError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders: Vec<String> = (1..=tags.len()).map(|i| format!("?{i}")).collect();
        let sql = format!(
            "SELECT {LINK_COLUMNS} FROM links
             WHERE id IN (SELECT DISTINCT link_id FROM link_tags WHERE tag IN ({}))
             ORDER BY date DESC",
            placeholders.join(", ")
        );

        let mut stmt = self
            .conn
            .prepare(&sql)
            .map_err(|e| CurioError::Store(e.to_string()))?;
        let links = stmt
            .query_map(rusqlite::params_from_iter(tags.iter()), row_to_link)
            .map_err(|e| CurioError::Store(e.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CurioError::Store(e.to_string()))?;
        Ok(links)
    }

    /// Execute a compiled listing query. The SQL must select
    /// [`LINK_COLUMNS`] in order; the query crate is the only intended
    /// caller.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Query`] if execution fails.
    pub fn select_links(
        &self,
        sql: &str,
        sql_params: &[rusqlite::types::Value],
    ) -> Result<Vec<Link>, CurioError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| CurioError::Query(e.to_string()))?;

        let links = stmt
            .query_map(rusqlite::params_from_iter(sql_params.iter()), row_to_link)
            .map_err(|e| CurioError::Query(e.to_string()))?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CurioError::Query(e.to_string()))?;
        Ok(links)
    }

    fn write_tags(&self, id: i64, tags: &[String]) -> Result<(), CurioError> {
        self.conn
            .execute("DELETE FROM link_tags WHERE link_id = ?1", params![id])
            .map_err(|e| CurioError::Store(e.to_string()))?;

        let mut stmt = self
            .conn
            .prepare("INSERT OR IGNORE INTO link_tags (link_id, tag) VALUES (?1, ?2)")
            .map_err(|e| CurioError::Store(e.to_string()))?;
        for tag in tags {
            stmt.execute(params![id, tag])
                .map_err(|e| CurioError::Store(e.to_string()))?;
        }
        Ok(())
    }
}

fn filled_date(draft: &LinkDraft) -> Result<DateTime<Utc>, CurioError> {
    draft
        .date
        .ok_or_else(|| CurioError::Store("draft date must be set before writing".to_string()))
}

fn filled_title(draft: &LinkDraft) -> Result<(), CurioError> {
    if draft.title.is_empty() {
        return Err(CurioError::Store(
            "draft title must be non-empty before writing".to_string(),
        ));
    }
    Ok(())
}

fn stored_link(id: i64, draft: &LinkDraft, date: DateTime<Utc>) -> Link {
    Link {
        id,
        owner: draft.owner.clone(),
        url: draft.url.clone(),
        title: draft.title.clone(),
        description: draft.description.clone(),
        date,
        tags: draft.tags.clone(),
        family: draft.family,
        friends: draft.friends,
        public: draft.public,
        shared: draft.shared,
    }
}

fn row_to_link(row: &Row<'_>) -> rusqlite::Result<Link> {
    let date_raw: String = row.get(5)?;
    let date = DateTime::parse_from_rfc3339(&date_raw)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);
    let tags_raw: String = row.get(6)?;

    Ok(Link {
        id: row.get(0)?,
        owner: row.get(1)?,
        url: row.get(2)?,
        title: row.get(3)?,
        description: row.get(4)?,
        date,
        tags: split_tags(&tags_raw),
        family: row.get(7)?,
        friends: row.get(8)?,
        public: row.get(9)?,
        shared: row.get(10)?,
    })
}

fn join_tags(tags: &[String]) -> String {
    tags.join(", ")
}

fn split_tags(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 0, 0, 0).unwrap()
    }

    fn make_draft(url: &str, title: &str, date: DateTime<Utc>) -> LinkDraft {
        let mut draft = LinkDraft::from_url(url, "ana");
        draft.title = title.to_string();
        draft.date = Some(date);
        draft
    }

    #[test]
    fn creates_schema_on_init() {
        let store = LinkStore::in_memory().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        assert_eq!(store.max_id().unwrap(), 0);
    }

    #[test]
    fn open_creates_database_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("links.db");
        let store = LinkStore::open(&path).unwrap();
        store
            .insert(&make_draft("https://example.com/", "Example", utc(2024, 1, 1)))
            .unwrap();
        drop(store);

        let reopened = LinkStore::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }

    #[test]
    fn insert_assigns_increasing_ids() {
        let store = LinkStore::in_memory().unwrap();
        let a = store
            .insert(&make_draft("https://a.example/", "A", utc(2024, 1, 1)))
            .unwrap();
        let b = store
            .insert(&make_draft("https://b.example/", "B", utc(2024, 1, 2)))
            .unwrap();
        assert!(b.id > a.id);
        assert_eq!(store.max_id().unwrap(), b.id);
    }

    #[test]
    fn insert_rejects_unfilled_drafts() {
        let store = LinkStore::in_memory().unwrap();

        let mut no_date = LinkDraft::from_url("https://example.com/", "ana");
        no_date.title = "Example".to_string();
        assert!(store.insert(&no_date).is_err());

        let mut no_title = LinkDraft::from_url("https://example.com/", "ana");
        no_title.date = Some(utc(2024, 1, 1));
        assert!(store.insert(&no_title).is_err());
    }

    #[test]
    fn get_round_trips_all_fields() {
        let store = LinkStore::in_memory().unwrap();
        let mut draft = make_draft("https://example.com/essay", "An Essay", utc(2024, 5, 1));
        draft.description = Some("worth rereading".to_string());
        draft.tags = vec!["essays".to_string(), "longform".to_string()];
        draft.friends = true;

        let stored = store.insert(&draft).unwrap();
        let fetched = store.get(stored.id).unwrap().expect("link exists");
        assert_eq!(fetched, stored);
        assert_eq!(fetched.tags, vec!["essays", "longform"]);
    }

    #[test]
    fn get_returns_none_for_missing_id() {
        let store = LinkStore::in_memory().unwrap();
        assert!(store.get(99).unwrap().is_none());
    }

    #[test]
    fn find_by_url_returns_oldest_match() {
        let store = LinkStore::in_memory().unwrap();
        let first = store
            .insert(&make_draft("https://example.com/p", "First", utc(2024, 1, 1)))
            .unwrap();
        store
            .insert(&make_draft("https://example.com/p", "Second", utc(2024, 1, 2)))
            .unwrap();

        let found = store.find_by_url("https://example.com/p").unwrap().unwrap();
        assert_eq!(found.id, first.id);
        assert!(store.find_by_url("https://example.com/other").unwrap().is_none());
    }

    #[test]
    fn update_replaces_every_field() {
        let store = LinkStore::in_memory().unwrap();
        let mut draft = make_draft("https://example.com/", "Before", utc(2024, 1, 1));
        draft.tags = vec!["old".to_string()];
        let stored = store.insert(&draft).unwrap();

        let mut replacement = make_draft("https://example.com/moved", "After", utc(2024, 2, 2));
        replacement.description = Some("now with notes".to_string());
        replacement.tags = vec!["new".to_string()];
        replacement.public = true;

        let updated = store.update(stored.id, &replacement).unwrap();
        assert_eq!(updated.id, stored.id);
        assert_eq!(updated.title, "After");
        assert!(updated.public);

        let fetched = store.get(stored.id).unwrap().unwrap();
        assert_eq!(fetched, updated);
        assert_eq!(store.tags_for_link(stored.id).unwrap(), vec!["new"]);
    }

    #[test]
    fn update_missing_id_is_not_found() {
        let store = LinkStore::in_memory().unwrap();
        let draft = make_draft("https://example.com/", "X", utc(2024, 1, 1));
        assert!(matches!(
            store.update(42, &draft),
            Err(CurioError::NotFound(42))
        ));
    }

    #[test]
    fn delete_leaves_id_gap_and_ids_are_not_reused() {
        let store = LinkStore::in_memory().unwrap();
        store
            .insert(&make_draft("https://a.example/", "A", utc(2024, 1, 1)))
            .unwrap();
        let b = store
            .insert(&make_draft("https://b.example/", "B", utc(2024, 1, 2)))
            .unwrap();
        let c = store
            .insert(&make_draft("https://c.example/", "C", utc(2024, 1, 3)))
            .unwrap();

        store.delete(b.id).unwrap();
        assert!(store.get(b.id).unwrap().is_none());
        assert_eq!(store.max_id().unwrap(), c.id);

        let d = store
            .insert(&make_draft("https://d.example/", "D", utc(2024, 1, 4)))
            .unwrap();
        assert!(d.id > c.id);
    }

    #[test]
    fn links_for_tags_matches_any_supplied_tag() {
        let store = LinkStore::in_memory().unwrap();
        let mut rust = make_draft("https://a.example/", "Rust", utc(2024, 1, 1));
        rust.tags = vec!["rust".to_string(), "systems".to_string()];
        let mut cooking = make_draft("https://b.example/", "Bread", utc(2024, 1, 2));
        cooking.tags = vec!["cooking".to_string()];
        let untagged = make_draft("https://c.example/", "Plain", utc(2024, 1, 3));

        let rust = store.insert(&rust).unwrap();
        let cooking = store.insert(&cooking).unwrap();
        store.insert(&untagged).unwrap();

        let hits = store
            .links_for_tags(&["rust".to_string(), "cooking".to_string()])
            .unwrap();
        let ids: Vec<i64> = hits.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![cooking.id, rust.id]); // newest first

        assert!(store.links_for_tags(&[]).unwrap().is_empty());
        assert!(store
            .links_for_tags(&["missing".to_string()])
            .unwrap()
            .is_empty());
    }

    #[test]
    fn select_links_runs_compiled_filters() {
        let store = LinkStore::in_memory().unwrap();
        let mut public = make_draft("https://a.example/", "Shown", utc(2024, 1, 1));
        public.public = true;
        store.insert(&public).unwrap();
        store
            .insert(&make_draft("https://b.example/", "Hidden", utc(2024, 1, 2)))
            .unwrap();

        let sql = format!("SELECT {LINK_COLUMNS} FROM links WHERE public = 1 ORDER BY date DESC");
        let rows = store.select_links(&sql, &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].title, "Shown");
    }
}
