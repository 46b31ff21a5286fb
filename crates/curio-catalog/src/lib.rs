//! # curio-catalog
//!
//! Link lifecycle for curio: intake with dedup-by-URL, save with date
//! defaulting and best-effort title scraping, full-replacement update,
//! and the bounded random pick.
//!
//! The catalog writes through [`LinkStore`] and consults a
//! [`TitleSource`] for titles; scraping failures never abort a save.

use chrono::Utc;
use rand::RngExt;
use tracing::{debug, warn};

use curio_core::error::CurioError;
use curio_core::link::{Link, LinkDraft, LinkUpdate, SCRAPE_FAILED_TITLE};
use curio_core::scrape::TitleSource;
use curio_store::LinkStore;

/// Bounded retries for the random pick over a gappy id space.
const RANDOM_PICK_ATTEMPTS: u32 = 10;

/// Outcome of an intake. A dedup hit is a normal outcome ("already
/// cataloged"), not an error.
#[derive(Debug, Clone)]
pub enum Intake {
    Existing(Link),
    Created(Link),
}

impl Intake {
    #[must_use]
    pub fn link(self) -> Link {
        match self {
            Self::Existing(link) | Self::Created(link) => link,
        }
    }

    #[must_use]
    pub fn is_existing(&self) -> bool {
        matches!(self, Self::Existing(_))
    }
}

/// Orchestrates the link lifecycle against the store and the scrape
/// collaborator.
pub struct Catalog<'a> {
    store: &'a LinkStore,
    titles: &'a dyn TitleSource,
}

impl<'a> Catalog<'a> {
    #[must_use]
    pub fn new(store: &'a LinkStore, titles: &'a dyn TitleSource) -> Self {
        Self { store, titles }
    }

    /// Catalog a bare URL for `owner`. Idempotent on the URL: if a
    /// link with this exact URL exists, it is returned as
    /// [`Intake::Existing`] instead of creating a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the insert fails. A failure of
    /// the dedup lookup itself is swallowed and treated as "no
    /// existing match"; a transient store error there can therefore
    /// produce a duplicate instead of surfacing.
    pub fn intake(&self, url: &str, owner: &str) -> Result<Intake, CurioError> {
        self.intake_draft(LinkDraft::from_url(url, owner))
    }

    /// Like [`Catalog::intake`], but for a draft that already carries
    /// fields beyond the URL. Dedup still keys on the URL alone; a
    /// dedup hit discards the draft and returns the existing link.
    ///
    /// # Errors
    ///
    /// Same behavior as [`Catalog::intake`].
    pub fn intake_draft(&self, draft: LinkDraft) -> Result<Intake, CurioError> {
        match self.store.find_by_url(&draft.url) {
            Ok(Some(existing)) => {
                debug!(id = existing.id, "url already cataloged");
                return Ok(Intake::Existing(existing));
            }
            Ok(None) => {}
            Err(e) => warn!(error = %e, "dedup lookup failed, proceeding as no match"),
        }

        let link = self.save(draft)?;
        Ok(Intake::Created(link))
    }

    /// Persist a draft, resolving its deferred fields first: the date
    /// defaults to now, an empty title is filled by scraping (sentinel
    /// on any failure).
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if the insert fails. Scrape
    /// failures are not errors.
    pub fn save(&self, draft: LinkDraft) -> Result<Link, CurioError> {
        let draft = self.fill(draft);
        self.store.insert(&draft)
    }

    /// Replace the stored fields of link `id` with `fields`, then run
    /// the same fill pass a save does (an empty title re-triggers
    /// scraping). The owner never changes.
    ///
    /// No concurrency check: two simultaneous updates race and the
    /// last write wins.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::NotFound`] if the link does not exist,
    /// [`CurioError::Store`] on write failure.
    pub fn update(&self, id: i64, fields: LinkUpdate) -> Result<Link, CurioError> {
        let existing = self.get(id)?;
        let draft = self.fill(LinkDraft {
            owner: existing.owner,
            url: fields.url,
            title: fields.title,
            description: fields.description,
            date: Some(fields.date),
            tags: fields.tags,
            family: fields.family,
            friends: fields.friends,
            public: fields.public,
            shared: fields.shared,
        });
        self.store.update(id, &draft)
    }

    /// Fetch a link by id.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::NotFound`] if no link has that id.
    pub fn get(&self, id: i64) -> Result<Link, CurioError> {
        self.store.get(id)?.ok_or(CurioError::NotFound(id))
    }

    /// Pick one link at random: draw an id uniformly from
    /// `[1, max_id]` and retry over gaps, up to ten attempts, then
    /// report `None`.
    ///
    /// This approximates uniform sampling over existing rows and is
    /// only fair while gaps are sparse.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Store`] if a lookup fails.
    pub fn pick_random(&self) -> Result<Option<Link>, CurioError> {
        let max_id = self.store.max_id()?;
        if max_id == 0 {
            return Ok(None);
        }

        let mut rng = rand::rng();
        for _ in 0..RANDOM_PICK_ATTEMPTS {
            let id = rng.random_range(1..=max_id);
            if let Some(link) = self.store.get(id)? {
                return Ok(Some(link));
            }
        }
        debug!(max_id, "random pick exhausted its attempts");
        Ok(None)
    }

    fn fill(&self, mut draft: LinkDraft) -> LinkDraft {
        if draft.date.is_none() {
            draft.date = Some(Utc::now());
        }
        if draft.title.is_empty() {
            draft.title = if draft.url.is_empty() {
                SCRAPE_FAILED_TITLE.to_string()
            } else {
                match self.titles.fetch_title(&draft.url) {
                    Ok(title) => title,
                    Err(e) => {
                        warn!(url = %draft.url, error = %e, "title scrape failed, using sentinel");
                        SCRAPE_FAILED_TITLE.to_string()
                    }
                }
            };
        }
        draft
    }
}
