//! Query composer: executes query specs against the link store.
//!
//! Bridges compiled specs to SQL execution and offers the listing
//! operations the request layer calls.

use tracing::debug;
use url::Url;

use curio_core::config::Config;
use curio_core::error::CurioError;
use curio_core::link::Link;
use curio_core::view::LinkView;
use curio_core::viewer::Viewer;
use curio_store::LinkStore;

use crate::compiler::compile;
use crate::spec::{Ordering, QuerySpec};

/// Composes viewer-scoped, filtered, ordered listings.
pub struct QueryComposer<'a> {
    store: &'a LinkStore,
    config: &'a Config,
}

impl<'a> QueryComposer<'a> {
    #[must_use]
    pub fn new(store: &'a LinkStore, config: &'a Config) -> Self {
        Self { store, config }
    }

    /// Links the viewer's scope allows, optionally narrowed word by
    /// word, newest first.
    ///
    /// The scope is the coarse pre-filter; per-link `can_view`
    /// decisions are not reapplied here.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Query`] if execution fails.
    pub fn list_visible(
        &self,
        viewer: Option<&Viewer>,
        keywords: Option<&str>,
    ) -> Result<Vec<Link>, CurioError> {
        let spec = QuerySpec::visible_to(viewer).with_keywords(keywords.unwrap_or(""));
        self.run(&spec)
    }

    /// Scoped links carrying at least one of the given tags, newest
    /// first. No tags, no results.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Query`] if execution fails.
    pub fn list_by_tags(
        &self,
        viewer: Option<&Viewer>,
        tags: &[String],
    ) -> Result<Vec<Link>, CurioError> {
        if tags.is_empty() {
            return Ok(Vec::new());
        }
        let spec = QuerySpec::visible_to(viewer).with_tags(tags);
        self.run(&spec)
    }

    /// Other links whose URL contains this link's `host[:port]`. A URL
    /// without a parseable host yields an empty listing, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Query`] if execution fails.
    pub fn others_in_domain(&self, link: &Link) -> Result<Vec<Link>, CurioError> {
        let Some(netloc) = netloc(&link.url) else {
            return Ok(Vec::new());
        };
        let spec = QuerySpec::unrestricted().in_domain(&netloc, link.id);
        self.run(&spec)
    }

    /// Export listing: oldest first, capped at the configured limit.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Query`] if execution fails.
    pub fn export_recent(&self) -> Result<Vec<Link>, CurioError> {
        let spec = QuerySpec::unrestricted()
            .ordered(Ordering::DateAsc)
            .with_limit(self.config.export_limit);
        self.run(&spec)
    }

    /// The N most recent public links; the feed source.
    ///
    /// # Errors
    ///
    /// Returns [`CurioError::Query`] if execution fails.
    pub fn recent_public(&self, limit: usize) -> Result<Vec<Link>, CurioError> {
        let spec = QuerySpec::visible_to(None).with_limit(limit);
        self.run(&spec)
    }

    /// Project listed links for a viewer, attaching the computed edit
    /// flag.
    #[must_use]
    pub fn with_edit_flags(&self, viewer: Option<&Viewer>, links: Vec<Link>) -> Vec<LinkView> {
        links
            .into_iter()
            .map(|link| LinkView::for_viewer(link, viewer))
            .collect()
    }

    fn run(&self, spec: &QuerySpec) -> Result<Vec<Link>, CurioError> {
        let compiled = compile(spec);
        debug!(sql = %compiled.sql, "running listing query");
        self.store.select_links(&compiled.sql, &compiled.param_values())
    }
}

/// `host[:port]` of a URL, `None` when there is no parseable host.
fn netloc(raw: &str) -> Option<String> {
    let parsed = Url::parse(raw).ok()?;
    let host = parsed.host_str()?;
    Some(match parsed.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_string(),
    })
}
