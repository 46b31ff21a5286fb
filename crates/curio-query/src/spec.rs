//! Explicit query-specification values.
//!
//! The original built listings by chaining lazy queryset filters; here
//! the same narrowing is captured in a plain value the compiler turns
//! into a single SQL statement.

use curio_core::viewer::Viewer;

/// Coarse visibility scoping applied at listing time.
///
/// Intentionally wider than `policy::can_view` for authenticated
/// viewers: group membership is not consulted here. Callers needing
/// exact per-link semantics apply the policy per row on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    /// Anonymous viewers: public links only.
    Anonymous,
    /// Authenticated non-staff: any of public/friends/family set.
    Authenticated,
    /// Staff: unrestricted.
    Staff,
}

impl Scope {
    #[must_use]
    pub fn for_viewer(viewer: Option<&Viewer>) -> Self {
        match viewer {
            None => Self::Anonymous,
            Some(v) if v.staff => Self::Staff,
            Some(_) => Self::Authenticated,
        }
    }
}

/// Listing order. Everything lists newest first except the export
/// listing, which is oldest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Ordering {
    #[default]
    DateDesc,
    DateAsc,
}

/// Same-domain constraint: a `host[:port]` substring plus the id of
/// the link being grouped around.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DomainFilter {
    pub netloc: String,
    pub exclude_id: i64,
}

/// A complete listing specification: scope, keyword narrowing, tag
/// filter, ordering, limit, and optional domain constraint.
#[derive(Debug, Clone)]
pub struct QuerySpec {
    pub scope: Scope,
    /// Whitespace-split words. Each word narrows the running result to
    /// rows where it appears in title, description, url, or tag text;
    /// words accumulate left to right (AND), fields within a word OR.
    pub keywords: Vec<String>,
    /// Exact-identity tag filter: keep links carrying any of these.
    pub tags: Vec<String>,
    pub order: Ordering,
    pub limit: Option<usize>,
    pub domain: Option<DomainFilter>,
}

impl QuerySpec {
    /// Everything the viewer's scope allows, newest first.
    #[must_use]
    pub fn visible_to(viewer: Option<&Viewer>) -> Self {
        Self {
            scope: Scope::for_viewer(viewer),
            keywords: Vec::new(),
            tags: Vec::new(),
            order: Ordering::DateDesc,
            limit: None,
            domain: None,
        }
    }

    /// Unrestricted listing (export, domain grouping).
    #[must_use]
    pub fn unrestricted() -> Self {
        Self {
            scope: Scope::Staff,
            ..Self::visible_to(None)
        }
    }

    /// Split a raw keyword string into narrowing words. An empty or
    /// all-whitespace string is a no-op.
    #[must_use]
    pub fn with_keywords(mut self, raw: &str) -> Self {
        self.keywords = raw.split_whitespace().map(ToString::to_string).collect();
        self
    }

    #[must_use]
    pub fn with_tags(mut self, tags: &[String]) -> Self {
        self.tags = tags.to_vec();
        self
    }

    #[must_use]
    pub fn ordered(mut self, order: Ordering) -> Self {
        self.order = order;
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    #[must_use]
    pub fn in_domain(mut self, netloc: &str, exclude_id: i64) -> Self {
        self.domain = Some(DomainFilter {
            netloc: netloc.to_string(),
            exclude_id,
        });
        self
    }
}
