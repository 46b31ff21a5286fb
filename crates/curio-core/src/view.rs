//! Per-viewer projection of a link.
//!
//! The original habit of tagging a fetched entity with a computed
//! permission attribute is replaced by an explicit projection type:
//! the entity is never mutated for presentation.

use serde::{Deserialize, Serialize};

use crate::link::Link;
use crate::policy;
use crate::viewer::Viewer;

/// A link paired with the viewer's computed edit permission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkView {
    #[serde(flatten)]
    pub link: Link,
    pub can_edit: bool,
}

impl LinkView {
    /// Project `link` for `viewer`, computing the edit flag from the
    /// policy.
    #[must_use]
    pub fn for_viewer(link: Link, viewer: Option<&Viewer>) -> Self {
        let can_edit = policy::can_edit(viewer);
        Self { link, can_edit }
    }
}
