//! Visibility policy: pure per-(link, viewer) decisions.
//!
//! Nothing here touches storage. The listing pre-filters in
//! `curio-query` are coarser by design; this module is the exact
//! per-link authority.

use crate::link::Link;
use crate::viewer::{Group, Viewer};

/// Whether `viewer` may edit links at all. Editing is staff-only; a
/// non-staff owner cannot edit their own links.
#[must_use]
pub fn can_edit(viewer: Option<&Viewer>) -> bool {
    viewer.is_some_and(|v| v.staff)
}

/// Whether `viewer` may see `link`, given the viewer's family and
/// friends groups.
///
/// The checks run in a fixed order:
///
/// 1. an empty family group combined with a non-empty friends group
///    denies outright, before the link's own flags are consulted;
/// 2. public links are visible to everyone;
/// 3. friends+family links need membership in either group;
/// 4. friends-only links need friends membership and no family membership;
/// 5. family-only links need family membership and no friends membership;
/// 6. staff sees everything that survived step 1;
/// 7. otherwise deny.
///
/// Step 1 gates on the viewer's groups rather than the link's flags, so
/// it can deny even public links and staff. The evaluation order is
/// load-bearing; the regression tests below pin it.
#[must_use]
pub fn can_view(link: &Link, viewer: Option<&Viewer>, family: &Group, friends: &Group) -> bool {
    if family.is_empty() && !friends.is_empty() {
        return false;
    }
    if link.public {
        return true;
    }

    let in_family = viewer.is_some_and(|v| family.contains(&v.username));
    let in_friends = viewer.is_some_and(|v| friends.contains(&v.username));

    if link.friends && link.family && (in_friends || in_family) {
        return true;
    }
    if link.friends && !link.family && in_friends && !in_family {
        return true;
    }
    if link.family && !link.friends && in_family && !in_friends {
        return true;
    }
    if viewer.is_some_and(|v| v.staff) {
        return true;
    }
    false
}
