//! Viewer identity, consumed from the out-of-scope auth layer.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

/// Externally-authenticated user reference: identity plus staff flag.
/// Anonymous viewers are represented as `Option::<&Viewer>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewer {
    pub username: String,
    pub staff: bool,
}

impl Viewer {
    #[must_use]
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            staff: false,
        }
    }

    #[must_use]
    pub fn staff(username: &str) -> Self {
        Self {
            username: username.to_string(),
            staff: true,
        }
    }
}

/// Externally-managed friend/family group: a set of usernames.
/// Membership-tested only, never mutated here.
pub type Group = HashSet<String>;
