//! # curio-core
//!
//! Core types and decision logic for the curio link log.
//!
//! This crate defines the foundational pieces used across all other
//! curio crates:
//! - [`Link`] — the cataloged link entity, with [`LinkDraft`] and
//!   [`LinkUpdate`] for the write paths
//! - [`Viewer`] and [`Group`] — externally-authenticated identity and
//!   group-membership references
//! - [`policy`] — per-link visibility and edit decisions
//! - [`LinkView`] — per-viewer projection for presentation
//! - [`Config`] — explicit runtime configuration
//! - [`TitleSource`] — seam to the title-scrape collaborator
//! - Error hierarchy ([`CurioError`], [`ScrapeError`])

pub mod config;
pub mod error;
pub mod link;
pub mod policy;
pub mod scrape;
pub mod view;
pub mod viewer;

pub use config::Config;
pub use error::{CurioError, Result, ScrapeError};
pub use link::{Link, LinkDraft, LinkUpdate, SCRAPE_FAILED_TITLE};
pub use scrape::TitleSource;
pub use view::LinkView;
pub use viewer::{Group, Viewer};
