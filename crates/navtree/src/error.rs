//! Error types for loading and querying navigation data.

use std::fmt::Display;

pub use anyhow::{Error, Result};

/// Failures produced by the navigation store itself.
///
/// `MalformedTree` is fatal: a store that failed to load cannot be used.
/// `NotFound` is recoverable and left to the caller, e.g. to render a page
/// without a breadcrumb.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavError {
    /// The navigation data failed structural validation.
    #[error("malformed navigation tree at {location}: {reason}")]
    MalformedTree {
        /// Where the failure was found, either a node path such as `NAVTREE[0][2]`
        /// or a source position.
        location: String,
        /// What was wrong with the data.
        reason: String,
    },
    /// No entry in the tree targets the requested page reference.
    #[error("no navigation entry targets `{target}`")]
    NotFound {
        /// The page reference that was looked up.
        target: String,
    },
}

impl NavError {
    pub(crate) fn malformed(location: impl Display, reason: impl Display) -> Self {
        NavError::MalformedTree {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn not_found(target: impl Into<String>) -> Self {
        NavError::NotFound {
            target: target.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, NavError::NotFound { .. })
    }
}
