//! Remote user search.
//!
//! The forum answers `GET /users-autocomplete/?q=<query>[&selected=a,b]`
//! with `{"results": [...]}`. [`UsersClient`] talks to it over HTTP and
//! [`UserDirectory`] answers the same queries from memory.

mod client;
mod directory;
pub mod types;

use std::future::Future;

use thiserror::Error;

pub use client::UsersClient;
pub use directory::UserDirectory;
pub use types::{SearchResponse, SearchResult};

/// User search errors.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The body was not the expected `{"results": [...]}` document.
    #[error("Malformed search response: {0}")]
    Malformed(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SearchError {
    /// Malformed bodies count as "no candidates" rather than a failure.
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::Malformed(_))
    }
}

/// A user lookup: the typed text plus usernames already picked.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    pub text: String,
    /// Usernames to exclude (tag-input variant only).
    pub selected: Vec<String>,
}

impl SearchQuery {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            selected: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_selected(mut self, selected: Vec<String>) -> Self {
        self.selected = selected;
        self
    }
}

/// Anything that can resolve a [`SearchQuery`] to candidate users.
pub trait UserSearch: Send + Sync {
    fn search(
        &self,
        query: &SearchQuery,
    ) -> impl Future<Output = Result<Vec<SearchResult>, SearchError>> + Send;
}
