//! In-memory user directory.
//!
//! Answers [`SearchQuery`]s the way the forum's `/users-autocomplete/`
//! view does, for offline use and tests.

use std::path::Path;

use super::types::SearchResult;
use super::{SearchError, SearchQuery, UserSearch};
use crate::error::{Error, Result};

/// Maximum results the forum returns per query.
pub const MAX_RESULTS: usize = 10;

/// A directory entry with the account flags the server filters on.
#[derive(Debug, Clone, serde::Deserialize)]
struct DirectoryEntry {
    #[serde(flatten)]
    user: SearchResult,
    #[serde(default = "default_true")]
    is_active: bool,
    #[serde(default)]
    is_superuser: bool,
}

const fn default_true() -> bool {
    true
}

/// In-memory [`UserSearch`] implementation.
#[derive(Debug, Clone, Default)]
pub struct UserDirectory {
    entries: Vec<DirectoryEntry>,
    /// The signed-in user never appears in their own results.
    current_user: Option<String>,
    limit: usize,
}

impl UserDirectory {
    pub fn new(users: Vec<SearchResult>) -> Self {
        Self {
            entries: users
                .into_iter()
                .map(|user| DirectoryEntry {
                    user,
                    is_active: true,
                    is_superuser: false,
                })
                .collect(),
            current_user: None,
            limit: MAX_RESULTS,
        }
    }

    /// Load a JSON array of user records (`is_active`/`is_superuser` optional).
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content).map_err(|e| {
            Error::Config(format!("Failed to parse directory {}: {e}", path.display()))
        })
    }

    pub fn from_json_str(json: &str) -> std::result::Result<Self, serde_json::Error> {
        let entries: Vec<DirectoryEntry> = serde_json::from_str(json)?;
        Ok(Self {
            entries,
            current_user: None,
            limit: MAX_RESULTS,
        })
    }

    #[must_use]
    pub fn with_current_user(mut self, username: impl Into<String>) -> Self {
        self.current_user = Some(username.into());
        self
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match on username, name and email,
    /// skipping the current user, already-selected users, superusers and
    /// inactive accounts.
    pub fn lookup(&self, query: &SearchQuery) -> Vec<SearchResult> {
        let needle = query.text.to_lowercase();
        let contains = |field: Option<&str>| {
            field.is_some_and(|f| f.to_lowercase().contains(&needle))
        };
        self.entries
            .iter()
            .filter(|e| e.is_active && !e.is_superuser)
            .filter(|e| self.current_user.as_deref() != Some(e.user.username.as_str()))
            .filter(|e| !query.selected.iter().any(|s| *s == e.user.username))
            .filter(|e| {
                contains(Some(&e.user.username))
                    || contains(e.user.name.as_deref())
                    || contains(e.user.email.as_deref())
            })
            .take(self.limit)
            .map(|e| normalize(e.user.clone()))
            .collect()
    }
}

/// Server-side shaping: picture paths start with `/`, `value` mirrors the username.
fn normalize(mut user: SearchResult) -> SearchResult {
    if let Some(pic) = user.profile_pic_path.as_mut()
        && !pic.is_empty()
        && !pic.starts_with('/')
    {
        pic.insert(0, '/');
    }
    user.value = Some(user.username.clone());
    user
}

impl UserSearch for UserDirectory {
    async fn search(&self, query: &SearchQuery) -> std::result::Result<Vec<SearchResult>, SearchError> {
        Ok(self.lookup(query))
    }
}
