//! Where user searches and invites go: the forum over HTTP, or an
//! in-memory directory when running offline.

use std::path::Path;

use tracing::info;

use wiwik_core::config::{Config, InviteConfig};
use wiwik_core::search::{SearchError, SearchQuery, SearchResult, UserDirectory, UserSearch, UsersClient};

const SAMPLE_USERS: &str = include_str!("../data/sample_users.json");

#[derive(Debug, Clone)]
pub enum Backend {
    Remote(UsersClient),
    Offline(UserDirectory),
}

impl Backend {
    /// Build the backend for this run.
    ///
    /// Offline mode loads `directory` when given, otherwise the bundled
    /// sample users.
    pub fn from_config(
        config: &Config,
        offline: bool,
        directory: Option<&Path>,
        current_user: Option<&str>,
    ) -> anyhow::Result<Self> {
        if !offline {
            return Ok(Self::Remote(UsersClient::new(&config.server)?));
        }
        let dir = match directory {
            Some(path) => UserDirectory::from_json_file(path)?,
            None => sample_directory(&config.invite)?,
        };
        let dir = match current_user {
            Some(user) => dir.with_current_user(user),
            None => dir,
        };
        info!(users = dir.len(), "Using offline user directory");
        Ok(Self::Offline(dir))
    }

    pub const fn is_offline(&self) -> bool {
        matches!(self, Self::Offline(_))
    }

    /// Invite `usernames` to question `question_id`.
    pub async fn invite(&self, question_id: u64, usernames: &[String]) -> Result<(), SearchError> {
        match self {
            Self::Remote(client) => client.invite_users(question_id, usernames).await,
            Self::Offline(_) => {
                info!(question_id, ?usernames, "Offline: invite not sent");
                Ok(())
            }
        }
    }
}

/// The bundled sample users.
pub fn sample_directory(invite: &InviteConfig) -> anyhow::Result<UserDirectory> {
    Ok(UserDirectory::from_json_str(SAMPLE_USERS)?.with_limit(invite.max_suggestions))
}

impl UserSearch for Backend {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        match self {
            Self::Remote(client) => client.search(query).await,
            Self::Offline(dir) => dir.search(query).await,
        }
    }
}
