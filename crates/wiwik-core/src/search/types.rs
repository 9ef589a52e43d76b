//! `/users-autocomplete/` response types.
//!
//! Deserialization structs matching the forum's JSON responses.

use serde::{Deserialize, Serialize};

/// Picture shown when a user has no profile picture.
pub const DEFAULT_AVATAR: &str = "/media/default_pics/no_pic.jpg";

/// A user record returned by the search endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, rename = "profile_pic", skip_serializing_if = "Option::is_none")]
    pub profile_pic_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled: Option<bool>,
    /// Why the user cannot be picked (only meaningful when `disabled`).
    #[serde(
        default,
        rename = "disabled-message",
        skip_serializing_if = "Option::is_none"
    )]
    pub disabled_message: Option<String>,
    /// Tag-input value; the server mirrors `username` here.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl SearchResult {
    /// A result carrying only a username.
    pub fn named(username: &str) -> Self {
        Self {
            username: username.to_string(),
            name: None,
            profile_pic_path: None,
            email: None,
            disabled: None,
            disabled_message: None,
            value: None,
        }
    }

    /// Full name when present and non-empty, otherwise the username.
    pub fn display_name(&self) -> &str {
        self.name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.username)
    }

    /// Media URL of the profile picture, falling back to the default picture.
    pub fn avatar_url(&self) -> String {
        match self.profile_pic_path.as_deref() {
            Some(path) if !path.is_empty() => {
                if path.starts_with('/') {
                    format!("/media{path}")
                } else {
                    format!("/media/{path}")
                }
            }
            _ => DEFAULT_AVATAR.to_string(),
        }
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled.unwrap_or(false)
    }
}

/// Envelope of the search endpoint: `{"results": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Vec<SearchResult>,
}
