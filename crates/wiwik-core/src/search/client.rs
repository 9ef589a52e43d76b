//! HTTP client for the forum's user search endpoint.
//!
//! Uses reqwest to call `/users-autocomplete/` and the invite endpoint.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderValue};
use tracing::{debug, warn};
use url::Url;

use super::types::{SearchResponse, SearchResult};
use super::{SearchError, SearchQuery, UserSearch};
use crate::config::ServerConfig;

const USERS_AUTOCOMPLETE_PATH: &str = "/users-autocomplete/";

/// Forum user search client.
#[derive(Debug, Clone)]
pub struct UsersClient {
    http: reqwest::Client,
    base_url: String,
}

impl UsersClient {
    /// Create a new client for the forum at `config.base_url`.
    pub fn new(config: &ServerConfig) -> Result<Self, SearchError> {
        let base_url = config.base_url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(SearchError::Config("base_url is empty".into()));
        }
        Url::parse(&base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url {base_url}: {e}")))?;

        // Ensure a TLS crypto provider is installed (reqwest uses rustls-no-provider).
        // The `Err` case just means it was already installed.
        let _ = rustls::crypto::ring::default_provider().install_default();

        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs.max(1)))
            .build()?;

        Ok(Self { http, base_url })
    }

    /// Build the search URL for a query.
    ///
    /// `selected` is only sent when non-empty, joined with commas.
    pub(crate) fn search_url(&self, query: &SearchQuery) -> Result<Url, SearchError> {
        let mut url = Url::parse(&format!("{}{USERS_AUTOCOMPLETE_PATH}", self.base_url))
            .map_err(|e| SearchError::Config(e.to_string()))?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("q", &query.text);
            if !query.selected.is_empty() {
                pairs.append_pair("selected", &query.selected.join(","));
            }
        }
        Ok(url)
    }

    pub(crate) fn invite_url(&self, question_id: u64) -> Result<Url, SearchError> {
        Url::parse(&format!("{}/question/{question_id}/invite/", self.base_url))
            .map_err(|e| SearchError::Config(e.to_string()))
    }

    /// Check HTTP response status, returning error for non-success codes.
    fn check_status(resp: &reqwest::Response) -> Result<(), SearchError> {
        let status = resp.status();
        if !status.is_success() {
            return Err(SearchError::Api {
                status: status.as_u16(),
                message: status.canonical_reason().unwrap_or("Unknown").into(),
            });
        }
        Ok(())
    }

    /// Look up users matching `query`.
    pub async fn users_autocomplete(
        &self,
        query: &SearchQuery,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let url = self.search_url(query)?;
        debug!(%url, "Searching users");
        let resp = self.http.get(url).send().await?;
        Self::check_status(&resp)?;
        let body = resp.bytes().await?;
        let parsed: SearchResponse = serde_json::from_slice(&body).map_err(|e| {
            warn!(error = %e, "Undecodable users-autocomplete body");
            SearchError::Malformed(e.to_string())
        })?;
        Ok(parsed.results)
    }

    /// Invite `usernames` to a question, posted as the comma-joined
    /// `usernames` form field.
    pub async fn invite_users(
        &self,
        question_id: u64,
        usernames: &[String],
    ) -> Result<(), SearchError> {
        let url = self.invite_url(question_id)?;
        let body = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("usernames", &usernames.join(","))
            .finish();
        let resp = self
            .http
            .post(url)
            .header(
                CONTENT_TYPE,
                HeaderValue::from_static("application/x-www-form-urlencoded"),
            )
            .body(body)
            .send()
            .await?;
        Self::check_status(&resp)?;
        debug!(question_id, count = usernames.len(), "Invited users");
        Ok(())
    }
}

impl UserSearch for UsersClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>, SearchError> {
        self.users_autocomplete(query).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> UsersClient {
        UsersClient::new(&ServerConfig {
            base_url: base_url.into(),
            ..ServerConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn empty_base_url_returns_config_error() {
        let err = UsersClient::new(&ServerConfig {
            base_url: String::new(),
            ..ServerConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn invalid_base_url_returns_config_error() {
        let err = UsersClient::new(&ServerConfig {
            base_url: "not a url".into(),
            ..ServerConfig::default()
        })
        .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[test]
    fn search_url_has_query() {
        let url = client("https://forum.test/").search_url(&SearchQuery::new("wo")).unwrap();
        assert_eq!(url.as_str(), "https://forum.test/users-autocomplete/?q=wo");
    }

    #[test]
    fn search_url_encodes_query_text() {
        let url = client("https://forum.test")
            .search_url(&SearchQuery::new("a b&c"))
            .unwrap();
        assert_eq!(url.query(), Some("q=a+b%26c"));
    }

    #[test]
    fn search_url_joins_selected() {
        let query = SearchQuery::new("al").with_selected(vec!["bob".into(), "carol".into()]);
        let url = client("https://forum.test").search_url(&query).unwrap();
        assert_eq!(url.query(), Some("q=al&selected=bob%2Ccarol"));
    }

    #[test]
    fn invite_url_constructed_correctly() {
        assert_eq!(
            client("https://forum.test").invite_url(42).unwrap().as_str(),
            "https://forum.test/question/42/invite/"
        );
    }
}
