// Copyright 2024-2025 the apigee-edge contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Credentials and bearer-token acquisition.
//!
//! The SSO token service speaks the OAuth2 resource-owner password grant with
//! the fixed public CLI client id. Acquired tokens can be persisted through an
//! injected [`CredentialCache`]; nothing here keeps ambient global state.

use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::header::ACCEPT;
use reqwest::Method;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, warn};
use url::Url;

use crate::error::EdgeError;

const TOKEN_CLIENT_ID: &str = "edgecli";
const TOKEN_CLIENT_SECRET: &str = "edgeclisecret";

/// Tokens are considered expired this many seconds before their nominal
/// expiry, so a request started near the boundary still carries a live token.
const EXPIRY_SKEW_SECS: i64 = 30;

/// Username and password for the management or login server.
#[derive(Clone)]
pub struct AdminAuth {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for AdminAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminAuth")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// A bearer token with its bookkeeping, as held by a [`CredentialCache`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredToken {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    pub expires_at: DateTime<Utc>,
}

/// Storage for acquired tokens, shared across client instances or processes.
///
/// Implementations decide persistence and locking; the client only promises
/// to consult `get` before fetching and to `put` after a successful fetch.
#[async_trait]
pub trait CredentialCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<StoredToken>, EdgeError>;

    async fn put(&self, key: &str, token: &StoredToken) -> Result<(), EdgeError>;

    fn is_expired(&self, token: &StoredToken) -> bool {
        token.expires_at <= Utc::now()
    }
}

/// A [`CredentialCache`] backed by a JSON file holding a map of stash keys to
/// tokens.
///
/// Writes are not protected against concurrent writers in other processes; a
/// lost update only costs an extra token fetch.
pub struct FileCredentialCache {
    path: PathBuf,
}

impl FileCredentialCache {
    pub fn new(path: impl Into<PathBuf>) -> FileCredentialCache {
        FileCredentialCache { path: path.into() }
    }

    async fn read_map(&self) -> Result<HashMap<String, StoredToken>, EdgeError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(e) => return Err(EdgeError::fs(&self.path, e)),
        };
        match serde_json::from_slice(&bytes) {
            Ok(map) => Ok(map),
            Err(e) => {
                warn!("discarding unreadable token stash {}: {e}", self.path.display());
                Ok(HashMap::new())
            }
        }
    }
}

#[async_trait]
impl CredentialCache for FileCredentialCache {
    async fn get(&self, key: &str) -> Result<Option<StoredToken>, EdgeError> {
        Ok(self.read_map().await?.remove(key))
    }

    async fn put(&self, key: &str, token: &StoredToken) -> Result<(), EdgeError> {
        let mut map = self.read_map().await?;
        map.insert(key.to_string(), token.clone());
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EdgeError::fs(parent, e))?;
        }
        let bytes = serde_json::to_vec_pretty(&map)
            .map_err(|e| EdgeError::Format(format!("cannot encode token stash: {e}")))?;
        tokio::fs::write(&self.path, bytes)
            .await
            .map_err(|e| EdgeError::fs(&self.path, e))
    }
}

#[derive(Deserialize)]
struct TokenGrant {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: i64,
}

/// Fetches and memoizes bearer tokens for one set of credentials.
pub struct TokenSource {
    token_url: Url,
    auth: AdminAuth,
    http: reqwest::Client,
    cache: Option<Arc<dyn CredentialCache>>,
    current: Mutex<Option<StoredToken>>,
}

impl TokenSource {
    pub(crate) fn new(
        login_url: Url,
        auth: AdminAuth,
        http: reqwest::Client,
        cache: Option<Arc<dyn CredentialCache>>,
    ) -> Result<TokenSource, EdgeError> {
        let mut token_url = login_url;
        token_url
            .path_segments_mut()
            .map_err(|_| EdgeError::Validation("the login URL cannot be a base URL".to_string()))?
            .pop_if_empty()
            .extend(["oauth", "token"]);
        Ok(TokenSource {
            token_url,
            auth,
            http,
            cache,
            current: Mutex::new(None),
        })
    }

    fn stash_key(&self) -> String {
        format!(
            "{}@{}",
            self.auth.username,
            self.token_url.host_str().unwrap_or("login")
        )
    }

    fn live(&self, token: &StoredToken) -> bool {
        token.expires_at > Utc::now() + Duration::seconds(EXPIRY_SKEW_SECS)
    }

    /// Produce a live access token, consulting the in-process memo and the
    /// injected cache before going to the token service.
    pub async fn token(&self) -> Result<String, EdgeError> {
        let mut current = self.current.lock().await;

        if let Some(token) = current.as_ref() {
            if self.live(token) {
                return Ok(token.access_token.clone());
            }
        }

        let key = self.stash_key();
        if let Some(cache) = &self.cache {
            if let Some(token) = cache.get(&key).await? {
                if !cache.is_expired(&token) && self.live(&token) {
                    let access = token.access_token.clone();
                    *current = Some(token);
                    return Ok(access);
                }
            }
        }

        let token = self.fetch().await?;
        if let Some(cache) = &self.cache {
            cache.put(&key, &token).await?;
        }
        let access = token.access_token.clone();
        *current = Some(token);
        Ok(access)
    }

    async fn fetch(&self) -> Result<StoredToken, EdgeError> {
        debug!("fetching a token for {} from {}", self.auth.username, self.token_url);

        let form = [
            ("grant_type", "password"),
            ("username", self.auth.username.as_str()),
            ("password", self.auth.password.as_str()),
        ];
        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(TOKEN_CLIENT_ID, Some(TOKEN_CLIENT_SECRET))
            .header(ACCEPT, "application/json")
            .form(&form)
            .send()
            .await
            .map_err(|e| EdgeError::transport(&Method::POST, &self.token_url, e))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EdgeError::Transport {
                method: Method::POST.to_string(),
                url: self.token_url.to_string(),
                status: Some(status.as_u16()),
                message: if message.trim().is_empty() {
                    "token request rejected".to_string()
                } else {
                    message.trim().to_string()
                },
            });
        }

        let grant: TokenGrant = response
            .json()
            .await
            .map_err(|e| EdgeError::Format(format!("malformed token response: {e}")))?;

        Ok(StoredToken {
            access_token: grant.access_token,
            refresh_token: grant.refresh_token,
            expires_at: Utc::now() + Duration::seconds(grant.expires_in.max(0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use test_r::test;

    use chrono::{Duration, Utc};

    use super::{CredentialCache, FileCredentialCache, StoredToken};

    fn token(expires_in_secs: i64) -> StoredToken {
        StoredToken {
            access_token: "abc123".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        }
    }

    #[test]
    async fn file_cache_round_trips_tokens() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCredentialCache::new(dir.path().join("tokens.json"));

        assert!(cache.get("me@login").await.unwrap().is_none());

        let stored = token(600);
        cache.put("me@login", &stored).await.unwrap();
        assert_eq!(cache.get("me@login").await.unwrap(), Some(stored));
    }

    #[test]
    async fn file_cache_keeps_entries_per_key() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCredentialCache::new(dir.path().join("tokens.json"));

        cache.put("a@login", &token(600)).await.unwrap();
        cache.put("b@login", &token(900)).await.unwrap();

        assert!(cache.get("a@login").await.unwrap().is_some());
        assert!(cache.get("b@login").await.unwrap().is_some());
    }

    #[test]
    async fn unreadable_stash_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tokens.json");
        tokio::fs::write(&path, b"not json").await.unwrap();

        let cache = FileCredentialCache::new(&path);
        assert!(cache.get("me@login").await.unwrap().is_none());
    }

    #[test]
    fn default_expiry_check_uses_the_deadline() {
        let dir = tempfile::tempdir().unwrap();
        let cache = FileCredentialCache::new(dir.path().join("tokens.json"));
        assert!(!cache.is_expired(&token(600)));
        assert!(cache.is_expired(&token(-1)));
    }
}
