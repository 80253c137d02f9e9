// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Spotify Web API client.
//!
//! Authenticates with the client-credentials grant and caches the bearer
//! token until shortly before it expires. Every API request goes through
//! the client's `Backoff`, so transient failures are retried here and
//! callers only see errors that retrying will not fix.

use std::future::Future;
use std::time::{Duration, Instant};

use reqwest::StatusCode;
use reqwest::header::RETRY_AFTER;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::CatalogError;
use crate::model::{Album, AlbumBatch, AlbumDetails, Artist, Page, Track};
use crate::retry::{Backoff, with_retry};

/// Maximum album ids accepted by one batched album lookup.
pub const ALBUM_BATCH_LIMIT: usize = 20;

/// Page size requested for album listings.
pub const ALBUM_PAGE_LIMIT: u32 = 50;

/// Album groups included in an artist's listing.
pub const ALBUM_GROUPS: &str = "album,single,compilation";

/// A cached token is refreshed this long before its reported expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

const DEFAULT_ACCOUNTS_URL: &str = "https://accounts.spotify.com";
const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Read access to an artist catalog.
///
/// Implementations must return every page of a listing, so callers never
/// see pagination.
pub trait Catalog {
    /// Fetches one artist.
    fn fetch_artist(
        &self,
        artist_id: &str,
    ) -> impl Future<Output = Result<Artist, CatalogError>> + Send;

    /// Fetches every album, single and compilation of an artist.
    fn fetch_albums(
        &self,
        artist_id: &str,
    ) -> impl Future<Output = Result<Vec<Album>, CatalogError>> + Send;

    /// Fetches album details with full track listings.
    ///
    /// Ids the catalog does not know are left out of the result.
    fn fetch_album_details(
        &self,
        album_ids: &[String],
    ) -> impl Future<Output = Result<Vec<AlbumDetails>, CatalogError>> + Send;
}

/// Client-credentials for the Spotify accounts service.
#[derive(Clone, PartialEq, Eq)]
pub struct SpotifyCredentials {
    /// Application client id.
    pub client_id: String,
    /// Application client secret.
    pub client_secret: String,
}

impl std::fmt::Debug for SpotifyCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpotifyCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Base URLs for the accounts and Web API services.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpotifyEndpoints {
    /// Accounts service root; the token endpoint is `{accounts_url}/api/token`.
    pub accounts_url: String,
    /// Web API root, including the version segment.
    pub api_url: String,
}

impl Default for SpotifyEndpoints {
    fn default() -> Self {
        Self {
            accounts_url: DEFAULT_ACCOUNTS_URL.to_string(),
            api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug)]
struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Spotify Web API client.
#[derive(Debug)]
pub struct SpotifyClient {
    http: reqwest::Client,
    credentials: SpotifyCredentials,
    endpoints: SpotifyEndpoints,
    backoff: Backoff,
    token: Mutex<Option<CachedToken>>,
}

impl SpotifyClient {
    /// Creates a client for the public Spotify endpoints.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(credentials: SpotifyCredentials) -> Result<Self, CatalogError> {
        Self::with_endpoints(credentials, SpotifyEndpoints::default(), Backoff::default())
    }

    /// Creates a client for custom endpoints and backoff.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_endpoints(
        credentials: SpotifyCredentials,
        endpoints: SpotifyEndpoints,
        backoff: Backoff,
    ) -> Result<Self, CatalogError> {
        let http: reqwest::Client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        Ok(Self {
            http,
            credentials,
            endpoints,
            backoff,
            token: Mutex::new(None),
        })
    }

    /// Drops the cached token so the next request exchanges credentials again.
    pub async fn invalidate_token(&self) {
        *self.token.lock().await = None;
    }

    /// Returns a valid bearer token, exchanging credentials when needed.
    async fn access_token(&self) -> Result<String, CatalogError> {
        let mut cached = self.token.lock().await;
        if let Some(token) = cached
            .as_ref()
            .filter(|token| Instant::now() < token.refresh_at)
        {
            return Ok(token.access_token.clone());
        }

        let fresh: TokenResponse =
            with_retry(&self.backoff, "token exchange", || self.exchange_credentials()).await?;
        let lifetime: Duration =
            Duration::from_secs(fresh.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        info!(expires_in = fresh.expires_in, "Obtained catalog access token");

        let access_token: String = fresh.access_token.clone();
        *cached = Some(CachedToken {
            access_token: fresh.access_token,
            refresh_at: Instant::now() + lifetime,
        });
        Ok(access_token)
    }

    async fn exchange_credentials(&self) -> Result<TokenResponse, CatalogError> {
        let url: String = format!("{}/api/token", self.endpoints.accounts_url);
        let response: reqwest::Response = self
            .http
            .post(&url)
            .basic_auth(
                &self.credentials.client_id,
                Some(&self.credentials.client_secret),
            )
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await?;

        let status: StatusCode = response.status();
        if status.is_server_error() {
            let message: String = response.text().await.unwrap_or_default();
            return Err(CatalogError::Server {
                status: status.as_u16(),
                message,
            });
        }
        if !status.is_success() {
            return Err(CatalogError::Auth(format!(
                "token exchange returned {status}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| CatalogError::Auth(format!("malformed token response: {e}")))
    }

    /// Performs one authenticated GET, retried per the client's backoff.
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, CatalogError> {
        with_retry(&self.backoff, what, || self.get_once(url, query, what)).await
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
        what: &str,
    ) -> Result<T, CatalogError> {
        let token: String = self.access_token().await?;
        debug!(url, what, "Querying catalog API");

        let response: reqwest::Response = self
            .http
            .get(url)
            .bearer_auth(token)
            .query(query)
            .send()
            .await?;

        let status: StatusCode = response.status();
        match status {
            s if s.is_success() => Ok(response.json::<T>().await?),
            StatusCode::UNAUTHORIZED => {
                self.invalidate_token().await;
                Err(CatalogError::Auth(format!("token rejected while fetching {what}")))
            }
            StatusCode::NOT_FOUND => Err(CatalogError::NotFound(what.to_string())),
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after: Option<Duration> = response
                    .headers()
                    .get(RETRY_AFTER)
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.trim().parse::<u64>().ok())
                    .map(Duration::from_secs);
                Err(CatalogError::RateLimited { retry_after })
            }
            s if s.is_server_error() => Err(CatalogError::Server {
                status: s.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
            s => Err(CatalogError::Client {
                status: s.as_u16(),
                message: response.text().await.unwrap_or_default(),
            }),
        }
    }

    /// Follows `next` links until the listing is complete.
    async fn collect_pages<T: DeserializeOwned>(
        &self,
        first: Page<T>,
        what: &str,
    ) -> Result<Vec<T>, CatalogError> {
        let mut items: Vec<T> = first.items;
        let mut next: Option<String> = first.next;
        while let Some(url) = next {
            let page: Page<T> = self.get_json(&url, &[], what).await?;
            items.extend(page.items);
            next = page.next;
        }
        Ok(items)
    }
}

impl Catalog for SpotifyClient {
    async fn fetch_artist(&self, artist_id: &str) -> Result<Artist, CatalogError> {
        let url: String = format!("{}/artists/{artist_id}", self.endpoints.api_url);
        self.get_json(&url, &[], &format!("artist '{artist_id}'"))
            .await
    }

    async fn fetch_albums(&self, artist_id: &str) -> Result<Vec<Album>, CatalogError> {
        let url: String = format!("{}/artists/{artist_id}/albums", self.endpoints.api_url);
        let what: String = format!("albums of artist '{artist_id}'");
        let query: [(&str, String); 2] = [
            ("include_groups", ALBUM_GROUPS.to_string()),
            ("limit", ALBUM_PAGE_LIMIT.to_string()),
        ];
        let first: Page<Album> = self.get_json(&url, &query, &what).await?;
        self.collect_pages(first, &what).await
    }

    async fn fetch_album_details(
        &self,
        album_ids: &[String],
    ) -> Result<Vec<AlbumDetails>, CatalogError> {
        let url: String = format!("{}/albums", self.endpoints.api_url);
        let mut details: Vec<AlbumDetails> = Vec::with_capacity(album_ids.len());

        for chunk in album_ids.chunks(ALBUM_BATCH_LIMIT) {
            let query: [(&str, String); 1] = [("ids", chunk.join(","))];
            let batch: AlbumBatch = self.get_json(&url, &query, "album details").await?;

            for mut album in batch.albums.into_iter().flatten() {
                let what: String = format!("tracks of album '{}'", album.id);
                let first: Page<Track> = Page {
                    items: std::mem::take(&mut album.tracks.items),
                    next: album.tracks.next.take(),
                    total: album.tracks.total,
                };
                album.tracks.items = self.collect_pages(first, &what).await?;
                details.push(album);
            }
        }

        Ok(details)
    }
}
