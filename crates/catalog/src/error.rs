// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::time::Duration;

use thiserror::Error;

/// Errors returned by the catalog client.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// The request never produced a response.
    #[error("Network error: {0}")]
    Network(String),

    /// The API asked us to slow down.
    #[error("Rate limit exceeded")]
    RateLimited {
        /// The server's `Retry-After` hint, when present.
        retry_after: Option<Duration>,
    },

    /// The API failed with a 5xx status.
    #[error("Catalog server error {status}: {message}")]
    Server {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The client-credentials exchange failed or the token was rejected.
    #[error("Catalog authentication failed: {0}")]
    Auth(String),

    /// The API rejected the request with a 4xx status.
    #[error("Catalog request rejected {status}: {message}")]
    Client {
        /// HTTP status code.
        status: u16,
        /// Response body, if any.
        message: String,
    },

    /// The requested artist or album does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The response body did not match the expected shape.
    #[error("Parse error: {0}")]
    Parse(String),
}

impl CatalogError {
    /// Returns whether retrying the same request may succeed.
    ///
    /// Network failures, rate limiting and server errors are retryable.
    /// Authentication failures need new credentials and are never retried.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Network(_) | Self::RateLimited { .. } | Self::Server { .. }
        )
    }

    /// Returns whether the error requires re-authentication.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }
}

impl From<reqwest::Error> for CatalogError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::Parse(err.to_string())
        } else {
            Self::Network(err.to_string())
        }
    }
}
