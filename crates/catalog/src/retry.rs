// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::error::CatalogError;

/// Backoff settings for catalog requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    /// Total attempts, including the first.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each later one.
    pub base_delay: Duration,
    /// Upper bound on any single delay, including `Retry-After` hints.
    pub max_delay: Duration,
}

impl Backoff {
    /// A policy that tries exactly once.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// A policy that retries without sleeping, for tests.
    #[must_use]
    pub const fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            base_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
        }
    }

    /// Returns the delay after failed attempt `attempt` (1-based).
    ///
    /// A `Retry-After` hint wins over the computed delay when it is longer.
    /// The result never exceeds `max_delay`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32, error: &CatalogError) -> Duration {
        let computed: Duration = self
            .base_delay
            .saturating_mul(2_u32.saturating_pow(attempt.saturating_sub(1)));
        let hinted: Duration = match error {
            CatalogError::RateLimited {
                retry_after: Some(hint),
            } => computed.max(*hint),
            _ => computed,
        };
        hinted.min(self.max_delay)
    }
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_delay: Duration::from_millis(250),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Runs `operation`, retrying retryable catalog errors with backoff.
///
/// # Errors
///
/// Returns the first non-retryable error, or the last error once attempts
/// are used up.
pub async fn with_retry<T, F, Fut>(
    backoff: &Backoff,
    what: &str,
    mut operation: F,
) -> Result<T, CatalogError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, CatalogError>>,
{
    let mut attempt: u32 = 1;
    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < backoff.max_attempts => {
                let delay: Duration = backoff.delay_for(attempt, &err);
                warn!(what, attempt, ?delay, error = %err, "Retrying catalog request");
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}
