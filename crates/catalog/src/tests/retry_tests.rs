// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use crate::{Backoff, CatalogError, with_retry};

fn server_error() -> CatalogError {
    CatalogError::Server {
        status: 502,
        message: String::from("bad gateway"),
    }
}

#[test]
fn test_delay_doubles_and_is_capped() {
    let backoff: Backoff = Backoff {
        max_attempts: 6,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_millis(500),
    };
    let err: CatalogError = server_error();

    assert_eq!(backoff.delay_for(1, &err), Duration::from_millis(100));
    assert_eq!(backoff.delay_for(2, &err), Duration::from_millis(200));
    assert_eq!(backoff.delay_for(3, &err), Duration::from_millis(400));
    assert_eq!(backoff.delay_for(4, &err), Duration::from_millis(500));
}

#[test]
fn test_retry_after_hint_extends_delay() {
    let backoff: Backoff = Backoff {
        max_attempts: 3,
        base_delay: Duration::from_millis(100),
        max_delay: Duration::from_secs(5),
    };
    let limited: CatalogError = CatalogError::RateLimited {
        retry_after: Some(Duration::from_secs(2)),
    };
    let capped: CatalogError = CatalogError::RateLimited {
        retry_after: Some(Duration::from_secs(60)),
    };

    assert_eq!(backoff.delay_for(1, &limited), Duration::from_secs(2));
    assert_eq!(backoff.delay_for(1, &capped), Duration::from_secs(5));
}

#[test]
fn test_error_classification() {
    assert!(CatalogError::Network(String::from("reset")).is_retryable());
    assert!(CatalogError::RateLimited { retry_after: None }.is_retryable());
    assert!(server_error().is_retryable());

    let auth: CatalogError = CatalogError::Auth(String::from("bad secret"));
    assert!(!auth.is_retryable());
    assert!(auth.is_auth());
    assert!(!CatalogError::NotFound(String::from("artist")).is_retryable());
    assert!(
        !CatalogError::Client {
            status: 400,
            message: String::new()
        }
        .is_retryable()
    );
}

#[tokio::test]
async fn test_with_retry_recovers_from_transient_errors() {
    let calls: AtomicU32 = AtomicU32::new(0);

    let result: Result<u32, CatalogError> = with_retry(&Backoff::immediate(3), "test", || async {
        let n: u32 = calls.fetch_add(1, Ordering::SeqCst) + 1;
        if n < 3 { Err(server_error()) } else { Ok(n) }
    })
    .await;

    assert_eq!(result.unwrap(), 3);
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_with_retry_gives_up_after_max_attempts() {
    let calls: AtomicU32 = AtomicU32::new(0);

    let result: Result<(), CatalogError> = with_retry(&Backoff::immediate(2), "test", || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(CatalogError::Network(String::from("timeout")))
    })
    .await;

    assert_eq!(result, Err(CatalogError::Network(String::from("timeout"))));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_with_retry_never_retries_auth_failures() {
    let calls: AtomicU32 = AtomicU32::new(0);

    let result: Result<(), CatalogError> = with_retry(&Backoff::immediate(5), "test", || async {
        calls.fetch_add(1, Ordering::SeqCst);
        Err(CatalogError::Auth(String::from("invalid_client")))
    })
    .await;

    assert!(result.unwrap_err().is_auth());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
