//! Primary-then-fallback call with per-call timeouts

use std::future::Future;
use std::time::Duration;
use tracing::{error, warn};

use crate::sources::SourceError;

/// Run `primary` under `timeout`; on any failure run `secondary` once under
/// the same timeout. `None` means both failed.
///
/// `secondary` is only polled when `primary` fails.
pub async fn with_fallback<T, P, S>(
    domain: &str,
    primary: P,
    secondary: S,
    timeout: Duration,
) -> Option<T>
where
    P: Future<Output = Result<T, SourceError>>,
    S: Future<Output = Result<T, SourceError>>,
{
    let primary_err = match bounded(primary, timeout).await {
        Ok(value) => return Some(value),
        Err(e) => e,
    };
    warn!(
        "{} primary source failed, trying fallback: {}",
        domain, primary_err
    );

    match bounded(secondary, timeout).await {
        Ok(value) => Some(value),
        Err(fallback_err) => {
            error!(
                "{} sources exhausted, using empty data (primary: {}, fallback: {})",
                domain, primary_err, fallback_err
            );
            None
        }
    }
}

async fn bounded<T, F>(call: F, timeout: Duration) -> Result<T, SourceError>
where
    F: Future<Output = Result<T, SourceError>>,
{
    tokio::time::timeout(timeout, call)
        .await
        .map_err(|_| SourceError::Timeout(timeout))?
}
