//! Transport-level resend for platform calls.
//!
//! A report page that never reached the platform (connection refused,
//! reset, timed out) is sent again after a pause from [`BACKOFF`]. Anything
//! the platform actually answered, whatever the status, goes back to the
//! caller unchanged: a 4xx or 5xx on a report page is an account failure
//! for the orchestrator to log, not something to hammer.

use std::future::Future;
use std::time::Duration;

/// Pause before each resend. One entry per resend, so a call is attempted
/// at most `BACKOFF.len() + 1` times.
pub(crate) const BACKOFF: [Duration; 3] = [
    Duration::from_millis(200),
    Duration::from_millis(400),
    Duration::from_millis(800),
];

/// Run `send` until it yields a response or [`BACKOFF`] is used up.
///
/// `send` must build a new request on every call; a `reqwest` request
/// cannot be replayed.
pub(crate) async fn retry_send<F, Fut>(
    endpoint: &str,
    send: F,
) -> Result<reqwest::Response, reqwest::Error>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<reqwest::Response, reqwest::Error>>,
{
    for (resend, pause) in BACKOFF.iter().enumerate() {
        match send().await {
            Ok(resp) => return Ok(resp),
            Err(err) => {
                tracing::warn!(
                    endpoint,
                    resend = resend + 1,
                    pause_ms = pause.as_millis() as u64,
                    error = %err,
                    "no response from platform, sending again"
                );
                tokio::time::sleep(*pause).await;
            }
        }
    }
    send().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_doubles_and_stays_under_two_seconds() {
        for pair in BACKOFF.windows(2) {
            assert_eq!(pair[1], pair[0] * 2);
        }
        let total: Duration = BACKOFF.iter().sum();
        assert!(total < Duration::from_secs(2));
    }
}
