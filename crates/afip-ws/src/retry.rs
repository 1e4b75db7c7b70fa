//! Retry policy for AFIP HTTP calls.
//!
//! Retries only transient transport errors (connection failures,
//! timeouts), with exponential backoff. Non-retryable outcomes (non-2xx
//! statuses, SOAP faults, response scraping failures) are never retried —
//! the invoicing service treats a delivered request as consumed, and
//! blindly resubmitting an authorization request is how duplicate-number
//! rejections happen.

use std::time::Duration;

/// Backoff policy applied by [`crate::SoapClient`] to each request.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Retry attempts after the initial request.
    pub max_retries: u32,
    /// Delay before the first retry; doubles on each subsequent one.
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    /// Three retries at 200ms → 400ms → 800ms.
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(200),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            base_delay: Duration::ZERO,
        }
    }

    /// Send an HTTP request, retrying transport errors with backoff.
    ///
    /// The closure `f` is called up to `max_retries + 1` times. Only
    /// [`reqwest::Error`] transport failures trigger a retry — the caller
    /// is responsible for inspecting the response status code.
    pub(crate) async fn send<F, Fut>(&self, f: F) -> Result<reqwest::Response, reqwest::Error>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<reqwest::Response, reqwest::Error>>,
    {
        // Retry attempts with backoff, then one final attempt without retry.
        for attempt in 0..self.max_retries {
            match f().await {
                Ok(resp) => return Ok(resp),
                Err(e) => {
                    let delay = self.base_delay * 2u32.pow(attempt);
                    tracing::warn!(
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        "AFIP HTTP request failed, retrying in {delay:?}: {e}"
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }
        f().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy {
            max_retries,
            base_delay: Duration::from_millis(1),
        }
    }

    async fn refused_connection() -> Result<reqwest::Response, reqwest::Error> {
        // Request to a guaranteed-closed port → connection refused.
        reqwest::Client::builder()
            .timeout(Duration::from_millis(50))
            .build()
            .unwrap()
            .get("http://127.0.0.1:1/")
            .send()
            .await
    }

    #[tokio::test]
    async fn exhausts_all_attempts_on_transport_failure() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = call_count.clone();

        let result = fast_policy(3)
            .send(|| {
                let cc = cc.clone();
                async move {
                    cc.fetch_add(1, Ordering::SeqCst);
                    refused_connection().await
                }
            })
            .await;

        assert!(result.is_err(), "request to closed port must fail");
        assert_eq!(
            call_count.load(Ordering::SeqCst),
            4,
            "should exhaust all retry attempts"
        );
    }

    #[tokio::test]
    async fn none_policy_attempts_exactly_once() {
        let call_count = Arc::new(AtomicU32::new(0));
        let cc = call_count.clone();

        let result = RetryPolicy::none()
            .send(|| {
                let cc = cc.clone();
                async move {
                    cc.fetch_add(1, Ordering::SeqCst);
                    refused_connection().await
                }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(call_count.load(Ordering::SeqCst), 1);
    }
}
