//! Retry loop: run a transfer until success or the policy says stop.

use super::classify::classify;
use super::policy::{RetryDecision, RetryPolicy};
use crate::transport::TransportError;

pub fn run_with_retry<T, F>(policy: &RetryPolicy, mut f: F) -> Result<T, TransportError>
where
    F: FnMut() -> Result<T, TransportError>,
{
    let mut attempt = 1u32;
    loop {
        let err = match f() {
            Ok(v) => return Ok(v),
            Err(e) => e,
        };
        match policy.decide(attempt, classify(&err)) {
            RetryDecision::NoRetry => return Err(err),
            RetryDecision::RetryAfter(d) => {
                tracing::warn!(attempt, delay_ms = d.as_millis() as u64, "transfer failed, retrying: {}", err);
                std::thread::sleep(d);
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn fast(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
            max_delay: Duration::from_millis(1),
        }
    }

    fn throttled() -> TransportError {
        TransportError::Http {
            url: "http://x/a".into(),
            code: 503,
        }
    }

    #[test]
    fn retries_until_success() {
        let mut calls = 0;
        let out = run_with_retry(&fast(5), || {
            calls += 1;
            if calls < 3 {
                Err(throttled())
            } else {
                Ok(calls)
            }
        })
        .unwrap();
        assert_eq!(out, 3);
    }

    #[test]
    fn gives_up_after_max_attempts() {
        let mut calls = 0;
        let res: Result<(), _> = run_with_retry(&fast(2), || {
            calls += 1;
            Err(throttled())
        });
        assert!(res.is_err());
        assert_eq!(calls, 2);
    }

    #[test]
    fn final_errors_not_retried() {
        let mut calls = 0;
        let res: Result<(), _> = run_with_retry(&fast(5), || {
            calls += 1;
            Err(TransportError::Http {
                url: "http://x/a".into(),
                code: 404,
            })
        });
        assert!(res.is_err());
        assert_eq!(calls, 1);
    }
}
