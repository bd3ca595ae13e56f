//! Transport retry and backoff.
//!
//! The engine itself never retries. A transport may be wrapped with a
//! [`RetryPolicy`] (from the `[retry]` config section) so that timeouts,
//! connection failures, throttling and 5xx responses are retried with
//! exponential backoff before the failure reaches the engine.

mod classify;
mod policy;
mod run;

pub use classify::{classify, classify_curl_error, classify_http_status};
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
