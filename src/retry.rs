//!
//! Retry helper shared by the HTTP clients.
//!
//! A zero elapsed budget means a single attempt. Otherwise transient failures are retried with
//! exponential backoff until the budget is spent, and the last error is returned.

use backoff::{ExponentialBackoff, future::retry};
use std::fmt::Display;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

use crate::config::RetryConfig;

/// Errors that can tell whether another attempt could succeed.
pub(crate) trait Transient {
	fn is_transient(&self) -> bool;
}

pub(crate) async fn with_retry<T, E, F, Fut>(
	config: &RetryConfig,
	label: &str,
	mut operation: F,
) -> Result<T, E>
where
	F: FnMut() -> Fut,
	Fut: Future<Output = Result<T, E>>,
	E: Transient + Display,
{
	if config.max_elapsed_secs == 0 {
		return operation().await;
	}

	let policy = ExponentialBackoff {
		max_elapsed_time: Some(Duration::from_secs(config.max_elapsed_secs)),
		..ExponentialBackoff::default()
	};

	retry(policy, || {
		let attempt = operation();
		async move {
			attempt.await.map_err(|e| {
				if e.is_transient() {
					warn!("{} failed, retrying: {}", label, e);
					backoff::Error::transient(e)
				} else {
					backoff::Error::permanent(e)
				}
			})
		}
	})
	.await
}
