use std::time::Duration;

use backoff::backoff::Backoff;
use backoff::{ExponentialBackoff, ExponentialBackoffBuilder};
use tokio::time::sleep;
use trip_planner_model::ModelRequest;

use crate::error::CallError;
use crate::model_client::{ModelClient, ModelClientResponse};
use crate::throttle::Throttle;

const DEFAULT_MAX_RETRIES: u32 = 3;
const DEFAULT_INITIAL_DELAY: Duration = Duration::from_secs(2);

/// How rate-limited model calls are retried.
///
/// A call is attempted at most `max_retries + 1` times. The first retry
/// waits `initial_delay`, and every following one waits twice as long as
/// the previous.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            initial_delay: DEFAULT_INITIAL_DELAY,
        }
    }
}

impl RetryPolicy {
    fn backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(self.initial_delay)
            .with_multiplier(2.0)
            .with_randomization_factor(0.0)
            .with_max_interval(Duration::from_secs(3600))
            .with_max_elapsed_time(None)
            .build()
    }
}

/// Sends `request`, retrying rate-limited failures according to `policy`.
///
/// Every attempt, retries included, first passes through `throttle`.
pub(crate) async fn call_with_retry(
    client: &ModelClient,
    request: &ModelRequest,
    throttle: &mut Throttle,
    policy: &RetryPolicy,
) -> Result<ModelClientResponse, CallError> {
    let mut backoff = policy.backoff();
    let mut attempts = 0;
    loop {
        throttle.wait().await;
        attempts += 1;

        let err = match client.send_request(request).await {
            Ok(resp) => return Ok(resp),
            Err(err) if err.kind().is_transient() => err,
            Err(err) => return Err(CallError::Provider(err)),
        };

        let delay = match backoff.next_backoff() {
            Some(delay) if attempts <= policy.max_retries => delay,
            _ => {
                return Err(CallError::QuotaExhausted {
                    attempts,
                    last_error: err,
                });
            }
        };
        warn!(
            "rate limited ({err}), retrying in {:.1}s ({attempts}/{})",
            delay.as_secs_f64(),
            policy.max_retries
        );
        sleep(delay).await;
    }
}
