//! Bounded retry for calls that fail until IAM changes have propagated

use std::future::Future;

use crate::aws::AwsResult;
use crate::error::{ProvisionError, ProvisionResult};

impl super::service::DataSyncProvisioner {
    /// Run `attempt_once` until it succeeds, retrying with the configured
    /// backoff only while the failure is [`AwsError::PropagationPending`].
    ///
    /// Any other failure is returned immediately; running out of attempts
    /// yields [`ProvisionError::ConsistencyTimeout`].
    ///
    /// [`AwsError::PropagationPending`]: crate::aws::AwsError::PropagationPending
    pub(crate) async fn retry_while_propagating<T, F, Fut>(
        &self,
        action: &str,
        mut attempt_once: F,
    ) -> ProvisionResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AwsResult<T>>,
    {
        let retry = self.config.retry;
        let mut attempt = 1;
        loop {
            match attempt_once().await {
                Ok(value) => {
                    log::debug!("{action} succeeded on attempt {attempt}");
                    return Ok(value);
                }
                Err(e) if e.is_propagation_pending() => {
                    if attempt >= retry.max_attempts {
                        return Err(ProvisionError::ConsistencyTimeout {
                            attempts: attempt,
                            last_error: e,
                        });
                    }
                    let delay = retry.delay_for(attempt);
                    log::warn!(
                        "Attempt {attempt}/{} to {action} failed, retrying in {delay:?}: {e}",
                        retry.max_attempts
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
}
