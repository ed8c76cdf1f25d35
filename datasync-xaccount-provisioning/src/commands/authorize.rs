//! Cross-Account Authorizer: write the destination bucket policy

use crate::aws::naming::DESTINATION_SESSION_NAME;
use crate::aws::AwsResult;
use crate::error::ProvisionResult;
use crate::synthesis::build_bucket_policy;
use crate::types::PolicyDocument;

impl super::service::DataSyncProvisioner {
    /// Assume the destination account role and apply the bucket policy that
    /// grants `source_role_arn` transfer access.
    ///
    /// The assume + put sequence is retried with backoff while the failure is
    /// one IAM propagation explains; any other failure returns immediately.
    pub async fn authorize_destination(&self, source_role_arn: &str) -> ProvisionResult<()> {
        let policy = build_bucket_policy(
            &self.config.target_bucket,
            source_role_arn,
            &self.config.admin_principal_arn,
        );
        self.retry_while_propagating("authorize the destination bucket", || {
            self.apply_bucket_policy(&policy)
        })
        .await?;
        log::info!("Bucket policy applied to {}", self.config.target_bucket);
        Ok(())
    }

    /// One attempt: fresh credentials, one ephemeral client, one put
    async fn apply_bucket_policy(&self, policy: &PolicyDocument) -> AwsResult<()> {
        let credentials = self
            .cloud
            .assume_role(&self.config.destination_role_arn, DESTINATION_SESSION_NAME)
            .await?;
        log::debug!(
            "Assumed {} with session {DESTINATION_SESSION_NAME}",
            self.config.destination_role_arn
        );
        self.cloud
            .put_bucket_policy(&credentials, &self.config.target_bucket, policy)
            .await
    }
}
