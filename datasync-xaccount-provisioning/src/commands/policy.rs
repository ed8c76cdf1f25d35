//! Policy Provisioner: ensure the S3 transfer policy exists

use crate::aws::naming::TRANSFER_POLICY_NAME;
use crate::aws::AwsError;
use crate::error::ProvisionResult;
use crate::synthesis::build_transfer_policy;

impl super::service::DataSyncProvisioner {
    /// Return the ARN of the transfer policy, creating it when absent.
    ///
    /// An existing policy is reused as-is; its document is not compared or updated.
    pub async fn ensure_transfer_policy(&self) -> ProvisionResult<String> {
        if let Some(arn) = self.cloud.find_local_policy(TRANSFER_POLICY_NAME).await? {
            log::info!("Reusing existing policy {arn}");
            return Ok(arn);
        }

        let document = build_transfer_policy(&self.config.target_bucket);
        match self.cloud.create_policy(TRANSFER_POLICY_NAME, &document).await {
            Ok(arn) => {
                log::info!("Created policy {arn}");
                Ok(arn)
            }
            // Lost a race with a concurrent creator; the policy is there now.
            Err(AwsError::AlreadyExists(_)) => self
                .cloud
                .find_local_policy(TRANSFER_POLICY_NAME)
                .await?
                .ok_or_else(|| {
                    AwsError::IamError(format!(
                        "Policy '{TRANSFER_POLICY_NAME}' reported as existing but not found"
                    ))
                    .into()
                }),
            Err(e) => Err(e.into()),
        }
    }
}
