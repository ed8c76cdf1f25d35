//! Policy Binder: attach managed and custom policies to the transfer role

use crate::aws::naming::policies_to_attach;
use crate::error::ProvisionResult;

impl super::service::DataSyncProvisioner {
    /// Attach the AWS-managed DataSync policies and `custom_policy_arn` to `role_name`.
    ///
    /// Attachments are independent calls made in order. The first failure is
    /// returned and earlier attachments stay in place.
    pub async fn bind_policies(
        &self,
        role_name: &str,
        custom_policy_arn: &str,
    ) -> ProvisionResult<Vec<String>> {
        let policies = policies_to_attach(custom_policy_arn);
        for policy_arn in &policies {
            self.cloud.attach_role_policy(role_name, policy_arn).await?;
            log::info!("Attached {policy_arn} to {role_name}");
        }
        Ok(policies)
    }
}
