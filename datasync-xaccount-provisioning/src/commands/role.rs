//! Role Provisioner: ensure the DataSync transfer role exists

use crate::aws::arn::extract_account_from_arn;
use crate::aws::naming::TRANSFER_ROLE_NAME;
use crate::aws::AwsError;
use crate::error::{ProvisionError, ProvisionResult};
use crate::synthesis::build_trust_policy;
use crate::types::RoleInfo;

impl super::service::DataSyncProvisioner {
    /// Return the transfer role, creating it with the DataSync trust policy when absent.
    /// An existing role is returned without modification.
    pub async fn ensure_transfer_role(&self) -> ProvisionResult<RoleInfo> {
        if let Some(role) = self.cloud.find_role(TRANSFER_ROLE_NAME).await? {
            log::info!("Reusing existing role {}", role.arn);
            return self.in_source_account(role);
        }

        match self
            .cloud
            .create_role(TRANSFER_ROLE_NAME, &build_trust_policy())
            .await
        {
            Ok(role) => {
                log::info!("Created role {}", role.arn);
                self.in_source_account(role)
            }
            Err(AwsError::AlreadyExists(_)) => {
                let role = self.cloud.find_role(TRANSFER_ROLE_NAME).await?.ok_or_else(|| {
                    AwsError::IamError(format!(
                        "Role '{TRANSFER_ROLE_NAME}' reported as existing but not found"
                    ))
                })?;
                self.in_source_account(role)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The bucket policy grants access to this ARN, so it must belong to the source account
    fn in_source_account(&self, role: RoleInfo) -> ProvisionResult<RoleInfo> {
        match extract_account_from_arn(&role.arn) {
            Some(account) if account == self.config.source_account => Ok(role),
            Some(account) => Err(ProvisionError::AccountMismatch {
                source_account: self.config.source_account.clone(),
                caller_account: account,
            }),
            None => Err(AwsError::IamError(format!(
                "Role '{}' has an unexpected ARN: {}",
                role.name, role.arn
            ))
            .into()),
        }
    }
}
