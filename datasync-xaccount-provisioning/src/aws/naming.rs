//! Fixed resource names.
//!
//! Names are process-wide constants so that re-running the pipeline with the
//! same configuration finds the resources created by an earlier run.

/// Customer-managed policy granting the transfer role access to the destination bucket.
pub const TRANSFER_POLICY_NAME: &str = "datasync-xaccount-s3-transfer-policy";

/// Role assumed by DataSync in the source account.
pub const TRANSFER_ROLE_NAME: &str = "datasync-xaccount-s3-role";

/// Session name used when assuming the destination account role.
pub const DESTINATION_SESSION_NAME: &str = "datasync-xaccount-bucket-policy-session";

/// Service principal allowed to assume the transfer role.
pub const DATASYNC_SERVICE_PRINCIPAL: &str = "datasync.amazonaws.com";

/// AWS-managed policies attached to the transfer role ahead of the custom policy.
pub const MANAGED_POLICY_ARNS: [&str; 2] = [
    "arn:aws:iam::aws:policy/AWSDataSyncFullAccess",
    "arn:aws:iam::aws:policy/AWSDataSyncReadOnlyAccess",
];

/// Provider name recorded on credentials obtained through `sts:AssumeRole`.
pub(crate) const ASSUMED_CREDENTIALS_PROVIDER: &str = "datasync-xaccount-assumed-role";

/// Managed policies followed by the custom policy, in attachment order.
pub fn policies_to_attach(custom_policy_arn: &str) -> Vec<String> {
    MANAGED_POLICY_ARNS
        .iter()
        .map(|arn| arn.to_string())
        .chain(std::iter::once(custom_policy_arn.to_string()))
        .collect()
}
