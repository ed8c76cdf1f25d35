use aws_sdk_sts::error::ProvideErrorMetadata;
use aws_sdk_sts::Client as StsClient;

use crate::aws::propagation::assume_role_pending;
use crate::aws::{AwsError, AwsResult};
use crate::types::TemporaryCredentials;

/// Return the current caller account ID using STS GetCallerIdentity.
///
/// This is used for the source-account guardrail check before any IAM mutation.
pub async fn caller_account_id(client: &StsClient) -> AwsResult<String> {
    let out = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| AwsError::StsError(format!("STS GetCallerIdentity failed: {}", e)))?;
    let acct = out
        .account()
        .map(|s| s.to_string())
        .ok_or_else(|| AwsError::StsError("STS GetCallerIdentity missing Account".to_string()))?;
    Ok(acct)
}

/// Assume `role_arn` and return its temporary credentials.
///
/// `AccessDenied` is reported as [`AwsError::PropagationPending`]: right after
/// the trust chain changes STS rejects the call until IAM catches up.
pub async fn assume_role(
    client: &StsClient,
    role_arn: &str,
    session_name: &str,
) -> AwsResult<TemporaryCredentials> {
    let out = client
        .assume_role()
        .role_arn(role_arn)
        .role_session_name(session_name)
        .send()
        .await
        .map_err(|e| {
            let message = format!("STS AssumeRole for '{role_arn}' failed: {e:?}");
            if assume_role_pending(e.code()) {
                AwsError::PropagationPending(message)
            } else {
                AwsError::StsError(message)
            }
        })?;

    let creds = out.credentials().ok_or_else(|| {
        AwsError::StsError(format!("STS AssumeRole for '{role_arn}' returned no credentials"))
    })?;

    Ok(TemporaryCredentials {
        access_key_id: creds.access_key_id().to_string(),
        secret_access_key: creds.secret_access_key().to_string(),
        session_token: creds.session_token().to_string(),
        expiration: std::time::SystemTime::try_from(*creds.expiration())
            .inspect_err(|e| log::debug!("Ignoring unrepresentable credential expiration: {e:?}"))
            .ok(),
    })
}
