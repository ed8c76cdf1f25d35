//! S3 client built from assumed-role credentials

use aws_config::SdkConfig;
use aws_credential_types::Credentials;
use aws_sdk_s3::error::ProvideErrorMetadata;
use aws_sdk_s3::Client as S3Client;

use crate::aws::naming::ASSUMED_CREDENTIALS_PROVIDER;
use crate::aws::propagation::{bucket_policy_pending, is_wrong_region};
use crate::aws::{AwsError, AwsResult};
use crate::types::{PolicyDocument, TemporaryCredentials};

/// Build a one-off S3 client that authenticates with exactly `credentials`.
///
/// The SDK does not follow cross-region redirects, so `bucket_region` must
/// name the bucket's region when it differs from `base`.
pub(crate) fn client_for_credentials(
    base: &SdkConfig,
    credentials: &TemporaryCredentials,
    bucket_region: Option<&str>,
) -> S3Client {
    let provider = Credentials::new(
        credentials.access_key_id.clone(),
        credentials.secret_access_key.clone(),
        Some(credentials.session_token.clone()),
        credentials.expiration,
        ASSUMED_CREDENTIALS_PROVIDER,
    );
    let mut builder = aws_sdk_s3::config::Builder::from(base).credentials_provider(provider);
    if let Some(region) = bucket_region {
        builder = builder.region(aws_config::Region::new(region.to_string()));
    }
    let config = builder.build();
    S3Client::from_conf(config)
}

/// Replace the bucket policy of `bucket`.
///
/// S3 validates principals when the policy is written; a principal that IAM
/// has not propagated yet comes back as `MalformedPolicy: Invalid principal`.
pub(crate) async fn put_bucket_policy(
    client: &S3Client,
    bucket: &str,
    policy: &PolicyDocument,
) -> AwsResult<()> {
    let policy_json = serde_json::to_string(policy)
        .map_err(|e| AwsError::PolicyError(format!("Failed to serialize bucket policy: {e}")))?;

    client
        .put_bucket_policy()
        .bucket(bucket)
        .policy(policy_json)
        .send()
        .await
        .map_err(|e| {
            let message = format!("Failed to put bucket policy on '{bucket}': {e:?}");
            if bucket_policy_pending(e.code(), e.message()) {
                AwsError::PropagationPending(message)
            } else if is_wrong_region(e.code()) {
                AwsError::S3Error(format!(
                    "{message}; bucket '{bucket}' is in another region, configure the bucket region"
                ))
            } else {
                AwsError::S3Error(message)
            }
        })?;
    Ok(())
}
