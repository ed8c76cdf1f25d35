//! The cloud API seam used by the provisioning stages.
//!
//! Stages only talk to [`CloudApi`]; [`AwsCloud`] is the production
//! implementation backed by the AWS SDK clients.

use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_datasync::Client as DataSyncClient;
use aws_sdk_iam::Client as IamClient;
use aws_sdk_sts::Client as StsClient;

use crate::aws::datasync_client::AwsDataSyncClient;
use crate::aws::iam_client::AwsIamClient;
use crate::aws::{s3_client, sts, AwsResult};
use crate::types::{LocationInfo, LocationRequest, PolicyDocument, RoleInfo, TemporaryCredentials};

#[async_trait]
pub trait CloudApi: Send + Sync {
    /// Account ID of the credentials the pipeline runs with
    async fn caller_account_id(&self) -> AwsResult<String>;

    /// ARN of the customer-managed policy named `policy_name`, if any
    async fn find_local_policy(&self, policy_name: &str) -> AwsResult<Option<String>>;

    /// Create a customer-managed policy and return its ARN.
    /// Fails with `AwsError::AlreadyExists` on a name collision.
    async fn create_policy(&self, policy_name: &str, document: &PolicyDocument)
        -> AwsResult<String>;

    async fn find_role(&self, role_name: &str) -> AwsResult<Option<RoleInfo>>;

    /// Create a role with the given trust policy.
    /// Fails with `AwsError::AlreadyExists` on a name collision.
    async fn create_role(&self, role_name: &str, trust_policy: &PolicyDocument)
        -> AwsResult<RoleInfo>;

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> AwsResult<()>;

    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> AwsResult<TemporaryCredentials>;

    /// Write `policy` to `bucket` using a client authenticated with `credentials` only
    async fn put_bucket_policy(
        &self,
        credentials: &TemporaryCredentials,
        bucket: &str,
        policy: &PolicyDocument,
    ) -> AwsResult<()>;

    async fn create_location_s3(&self, request: &LocationRequest) -> AwsResult<LocationInfo>;
}

/// [`CloudApi`] backed by the AWS SDK
pub struct AwsCloud {
    base_config: SdkConfig,
    bucket_region: Option<String>,
    iam: AwsIamClient,
    sts: StsClient,
    datasync: AwsDataSyncClient,
}

impl AwsCloud {
    /// Load the SDK configuration with the standard credential provider chain.
    ///
    /// `region` overrides the provider chain for IAM, STS and S3;
    /// `bucket_region` overrides it again for the destination bucket client.
    /// DataSync always uses `datasync_region`.
    pub async fn load(
        region: Option<&str>,
        bucket_region: Option<&str>,
        datasync_region: &str,
    ) -> Self {
        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region.to_string()));
        }
        let base_config = loader.load().await;

        let datasync_config = aws_sdk_datasync::config::Builder::from(&base_config)
            .region(aws_config::Region::new(datasync_region.to_string()))
            .build();

        Self {
            iam: AwsIamClient::new(IamClient::new(&base_config)),
            sts: StsClient::new(&base_config),
            datasync: AwsDataSyncClient::new(DataSyncClient::from_conf(datasync_config)),
            base_config,
            bucket_region: bucket_region.map(str::to_string),
        }
    }
}

#[async_trait]
impl CloudApi for AwsCloud {
    async fn caller_account_id(&self) -> AwsResult<String> {
        sts::caller_account_id(&self.sts).await
    }

    async fn find_local_policy(&self, policy_name: &str) -> AwsResult<Option<String>> {
        self.iam.find_local_policy(policy_name).await
    }

    async fn create_policy(
        &self,
        policy_name: &str,
        document: &PolicyDocument,
    ) -> AwsResult<String> {
        self.iam.create_policy(policy_name, document).await
    }

    async fn find_role(&self, role_name: &str) -> AwsResult<Option<RoleInfo>> {
        self.iam.find_role(role_name).await
    }

    async fn create_role(
        &self,
        role_name: &str,
        trust_policy: &PolicyDocument,
    ) -> AwsResult<RoleInfo> {
        self.iam.create_role(role_name, trust_policy).await
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> AwsResult<()> {
        self.iam.attach_role_policy(role_name, policy_arn).await
    }

    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> AwsResult<TemporaryCredentials> {
        sts::assume_role(&self.sts, role_arn, session_name).await
    }

    async fn put_bucket_policy(
        &self,
        credentials: &TemporaryCredentials,
        bucket: &str,
        policy: &PolicyDocument,
    ) -> AwsResult<()> {
        let client = s3_client::client_for_credentials(
            &self.base_config,
            credentials,
            self.bucket_region.as_deref(),
        );
        s3_client::put_bucket_policy(&client, bucket, policy).await
    }

    async fn create_location_s3(&self, request: &LocationRequest) -> AwsResult<LocationInfo> {
        self.datasync.create_location_s3(request).await
    }
}
