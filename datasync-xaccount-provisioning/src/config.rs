//! Validated provisioning configuration.
//!
//! Every value the policy documents embed is checked here, once, so a missing
//! or malformed setting fails before any AWS call is made.

use crate::aws::arn::{is_account_id, is_bucket_policy_principal_arn, is_iam_role_arn};
use crate::error::{ProvisionError, ProvisionResult};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Environment variable names of the required settings
pub const ENV_TARGET_BUCKET: &str = "TARGET_S3_NAME";
pub const ENV_SOURCE_ACCOUNT: &str = "SOURCE_ACC_NUMBER";
pub const ENV_DESTINATION_ROLE_ARN: &str = "role_arn_to_assume_in_destination_account";
pub const ENV_ADMIN_ROLE_ARN: &str = "datasync_admin_role_arn";

pub const DEFAULT_DATASYNC_REGION: &str = "us-east-1";

/// S3 storage classes accepted by DataSync `CreateLocationS3`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum StorageClass {
    #[default]
    Standard,
    StandardIa,
    OnezoneIa,
    IntelligentTiering,
    Glacier,
    GlacierInstantRetrieval,
    DeepArchive,
    Outposts,
}

impl StorageClass {
    pub const ALL: [StorageClass; 8] = [
        StorageClass::Standard,
        StorageClass::StandardIa,
        StorageClass::OnezoneIa,
        StorageClass::IntelligentTiering,
        StorageClass::Glacier,
        StorageClass::GlacierInstantRetrieval,
        StorageClass::DeepArchive,
        StorageClass::Outposts,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StorageClass::Standard => "STANDARD",
            StorageClass::StandardIa => "STANDARD_IA",
            StorageClass::OnezoneIa => "ONEZONE_IA",
            StorageClass::IntelligentTiering => "INTELLIGENT_TIERING",
            StorageClass::Glacier => "GLACIER",
            StorageClass::GlacierInstantRetrieval => "GLACIER_INSTANT_RETRIEVAL",
            StorageClass::DeepArchive => "DEEP_ARCHIVE",
            StorageClass::Outposts => "OUTPOSTS",
        }
    }
}

impl fmt::Display for StorageClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StorageClass {
    type Err = ProvisionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace('-', "_");
        StorageClass::ALL
            .into_iter()
            .find(|class| class.as_str() == normalized)
            .ok_or_else(|| {
                ProvisionError::invalid_config(
                    "storage_class",
                    format!(
                        "'{s}' is not one of {}",
                        StorageClass::ALL.map(|c| c.as_str()).join(", ")
                    ),
                )
            })
    }
}

/// Bounded exponential backoff used while waiting for IAM propagation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub multiplier: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 6,
            initial_delay: Duration::from_secs(2),
            max_delay: Duration::from_secs(30),
            multiplier: 2,
        }
    }
}

impl RetryPolicy {
    /// Policy that never sleeps, for callers that want a single attempt or tests
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::ZERO,
            max_delay: Duration::ZERO,
            multiplier: 1,
        }
    }

    /// Delay before retry number `attempt` (1-based: the delay after the first failure is `initial_delay`)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self
            .multiplier
            .saturating_pow(attempt.saturating_sub(1));
        self.initial_delay
            .saturating_mul(factor)
            .min(self.max_delay)
    }
}

/// Settings for one provisioning run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProvisionConfig {
    pub target_bucket: String,
    pub source_account: String,
    pub destination_role_arn: String,
    pub admin_principal_arn: String,
    /// Region for IAM/STS/S3 clients; `None` defers to the SDK provider chain
    pub region: Option<String>,
    /// Region of the destination bucket, for the client that writes its policy;
    /// `None` uses `region`
    pub bucket_region: Option<String>,
    pub datasync_region: String,
    pub storage_class: StorageClass,
    pub retry: RetryPolicy,
}

impl ProvisionConfig {
    pub fn builder() -> ProvisionConfigBuilder {
        ProvisionConfigBuilder::default()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ProvisionConfigBuilder {
    target_bucket: Option<String>,
    source_account: Option<String>,
    destination_role_arn: Option<String>,
    admin_principal_arn: Option<String>,
    region: Option<String>,
    bucket_region: Option<String>,
    datasync_region: Option<String>,
    storage_class: Option<StorageClass>,
    retry: Option<RetryPolicy>,
}

impl ProvisionConfigBuilder {
    pub fn target_bucket(mut self, value: impl Into<String>) -> Self {
        self.target_bucket = Some(value.into());
        self
    }

    pub fn source_account(mut self, value: impl Into<String>) -> Self {
        self.source_account = Some(value.into());
        self
    }

    pub fn destination_role_arn(mut self, value: impl Into<String>) -> Self {
        self.destination_role_arn = Some(value.into());
        self
    }

    pub fn admin_principal_arn(mut self, value: impl Into<String>) -> Self {
        self.admin_principal_arn = Some(value.into());
        self
    }

    pub fn set_target_bucket(mut self, value: Option<String>) -> Self {
        self.target_bucket = value;
        self
    }

    pub fn set_source_account(mut self, value: Option<String>) -> Self {
        self.source_account = value;
        self
    }

    pub fn set_destination_role_arn(mut self, value: Option<String>) -> Self {
        self.destination_role_arn = value;
        self
    }

    pub fn set_admin_principal_arn(mut self, value: Option<String>) -> Self {
        self.admin_principal_arn = value;
        self
    }

    pub fn region(mut self, value: Option<String>) -> Self {
        self.region = value;
        self
    }

    pub fn bucket_region(mut self, value: Option<String>) -> Self {
        self.bucket_region = value;
        self
    }

    pub fn datasync_region(mut self, value: impl Into<String>) -> Self {
        self.datasync_region = Some(value.into());
        self
    }

    pub fn storage_class(mut self, value: StorageClass) -> Self {
        self.storage_class = Some(value);
        self
    }

    pub fn retry(mut self, value: RetryPolicy) -> Self {
        self.retry = Some(value);
        self
    }

    /// Validate and produce the configuration.
    ///
    /// Required values are checked in a fixed order so the reported field is stable.
    pub fn build(self) -> ProvisionResult<ProvisionConfig> {
        let target_bucket = required(self.target_bucket, ENV_TARGET_BUCKET)?;
        let source_account = required(self.source_account, ENV_SOURCE_ACCOUNT)?;
        let destination_role_arn = required(self.destination_role_arn, ENV_DESTINATION_ROLE_ARN)?;
        let admin_principal_arn = required(self.admin_principal_arn, ENV_ADMIN_ROLE_ARN)?;

        validate_bucket_name(&target_bucket)?;

        if !is_account_id(&source_account) {
            return Err(ProvisionError::invalid_config(
                "source_account",
                format!("'{source_account}' is not a 12-digit AWS account ID"),
            ));
        }
        if !is_iam_role_arn(&destination_role_arn) {
            return Err(ProvisionError::invalid_config(
                "destination_role_arn",
                format!("'{destination_role_arn}' is not an IAM role ARN"),
            ));
        }
        if !is_bucket_policy_principal_arn(&admin_principal_arn) {
            return Err(ProvisionError::invalid_config(
                "admin_principal_arn",
                format!("'{admin_principal_arn}' is not an IAM or STS principal ARN"),
            ));
        }

        let retry = self.retry.unwrap_or_default();
        if retry.max_attempts == 0 {
            return Err(ProvisionError::invalid_config(
                "max_assume_attempts",
                "must be at least 1",
            ));
        }

        let region = optional(self.region);
        let bucket_region = optional(self.bucket_region);
        let datasync_region = self
            .datasync_region
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_DATASYNC_REGION.to_string());

        Ok(ProvisionConfig {
            target_bucket,
            source_account,
            destination_role_arn,
            admin_principal_arn,
            region,
            bucket_region,
            datasync_region,
            storage_class: self.storage_class.unwrap_or_default(),
            retry,
        })
    }
}

fn required(value: Option<String>, name: &'static str) -> ProvisionResult<String> {
    match value.map(|v| v.trim().to_string()) {
        Some(v) if !v.is_empty() => Ok(v),
        _ => Err(ProvisionError::MissingConfig(name)),
    }
}

fn optional(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn validate_bucket_name(bucket: &str) -> ProvisionResult<()> {
    let valid_chars = bucket
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '.' || c == '-');
    let valid_edges = bucket
        .chars()
        .next()
        .zip(bucket.chars().last())
        .is_some_and(|(first, last)| first.is_ascii_alphanumeric() && last.is_ascii_alphanumeric());

    if (3..=63).contains(&bucket.len()) && valid_chars && valid_edges {
        Ok(())
    } else {
        Err(ProvisionError::invalid_config(
            "target_bucket",
            format!("'{bucket}' is not a valid S3 bucket name"),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn complete() -> ProvisionConfigBuilder {
        ProvisionConfig::builder()
            .target_bucket("example-bucket")
            .source_account("123456789012")
            .destination_role_arn("arn:aws:iam::210987654321:role/BucketPolicyWriter")
            .admin_principal_arn("arn:aws:iam::123456789012:role/DataSyncAdmin")
    }

    #[test]
    fn test_build_applies_defaults() {
        let config = complete().build().unwrap();
        assert_eq!(config.target_bucket, "example-bucket");
        assert_eq!(config.datasync_region, "us-east-1");
        assert_eq!(config.storage_class, StorageClass::Standard);
        assert_eq!(config.region, None);
        assert_eq!(config.bucket_region, None);
        assert_eq!(config.retry, RetryPolicy::default());
    }

    #[test]
    fn test_missing_values_name_the_variable() {
        let err = ProvisionConfig::builder()
            .source_account("123456789012")
            .build()
            .unwrap_err();
        assert!(matches!(err, ProvisionError::MissingConfig("TARGET_S3_NAME")));

        let err = complete()
            .set_admin_principal_arn(None)
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::MissingConfig("datasync_admin_role_arn")
        ));
        assert!(err.is_configuration_error());
    }

    #[test]
    fn test_blank_value_is_missing() {
        let err = complete().source_account("   ").build().unwrap_err();
        assert!(matches!(err, ProvisionError::MissingConfig("SOURCE_ACC_NUMBER")));
    }

    #[rstest]
    #[case("ab")]
    #[case("Upper-Case")]
    #[case("-leading-dash")]
    #[case("under_score")]
    fn test_invalid_bucket_names(#[case] bucket: &str) {
        let err = complete().target_bucket(bucket).build().unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::InvalidConfig {
                field: "target_bucket",
                ..
            }
        ));
    }

    #[test]
    fn test_invalid_account_and_arns() {
        let err = complete().source_account("12345").build().unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::InvalidConfig {
                field: "source_account",
                ..
            }
        ));

        let err = complete()
            .destination_role_arn("None")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::InvalidConfig {
                field: "destination_role_arn",
                ..
            }
        ));
    }

    #[rstest]
    #[case("arn:aws:iam::123456789012:root")]
    #[case("arn:aws:sts::123456789012:assumed-role/DataSyncAdmin/alice")]
    #[case("arn:aws:iam::123456789012:user/alice")]
    fn test_admin_principal_accepts_account_root_and_sessions(#[case] arn: &str) {
        let config = complete().admin_principal_arn(arn).build().unwrap();
        assert_eq!(config.admin_principal_arn, arn);
    }

    #[test]
    fn test_destination_must_be_a_role() {
        let err = complete()
            .destination_role_arn("arn:aws:iam::210987654321:user/alice")
            .build()
            .unwrap_err();
        assert!(matches!(
            err,
            ProvisionError::InvalidConfig {
                field: "destination_role_arn",
                ..
            }
        ));
    }

    #[test]
    fn test_blank_regions_are_unset() {
        let config = complete()
            .region(Some("  ".into()))
            .bucket_region(Some(" eu-west-1 ".into()))
            .build()
            .unwrap();
        assert_eq!(config.region, None);
        assert_eq!(config.bucket_region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn test_zero_attempts_rejected() {
        let err = complete()
            .retry(RetryPolicy::immediate(0))
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("max_assume_attempts"));
    }

    #[rstest]
    #[case("STANDARD", StorageClass::Standard)]
    #[case("standard_ia", StorageClass::StandardIa)]
    #[case("intelligent-tiering", StorageClass::IntelligentTiering)]
    #[case("DEEP_ARCHIVE", StorageClass::DeepArchive)]
    fn test_storage_class_parse(#[case] input: &str, #[case] expected: StorageClass) {
        assert_eq!(input.parse::<StorageClass>().unwrap(), expected);
    }

    #[test]
    fn test_storage_class_parse_rejects_unknown() {
        assert!("REDUCED_REDUNDANCY".parse::<StorageClass>().is_err());
    }

    #[test]
    fn test_retry_delays_are_bounded() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(1), Duration::from_secs(2));
        assert_eq!(policy.delay_for(2), Duration::from_secs(4));
        assert_eq!(policy.delay_for(3), Duration::from_secs(8));
        assert_eq!(policy.delay_for(10), Duration::from_secs(30));
        assert_eq!(RetryPolicy::immediate(3).delay_for(2), Duration::ZERO);
    }
}
