//! AWS SDK integration: the cloud API seam, per-service client wrappers, ARN helpers.

pub mod arn;
pub(crate) mod cloud;
pub(crate) mod datasync_client;
pub(crate) mod iam_client;
pub mod naming;
pub mod propagation;
pub(crate) mod s3_client;
pub(crate) mod sts;

use thiserror::Error;

pub use cloud::{AwsCloud, CloudApi};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AwsError {
    #[error("IAM client error: {0}")]
    IamError(String),
    #[error("STS client error: {0}")]
    StsError(String),
    #[error("S3 client error: {0}")]
    S3Error(String),
    #[error("DataSync client error: {0}")]
    DataSyncError(String),
    #[error("Policy serialization error: {0}")]
    PolicyError(String),
    #[error("Resource already exists: {0}")]
    AlreadyExists(String),
    /// The request failed in a way that IAM eventual consistency explains,
    /// e.g. a freshly created role is not yet visible to STS or S3.
    #[error("IAM changes have not propagated yet: {0}")]
    PropagationPending(String),
}

impl AwsError {
    pub fn is_propagation_pending(&self) -> bool {
        matches!(self, AwsError::PropagationPending(_))
    }
}

pub type AwsResult<T> = Result<T, AwsError>;
