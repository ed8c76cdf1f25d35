//! Builders for the three policy documents and the location request.

use crate::aws::arn::{s3_bucket_arn, s3_objects_arn};
use crate::aws::naming::DATASYNC_SERVICE_PRINCIPAL;
use crate::types::{Effect, LocationRequest, OneOrMany, PolicyDocument, Principal, Statement};

pub const IAM_POLICY_VERSION: &str = "2012-10-17";
pub const BUCKET_POLICY_VERSION: &str = "2008-10-17";

pub const SOURCE_ROLE_STATEMENT_SID: &str = "DataSyncCreateS3LocationAndTaskAccess";
pub const ADMIN_STATEMENT_SID: &str = "DataSyncCreateS3Location";

/// Actions DataSync needs on the bucket itself
pub const BUCKET_ACTIONS: [&str; 3] = [
    "s3:GetBucketLocation",
    "s3:ListBucket",
    "s3:ListBucketMultipartUploads",
];

/// Actions DataSync needs on the objects of the bucket
pub const OBJECT_ACTIONS: [&str; 7] = [
    "s3:AbortMultipartUpload",
    "s3:DeleteObject",
    "s3:GetObject",
    "s3:ListMultipartUploadParts",
    "s3:PutObject",
    "s3:GetObjectTagging",
    "s3:PutObjectTagging",
];

/// Bucket-level actions followed by object-level actions
pub fn transfer_actions() -> Vec<String> {
    BUCKET_ACTIONS
        .iter()
        .chain(OBJECT_ACTIONS.iter())
        .map(|a| a.to_string())
        .collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

/// Identity policy for the transfer role: bucket actions on the bucket ARN,
/// object actions on the object wildcard.
pub fn build_transfer_policy(bucket: &str) -> PolicyDocument {
    PolicyDocument {
        version: IAM_POLICY_VERSION.to_string(),
        statement: vec![
            Statement {
                sid: None,
                effect: Effect::Allow,
                principal: None,
                action: OneOrMany::Multiple(strings(&BUCKET_ACTIONS)),
                resource: Some(OneOrMany::Single(s3_bucket_arn(bucket))),
            },
            Statement {
                sid: None,
                effect: Effect::Allow,
                principal: None,
                action: OneOrMany::Multiple(strings(&OBJECT_ACTIONS)),
                resource: Some(OneOrMany::Single(s3_objects_arn(bucket))),
            },
        ],
    }
}

/// Trust policy that only lets DataSync assume the transfer role
pub fn build_trust_policy() -> PolicyDocument {
    PolicyDocument {
        version: IAM_POLICY_VERSION.to_string(),
        statement: vec![Statement {
            sid: None,
            effect: Effect::Allow,
            principal: Some(Principal::Service(DATASYNC_SERVICE_PRINCIPAL.to_string())),
            action: OneOrMany::Single("sts:AssumeRole".to_string()),
            resource: None,
        }],
    }
}

/// Destination bucket policy: full transfer access for the source role,
/// list-only access for the DataSync administrator.
pub fn build_bucket_policy(
    bucket: &str,
    source_role_arn: &str,
    admin_principal_arn: &str,
) -> PolicyDocument {
    PolicyDocument {
        version: BUCKET_POLICY_VERSION.to_string(),
        statement: vec![
            Statement {
                sid: Some(SOURCE_ROLE_STATEMENT_SID.to_string()),
                effect: Effect::Allow,
                principal: Some(Principal::Aws(source_role_arn.to_string())),
                action: OneOrMany::Multiple(transfer_actions()),
                resource: Some(OneOrMany::Multiple(vec![
                    s3_bucket_arn(bucket),
                    s3_objects_arn(bucket),
                ])),
            },
            Statement {
                sid: Some(ADMIN_STATEMENT_SID.to_string()),
                effect: Effect::Allow,
                principal: Some(Principal::Aws(admin_principal_arn.to_string())),
                action: OneOrMany::Single("s3:ListBucket".to_string()),
                resource: Some(OneOrMany::Single(s3_bucket_arn(bucket))),
            },
        ],
    }
}

pub fn build_location_request(
    bucket: &str,
    storage_class: &str,
    access_role_arn: &str,
) -> LocationRequest {
    LocationRequest {
        s3_bucket_arn: s3_bucket_arn(bucket),
        s3_storage_class: storage_class.to_string(),
        bucket_access_role_arn: access_role_arn.to_string(),
    }
}
