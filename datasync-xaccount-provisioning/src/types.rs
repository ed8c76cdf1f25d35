//! Shared types: IAM policy documents, stage identifiers and stage outputs.

use serde::{Deserialize, Serialize};
use std::fmt;

/// IAM policy document as serialized into IAM and S3 requests
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct PolicyDocument {
    pub version: String,
    pub statement: Vec<Statement>,
}

impl PolicyDocument {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Statement {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,
    pub effect: Effect,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal: Option<Principal>,
    pub action: OneOrMany,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource: Option<OneOrMany>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Effect {
    Allow,
    Deny,
}

/// Principal block of a trust or resource policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    Service(String),
    #[serde(rename = "AWS")]
    Aws(String),
}

/// IAM fields that accept either a single string or a list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany {
    Single(String),
    Multiple(Vec<String>),
}

impl OneOrMany {
    pub fn values(&self) -> Vec<&str> {
        match self {
            OneOrMany::Single(value) => vec![value.as_str()],
            OneOrMany::Multiple(values) => values.iter().map(String::as_str).collect(),
        }
    }
}

/// An IAM role identified by both name and ARN
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleInfo {
    pub name: String,
    pub arn: String,
}

/// Short-lived credentials returned by `sts:AssumeRole`.
///
/// `Debug` is implemented by hand so secrets never reach logs.
#[derive(Clone, PartialEq, Eq)]
pub struct TemporaryCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    pub expiration: Option<std::time::SystemTime>,
}

impl fmt::Debug for TemporaryCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TemporaryCredentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &"** redacted **")
            .field("expiration", &self.expiration)
            .finish()
    }
}

/// Parameters of a DataSync `CreateLocationS3` request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LocationRequest {
    pub s3_bucket_arn: String,
    pub s3_storage_class: String,
    pub bucket_access_role_arn: String,
}

/// A registered DataSync location plus the HTTP status of the creating call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationInfo {
    pub arn: String,
    pub http_status: u16,
}

/// Pipeline stages in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Stage {
    Policy,
    Role,
    Bind,
    AuthorizeDestination,
    RegisterLocation,
}

impl Stage {
    pub const ALL: [Stage; 5] = [
        Stage::Policy,
        Stage::Role,
        Stage::Bind,
        Stage::AuthorizeDestination,
        Stage::RegisterLocation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Policy => "policy",
            Stage::Role => "role",
            Stage::Bind => "bind",
            Stage::AuthorizeDestination => "authorize-destination",
            Stage::RegisterLocation => "register-location",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Stage::Policy => "Ensure the S3 transfer policy exists in the source account",
            Stage::Role => "Ensure the DataSync transfer role exists in the source account",
            Stage::Bind => "Attach managed and custom policies to the transfer role",
            Stage::AuthorizeDestination => {
                "Assume the destination role and apply the destination bucket policy"
            }
            Stage::RegisterLocation => "Register the destination bucket as a DataSync S3 location",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
