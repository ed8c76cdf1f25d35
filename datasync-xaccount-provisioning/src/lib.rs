//! This crate provides the core business logic for DataSync cross-account provisioning:
//! - Validated configuration
//! - Policy synthesis (transfer policy, trust policy, destination bucket policy)
//! - The five provisioning stages and a resumable stage loop
//! - AWS SDK wrappers behind the [`CloudApi`] seam
//!

pub mod aws;
pub mod commands;
pub mod config;
mod error;
pub mod state;
pub mod synthesis;
mod types;

// Re-exports for a small, focused public API
pub use aws::{AwsCloud, AwsError, CloudApi};
pub use commands::{render_plan, DataSyncProvisioner, ProvisionPlan};
pub use config::{ProvisionConfig, ProvisionConfigBuilder, RetryPolicy, StorageClass};
pub use error::{ProvisionError, ProvisionResult};
pub use state::ProvisionState;
pub use types::{
    Effect, LocationInfo, LocationRequest, OneOrMany, PolicyDocument, Principal, RoleInfo, Stage,
    Statement, TemporaryCredentials,
};
