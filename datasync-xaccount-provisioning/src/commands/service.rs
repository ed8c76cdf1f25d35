//! DataSync Cross-Account Provisioning Service Layer
//!
//! This module provides the service that owns the validated configuration and
//! the cloud API handle. The individual stages live in sibling modules and are
//! exposed as methods on [`DataSyncProvisioner`].

use std::sync::Arc;

use crate::aws::{AwsCloud, CloudApi};
use crate::config::ProvisionConfig;

/// Main service struct that holds the cloud API and runs the provisioning stages
pub struct DataSyncProvisioner {
    pub(crate) config: ProvisionConfig,
    pub(crate) cloud: Arc<dyn CloudApi>,
}

impl DataSyncProvisioner {
    /// Create a service backed by the AWS SDK.
    ///
    /// The SDK configuration is loaded using the default credential provider chain.
    pub async fn new(config: ProvisionConfig) -> Self {
        let cloud = AwsCloud::load(
            config.region.as_deref(),
            config.bucket_region.as_deref(),
            &config.datasync_region,
        )
        .await;
        Self::with_cloud(config, Arc::new(cloud))
    }

    /// Create a service on top of any [`CloudApi`] implementation
    pub fn with_cloud(config: ProvisionConfig, cloud: Arc<dyn CloudApi>) -> Self {
        Self { config, cloud }
    }

    pub fn config(&self) -> &ProvisionConfig {
        &self.config
    }

    // Stage implementations are in policy.rs, role.rs, bind.rs, authorize.rs and location.rs;
    // the stage loop is in pipeline.rs
}
