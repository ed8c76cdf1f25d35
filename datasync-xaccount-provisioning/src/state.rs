//! Record of completed stage outputs.
//!
//! The state is bound to the bucket, source account and the two principals
//! baked into the bucket policy, so a saved run cannot be resumed against a
//! different configuration.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::ProvisionConfig;
use crate::error::{ProvisionError, ProvisionResult};
use crate::types::{LocationInfo, RoleInfo, Stage};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvisionState {
    pub target_bucket: String,
    pub source_account: String,
    pub destination_role_arn: String,
    pub admin_principal_arn: String,
    #[serde(default)]
    pub policy_arn: Option<String>,
    #[serde(default)]
    pub role: Option<RoleInfo>,
    #[serde(default)]
    pub attached_policies: Option<Vec<String>>,
    #[serde(default)]
    pub destination_authorized: bool,
    #[serde(default)]
    pub location: Option<LocationInfo>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProvisionState {
    /// Empty state for a fresh run
    pub fn new(config: &ProvisionConfig) -> Self {
        Self {
            target_bucket: config.target_bucket.clone(),
            source_account: config.source_account.clone(),
            destination_role_arn: config.destination_role_arn.clone(),
            admin_principal_arn: config.admin_principal_arn.clone(),
            policy_arn: None,
            role: None,
            attached_policies: None,
            destination_authorized: false,
            location: None,
            updated_at: None,
        }
    }

    pub fn is_complete(&self, stage: Stage) -> bool {
        match stage {
            Stage::Policy => self.policy_arn.is_some(),
            Stage::Role => self.role.is_some(),
            Stage::Bind => self.attached_policies.is_some(),
            Stage::AuthorizeDestination => self.destination_authorized,
            Stage::RegisterLocation => self.location.is_some(),
        }
    }

    pub fn completed_stages(&self) -> Vec<Stage> {
        Stage::ALL
            .into_iter()
            .filter(|stage| self.is_complete(*stage))
            .collect()
    }

    /// First stage that still has to run, in pipeline order
    pub fn next_stage(&self) -> Option<Stage> {
        Stage::ALL
            .into_iter()
            .find(|stage| !self.is_complete(*stage))
    }

    pub fn is_finished(&self) -> bool {
        self.next_stage().is_none()
    }

    /// Reject a state produced for a different bucket, account or set of principals
    pub fn ensure_matches(&self, config: &ProvisionConfig) -> ProvisionResult<()> {
        let bindings = [
            ("target bucket", &self.target_bucket, &config.target_bucket),
            ("source account", &self.source_account, &config.source_account),
            (
                "destination role",
                &self.destination_role_arn,
                &config.destination_role_arn,
            ),
            (
                "admin principal",
                &self.admin_principal_arn,
                &config.admin_principal_arn,
            ),
        ];
        match bindings
            .into_iter()
            .find(|(_, saved, configured)| saved != configured)
        {
            Some((field, saved, configured)) => Err(ProvisionError::StateMismatch {
                field,
                saved: saved.clone(),
                configured: configured.clone(),
            }),
            None => Ok(()),
        }
    }

    pub(crate) fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    /// Load a saved state, or start fresh when `path` does not exist
    pub fn load_or_new(path: &Path, config: &ProvisionConfig) -> ProvisionResult<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::new(config));
            }
            Err(e) => {
                return Err(ProvisionError::state(format!(
                    "Failed to read {}: {e}",
                    path.display()
                )))
            }
        };
        let state: Self = serde_json::from_str(&content).map_err(|e| {
            ProvisionError::state(format!("Failed to parse {}: {e}", path.display()))
        })?;
        state.ensure_matches(config)?;
        Ok(state)
    }

    /// Read a saved state without binding it to a configuration
    pub fn load(path: &Path) -> ProvisionResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            ProvisionError::state(format!("Failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| ProvisionError::state(format!("Failed to parse {}: {e}", path.display())))
    }

    pub fn save(&self, path: &Path) -> ProvisionResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ProvisionError::state(format!("Failed to serialize state: {e}")))?;
        std::fs::write(path, json).map_err(|e| {
            ProvisionError::state(format!("Failed to write {}: {e}", path.display()))
        })
    }
}
