//! Error types for the provisioning pipeline

use crate::aws::AwsError;
use crate::types::Stage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ProvisionError {
    /// A required configuration value was not supplied; carries the environment variable name.
    #[error("Missing required configuration value: {0}")]
    MissingConfig(&'static str),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig { field: &'static str, reason: String },

    #[error(transparent)]
    Aws(#[from] AwsError),

    #[error("Caller account {caller_account} does not match configured source account {source_account}")]
    AccountMismatch {
        source_account: String,
        caller_account: String,
    },

    #[error("Stage '{stage}' requires the output of stage '{requires}', which has not completed")]
    MissingStageOutput { stage: Stage, requires: Stage },

    #[error("IAM changes did not propagate after {attempts} attempts: {last_error}")]
    ConsistencyTimeout { attempts: u32, last_error: AwsError },

    #[error("Stage '{stage}' failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<ProvisionError>,
    },

    #[error("Saved state belongs to {field} '{saved}', but the configuration uses '{configured}'")]
    StateMismatch {
        field: &'static str,
        saved: String,
        configured: String,
    },

    #[error("State file error: {0}")]
    State(String),
}

impl ProvisionError {
    pub fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        ProvisionError::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub fn state(message: impl Into<String>) -> Self {
        ProvisionError::State(message.into())
    }

    /// True when the error stems from configuration rather than from AWS
    pub fn is_configuration_error(&self) -> bool {
        match self {
            ProvisionError::MissingConfig(_)
            | ProvisionError::InvalidConfig { .. }
            | ProvisionError::StateMismatch { .. } => true,
            ProvisionError::StageFailed { source, .. } => source.is_configuration_error(),
            _ => false,
        }
    }

    /// Stage that aborted the run, if the error came out of the pipeline
    pub fn failed_stage(&self) -> Option<Stage> {
        match self {
            ProvisionError::StageFailed { stage, .. } => Some(*stage),
            _ => None,
        }
    }
}

pub type ProvisionResult<T> = Result<T, ProvisionError>;
