//! Plan rendering: the documents and requests a run would send, without calling AWS

use serde::Serialize;

use crate::aws::naming::{
    policies_to_attach, DESTINATION_SESSION_NAME, TRANSFER_POLICY_NAME, TRANSFER_ROLE_NAME,
};
use crate::config::ProvisionConfig;
use crate::synthesis::{
    build_bucket_policy, build_location_request, build_transfer_policy, build_trust_policy,
};
use crate::types::{LocationRequest, PolicyDocument, Stage};

#[derive(Debug, Clone, Serialize)]
pub struct PlannedStage {
    pub stage: Stage,
    pub description: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProvisionPlan {
    pub policy_name: &'static str,
    pub role_name: &'static str,
    pub session_name: &'static str,
    /// Role ARN the bucket policy and location will reference, assuming the
    /// role is created at the root path of the source account
    pub expected_role_arn: String,
    pub transfer_policy: PolicyDocument,
    pub trust_policy: PolicyDocument,
    pub policies_to_attach: Vec<String>,
    pub bucket_policy: PolicyDocument,
    pub location_request: LocationRequest,
    pub stages: Vec<PlannedStage>,
}

/// Render everything a run would send for `config`
pub fn render_plan(config: &ProvisionConfig) -> ProvisionPlan {
    let expected_role_arn = format!(
        "arn:aws:iam::{}:role/{TRANSFER_ROLE_NAME}",
        config.source_account
    );
    let expected_policy_arn = format!(
        "arn:aws:iam::{}:policy/{TRANSFER_POLICY_NAME}",
        config.source_account
    );

    ProvisionPlan {
        policy_name: TRANSFER_POLICY_NAME,
        role_name: TRANSFER_ROLE_NAME,
        session_name: DESTINATION_SESSION_NAME,
        transfer_policy: build_transfer_policy(&config.target_bucket),
        trust_policy: build_trust_policy(),
        policies_to_attach: policies_to_attach(&expected_policy_arn),
        bucket_policy: build_bucket_policy(
            &config.target_bucket,
            &expected_role_arn,
            &config.admin_principal_arn,
        ),
        location_request: build_location_request(
            &config.target_bucket,
            config.storage_class.as_str(),
            &expected_role_arn,
        ),
        expected_role_arn,
        stages: Stage::ALL
            .into_iter()
            .map(|stage| PlannedStage {
                stage,
                description: stage.description(),
            })
            .collect(),
    }
}
