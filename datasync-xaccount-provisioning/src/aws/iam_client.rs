//! AWS IAM client wrapper for policy and role operations

use crate::aws::{AwsError, AwsResult};
use crate::types::{PolicyDocument, RoleInfo};
use aws_sdk_iam::types::PolicyScopeType;
use aws_sdk_iam::Client as IamClient;

pub struct AwsIamClient {
    client: IamClient,
}

impl AwsIamClient {
    pub fn new(client: IamClient) -> Self {
        Self { client }
    }

    /// Find a customer-managed policy by name, paging through `ListPolicies`
    pub async fn find_local_policy(&self, policy_name: &str) -> AwsResult<Option<String>> {
        let mut marker: Option<String> = None;
        loop {
            let response = self
                .client
                .list_policies()
                .scope(PolicyScopeType::Local)
                .set_marker(marker.take())
                .send()
                .await
                .map_err(|e| AwsError::IamError(format!("Failed to list policies: {e}")))?;

            if let Some(policy) = response
                .policies()
                .iter()
                .find(|p| p.policy_name() == Some(policy_name))
            {
                return policy.arn().map(|arn| Some(arn.to_string())).ok_or_else(|| {
                    AwsError::IamError(format!("Policy '{policy_name}' listed without an ARN"))
                });
            }

            if !response.is_truncated() {
                return Ok(None);
            }
            marker = response.marker().map(str::to_string);
            if marker.is_none() {
                return Ok(None);
            }
        }
    }

    pub async fn create_policy(
        &self,
        policy_name: &str,
        policy_document: &PolicyDocument,
    ) -> AwsResult<String> {
        let policy_json = serde_json::to_string(policy_document)
            .map_err(|e| AwsError::PolicyError(format!("Failed to serialize policy: {e}")))?;

        let response = self
            .client
            .create_policy()
            .policy_name(policy_name)
            .policy_document(policy_json)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_entity_already_exists_exception())
                {
                    AwsError::AlreadyExists(format!("policy '{policy_name}'"))
                } else {
                    AwsError::IamError(format!(
                        "Failed to create policy '{policy_name}': {e:?}"
                    ))
                }
            })?;

        response
            .policy()
            .and_then(|p| p.arn())
            .map(str::to_string)
            .ok_or_else(|| {
                AwsError::IamError(format!("CreatePolicy for '{policy_name}' returned no ARN"))
            })
    }

    /// Look up a role by name; `None` when IAM reports `NoSuchEntity`
    pub async fn find_role(&self, role_name: &str) -> AwsResult<Option<RoleInfo>> {
        match self.client.get_role().role_name(role_name).send().await {
            Ok(response) => Ok(response.role().map(|role| RoleInfo {
                name: role.role_name().to_string(),
                arn: role.arn().to_string(),
            })),
            Err(e)
                if e.as_service_error()
                    .is_some_and(|se| se.is_no_such_entity_exception()) =>
            {
                Ok(None)
            }
            Err(e) => Err(AwsError::IamError(format!(
                "Failed to get role '{role_name}': {e:?}"
            ))),
        }
    }

    pub async fn create_role(
        &self,
        role_name: &str,
        trust_policy: &PolicyDocument,
    ) -> AwsResult<RoleInfo> {
        let trust_json = serde_json::to_string(trust_policy).map_err(|e| {
            AwsError::PolicyError(format!("Failed to serialize trust policy: {e}"))
        })?;

        let response = self
            .client
            .create_role()
            .role_name(role_name)
            .assume_role_policy_document(trust_json)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error()
                    .is_some_and(|se| se.is_entity_already_exists_exception())
                {
                    AwsError::AlreadyExists(format!("role '{role_name}'"))
                } else {
                    AwsError::IamError(format!("Failed to create role '{role_name}': {e:?}"))
                }
            })?;

        response
            .role()
            .map(|role| RoleInfo {
                name: role.role_name().to_string(),
                arn: role.arn().to_string(),
            })
            .ok_or_else(|| {
                AwsError::IamError(format!("CreateRole for '{role_name}' returned no role"))
            })
    }

    pub async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> AwsResult<()> {
        self.client
            .attach_role_policy()
            .role_name(role_name)
            .policy_arn(policy_arn)
            .send()
            .await
            .map_err(|e| {
                AwsError::IamError(format!(
                    "Failed to attach policy '{policy_arn}' to role '{role_name}': {e:?}"
                ))
            })?;
        Ok(())
    }
}
