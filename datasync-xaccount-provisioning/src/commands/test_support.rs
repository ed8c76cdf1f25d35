//! In-memory [`CloudApi`] double that records every call.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::aws::naming::TRANSFER_POLICY_NAME;
use crate::aws::{AwsError, AwsResult, CloudApi};
use crate::commands::DataSyncProvisioner;
use crate::config::{ProvisionConfig, RetryPolicy};
use crate::types::{LocationInfo, LocationRequest, PolicyDocument, RoleInfo, TemporaryCredentials};

pub(crate) const SOURCE_ACCOUNT: &str = "123456789012";
pub(crate) const DESTINATION_ROLE_ARN: &str = "arn:aws:iam::210987654321:role/BucketPolicyWriter";
pub(crate) const ADMIN_ARN: &str = "arn:aws:iam::123456789012:role/DataSyncAdmin";
pub(crate) const LOCATION_ARN: &str =
    "arn:aws:datasync:us-east-1:123456789012:location/loc-0123456789abcdef0";

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    CallerAccount,
    FindPolicy,
    CreatePolicy(String),
    FindRole,
    CreateRole(String),
    Attach { role: String, policy: String },
    AssumeRole { role_arn: String, session: String },
    PutBucketPolicy { bucket: String },
    CreateLocation,
}

#[derive(Default)]
struct Inner {
    calls: Vec<Call>,
    caller_account: String,
    policies: HashMap<String, String>,
    created_policies: Vec<PolicyDocument>,
    roles: HashMap<String, RoleInfo>,
    trust_policies: Vec<PolicyDocument>,
    hide_first_policy_lookup: bool,
    hide_first_role_lookup: bool,
    create_policy_failure: Option<String>,
    attach_failure: Option<String>,
    attached: Vec<(String, String)>,
    credentials: Option<TemporaryCredentials>,
    assume_failures: VecDeque<AwsError>,
    put_failures: VecDeque<AwsError>,
    bucket_policies: Vec<(TemporaryCredentials, String, PolicyDocument)>,
    location_requests: Vec<LocationRequest>,
    location_response: Option<LocationInfo>,
    location_failure: Option<String>,
    location_failures: VecDeque<AwsError>,
}

pub(crate) struct FakeCloud {
    inner: Mutex<Inner>,
}

impl FakeCloud {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(Inner {
                caller_account: SOURCE_ACCOUNT.to_string(),
                ..Inner::default()
            }),
        })
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().expect("fake cloud mutex poisoned")
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub(crate) fn count(&self, predicate: impl Fn(&Call) -> bool) -> usize {
        self.lock().calls.iter().filter(|c| predicate(c)).count()
    }

    pub(crate) fn created_policies(&self) -> Vec<PolicyDocument> {
        self.lock().created_policies.clone()
    }

    pub(crate) fn trust_policies(&self) -> Vec<PolicyDocument> {
        self.lock().trust_policies.clone()
    }

    pub(crate) fn attached(&self) -> Vec<(String, String)> {
        self.lock().attached.clone()
    }

    pub(crate) fn bucket_policies(&self) -> Vec<(TemporaryCredentials, String, PolicyDocument)> {
        self.lock().bucket_policies.clone()
    }

    pub(crate) fn location_requests(&self) -> Vec<LocationRequest> {
        self.lock().location_requests.clone()
    }

    pub(crate) fn set_caller_account(&self, account: &str) {
        self.lock().caller_account = account.to_string();
    }

    pub(crate) fn seed_policy(&self, arn: &str) {
        self.lock()
            .policies
            .insert(TRANSFER_POLICY_NAME.to_string(), arn.to_string());
    }

    pub(crate) fn seed_role(&self, role: RoleInfo) {
        self.lock().roles.insert(role.name.clone(), role);
    }

    pub(crate) fn hide_policies_from_first_lookup(&self) {
        self.lock().hide_first_policy_lookup = true;
    }

    pub(crate) fn hide_roles_from_first_lookup(&self) {
        self.lock().hide_first_role_lookup = true;
    }

    pub(crate) fn fail_create_policy(&self, message: &str) {
        self.lock().create_policy_failure = Some(message.to_string());
    }

    pub(crate) fn fail_attach(&self, policy_arn: &str) {
        self.lock().attach_failure = Some(policy_arn.to_string());
    }

    pub(crate) fn set_credentials(&self, credentials: TemporaryCredentials) {
        self.lock().credentials = Some(credentials);
    }

    pub(crate) fn queue_assume_failure(&self, error: AwsError) {
        self.lock().assume_failures.push_back(error);
    }

    pub(crate) fn queue_put_failure(&self, error: AwsError) {
        self.lock().put_failures.push_back(error);
    }

    pub(crate) fn set_location_response(&self, response: LocationInfo) {
        self.lock().location_response = Some(response);
    }

    pub(crate) fn fail_location(&self, message: &str) {
        self.lock().location_failure = Some(message.to_string());
    }

    pub(crate) fn queue_location_failure(&self, error: AwsError) {
        self.lock().location_failures.push_back(error);
    }
}

/// Records every log line emitted while tests run
struct CaptureLogger;

static CAPTURED_LOGS: Mutex<Vec<String>> = Mutex::new(Vec::new());
static CAPTURE_LOGGER: CaptureLogger = CaptureLogger;

impl log::Log for CaptureLogger {
    fn enabled(&self, _metadata: &log::Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &log::Record<'_>) {
        if let Ok(mut lines) = CAPTURED_LOGS.lock() {
            lines.push(record.args().to_string());
        }
    }

    fn flush(&self) {}
}

/// Install the capturing logger; later calls keep the first installation
pub(crate) fn capture_logs() {
    if log::set_logger(&CAPTURE_LOGGER).is_ok() {
        log::set_max_level(log::LevelFilter::Trace);
    }
}

pub(crate) fn captured_logs() -> Vec<String> {
    CAPTURED_LOGS
        .lock()
        .map(|lines| lines.clone())
        .unwrap_or_default()
}

pub(crate) fn credentials(tag: &str) -> TemporaryCredentials {
    TemporaryCredentials {
        access_key_id: format!("ASIA{tag}"),
        secret_access_key: format!("secret-{tag}"),
        session_token: format!("token-{tag}"),
        expiration: None,
    }
}

pub(crate) fn test_config() -> ProvisionConfig {
    ProvisionConfig::builder()
        .target_bucket("example-bucket")
        .source_account(SOURCE_ACCOUNT)
        .destination_role_arn(DESTINATION_ROLE_ARN)
        .admin_principal_arn(ADMIN_ARN)
        .retry(RetryPolicy::immediate(3))
        .build()
        .expect("test config is valid")
}

pub(crate) fn provisioner(cloud: &Arc<FakeCloud>) -> DataSyncProvisioner {
    DataSyncProvisioner::with_cloud(test_config(), cloud.clone())
}

#[async_trait]
impl CloudApi for FakeCloud {
    async fn caller_account_id(&self) -> AwsResult<String> {
        let mut inner = self.lock();
        inner.calls.push(Call::CallerAccount);
        Ok(inner.caller_account.clone())
    }

    async fn find_local_policy(&self, policy_name: &str) -> AwsResult<Option<String>> {
        let mut inner = self.lock();
        inner.calls.push(Call::FindPolicy);
        if inner.hide_first_policy_lookup {
            inner.hide_first_policy_lookup = false;
            return Ok(None);
        }
        Ok(inner.policies.get(policy_name).cloned())
    }

    async fn create_policy(
        &self,
        policy_name: &str,
        document: &PolicyDocument,
    ) -> AwsResult<String> {
        let mut inner = self.lock();
        inner.calls.push(Call::CreatePolicy(policy_name.to_string()));
        if let Some(message) = inner.create_policy_failure.clone() {
            return Err(AwsError::IamError(message));
        }
        if inner.policies.contains_key(policy_name) {
            return Err(AwsError::AlreadyExists(format!("policy '{policy_name}'")));
        }
        let arn = format!("arn:aws:iam::{}:policy/{policy_name}", inner.caller_account);
        inner.policies.insert(policy_name.to_string(), arn.clone());
        inner.created_policies.push(document.clone());
        Ok(arn)
    }

    async fn find_role(&self, role_name: &str) -> AwsResult<Option<RoleInfo>> {
        let mut inner = self.lock();
        inner.calls.push(Call::FindRole);
        if inner.hide_first_role_lookup {
            inner.hide_first_role_lookup = false;
            return Ok(None);
        }
        Ok(inner.roles.get(role_name).cloned())
    }

    async fn create_role(
        &self,
        role_name: &str,
        trust_policy: &PolicyDocument,
    ) -> AwsResult<RoleInfo> {
        let mut inner = self.lock();
        inner.calls.push(Call::CreateRole(role_name.to_string()));
        if inner.roles.contains_key(role_name) {
            return Err(AwsError::AlreadyExists(format!("role '{role_name}'")));
        }
        let role = RoleInfo {
            name: role_name.to_string(),
            arn: format!("arn:aws:iam::{}:role/{role_name}", inner.caller_account),
        };
        inner.roles.insert(role_name.to_string(), role.clone());
        inner.trust_policies.push(trust_policy.clone());
        Ok(role)
    }

    async fn attach_role_policy(&self, role_name: &str, policy_arn: &str) -> AwsResult<()> {
        let mut inner = self.lock();
        inner.calls.push(Call::Attach {
            role: role_name.to_string(),
            policy: policy_arn.to_string(),
        });
        if inner.attach_failure.as_deref() == Some(policy_arn) {
            return Err(AwsError::IamError(format!(
                "NoSuchEntity: policy {policy_arn} does not exist"
            )));
        }
        inner
            .attached
            .push((role_name.to_string(), policy_arn.to_string()));
        Ok(())
    }

    async fn assume_role(
        &self,
        role_arn: &str,
        session_name: &str,
    ) -> AwsResult<TemporaryCredentials> {
        let mut inner = self.lock();
        inner.calls.push(Call::AssumeRole {
            role_arn: role_arn.to_string(),
            session: session_name.to_string(),
        });
        if let Some(error) = inner.assume_failures.pop_front() {
            return Err(error);
        }
        Ok(inner
            .credentials
            .clone()
            .unwrap_or_else(|| credentials("DEFAULT")))
    }

    async fn put_bucket_policy(
        &self,
        credentials: &TemporaryCredentials,
        bucket: &str,
        policy: &PolicyDocument,
    ) -> AwsResult<()> {
        let mut inner = self.lock();
        inner.calls.push(Call::PutBucketPolicy {
            bucket: bucket.to_string(),
        });
        if let Some(error) = inner.put_failures.pop_front() {
            return Err(error);
        }
        inner
            .bucket_policies
            .push((credentials.clone(), bucket.to_string(), policy.clone()));
        Ok(())
    }

    async fn create_location_s3(&self, request: &LocationRequest) -> AwsResult<LocationInfo> {
        let mut inner = self.lock();
        inner.calls.push(Call::CreateLocation);
        if let Some(error) = inner.location_failures.pop_front() {
            return Err(error);
        }
        if let Some(message) = inner.location_failure.clone() {
            return Err(AwsError::DataSyncError(message));
        }
        inner.location_requests.push(request.clone());
        Ok(inner.location_response.clone().unwrap_or(LocationInfo {
            arn: LOCATION_ARN.to_string(),
            http_status: 200,
        }))
    }
}
