//! AWS DataSync client wrapper for location registration

use std::sync::atomic::{AtomicU16, Ordering};
use std::sync::Arc;

use aws_sdk_datasync::error::ProvideErrorMetadata;
use aws_sdk_datasync::types::{S3Config, S3StorageClass};
use aws_sdk_datasync::Client as DataSyncClient;
use aws_smithy_runtime_api::box_error::BoxError;
use aws_smithy_runtime_api::client::interceptors::context::BeforeDeserializationInterceptorContextRef;
use aws_smithy_runtime_api::client::interceptors::Intercept;
use aws_smithy_runtime_api::client::runtime_components::RuntimeComponents;
use aws_smithy_types::config_bag::ConfigBag;

use crate::aws::propagation::location_access_pending;
use crate::aws::{AwsError, AwsResult};
use crate::types::{LocationInfo, LocationRequest};

/// Records the HTTP status code of the response it observes.
///
/// The SDK output types do not expose the status, so the interceptor reads it
/// off the raw response before deserialization.
#[derive(Debug, Clone, Default)]
struct StatusCapture {
    status: Arc<AtomicU16>,
}

impl StatusCapture {
    fn record(&self, status: u16) {
        self.status.store(status, Ordering::SeqCst);
    }

    fn status(&self) -> u16 {
        self.status.load(Ordering::SeqCst)
    }
}

impl Intercept for StatusCapture {
    fn name(&self) -> &'static str {
        "DataSyncStatusCapture"
    }

    fn read_after_transmit(
        &self,
        context: &BeforeDeserializationInterceptorContextRef<'_>,
        _runtime_components: &RuntimeComponents,
        _cfg: &mut ConfigBag,
    ) -> Result<(), BoxError> {
        self.record(context.response().status().as_u16());
        Ok(())
    }
}

pub struct AwsDataSyncClient {
    client: DataSyncClient,
}

impl AwsDataSyncClient {
    pub fn new(client: DataSyncClient) -> Self {
        Self { client }
    }

    pub async fn create_location_s3(&self, request: &LocationRequest) -> AwsResult<LocationInfo> {
        let s3_config = S3Config::builder()
            .bucket_access_role_arn(&request.bucket_access_role_arn)
            .build()
            .map_err(|e| AwsError::DataSyncError(format!("Invalid S3 location config: {e}")))?;

        let capture = StatusCapture::default();
        let response = self
            .client
            .create_location_s3()
            .s3_bucket_arn(&request.s3_bucket_arn)
            .s3_storage_class(S3StorageClass::from(request.s3_storage_class.as_str()))
            .s3_config(s3_config)
            .customize()
            .interceptor(capture.clone())
            .send()
            .await
            .map_err(|e| {
                let message = format!(
                    "Failed to create S3 location for '{}': {e:?}",
                    request.s3_bucket_arn
                );
                if location_access_pending(e.code(), e.message()) {
                    AwsError::PropagationPending(message)
                } else {
                    AwsError::DataSyncError(message)
                }
            })?;

        let arn = response.location_arn().map(str::to_string).ok_or_else(|| {
            AwsError::DataSyncError("CreateLocationS3 returned no LocationArn".to_string())
        })?;

        Ok(LocationInfo {
            arn,
            http_status: capture.status(),
        })
    }
}
