//! Location Registrar: register the destination bucket with DataSync

use crate::error::ProvisionResult;
use crate::synthesis::build_location_request;
use crate::types::LocationInfo;

impl super::service::DataSyncProvisioner {
    /// Create the DataSync S3 location for the destination bucket, accessed
    /// through `access_role_arn`. Returns the location ARN and HTTP status as
    /// reported by DataSync.
    ///
    /// DataSync assumes the role and lists the bucket before creating the
    /// location, so access failures are retried like the bucket policy write.
    pub async fn register_location(&self, access_role_arn: &str) -> ProvisionResult<LocationInfo> {
        let request = build_location_request(
            &self.config.target_bucket,
            self.config.storage_class.as_str(),
            access_role_arn,
        );
        let location = self
            .retry_while_propagating("register the DataSync location", || {
                self.cloud.create_location_s3(&request)
            })
            .await?;
        log::info!(
            "DataSync location {} created with HTTP status {}",
            location.arn,
            location.http_status
        );
        Ok(location)
    }
}

#[cfg(test)]
mod tests {
    use crate::aws::AwsError;
    use crate::commands::test_support::{provisioner, Call, FakeCloud};
    use crate::types::LocationInfo;
    use crate::ProvisionError;

    const ROLE_ARN: &str = "arn:aws:iam::123456789012:role/datasync-xaccount-s3-role";

    #[tokio::test]
    async fn test_arn_and_status_propagate_unchanged() {
        let cloud = FakeCloud::new();
        let response = LocationInfo {
            arn: "arn:aws:datasync:us-east-1:123456789012:location/loc-feedface".into(),
            http_status: 201,
        };
        cloud.set_location_response(response.clone());

        let location = provisioner(&cloud).register_location(ROLE_ARN).await.unwrap();
        assert_eq!(location, response);
    }

    #[tokio::test]
    async fn test_request_shape() {
        let cloud = FakeCloud::new();
        provisioner(&cloud).register_location(ROLE_ARN).await.unwrap();

        let requests = cloud.location_requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].s3_bucket_arn, "arn:aws:s3:::example-bucket");
        assert_eq!(requests[0].s3_storage_class, "STANDARD");
        assert_eq!(requests[0].bucket_access_role_arn, ROLE_ARN);
    }

    #[tokio::test]
    async fn test_failure_propagates() {
        let cloud = FakeCloud::new();
        cloud.fail_location("InvalidRequestException: bucket not accessible");
        let err = provisioner(&cloud)
            .register_location(ROLE_ARN)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("bucket not accessible"));
        assert_eq!(cloud.count(|c| matches!(c, Call::CreateLocation)), 1);
    }

    #[tokio::test]
    async fn test_access_test_failure_is_retried() {
        let cloud = FakeCloud::new();
        cloud.queue_location_failure(AwsError::PropagationPending(
            "InvalidRequestException: DataSync location access test failed. Access denied.".into(),
        ));

        let location = provisioner(&cloud).register_location(ROLE_ARN).await.unwrap();

        assert_eq!(location.http_status, 200);
        assert_eq!(cloud.count(|c| matches!(c, Call::CreateLocation)), 2);
        assert_eq!(cloud.location_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_access_failures_give_up_after_max_attempts() {
        let cloud = FakeCloud::new();
        for _ in 0..4 {
            cloud.queue_location_failure(AwsError::PropagationPending(
                "InvalidRequestException: Unable to assume role".into(),
            ));
        }

        let err = provisioner(&cloud)
            .register_location(ROLE_ARN)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ProvisionError::ConsistencyTimeout { attempts: 3, .. }
        ));
        assert_eq!(cloud.count(|c| matches!(c, Call::CreateLocation)), 3);
    }
}
