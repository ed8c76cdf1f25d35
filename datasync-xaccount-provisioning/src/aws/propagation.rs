//! Classification of service errors that IAM eventual consistency explains.
//!
//! Each check works on the error code and message the SDK reports, so the
//! client wrappers stay thin and the rules are testable without AWS.

/// `sts:AssumeRole` is denied until a new trust relationship or identity
/// policy has propagated
pub fn assume_role_pending(code: Option<&str>) -> bool {
    code == Some("AccessDenied")
}

/// S3 validates principals on `PutBucketPolicy`; a role IAM has not yet
/// propagated is reported as an invalid principal
pub fn bucket_policy_pending(code: Option<&str>, message: Option<&str>) -> bool {
    code == Some("MalformedPolicy") && message_contains(message, &["invalid principal"])
}

/// DataSync assumes the bucket access role and lists the bucket before it
/// creates a location; both fail while the role or its policies propagate
pub fn location_access_pending(code: Option<&str>, message: Option<&str>) -> bool {
    code == Some("InvalidRequestException")
        && message_contains(
            message,
            &["access test failed", "unable to assume role", "access denied"],
        )
}

/// The bucket lives in a region other than the one the client signed for
pub fn is_wrong_region(code: Option<&str>) -> bool {
    matches!(code, Some("PermanentRedirect" | "AuthorizationHeaderMalformed"))
}

fn message_contains(message: Option<&str>, markers: &[&str]) -> bool {
    message.is_some_and(|m| {
        let lower = m.to_ascii_lowercase();
        markers.iter().any(|marker| lower.contains(marker))
    })
}
