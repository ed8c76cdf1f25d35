//! ARN construction and inspection helpers

/// ARN of an S3 bucket
pub fn s3_bucket_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{bucket}")
}

/// ARN matching every object in an S3 bucket
pub fn s3_objects_arn(bucket: &str) -> String {
    format!("arn:aws:s3:::{bucket}/*")
}

/// Extract 12-digit account ID from ARN (field 5 in colon-delimited format)
pub fn extract_account_from_arn(arn: &str) -> Option<String> {
    let parts: Vec<&str> = arn.split(':').collect();
    if parts.len() >= 6 {
        let account_id = parts[4];
        if is_account_id(account_id) {
            return Some(account_id.to_string());
        }
    }
    None
}

/// True for a 12-digit AWS account ID
pub fn is_account_id(value: &str) -> bool {
    value.len() == 12 && value.chars().all(|c| c.is_ascii_digit())
}

/// Partition, service, account and resource of a well-formed ARN with an account field
fn principal_parts(arn: &str) -> Option<(&str, &str)> {
    let parts: Vec<&str> = arn.splitn(6, ':').collect();
    if parts.len() != 6 || parts[0] != "arn" || parts[1].is_empty() || !is_account_id(parts[4]) {
        return None;
    }
    Some((parts[2], parts[5]))
}

/// Path segments after `prefix` are present and non-empty
fn has_named_path(resource: &str, prefix: &str, segments: usize) -> bool {
    resource.strip_prefix(prefix).is_some_and(|rest| {
        let names: Vec<&str> = rest.split('/').collect();
        names.len() >= segments && names.iter().all(|n| !n.is_empty())
    })
}

/// True for an assumable IAM role ARN, e.g. `arn:aws:iam::123456789012:role/Name`
pub fn is_iam_role_arn(arn: &str) -> bool {
    matches!(principal_parts(arn), Some(("iam", resource)) if has_named_path(resource, "role/", 1))
}

/// True for any principal a bucket policy accepts by ARN: an IAM role, user or
/// account root, or an STS assumed-role session
pub fn is_bucket_policy_principal_arn(arn: &str) -> bool {
    match principal_parts(arn) {
        Some(("iam", resource)) => {
            resource == "root"
                || has_named_path(resource, "role/", 1)
                || has_named_path(resource, "user/", 1)
        }
        Some(("sts", resource)) => has_named_path(resource, "assumed-role/", 2),
        _ => false,
    }
}
