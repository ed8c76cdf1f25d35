//! Human-readable progress lines and summaries written to stderr

use datasync_xaccount_provisioning::{ProvisionState, Stage};

/// One line describing what a completed stage produced
pub fn stage_progress(stage: Stage, state: &ProvisionState) -> String {
    match stage {
        Stage::Policy => format!(
            "Policy ready: {}",
            state.policy_arn.as_deref().unwrap_or("<unknown>")
        ),
        Stage::Role => match &state.role {
            Some(role) => format!("Role ready: {} ({})", role.name, role.arn),
            None => "Role ready".to_string(),
        },
        Stage::Bind => {
            let attached = state.attached_policies.as_deref().unwrap_or_default();
            format!("Attached {} policies: {}", attached.len(), attached.join(", "))
        }
        Stage::AuthorizeDestination => format!(
            "Destination bucket policy set on {}",
            state.target_bucket
        ),
        Stage::RegisterLocation => match &state.location {
            Some(location) => format!(
                "DataSync location with the ARN {} created with HTTP status {}",
                location.arn, location.http_status
            ),
            None => "DataSync location created".to_string(),
        },
    }
}

/// Completed and pending stages of a saved state
pub fn status_lines(state: &ProvisionState) -> Vec<String> {
    let mut lines = vec![format!(
        "State for bucket '{}' in source account {}",
        state.target_bucket, state.source_account
    )];
    for stage in Stage::ALL {
        if state.is_complete(stage) {
            lines.push(format!("  [done]    {stage}: {}", stage_progress(stage, state)));
        } else {
            lines.push(format!("  [pending] {stage}: {}", stage.description()));
        }
    }
    lines
}
