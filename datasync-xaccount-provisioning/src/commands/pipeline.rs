//! Stage loop: runs the pending stages in order and records their outputs

use crate::error::{ProvisionError, ProvisionResult};
use crate::state::ProvisionState;
use crate::types::Stage;

impl super::service::DataSyncProvisioner {
    /// Refuse to mutate anything when the caller is not in the configured source account
    pub async fn verify_source_account(&self) -> ProvisionResult<()> {
        let caller_account = self.cloud.caller_account_id().await?;
        if caller_account != self.config.source_account {
            return Err(ProvisionError::AccountMismatch {
                source_account: self.config.source_account.clone(),
                caller_account,
            });
        }
        log::debug!("Caller account {caller_account} matches source account");
        Ok(())
    }

    /// Run one stage and store its output in `state`.
    ///
    /// Inputs come from `state`, so a stage can only run once the stages it
    /// depends on have completed.
    pub async fn run_stage(&self, stage: Stage, state: &mut ProvisionState) -> ProvisionResult<()> {
        state.ensure_matches(&self.config)?;
        log::info!("Running stage '{stage}': {}", stage.description());

        match stage {
            Stage::Policy => {
                state.policy_arn = Some(self.ensure_transfer_policy().await?);
            }
            Stage::Role => {
                state.role = Some(self.ensure_transfer_role().await?);
            }
            Stage::Bind => {
                let role = state.role.as_ref().ok_or(ProvisionError::MissingStageOutput {
                    stage,
                    requires: Stage::Role,
                })?;
                let policy_arn =
                    state
                        .policy_arn
                        .as_deref()
                        .ok_or(ProvisionError::MissingStageOutput {
                            stage,
                            requires: Stage::Policy,
                        })?;
                state.attached_policies = Some(self.bind_policies(&role.name, policy_arn).await?);
            }
            Stage::AuthorizeDestination => {
                if state.attached_policies.is_none() {
                    return Err(ProvisionError::MissingStageOutput {
                        stage,
                        requires: Stage::Bind,
                    });
                }
                let role = state.role.as_ref().ok_or(ProvisionError::MissingStageOutput {
                    stage,
                    requires: Stage::Role,
                })?;
                self.authorize_destination(&role.arn).await?;
                state.destination_authorized = true;
            }
            Stage::RegisterLocation => {
                if !state.destination_authorized {
                    return Err(ProvisionError::MissingStageOutput {
                        stage,
                        requires: Stage::AuthorizeDestination,
                    });
                }
                let role = state.role.as_ref().ok_or(ProvisionError::MissingStageOutput {
                    stage,
                    requires: Stage::Role,
                })?;
                state.location = Some(self.register_location(&role.arn).await?);
            }
        }

        state.touch();
        Ok(())
    }

    /// Run every pending stage, calling `on_stage_complete` after each one.
    ///
    /// Completed stages in `state` are skipped. The first failure aborts the
    /// run as [`ProvisionError::StageFailed`]; `state` then still holds the
    /// outputs of every stage that completed.
    pub async fn run_with<F>(
        &self,
        state: &mut ProvisionState,
        mut on_stage_complete: F,
    ) -> ProvisionResult<()>
    where
        F: FnMut(Stage, &ProvisionState) -> ProvisionResult<()>,
    {
        state.ensure_matches(&self.config)?;

        for stage in Stage::ALL {
            if state.is_complete(stage) {
                log::info!("Skipping completed stage '{stage}'");
                continue;
            }
            self.run_stage(stage, state)
                .await
                .map_err(|source| ProvisionError::StageFailed {
                    stage,
                    source: Box::new(source),
                })?;
            on_stage_complete(stage, state)?;
        }
        Ok(())
    }

    /// Run every pending stage
    pub async fn run(&self, state: &mut ProvisionState) -> ProvisionResult<()> {
        self.run_with(state, |_, _| Ok(())).await
    }
}
