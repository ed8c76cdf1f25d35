//! Commands module - service layer for DataSync cross-account provisioning

mod authorize;
mod bind;
mod location;
mod pipeline;
pub mod plan;
mod policy;
mod retry;
mod role;
pub(crate) mod service;

#[cfg(test)]
pub(crate) mod test_support;

pub use plan::{render_plan, PlannedStage, ProvisionPlan};
pub use service::DataSyncProvisioner;
