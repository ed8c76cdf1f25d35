//! Policy synthesis (deterministic JSON generation)

pub mod policy_builder;

pub use policy_builder::{
    build_bucket_policy, build_location_request, build_transfer_policy, build_trust_policy,
};
